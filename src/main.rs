mod cli;
mod config;
mod error;
mod notify;
mod output;
mod page_model;
mod pdf_extract;
mod schedule;
mod source;

use clap::Parser;
use cli::{Cli, Commands, RunArgs};
use config::Config;
use error::ScheduleError;
use notify::{Notifier, TelegramCredentials, TelegramNotifier};
use page_model::PageModel;
use pdf_extract::TextCoverage;
use reqwest::Client;
use schedule::dates::{self, YearPolicy};
use schedule::{ExtractionResult, ExtractorSettings, MatchExtractor, RunClock};
use source::DocumentSource;
use std::path::PathBuf;
use std::time::Duration;
use time::{Date, UtcOffset};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_TEAM: &str = "I12";
const CALENDAR_FILE: &str = "calendar.pdf";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // init tracing
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Install crypto provider
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("A rustls crypto provider was already installed");
    }

    let cfg = Config::load_or_default(&cli.config)?;
    let client = Client::builder()
        .build()
        .map_err(|e| ScheduleError::Config(format!("HTTP client: {e}")))?;

    match cli.command {
        Commands::Run(args) => run(&cfg, &client, args).await?,
        Commands::Text { source, today } => dump_text(&cfg, &client, source, today).await?,
    }

    Ok(())
}

fn run_clock(cfg: &Config, today: Option<Date>) -> Result<RunClock, ScheduleError> {
    let offset = UtcOffset::from_hms(cfg.schedule.utc_offset_hours, 0, 0)
        .map_err(|e| ScheduleError::Config(format!("schedule.utc_offset_hours: {e}")))?;
    let clock = RunClock::now(offset);
    Ok(match today {
        Some(day) => clock.with_today(day),
        None => clock,
    })
}

fn resolve_source(cfg: &Config, arg: Option<String>) -> Result<DocumentSource, ScheduleError> {
    arg.or_else(|| cfg.source.url.clone())
        .map(|location| DocumentSource::parse(&location))
        .ok_or_else(|| {
            ScheduleError::Config("no calendar source: pass --source, set PDF_URL or source.url".into())
        })
}

async fn run(cfg: &Config, client: &Client, args: RunArgs) -> Result<(), ScheduleError> {
    let source = resolve_source(cfg, args.source)?;
    let team = if args.all_teams {
        None
    } else {
        Some(
            args.team
                .or_else(|| cfg.schedule.team.clone())
                .unwrap_or_else(|| DEFAULT_TEAM.to_string()),
        )
    };
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&cfg.output.dir));
    let clock = run_clock(cfg, args.today)?;

    info!(
        team = team.as_deref().unwrap_or("*"),
        today = %clock.today,
        output = %output_dir.display(),
        "Starting schedule run"
    );

    let document = source
        .fetch(
            client,
            Duration::from_secs(cfg.source.timeout_secs),
            Some(&output_dir.join(CALENDAR_FILE)),
        )
        .await?;

    info!(sha256 = %document.sha256, "Extracting schedule");
    let model = PageModel::load(&document.bytes)?;
    let result = if TextCoverage::of(&model).is_scanned() {
        warn!("Calendar looks scanned (no text layer); writing an empty result");
        ExtractionResult::empty(clock.generated_at)
    } else {
        let extractor = MatchExtractor::new(ExtractorSettings {
            colors: (&cfg.colors).into(),
            year_override: args.year.or(cfg.schedule.year),
            rollover_months: cfg.schedule.rollover_months,
        });
        extractor.extract(&model, team.as_deref(), &clock)
    };

    if result.is_empty() {
        info!("No matches today or on any later date");
    }

    let (json_path, txt_path) = output::write_outputs(&result, &output_dir)?;
    let day = result
        .match_date()
        .map(|d| format!(" on {d}"))
        .unwrap_or_default();
    println!(
        "Wrote {} and {} ({} matches{day})",
        json_path.display(),
        txt_path.display(),
        result.count()
    );

    if args.no_telegram || !cfg.notify.enabled {
        info!("Notification disabled");
        return Ok(());
    }

    let telegram = TelegramCredentials::from_env().map(|credentials| {
        TelegramNotifier::new(
            client.clone(),
            credentials,
            Duration::from_secs(cfg.notify.timeout_secs),
        )
    });
    notify::notify(
        telegram.as_ref().map(|n| n as &dyn Notifier),
        &result,
        team.as_deref(),
    )
    .await;

    Ok(())
}

/// Troubleshooting view for a calendar that yields nothing.
async fn dump_text(
    cfg: &Config,
    client: &Client,
    source: Option<String>,
    today: Option<Date>,
) -> Result<(), ScheduleError> {
    let source = resolve_source(cfg, source)?;
    let document = source
        .fetch(client, Duration::from_secs(cfg.source.timeout_secs), None)
        .await?;

    let model = PageModel::load(&document.bytes)?;
    let coverage = TextCoverage::of(&model);
    if coverage.is_scanned() {
        println!(
            "PDF is scanned/image-only ({} of {} pages without text), no date headers can be read.\n",
            coverage.textless.len(),
            coverage.pages
        );
        return Ok(());
    }

    println!("--- Text ---");
    println!("{}", pdf_extract::plain_text(&document.bytes)?);
    println!("--- End ---\n");

    let clock = run_clock(cfg, today)?;
    let policy = YearPolicy::for_document(
        cfg.schedule.year,
        &model.pages,
        clock.today,
        cfg.schedule.rollover_months,
    );
    println!("Year policy: {policy:?}\n");

    for page in &model.pages {
        println!("--- Page {} (height {:.0}) ---", page.number, page.height);
        for anchor in dates::build_index(&page.fragments, &policy) {
            println!("  anchor  y={:>7.1}  {}", anchor.vertical, anchor.date);
        }
        for cell in &page.cells {
            let fill = cell
                .fill
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none".to_string());
            println!(
                "  cell    y={:>7.1}  x={:>7.1}  fill={fill}  {:?}",
                cell.vertical, cell.horizontal, cell.text
            );
        }
    }
    for number in &model.skipped {
        println!("--- Page {number}: could not be decoded ---");
    }

    Ok(())
}
