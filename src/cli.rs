use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use time::Date;
use time::macros::format_description;

#[derive(Parser)]
#[command(name = "match_schedule")]
#[command(about = "Extract the day's matches and shirt colors from a calendar PDF", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (TOML); missing file means defaults
    #[arg(short, long, global = true, default_value = "match_schedule.toml")]
    pub config: PathBuf,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the calendar, extract matches, write outputs, notify
    Run(RunArgs),

    /// Print the document text and the anchors/cells found on each page
    Text {
        /// Calendar URL or local path
        #[arg(short, long, env = "PDF_URL")]
        source: Option<String>,

        /// Run date used to resolve header years (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        today: Option<Date>,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Calendar URL or local path
    #[arg(short, long, env = "PDF_URL")]
    pub source: Option<String>,

    /// Team code to keep (exact match)
    #[arg(short, long, env = "TEAM_CODE", conflicts_with = "all_teams")]
    pub team: Option<String>,

    /// Keep every team
    #[arg(long)]
    pub all_teams: bool,

    /// Output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Override the run date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub today: Option<Date>,

    /// Year for every date header
    #[arg(long)]
    pub year: Option<i32>,

    /// Skip the Telegram notification even if credentials are set
    #[arg(long)]
    pub no_telegram: bool,
}

pub fn parse_date(s: &str) -> Result<Date, String> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}
