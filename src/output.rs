// src/output.rs

use crate::error::Result;
use crate::schedule::{ExtractionResult, MatchRecord, ShirtColor};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use tracing::info;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

pub const JSON_FILE: &str = "matches.json";
pub const TEXT_FILE: &str = "matches.txt";

#[derive(Debug, Serialize)]
struct Report {
    generated_at: String,
    count: usize,
    matches: Vec<ReportMatch>,
}

#[derive(Debug, Serialize)]
struct ReportMatch {
    team: String,
    date: String,
    time: String,
    color: ShirtColor,
}

impl ReportMatch {
    fn from_record(m: &MatchRecord) -> Result<Self> {
        Ok(Self {
            team: m.team.clone(),
            date: format_date(m)?,
            time: format_time(m)?,
            color: m.color,
        })
    }
}

fn format_date(m: &MatchRecord) -> Result<String> {
    Ok(m.date.format(DATE_FORMAT)?)
}

fn format_time(m: &MatchRecord) -> Result<String> {
    Ok(m.time.format(TIME_FORMAT)?)
}

/// `YYYY-MM-DD HH:MM TEAM color`
pub fn format_line(m: &MatchRecord) -> Result<String> {
    Ok(format!(
        "{} {} {} {}",
        format_date(m)?,
        format_time(m)?,
        m.team,
        m.color
    ))
}

/// The structured form, pretty-printed.
pub fn render_json(result: &ExtractionResult) -> Result<String> {
    let report = Report {
        generated_at: result.generated_at.format(&Rfc3339)?,
        count: result.count(),
        matches: result
            .matches
            .iter()
            .map(ReportMatch::from_record)
            .collect::<Result<_>>()?,
    };
    Ok(serde_json::to_string_pretty(&report)? + "\n")
}

/// The plain-line form; empty when there are no matches.
pub fn render_text(result: &ExtractionResult) -> Result<String> {
    let mut out = String::new();
    for m in &result.matches {
        out.push_str(&format_line(m)?);
        out.push('\n');
    }
    Ok(out)
}

/// Write `matches.json` and `matches.txt` into `dir`, creating it if needed.
pub fn write_outputs(result: &ExtractionResult, dir: &Path) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)?;

    let json_path = dir.join(JSON_FILE);
    let txt_path = dir.join(TEXT_FILE);

    fs::write(&json_path, render_json(result)?)?;
    fs::write(&txt_path, render_text(result)?)?;

    info!(
        json = %json_path.display(),
        txt = %txt_path.display(),
        matches = result.count(),
        "Wrote outputs"
    );
    Ok((json_path, txt_path))
}
