// src/schedule/mod.rs

pub mod color;
pub mod dates;
mod extractor;

pub use extractor::{ExtractorSettings, MatchExtractor, RunClock};

use serde::Serialize;
use std::fmt;
use time::{Date, OffsetDateTime, Time};

/// A resolved date tied to a vertical position on a page.
///
/// `vertical` is measured from the top of the page, so smaller is higher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateAnchor {
    pub vertical: f64,
    pub date: Date,
}

/// Shirt color assigned to a team for one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShirtColor {
    Azul,
    Blanco,
}

impl ShirtColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShirtColor::Azul => "azul",
            ShirtColor::Blanco => "blanco",
        }
    }
}

impl fmt::Display for ShirtColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduled match for one team.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchRecord {
    pub team: String,
    pub date: Date,
    pub time: Time,
    pub color: ShirtColor,
}

/// Everything a run produced, handed read-only to the writer and notifier.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub generated_at: OffsetDateTime,
    pub matches: Vec<MatchRecord>,
}

impl ExtractionResult {
    pub fn empty(generated_at: OffsetDateTime) -> Self {
        Self {
            generated_at,
            matches: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// The single date every match shares, if any.
    pub fn match_date(&self) -> Option<Date> {
        self.matches.first().map(|m| m.date)
    }
}
