// src/pdf_extract.rs

use crate::error::{Result, ScheduleError};
use crate::page_model::PageModel;
use tracing::{info, warn};

/// Share of text-less pages from which a calendar counts as scanned.
const SCANNED_RATIO: f64 = 0.8;

/// Which decoded pages of a calendar carry a text layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCoverage {
    pub pages: usize,
    /// Pages that drew no text at all, by number.
    pub textless: Vec<u32>,
}

impl TextCoverage {
    pub fn of(model: &PageModel) -> Self {
        let textless: Vec<u32> = model
            .pages
            .iter()
            .filter(|page| page.fragments.is_empty())
            .map(|page| page.number)
            .collect();
        let coverage = Self {
            pages: model.pages.len(),
            textless,
        };
        info!(
            pages = coverage.pages,
            textless = ?coverage.textless,
            "Text layer check"
        );
        coverage
    }

    /// Date headers cannot be read off a calendar that is mostly images.
    pub fn is_scanned(&self) -> bool {
        self.pages > 0 && self.textless.len() as f64 / self.pages as f64 >= SCANNED_RATIO
    }
}

/// Plain text of the whole calendar, for the `text` subcommand.
pub fn plain_text(pdf_bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(pdf_bytes).map_err(|e| {
        warn!(error = %e, "pdf-extract could not read the calendar");
        ScheduleError::SourceUnavailable(format!("failed to extract text: {e}"))
    })
}
