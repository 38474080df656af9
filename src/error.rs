use thiserror::Error;

/// Failures that can surface from a schedule run.
///
/// Only `SourceUnavailable`, `Config` and output I/O abort a run. Page and
/// notification failures are logged by the caller and the run continues.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("document source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("page {page} could not be decoded: {reason}")]
    PageParse { page: u32, reason: String },

    #[error("notification failed: {0}")]
    Notification(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("date formatting error: {0}")]
    Format(#[from] time::error::Format),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
