// src/source.rs

use crate::error::{Result, ScheduleError};
use reqwest::Client;
use reqwest::header::USER_AGENT;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

const AGENT: &str = concat!("match_schedule/", env!("CARGO_PKG_VERSION"));

/// Where the calendar PDF comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Url(String),
    Path(PathBuf),
}

/// Raw document bytes plus their SHA-256, for logs.
#[derive(Debug)]
pub struct FetchedDocument {
    pub bytes: Vec<u8>,
    pub sha256: String,
}

impl DocumentSource {
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DocumentSource::Url(trimmed.to_string())
        } else {
            DocumentSource::Path(PathBuf::from(trimmed))
        }
    }

    /// Read or download the document. Downloads are also stored at
    /// `save_to` (written to a temporary file, then renamed).
    pub async fn fetch(
        &self,
        client: &Client,
        timeout: Duration,
        save_to: Option<&Path>,
    ) -> Result<FetchedDocument> {
        let bytes = match self {
            DocumentSource::Path(path) => {
                info!(path = %path.display(), "Reading calendar from disk");
                tokio::fs::read(path).await.map_err(|e| {
                    ScheduleError::SourceUnavailable(format!("{}: {e}", path.display()))
                })?
            }
            DocumentSource::Url(url) => {
                info!(url = %url, "Downloading calendar");
                let bytes = download(client, url, timeout).await?;
                if let Some(dest) = save_to {
                    store(dest, &bytes).await?;
                    info!(path = %dest.display(), "Saved downloaded calendar");
                }
                bytes
            }
        };

        let sha256 = fingerprint(&bytes);
        info!(bytes = bytes.len(), sha256 = %sha256, "Calendar loaded");
        Ok(FetchedDocument { bytes, sha256 })
    }
}

async fn download(client: &Client, url: &str, timeout: Duration) -> Result<Vec<u8>> {
    let unavailable = |e: reqwest::Error| ScheduleError::SourceUnavailable(format!("{url}: {e}"));

    let response = client
        .get(url)
        .header(USER_AGENT, AGENT)
        .timeout(timeout)
        .send()
        .await
        .map_err(unavailable)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScheduleError::SourceUnavailable(format!(
            "{url}: HTTP {status}"
        )));
    }

    let bytes = response.bytes().await.map_err(unavailable)?;
    Ok(bytes.to_vec())
}

async fn store(dest: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = dest.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, dest).await?;
    Ok(())
}

/// Lowercase hex SHA-256 of the document.
pub fn fingerprint(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}")
}
