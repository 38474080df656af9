// src/notify.rs

use crate::error::{Result, ScheduleError};
use crate::output;
use crate::schedule::ExtractionResult;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// How many matches the summary lists.
const SUMMARY_LIMIT: usize = 5;

/// Delivers a human-readable run summary somewhere.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramCredentials {
    pub token: String,
    pub chat_id: String,
}

impl TelegramCredentials {
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Both values must be present and non-blank.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Some(Self {
            token: present(TOKEN_VAR)?,
            chat_id: present(CHAT_ID_VAR)?,
        })
    }
}

pub struct TelegramNotifier {
    client: Client,
    credentials: TelegramCredentials,
    timeout: Duration,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

impl TelegramNotifier {
    pub fn new(client: Client, credentials: TelegramCredentials, timeout: Duration) -> Self {
        Self {
            client,
            credentials,
            timeout,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.credentials.token
        );
        let body = SendMessage {
            chat_id: &self.credentials.chat_id,
            text: message,
            disable_web_page_preview: true,
        };

        // The token is part of the URL, so errors are reported without it.
        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ScheduleError::Notification(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ScheduleError::Notification(format!(
                "Telegram API error {status}: {text}"
            )));
        }
        Ok(())
    }
}

/// Summary text: header, count, and the first few matches.
pub fn build_message(result: &ExtractionResult, team: Option<&str>) -> String {
    let mut message = format!(
        "Calendario actualizado: {}\nPartidos encontrados: {}",
        team.unwrap_or("todos"),
        result.count()
    );

    let lines: Vec<String> = result
        .matches
        .iter()
        .take(SUMMARY_LIMIT)
        .filter_map(|m| output::format_line(m).ok())
        .map(|line| format!("- {line}"))
        .collect();

    if !lines.is_empty() {
        message.push_str("\n\n");
        message.push_str(&lines.join("\n"));
    }
    message
}

/// Send the summary if a notifier is configured. Failures are logged and
/// never propagate.
pub async fn notify(notifier: Option<&dyn Notifier>, result: &ExtractionResult, team: Option<&str>) {
    let Some(notifier) = notifier else {
        debug!("Notification skipped: no credentials");
        return;
    };

    let message = build_message(result, team);
    match notifier.send(&message).await {
        Ok(()) => info!(matches = result.count(), "Notification sent"),
        Err(e) => warn!(error = %e, "Notification failed"),
    }
}
