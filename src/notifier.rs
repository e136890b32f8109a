//! Telegram notifications for record changes.

use crate::config::TelegramConfig;
use crate::error::{Result, SudError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

const CREATED_TEMPLATE: &str = "\
The DNS record (A) for <b><u>{name}</u></b> has been created:

<span class=\"tg-spoiler\"><b>{address}</b></span>
";

const UPDATED_TEMPLATE: &str = "\
The DNS record (A) for <b><u>{name}</u></b> has been updated:

previous: <s>{previous}</s>
current: <span class=\"tg-spoiler\"><b>{address}</b></span>
";

/// Sink for record change notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce that `hostname` now points at `address`.
    ///
    /// `previous` is `None` when the record has just been created.
    async fn notify(&self, hostname: &str, address: &str, previous: Option<&str>) -> Result<()>;
}

/// Render the HTML message for a created or updated record.
pub fn render_message(hostname: &str, address: &str, previous: Option<&str>) -> String {
    match previous {
        None => CREATED_TEMPLATE
            .replace("{name}", hostname)
            .replace("{address}", address),
        Some(previous) => UPDATED_TEMPLATE
            .replace("{name}", hostname)
            .replace("{previous}", previous)
            .replace("{address}", address),
    }
}

/// Notifier posting to a Telegram chat through the Bot API.
///
/// Without a Telegram configuration every notification is a no-op.
pub struct TelegramNotifier {
    client: reqwest::Client,
    telegram: Option<TelegramConfig>,
    base_url: String,
}

impl TelegramNotifier {
    /// Create a notifier for the Telegram Bot API.
    pub fn new(telegram: Option<TelegramConfig>) -> Result<Self> {
        Self::with_base_url(telegram, DEFAULT_BASE_URL.to_string())
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(telegram: Option<TelegramConfig>, base_url: String) -> Result<Self> {
        Ok(Self {
            client: crate::http::client()?,
            telegram,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn open<'a>(&'a self, telegram: &'a TelegramConfig) -> BotSession<'a> {
        tracing::debug!(chat_id = telegram.chat_id, "Opening Telegram bot session");
        BotSession {
            client: &self.client,
            endpoint: format!("{}/bot{}/sendMessage", self.base_url, telegram.token),
            chat_id: telegram.chat_id,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, hostname: &str, address: &str, previous: Option<&str>) -> Result<()> {
        let Some(telegram) = &self.telegram else {
            return Ok(());
        };

        let session = self.open(telegram);
        session
            .send_message(&render_message(hostname, address, previous))
            .await
    }
}

/// A bot connection scoped to a single notification, released on drop.
struct BotSession<'a> {
    client: &'a reqwest::Client,
    endpoint: String,
    chat_id: i64,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl BotSession<'_> {
    async fn send_message(&self, text: &str) -> Result<()> {
        let request = SendMessageRequest {
            chat_id: self.chat_id,
            text,
            parse_mode: "HTML",
        };

        // The token is part of the URL, so transport errors must not carry it.
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| SudError::Notification(e.without_url().to_string()))?;

        let status = response.status();
        let reply: Option<BotApiResponse> = response.json().await.ok();

        match reply {
            Some(BotApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(BotApiResponse { description, .. }) => Err(SudError::Notification(
                description.unwrap_or_else(|| format!("HTTP {}", status)),
            )),
            None => Err(SudError::Notification(format!("HTTP {}", status))),
        }
    }
}

impl Drop for BotSession<'_> {
    fn drop(&mut self) {
        tracing::debug!(chat_id = self.chat_id, "Telegram bot session closed");
    }
}
