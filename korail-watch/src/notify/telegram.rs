//! Telegram Bot API notifier.

use serde::Serialize;

use super::{Notifier, NotifyError};
use crate::config::TelegramSettings;

/// Default base URL for the Telegram Bot API.
const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Configuration for the Telegram notifier.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    /// Base URL for the API (defaults to api.telegram.org)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.bot_token)
    }
}

impl From<TelegramSettings> for TelegramConfig {
    fn from(settings: TelegramSettings) -> Self {
        Self::new(settings.bot_token, settings.chat_id)
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Sends each notification as a chat message from a bot.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http: reqwest::Client,
    url: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.send_message_url(),
            chat_id: config.chat_id,
        })
    }
}

impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
        };

        let response = self.http.post(&self.url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
