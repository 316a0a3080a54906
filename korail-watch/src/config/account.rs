//! Account credentials and notification settings.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Default file name for account settings.
pub const DEFAULT_ACCOUNT_FILE: &str = "account.json";

/// Account settings as stored on disk and edited in the web panel.
///
/// Blank fields fall back to the environment variables of the same name
/// (`KORAIL_ID`, `KORAIL_PW`, `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSettings {
    #[serde(default)]
    pub korail_id: String,
    #[serde(default)]
    pub korail_pw: String,
    #[serde(default)]
    pub telegram_bot_token: String,
    #[serde(default)]
    pub telegram_chat_id: String,
}

/// Korail login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Membership number, e-mail address, or phone number.
    pub id: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Telegram bot destination for notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
}

impl AccountSettings {
    /// Fill blank fields from a variable lookup (normally the process
    /// environment).
    pub fn with_fallback(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fill = |value: &mut String, name: &str| {
            if value.trim().is_empty()
                && let Some(v) = lookup(name)
            {
                *value = v;
            }
        };
        fill(&mut self.korail_id, "KORAIL_ID");
        fill(&mut self.korail_pw, "KORAIL_PW");
        fill(&mut self.telegram_bot_token, "TELEGRAM_BOT_TOKEN");
        fill(&mut self.telegram_chat_id, "TELEGRAM_CHAT_ID");
        self
    }

    /// Fill blank fields from the process environment.
    pub fn with_env_fallback(self) -> Self {
        self.with_fallback(|name| std::env::var(name).ok())
    }

    /// The login credentials; both fields are required.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let id = self.korail_id.trim();
        if id.is_empty() {
            return Err(ConfigError::MissingSetting("KORAIL_ID"));
        }
        if self.korail_pw.is_empty() {
            return Err(ConfigError::MissingSetting("KORAIL_PW"));
        }
        Ok(Credentials {
            id: id.to_string(),
            password: self.korail_pw.clone(),
        })
    }

    /// Telegram settings, if both token and chat id are present.
    pub fn telegram(&self) -> Option<TelegramSettings> {
        let token = self.telegram_bot_token.trim();
        let chat = self.telegram_chat_id.trim();
        if token.is_empty() || chat.is_empty() {
            return None;
        }
        Some(TelegramSettings {
            bot_token: token.to_string(),
            chat_id: chat.to_string(),
        })
    }
}

/// The account settings file.
#[derive(Debug, Clone)]
pub struct AccountFile {
    path: PathBuf,
}

impl AccountFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings; a missing file reads as all-blank.
    pub fn read(&self) -> Result<AccountSettings, ConfigError> {
        if !self.path.exists() {
            return Ok(AccountSettings::default());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Read {
            path: self.path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::Malformed {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Replace the settings file.
    pub fn write(&self, settings: &AccountSettings) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(settings).map_err(|e| ConfigError::Malformed {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, json + "\n").map_err(|e| ConfigError::Write {
            path: self.path.display().to_string(),
            source: e,
        })
    }
}

impl Default for AccountFile {
    fn default() -> Self {
        Self::new(DEFAULT_ACCOUNT_FILE)
    }
}
