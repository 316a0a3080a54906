//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::config::AccountSettings;

/// Acknowledgement for mutating endpoints.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Account settings as shown in the panel. Secrets are never sent back.
#[derive(Debug, Serialize)]
pub struct AccountView {
    pub korail_id: String,

    /// Whether a password is stored
    pub korail_pw_set: bool,

    /// Whether a bot token is stored
    pub telegram_bot_token_set: bool,

    pub telegram_chat_id: String,
}

impl From<&AccountSettings> for AccountView {
    fn from(settings: &AccountSettings) -> Self {
        Self {
            korail_id: settings.korail_id.clone(),
            korail_pw_set: !settings.korail_pw.is_empty(),
            telegram_bot_token_set: !settings.telegram_bot_token.is_empty(),
            telegram_chat_id: settings.telegram_chat_id.clone(),
        }
    }
}

/// Account settings submitted from the panel.
///
/// Absent fields are left unchanged. Secrets are only replaced when a
/// non-empty value is sent, so the form can leave them blank.
#[derive(Debug, Default, Deserialize)]
pub struct AccountUpdate {
    pub korail_id: Option<String>,
    pub korail_pw: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl AccountUpdate {
    /// Apply this update on top of the stored settings.
    pub fn apply(self, mut settings: AccountSettings) -> AccountSettings {
        if let Some(id) = self.korail_id {
            settings.korail_id = id.trim().to_string();
        }
        if let Some(pw) = self.korail_pw.filter(|pw| !pw.is_empty()) {
            settings.korail_pw = pw;
        }
        if let Some(token) = self.telegram_bot_token.filter(|t| !t.trim().is_empty()) {
            settings.telegram_bot_token = token.trim().to_string();
        }
        if let Some(chat) = self.telegram_chat_id {
            settings.telegram_chat_id = chat.trim().to_string();
        }
        settings
    }
}
