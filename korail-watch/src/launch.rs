//! Building the client and notifier for a run.
//!
//! Shared by the `run` command and the web panel so both log in and pick
//! a notifier the same way.

use std::path::PathBuf;

use tracing::info;

use crate::config::AccountSettings;
use crate::korail::{AnyClient, KorailClient, KorailConfig, MockKorailClient};
use crate::notify::{AnyNotifier, TelegramConfig, TelegramNotifier};
use crate::reserve::RunError;

/// Everything needed to open a session.
#[derive(Debug, Clone, Default)]
pub struct Launch {
    pub account: AccountSettings,
    pub korail: KorailConfig,
    /// Serve searches from this schedule file instead of logging in.
    pub mock: Option<PathBuf>,
}

impl Launch {
    pub fn new(account: AccountSettings) -> Self {
        Self {
            account,
            ..Self::default()
        }
    }

    pub fn with_korail(mut self, korail: KorailConfig) -> Self {
        self.korail = korail;
        self
    }

    pub fn with_mock(mut self, mock: Option<PathBuf>) -> Self {
        self.mock = mock;
        self
    }

    /// The notifier for these account settings.
    pub fn notifier(&self) -> Result<AnyNotifier, RunError> {
        match self.account.telegram() {
            Some(settings) => {
                let notifier = TelegramNotifier::new(TelegramConfig::from(settings))
                    .map_err(|e| RunError::Setup(e.to_string()))?;
                Ok(AnyNotifier::Telegram(notifier))
            }
            None => {
                info!("telegram not configured; notifications disabled");
                Ok(AnyNotifier::Disabled)
            }
        }
    }

    /// Log in (or load the mock schedule) and build the notifier.
    pub async fn connect(&self) -> Result<(AnyClient, AnyNotifier), RunError> {
        let notifier = self.notifier()?;

        let client = match &self.mock {
            Some(path) => {
                let mock =
                    MockKorailClient::new(path).map_err(|e| RunError::Setup(e.to_string()))?;
                info!(path = %path.display(), trains = mock.len(), "using mock schedule");
                AnyClient::Mock(mock)
            }
            None => {
                let credentials = self.account.credentials()?;
                let mut client = KorailClient::new(self.korail.clone(), credentials)
                    .map_err(|e| RunError::Setup(e.to_string()))?;
                info!("logging in");
                client.login().await?;
                AnyClient::Live(client)
            }
        };

        Ok((client, notifier))
    }
}
