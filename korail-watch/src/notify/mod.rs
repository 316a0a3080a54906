//! Notification sinks.
//!
//! The loop reports start, success and fatal termination as plain text.
//! Delivery failures are logged by the caller and never stop the loop.

mod telegram;

use std::future::Future;

pub use telegram::{TelegramConfig, TelegramNotifier};

/// Errors from delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service rejected the message
    #[error("rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Trait for notification sinks.
pub trait Notifier {
    fn notify(&self, text: &str) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// A notifier that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNotifier;

impl Notifier for NoNotifier {
    async fn notify(&self, _text: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Either a Telegram notifier or nothing, chosen from account settings.
#[derive(Debug, Clone)]
pub enum AnyNotifier {
    Telegram(TelegramNotifier),
    Disabled,
}

impl Notifier for AnyNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        match self {
            AnyNotifier::Telegram(t) => t.notify(text).await,
            AnyNotifier::Disabled => Ok(()),
        }
    }
}
