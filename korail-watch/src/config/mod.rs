//! Account settings, loop settings, and configuration errors.

mod account;
mod error;
mod settings;

pub use account::{
    AccountFile, AccountSettings, Credentials, DEFAULT_ACCOUNT_FILE, TelegramSettings,
};
pub use error::ConfigError;
pub use settings::{
    ENV_BACKOFF_MULTIPLIER, ENV_MAX_ATTEMPTS, ENV_POLL_INTERVAL, ENV_REQUEST_TIMEOUT,
    ENV_SESSION_REFRESH, loop_config_from, loop_config_from_env,
};
