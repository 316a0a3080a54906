//! Loop settings from the environment.

use std::str::FromStr;
use std::time::Duration;

use super::error::ConfigError;
use crate::reserve::LoopConfig;

pub const ENV_POLL_INTERVAL: &str = "POLL_INTERVAL_SECS";
pub const ENV_MAX_ATTEMPTS: &str = "MAX_ATTEMPTS";
pub const ENV_BACKOFF_MULTIPLIER: &str = "BACKOFF_MULTIPLIER";
pub const ENV_REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT_SECS";
pub const ENV_SESSION_REFRESH: &str = "SESSION_REFRESH_MINS";

fn parse_setting<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidSetting {
            name,
            message: format!("'{raw}': {e}"),
        })
}

/// Apply overrides from `lookup` on top of `base`.
///
/// Unset or blank variables leave the base value. `MAX_ATTEMPTS=0` and
/// `SESSION_REFRESH_MINS=0` mean "no limit" and "never refresh".
pub fn loop_config_from(
    base: LoopConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<LoopConfig, ConfigError> {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let mut config = base;

    if let Some(raw) = get(ENV_POLL_INTERVAL) {
        let secs: u64 = parse_setting(ENV_POLL_INTERVAL, &raw)?;
        if secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: ENV_POLL_INTERVAL,
                message: "must be at least 1 second".to_string(),
            });
        }
        config = config.with_poll_interval(Duration::from_secs(secs));
    }

    if let Some(raw) = get(ENV_MAX_ATTEMPTS) {
        let max: u32 = parse_setting(ENV_MAX_ATTEMPTS, &raw)?;
        config = config.with_max_attempts((max > 0).then_some(max));
    }

    if let Some(raw) = get(ENV_BACKOFF_MULTIPLIER) {
        let multiplier: f64 = parse_setting(ENV_BACKOFF_MULTIPLIER, &raw)?;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(ConfigError::InvalidSetting {
                name: ENV_BACKOFF_MULTIPLIER,
                message: format!("'{raw}': must be a number >= 1"),
            });
        }
        config = config.with_backoff_multiplier(multiplier);
    }

    if let Some(raw) = get(ENV_REQUEST_TIMEOUT) {
        let secs: u64 = parse_setting(ENV_REQUEST_TIMEOUT, &raw)?;
        config = config.with_request_timeout(Duration::from_secs(secs.max(1)));
    }

    if let Some(raw) = get(ENV_SESSION_REFRESH) {
        let mins: u64 = parse_setting(ENV_SESSION_REFRESH, &raw)?;
        config = config.with_session_refresh((mins > 0).then(|| Duration::from_secs(mins * 60)));
    }

    Ok(config)
}

/// Default loop settings with overrides from the process environment.
pub fn loop_config_from_env() -> Result<LoopConfig, ConfigError> {
    loop_config_from(LoopConfig::default(), |name| std::env::var(name).ok())
}
