//! Reservation loop configuration.

use std::time::Duration;

/// Configuration parameters for the reservation loop.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    /// Pause between polling iterations that found nothing.
    pub poll_interval: Duration,

    /// Stop with `Exhausted` after this many iterations. `None` polls forever.
    pub max_attempts: Option<u32>,

    /// Backoff after an errored iteration is `poll_interval` multiplied by
    /// this factor once per consecutive errored iteration.
    pub backoff_multiplier: f64,

    /// Upper bound on the backoff delay.
    pub max_backoff: Duration,

    /// Deadline for each search and reserve call. Expiry is a transient
    /// failure.
    pub request_timeout: Duration,

    /// Log in again when the session is older than this. `None` only
    /// re-logs in after the provider reports an expired session.
    pub session_refresh: Option<Duration>,

    /// Issue the searches of one iteration concurrently. Claims stay serial.
    pub parallel_search: bool,
}

impl LoopConfig {
    /// Set the polling interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Cap the number of iterations.
    pub fn with_max_attempts(mut self, max: Option<u32>) -> Self {
        self.max_attempts = max;
        self
    }

    /// Set the backoff multiplier. Values below 1.0 are treated as 1.0.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Set the backoff ceiling.
    pub fn with_max_backoff(mut self, max: Duration) -> Self {
        self.max_backoff = max;
        self
    }

    /// Set the per-call timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the periodic session refresh interval.
    pub fn with_session_refresh(mut self, refresh: Option<Duration>) -> Self {
        self.session_refresh = refresh;
        self
    }

    /// Enable or disable concurrent searches within an iteration.
    pub fn with_parallel_search(mut self, parallel: bool) -> Self {
        self.parallel_search = parallel;
        self
    }

    /// Delay before the next iteration after `consecutive_errors` errored
    /// iterations in a row (at least one).
    ///
    /// `poll_interval * multiplier^consecutive_errors`, capped at
    /// `max_backoff` but never below `poll_interval`.
    pub fn backoff_delay(&self, consecutive_errors: u32) -> Duration {
        let multiplier = self.backoff_multiplier.max(1.0);
        let exponent = consecutive_errors.min(32) as i32;
        let secs = self.poll_interval.as_secs_f64() * multiplier.powi(exponent);
        let ceiling = self.max_backoff.max(self.poll_interval);
        if !secs.is_finite() || secs >= ceiling.as_secs_f64() {
            return ceiling;
        }
        Duration::from_secs_f64(secs)
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_attempts: None,
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(60),
            request_timeout: Duration::from_secs(15),
            session_refresh: Some(Duration::from_secs(30 * 60)),
            parallel_search: false,
        }
    }
}
