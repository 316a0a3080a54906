//! Time source for the reservation loop.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Provides the current instant and sleeping.
///
/// Injected into the loop so tests can simulate elapsed time without real
/// delays.
pub trait Clock {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// The tokio runtime clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
