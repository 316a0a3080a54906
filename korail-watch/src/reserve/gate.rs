//! Process-wide serialization of claim attempts.

use std::sync::{Arc, OnceLock};

use tokio::sync::{Mutex, MutexGuard};

/// Allows at most one `reserve` call in flight at a time.
///
/// Every loop in the process shares [`ClaimGate::process`], so two runs
/// against the same account never claim concurrently.
#[derive(Debug, Clone)]
pub struct ClaimGate {
    lock: Arc<Mutex<()>>,
}

static PROCESS_GATE: OnceLock<ClaimGate> = OnceLock::new();

impl ClaimGate {
    /// A gate independent of every other gate.
    pub fn new() -> Self {
        Self {
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// The gate shared by the whole process.
    pub fn process() -> Self {
        PROCESS_GATE.get_or_init(ClaimGate::new).clone()
    }

    /// Wait for exclusive access. The claim is allowed while the guard lives.
    pub async fn enter(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    /// Whether a claim currently holds the gate.
    pub fn is_busy(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}

impl Default for ClaimGate {
    fn default() -> Self {
        Self::new()
    }
}
