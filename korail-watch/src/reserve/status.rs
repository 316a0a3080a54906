//! Live loop status for observers (the web panel).

use serde::Serialize;
use tokio::sync::watch;

use super::termination::Termination;

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    Starting,
    Polling,
    Claiming,
    BackingOff,
    Succeeded,
    Failed,
    Exhausted,
    Cancelled,
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoopState::Succeeded | LoopState::Failed | LoopState::Exhausted | LoopState::Cancelled
        )
    }
}

/// Snapshot published after every state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopStatus {
    pub state: LoopState,
    /// Iterations started so far.
    pub attempt: u32,
    /// Transient failures seen so far.
    pub errors: u32,
    pub last_error: Option<String>,
    pub termination: Option<Termination>,
}

impl Default for LoopStatus {
    fn default() -> Self {
        Self {
            state: LoopState::Starting,
            attempt: 0,
            errors: 0,
            last_error: None,
            termination: None,
        }
    }
}

/// Publishes [`LoopStatus`] snapshots to any number of watchers.
#[derive(Debug)]
pub struct StatusReporter {
    tx: watch::Sender<LoopStatus>,
}

impl StatusReporter {
    pub fn new() -> (Self, watch::Receiver<LoopStatus>) {
        let (tx, rx) = watch::channel(LoopStatus::default());
        (Self { tx }, rx)
    }

    /// A reporter nobody is watching.
    pub fn detached() -> Self {
        Self::new().0
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut LoopStatus)) {
        self.tx.send_modify(f);
    }

    pub(crate) fn set_state(&self, state: LoopState) {
        self.update(|s| s.state = state);
    }

    pub fn current(&self) -> LoopStatus {
        self.tx.borrow().clone()
    }

    pub(crate) fn finish(&self, termination: &Termination) {
        let state = match termination {
            Termination::Success(_) => LoopState::Succeeded,
            Termination::Fatal(_) => LoopState::Failed,
            Termination::Exhausted { .. } => LoopState::Exhausted,
            Termination::Cancelled => LoopState::Cancelled,
        };
        self.update(|s| {
            s.state = state;
            s.termination = Some(termination.clone());
            if let Termination::Fatal(reason) = termination {
                s.last_error = Some(reason.clone());
            }
        });
    }
}
