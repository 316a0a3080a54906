//! How a run ended.

use std::fmt;

use serde::Serialize;

use crate::domain::ConfirmationRef;

/// Terminal outcome of the reservation loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Termination {
    /// A seat is held. Payment must still be completed in the Korail app.
    Success(ConfirmationRef),
    /// The provider rejected us permanently; user action is needed.
    Fatal(String),
    /// The attempt cap was reached without a reservation.
    Exhausted { attempts: u32 },
    /// Stopped on request.
    Cancelled,
}

impl Termination {
    /// Process exit code for this outcome. Each outcome has its own code.
    pub fn exit_code(&self) -> u8 {
        match self {
            Termination::Success(_) => 0,
            Termination::Fatal(_) => 2,
            Termination::Exhausted { .. } => 3,
            Termination::Cancelled => 130,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Termination::Success(_))
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Success(reference) => write!(f, "SUCCESS: reserved {reference}"),
            Termination::Fatal(reason) => write!(f, "FATAL: {reason}"),
            Termination::Exhausted { attempts } => {
                write!(f, "EXHAUSTED: no seat after {attempts} attempts")
            }
            Termination::Cancelled => f.write_str("CANCELLED"),
        }
    }
}
