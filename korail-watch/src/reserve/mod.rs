//! The reservation loop.
//!
//! Each iteration searches every criterion in order, filters the results,
//! and claims the earliest matching train. The loop ends on a held seat, a
//! fatal rejection, the attempt cap, or cancellation.
//!
//! # Example
//!
//! ```ignore
//! let mut lp = ReservationLoop::new(client, NoNotifier, LoopConfig::default());
//! let termination = lp.run(&criteria).await?;
//! std::process::exit(termination.exit_code().into());
//! ```

mod cancel;
mod client;
mod clock;
mod config;
mod filter;
mod gate;
mod runner;
mod status;
mod termination;

pub use cancel::{CancelHandle, CancelToken, cancel_pair};
pub use client::{AuthError, ReservationClient, SearchFailure};
pub use clock::{Clock, TokioClock};
pub use config::LoopConfig;
pub use filter::{Candidate, filter_itineraries, matches, pick_candidate};
pub use gate::ClaimGate;
pub use runner::{ReservationLoop, RunError};
pub use status::{LoopState, LoopStatus, StatusReporter};
pub use termination::Termination;
