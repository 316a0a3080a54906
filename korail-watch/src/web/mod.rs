//! Web control panel.
//!
//! Edits the account and criteria files, starts and stops a run, and
//! streams its log.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, END_OF_LOG, create_router};
pub use state::{AppState, RunStatus, Supervisor, SupervisorError};
