//! Korail cancelled-ticket watcher.
//!
//! Polls Korail for trains matching a list of search criteria and
//! reserves the first seat that frees up. Payment is left to the user.

pub mod config;
pub mod criteria;
pub mod domain;
pub mod korail;
pub mod launch;
pub mod notify;
pub mod reserve;
pub mod telemetry;
pub mod web;
