//! Outcome of a claim attempt.

use std::fmt;

use serde::Serialize;

/// Reference the provider assigns to a held reservation (Korail's PNR number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConfirmationRef(String);

impl ConfirmationRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfirmationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a retryable failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransientReason {
    /// The provider no longer recognises the session; log in again.
    SessionExpired,
    /// The call did not complete within the request timeout.
    Timeout,
    /// The provider asked us to slow down.
    RateLimited,
    /// Connection-level failure.
    Network(String),
    /// The provider reported a failure not known to be permanent.
    Provider(String),
}

impl TransientReason {
    /// Whether recovering requires a fresh login.
    pub fn needs_reauthentication(&self) -> bool {
        matches!(self, TransientReason::SessionExpired)
    }
}

impl fmt::Display for TransientReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransientReason::SessionExpired => f.write_str("session expired"),
            TransientReason::Timeout => f.write_str("request timed out"),
            TransientReason::RateLimited => f.write_str("rate limited"),
            TransientReason::Network(msg) => write!(f, "network error: {msg}"),
            TransientReason::Provider(msg) => write!(f, "provider error: {msg}"),
        }
    }
}

/// Result of one `reserve` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationResult {
    /// The seat is held; payment is still required in the Korail app.
    Success(ConfirmationRef),
    /// Someone else took the seat between search and claim.
    NoSeatAvailable,
    /// Retryable failure.
    TransientFailure(TransientReason),
    /// Permanent rejection (bad credentials, account block, invalid request).
    FatalFailure(String),
}

impl fmt::Display for ReservationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationResult::Success(reference) => write!(f, "reserved ({reference})"),
            ReservationResult::NoSeatAvailable => f.write_str("sold out"),
            ReservationResult::TransientFailure(reason) => write!(f, "transient failure: {reason}"),
            ReservationResult::FatalFailure(reason) => write!(f, "fatal failure: {reason}"),
        }
    }
}
