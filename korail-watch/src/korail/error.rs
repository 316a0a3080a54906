//! Korail client error types and their classification for the loop.

use crate::domain::{ReservationResult, TransientReason};
use crate::reserve::{AuthError, SearchFailure};

/// Message code: the session is missing or expired.
pub const CODE_NEED_LOGIN: &str = "P058";

/// Message code: the seat was sold before the claim.
pub const CODE_SOLD_OUT: &str = "ERR211161";

/// Message codes meaning "no trains match"; a normal, empty search.
pub const CODES_NO_RESULTS: &[&str] = &["P100", "WRG000000", "WRD000061", "WRT300005"];

/// Errors from the Korail HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum KorailError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Non-success HTTP status
    #[error("HTTP status {status}: {message}")]
    Status { status: u16, message: String },

    /// Session missing or expired
    #[error("login required")]
    NeedLogin,

    /// Seat sold before the claim completed
    #[error("sold out")]
    SoldOut,

    /// Provider reported a failure
    #[error("Korail error {code}: {message}")]
    Api { code: String, message: String },

    /// A response could not be turned into domain values
    #[error("unexpected response: {0}")]
    Convert(String),

    /// Korail accepted a reservation but returned no reservation number
    #[error("reservation state unknown; check the Korail app")]
    Unconfirmed,
}

impl KorailError {
    /// Build the error for a `FAIL` response from its message code.
    pub fn from_code(code: &str, message: &str) -> Self {
        match code {
            CODE_NEED_LOGIN => KorailError::NeedLogin,
            CODE_SOLD_OUT => KorailError::SoldOut,
            _ => KorailError::Api {
                code: code.to_string(),
                message: message.to_string(),
            },
        }
    }

    /// Whether the code is a "no results" answer rather than a failure.
    pub fn is_no_results(code: &str) -> bool {
        CODES_NO_RESULTS.contains(&code)
    }

    /// How the reservation loop should treat this error.
    ///
    /// Authorization and client-side HTTP rejections are permanent, as is
    /// an accepted reservation without a number. Every other failure is
    /// worth retrying.
    pub fn transient_reason(&self) -> Result<TransientReason, String> {
        match self {
            KorailError::Unconfirmed => Err(self.to_string()),
            KorailError::Http(e) if e.is_timeout() => Ok(TransientReason::Timeout),
            KorailError::Http(e) => Ok(TransientReason::Network(e.to_string())),
            KorailError::Status { status: 429, .. } => Ok(TransientReason::RateLimited),
            KorailError::Status { status, message } if (400..500).contains(status) => {
                Err(format!("HTTP status {status}: {message}"))
            }
            KorailError::NeedLogin => Ok(TransientReason::SessionExpired),
            other => Ok(TransientReason::Provider(other.to_string())),
        }
    }
}

impl From<KorailError> for SearchFailure {
    fn from(err: KorailError) -> Self {
        match err.transient_reason() {
            Ok(reason) => SearchFailure::Transient(reason),
            Err(reason) => SearchFailure::Fatal(reason),
        }
    }
}

impl From<KorailError> for ReservationResult {
    fn from(err: KorailError) -> Self {
        if matches!(err, KorailError::SoldOut) {
            return ReservationResult::NoSeatAvailable;
        }
        match err.transient_reason() {
            Ok(reason) => ReservationResult::TransientFailure(reason),
            Err(reason) => ReservationResult::FatalFailure(reason),
        }
    }
}

impl From<KorailError> for AuthError {
    fn from(err: KorailError) -> Self {
        match err {
            KorailError::Api { message, .. } => AuthError::Rejected(message),
            KorailError::Status { status, message } if (400..500).contains(&status) => {
                AuthError::Rejected(format!("HTTP status {status}: {message}"))
            }
            other => AuthError::Unavailable(other.to_string()),
        }
    }
}
