//! The booking provider as seen by the reservation loop.

use std::future::Future;

use crate::domain::{Itinerary, ReservationResult, SearchCriterion, SeatClass, TransientReason};

/// Failure of a login or re-login.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The provider rejected the credentials. Never retried.
    #[error("login rejected: {0}")]
    Rejected(String),

    /// The login could not be completed (network, timeout, provider hiccup).
    #[error("login failed: {0}")]
    Unavailable(String),
}

/// Failure of a search call.
///
/// "No trains" is not a failure; it is an empty result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchFailure {
    #[error("search failed: {0}")]
    Transient(TransientReason),

    #[error("search rejected: {0}")]
    Fatal(String),
}

/// Trait for the authenticated booking client.
///
/// The loop owns one client exclusively; the session lives inside it and is
/// renewed in place through [`ReservationClient::reauthenticate`]. This
/// abstraction allows the loop to be tested with scripted clients.
pub trait ReservationClient {
    /// Find trains for a criterion's route and date, starting at its
    /// earliest departure time. Returns an empty list when nothing runs.
    fn search(
        &self,
        criterion: &SearchCriterion,
    ) -> impl Future<Output = Result<Vec<Itinerary>, SearchFailure>> + Send;

    /// Try to hold a seat of the given class on an itinerary from `search`.
    fn reserve(
        &self,
        itinerary: &Itinerary,
        seat: SeatClass,
    ) -> impl Future<Output = ReservationResult> + Send;

    /// Replace the session with a fresh login.
    fn reauthenticate(&mut self) -> impl Future<Output = Result<(), AuthError>> + Send;
}
