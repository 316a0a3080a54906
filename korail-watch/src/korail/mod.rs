//! Korail mobile API client.
//!
//! This module provides an HTTP client for the Korail smartphone ticketing
//! API, which the loop uses to search trains and hold seats.
//!
//! Key characteristics of the API:
//! - The session is a cookie set by the login call; it expires silently
//!   and is reported with message code `P058`
//! - Every response carries `strResult` (`SUCC`/`FAIL`) and a message code
//! - "No trains" is reported as a failure code and is mapped to an empty
//!   result here

mod client;
mod convert;
mod error;
mod mock;
mod types;

use crate::domain::{Itinerary, ReservationResult, SearchCriterion, SeatClass};
use crate::reserve::{AuthError, ReservationClient, SearchFailure};

pub use client::{KorailClient, KorailConfig, Session};
pub use convert::{convert_train, convert_trains, train_class};
pub use error::KorailError;
pub use mock::MockKorailClient;
pub use types::{Envelope, ScheduleResponse, TrainInfo};

/// The live client or the file-backed mock, chosen at startup.
#[derive(Debug)]
pub enum AnyClient {
    Live(KorailClient),
    Mock(MockKorailClient),
}

impl ReservationClient for AnyClient {
    async fn search(&self, criterion: &SearchCriterion) -> Result<Vec<Itinerary>, SearchFailure> {
        match self {
            AnyClient::Live(client) => client.search(criterion).await,
            AnyClient::Mock(client) => client.search(criterion).await,
        }
    }

    async fn reserve(&self, itinerary: &Itinerary, seat: SeatClass) -> ReservationResult {
        match self {
            AnyClient::Live(client) => client.reserve(itinerary, seat).await,
            AnyClient::Mock(client) => client.reserve(itinerary, seat).await,
        }
    }

    async fn reauthenticate(&mut self) -> Result<(), AuthError> {
        match self {
            AnyClient::Live(client) => client.reauthenticate().await,
            AnyClient::Mock(client) => client.reauthenticate().await,
        }
    }
}
