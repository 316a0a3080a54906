//! Mock Korail client for dry runs without an account.
//!
//! Loads one schedule response from a JSON file and serves the trains on
//! the searched route and date. Every reservation succeeds.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::info;

use crate::domain::{
    ConfirmationRef, Itinerary, ReservationResult, SearchCriterion, SeatClass,
};
use crate::reserve::{AuthError, ReservationClient, SearchFailure};

use super::convert::convert_trains;
use super::error::KorailError;
use super::types::ScheduleResponse;

/// Mock client that serves a schedule loaded from a file.
#[derive(Debug, Clone)]
pub struct MockKorailClient {
    trains: Arc<Vec<Itinerary>>,
    reservations: Arc<AtomicU32>,
}

impl MockKorailClient {
    /// Load a schedule response (the same JSON the search endpoint returns).
    pub fn new(path: impl AsRef<Path>) -> Result<Self, KorailError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            KorailError::Convert(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Parse a schedule response body.
    pub fn from_json(json: &str) -> Result<Self, KorailError> {
        let schedule: ScheduleResponse =
            serde_json::from_str(json).map_err(|e| KorailError::Json {
                message: e.to_string(),
                body: None,
            })?;
        let trains = convert_trains(schedule.trains());

        Ok(Self {
            trains: Arc::new(trains),
            reservations: Arc::new(AtomicU32::new(0)),
        })
    }

    /// Number of trains loaded.
    pub fn len(&self) -> usize {
        self.trains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trains.is_empty()
    }

    /// Reservations made so far.
    pub fn reservations(&self) -> u32 {
        self.reservations.load(Ordering::SeqCst)
    }
}

impl ReservationClient for MockKorailClient {
    async fn search(&self, criterion: &SearchCriterion) -> Result<Vec<Itinerary>, SearchFailure> {
        Ok(self
            .trains
            .iter()
            .filter(|it| {
                it.departure_station == criterion.departure_station
                    && it.arrival_station == criterion.arrival_station
                    && it.departure.date() == criterion.date
            })
            .cloned()
            .collect())
    }

    async fn reserve(&self, itinerary: &Itinerary, seat: SeatClass) -> ReservationResult {
        let n = self.reservations.fetch_add(1, Ordering::SeqCst) + 1;
        let reference = format!("MOCK{n:04}-{}", itinerary.train_ref.train_no);
        info!(train = %itinerary, ?seat, %reference, "mock reservation");
        ReservationResult::Success(ConfirmationRef::new(reference))
    }

    async fn reauthenticate(&mut self) -> Result<(), AuthError> {
        Ok(())
    }
}
