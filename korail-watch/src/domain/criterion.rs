//! A user's search criterion.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::category::{SeatCategory, TrainCategory};
use super::station::StationName;
use super::time::HourWindow;

/// One itinerary filter: route, date, time window and category preferences.
///
/// Constructed from a validated criteria record and never mutated during a
/// run. The hour window invariant (`start <= end`) is carried by
/// [`HourWindow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriterion {
    pub departure_station: StationName,
    pub arrival_station: StationName,
    pub date: NaiveDate,
    /// Trains leaving before this time on `date` are ignored. Also sent to
    /// the provider as the search start time.
    pub earliest_departure_time: NaiveTime,
    pub preferred_hours: HourWindow,
    pub train_category: TrainCategory,
    pub seat_category: SeatCategory,
}

impl SearchCriterion {
    /// Create a criterion with the whole day as the preferred window and
    /// default categories (KTX, any seat).
    pub fn new(
        departure_station: StationName,
        arrival_station: StationName,
        date: NaiveDate,
        earliest_departure_time: NaiveTime,
    ) -> Self {
        Self {
            departure_station,
            arrival_station,
            date,
            earliest_departure_time,
            preferred_hours: HourWindow::FULL_DAY,
            train_category: TrainCategory::default(),
            seat_category: SeatCategory::default(),
        }
    }

    /// Set the preferred departure hours.
    pub fn with_hours(mut self, window: HourWindow) -> Self {
        self.preferred_hours = window;
        self
    }

    /// Set the accepted train category.
    pub fn with_train_category(mut self, category: TrainCategory) -> Self {
        self.train_category = category;
        self
    }

    /// Set the accepted seat category.
    pub fn with_seat_category(mut self, category: SeatCategory) -> Self {
        self.seat_category = category;
        self
    }

    /// First hour of the preferred window.
    pub fn preferred_hour_start(&self) -> u8 {
        self.preferred_hours.start()
    }

    /// Last hour of the preferred window (inclusive).
    pub fn preferred_hour_end(&self) -> u8 {
        self.preferred_hours.end()
    }

    /// The earliest acceptable departure as a date-time.
    pub fn earliest_departure(&self) -> NaiveDateTime {
        self.date.and_time(self.earliest_departure_time)
    }
}

impl fmt::Display for SearchCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{} ({} from {}, {}) [{}, {} seats]",
            self.departure_station,
            self.arrival_station,
            self.date.format("%Y-%m-%d"),
            self.earliest_departure_time.format("%H:%M"),
            self.preferred_hours,
            self.train_category,
            self.seat_category,
        )
    }
}
