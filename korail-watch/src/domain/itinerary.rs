//! Itineraries returned by a search.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDateTime, Timelike};

use super::category::{SeatClass, TrainClass};
use super::station::StationName;

/// Provider-side identifiers needed to reserve a specific train.
///
/// Opaque to the reservation loop; filled in by the client that produced
/// the itinerary and read back by the same client when claiming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainRef {
    pub train_no: String,
    pub train_class_code: String,
    pub train_group_code: String,
    pub departure_station_code: String,
    pub arrival_station_code: String,
    pub run_date: String,
}

/// A concrete departure offered by the provider.
///
/// Read-only; discarded after one filtering pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itinerary {
    /// Display name of the train type, e.g. "KTX-산천".
    pub train_name: String,
    pub train_class: TrainClass,
    pub departure_station: StationName,
    pub arrival_station: StationName,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub available_seats: BTreeSet<SeatClass>,
    pub train_ref: TrainRef,
}

impl Itinerary {
    /// Hour of day of the departure (0-23).
    pub fn departure_hour(&self) -> u32 {
        self.departure.hour()
    }

    /// Whether any seat class is available.
    pub fn has_any_seat(&self) -> bool {
        !self.available_seats.is_empty()
    }

    /// Whether a given seat class is available.
    pub fn has_seat(&self, class: SeatClass) -> bool {
        self.available_seats.contains(&class)
    }
}

/// Human-readable one-line summary, e.g.
/// `[KTX 101] 02/14 서울~부산 (08:10~10:49) [special: no, general: yes]`.
impl fmt::Display for Itinerary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |class| if self.has_seat(class) { "yes" } else { "no" };
        write!(
            f,
            "[{} {}] {} {}~{} ({}~{}) [special: {}, general: {}]",
            self.train_name,
            self.train_ref.train_no,
            self.departure.format("%m/%d"),
            self.departure_station,
            self.arrival_station,
            self.departure.format("%H:%M"),
            self.arrival.format("%H:%M"),
            yes_no(SeatClass::Premium),
            yes_no(SeatClass::Standard),
        )
    }
}
