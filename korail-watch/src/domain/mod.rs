//! Domain types for the seat watcher.
//!
//! This module contains validated value types for search criteria and the
//! itineraries a provider returns. All types enforce their invariants at
//! construction time, so code that receives these types can trust their
//! validity.

mod category;
mod criterion;
mod itinerary;
mod reservation;
mod station;
mod time;

pub use category::{InvalidCategory, SeatCategory, SeatClass, TrainCategory, TrainClass};
pub use criterion::SearchCriterion;
pub use itinerary::{Itinerary, TrainRef};
pub use reservation::{ConfirmationRef, ReservationResult, TransientReason};
pub use station::{InvalidStation, StationName};
pub use time::{
    HourWindow, TimeError, format_clock, format_travel_date, parse_clock, parse_hour,
    parse_travel_date,
};
