//! Matching itineraries against a criterion.
//!
//! Pure functions: the same inputs always give the same survivors, in the
//! order the provider returned them.

use crate::domain::{Itinerary, SearchCriterion, SeatClass};

/// Whether an itinerary satisfies a criterion.
///
/// All of:
/// - departs at or after the criterion's earliest departure,
/// - departs in an hour within the preferred window (inclusive),
/// - train class accepted by the train category,
/// - an available seat class accepted by the seat category.
pub fn matches(criterion: &SearchCriterion, itinerary: &Itinerary) -> bool {
    itinerary.departure >= criterion.earliest_departure()
        && criterion
            .preferred_hours
            .contains(itinerary.departure_hour())
        && criterion.train_category.matches(itinerary.train_class)
        && criterion
            .seat_category
            .accepts(&itinerary.available_seats)
}

/// Keep the itineraries that satisfy the criterion, preserving order.
pub fn filter_itineraries<'a>(
    criterion: &SearchCriterion,
    itineraries: &'a [Itinerary],
) -> Vec<&'a Itinerary> {
    itineraries
        .iter()
        .filter(|it| matches(criterion, it))
        .collect()
}

/// An itinerary chosen for a claim, with the seat class to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub itinerary: &'a Itinerary,
    pub seat: SeatClass,
}

/// Pick the earliest-departing matching itinerary.
///
/// Ties keep the one the provider listed first.
pub fn pick_candidate<'a>(
    criterion: &SearchCriterion,
    itineraries: &'a [Itinerary],
) -> Option<Candidate<'a>> {
    let itinerary = filter_itineraries(criterion, itineraries)
        .into_iter()
        .min_by_key(|it| it.departure)?;
    let seat = criterion
        .seat_category
        .choose(&itinerary.available_seats)?;
    Some(Candidate { itinerary, seat })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{
        HourWindow, SeatCategory, StationName, TrainCategory, TrainClass, TrainRef,
    };
    use chrono::{NaiveDate, NaiveTime};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
    }

    fn train_category() -> impl Strategy<Value = TrainCategory> {
        prop_oneof![
            Just(TrainCategory::ExpressOnly),
            Just(TrainCategory::RegionalOnly),
            Just(TrainCategory::Any),
        ]
    }

    fn seat_category() -> impl Strategy<Value = SeatCategory> {
        prop_oneof![
            Just(SeatCategory::Standard),
            Just(SeatCategory::Premium),
            Just(SeatCategory::Any),
        ]
    }

    fn train_class() -> impl Strategy<Value = TrainClass> {
        prop_oneof![Just(TrainClass::Express), Just(TrainClass::Regional)]
    }

    fn seats() -> impl Strategy<Value = BTreeSet<SeatClass>> {
        (any::<bool>(), any::<bool>()).prop_map(|(standard, premium)| {
            let mut set = BTreeSet::new();
            if standard {
                set.insert(SeatClass::Standard);
            }
            if premium {
                set.insert(SeatClass::Premium);
            }
            set
        })
    }

    fn criterion() -> impl Strategy<Value = SearchCriterion> {
        (
            0u32..24,
            0u32..60,
            0u8..24,
            0u8..24,
            train_category(),
            seat_category(),
        )
            .prop_map(|(hh, mm, a, b, tc, sc)| {
                SearchCriterion::new(
                    StationName::parse("서울").unwrap(),
                    StationName::parse("부산").unwrap(),
                    date(),
                    NaiveTime::from_hms_opt(hh, mm, 0).unwrap(),
                )
                .with_hours(HourWindow::new(a.min(b), a.max(b)).unwrap())
                .with_train_category(tc)
                .with_seat_category(sc)
            })
    }

    fn itinerary() -> impl Strategy<Value = Itinerary> {
        (0u32..24, 0u32..60, train_class(), seats(), "[0-9]{1,4}").prop_map(
            |(hh, mm, class, seats, no)| Itinerary {
                train_name: "TEST".to_string(),
                train_class: class,
                departure_station: StationName::parse("서울").unwrap(),
                arrival_station: StationName::parse("부산").unwrap(),
                departure: date().and_hms_opt(hh, mm, 0).unwrap(),
                arrival: date().and_hms_opt(23, 59, 0).unwrap(),
                available_seats: seats,
                train_ref: TrainRef {
                    train_no: no,
                    ..TrainRef::default()
                },
            },
        )
    }

    proptest! {
        /// An itinerary passes exactly when every individual condition holds
        #[test]
        fn filter_iff_all_conditions(c in criterion(), it in itinerary()) {
            let time_ok = it.departure.time() >= c.earliest_departure_time;
            let hour = it.departure_hour();
            let hour_ok = u32::from(c.preferred_hour_start()) <= hour
                && hour <= u32::from(c.preferred_hour_end());
            let train_ok = c.train_category == TrainCategory::Any
                || c.train_category.matches(it.train_class);
            let seat_ok = match c.seat_category {
                SeatCategory::Any => !it.available_seats.is_empty(),
                SeatCategory::Standard => it.available_seats.contains(&SeatClass::Standard),
                SeatCategory::Premium => it.available_seats.contains(&SeatClass::Premium),
            };

            prop_assert_eq!(matches(&c, &it), time_ok && hour_ok && train_ok && seat_ok);
        }

        /// Filtering twice gives the same survivors as filtering once
        #[test]
        fn filter_is_idempotent(c in criterion(), its in prop::collection::vec(itinerary(), 0..12)) {
            let once: Vec<Itinerary> = filter_itineraries(&c, &its).into_iter().cloned().collect();
            let twice: Vec<Itinerary> = filter_itineraries(&c, &once).into_iter().cloned().collect();
            prop_assert_eq!(once, twice);
        }

        /// The candidate, when present, passes the filter and no survivor departs earlier
        #[test]
        fn candidate_is_earliest_survivor(c in criterion(), its in prop::collection::vec(itinerary(), 0..12)) {
            let survivors = filter_itineraries(&c, &its);
            match pick_candidate(&c, &its) {
                None => prop_assert!(survivors.is_empty()),
                Some(candidate) => {
                    prop_assert!(matches(&c, candidate.itinerary));
                    prop_assert!(candidate.itinerary.available_seats.contains(&candidate.seat));
                    for s in survivors {
                        prop_assert!(s.departure >= candidate.itinerary.departure);
                    }
                }
            }
        }
    }
}
