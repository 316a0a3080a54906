//! Conversion from Korail DTOs to domain types.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use tracing::warn;

use crate::domain::{
    Itinerary, SeatClass, StationName, TrainCategory, TrainClass, TrainRef, parse_clock,
    parse_travel_date,
};

use super::error::KorailError;
use super::types::TrainInfo;

/// Availability code meaning seats can be reserved.
const SEATS_AVAILABLE: &str = "11";

/// Train class codes of the KTX family.
const EXPRESS_CLASS_CODES: &[&str] = &["00", "07", "10", "16", "19"];

/// Search filter code for a train category.
pub fn train_type_code(category: TrainCategory) -> &'static str {
    match category {
        TrainCategory::ExpressOnly => "100",
        TrainCategory::RegionalOnly => "102",
        TrainCategory::Any => "109",
    }
}

/// Seat class code used when reserving (`txtPsrmClCd`).
pub fn seat_class_code(seat: SeatClass) -> &'static str {
    match seat {
        SeatClass::Standard => "1",
        SeatClass::Premium => "2",
    }
}

/// Classify a train from its class code.
pub fn train_class(code: &str) -> TrainClass {
    if EXPRESS_CLASS_CODES.contains(&code) {
        TrainClass::Express
    } else {
        TrainClass::Regional
    }
}

/// Seat classes a train can currently be reserved in.
pub fn available_seats(info: &TrainInfo) -> BTreeSet<SeatClass> {
    let mut seats = BTreeSet::new();
    if info.h_gen_rsv_cd == SEATS_AVAILABLE {
        seats.insert(SeatClass::Standard);
    }
    if info.h_spe_rsv_cd == SEATS_AVAILABLE {
        seats.insert(SeatClass::Premium);
    }
    seats
}

fn date_time(field: &str, date: &str, time: &str) -> Result<NaiveDateTime, KorailError> {
    let invalid = |reason: &str| KorailError::Convert(format!("{field}: {reason}"));
    let date = parse_travel_date(date).map_err(|e| invalid(e.reason()))?;
    let time = parse_clock(time).map_err(|e| invalid(e.reason()))?;
    Ok(date.and_time(time))
}

fn station(field: &str, name: &str) -> Result<StationName, KorailError> {
    StationName::parse(name).map_err(|e| KorailError::Convert(format!("{field}: {e}")))
}

/// Convert one schedule entry into an [`Itinerary`].
///
/// When the arrival date is missing it is taken from the departure date,
/// rolling over to the next day for trains that arrive after midnight.
pub fn convert_train(info: &TrainInfo) -> Result<Itinerary, KorailError> {
    let departure = date_time("h_dpt_dt/h_dpt_tm", &info.h_dpt_dt, &info.h_dpt_tm)?;

    let arrival = if info.h_arv_dt.is_empty() {
        let same_day = date_time("h_arv_tm", &info.h_dpt_dt, &info.h_arv_tm)?;
        if same_day < departure {
            same_day + chrono::Duration::days(1)
        } else {
            same_day
        }
    } else {
        date_time("h_arv_dt/h_arv_tm", &info.h_arv_dt, &info.h_arv_tm)?
    };

    let train_name = if info.h_trn_clsf_nm.is_empty() {
        info.h_trn_clsf_cd.clone()
    } else {
        info.h_trn_clsf_nm.clone()
    };

    Ok(Itinerary {
        train_name,
        train_class: train_class(&info.h_trn_clsf_cd),
        departure_station: station("h_dpt_rs_stn_nm", &info.h_dpt_rs_stn_nm)?,
        arrival_station: station("h_arv_rs_stn_nm", &info.h_arv_rs_stn_nm)?,
        departure,
        arrival,
        available_seats: available_seats(info),
        train_ref: TrainRef {
            train_no: info.h_trn_no.clone(),
            train_class_code: info.h_trn_clsf_cd.clone(),
            train_group_code: info.h_trn_gp_cd.clone(),
            departure_station_code: info.h_dpt_rs_stn_cd.clone(),
            arrival_station_code: info.h_arv_rs_stn_cd.clone(),
            run_date: info.h_run_dt.clone(),
        },
    })
}

/// Convert every train in a schedule, in the order listed.
///
/// Entries that fail to convert are logged and left out.
pub fn convert_trains(trains: &[TrainInfo]) -> Vec<Itinerary> {
    trains
        .iter()
        .filter_map(|info| match convert_train(info) {
            Ok(itinerary) => Some(itinerary),
            Err(e) => {
                warn!(train = %info.h_trn_no, error = %e, "skipping train");
                None
            }
        })
        .collect()
}
