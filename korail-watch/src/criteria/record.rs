//! Raw criteria records as stored in the JSON criteria file.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::domain::{
    HourWindow, SearchCriterion, SeatCategory, StationName, TrainCategory, parse_clock,
    parse_hour, parse_travel_date,
};

fn default_train_type() -> String {
    TrainCategory::default().as_config_str().to_string()
}

fn default_seat_type() -> String {
    SeatCategory::default().as_config_str().to_string()
}

/// One entry of the criteria file, before validation.
///
/// Field names and formats match the file the web panel edits:
///
/// ```json
/// {
///   "dep_station": "서울",
///   "arr_station": "부산",
///   "dep_date": "20260214",
///   "dep_time": "070000",
///   "train_type": "KTX",
///   "time_start": "07",
///   "time_end": "10",
///   "seat_type": "general"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionRecord {
    pub dep_station: String,
    pub arr_station: String,
    /// YYYYMMDD
    pub dep_date: String,
    /// HHMMSS
    pub dep_time: String,
    #[serde(default = "default_train_type")]
    pub train_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
    #[serde(default = "default_seat_type")]
    pub seat_type: String,
}

impl CriterionRecord {
    /// Validate this record into a [`SearchCriterion`].
    ///
    /// `index` is the record's position in the file and is used to name the
    /// offending field in errors.
    pub fn validate(&self, index: usize) -> Result<SearchCriterion, ConfigError> {
        let field_err = |field: &'static str, message: String| ConfigError::InvalidField {
            index,
            field,
            message,
        };

        let departure_station = StationName::parse(&self.dep_station)
            .map_err(|e| field_err("dep_station", e.to_string()))?;
        let arrival_station = StationName::parse(&self.arr_station)
            .map_err(|e| field_err("arr_station", e.to_string()))?;

        if departure_station == arrival_station {
            return Err(ConfigError::InvalidRecord {
                index,
                message: format!("departure and arrival are both {departure_station}"),
            });
        }

        let date =
            parse_travel_date(&self.dep_date).map_err(|e| field_err("dep_date", e.to_string()))?;
        let earliest =
            parse_clock(&self.dep_time).map_err(|e| field_err("dep_time", e.to_string()))?;

        let train_category: TrainCategory = self
            .train_type
            .parse()
            .map_err(|e: crate::domain::InvalidCategory| field_err("train_type", e.to_string()))?;
        let seat_category: SeatCategory = self
            .seat_type
            .parse()
            .map_err(|e: crate::domain::InvalidCategory| field_err("seat_type", e.to_string()))?;

        let start = match non_empty(&self.time_start) {
            Some(s) => parse_hour(s).map_err(|e| field_err("time_start", e.to_string()))?,
            None => HourWindow::FULL_DAY.start(),
        };
        let end = match non_empty(&self.time_end) {
            Some(s) => parse_hour(s).map_err(|e| field_err("time_end", e.to_string()))?,
            None => HourWindow::FULL_DAY.end(),
        };
        let window = HourWindow::new(start, end).map_err(|e| {
            field_err(
                "time_end",
                format!("{} (window {start:02}-{end:02})", e.reason()),
            )
        })?;

        Ok(
            SearchCriterion::new(departure_station, arrival_station, date, earliest)
                .with_hours(window)
                .with_train_category(train_category)
                .with_seat_category(seat_category),
        )
    }
}

/// Treat blank strings from form submissions as absent.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Validate every record, failing on the first invalid one.
pub fn validate_records(records: &[CriterionRecord]) -> Result<Vec<SearchCriterion>, ConfigError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| record.validate(index))
        .collect()
}
