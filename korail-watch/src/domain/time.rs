//! Travel date and clock handling for the Korail API.
//!
//! Korail exchanges dates as "YYYYMMDD" and times of day as "HHMMSS"
//! strings. This module parses those into chrono values and provides the
//! hour window used to express a preferred departure period.

use std::fmt;

use chrono::{NaiveDate, NaiveTime, Timelike};

/// Error returned when parsing an invalid date, time, or hour.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }

    /// The human-readable reason for the failure.
    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

/// Parse a travel date in "YYYYMMDD" format.
///
/// # Examples
///
/// ```
/// use korail_watch::domain::parse_travel_date;
/// use chrono::NaiveDate;
///
/// assert_eq!(
///     parse_travel_date("20260214").unwrap(),
///     NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
/// );
/// assert!(parse_travel_date("2026-02-14").is_err());
/// assert!(parse_travel_date("20260230").is_err());
/// ```
pub fn parse_travel_date(s: &str) -> Result<NaiveDate, TimeError> {
    let bytes = s.as_bytes();
    if bytes.len() != 8 || !bytes.iter().all(u8::is_ascii_digit) {
        return Err(TimeError::new("expected YYYYMMDD format"));
    }

    let year = parse_digits(&bytes[0..4]) as i32;
    let month = parse_digits(&bytes[4..6]);
    let day = parse_digits(&bytes[6..8]);

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| TimeError::new("no such calendar date"))
}

/// Parse a time of day in "HHMMSS" or "HHMM" format.
///
/// # Examples
///
/// ```
/// use korail_watch::domain::parse_clock;
/// use chrono::NaiveTime;
///
/// assert_eq!(parse_clock("070000").unwrap(), NaiveTime::from_hms_opt(7, 0, 0).unwrap());
/// assert_eq!(parse_clock("0810").unwrap(), NaiveTime::from_hms_opt(8, 10, 0).unwrap());
/// assert!(parse_clock("24:00").is_err());
/// assert!(parse_clock("250000").is_err());
/// ```
pub fn parse_clock(s: &str) -> Result<NaiveTime, TimeError> {
    let bytes = s.as_bytes();
    if !(bytes.len() == 4 || bytes.len() == 6) || !bytes.iter().all(u8::is_ascii_digit) {
        return Err(TimeError::new("expected HHMMSS format"));
    }

    let hour = parse_digits(&bytes[0..2]);
    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }

    let minute = parse_digits(&bytes[2..4]);
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    let second = if bytes.len() == 6 {
        parse_digits(&bytes[4..6])
    } else {
        0
    };
    if second > 59 {
        return Err(TimeError::new("second must be 0-59"));
    }

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| TimeError::new("invalid time"))
}

/// Parse an hour of day ("7", "07", "23").
pub fn parse_hour(s: &str) -> Result<u8, TimeError> {
    let s = s.trim();
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeError::new("expected an hour number"));
    }

    let hour = parse_digits(s.as_bytes());
    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }

    Ok(hour as u8)
}

/// Format a date as "YYYYMMDD".
pub fn format_travel_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Format a time of day as "HHMMSS".
pub fn format_clock(time: NaiveTime) -> String {
    format!("{:02}{:02}{:02}", time.hour(), time.minute(), time.second())
}

fn parse_digits(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}

/// An inclusive range of departure hours, e.g. 07–10.
///
/// Always satisfies `start <= end <= 23`. Windows that wrap past midnight
/// are expressed as two criteria instead.
///
/// # Examples
///
/// ```
/// use korail_watch::domain::HourWindow;
///
/// let morning = HourWindow::new(7, 10).unwrap();
/// assert!(morning.contains(7));
/// assert!(morning.contains(10));
/// assert!(!morning.contains(11));
///
/// assert!(HourWindow::new(22, 2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HourWindow {
    start: u8,
    end: u8,
}

impl HourWindow {
    /// The whole day, 00–23.
    pub const FULL_DAY: HourWindow = HourWindow { start: 0, end: 23 };

    /// Create a window, validating `start <= end <= 23`.
    pub fn new(start: u8, end: u8) -> Result<Self, TimeError> {
        if start > 23 || end > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }
        if start > end {
            return Err(TimeError::new("start hour must not be after end hour"));
        }
        Ok(Self { start, end })
    }

    /// First hour in the window.
    pub fn start(&self) -> u8 {
        self.start
    }

    /// Last hour in the window (inclusive).
    pub fn end(&self) -> u8 {
        self.end
    }

    /// Whether the given hour of day falls within the window.
    pub fn contains(&self, hour: u32) -> bool {
        u32::from(self.start) <= hour && hour <= u32::from(self.end)
    }

    /// Whether this window covers the whole day.
    pub fn is_full_day(&self) -> bool {
        *self == Self::FULL_DAY
    }
}

impl Default for HourWindow {
    fn default() -> Self {
        Self::FULL_DAY
    }
}

impl fmt::Display for HourWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}h", self.start, self.end)
    }
}
