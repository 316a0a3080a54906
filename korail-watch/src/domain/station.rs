//! Station name type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid station name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station name: {reason}")]
pub struct InvalidStation {
    reason: &'static str,
}

/// Longest station name accepted, in characters.
const MAX_NAME_CHARS: usize = 20;

/// A station as named by Korail (e.g. "서울", "부산", "동대구").
///
/// Korail's search endpoint takes station names rather than codes, so the
/// name is the identity. Surrounding whitespace is trimmed on parse; the
/// result is never empty.
///
/// # Examples
///
/// ```
/// use korail_watch::domain::StationName;
///
/// let seoul = StationName::parse(" 서울 ").unwrap();
/// assert_eq!(seoul.as_str(), "서울");
///
/// assert!(StationName::parse("").is_err());
/// assert!(StationName::parse("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationName(String);

impl StationName {
    /// Parse a station name, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStation> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidStation {
                reason: "must not be empty",
            });
        }

        if trimmed.chars().count() > MAX_NAME_CHARS {
            return Err(InvalidStation {
                reason: "must be at most 20 characters",
            });
        }

        if trimmed.chars().any(char::is_control) {
            return Err(InvalidStation {
                reason: "must not contain control characters",
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StationName {
    type Error = InvalidStation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StationName> for String {
    fn from(value: StationName) -> Self {
        value.0
    }
}

impl fmt::Debug for StationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationName({})", self.0)
    }
}

impl fmt::Display for StationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
