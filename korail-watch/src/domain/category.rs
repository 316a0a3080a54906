//! Train and seat categories.
//!
//! Criteria express preferences (`TrainCategory`, `SeatCategory`, each with an
//! `Any` option); itineraries carry concrete values (`TrainClass`,
//! `SeatClass`).

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct InvalidCategory {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// Concrete class of a train returned by a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrainClass {
    /// KTX family (KTX, KTX-산천, KTX-이음, ...).
    Express,
    /// Conventional trains (무궁화호, ITX-새마을, ITX-청춘, ...).
    Regional,
}

impl fmt::Display for TrainClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainClass::Express => f.write_str("express"),
            TrainClass::Regional => f.write_str("regional"),
        }
    }
}

/// Which trains a criterion accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrainCategory {
    /// KTX only. This is the default, as in the Korail app.
    #[default]
    ExpressOnly,
    /// Conventional trains only.
    RegionalOnly,
    /// Any train.
    Any,
}

impl TrainCategory {
    /// Whether a train of the given class satisfies this category.
    pub fn matches(&self, class: TrainClass) -> bool {
        match self {
            TrainCategory::Any => true,
            TrainCategory::ExpressOnly => class == TrainClass::Express,
            TrainCategory::RegionalOnly => class == TrainClass::Regional,
        }
    }

    /// The name used in criteria files.
    pub fn as_config_str(&self) -> &'static str {
        match self {
            TrainCategory::ExpressOnly => "KTX",
            TrainCategory::RegionalOnly => "MUGUNGHWA",
            TrainCategory::Any => "ALL",
        }
    }
}

impl FromStr for TrainCategory {
    type Err = InvalidCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "KTX" | "EXPRESS" => Ok(TrainCategory::ExpressOnly),
            "MUGUNGHWA" | "REGIONAL" => Ok(TrainCategory::RegionalOnly),
            "ALL" | "ANY" => Ok(TrainCategory::Any),
            _ => Err(InvalidCategory {
                kind: "train type",
                value: s.to_string(),
                expected: "KTX, MUGUNGHWA, ALL",
            }),
        }
    }
}

impl fmt::Display for TrainCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_config_str())
    }
}

/// Concrete seat class on a train.
///
/// Ordered so that `Standard` sorts first; that is also the preference when
/// a criterion accepts either class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeatClass {
    /// 일반실
    Standard,
    /// 특실
    Premium,
}

impl fmt::Display for SeatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeatClass::Standard => f.write_str("general"),
            SeatClass::Premium => f.write_str("special"),
        }
    }
}

/// Which seat classes a criterion accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SeatCategory {
    /// General seats only.
    Standard,
    /// Special (first class) seats only.
    Premium,
    /// Either; general is tried first.
    #[default]
    Any,
}

impl SeatCategory {
    /// Whether the requested category intersects the available classes.
    ///
    /// `Any` stands for every class, so it intersects any non-empty set.
    pub fn accepts(&self, available: &BTreeSet<SeatClass>) -> bool {
        self.choose(available).is_some()
    }

    /// The seat class to claim from the available classes, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeSet;
    /// use korail_watch::domain::{SeatCategory, SeatClass};
    ///
    /// let both = BTreeSet::from([SeatClass::Standard, SeatClass::Premium]);
    /// assert_eq!(SeatCategory::Any.choose(&both), Some(SeatClass::Standard));
    /// assert_eq!(SeatCategory::Premium.choose(&both), Some(SeatClass::Premium));
    ///
    /// let premium_only = BTreeSet::from([SeatClass::Premium]);
    /// assert_eq!(SeatCategory::Standard.choose(&premium_only), None);
    /// ```
    pub fn choose(&self, available: &BTreeSet<SeatClass>) -> Option<SeatClass> {
        match self {
            SeatCategory::Standard => available.get(&SeatClass::Standard).copied(),
            SeatCategory::Premium => available.get(&SeatClass::Premium).copied(),
            SeatCategory::Any => available.first().copied(),
        }
    }

    /// The name used in criteria files.
    pub fn as_config_str(&self) -> &'static str {
        match self {
            SeatCategory::Standard => "general",
            SeatCategory::Premium => "special",
            SeatCategory::Any => "any",
        }
    }
}

impl FromStr for SeatCategory {
    type Err = InvalidCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" | "standard" => Ok(SeatCategory::Standard),
            "special" | "premium" => Ok(SeatCategory::Premium),
            "any" => Ok(SeatCategory::Any),
            _ => Err(InvalidCategory {
                kind: "seat type",
                value: s.to_string(),
                expected: "general, special, any",
            }),
        }
    }
}

impl fmt::Display for SeatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_config_str())
    }
}
