//! Defines the units a distance threshold can be expressed in.

use crate::stations::error::StationError;
use std::fmt;
use std::str::FromStr;

/// Kilometers per international mile.
pub const KILOMETERS_PER_MILE: f64 = 1.609344;

/// Unit of a distance given to [`crate::StationsFrame::filter_by_distance`].
///
/// Reported distances are always kilometers; the unit only affects how the
/// threshold is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Miles,
}

impl DistanceUnit {
    pub(crate) fn abbreviation(&self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
        }
    }

    /// Converts a distance expressed in this unit into kilometers.
    ///
    /// ```
    /// use wetterdienst::DistanceUnit;
    ///
    /// assert_eq!(DistanceUnit::Kilometers.to_kilometers(16.13), 16.13);
    /// assert_eq!(DistanceUnit::Miles.to_kilometers(1.0), 1.609344);
    /// ```
    pub fn to_kilometers(&self, distance: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => distance,
            DistanceUnit::Miles => distance * KILOMETERS_PER_MILE,
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Parses `"km"`, `"kilometers"`, `"mi"` or `"miles"` (case-insensitive).
impl FromStr for DistanceUnit {
    type Err = StationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "km" | "kilometer" | "kilometers" => Ok(DistanceUnit::Kilometers),
            "mi" | "mile" | "miles" => Ok(DistanceUnit::Miles),
            _ => Err(StationError::InvalidEnumeration {
                value: s.to_string(),
                enumeration: "distance unit",
            }),
        }
    }
}
