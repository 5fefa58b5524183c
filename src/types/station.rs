//! Defines the row type of a station metadata table: identification, location,
//! elevation and the period a station was active.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single observing station as listed in a provider's station metadata table.
///
/// Records are read-only to the filters; a filtered table gains a derived `distance`
/// column instead of mutating the records it was built from.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StationRecord {
    /// The provider's station identifier (e.g., "02480"). Unique within a table.
    pub station_id: String,
    /// First day the station reported data, if known.
    pub from_date: Option<NaiveDate>,
    /// Last day the station reported data, if known.
    pub to_date: Option<NaiveDate>,
    /// Elevation above sea level in meters, if known.
    pub height: Option<f64>,
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
    /// Human readable station name (e.g., "Kahl/Main").
    pub name: String,
    /// Federal state or region the station is located in.
    pub state: Option<String>,
}

impl StationRecord {
    /// `true` when the active period is well formed (`from_date <= to_date` when both are known).
    pub fn has_valid_period(&self) -> bool {
        match (self.from_date, self.to_date) {
            (Some(from), Some(to)) => from <= to,
            _ => true,
        }
    }
}
