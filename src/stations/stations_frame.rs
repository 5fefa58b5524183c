//! Contains the `StationsFrame` structure, the tabular station metadata that all
//! station filters consume and produce.

use crate::stations::error::StationError;
use crate::types::coordinates::{validate_latitude, validate_longitude};
use crate::types::station::StationRecord;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashSet;

pub const STATION_ID: &str = "station_id";
pub const FROM_DATE: &str = "from_date";
pub const TO_DATE: &str = "to_date";
pub const HEIGHT: &str = "height";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const NAME: &str = "name";
pub const STATE: &str = "state";
/// Derived column added by the rank and distance filters, in kilometers.
pub const DISTANCE: &str = "distance";

/// Columns every station table must provide.
const REQUIRED_COLUMNS: [&str; 3] = [STATION_ID, LATITUDE, LONGITUDE];

/// A wrapper around a Polars `DataFrame` holding one row per station.
///
/// The canonical columns are `station_id`, `from_date`, `to_date`, `height`, `latitude`,
/// `longitude`, `name` and `state`; provider specific extra columns are carried along
/// untouched. Filters return a *new* `StationsFrame`; the source table is never modified.
///
/// Rank and distance filters append a `distance` column (kilometers) and order rows by it.
/// The bounding box filter keeps table order and never adds `distance`.
///
/// An empty result is a zero-row frame with the same columns, not an error.
#[derive(Debug, Clone)]
pub struct StationsFrame {
    /// The underlying Polars DataFrame containing the station rows.
    pub frame: DataFrame,
}

impl StationsFrame {
    /// Wraps an existing `DataFrame`.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::MissingColumn`] when `station_id`, `latitude` or `longitude`
    /// is absent, [`StationError::MissingValues`] when a station lacks coordinates, and
    /// [`StationError::InvalidArgument`] when station ids repeat, a coordinate lies outside
    /// the valid range or a station's `from_date` lies after its `to_date`.
    pub fn new(frame: DataFrame) -> Result<Self, StationError> {
        for column in REQUIRED_COLUMNS {
            if frame.get_column_index(column).is_none() {
                return Err(StationError::MissingColumn(column.to_string()));
            }
        }
        let stations = Self { frame };
        stations.ensure_unique_ids()?;
        stations.ensure_valid_coordinates()?;
        stations.ensure_valid_periods()?;
        Ok(stations)
    }

    /// Builds the canonical station table from records, preserving their order.
    ///
    /// # Errors
    ///
    /// Same checks as [`StationsFrame::new`].
    pub fn from_records(records: &[StationRecord]) -> Result<Self, StationError> {
        let columns = vec![
            Column::new(
                STATION_ID.into(),
                records
                    .iter()
                    .map(|r| r.station_id.clone())
                    .collect::<Vec<String>>(),
            ),
            Column::new(
                FROM_DATE.into(),
                records
                    .iter()
                    .map(|r| r.from_date)
                    .collect::<Vec<Option<NaiveDate>>>(),
            ),
            Column::new(
                TO_DATE.into(),
                records
                    .iter()
                    .map(|r| r.to_date)
                    .collect::<Vec<Option<NaiveDate>>>(),
            ),
            Column::new(
                HEIGHT.into(),
                records.iter().map(|r| r.height).collect::<Vec<Option<f64>>>(),
            ),
            Column::new(
                LATITUDE.into(),
                records.iter().map(|r| r.latitude).collect::<Vec<f64>>(),
            ),
            Column::new(
                LONGITUDE.into(),
                records.iter().map(|r| r.longitude).collect::<Vec<f64>>(),
            ),
            Column::new(
                NAME.into(),
                records
                    .iter()
                    .map(|r| r.name.clone())
                    .collect::<Vec<String>>(),
            ),
            Column::new(
                STATE.into(),
                records
                    .iter()
                    .map(|r| r.state.clone())
                    .collect::<Vec<Option<String>>>(),
            ),
        ];

        Self::new(DataFrame::new(columns)?)
    }

    /// Number of stations in the table.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// `true` when the table carries a `distance` column.
    pub fn has_distance(&self) -> bool {
        self.frame.get_column_index(DISTANCE).is_some()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Values of the `station_id` column in row order.
    pub fn station_ids(&self) -> Result<Vec<String>, StationError> {
        let ids = self.frame.column(STATION_ID)?.as_materialized_series().str()?;
        ids.into_iter()
            .map(|id| {
                id.map(str::to_string)
                    .ok_or_else(|| missing_values(STATION_ID, ids.null_count()))
            })
            .collect()
    }

    /// Values of the `distance` column in row order, if present.
    pub fn distances(&self) -> Result<Option<Vec<f64>>, StationError> {
        if !self.has_distance() {
            return Ok(None);
        }
        self.float_column(DISTANCE).map(Some)
    }

    /// Latitudes and longitudes of all stations, in row order.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::MissingValues`] when a station has no coordinates.
    pub fn coordinates(&self) -> Result<(Vec<f64>, Vec<f64>), StationError> {
        Ok((self.float_column(LATITUDE)?, self.float_column(LONGITUDE)?))
    }

    /// Extracts the canonical columns as records. Missing optional columns yield `None`.
    pub fn records(&self) -> Result<Vec<StationRecord>, StationError> {
        let ids = self.station_ids()?;
        let (latitudes, longitudes) = self.coordinates()?;
        let from_dates = self.optional_date_column(FROM_DATE)?;
        let to_dates = self.optional_date_column(TO_DATE)?;
        let heights = self.optional_float_column(HEIGHT)?;
        let names = self.optional_str_column(NAME)?;
        let states = self.optional_str_column(STATE)?;

        Ok((0..ids.len())
            .map(|i| StationRecord {
                station_id: ids[i].clone(),
                from_date: from_dates[i],
                to_date: to_dates[i],
                height: heights[i],
                latitude: latitudes[i],
                longitude: longitudes[i],
                name: names[i].clone().unwrap_or_default(),
                state: states[i].clone(),
            })
            .collect())
    }

    /// Zero-row copy of this table with identical columns.
    pub(crate) fn empty_like(&self) -> StationsFrame {
        StationsFrame {
            frame: self.frame.head(Some(0)),
        }
    }

    fn ensure_unique_ids(&self) -> Result<(), StationError> {
        let ids = self.station_ids()?;
        let mut seen = HashSet::with_capacity(ids.len());
        for id in &ids {
            if !seen.insert(id.as_str()) {
                return Err(StationError::InvalidArgument(format!(
                    "Station id '{}' appears more than once in the station table",
                    id
                )));
            }
        }
        Ok(())
    }

    fn ensure_valid_coordinates(&self) -> Result<(), StationError> {
        let ids = self.station_ids()?;
        let (latitudes, longitudes) = self.coordinates()?;
        for ((id, &latitude), &longitude) in ids.iter().zip(&latitudes).zip(&longitudes) {
            validate_latitude(latitude)
                .and_then(|_| validate_longitude(longitude))
                .map_err(|e| {
                    StationError::InvalidArgument(format!("Station '{}': {}", id, e))
                })?;
        }
        Ok(())
    }

    fn ensure_valid_periods(&self) -> Result<(), StationError> {
        let from_dates = self.optional_date_column(FROM_DATE)?;
        let to_dates = self.optional_date_column(TO_DATE)?;
        let inverted = from_dates
            .iter()
            .zip(&to_dates)
            .position(|pair| matches!(pair, (Some(from), Some(to)) if from > to));
        if let Some(row) = inverted {
            let ids = self.station_ids()?;
            return Err(StationError::InvalidArgument(format!(
                "Station '{}' has from_date after to_date",
                ids[row]
            )));
        }
        Ok(())
    }

    fn float_column(&self, name: &str) -> Result<Vec<f64>, StationError> {
        let series = self
            .frame
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let values = series.f64()?;
        if values.null_count() > 0 {
            return Err(missing_values(name, values.null_count()));
        }
        Ok(values.into_iter().flatten().collect())
    }

    fn optional_float_column(&self, name: &str) -> Result<Vec<Option<f64>>, StationError> {
        if self.frame.get_column_index(name).is_none() {
            return Ok(vec![None; self.height()]);
        }
        let series = self
            .frame
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        Ok(series.f64()?.into_iter().collect())
    }

    fn optional_str_column(&self, name: &str) -> Result<Vec<Option<String>>, StationError> {
        if self.frame.get_column_index(name).is_none() {
            return Ok(vec![None; self.height()]);
        }
        let values = self.frame.column(name)?.as_materialized_series().str()?;
        Ok(values
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect())
    }

    fn optional_date_column(&self, name: &str) -> Result<Vec<Option<NaiveDate>>, StationError> {
        if self.frame.get_column_index(name).is_none() {
            return Ok(vec![None; self.height()]);
        }
        let series = self
            .frame
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::Date)?;
        Ok(series.date()?.as_date_iter().collect())
    }
}

fn missing_values(column: &str, count: usize) -> StationError {
    StationError::MissingValues {
        column: column.to_string(),
        count,
    }
}
