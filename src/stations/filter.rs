//! Station filters: by rank (k nearest), by distance (within a radius) and by
//! bounding box, plus lookups by station id and name.
//!
//! Rank and distance filters share [`NearestNeighbourResolver`], so a station selected
//! by rank reports exactly the distance a distance query computes for it.

use crate::stations::error::StationError;
use crate::stations::nearest_neighbours::NearestNeighbourResolver;
use crate::stations::stations_frame::{
    StationsFrame, DISTANCE, LATITUDE, LONGITUDE, NAME,
};
use crate::types::coordinates::{validate_latitude, validate_longitude, Coordinates};
use crate::types::distance_unit::DistanceUnit;
use log::debug;
use polars::prelude::*;
use std::collections::HashSet;

impl StationsFrame {
    /// Selects the `number_of_stations` stations closest to the given point.
    ///
    /// The result carries a `distance` column (kilometers) and is ordered ascending by it;
    /// equally distant stations keep table order. A table smaller than
    /// `number_of_stations` yields all of its rows.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::InvalidArgument`] when `number_of_stations` is zero or the
    /// point lies outside the valid latitude/longitude range.
    ///
    /// # Examples
    ///
    /// ```
    /// use wetterdienst::{StationRecord, StationsFrame};
    ///
    /// let stations = StationsFrame::from_records(&[
    ///     StationRecord {
    ///         station_id: "02480".to_string(),
    ///         from_date: None,
    ///         to_date: None,
    ///         height: Some(108.0),
    ///         latitude: 50.0643,
    ///         longitude: 8.993,
    ///         name: "Kahl/Main".to_string(),
    ///         state: Some("Bayern".to_string()),
    ///     },
    ///     StationRecord {
    ///         station_id: "07341".to_string(),
    ///         from_date: None,
    ///         to_date: None,
    ///         height: Some(119.0),
    ///         latitude: 50.0899,
    ///         longitude: 8.7862,
    ///         name: "Offenbach-Wetterpark".to_string(),
    ///         state: Some("Hessen".to_string()),
    ///     },
    /// ])
    /// .unwrap();
    ///
    /// let nearest = stations.filter_by_rank(50.0, 8.9, 1).unwrap();
    /// assert_eq!(nearest.station_ids().unwrap(), vec!["02480"]);
    /// ```
    pub fn filter_by_rank(
        &self,
        latitude: f64,
        longitude: f64,
        number_of_stations: usize,
    ) -> Result<StationsFrame, StationError> {
        if number_of_stations < 1 {
            return Err(StationError::InvalidArgument(format!(
                "Argument 'number_of_stations' must be at least 1, got {}",
                number_of_stations
            )));
        }
        let query = query_point(latitude, longitude)?;
        debug!(
            "Selecting {} nearest of {} stations to ({}, {})",
            number_of_stations,
            self.height(),
            latitude,
            longitude
        );

        if self.is_empty() {
            return self.take_with_distance(&[], &[]);
        }

        let k = number_of_stations.min(self.height());
        let (distances, indices) = self.resolver()?.resolve(&query, k)?;
        self.take_with_distance(&indices[0], &distances[0])
    }

    /// Selects all stations within `max_distance` of the given point.
    ///
    /// `max_distance` is interpreted in `unit`; the `distance` column of the result is
    /// always in kilometers. Rows are ordered ascending by distance. No station in range
    /// yields an empty frame.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::InvalidArgument`] when `max_distance` is not a positive,
    /// finite number or the point lies outside the valid latitude/longitude range.
    pub fn filter_by_distance(
        &self,
        latitude: f64,
        longitude: f64,
        max_distance: f64,
        unit: DistanceUnit,
    ) -> Result<StationsFrame, StationError> {
        if !(max_distance > 0.0 && max_distance.is_finite()) {
            return Err(StationError::InvalidArgument(format!(
                "Argument 'distance' must be a positive number, got {}",
                max_distance
            )));
        }
        let query = query_point(latitude, longitude)?;
        let max_distance_km = unit.to_kilometers(max_distance);
        debug!(
            "Selecting stations within {} {} ({} km) of ({}, {})",
            max_distance, unit, max_distance_km, latitude, longitude
        );

        if self.is_empty() {
            return self.take_with_distance(&[], &[]);
        }

        let (distances, indices) = self.resolver()?.resolve(&query, self.height())?;
        let within = distances[0]
            .iter()
            .take_while(|&&dist_km| dist_km <= max_distance_km)
            .count();
        self.take_with_distance(&indices[0][..within], &distances[0][..within])
    }

    /// Selects the stations inside the closed rectangle `[left, right] x [bottom, top]`
    /// (longitudes x latitudes, degrees).
    ///
    /// Rows keep table order and no `distance` column is added; an existing one is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::InvalidArgument`] when `left >= right` or `bottom >= top`.
    pub fn filter_by_bbox(
        &self,
        left: f64,
        bottom: f64,
        right: f64,
        top: f64,
    ) -> Result<StationsFrame, StationError> {
        if !(left < right) {
            return Err(StationError::InvalidArgument(format!(
                "Argument 'left' must be smaller than 'right', got left={} right={}",
                left, right
            )));
        }
        if !(bottom < top) {
            return Err(StationError::InvalidArgument(format!(
                "Argument 'bottom' must be smaller than 'top', got bottom={} top={}",
                bottom, top
            )));
        }
        debug!(
            "Selecting stations inside bbox left={} bottom={} right={} top={}",
            left, bottom, right, top
        );

        let mut frame = self
            .frame
            .clone()
            .lazy()
            .filter(
                col(LONGITUDE)
                    .gt_eq(lit(left))
                    .and(col(LONGITUDE).lt_eq(lit(right)))
                    .and(col(LATITUDE).gt_eq(lit(bottom)))
                    .and(col(LATITUDE).lt_eq(lit(top))),
            )
            .collect()?;
        if frame.get_column_index(DISTANCE).is_some() {
            frame = frame.drop(DISTANCE)?;
        }
        Ok(StationsFrame { frame })
    }

    /// Selects the stations whose `station_id` is one of `station_ids`, in table order.
    pub fn filter_by_station_id<S: AsRef<str>>(
        &self,
        station_ids: &[S],
    ) -> Result<StationsFrame, StationError> {
        let wanted: HashSet<&str> = station_ids.iter().map(|id| id.as_ref()).collect();
        let mask: Vec<bool> = self
            .station_ids()?
            .iter()
            .map(|id| wanted.contains(id.as_str()))
            .collect();
        self.filter_mask(&mask)
    }

    /// Selects the stations whose name contains `name`, ignoring case.
    pub fn filter_by_name(&self, name: &str) -> Result<StationsFrame, StationError> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Err(StationError::InvalidArgument(
                "Argument 'name' must not be empty".to_string(),
            ));
        }
        if self.frame.get_column_index(NAME).is_none() {
            return Ok(self.empty_like());
        }
        let names = self.frame.column(NAME)?.as_materialized_series().str()?;
        let mask: Vec<bool> = names
            .into_iter()
            .map(|value| value.is_some_and(|v| v.to_lowercase().contains(&needle)))
            .collect();
        self.filter_mask(&mask)
    }

    fn resolver(&self) -> Result<NearestNeighbourResolver, StationError> {
        let (latitudes, longitudes) = self.coordinates()?;
        NearestNeighbourResolver::new(&latitudes, &longitudes)
    }

    fn take_with_distance(
        &self,
        indices: &[usize],
        distances: &[f64],
    ) -> Result<StationsFrame, StationError> {
        let idx = IdxCa::from_vec(
            "idx".into(),
            indices.iter().map(|&i| i as IdxSize).collect(),
        );
        let mut frame = self.frame.take(&idx)?;
        frame.with_column(Column::new(DISTANCE.into(), distances.to_vec()))?;
        Ok(StationsFrame { frame })
    }

    fn filter_mask(&self, mask: &[bool]) -> Result<StationsFrame, StationError> {
        let mask = BooleanChunked::from_slice("mask".into(), mask);
        Ok(StationsFrame {
            frame: self.frame.filter(&mask)?,
        })
    }
}

fn query_point(latitude: f64, longitude: f64) -> Result<Coordinates, StationError> {
    validate_latitude(latitude)?;
    validate_longitude(longitude)?;
    Coordinates::new(vec![latitude], vec![longitude])
}
