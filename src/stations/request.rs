use crate::error::WetterdienstError;
use crate::settings::Settings;
use crate::stations::source::{CachedStationSource, StationMetadataSource};
use crate::stations::stations_frame::StationsFrame;
use crate::types::coordinates::LatLon;
use crate::types::distance_unit::DistanceUnit;
use bon::bon;
use log::debug;

/// Entry point for station queries against a metadata source.
///
/// Every query loads the table from the source (which may serve it from a cache) and
/// returns a new [`StationsFrame`].
///
/// # Examples
///
/// ```
/// use wetterdienst::{LatLon, StationRecord, StationRequest, StationsFrame};
///
/// # fn main() -> Result<(), wetterdienst::WetterdienstError> {
/// let table = StationsFrame::from_records(&[StationRecord {
///     station_id: "02480".to_string(),
///     from_date: None,
///     to_date: None,
///     height: Some(108.0),
///     latitude: 50.0643,
///     longitude: 8.993,
///     name: "Kahl/Main".to_string(),
///     state: Some("Bayern".to_string()),
/// }])?;
/// let request = StationRequest::new(table);
///
/// let nearby = request
///     .filter_by_distance(LatLon(50.0, 8.9), 16.13)
///     .call()?;
/// assert_eq!(nearby.station_ids()?, vec!["02480"]);
/// # Ok(())
/// # }
/// ```
pub struct StationRequest<S> {
    source: S,
    settings: Settings,
}

impl<S: StationMetadataSource> StationRequest<S> {
    /// Uses `source` with default settings.
    pub fn new(source: S) -> Self {
        Self::with_settings(source, Settings::default())
    }

    pub fn with_settings(source: S, settings: Settings) -> Self {
        Self { source, settings }
    }

    /// Wraps `source` in a cache governed by `settings.cache_expiry`.
    pub fn cached(source: S, settings: Settings) -> StationRequest<CachedStationSource<S>> {
        let cached = CachedStationSource::new(source, settings.cache_expiry);
        StationRequest::with_settings(cached, settings)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The complete station table.
    pub fn all(&self) -> Result<StationsFrame, WetterdienstError> {
        Ok(self.source.stations()?)
    }

    /// Stations inside the closed bounding box, in table order.
    pub fn filter_by_bbox(
        &self,
        left: f64,
        bottom: f64,
        right: f64,
        top: f64,
    ) -> Result<StationsFrame, WetterdienstError> {
        Ok(self.all()?.filter_by_bbox(left, bottom, right, top)?)
    }

    pub fn filter_by_station_id<I: AsRef<str>>(
        &self,
        station_ids: &[I],
    ) -> Result<StationsFrame, WetterdienstError> {
        Ok(self.all()?.filter_by_station_id(station_ids)?)
    }

    pub fn filter_by_name(&self, name: &str) -> Result<StationsFrame, WetterdienstError> {
        Ok(self.all()?.filter_by_name(name)?)
    }
}

#[bon]
impl<S: StationMetadataSource> StationRequest<S> {
    /// Starts a query for the stations nearest to `location`.
    ///
    /// Optional: `.number_of_stations(usize)` (default 1). Finish with `.call()`.
    #[builder(start_fn = filter_by_rank)]
    #[doc(hidden)]
    pub fn build_filter_by_rank(
        &self,
        #[builder(start_fn)] location: LatLon,
        #[builder(default = 1)] number_of_stations: usize,
    ) -> Result<StationsFrame, WetterdienstError> {
        debug!("Rank query around {:?}", location);
        Ok(self
            .all()?
            .filter_by_rank(location.0, location.1, number_of_stations)?)
    }

    /// Starts a query for the stations within `distance` of `location`.
    ///
    /// Optional: `.unit(DistanceUnit)`, defaulting to [`Settings::distance_unit`]. Finish
    /// with `.call()`.
    #[builder(start_fn = filter_by_distance)]
    #[doc(hidden)]
    pub fn build_filter_by_distance(
        &self,
        #[builder(start_fn)] location: LatLon,
        #[builder(start_fn)] distance: f64,
        unit: Option<DistanceUnit>,
    ) -> Result<StationsFrame, WetterdienstError> {
        let unit = unit.unwrap_or(self.settings.distance_unit);
        debug!("Distance query around {:?} within {} {}", location, distance, unit);
        Ok(self
            .all()?
            .filter_by_distance(location.0, location.1, distance, unit)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CacheExpiry;
    use crate::stations::stations_frame::tests::station_table;

    fn request() -> StationRequest<StationsFrame> {
        StationRequest::new(station_table())
    }

    #[test]
    fn test_all_returns_whole_table() {
        let all = request().all().unwrap();
        assert_eq!(all.height(), 5);
        assert!(!all.has_distance());
    }

    #[test]
    fn test_rank_defaults_to_one_station() {
        let nearest = request()
            .filter_by_rank(LatLon(50.0, 8.9))
            .call()
            .unwrap();
        assert_eq!(nearest.station_ids().unwrap(), vec!["02480"]);

        let three = request()
            .filter_by_rank(LatLon(50.0, 8.9))
            .number_of_stations(3)
            .call()
            .unwrap();
        assert_eq!(three.station_ids().unwrap(), vec!["02480", "04411", "07341"]);
    }

    #[test]
    fn test_distance_unit_from_settings() {
        let miles = StationRequest::with_settings(
            station_table(),
            Settings::builder().distance_unit(DistanceUnit::Miles).build(),
        );
        let within = miles
            .filter_by_distance(LatLon(50.0, 8.9), 10.03)
            .call()
            .unwrap();
        assert_eq!(within.height(), 3);

        // An explicit unit wins over the setting.
        let within_km = miles
            .filter_by_distance(LatLon(50.0, 8.9), 10.03)
            .unit(DistanceUnit::Kilometers)
            .call()
            .unwrap();
        assert_eq!(within_km.station_ids().unwrap(), vec!["02480"]);
    }

    #[test]
    fn test_errors_are_wrapped() {
        let err = request()
            .filter_by_rank(LatLon(50.0, 8.9))
            .number_of_stations(0)
            .call()
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let err = request().filter_by_bbox(9.0, 49.0, 8.0, 51.0).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_lookups() {
        let by_id = request().filter_by_station_id(&["05792"]).unwrap();
        assert_eq!(by_id.records().unwrap()[0].name, "Zugspitze");

        let by_name = request().filter_by_name("dresden").unwrap();
        assert_eq!(by_name.station_ids().unwrap(), vec!["01048"]);
    }

    #[test]
    fn test_cached_request_uses_expiry() {
        let settings = Settings::builder()
            .cache_expiry(CacheExpiry::Infinite)
            .build();
        let request = StationRequest::cached(station_table(), settings);
        assert_eq!(request.settings().cache_expiry, CacheExpiry::Infinite);
        assert_eq!(request.all().unwrap().height(), 5);
        assert_eq!(
            request.filter_by_bbox(8.0, 49.0, 10.0, 51.0).unwrap().height(),
            3
        );
    }
}
