//! Where station tables come from: a pluggable [`StationMetadataSource`], a JSON parser
//! for provider metadata files, and an expiring in-memory cache.

use crate::settings::CacheExpiry;
use crate::stations::error::StationError;
use crate::stations::stations_frame::{
    StationsFrame, FROM_DATE, HEIGHT, LATITUDE, LONGITUDE, NAME, STATE, STATION_ID, TO_DATE,
};
use chrono::NaiveDate;
use log::{debug, info};
use polars::prelude::*;
use serde::Deserialize;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

/// Extra column carried by river gauge metadata.
pub const RIVER_KILOMETER: &str = "river_kilometer";
/// Extra column naming the water body a gauge sits on.
pub const WATER: &str = "water";

/// Anything able to produce the full station table for a provider.
pub trait StationMetadataSource: Send + Sync {
    fn stations(&self) -> Result<StationsFrame, StationError>;
}

impl StationMetadataSource for StationsFrame {
    fn stations(&self) -> Result<StationsFrame, StationError> {
        Ok(self.clone())
    }
}

/// Station metadata held as raw JSON bytes, parsed on every [`StationMetadataSource::stations`]
/// call. Wrap it in a [`CachedStationSource`] to avoid re-parsing.
#[derive(Debug, Clone)]
pub struct JsonStationSource {
    bytes: Vec<u8>,
}

impl JsonStationSource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Reads a metadata file into memory.
    pub async fn from_path(path: &Path) -> Result<Self, StationError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| StationError::MetadataRead(path.to_path_buf(), e))?;
        Ok(Self::new(bytes))
    }
}

impl StationMetadataSource for JsonStationSource {
    fn stations(&self) -> Result<StationsFrame, StationError> {
        parse_station_json(&self.bytes)
    }
}

impl StationsFrame {
    /// Loads a station table from a JSON metadata file, parsing off the async runtime.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::MetadataRead`] when the file cannot be read and
    /// [`StationError::JsonParse`] when its content is not a station list.
    pub async fn from_json_file(path: &Path) -> Result<StationsFrame, StationError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| StationError::MetadataRead(path.to_path_buf(), e))?;
        let parse_start = Instant::now();
        let stations = tokio::task::spawn_blocking(move || parse_station_json(&bytes)).await??;
        info!(
            "Parsed {} stations from {} in {:?}",
            stations.height(),
            path.display(),
            parse_start.elapsed()
        );
        Ok(stations)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawStationId {
    Text(String),
    Number(i64),
}

impl RawStationId {
    fn into_string(self) -> String {
        match self {
            RawStationId::Text(id) => id,
            RawStationId::Number(id) => id.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawWater {
    #[serde(alias = "longname")]
    shortname: String,
}

#[derive(Debug, Deserialize)]
struct RawStation {
    #[serde(alias = "number", alias = "id")]
    station_id: RawStationId,
    #[serde(default)]
    from_date: Option<NaiveDate>,
    #[serde(default)]
    to_date: Option<NaiveDate>,
    #[serde(default, alias = "elevation")]
    height: Option<f64>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default, alias = "shortname")]
    name: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default, alias = "km")]
    river_kilometer: Option<f64>,
    #[serde(default)]
    water: Option<RawWater>,
}

/// Parses a JSON array of station objects into the canonical station table.
///
/// Gauge style keys are normalized (`number` to `station_id`, `shortname` to `name`,
/// `km` to `river_kilometer`, `water.shortname` to `water`). Stations without
/// coordinates are skipped. The `river_kilometer` and `water` columns are only added when
/// at least one station provides them.
pub fn parse_station_json(bytes: &[u8]) -> Result<StationsFrame, StationError> {
    let raw: Vec<RawStation> = serde_json::from_slice(bytes)?;
    let total = raw.len();

    let mut ids = Vec::with_capacity(total);
    let mut from_dates = Vec::with_capacity(total);
    let mut to_dates = Vec::with_capacity(total);
    let mut heights = Vec::with_capacity(total);
    let mut latitudes = Vec::with_capacity(total);
    let mut longitudes = Vec::with_capacity(total);
    let mut names = Vec::with_capacity(total);
    let mut states = Vec::with_capacity(total);
    let mut river_kilometers = Vec::with_capacity(total);
    let mut waters = Vec::with_capacity(total);

    for station in raw {
        let station_id = station.station_id.into_string();
        let (Some(latitude), Some(longitude)) = (station.latitude, station.longitude) else {
            debug!("Skipping station {} without coordinates", station_id);
            continue;
        };
        ids.push(station_id);
        from_dates.push(station.from_date);
        to_dates.push(station.to_date);
        heights.push(station.height);
        latitudes.push(latitude);
        longitudes.push(longitude);
        names.push(station.name.unwrap_or_default());
        states.push(station.state);
        river_kilometers.push(station.river_kilometer);
        waters.push(station.water.map(|water| water.shortname));
    }

    let mut columns = vec![
        Column::new(STATION_ID.into(), ids),
        Column::new(FROM_DATE.into(), from_dates),
        Column::new(TO_DATE.into(), to_dates),
        Column::new(HEIGHT.into(), heights),
        Column::new(LATITUDE.into(), latitudes),
        Column::new(LONGITUDE.into(), longitudes),
        Column::new(NAME.into(), names),
        Column::new(STATE.into(), states),
    ];
    if river_kilometers.iter().any(Option::is_some) {
        columns.push(Column::new(RIVER_KILOMETER.into(), river_kilometers));
    }
    if waters.iter().any(Option::is_some) {
        columns.push(Column::new(WATER.into(), waters));
    }

    let stations = StationsFrame::new(DataFrame::new(columns)?)?;
    debug!(
        "Parsed {} of {} stations from metadata",
        stations.height(),
        total
    );
    Ok(stations)
}

/// Memoizes the table of an inner source for as long as its [`CacheExpiry`] allows.
pub struct CachedStationSource<S> {
    inner: S,
    expiry: CacheExpiry,
    cached: Mutex<Option<(Instant, StationsFrame)>>,
}

impl<S: StationMetadataSource> CachedStationSource<S> {
    pub fn new(inner: S, expiry: CacheExpiry) -> Self {
        Self {
            inner,
            expiry,
            cached: Mutex::new(None),
        }
    }

    pub fn expiry(&self) -> CacheExpiry {
        self.expiry
    }

    /// Drops the cached table so the next request reloads it.
    ///
    /// Also recovers a lock poisoned by a panicking loader.
    pub fn invalidate(&self) {
        let mut cached = self
            .cached
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *cached = None;
        drop(cached);
        self.cached.clear_poison();
    }
}

impl<S: StationMetadataSource> StationMetadataSource for CachedStationSource<S> {
    fn stations(&self) -> Result<StationsFrame, StationError> {
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| StationError::Source("station cache lock poisoned".to_string()))?;

        if let Some((loaded_at, stations)) = cached.as_ref() {
            if self.expiry.is_fresh(loaded_at.elapsed()) {
                debug!("Serving {} stations from cache", stations.height());
                return Ok(stations.clone());
            }
        }

        let stations = self.inner.stations()?;
        if self.expiry != CacheExpiry::NoCache {
            *cached = Some((Instant::now(), stations.clone()));
        }
        Ok(stations)
    }
}
