//! Selecting radar files for a validated request from a provider listing.

use crate::radar::error::RadarRequestError;
use crate::radar::request::{FetchStrategy, RadarRequest};
use chrono::{DateTime, Utc};
use log::{info, warn};

/// One file of a radar listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadarFile {
    pub url: String,
    /// Timestamp encoded in the file name.
    pub datetime: DateTime<Utc>,
    /// `true` for `-latest-` alias files.
    pub is_latest: bool,
}

/// Lists the files a provider holds for a request's parameter, site, format and resolution.
pub trait RadarFileIndex {
    fn list(&self, request: &RadarRequest) -> Result<Vec<RadarFile>, RadarRequestError>;
}

impl RadarFileIndex for Vec<RadarFile> {
    fn list(&self, _request: &RadarRequest) -> Result<Vec<RadarFile>, RadarRequestError> {
        Ok(self.clone())
    }
}

/// Pairs a validated request with the index that lists its files.
#[derive(Debug, Clone)]
pub struct RadarValues<I> {
    request: RadarRequest,
    index: I,
}

impl<I: RadarFileIndex> RadarValues<I> {
    pub fn new(request: RadarRequest, index: I) -> Self {
        Self { request, index }
    }

    pub fn request(&self) -> &RadarRequest {
        &self.request
    }

    /// Files matching the request's fetch strategy, ordered by timestamp.
    ///
    /// No matching file is not an error: the result is empty and a warning is logged.
    pub fn query(&self) -> Result<Vec<RadarFile>, RadarRequestError> {
        let files = self.index.list(&self.request)?;
        let listed = files.len();
        let strategy = self.request.strategy();

        let mut selected: Vec<RadarFile> = match strategy {
            FetchStrategy::LatestFile => files.into_iter().filter(|file| file.is_latest).collect(),
            FetchStrategy::MostRecentFile => files
                .into_iter()
                .filter(|file| !file.is_latest)
                .max_by_key(|file| file.datetime)
                .into_iter()
                .collect(),
            FetchStrategy::CurrentInterval { start, end }
            | FetchStrategy::TimeRange { start, end } => files
                .into_iter()
                .filter(|file| !file.is_latest && file.datetime >= start && file.datetime < end)
                .collect(),
        };
        selected.sort_by_key(|file| file.datetime);

        if selected.is_empty() {
            warn!(
                "No radar file found for {} ({}) and {}",
                self.request.parameter(),
                self.request.resolution(),
                strategy
            );
        } else {
            info!(
                "Selected {} of {} radar files for {}",
                selected.len(),
                listed,
                self.request.parameter()
            );
        }
        Ok(selected)
    }
}
