//! Station discovery and radar request validation for German Weather Service (DWD) data.
//!
//! * Station tables ([`StationsFrame`]) can be filtered by rank, distance, bounding box,
//!   station id and name. Distances are great-circle kilometers.
//! * Radar requests ([`RadarRequest`]) are checked against the rules of their parameter
//!   family before any file listing is consulted.

mod error;
mod radar;
mod settings;
mod stations;
mod types;

pub use error::WetterdienstError;
pub use settings::*;

pub use types::coordinates::*;
pub use types::distance_unit::*;
pub use types::station::*;

pub use stations::error::StationError;
pub use stations::nearest_neighbours::*;
pub use stations::request::StationRequest;
pub use stations::source::*;
pub use stations::stations_frame::*;

pub use radar::error::RadarRequestError;
pub use radar::metadata::{
    ParameterFamily, RadarDataFormat, RadarDataSubset, RadarDate, RadarDateInput,
    RadarParameter, RadarPeriod, RadarResolution, TagInput,
};
pub use radar::request::{FetchStrategy, RadarRequest};
pub use radar::rules::{FamilyRules, MAX_ELEVATION};
pub use radar::sites::RadarSite;
pub use radar::values::{RadarFile, RadarFileIndex, RadarValues};
