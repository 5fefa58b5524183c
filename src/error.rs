use crate::radar::error::RadarRequestError;
use crate::stations::error::StationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WetterdienstError {
    #[error(transparent)]
    Station(#[from] StationError),

    #[error(transparent)]
    RadarRequest(#[from] RadarRequestError),

    #[error("Invalid value '{value}' for setting '{name}'")]
    InvalidSetting { name: String, value: String },
}

impl WetterdienstError {
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            WetterdienstError::Station(e) => e.is_invalid_argument(),
            WetterdienstError::RadarRequest(e) => e.is_invalid_argument(),
            WetterdienstError::InvalidSetting { .. } => false,
        }
    }

    pub fn is_invalid_enumeration(&self) -> bool {
        match self {
            WetterdienstError::Station(e) => e.is_invalid_enumeration(),
            WetterdienstError::RadarRequest(e) => e.is_invalid_enumeration(),
            WetterdienstError::InvalidSetting { .. } => false,
        }
    }
}
