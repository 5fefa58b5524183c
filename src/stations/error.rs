use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StationError {
    // Caller supplied a value that violates a precondition (k, distance, bbox, coordinates).
    #[error("{0}")]
    InvalidArgument(String),

    #[error("'{value}' is not a valid {enumeration}")]
    InvalidEnumeration {
        value: String,
        enumeration: &'static str,
    },

    #[error("Station table is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Station table column '{column}' contains {count} missing values")]
    MissingValues { column: String, count: usize },

    #[error("Failed to read station metadata file '{0}'")]
    MetadataRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse station metadata JSON")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed processing station table: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Station metadata source failed: {0}")]
    Source(String),

    // Covers errors joining tokio blocking tasks
    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl StationError {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, StationError::InvalidArgument(_))
    }

    pub fn is_invalid_enumeration(&self) -> bool {
        matches!(self, StationError::InvalidEnumeration { .. })
    }
}
