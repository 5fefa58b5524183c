use thiserror::Error;

#[derive(Debug, Error)]
pub enum RadarRequestError {
    // Combination of request parameters the provider does not offer.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("'{value}' is not a valid {enumeration}")]
    InvalidEnumeration {
        value: String,
        enumeration: &'static str,
    },

    #[error("Radar file index failed")]
    FileIndex(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RadarRequestError {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, RadarRequestError::InvalidArgument(_))
    }

    pub fn is_invalid_enumeration(&self) -> bool {
        matches!(self, RadarRequestError::InvalidEnumeration { .. })
    }

    pub(crate) fn invalid_enumeration(value: impl Into<String>, enumeration: &'static str) -> Self {
        RadarRequestError::InvalidEnumeration {
            value: value.into(),
            enumeration,
        }
    }
}
