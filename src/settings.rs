//! Runtime configuration: how long loaded station metadata stays valid and which
//! unit distance thresholds default to.

use crate::error::WetterdienstError;
use crate::types::distance_unit::DistanceUnit;
use bon::Builder;
use log::debug;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable read by [`Settings::from_env`] for [`Settings::cache_expiry`].
pub const CACHE_EXPIRY_VAR: &str = "WD_CACHE_EXPIRY";
/// Environment variable read by [`Settings::from_env`] for [`Settings::distance_unit`].
pub const DISTANCE_UNIT_VAR: &str = "WD_DISTANCE_UNIT";

/// How long a loaded metadata table may be reused before it is loaded again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CacheExpiry {
    /// Load on every request.
    NoCache,
    FiveMinutes,
    #[default]
    OneHour,
    TwelveHours,
    OneDay,
    /// Load once, keep for the lifetime of the cache.
    Infinite,
}

impl CacheExpiry {
    /// Time-to-live of a cached table; `None` means it never expires.
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            CacheExpiry::NoCache => Some(Duration::ZERO),
            CacheExpiry::FiveMinutes => Some(Duration::from_secs(5 * 60)),
            CacheExpiry::OneHour => Some(Duration::from_secs(60 * 60)),
            CacheExpiry::TwelveHours => Some(Duration::from_secs(12 * 60 * 60)),
            CacheExpiry::OneDay => Some(Duration::from_secs(24 * 60 * 60)),
            CacheExpiry::Infinite => None,
        }
    }

    /// `true` if an entry loaded `age` ago may still be served.
    pub fn is_fresh(&self, age: Duration) -> bool {
        match self.ttl() {
            None => true,
            Some(ttl) => age < ttl,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            CacheExpiry::NoCache => "no_cache",
            CacheExpiry::FiveMinutes => "five_minutes",
            CacheExpiry::OneHour => "one_hour",
            CacheExpiry::TwelveHours => "twelve_hours",
            CacheExpiry::OneDay => "one_day",
            CacheExpiry::Infinite => "infinite",
        }
    }
}

impl fmt::Display for CacheExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CacheExpiry {
    type Err = WetterdienstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        [
            CacheExpiry::NoCache,
            CacheExpiry::FiveMinutes,
            CacheExpiry::OneHour,
            CacheExpiry::TwelveHours,
            CacheExpiry::OneDay,
            CacheExpiry::Infinite,
        ]
        .into_iter()
        .find(|expiry| expiry.name() == wanted)
        .ok_or_else(|| WetterdienstError::InvalidSetting {
            name: "cache_expiry".to_string(),
            value: s.to_string(),
        })
    }
}

/// Configuration shared by a [`crate::StationRequest`].
///
/// # Examples
///
/// ```
/// use wetterdienst::{CacheExpiry, DistanceUnit, Settings};
///
/// let settings = Settings::builder()
///     .cache_expiry(CacheExpiry::NoCache)
///     .build();
/// assert_eq!(settings.cache_expiry, CacheExpiry::NoCache);
/// assert_eq!(settings.distance_unit, DistanceUnit::Kilometers);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct Settings {
    /// Expiry policy for station metadata loaded through a [`crate::CachedStationSource`].
    #[builder(default)]
    pub cache_expiry: CacheExpiry,
    /// Unit used by distance filters when the caller does not name one.
    #[builder(default)]
    pub distance_unit: DistanceUnit,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::builder().build()
    }
}

impl Settings {
    /// Reads settings from `WD_CACHE_EXPIRY` and `WD_DISTANCE_UNIT`, falling back to the
    /// defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`WetterdienstError::InvalidSetting`] when a variable holds an unknown value.
    pub fn from_env() -> Result<Self, WetterdienstError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, WetterdienstError> {
        let mut settings = Settings::default();
        if let Some(value) = lookup(CACHE_EXPIRY_VAR) {
            settings.cache_expiry = value.parse()?;
        }
        if let Some(value) = lookup(DISTANCE_UNIT_VAR) {
            settings.distance_unit =
                value
                    .parse()
                    .map_err(|_| WetterdienstError::InvalidSetting {
                        name: "distance_unit".to_string(),
                        value: value.clone(),
                    })?;
        }
        debug!("Loaded settings {:?}", settings);
        Ok(settings)
    }
}
