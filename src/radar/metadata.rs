//! Radar request vocabulary: parameters, formats, subsets, resolutions, periods and the
//! symbolic date keywords, each with a lowercase wire name and text parsing.

use crate::radar::error::RadarRequestError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use std::str::FromStr;

/// A request value given either as a typed tag or as text still to be parsed.
///
/// Text is parsed case-insensitively when the request is built; unknown text fails with
/// [`RadarRequestError::InvalidEnumeration`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagInput<T> {
    Value(T),
    Text(String),
}

impl<T: FromStr<Err = RadarRequestError>> TagInput<T> {
    pub fn parse(self) -> Result<T, RadarRequestError> {
        match self {
            TagInput::Value(value) => Ok(value),
            TagInput::Text(text) => text.parse(),
        }
    }
}

impl<T> From<&str> for TagInput<T> {
    fn from(text: &str) -> Self {
        TagInput::Text(text.to_string())
    }
}

impl<T> From<String> for TagInput<T> {
    fn from(text: String) -> Self {
        TagInput::Text(text)
    }
}

/// Declares a closed tag enumeration with `ALL`, `as_str`, uppercase `Display`, `FromStr`
/// and a `TagInput` conversion.
macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($(#[$variant_meta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($(#[$variant_meta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Lowercase name as used in provider file names.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.as_str().to_uppercase())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::radar::error::RadarRequestError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|tag| tag.as_str() == wanted)
                    .ok_or_else(|| {
                        $crate::radar::error::RadarRequestError::invalid_enumeration(s, $label)
                    })
            }
        }

        impl From<$name> for $crate::radar::metadata::TagInput<$name> {
            fn from(value: $name) -> Self {
                $crate::radar::metadata::TagInput::Value(value)
            }
        }
    };
}

pub(crate) use tag_enum;

tag_enum! {
    /// Groups of radar parameters sharing one set of request rules.
    ParameterFamily, "radar parameter family" {
        Composite => "composite",
        Radolan => "radolan",
        RadolanCdc => "radolan_cdc",
        Radvor => "radvor",
        Site => "site",
        Sweep => "sweep",
    }
}

tag_enum! {
    /// Radar products offered by the provider.
    RadarParameter, "radar parameter" {
        PgReflectivity => "pg",
        HgReflectivity => "hg",
        WxReflectivity => "wx",
        RxReflectivity => "rx",
        WnReflectivity => "wn",
        RvReflectivity => "rv",
        RwReflectivity => "rw",
        SfReflectivity => "sf",
        RadolanCdc => "radolan_cdc",
        ReReflectivity => "re",
        RqReflectivity => "rq",
        DxReflectivity => "dx",
        LmaxVolumeScan => "lmax",
        PeEchoTop => "pe",
        PfReflectivity => "pf",
        PlVolumeScan => "pl",
        PrVelocity => "pr",
        PxReflectivity => "px",
        Px250Reflectivity => "px250",
        PzCappi => "pz",
        SweepPcpVelocityH => "sweep_pcp_velocity_h",
        SweepPcpReflectivityH => "sweep_pcp_reflectivity_h",
        SweepVolVelocityH => "sweep_vol_velocity_h",
        SweepVolReflectivityH => "sweep_vol_reflectivity_h",
    }
}

impl RadarParameter {
    pub fn family(&self) -> ParameterFamily {
        use RadarParameter::*;
        match self {
            PgReflectivity | HgReflectivity | WxReflectivity | RxReflectivity | WnReflectivity
            | RvReflectivity => ParameterFamily::Composite,
            RwReflectivity | SfReflectivity => ParameterFamily::Radolan,
            RadolanCdc => ParameterFamily::RadolanCdc,
            ReReflectivity | RqReflectivity => ParameterFamily::Radvor,
            DxReflectivity | LmaxVolumeScan | PeEchoTop | PfReflectivity | PlVolumeScan
            | PrVelocity | PxReflectivity | Px250Reflectivity | PzCappi => ParameterFamily::Site,
            SweepPcpVelocityH | SweepPcpReflectivityH | SweepVolVelocityH
            | SweepVolReflectivityH => ParameterFamily::Sweep,
        }
    }

    /// Volume sweeps are the only products recorded at several elevations.
    pub fn is_volume_sweep(&self) -> bool {
        matches!(
            self,
            RadarParameter::SweepVolVelocityH | RadarParameter::SweepVolReflectivityH
        )
    }
}

tag_enum! {
    RadarDataFormat, "radar data format" {
        Bufr => "bufr",
        Binary => "binary",
        Hdf5 => "hdf5",
    }
}

impl RadarDataFormat {
    /// HDF5 sweeps are split into subsets.
    pub fn requires_subset(&self) -> bool {
        matches!(self, RadarDataFormat::Hdf5)
    }

    /// Whether the provider publishes `-latest-` alias files in this format.
    pub fn has_latest_files(&self) -> bool {
        !matches!(self, RadarDataFormat::Hdf5)
    }
}

tag_enum! {
    RadarDataSubset, "radar data subset" {
        Simple => "simple",
        Polarimetric => "polarimetric",
    }
}

tag_enum! {
    RadarResolution, "radar resolution" {
        Minute5 => "minute_5",
        Hourly => "hourly",
        Daily => "daily",
    }
}

impl RadarResolution {
    /// Interval covered by one file of this resolution.
    pub fn step(&self) -> TimeDelta {
        match self {
            RadarResolution::Minute5 => TimeDelta::minutes(5),
            RadarResolution::Hourly => TimeDelta::hours(1),
            RadarResolution::Daily => TimeDelta::days(1),
        }
    }
}

tag_enum! {
    RadarPeriod, "radar period" {
        Historical => "historical",
        Recent => "recent",
        Now => "now",
    }
}

tag_enum! {
    /// Symbolic request dates.
    RadarDate, "radar date keyword" {
        /// The provider's `-latest-` alias file.
        Latest => "latest",
        /// The resolution-aligned interval containing the current time.
        Current => "current",
        /// The newest file in the listing.
        MostRecent => "most_recent",
    }
}

/// A request date: a keyword, a timestamp, or text holding either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadarDateInput {
    Keyword(RadarDate),
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl From<RadarDate> for RadarDateInput {
    fn from(keyword: RadarDate) -> Self {
        RadarDateInput::Keyword(keyword)
    }
}

impl From<DateTime<Utc>> for RadarDateInput {
    fn from(timestamp: DateTime<Utc>) -> Self {
        RadarDateInput::Timestamp(timestamp)
    }
}

impl From<NaiveDateTime> for RadarDateInput {
    fn from(timestamp: NaiveDateTime) -> Self {
        RadarDateInput::Timestamp(timestamp.and_utc())
    }
}

impl From<&str> for RadarDateInput {
    fn from(text: &str) -> Self {
        RadarDateInput::Text(text.to_string())
    }
}

impl From<String> for RadarDateInput {
    fn from(text: String) -> Self {
        RadarDateInput::Text(text)
    }
}

/// A parsed request date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RadarDateValue {
    Keyword(RadarDate),
    Timestamp(DateTime<Utc>),
}

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

impl RadarDateInput {
    /// Parses the input; `argument` names the request field in error messages.
    pub(crate) fn parse(self, argument: &str) -> Result<RadarDateValue, RadarRequestError> {
        match self {
            RadarDateInput::Keyword(keyword) => Ok(RadarDateValue::Keyword(keyword)),
            RadarDateInput::Timestamp(timestamp) => Ok(RadarDateValue::Timestamp(timestamp)),
            RadarDateInput::Text(text) => parse_date_text(&text).ok_or_else(|| {
                RadarRequestError::InvalidArgument(format!(
                    "Argument '{}' must be a timestamp or one of LATEST, CURRENT, MOST_RECENT, got '{}'",
                    argument, text
                ))
            }),
        }
    }
}

fn parse_date_text(text: &str) -> Option<RadarDateValue> {
    let text = text.trim();
    if let Ok(keyword) = text.parse::<RadarDate>() {
        return Some(RadarDateValue::Keyword(keyword));
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(RadarDateValue::Timestamp(timestamp.with_timezone(&Utc)));
    }
    let naive = TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    Some(RadarDateValue::Timestamp(naive.and_utc()))
}
