use crate::radar::error::RadarRequestError;
use crate::radar::metadata::{
    ParameterFamily, RadarDataFormat, RadarDataSubset, RadarDate, RadarDateInput,
    RadarDateValue, RadarParameter, RadarPeriod, RadarResolution, TagInput,
};
use crate::radar::rules::{self, RuleInput};
use crate::radar::sites::RadarSite;
use bon::bon;
use chrono::{DateTime, DurationRound, Utc};
use log::debug;
use std::fmt;

/// Which files of a listing a request selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// The provider's `-latest-` alias file.
    LatestFile,
    /// Files stamped inside the resolution-aligned interval containing the request time.
    CurrentInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// The newest regular file.
    MostRecentFile,
    /// Files stamped in `[start, end)`.
    TimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl FetchStrategy {
    /// Half-open interval a timestamped strategy covers.
    pub fn interval(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match *self {
            FetchStrategy::CurrentInterval { start, end } | FetchStrategy::TimeRange { start, end } => {
                Some((start, end))
            }
            FetchStrategy::LatestFile | FetchStrategy::MostRecentFile => None,
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStrategy::LatestFile => write!(f, "latest file"),
            FetchStrategy::MostRecentFile => write!(f, "most recent file"),
            FetchStrategy::CurrentInterval { start, end } | FetchStrategy::TimeRange { start, end } => {
                write!(f, "{} to {}", start, end)
            }
        }
    }
}

/// A radar request that passed every rule of its parameter family.
///
/// Defaults are already applied: resolution and period fall back to the family's first
/// allowed value, the format to the family default where one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadarRequest {
    parameter: RadarParameter,
    format: Option<RadarDataFormat>,
    site: Option<RadarSite>,
    subset: Option<RadarDataSubset>,
    elevation: Option<u8>,
    resolution: RadarResolution,
    period: RadarPeriod,
    strategy: FetchStrategy,
}

#[bon]
impl RadarRequest {
    /// Validates a radar request.
    ///
    /// Tag arguments accept the typed enum or its text; dates accept a timestamp, a
    /// [`RadarDate`] keyword or text holding either. `now` anchors [`RadarDate::Current`]
    /// and defaults to the current time.
    ///
    /// # Errors
    ///
    /// [`RadarRequestError::InvalidEnumeration`] for unknown tags or a resolution/period the
    /// parameter does not offer, [`RadarRequestError::InvalidArgument`] for every other
    /// violated rule. Only the first violation is reported.
    ///
    /// # Examples
    ///
    /// ```
    /// use wetterdienst::{FetchStrategy, RadarDate, RadarParameter, RadarRequest};
    ///
    /// let request = RadarRequest::builder()
    ///     .parameter(RadarParameter::PeEchoTop)
    ///     .site("boo")
    ///     .format("bufr")
    ///     .start_date(RadarDate::Latest)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(request.strategy(), FetchStrategy::LatestFile);
    ///
    /// let err = RadarRequest::builder()
    ///     .parameter("radolan_cdc")
    ///     .start_date("latest")
    ///     .build()
    ///     .unwrap_err();
    /// assert_eq!(err.to_string(), "RADOLAN_CDC data has no '-latest-' files");
    /// ```
    #[builder]
    pub fn new(
        #[builder(into)] parameter: TagInput<RadarParameter>,
        #[builder(into)] format: Option<TagInput<RadarDataFormat>>,
        #[builder(into)] site: Option<TagInput<RadarSite>>,
        #[builder(into)] subset: Option<TagInput<RadarDataSubset>>,
        elevation: Option<u8>,
        #[builder(into)] resolution: Option<TagInput<RadarResolution>>,
        #[builder(into)] period: Option<TagInput<RadarPeriod>>,
        #[builder(into)] start_date: Option<RadarDateInput>,
        #[builder(into)] end_date: Option<RadarDateInput>,
        #[builder(default = Utc::now())] now: DateTime<Utc>,
    ) -> Result<Self, RadarRequestError> {
        let input = RuleInput {
            parameter: parameter.parse()?,
            resolution: resolution.map(TagInput::parse).transpose()?,
            period: period.map(TagInput::parse).transpose()?,
            format: format.map(TagInput::parse).transpose()?,
            site: site.map(TagInput::parse).transpose()?,
            subset: subset.map(TagInput::parse).transpose()?,
            elevation,
            start_date: start_date.map(|date| date.parse("start_date")).transpose()?,
            end_date: end_date.map(|date| date.parse("end_date")).transpose()?,
        };
        rules::check(&input)?;
        let request = Self::from_checked(input, now)?;
        debug!("Validated radar request {:?}", request);
        Ok(request)
    }
}

impl RadarRequest {
    fn from_checked(input: RuleInput, now: DateTime<Utc>) -> Result<Self, RadarRequestError> {
        let rules = input.parameter.family().rules();
        let resolution = input.resolution.unwrap_or(rules.resolutions[0]);
        let period = input.period.unwrap_or(rules.periods[0]);
        let step = resolution.step();

        let strategy = match input.start_date {
            Some(RadarDateValue::Keyword(RadarDate::Latest)) => FetchStrategy::LatestFile,
            Some(RadarDateValue::Keyword(RadarDate::MostRecent)) => FetchStrategy::MostRecentFile,
            Some(RadarDateValue::Keyword(RadarDate::Current)) => {
                let start = now.duration_trunc(step).map_err(|e| {
                    RadarRequestError::InvalidArgument(format!(
                        "Can not align {} to {} intervals: {}",
                        now, resolution, e
                    ))
                })?;
                FetchStrategy::CurrentInterval {
                    start,
                    end: start + step,
                }
            }
            Some(RadarDateValue::Timestamp(start)) => {
                let end = match input.end_date {
                    Some(RadarDateValue::Timestamp(end)) if end > start => end,
                    _ => start + step,
                };
                FetchStrategy::TimeRange { start, end }
            }
            None => {
                return Err(RadarRequestError::InvalidArgument(
                    "Argument 'start_date' is missing".to_string(),
                ))
            }
        };

        Ok(Self {
            parameter: input.parameter,
            format: input.format.or(rules.default_format),
            site: input.site,
            subset: input.subset,
            elevation: input.elevation,
            resolution,
            period,
            strategy,
        })
    }

    pub fn parameter(&self) -> RadarParameter {
        self.parameter
    }

    pub fn family(&self) -> ParameterFamily {
        self.parameter.family()
    }

    pub fn format(&self) -> Option<RadarDataFormat> {
        self.format
    }

    pub fn site(&self) -> Option<RadarSite> {
        self.site
    }

    pub fn subset(&self) -> Option<RadarDataSubset> {
        self.subset
    }

    pub fn elevation(&self) -> Option<u8> {
        self.elevation
    }

    pub fn resolution(&self) -> RadarResolution {
        self.resolution
    }

    pub fn period(&self) -> RadarPeriod {
        self.period
    }

    pub fn strategy(&self) -> FetchStrategy {
        self.strategy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 6, 1, hour, minute, second).unwrap()
    }

    #[test]
    fn test_site_request_without_format() {
        let err = RadarRequest::builder()
            .parameter(RadarParameter::PeEchoTop)
            .site(RadarSite::Boo)
            .start_date(Utc::now())
            .build()
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().starts_with("Argument 'format' is missing"));
    }

    #[test]
    fn test_site_request_without_site() {
        for parameter in [RadarParameter::PeEchoTop, RadarParameter::DxReflectivity] {
            let err = RadarRequest::builder()
                .parameter(parameter)
                .format(RadarDataFormat::Bufr)
                .start_date(RadarDate::MostRecent)
                .build()
                .unwrap_err();
            assert!(err.is_invalid_argument());
            assert!(err.to_string().starts_with("Argument 'site' is missing"));
        }
    }

    #[test]
    fn test_sweep_hdf5_latest() {
        let err = RadarRequest::builder()
            .parameter(RadarParameter::SweepPcpVelocityH)
            .site(RadarSite::Boo)
            .format(RadarDataFormat::Hdf5)
            .start_date(RadarDate::Latest)
            .build()
            .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("HDF5 data has no '-latest-' files"));
    }

    #[test]
    fn test_sweep_without_format() {
        let err = RadarRequest::builder()
            .parameter(RadarParameter::SweepPcpVelocityH)
            .site(RadarSite::Boo)
            .start_date(RadarDate::Current)
            .build()
            .unwrap_err();
        assert!(err.to_string().starts_with("Argument 'format' is missing"));
    }

    #[test]
    fn test_sweep_without_site() {
        let err = RadarRequest::builder()
            .parameter(RadarParameter::SweepPcpVelocityH)
            .start_date(RadarDate::Latest)
            .build()
            .unwrap_err();
        assert!(err.to_string().starts_with("Argument 'site' is missing"));
    }

    #[test]
    fn test_hdf5_without_subset() {
        let err = RadarRequest::builder()
            .parameter(RadarParameter::SweepPcpVelocityH)
            .site(RadarSite::Boo)
            .format(RadarDataFormat::Hdf5)
            .start_date(RadarDate::MostRecent)
            .build()
            .unwrap_err();
        assert!(err.to_string().starts_with("Argument 'subset' is missing"));
    }

    #[test]
    fn test_radolan_cdc_latest() {
        for resolution in [RadarResolution::Daily, RadarResolution::Hourly] {
            let err = RadarRequest::builder()
                .parameter(RadarParameter::RadolanCdc)
                .resolution(resolution)
                .start_date(RadarDate::Latest)
                .build()
                .unwrap_err();
            assert!(err
                .to_string()
                .starts_with("RADOLAN_CDC data has no '-latest-' files"));
        }
    }

    #[test]
    fn test_radolan_cdc_invalid_resolution() {
        let err = RadarRequest::builder()
            .parameter(RadarParameter::RadolanCdc)
            .resolution("minute_1")
            .period(RadarPeriod::Recent)
            .start_date("2019-08-08 00:50:00")
            .build()
            .unwrap_err();
        assert!(err.is_invalid_enumeration());

        let err = RadarRequest::builder()
            .parameter(RadarParameter::RadolanCdc)
            .resolution(RadarResolution::Minute5)
            .start_date("2019-08-08 00:50:00")
            .build()
            .unwrap_err();
        assert!(err.is_invalid_enumeration());
    }

    #[test]
    fn test_unknown_parameter_text() {
        let err = RadarRequest::builder()
            .parameter("pq")
            .start_date(RadarDate::Latest)
            .build()
            .unwrap_err();
        assert!(err.is_invalid_enumeration());
    }

    #[test]
    fn test_defaults_applied() {
        let request = RadarRequest::builder()
            .parameter("radolan_cdc")
            .start_date("2019-08-08 00:50:00")
            .build()
            .unwrap();
        assert_eq!(request.resolution(), RadarResolution::Hourly);
        assert_eq!(request.period(), RadarPeriod::Recent);
        assert_eq!(request.format(), Some(RadarDataFormat::Binary));
        assert_eq!(request.family(), ParameterFamily::RadolanCdc);

        let composite = RadarRequest::builder()
            .parameter(RadarParameter::WxReflectivity)
            .start_date(RadarDate::MostRecent)
            .build()
            .unwrap();
        assert_eq!(composite.format(), None);
        assert_eq!(composite.strategy(), FetchStrategy::MostRecentFile);
    }

    #[test]
    fn test_time_range_end_defaults_to_one_step() {
        let request = RadarRequest::builder()
            .parameter(RadarParameter::RadolanCdc)
            .resolution(RadarResolution::Daily)
            .period(RadarPeriod::Recent)
            .start_date("2099-01-01 00:50:00")
            .build()
            .unwrap();
        let start = Utc.with_ymd_and_hms(2099, 1, 1, 0, 50, 0).unwrap();
        assert_eq!(
            request.strategy(),
            FetchStrategy::TimeRange {
                start,
                end: start + TimeDelta::days(1),
            }
        );
    }

    #[test]
    fn test_explicit_end_date() {
        let request = RadarRequest::builder()
            .parameter(RadarParameter::DxReflectivity)
            .site("BOO")
            .format("binary")
            .start_date(at(10, 0, 0))
            .end_date(at(11, 0, 0))
            .build()
            .unwrap();
        assert_eq!(
            request.strategy().interval(),
            Some((at(10, 0, 0), at(11, 0, 0)))
        );
    }

    #[test]
    fn test_current_interval_is_aligned() {
        let request = RadarRequest::builder()
            .parameter(RadarParameter::PgReflectivity)
            .start_date(RadarDate::Current)
            .now(at(10, 7, 31))
            .build()
            .unwrap();
        assert_eq!(
            request.strategy(),
            FetchStrategy::CurrentInterval {
                start: at(10, 5, 0),
                end: at(10, 10, 0),
            }
        );

        let hourly = RadarRequest::builder()
            .parameter(RadarParameter::RwReflectivity)
            .start_date("current")
            .now(at(10, 7, 31))
            .build()
            .unwrap();
        assert_eq!(hourly.strategy().interval(), Some((at(10, 0, 0), at(11, 0, 0))));
    }

    #[test]
    fn test_keyword_with_end_date() {
        let err = RadarRequest::builder()
            .parameter(RadarParameter::RwReflectivity)
            .start_date(RadarDate::MostRecent)
            .end_date(at(11, 0, 0))
            .build()
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_volume_sweep_with_elevation() {
        let request = RadarRequest::builder()
            .parameter(RadarParameter::SweepVolReflectivityH)
            .site(RadarSite::Ess)
            .format(RadarDataFormat::Hdf5)
            .subset(RadarDataSubset::Polarimetric)
            .elevation(3)
            .start_date(RadarDate::MostRecent)
            .build()
            .unwrap();
        assert_eq!(request.elevation(), Some(3));
        assert_eq!(request.subset(), Some(RadarDataSubset::Polarimetric));
        assert_eq!(request.site(), Some(RadarSite::Ess));
    }
}
