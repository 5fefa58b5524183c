//! Declarative request rules per parameter family, checked in a fixed order. The first
//! failing rule decides the error a caller sees.

use crate::radar::error::RadarRequestError;
use crate::radar::metadata::{
    ParameterFamily, RadarDataFormat, RadarDataSubset, RadarDate, RadarDateValue,
    RadarParameter, RadarPeriod, RadarResolution,
};
use crate::radar::sites::RadarSite;
use log::debug;

/// Highest elevation index of a volume sweep.
pub const MAX_ELEVATION: u8 = 9;

/// What a parameter family accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyRules {
    pub family: ParameterFamily,
    pub requires_site: bool,
    pub requires_format: bool,
    /// Format applied when the caller gives none.
    pub default_format: Option<RadarDataFormat>,
    pub formats: &'static [RadarDataFormat],
    /// Whether `-latest-` alias files exist for the family.
    pub has_latest_files: bool,
    /// Allowed resolutions; the first one is the default.
    pub resolutions: &'static [RadarResolution],
    /// Allowed periods; the first one is the default.
    pub periods: &'static [RadarPeriod],
}

static COMPOSITE: FamilyRules = FamilyRules {
    family: ParameterFamily::Composite,
    requires_site: false,
    requires_format: false,
    default_format: None,
    formats: &[RadarDataFormat::Bufr, RadarDataFormat::Binary],
    has_latest_files: true,
    resolutions: &[RadarResolution::Minute5],
    periods: &[RadarPeriod::Now],
};

static RADOLAN: FamilyRules = FamilyRules {
    family: ParameterFamily::Radolan,
    requires_site: false,
    requires_format: false,
    default_format: Some(RadarDataFormat::Binary),
    formats: &[RadarDataFormat::Binary],
    has_latest_files: true,
    resolutions: &[RadarResolution::Hourly, RadarResolution::Minute5],
    periods: &[RadarPeriod::Now],
};

static RADOLAN_CDC: FamilyRules = FamilyRules {
    family: ParameterFamily::RadolanCdc,
    requires_site: false,
    requires_format: false,
    default_format: Some(RadarDataFormat::Binary),
    formats: &[RadarDataFormat::Binary],
    has_latest_files: false,
    resolutions: &[RadarResolution::Hourly, RadarResolution::Daily],
    periods: &[RadarPeriod::Recent, RadarPeriod::Historical],
};

static RADVOR: FamilyRules = FamilyRules {
    family: ParameterFamily::Radvor,
    requires_site: false,
    requires_format: false,
    default_format: Some(RadarDataFormat::Binary),
    formats: &[RadarDataFormat::Binary],
    has_latest_files: true,
    resolutions: &[RadarResolution::Minute5],
    periods: &[RadarPeriod::Now],
};

static SITE: FamilyRules = FamilyRules {
    family: ParameterFamily::Site,
    requires_site: true,
    requires_format: true,
    default_format: None,
    formats: &[RadarDataFormat::Bufr, RadarDataFormat::Binary],
    has_latest_files: true,
    resolutions: &[RadarResolution::Minute5],
    periods: &[RadarPeriod::Now],
};

static SWEEP: FamilyRules = FamilyRules {
    family: ParameterFamily::Sweep,
    requires_site: true,
    requires_format: true,
    default_format: None,
    formats: &[RadarDataFormat::Bufr, RadarDataFormat::Hdf5],
    has_latest_files: true,
    resolutions: &[RadarResolution::Minute5],
    periods: &[RadarPeriod::Now],
};

impl ParameterFamily {
    pub fn rules(&self) -> &'static FamilyRules {
        match self {
            ParameterFamily::Composite => &COMPOSITE,
            ParameterFamily::Radolan => &RADOLAN,
            ParameterFamily::RadolanCdc => &RADOLAN_CDC,
            ParameterFamily::Radvor => &RADVOR,
            ParameterFamily::Site => &SITE,
            ParameterFamily::Sweep => &SWEEP,
        }
    }
}

/// Parsed request fields as the rules see them, before defaults are applied.
#[derive(Debug, Clone)]
pub(crate) struct RuleInput {
    pub parameter: RadarParameter,
    pub format: Option<RadarDataFormat>,
    pub site: Option<RadarSite>,
    pub subset: Option<RadarDataSubset>,
    pub elevation: Option<u8>,
    pub resolution: Option<RadarResolution>,
    pub period: Option<RadarPeriod>,
    pub start_date: Option<RadarDateValue>,
    pub end_date: Option<RadarDateValue>,
}

impl RuleInput {
    fn rules(&self) -> &'static FamilyRules {
        self.parameter.family().rules()
    }

    fn wants_latest(&self) -> bool {
        self.start_date == Some(RadarDateValue::Keyword(RadarDate::Latest))
    }

    /// The caller's format, or the family default.
    fn effective_format(&self) -> Option<RadarDataFormat> {
        self.format.or(self.rules().default_format)
    }
}

type Rule = fn(&RuleInput) -> Result<(), RadarRequestError>;

/// Evaluation order of the request rules.
const RULES: [(&str, Rule); 11] = [
    ("resolution", resolution_allowed),
    ("period", period_allowed),
    ("site", site_required),
    ("format", format_required),
    ("format support", format_allowed),
    ("latest for family", latest_for_family),
    ("latest for format", latest_for_format),
    ("subset", subset_required),
    ("subset support", subset_allowed),
    ("elevation", elevation_allowed),
    ("dates", date_shape),
];

/// Checks `input` against every rule, returning the first violation.
pub(crate) fn check(input: &RuleInput) -> Result<(), RadarRequestError> {
    for (name, rule) in RULES {
        if let Err(e) = rule(input) {
            debug!(
                "{} request rejected by '{}' rule: {}",
                input.parameter, name, e
            );
            return Err(e);
        }
    }
    Ok(())
}

fn resolution_allowed(input: &RuleInput) -> Result<(), RadarRequestError> {
    match input.resolution {
        Some(resolution) if !input.rules().resolutions.contains(&resolution) => Err(
            RadarRequestError::invalid_enumeration(resolution.as_str(), "resolution for this parameter"),
        ),
        _ => Ok(()),
    }
}

fn period_allowed(input: &RuleInput) -> Result<(), RadarRequestError> {
    match input.period {
        Some(period) if !input.rules().periods.contains(&period) => Err(
            RadarRequestError::invalid_enumeration(period.as_str(), "period for this parameter"),
        ),
        _ => Ok(()),
    }
}

fn site_required(input: &RuleInput) -> Result<(), RadarRequestError> {
    if input.rules().requires_site && input.site.is_none() {
        return Err(RadarRequestError::InvalidArgument(
            "Argument 'site' is missing".to_string(),
        ));
    }
    Ok(())
}

fn format_required(input: &RuleInput) -> Result<(), RadarRequestError> {
    if input.rules().requires_format && input.format.is_none() {
        return Err(RadarRequestError::InvalidArgument(
            "Argument 'format' is missing".to_string(),
        ));
    }
    Ok(())
}

fn format_allowed(input: &RuleInput) -> Result<(), RadarRequestError> {
    match input.format {
        Some(format) if !input.rules().formats.contains(&format) => {
            Err(RadarRequestError::InvalidArgument(format!(
                "{} format is not supported for {}",
                format, input.parameter
            )))
        }
        _ => Ok(()),
    }
}

fn latest_for_family(input: &RuleInput) -> Result<(), RadarRequestError> {
    if input.wants_latest() && !input.rules().has_latest_files {
        return Err(RadarRequestError::InvalidArgument(format!(
            "{} data has no '-latest-' files",
            input.rules().family
        )));
    }
    Ok(())
}

fn latest_for_format(input: &RuleInput) -> Result<(), RadarRequestError> {
    match input.effective_format() {
        Some(format) if input.wants_latest() && !format.has_latest_files() => {
            Err(RadarRequestError::InvalidArgument(format!(
                "{} data has no '-latest-' files",
                format
            )))
        }
        _ => Ok(()),
    }
}

fn subset_required(input: &RuleInput) -> Result<(), RadarRequestError> {
    let needs_subset = input
        .effective_format()
        .is_some_and(|format| format.requires_subset());
    if needs_subset && input.subset.is_none() {
        return Err(RadarRequestError::InvalidArgument(
            "Argument 'subset' is missing".to_string(),
        ));
    }
    Ok(())
}

fn subset_allowed(input: &RuleInput) -> Result<(), RadarRequestError> {
    let takes_subset = input
        .effective_format()
        .is_some_and(|format| format.requires_subset());
    match input.subset {
        Some(subset) if !takes_subset => Err(RadarRequestError::InvalidArgument(format!(
            "Argument 'subset' ({}) is only supported for HDF5 data",
            subset
        ))),
        _ => Ok(()),
    }
}

fn elevation_allowed(input: &RuleInput) -> Result<(), RadarRequestError> {
    let Some(elevation) = input.elevation else {
        return Ok(());
    };
    if !input.parameter.is_volume_sweep() {
        return Err(RadarRequestError::InvalidArgument(format!(
            "Argument 'elevation' is only supported for SWEEP_VOL parameters, not {}",
            input.parameter
        )));
    }
    if elevation > MAX_ELEVATION {
        return Err(RadarRequestError::InvalidArgument(format!(
            "Argument 'elevation' must be between 0 and {}, got {}",
            MAX_ELEVATION, elevation
        )));
    }
    Ok(())
}

fn date_shape(input: &RuleInput) -> Result<(), RadarRequestError> {
    match (input.start_date, input.end_date) {
        (None, _) => Err(RadarRequestError::InvalidArgument(
            "Argument 'start_date' is missing".to_string(),
        )),
        (Some(RadarDateValue::Keyword(keyword)), Some(_)) => {
            Err(RadarRequestError::InvalidArgument(format!(
                "Argument 'end_date' can not be combined with {}",
                keyword
            )))
        }
        (Some(RadarDateValue::Timestamp(_)), Some(RadarDateValue::Keyword(keyword))) => {
            Err(RadarRequestError::InvalidArgument(format!(
                "Argument 'end_date' must be a timestamp, got {}",
                keyword
            )))
        }
        (Some(RadarDateValue::Timestamp(start)), Some(RadarDateValue::Timestamp(end)))
            if end < start =>
        {
            Err(RadarRequestError::InvalidArgument(format!(
                "Argument 'end_date' ({}) must not be before 'start_date' ({})",
                end, start
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn input(parameter: RadarParameter) -> RuleInput {
        RuleInput {
            parameter,
            format: None,
            site: None,
            subset: None,
            elevation: None,
            resolution: None,
            period: None,
            start_date: Some(RadarDateValue::Keyword(RadarDate::MostRecent)),
            end_date: None,
        }
    }

    fn message(input: &RuleInput) -> String {
        check(input).unwrap_err().to_string()
    }

    #[test]
    fn test_every_family_accepts_a_minimal_request() {
        for &parameter in RadarParameter::ALL {
            let mut request = input(parameter);
            let rules = parameter.family().rules();
            if rules.requires_site {
                request.site = Some(RadarSite::Boo);
            }
            if rules.requires_format {
                request.format = Some(rules.formats[0]);
            }
            assert!(check(&request).is_ok(), "{}", parameter);
        }
    }

    #[test]
    fn test_every_family_names_its_missing_fields() {
        for &parameter in RadarParameter::ALL {
            let rules = parameter.family().rules();
            let complete = |request: &mut RuleInput| {
                request.site = Some(RadarSite::Boo);
                request.format = Some(rules.formats[0]);
            };

            let mut without_site = input(parameter);
            complete(&mut without_site);
            without_site.site = None;
            if rules.requires_site {
                assert_eq!(message(&without_site), "Argument 'site' is missing", "{}", parameter);
            } else {
                assert!(check(&without_site).is_ok(), "{}", parameter);
            }

            let mut without_format = input(parameter);
            complete(&mut without_format);
            without_format.format = None;
            if rules.requires_format {
                assert_eq!(
                    message(&without_format),
                    "Argument 'format' is missing",
                    "{}",
                    parameter
                );
            } else {
                assert!(check(&without_format).is_ok(), "{}", parameter);
            }
        }
    }

    #[test]
    fn test_family_defaults_are_allowed_members() {
        for &family in ParameterFamily::ALL {
            let rules = family.rules();
            assert_eq!(rules.family, family);
            assert!(!rules.resolutions.is_empty());
            assert!(!rules.periods.is_empty());
            if let Some(format) = rules.default_format {
                assert!(rules.formats.contains(&format));
            }
        }
    }

    #[test]
    fn test_site_is_checked_before_format_and_latest() {
        let mut request = input(RadarParameter::SweepPcpVelocityH);
        request.start_date = Some(RadarDateValue::Keyword(RadarDate::Latest));
        assert_eq!(message(&request), "Argument 'site' is missing");

        request.site = Some(RadarSite::Boo);
        assert_eq!(message(&request), "Argument 'format' is missing");
    }

    #[test]
    fn test_latest_checks() {
        let mut cdc = input(RadarParameter::RadolanCdc);
        cdc.start_date = Some(RadarDateValue::Keyword(RadarDate::Latest));
        assert_eq!(message(&cdc), "RADOLAN_CDC data has no '-latest-' files");

        let mut sweep = input(RadarParameter::SweepPcpVelocityH);
        sweep.site = Some(RadarSite::Boo);
        sweep.format = Some(RadarDataFormat::Hdf5);
        sweep.start_date = Some(RadarDateValue::Keyword(RadarDate::Latest));
        assert_eq!(message(&sweep), "HDF5 data has no '-latest-' files");
    }

    #[test]
    fn test_subset_rules() {
        let mut sweep = input(RadarParameter::SweepPcpVelocityH);
        sweep.site = Some(RadarSite::Boo);
        sweep.format = Some(RadarDataFormat::Hdf5);
        assert_eq!(message(&sweep), "Argument 'subset' is missing");

        sweep.subset = Some(RadarDataSubset::Simple);
        assert!(check(&sweep).is_ok());

        sweep.format = Some(RadarDataFormat::Bufr);
        assert!(check(&sweep).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_membership_failures_are_enumeration_errors() {
        let mut cdc = input(RadarParameter::RadolanCdc);
        cdc.resolution = Some(RadarResolution::Minute5);
        assert!(check(&cdc).unwrap_err().is_invalid_enumeration());

        let mut composite = input(RadarParameter::PgReflectivity);
        composite.period = Some(RadarPeriod::Historical);
        assert!(check(&composite).unwrap_err().is_invalid_enumeration());
    }

    #[test]
    fn test_format_support() {
        let mut radvor = input(RadarParameter::ReReflectivity);
        radvor.format = Some(RadarDataFormat::Bufr);
        assert_eq!(message(&radvor), "BUFR format is not supported for RE");
    }

    #[test]
    fn test_elevation_rules() {
        let mut volume = input(RadarParameter::SweepVolReflectivityH);
        volume.site = Some(RadarSite::Boo);
        volume.format = Some(RadarDataFormat::Bufr);
        volume.elevation = Some(9);
        assert!(check(&volume).is_ok());

        volume.elevation = Some(10);
        assert!(check(&volume).unwrap_err().is_invalid_argument());

        let mut precipitation = input(RadarParameter::SweepPcpReflectivityH);
        precipitation.site = Some(RadarSite::Boo);
        precipitation.format = Some(RadarDataFormat::Bufr);
        precipitation.elevation = Some(0);
        assert!(check(&precipitation).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_date_shape() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap();
        let mut request = input(RadarParameter::RwReflectivity);

        request.start_date = None;
        assert_eq!(message(&request), "Argument 'start_date' is missing");

        request.start_date = Some(RadarDateValue::Keyword(RadarDate::Current));
        request.end_date = Some(RadarDateValue::Timestamp(start));
        assert!(check(&request).unwrap_err().is_invalid_argument());

        request.start_date = Some(RadarDateValue::Timestamp(start));
        request.end_date = Some(RadarDateValue::Timestamp(start - chrono::TimeDelta::hours(1)));
        assert!(check(&request).unwrap_err().is_invalid_argument());

        request.end_date = Some(RadarDateValue::Timestamp(start));
        assert!(check(&request).is_ok());
    }
}
