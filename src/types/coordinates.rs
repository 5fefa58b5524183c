//! Geographic coordinate value types used as query input for the station filters
//! and the nearest-neighbour resolver.

use crate::stations::error::StationError;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are represented as `f64` in decimal degrees.
///
/// # Examples
///
/// ```
/// use wetterdienst::LatLon;
///
/// let frankfurt = LatLon(50.1109, 8.6821);
/// assert_eq!(frankfurt.0, 50.1109); // Latitude
/// assert_eq!(frankfurt.1, 8.6821); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// One or more query points, stored as paired latitude/longitude arrays.
///
/// The arrays are paired by index and always have the same, non-zero length.
/// Every latitude lies within `[-90, 90]` and every longitude within `[-180, 180]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
}

impl Coordinates {
    /// Builds a set of query points from paired latitude and longitude arrays (degrees).
    ///
    /// # Errors
    ///
    /// Returns [`StationError::InvalidArgument`] when the arrays differ in length, are empty,
    /// or contain a value outside the valid latitude/longitude range.
    ///
    /// # Examples
    ///
    /// ```
    /// use wetterdienst::Coordinates;
    ///
    /// let points = Coordinates::new(vec![50.0, 51.4], vec![8.9, 9.3]).unwrap();
    /// assert_eq!(points.len(), 2);
    ///
    /// assert!(Coordinates::new(vec![91.0], vec![8.9]).is_err());
    /// ```
    pub fn new(latitudes: Vec<f64>, longitudes: Vec<f64>) -> Result<Self, StationError> {
        if latitudes.len() != longitudes.len() {
            return Err(StationError::InvalidArgument(format!(
                "Coordinates need as many latitudes as longitudes, got {} and {}",
                latitudes.len(),
                longitudes.len()
            )));
        }
        if latitudes.is_empty() {
            return Err(StationError::InvalidArgument(
                "Coordinates need at least one point".to_string(),
            ));
        }
        for (&latitude, &longitude) in latitudes.iter().zip(longitudes.iter()) {
            validate_latitude(latitude)?;
            validate_longitude(longitude)?;
        }
        Ok(Self {
            latitudes,
            longitudes,
        })
    }

    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    pub fn len(&self) -> usize {
        self.latitudes.len()
    }

    /// Always `false`; kept for symmetry with [`Coordinates::len`].
    pub fn is_empty(&self) -> bool {
        self.latitudes.is_empty()
    }

    /// Iterates over the points as `(latitude, longitude)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.latitudes
            .iter()
            .copied()
            .zip(self.longitudes.iter().copied())
    }
}

impl TryFrom<LatLon> for Coordinates {
    type Error = StationError;

    fn try_from(point: LatLon) -> Result<Self, Self::Error> {
        Coordinates::new(vec![point.0], vec![point.1])
    }
}

pub(crate) fn validate_latitude(latitude: f64) -> Result<f64, StationError> {
    ensure_within(latitude, -90.0, 90.0, "latitude")
}

pub(crate) fn validate_longitude(longitude: f64) -> Result<f64, StationError> {
    ensure_within(longitude, -180.0, 180.0, "longitude")
}

fn ensure_within(value: f64, min: f64, max: f64, label: &str) -> Result<f64, StationError> {
    // NaN fails both comparisons, so check containment positively.
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(StationError::InvalidArgument(format!(
            "Argument '{}' must be between {} and {} degrees, got {}",
            label, min, max, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pairs_points_in_order() {
        let coords = Coordinates::new(vec![50.0, 51.4], vec![8.9, 9.3]).unwrap();
        let points: Vec<(f64, f64)> = coords.iter().collect();
        assert_eq!(points, vec![(50.0, 8.9), (51.4, 9.3)]);
        assert_eq!(coords.len(), 2);
        assert!(!coords.is_empty());
    }

    #[test]
    fn test_new_rejects_mismatched_lengths() {
        let err = Coordinates::new(vec![50.0, 51.4], vec![8.9]).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_new_rejects_empty() {
        assert!(Coordinates::new(vec![], vec![]).is_err());
    }

    #[test]
    fn test_new_rejects_out_of_range_values() {
        assert!(Coordinates::new(vec![-90.5], vec![0.0]).is_err());
        assert!(Coordinates::new(vec![0.0], vec![180.1]).is_err());
        assert!(Coordinates::new(vec![f64::NAN], vec![0.0]).is_err());
        assert!(Coordinates::new(vec![90.0], vec![-180.0]).is_ok());
    }

    #[test]
    fn test_try_from_lat_lon() {
        let coords = Coordinates::try_from(LatLon(50.0, 8.9)).unwrap();
        assert_eq!(coords.latitudes(), &[50.0]);
        assert_eq!(coords.longitudes(), &[8.9]);
    }
}
