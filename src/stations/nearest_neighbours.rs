//! Great-circle nearest-neighbour search over a set of station coordinates.
//!
//! Stations are indexed in an R-tree as points on the unit sphere. The chord length
//! between two such points grows monotonically with their great-circle distance, so the
//! tree's nearest-neighbour iterator visits stations in great-circle order. Reported
//! distances are haversine kilometers on a sphere with Earth's mean radius.

use crate::stations::error::StationError;
use crate::types::coordinates::{validate_latitude, validate_longitude, Coordinates};
use haversine::{distance, Location as HaversineLocation, Units};
use ordered_float::OrderedFloat;
use rstar::primitives::GeomWithData;
use rstar::RTree;

/// A station on the unit sphere, carrying its row index in the station table.
type SpherePoint = GeomWithData<[f64; 3], usize>;

// Squared chord lengths this close are treated as a tie and re-ranked by haversine
// distance and row index.
const TIE_EPSILON: f64 = 1e-12;

/// Per query point, the `k` nearest stations: `distances[i][j]` is the distance in
/// kilometers from query `i` to its `j`-th nearest station, `indices[i][j]` that
/// station's row index. Both are ascending by distance.
pub type NearestNeighbours = (Vec<Vec<f64>>, Vec<Vec<usize>>);

/// Spatial index over a fixed set of station coordinates.
#[derive(Debug, Clone)]
pub struct NearestNeighbourResolver {
    tree: RTree<SpherePoint>,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
}

impl NearestNeighbourResolver {
    /// Indexes the stations given as paired latitude/longitude arrays (degrees).
    ///
    /// # Errors
    ///
    /// Returns [`StationError::InvalidArgument`] when the arrays are empty, differ in length,
    /// or hold a value outside the valid latitude/longitude range (NaN included).
    pub fn new(latitudes: &[f64], longitudes: &[f64]) -> Result<Self, StationError> {
        if latitudes.len() != longitudes.len() {
            return Err(StationError::InvalidArgument(format!(
                "Station coordinates need as many latitudes as longitudes, got {} and {}",
                latitudes.len(),
                longitudes.len()
            )));
        }
        if latitudes.is_empty() {
            return Err(StationError::InvalidArgument(
                "Station coordinates need at least one station".to_string(),
            ));
        }
        for (&latitude, &longitude) in latitudes.iter().zip(longitudes.iter()) {
            validate_latitude(latitude)?;
            validate_longitude(longitude)?;
        }

        let points: Vec<SpherePoint> = latitudes
            .iter()
            .zip(longitudes.iter())
            .enumerate()
            .map(|(i, (&lat, &lon))| SpherePoint::new(to_unit_sphere(lat, lon), i))
            .collect();

        Ok(Self {
            tree: RTree::bulk_load(points),
            latitudes: latitudes.to_vec(),
            longitudes: longitudes.to_vec(),
        })
    }

    /// Number of indexed stations.
    pub fn len(&self) -> usize {
        self.latitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latitudes.is_empty()
    }

    /// Finds the `k` nearest stations for every query point.
    ///
    /// Ties in distance are broken by original row order.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::InvalidArgument`] when `k < 1` or `k` exceeds the number of
    /// indexed stations.
    pub fn resolve(
        &self,
        coordinates: &Coordinates,
        k: usize,
    ) -> Result<NearestNeighbours, StationError> {
        if k < 1 || k > self.len() {
            return Err(StationError::InvalidArgument(format!(
                "Argument 'k' must be between 1 and the number of stations ({}), got {}",
                self.len(),
                k
            )));
        }

        let mut distances = Vec::with_capacity(coordinates.len());
        let mut indices = Vec::with_capacity(coordinates.len());
        for (latitude, longitude) in coordinates.iter() {
            let (row_distances, row_indices): (Vec<f64>, Vec<usize>) =
                self.nearest(latitude, longitude, k).into_iter().unzip();
            distances.push(row_distances);
            indices.push(row_indices);
        }
        Ok((distances, indices))
    }

    /// Haversine distance in kilometers from a query point to the station at `index`,
    /// or `None` when `index` is not a row of the indexed table.
    pub fn distance_km(&self, latitude: f64, longitude: f64, index: usize) -> Option<f64> {
        let station_latitude = *self.latitudes.get(index)?;
        let station_longitude = *self.longitudes.get(index)?;
        Some(great_circle_km(
            latitude,
            longitude,
            station_latitude,
            station_longitude,
        ))
    }

    fn nearest(&self, latitude: f64, longitude: f64, k: usize) -> Vec<(f64, usize)> {
        let query = to_unit_sphere(latitude, longitude);

        let mut candidates: Vec<usize> = Vec::with_capacity(k);
        let mut kth_distance_2 = f64::INFINITY;
        for (point, distance_2) in self.tree.nearest_neighbor_iter_with_distance_2(&query) {
            if candidates.len() >= k && distance_2 > kth_distance_2 + TIE_EPSILON {
                break;
            }
            candidates.push(point.data);
            if candidates.len() == k {
                kth_distance_2 = distance_2;
            }
        }

        let mut ranked: Vec<(f64, usize)> = candidates
            .into_iter()
            .filter_map(|index| {
                self.distance_km(latitude, longitude, index)
                    .map(|dist_km| (dist_km, index))
            })
            .collect();
        ranked.sort_by_key(|&(dist_km, index)| (OrderedFloat(dist_km), index));
        ranked.truncate(k);
        ranked
    }
}

/// Computes, for every query point, the `k` nearest stations by great-circle distance.
///
/// `latitudes` and `longitudes` describe the station table (paired by row index).
///
/// # Errors
///
/// Returns [`StationError::InvalidArgument`] for empty or mismatched station arrays, and
/// when `k < 1` or `k > latitudes.len()`.
///
/// # Examples
///
/// ```
/// use wetterdienst::{derive_nearest_neighbours, Coordinates};
///
/// let query = Coordinates::new(vec![50.0], vec![8.9]).unwrap();
/// let (distances, indices) = derive_nearest_neighbours(
///     &[52.1042, 49.9195],
///     &[8.7521, 8.9671],
///     &query,
///     1,
/// )
/// .unwrap();
/// assert_eq!(indices, vec![vec![1]]);
/// assert!((distances[0][0] - 10.1569).abs() < 1e-3);
/// ```
pub fn derive_nearest_neighbours(
    latitudes: &[f64],
    longitudes: &[f64],
    coordinates: &Coordinates,
    k: usize,
) -> Result<NearestNeighbours, StationError> {
    NearestNeighbourResolver::new(latitudes, longitudes)?.resolve(coordinates, k)
}

pub(crate) fn great_circle_km(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    distance(
        HaversineLocation {
            latitude: lat_a,
            longitude: lon_a,
        },
        HaversineLocation {
            latitude: lat_b,
            longitude: lon_b,
        },
        Units::Kilometers,
    )
}

fn to_unit_sphere(latitude: f64, longitude: f64) -> [f64; 3] {
    let (lat, lon) = (latitude.to_radians(), longitude.to_radians());
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}
