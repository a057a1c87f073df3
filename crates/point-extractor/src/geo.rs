//! Great-circle nearest-cell search over a curvilinear lon/lat grid.
//!
//! Distances use the spherical law of cosines:
//!
//! ```text
//! d = R * acos( sin(lat1)·sin(lat2) + cos(lat1)·cos(lat2)·cos(lon2 - lon1) )
//! ```
//!
//! evaluated for the whole grid in a single `Zip` pass. Ties between equally
//! distant cells are broken by row-major scan order: the cell with the
//! smallest `y`, then the smallest `x`, wins. Cells whose coordinates are
//! NaN (masked) never win and rank after every finite distance.

use std::cmp::Ordering;

use ndarray::{Array2, Zip};

use crate::config::EARTH_RADIUS_KM;
use crate::error::{ExtractError, Result};
use crate::types::{Grid, GridCell};

/// Nearest-neighbour lookup on a sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocator {
    earth_radius_km: f64,
}

impl Default for GeoLocator {
    fn default() -> Self {
        Self::new(EARTH_RADIUS_KM)
    }
}

impl GeoLocator {
    pub fn new(earth_radius_km: f64) -> Self {
        Self { earth_radius_km }
    }

    pub fn earth_radius_km(&self) -> f64 {
        self.earth_radius_km
    }

    /// Distance in km from `(lon, lat)` to every cell centre of `grid`.
    pub fn distances(&self, grid: &Grid, lon: f64, lat: f64) -> Array2<f64> {
        let lon1 = lon.to_radians();
        let (sin_lat1, cos_lat1) = lat.to_radians().sin_cos();
        let radius = self.earth_radius_km;

        Zip::from(grid.lon())
            .and(grid.lat())
            .map_collect(|&lon2, &lat2| {
                let (sin_lat2, cos_lat2) = lat2.to_radians().sin_cos();
                let cos_angle =
                    sin_lat1 * sin_lat2 + cos_lat1 * cos_lat2 * (lon2.to_radians() - lon1).cos();
                // Rounding can push coincident points just past 1.0.
                radius * cos_angle.clamp(-1.0, 1.0).acos()
            })
    }

    /// Find the grid cell closest to `(lon, lat)`.
    pub fn locate(&self, grid: &Grid, lon: f64, lat: f64) -> Result<GridCell> {
        nearest_in(&self.distances(grid, lon, lat)).ok_or(ExtractError::NoValidCell { lon, lat })
    }

    /// Every grid cell ordered by ascending distance to `(lon, lat)`.
    pub fn rank_by_distance(&self, grid: &Grid, lon: f64, lat: f64) -> Vec<GridCell> {
        let mut cells = collect_cells(&self.distances(grid, lon, lat));
        // Stable sort over row-major input keeps scan order among ties.
        cells.sort_by(|a, b| distance_order(a.distance_km, b.distance_km));
        cells
    }

    /// The `count` nearest cells, ordered exactly as
    /// [`rank_by_distance`](Self::rank_by_distance) would order them.
    pub fn rank_nearest(&self, grid: &Grid, lon: f64, lat: f64, count: usize) -> Vec<GridCell> {
        rank_nearest_in(&self.distances(grid, lon, lat), count)
    }
}

/// First finite minimum of a distance array in row-major order.
pub fn nearest_in(distances: &Array2<f64>) -> Option<GridCell> {
    let mut nearest: Option<GridCell> = None;
    for ((y, x), &distance_km) in distances.indexed_iter() {
        if distance_km.is_nan() {
            continue;
        }
        // Strict comparison keeps the first occurrence on ties.
        if nearest.map_or(true, |best| distance_km < best.distance_km) {
            nearest = Some(GridCell { y, x, distance_km });
        }
    }
    nearest
}

/// The `count` smallest entries of a distance array, in ranking order.
pub fn rank_nearest_in(distances: &Array2<f64>, count: usize) -> Vec<GridCell> {
    if count == 0 {
        return Vec::new();
    }
    let mut cells = collect_cells(distances);
    if count < cells.len() {
        cells.select_nth_unstable_by(count - 1, rank_order);
        cells.truncate(count);
    }
    cells.sort_unstable_by(rank_order);
    cells
}

/// Ascending distance with NaN after every number, whatever its sign bit.
fn distance_order(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.total_cmp(&b),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}

fn collect_cells(distances: &Array2<f64>) -> Vec<GridCell> {
    distances
        .indexed_iter()
        .map(|((y, x), &distance_km)| GridCell { y, x, distance_km })
        .collect()
}

/// Total order: distance, then row-major position.
fn rank_order(a: &GridCell, b: &GridCell) -> Ordering {
    distance_order(a.distance_km, b.distance_km)
        .then(a.y.cmp(&b.y))
        .then(a.x.cmp(&b.x))
}
