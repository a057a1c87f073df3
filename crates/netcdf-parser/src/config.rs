//! Variable names and slicing options for netCDF sources.

use point_extractor::PARFLOW_LAYER_BOUNDS;
use serde::{Deserialize, Serialize};

/// Where to find the grid, classification and time axis in model files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetCdfSourceConfig {
    /// Longitude variable, 2D `[y, x]` or 1D `[x]`.
    pub lon_variable: String,

    /// Latitude variable, 2D `[y, x]` or 1D `[y]`.
    pub lat_variable: String,

    /// Land-cover classification variable.
    pub indicator_variable: String,

    /// Time index of the classification slice (4D indicator cubes only).
    pub indicator_time_index: usize,

    /// Level index of the classification slice (3D and 4D cubes).
    pub indicator_level_index: usize,

    /// Time coordinate variable of data files.
    pub time_variable: String,

    /// Lower layer boundaries, deepest first. `None` uses
    /// [`PARFLOW_LAYER_BOUNDS`].
    pub layer_bounds: Option<Vec<f64>>,
}

impl Default for NetCdfSourceConfig {
    fn default() -> Self {
        Self {
            lon_variable: "lon".to_string(),
            lat_variable: "lat".to_string(),
            indicator_variable: "Indicator".to_string(),
            indicator_time_index: 0,
            indicator_level_index: 14,
            time_variable: "time".to_string(),
            layer_bounds: None,
        }
    }
}

impl NetCdfSourceConfig {
    /// Layer boundaries applied to depth-resolved variables.
    pub fn layer_bounds(&self) -> Vec<f64> {
        self.layer_bounds
            .clone()
            .unwrap_or_else(|| PARFLOW_LAYER_BOUNDS.to_vec())
    }

    pub fn with_layer_bounds(mut self, bounds: Vec<f64>) -> Self {
        self.layer_bounds = Some(bounds);
        self
    }

    /// Names of coordinate variables that are never selected as a target.
    pub fn coordinate_variables(&self) -> [&str; 3] {
        [&self.lon_variable, &self.lat_variable, &self.time_variable]
    }
}
