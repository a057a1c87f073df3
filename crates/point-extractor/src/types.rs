//! Core data types for point extraction.

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};

/// Cell-centre coordinates of a curvilinear grid, indexed `[y, x]`, in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    lon: Array2<f64>,
    lat: Array2<f64>,
}

impl Grid {
    /// Create a grid from 2D longitude and latitude arrays of equal shape.
    pub fn new(lon: Array2<f64>, lat: Array2<f64>) -> Result<Self> {
        if lon.dim() != lat.dim() {
            return Err(ExtractError::shape_mismatch(format!(
                "longitude array {:?} and latitude array {:?} differ",
                lon.dim(),
                lat.dim()
            )));
        }
        if lon.is_empty() {
            return Err(ExtractError::EmptyGrid);
        }
        Ok(Self { lon, lat })
    }

    /// Create a grid from row-major coordinate vectors.
    pub fn from_vecs(ny: usize, nx: usize, lon: Vec<f64>, lat: Vec<f64>) -> Result<Self> {
        let lon = Array2::from_shape_vec((ny, nx), lon)
            .map_err(|e| ExtractError::shape_mismatch(format!("longitude: {}", e)))?;
        let lat = Array2::from_shape_vec((ny, nx), lat)
            .map_err(|e| ExtractError::shape_mismatch(format!("latitude: {}", e)))?;
        Self::new(lon, lat)
    }

    /// Grid shape as `(ny, nx)`.
    pub fn shape(&self) -> (usize, usize) {
        self.lon.dim()
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.lon.len()
    }

    /// Always false; empty grids are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.lon.is_empty()
    }

    pub fn lon(&self) -> &Array2<f64> {
        &self.lon
    }

    pub fn lat(&self) -> &Array2<f64> {
        &self.lat
    }

    /// Coordinates `(lon, lat)` of cell `(y, x)`.
    pub fn coord(&self, y: usize, x: usize) -> Option<(f64, f64)> {
        Some((*self.lon.get((y, x))?, *self.lat.get((y, x))?))
    }
}

/// Per-cell surface classification codes, same shape as the [`Grid`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorGrid {
    codes: Array2<i32>,
}

impl IndicatorGrid {
    pub fn new(codes: Array2<i32>) -> Result<Self> {
        if codes.is_empty() {
            return Err(ExtractError::EmptyGrid);
        }
        Ok(Self { codes })
    }

    /// Create an indicator grid from a row-major code vector.
    pub fn from_vec(ny: usize, nx: usize, codes: Vec<i32>) -> Result<Self> {
        let codes = Array2::from_shape_vec((ny, nx), codes)
            .map_err(|e| ExtractError::shape_mismatch(format!("indicator: {}", e)))?;
        Self::new(codes)
    }

    pub fn shape(&self) -> (usize, usize) {
        self.codes.dim()
    }

    pub fn codes(&self) -> &Array2<i32> {
        &self.codes
    }

    /// Classification code of cell `(y, x)`.
    pub fn code(&self, y: usize, x: usize) -> Option<i32> {
        self.codes.get((y, x)).copied()
    }

    /// Like [`code`](Self::code) but reports out-of-range indices as errors.
    pub fn code_at(&self, y: usize, x: usize) -> Result<i32> {
        self.code(y, x).ok_or_else(|| {
            let (ny, nx) = self.shape();
            ExtractError::IndexOutOfBounds { y, x, ny, nx }
        })
    }
}

/// A user-specified location to extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    /// Station or record identifier.
    pub id: String,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Depth below the surface in metres; required for depth-resolved variables.
    pub depth: Option<f64>,
    /// Path or URL of the data source holding the target variable.
    pub source: String,
    /// Explicit target variable; when absent the source picks its default.
    pub variable: Option<String>,
}

impl PointOfInterest {
    pub fn new(id: impl Into<String>, longitude: f64, latitude: f64, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            longitude,
            latitude,
            depth: None,
            source: source.into(),
            variable: None,
        }
    }

    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }

    /// Check that the fields every point needs are present and sane.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ExtractError::MissingField {
                poi: self.id.clone(),
                field: "id",
            });
        }
        if self.source.trim().is_empty() {
            return Err(ExtractError::MissingField {
                poi: self.id.clone(),
                field: "source",
            });
        }
        if !self.longitude.is_finite() || !self.latitude.is_finite() {
            return Err(ExtractError::InvalidCoordinates {
                poi: self.id.clone(),
                message: format!("({}, {}) is not finite", self.longitude, self.latitude),
            });
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ExtractError::InvalidCoordinates {
                poi: self.id.clone(),
                message: format!("latitude {} outside [-90, 90]", self.latitude),
            });
        }
        Ok(())
    }
}

/// A grid cell together with its distance to a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub y: usize,
    pub x: usize,
    pub distance_km: f64,
}

/// A non-water cell suggested instead of a water-body match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub y: usize,
    pub x: usize,
    pub lon: f64,
    pub lat: f64,
    pub distance_km: f64,
}

/// Outcome of the horizontal lookup for one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub y: usize,
    pub x: usize,
    pub distance_km: f64,
    /// Indicator code of the matched cell.
    pub indicator_code: i32,
    pub is_water_body: bool,
    /// Nearby non-water cells, nearest first; empty unless `is_water_body`.
    pub alternatives: Vec<Candidate>,
}

/// The vertical layer selected for a requested depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDepth {
    /// Layer index, 0 being the deepest layer.
    pub layer_index: usize,
    /// Deeper boundary of the layer, in metres.
    pub lower_boundary: f64,
    /// Shallower boundary of the layer, in metres (0.0 at the surface).
    pub upper_boundary: f64,
}

/// Description of a data source's target variable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VariableDescription {
    /// Variable name in the source.
    pub name: String,
    /// Human-readable name (`long_name` attribute).
    pub long_name: Option<String>,
    pub units: Option<String>,
    /// Producing institution (global `institution` attribute).
    pub institution: Option<String>,
    /// True when the variable has a vertical layer dimension.
    pub is_depth_resolved: bool,
    /// Lower boundaries of the vertical layers, deepest first.
    pub layer_lower_bounds: Option<Vec<f64>>,
    /// Length of the variable's time axis.
    pub time_steps: usize,
    /// Values are stored as 32-bit floats in the source.
    #[serde(default)]
    pub single_precision: bool,
}

/// A point time series on the source's native time axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractedSeries {
    times: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl ExtractedSeries {
    pub fn new(times: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if times.len() != values.len() {
            return Err(ExtractError::shape_mismatch(format!(
                "{} timestamps for {} values",
                times.len(),
                values.len()
            )));
        }
        Ok(Self { times, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn first_time(&self) -> Option<DateTime<Utc>> {
        self.times.first().copied()
    }

    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.times.last().copied()
    }

    /// Iterate `(timestamp, value)` pairs in time order.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }
}

/// Everything an exporter needs to describe one row of the output matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowMetadata {
    /// Row index in the output matrix.
    pub row: usize,
    pub poi: PointOfInterest,
    pub location: ResolvedLocation,
    /// Present only for depth-resolved variables.
    pub depth: Option<ResolvedDepth>,
    pub variable: VariableDescription,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ndarray::array;

    #[test]
    fn test_grid_shape_mismatch() {
        let lon = array![[0.0, 1.0], [0.0, 1.0]];
        let lat = array![[0.0, 0.0, 0.0]];
        assert!(matches!(
            Grid::new(lon, lat),
            Err(ExtractError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_grid_rejects_empty() {
        let result = Grid::from_vecs(0, 0, vec![], vec![]);
        assert!(matches!(result, Err(ExtractError::EmptyGrid)));
    }

    #[test]
    fn test_grid_coord() {
        let grid = Grid::from_vecs(1, 2, vec![5.0, 6.0], vec![50.0, 51.0]).unwrap();
        assert_eq!(grid.shape(), (1, 2));
        assert_eq!(grid.coord(0, 1), Some((6.0, 51.0)));
        assert_eq!(grid.coord(1, 0), None);
    }

    #[test]
    fn test_indicator_code_at_out_of_bounds() {
        let indicator = IndicatorGrid::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(indicator.code_at(1, 0).unwrap(), 3);
        assert!(matches!(
            indicator.code_at(2, 0),
            Err(ExtractError::IndexOutOfBounds { y: 2, x: 0, ny: 2, nx: 2 })
        ));
    }

    #[test]
    fn test_poi_validation() {
        let poi = PointOfInterest::new("st-1", 6.4, 50.9, "data.nc");
        assert!(poi.validate().is_ok());

        let poi = PointOfInterest::new("", 6.4, 50.9, "data.nc");
        assert!(matches!(
            poi.validate(),
            Err(ExtractError::MissingField { field: "id", .. })
        ));

        let poi = PointOfInterest::new("st-1", 6.4, 50.9, "  ");
        assert!(matches!(
            poi.validate(),
            Err(ExtractError::MissingField { field: "source", .. })
        ));

        let poi = PointOfInterest::new("st-1", 6.4, 95.0, "data.nc");
        assert!(matches!(
            poi.validate(),
            Err(ExtractError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn test_series_length_check() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap();
        assert!(ExtractedSeries::new(vec![t0], vec![1.0, 2.0]).is_err());

        let series = ExtractedSeries::new(vec![t0], vec![1.5]).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.first_time(), Some(t0));
        assert_eq!(series.iter().next(), Some((t0, 1.5)));
    }
}
