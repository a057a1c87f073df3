//! In-memory grid and data sources.
//!
//! These implement the collaborator traits over plain arrays so the pipeline
//! can be exercised without any file format. They are used by the test
//! suites of every crate in the workspace.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use ndarray::{s, Array3, Array4};
use thiserror::Error;

use crate::error::ExtractError;
use crate::source::{DataSource, GridSource, SourceProvider};
use crate::types::{ExtractedSeries, Grid, IndicatorGrid, PointOfInterest, VariableDescription};

/// Errors raised by the in-memory sources.
#[derive(Error, Debug)]
pub enum MemorySourceError {
    #[error("no data source registered as '{0}'")]
    NotFound(String),

    #[error("cell ({y}, {x}) layer {layer:?} is outside the stored data")]
    OutOfRange {
        y: usize,
        x: usize,
        layer: Option<usize>,
    },

    #[error("depth-resolved source read without a layer index")]
    MissingLayer,

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// A grid and indicator grid held in memory.
#[derive(Debug, Clone)]
pub struct MemoryGridSource {
    pub grid: Grid,
    pub indicator: IndicatorGrid,
}

impl MemoryGridSource {
    pub fn new(grid: Grid, indicator: IndicatorGrid) -> Self {
        Self { grid, indicator }
    }
}

impl GridSource for MemoryGridSource {
    type Error = MemorySourceError;

    fn load_grid(&self) -> Result<Grid, Self::Error> {
        Ok(self.grid.clone())
    }

    fn load_indicator_grid(&self) -> Result<IndicatorGrid, Self::Error> {
        Ok(self.indicator.clone())
    }
}

#[derive(Debug, Clone)]
enum MemoryValues {
    /// `[time, y, x]`
    Surface(Array3<f64>),
    /// `[time, layer, y, x]`
    Layered(Array4<f64>, Vec<f64>),
}

/// One variable held in memory.
#[derive(Debug, Clone)]
pub struct MemoryDataSource {
    name: String,
    units: Option<String>,
    times: Vec<DateTime<Utc>>,
    values: MemoryValues,
}

impl MemoryDataSource {
    /// A variable without a vertical dimension, shaped `[time, y, x]`.
    pub fn surface(name: impl Into<String>, times: Vec<DateTime<Utc>>, values: Array3<f64>) -> Self {
        Self {
            name: name.into(),
            units: None,
            times,
            values: MemoryValues::Surface(values),
        }
    }

    /// A depth-resolved variable shaped `[time, layer, y, x]`.
    pub fn layered(
        name: impl Into<String>,
        times: Vec<DateTime<Utc>>,
        values: Array4<f64>,
        layer_lower_bounds: Vec<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            units: None,
            times,
            values: MemoryValues::Layered(values, layer_lower_bounds),
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }
}

impl DataSource for MemoryDataSource {
    type Error = MemorySourceError;

    fn describe_variable(&self) -> Result<VariableDescription, Self::Error> {
        let (is_depth_resolved, layer_lower_bounds, time_steps) = match &self.values {
            MemoryValues::Surface(values) => (false, None, values.dim().0),
            MemoryValues::Layered(values, bounds) => (true, Some(bounds.clone()), values.dim().0),
        };
        Ok(VariableDescription {
            name: self.name.clone(),
            long_name: Some(self.name.clone()),
            units: self.units.clone(),
            institution: None,
            is_depth_resolved,
            layer_lower_bounds,
            time_steps,
            single_precision: false,
        })
    }

    fn read_series(
        &self,
        y: usize,
        x: usize,
        layer: Option<usize>,
    ) -> Result<ExtractedSeries, Self::Error> {
        let out_of_range = || MemorySourceError::OutOfRange { y, x, layer };
        let values: Vec<f64> = match &self.values {
            MemoryValues::Surface(values) => {
                let (_, ny, nx) = values.dim();
                if y >= ny || x >= nx {
                    return Err(out_of_range());
                }
                values.slice(s![.., y, x]).to_vec()
            }
            MemoryValues::Layered(values, _) => {
                let layer = layer.ok_or(MemorySourceError::MissingLayer)?;
                let (_, nz, ny, nx) = values.dim();
                if layer >= nz || y >= ny || x >= nx {
                    return Err(out_of_range());
                }
                values.slice(s![.., layer, y, x]).to_vec()
            }
        };
        let times = self.times.iter().take(values.len()).copied().collect();
        Ok(ExtractedSeries::new(times, values)?)
    }
}

/// Hands out in-memory sources by the point's `source` reference.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceProvider {
    sources: HashMap<String, MemoryDataSource>,
}

impl MemorySourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, reference: impl Into<String>, source: MemoryDataSource) -> Self {
        self.sources.insert(reference.into(), source);
        self
    }
}

impl SourceProvider for MemorySourceProvider {
    type Source = MemoryDataSource;
    type Error = MemorySourceError;

    fn open(&self, poi: &PointOfInterest) -> Result<Self::Source, Self::Error> {
        self.sources
            .get(&poi.source)
            .cloned()
            .ok_or_else(|| MemorySourceError::NotFound(poi.source.clone()))
    }
}

/// `count` daily timestamps starting at `start`.
pub fn daily_times(start: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
    (0..count)
        .map(|day| start + Duration::days(day as i64))
        .collect()
}
