//! Collaborator interfaces consumed by the extraction pipeline.
//!
//! File formats, remote access and retry policy live behind these traits;
//! the pipeline only sees grids, variable descriptions and 1D series.

use crate::error::BoxedError;
use crate::types::{ExtractedSeries, Grid, IndicatorGrid, PointOfInterest, VariableDescription};

/// Supplies the static grid and its surface classification for a run.
pub trait GridSource {
    type Error: Into<BoxedError>;

    /// Cell-centre longitudes and latitudes.
    fn load_grid(&self) -> Result<Grid, Self::Error>;

    /// Classification codes for one fixed level/time slice.
    fn load_indicator_grid(&self) -> Result<IndicatorGrid, Self::Error>;
}

/// An opened source holding one target variable.
pub trait DataSource {
    type Error: Into<BoxedError>;

    /// Describe the target variable: dimensionality, layer bounds, time axis.
    fn describe_variable(&self) -> Result<VariableDescription, Self::Error>;

    /// Read the full time series at one cell, and one layer for
    /// depth-resolved variables.
    fn read_series(
        &self,
        y: usize,
        x: usize,
        layer: Option<usize>,
    ) -> Result<ExtractedSeries, Self::Error>;
}

/// Opens the data source a point of interest refers to.
pub trait SourceProvider {
    type Source: DataSource;
    type Error: Into<BoxedError>;

    fn open(&self, poi: &PointOfInterest) -> Result<Self::Source, Self::Error>;
}
