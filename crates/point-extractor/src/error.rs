//! Error types for point extraction.

use thiserror::Error;

/// Boxed error raised by a data-source collaborator or an output observer.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Broad classification of an [`ExtractError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input: depth outside the model domain, missing POI fields,
    /// series that cannot share one output matrix.
    Configuration,
    /// Malformed grid or indicator arrays.
    Grid,
    /// A data source or exporter failed.
    Source,
}

/// Errors that can occur while resolving and extracting point series.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Requested depth lies below the deepest layer boundary.
    #[error("requested depth {depth} m is outside the model domain (valid range {min} m to {max} m)")]
    DepthOutOfRange { depth: f64, min: f64, max: f64 },

    /// Requested depth is negative or not a number.
    #[error("invalid depth {0} m: depth must be a finite value >= 0")]
    InvalidDepth(f64),

    /// Layer boundaries are empty, non-positive or not strictly decreasing.
    #[error("invalid layer bounds: {0}")]
    InvalidLayerBounds(String),

    /// A point of interest lacks a field required for its variable.
    #[error("point of interest '{poi}' is missing required field '{field}'")]
    MissingField { poi: String, field: &'static str },

    /// A point of interest has coordinates that cannot be located.
    #[error("point of interest '{poi}' has invalid coordinates: {message}")]
    InvalidCoordinates { poi: String, message: String },

    /// Series lengths differ between points of one run.
    #[error("series for '{poi}' has {found} time steps, expected {expected} like the rest of the run")]
    SeriesLengthMismatch {
        poi: String,
        expected: usize,
        found: usize,
    },

    /// Invalid extractor configuration.
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// The grid contains no cells.
    #[error("grid is empty")]
    EmptyGrid,

    /// Arrays that must share a shape do not.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// No grid cell has a finite distance to the target.
    #[error("no grid cell with valid coordinates near ({lon}, {lat})")]
    NoValidCell { lon: f64, lat: f64 },

    /// A grid index lies outside the array.
    #[error("grid index ({y}, {x}) is outside grid of shape ({ny}, {nx})")]
    IndexOutOfBounds {
        y: usize,
        x: usize,
        ny: usize,
        nx: usize,
    },

    /// A grid or data source could not be opened or read.
    #[error("data source failed for '{context}': {source}")]
    Source {
        context: String,
        #[source]
        source: BoxedError,
    },

    /// An observer failed to consume an extracted row.
    #[error("export failed for '{poi}': {source}")]
    Export {
        poi: String,
        #[source]
        source: BoxedError,
    },
}

impl ExtractError {
    /// Create a Source error.
    pub fn source_failed(context: impl Into<String>, source: impl Into<BoxedError>) -> Self {
        Self::Source {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Create an Export error.
    pub fn export_failed(poi: impl Into<String>, source: impl Into<BoxedError>) -> Self {
        Self::Export {
            poi: poi.into(),
            source: source.into(),
        }
    }

    /// Create an InvalidLayerBounds error.
    pub fn invalid_bounds(msg: impl Into<String>) -> Self {
        Self::InvalidLayerBounds(msg.into())
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DepthOutOfRange { .. }
            | Self::InvalidDepth(_)
            | Self::InvalidLayerBounds(_)
            | Self::MissingField { .. }
            | Self::InvalidCoordinates { .. }
            | Self::SeriesLengthMismatch { .. }
            | Self::InvalidConfig(_) => ErrorKind::Configuration,

            Self::EmptyGrid
            | Self::ShapeMismatch(_)
            | Self::NoValidCell { .. }
            | Self::IndexOutOfBounds { .. } => ErrorKind::Grid,

            Self::Source { .. } | Self::Export { .. } => ErrorKind::Source,
        }
    }
}

/// Result type for point extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;
