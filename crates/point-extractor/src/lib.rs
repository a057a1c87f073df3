//! Point Time Series Extraction from Curvilinear Model Grids
//!
//! This crate turns a point of interest (longitude, latitude and optional
//! depth) into the time series of the grid cell and vertical layer that
//! contain it:
//!
//! - **Nearest cell**: great-circle distance to every cell of an irregular
//!   lon/lat mesh, ties broken in row-major order
//! - **Water bodies**: cells classified as lake, river or ocean are flagged
//!   and nearby land cells are suggested, without changing what is extracted
//! - **Depth layers**: a depth maps onto the layer whose boundaries enclose it
//!
//! # Architecture
//!
//! ```text
//! PointOfInterest
//!      │
//!      ▼
//! ExtractionPipeline::run_with(pois, provider, observer)
//!      │
//!      ├─► GeoLocator::locate            nearest (y, x), distance
//!      │
//!      ├─► WaterBodyFilter               water? ─► ranked alternatives
//!      │                                           └─► Diagnostic (warning)
//!      │
//!      ├─► DataSource::describe_variable depth-resolved? time steps
//!      │
//!      ├─► DepthResolver::resolve        layer index (depth-resolved only)
//!      │
//!      └─► DataSource::read_series       row i of the output matrix
//!                │
//!                ▼
//!          ExtractionObserver::on_row (e.g. CSV export)
//! ```
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use ndarray::Array3;
//! use point_extractor::testdata::{daily_times, MemoryDataSource, MemorySourceProvider};
//! use point_extractor::{ExtractionPipeline, ExtractorConfig, Grid, IndicatorGrid, PointOfInterest};
//!
//! let grid = Grid::from_vecs(1, 2, vec![0.0, 10.0], vec![0.0, 10.0]).unwrap();
//! let indicator = IndicatorGrid::from_vec(1, 2, vec![8, 8]).unwrap();
//! let pipeline = ExtractionPipeline::new(grid, indicator, &ExtractorConfig::default()).unwrap();
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let values = Array3::from_elem((4, 1, 2), 1.5);
//! let provider = MemorySourceProvider::new()
//!     .with_source("tws.nc", MemoryDataSource::surface("TWS", daily_times(start, 4), values));
//!
//! let pois = vec![PointOfInterest::new("st-1", 0.1, 0.1, "tws.nc")];
//! let output = pipeline.run(&pois, &provider).unwrap();
//! assert_eq!(output.shape(), (1, 4));
//! ```

pub mod config;
pub mod depth;
pub mod error;
pub mod geo;
pub mod pipeline;
pub mod source;
pub mod testdata;
pub mod types;
pub mod water;

// Re-export commonly used types at crate root
pub use config::{ExtractorConfig, DEFAULT_WATER_CODES, EARTH_RADIUS_KM};
pub use depth::{DepthResolver, PARFLOW_LAYER_BOUNDS};
pub use error::{BoxedError, ErrorKind, ExtractError, Result};
pub use geo::{nearest_in, rank_nearest_in, GeoLocator};
pub use pipeline::{Diagnostic, ExtractionObserver, ExtractionOutput, ExtractionPipeline, NoopObserver};
pub use source::{DataSource, GridSource, SourceProvider};
pub use types::{
    Candidate, ExtractedSeries, Grid, GridCell, IndicatorGrid, PointOfInterest, ResolvedDepth,
    ResolvedLocation, RowMetadata, VariableDescription,
};
pub use water::WaterBodyFilter;
