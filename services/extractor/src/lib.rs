//! Point time series extraction service.
//!
//! Loads a run-control document, resolves every station against the model
//! grid and extracts its series from ParFlow/CLM netCDF output, either as
//! per-station CSV files or as an in-memory matrix.

pub mod config;
pub mod export;
pub mod run;

pub use config::{RunControl, StationEntry, DEFAULT_PRODUCT_TAG};
pub use export::{CsvExporter, ExportError};
pub use run::{execute, format_matrix, OutputFormat, RunOptions};
