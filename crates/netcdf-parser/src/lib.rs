//! netCDF sources for point time series extraction.
//!
//! This crate implements the collaborator traits of `point-extractor` over
//! netCDF files produced by coupled land-surface models (TSMP ParFlow/CLM):
//!
//! - [`NetCdfGridSource`]: cell-centre lon/lat and the land-cover
//!   `Indicator` slice
//! - [`NetCdfDataSource`]: one target variable, its CF time axis and
//!   per-cell series with fill values masked to NaN
//! - [`NetCdfSourceProvider`]: opens a data source per point of interest
//!
//! # Implementation Notes
//!
//! Files are read with the native `netcdf` crate, which links libnetcdf and
//! HDF5 (system requirements: libhdf5-dev libnetcdf-dev). Remote OPeNDAP
//! URLs work wherever libnetcdf was built with DAP support.

pub mod config;
pub mod data;
pub mod error;
pub mod grid;
pub mod native;
pub mod select;
pub mod time;

pub use config::NetCdfSourceConfig;
pub use data::{NetCdfDataSource, NetCdfSourceProvider};
pub use error::{NetCdfError, NetCdfResult};
pub use grid::NetCdfGridSource;
pub use native::{open_file, silence_hdf5_errors};
pub use select::VariableSelection;
pub use time::{CfTimeAxis, TimeUnit};
