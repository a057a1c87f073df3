//! Error types for netCDF source operations.

use thiserror::Error;

/// Result type for netCDF source operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for netCDF sources.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error raised by the netCDF library
    #[error("netCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Time `units` attribute that is not "<unit> since <date>"
    #[error("Unsupported time units: '{0}'")]
    UnsupportedTimeUnits(String),

    /// Calendar other than standard/gregorian/proleptic_gregorian
    #[error("Unsupported calendar: '{0}'")]
    UnsupportedCalendar(String),
}

impl NetCdfError {
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingData(what.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }
}
