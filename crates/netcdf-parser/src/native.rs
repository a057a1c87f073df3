//! Thin helpers over the native netcdf library.
//!
//! Opening files, attribute lookup and fill-value masking shared by the grid
//! and data sources.

use std::path::Path;
use std::sync::Once;

use netcdf::AttributeValue;
use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints diagnostics to stderr even when the Rust side
/// handles the condition, for instance when probing optional attributes:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// Runs once per process; later calls are no-ops. Call it before the first
/// HDF5/netCDF operation, which [`open_file`] does.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and null handlers are a
        // documented way to disable automatic error printing.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Open a netCDF file (or an OPeNDAP URL when libnetcdf supports DAP).
pub fn open_file(path: impl AsRef<Path>) -> NetCdfResult<netcdf::File> {
    silence_hdf5_errors();

    let path = path.as_ref();
    debug!(path = %path.display(), "Opening netCDF file");
    netcdf::open(path).map_err(|e| {
        NetCdfError::invalid(format!("Failed to open {}: {}", path.display(), e))
    })
}

/// Look up a variable or fail with a `MissingData` error.
pub(crate) fn require_variable<'f>(
    file: &'f netcdf::File,
    name: &str,
) -> NetCdfResult<netcdf::Variable<'f>> {
    file.variable(name)
        .ok_or_else(|| NetCdfError::missing(format!("{} variable", name)))
}

/// Variable names in declaration order.
pub(crate) fn variable_names(file: &netcdf::File) -> Vec<String> {
    file.variables().map(|var| var.name()).collect()
}

/// Dimension lengths of a variable.
pub(crate) fn shape_of(var: &netcdf::Variable) -> Vec<usize> {
    var.dimensions().iter().map(|dim| dim.len()).collect()
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get a numeric attribute as f64.
pub(crate) fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

/// Helper to get a text attribute.
pub(crate) fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// Helper to get a global text attribute.
pub(crate) fn get_global_string_attr(file: &netcdf::File, name: &str) -> Option<String> {
    if !file.attributes().any(|attr| attr.name() == name) {
        return None;
    }
    match file.attribute(name)?.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// Values a variable uses to mark missing data.
pub(crate) fn missing_markers(var: &netcdf::Variable) -> Vec<f64> {
    ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|name| get_f64_attr(var, name))
        .collect()
}

/// Replace every marker value with NaN.
pub(crate) fn mask_missing(values: &mut [f64], markers: &[f64]) {
    if markers.is_empty() {
        return;
    }
    for value in values.iter_mut() {
        if markers.contains(value) {
            *value = f64::NAN;
        }
    }
}
