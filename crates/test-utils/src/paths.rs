//! Path utilities for test output.
//!
//! Tests that write netCDF or CSV files do so in throwaway directories so
//! runs never touch the source tree.

/// Creates a temporary directory for test output.
///
/// The directory is automatically deleted when the returned `TempDir` is dropped.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates a temporary directory with a specific prefix.
pub fn temp_test_dir_with_prefix(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temporary directory")
}
