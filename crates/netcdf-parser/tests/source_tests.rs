//! Integration tests that write small netCDF files and read them back
//! through the extraction pipeline.

use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use netcdf_parser::{
    NetCdfDataSource, NetCdfError, NetCdfGridSource, NetCdfSourceConfig, NetCdfSourceProvider,
    VariableSelection,
};
use point_extractor::{
    DataSource, ExtractError, ExtractionPipeline, ExtractorConfig, GridSource, PointOfInterest,
};
use test_utils::{
    assert_coords_approx_eq, encode_cell, indicator_codes, regular_mesh, temp_test_dir,
    temp_test_dir_with_prefix,
};

const NX: usize = 4;
const NY: usize = 3;
const NT: usize = 4;
const BOUNDS: [f64; 3] = [2.0, 1.0, 0.5];
const FILL: f64 = -9999.0;

fn config() -> NetCdfSourceConfig {
    NetCdfSourceConfig {
        indicator_level_index: 2,
        ..Default::default()
    }
    .with_layer_bounds(BOUNDS.to_vec())
}

/// Indicator file with 2D lon/lat and a `[time, level, y, x]` cube whose
/// level 2 holds `codes`; every other level is filled with water codes.
fn write_indicator_file(path: &Path, codes: &[i32]) {
    let (lon, lat) = regular_mesh(6.0, 50.0, 0.1, 0.1, NX, NY);
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("time", 1).unwrap();
    file.add_dimension("lev", 3).unwrap();
    file.add_dimension("y", NY).unwrap();
    file.add_dimension("x", NX).unwrap();

    {
        let mut var = file.add_variable::<f64>("lon", &["y", "x"]).unwrap();
        var.put_values(&lon, ..).unwrap();
    }
    {
        let mut var = file.add_variable::<f64>("lat", &["y", "x"]).unwrap();
        var.put_values(&lat, ..).unwrap();
    }
    {
        let mut cube = vec![20; 3 * NY * NX];
        cube[2 * NY * NX..].copy_from_slice(codes);
        let mut var = file
            .add_variable::<i32>("Indicator", &["time", "lev", "y", "x"])
            .unwrap();
        var.put_values(&cube, ..).unwrap();
    }
}

/// Data file with a surface variable `TWS` declared before the layered
/// variable `SWC`, and a daily time axis starting 2024-01-01.
fn write_data_file(path: &Path, calendar: &str) {
    let (lon, lat) = regular_mesh(6.0, 50.0, 0.1, 0.1, NX, NY);
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("time", NT).unwrap();
    file.add_dimension("lev", BOUNDS.len()).unwrap();
    file.add_dimension("y", NY).unwrap();
    file.add_dimension("x", NX).unwrap();
    file.add_attribute("institution", "FZJ IBG-3").unwrap();

    {
        let mut var = file.add_variable::<f64>("time", &["time"]).unwrap();
        var.put_attribute("units", "days since 2024-01-01 00:00:00").unwrap();
        var.put_attribute("calendar", calendar).unwrap();
        let offsets: Vec<f64> = (0..NT).map(|t| t as f64).collect();
        var.put_values(&offsets, ..).unwrap();
    }
    {
        let mut var = file.add_variable::<f64>("lon", &["y", "x"]).unwrap();
        var.put_values(&lon, ..).unwrap();
    }
    {
        let mut var = file.add_variable::<f64>("lat", &["y", "x"]).unwrap();
        var.put_values(&lat, ..).unwrap();
    }
    {
        let mut values = Vec::with_capacity(NT * NY * NX);
        for t in 0..NT {
            for y in 0..NY {
                for x in 0..NX {
                    values.push(encode_cell(t, 0, y, x));
                }
            }
        }
        let mut var = file.add_variable::<f64>("TWS", &["time", "y", "x"]).unwrap();
        var.put_attribute("long_name", "total water storage").unwrap();
        var.put_attribute("units", "mm").unwrap();
        var.put_values(&values, ..).unwrap();
    }
    {
        let mut values = Vec::with_capacity(NT * BOUNDS.len() * NY * NX);
        for t in 0..NT {
            for l in 0..BOUNDS.len() {
                for y in 0..NY {
                    for x in 0..NX {
                        // One masked value at t = 2, layer 1, cell (1, 1).
                        if (t, l, y, x) == (2, 1, 1, 1) {
                            values.push(FILL);
                        } else {
                            values.push(encode_cell(t, l, y, x));
                        }
                    }
                }
            }
        }
        let mut var = file
            .add_variable::<f64>("SWC", &["time", "lev", "y", "x"])
            .unwrap();
        var.put_attribute("long_name", "soil water content").unwrap();
        var.put_attribute("units", "m^3/m^3").unwrap();
        var.put_attribute("_FillValue", FILL).unwrap();
        var.put_values(&values, ..).unwrap();
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    indicator: PathBuf,
    data: PathBuf,
}

fn fixture(codes: &[i32]) -> Fixture {
    let dir = temp_test_dir_with_prefix("netcdf-parser-");
    let indicator = dir.path().join("indicator.nc");
    let data = dir.path().join("parflow.nc");
    write_indicator_file(&indicator, codes);
    write_data_file(&data, "standard");
    Fixture {
        _dir: dir,
        indicator,
        data,
    }
}

fn source_ref(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

// ============================================================================
// Grid source
// ============================================================================

#[test]
fn test_grid_source_reads_mesh_and_indicator_slice() {
    let codes = indicator_codes(NX, NY, 8, &[(1, 2, 19)]);
    let fx = fixture(&codes);
    let source = NetCdfGridSource::new(&fx.indicator, config());

    let grid = source.load_grid().unwrap();
    assert_eq!(grid.shape(), (NY, NX));
    let (lon, lat) = grid.coord(2, 3).unwrap();
    assert_coords_approx_eq!((lon, lat), (6.3, 50.2), 1e-9);

    let indicator = source.load_indicator_grid().unwrap();
    assert_eq!(indicator.code(1, 2), Some(19));
    assert_eq!(indicator.code(0, 0), Some(8));
}

#[test]
fn test_indicator_level_out_of_range() {
    let fx = fixture(&indicator_codes(NX, NY, 8, &[]));
    let config = NetCdfSourceConfig {
        indicator_level_index: 14,
        ..Default::default()
    };
    let err = NetCdfGridSource::new(&fx.indicator, config)
        .load_indicator_grid()
        .unwrap_err();
    assert!(matches!(err, NetCdfError::InvalidFormat(_)));
    assert!(err.to_string().contains("level"));
}

#[test]
fn test_one_dimensional_axes_are_broadcast() {
    let dir = temp_test_dir();
    let path = dir.path().join("axes.nc");
    {
        let mut file = netcdf::create(&path).unwrap();
        file.add_dimension("lat", 2).unwrap();
        file.add_dimension("lon", 3).unwrap();
        {
            let mut var = file.add_variable::<f64>("lon", &["lon"]).unwrap();
            var.put_values(&[6.0, 6.5, 7.0], ..).unwrap();
        }
        {
            let mut var = file.add_variable::<f64>("lat", &["lat"]).unwrap();
            var.put_values(&[50.0, 51.0], ..).unwrap();
        }
        {
            let mut var = file.add_variable::<i32>("Indicator", &["lat", "lon"]).unwrap();
            var.put_values(&[1, 2, 3, 4, 5, 6], ..).unwrap();
        }
    }

    let source = NetCdfGridSource::new(&path, NetCdfSourceConfig::default());
    let grid = source.load_grid().unwrap();
    assert_eq!(grid.shape(), (2, 3));
    assert_eq!(grid.coord(1, 2), Some((7.0, 51.0)));
    assert_eq!(source.load_indicator_grid().unwrap().code(1, 0), Some(4));
}

// ============================================================================
// Data source
// ============================================================================

#[test]
fn test_default_selection_is_last_declared_variable() {
    let fx = fixture(&indicator_codes(NX, NY, 8, &[]));
    let source = NetCdfDataSource::open(&fx.data, &VariableSelection::LastDeclared, config()).unwrap();
    assert_eq!(source.variable(), "SWC");

    let description = source.describe_variable().unwrap();
    assert!(description.is_depth_resolved);
    assert_eq!(description.layer_lower_bounds, Some(BOUNDS.to_vec()));
    assert_eq!(description.time_steps, NT);
    assert_eq!(description.long_name.as_deref(), Some("soil water content"));
    assert_eq!(description.institution.as_deref(), Some("FZJ IBG-3"));
}

#[test]
fn test_named_surface_variable() {
    let fx = fixture(&indicator_codes(NX, NY, 8, &[]));
    let selection = VariableSelection::Named("TWS".to_string());
    let source = NetCdfDataSource::open(&fx.data, &selection, config()).unwrap();

    let description = source.describe_variable().unwrap();
    assert!(!description.is_depth_resolved);
    assert_eq!(description.units.as_deref(), Some("mm"));
    assert!(!description.single_precision);

    let series = source.read_series(2, 1, None).unwrap();
    let expected: Vec<f64> = (0..NT).map(|t| encode_cell(t, 0, 2, 1)).collect();
    assert_eq!(series.values(), &expected[..]);
    assert_eq!(
        series.first_time(),
        Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(
        series.last_time(),
        Some(Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap())
    );
}

#[test]
fn test_fill_values_become_nan() {
    let fx = fixture(&indicator_codes(NX, NY, 8, &[]));
    let source = NetCdfDataSource::open(&fx.data, &VariableSelection::LastDeclared, config()).unwrap();

    let series = source.read_series(1, 1, Some(1)).unwrap();
    assert_eq!(series.values()[0], encode_cell(0, 1, 1, 1));
    assert!(series.values()[2].is_nan());
}

#[test]
fn test_layer_count_must_match_bounds() {
    let fx = fixture(&indicator_codes(NX, NY, 8, &[]));
    // Default ParFlow bounds list 15 layers; the file has 3.
    let source = NetCdfDataSource::open(
        &fx.data,
        &VariableSelection::LastDeclared,
        NetCdfSourceConfig::default(),
    )
    .unwrap();
    assert!(matches!(
        source.describe_variable(),
        Err(NetCdfError::InvalidFormat(_))
    ));
}

#[test]
fn test_unsupported_calendar_rejected() {
    let dir = temp_test_dir();
    let path = dir.path().join("noleap.nc");
    write_data_file(&path, "noleap");
    let err = NetCdfDataSource::open(&path, &VariableSelection::LastDeclared, config()).unwrap_err();
    assert!(matches!(err, NetCdfError::UnsupportedCalendar(_)));
}

#[test]
fn test_missing_named_variable() {
    let fx = fixture(&indicator_codes(NX, NY, 8, &[]));
    let selection = VariableSelection::Named("ET".to_string());
    let err = NetCdfDataSource::open(&fx.data, &selection, config()).unwrap_err();
    assert!(matches!(err, NetCdfError::MissingData(_)));
}

// ============================================================================
// Full pipeline
// ============================================================================

#[test]
fn test_pipeline_over_netcdf_files() {
    let codes = indicator_codes(NX, NY, 8, &[(0, 0, 21)]);
    let fx = fixture(&codes);
    let grid_source = NetCdfGridSource::new(&fx.indicator, config());
    let pipeline = ExtractionPipeline::from_source(&grid_source, &ExtractorConfig::default()).unwrap();
    let provider = NetCdfSourceProvider::new(config());

    let data = source_ref(&fx.data);
    let pois = vec![
        PointOfInterest::new("deep", 6.21, 50.11, data.clone()).with_depth(1.5),
        PointOfInterest::new("surface", 6.29, 50.19, data.clone()).with_variable("TWS"),
        PointOfInterest::new("lake", 6.0, 50.0, data).with_variable("TWS"),
    ];

    let output = pipeline.run(&pois, &provider).unwrap();
    assert_eq!(output.shape(), (3, NT));

    // deep -> (1, 2), layer 0 covers (1.0, 2.0].
    assert_eq!(output.matrix[[0, 3]], encode_cell(3, 0, 1, 2));
    // surface -> (2, 3).
    assert_eq!(output.matrix[[1, 0]], encode_cell(0, 0, 2, 3));
    // lake is still extracted, with a warning.
    assert_eq!(output.matrix[[2, 1]], encode_cell(1, 0, 0, 0));
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].poi(), "lake");
}

#[test]
fn test_pipeline_reports_unreadable_source() {
    let fx = fixture(&indicator_codes(NX, NY, 8, &[]));
    let pipeline = ExtractionPipeline::from_source(
        &NetCdfGridSource::new(&fx.indicator, config()),
        &ExtractorConfig::default(),
    )
    .unwrap();

    let pois = vec![PointOfInterest::new("a", 6.0, 50.0, "/nonexistent/parflow.nc")];
    let err = pipeline
        .run(&pois, &NetCdfSourceProvider::new(config()))
        .unwrap_err();
    assert!(matches!(err, ExtractError::Source { .. }));
}
