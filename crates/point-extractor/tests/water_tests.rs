//! Tests for water-body detection and alternative suggestions.

use point_extractor::{GeoLocator, Grid, IndicatorGrid, WaterBodyFilter, DEFAULT_WATER_CODES};
use test_utils::{indicator_codes, regular_mesh};

/// A 1 x n row of cells spaced 0.01 degrees apart along the equator.
fn row_grid(n: usize) -> Grid {
    let (lon, lat) = regular_mesh(0.0, 0.0, 0.01, 0.0, n, 1);
    Grid::from_vecs(1, n, lon, lat).unwrap()
}

// ============================================================================
// End-to-end example
// ============================================================================

#[test]
fn test_three_dry_cells_among_next_nine() {
    let grid = row_grid(12);
    // Nearest cell and most neighbours are water; x = 3, 6 and 8 are dry.
    let mut overrides: Vec<(usize, usize, i32)> = (0..12).map(|x| (0, x, 20)).collect();
    overrides.extend([(0, 3, 8), (0, 6, 10), (0, 8, 1)]);
    let indicator = IndicatorGrid::from_vec(1, 12, indicator_codes(12, 1, 0, &overrides)).unwrap();

    let locator = GeoLocator::default();
    let ranked = locator.rank_nearest(&grid, 0.0, 0.0, 10);
    assert_eq!(ranked[0].x, 0);

    let filter = WaterBodyFilter::default();
    assert!(filter.is_water(&indicator, 0, 0).unwrap());

    let alternatives = filter.find_alternatives(&grid, &indicator, &ranked, 9);
    let xs: Vec<usize> = alternatives.iter().map(|c| c.x).collect();
    assert_eq!(xs, vec![3, 6, 8]);
    for pair in alternatives.windows(2) {
        assert!(pair[0].distance_km < pair[1].distance_km);
    }
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_alternatives_are_never_water() {
    let grid = row_grid(30);
    // Repeating lake, river, ocean, cropland.
    let pattern = [19, 20, 21, 8];
    let overrides: Vec<(usize, usize, i32)> = (0..30).map(|x| (0, x, pattern[x % 4])).collect();
    let indicator = IndicatorGrid::from_vec(1, 30, indicator_codes(30, 1, 0, &overrides)).unwrap();

    let ranked = GeoLocator::default().rank_by_distance(&grid, 0.0, 0.0);
    let filter = WaterBodyFilter::default();
    let alternatives = filter.find_alternatives(&grid, &indicator, &ranked, 29);

    assert!(!alternatives.is_empty());
    for candidate in &alternatives {
        let code = indicator.code(candidate.y, candidate.x).unwrap();
        assert!(!filter.is_water_code(code), "cell {} has code {code}", candidate.x);
    }
}

#[test]
fn test_alternatives_capped_at_maximum() {
    let grid = row_grid(20);
    let indicator = IndicatorGrid::from_vec(1, 20, indicator_codes(20, 1, 8, &[(0, 0, 19)])).unwrap();
    let ranked = GeoLocator::default().rank_by_distance(&grid, 0.0, 0.0);

    let filter = WaterBodyFilter::new(DEFAULT_WATER_CODES.to_vec(), 4);
    let alternatives = filter.find_alternatives(&grid, &indicator, &ranked, 19);
    assert_eq!(alternatives.len(), 4);
    assert_eq!(alternatives[0].x, 1);
}

#[test]
fn test_window_limits_search() {
    let grid = row_grid(20);
    // Only the 11th-nearest cell is dry: outside a window of 9.
    let indicator = IndicatorGrid::from_vec(1, 20, indicator_codes(20, 1, 21, &[(0, 10, 8)])).unwrap();
    let ranked = GeoLocator::default().rank_by_distance(&grid, 0.0, 0.0);

    let filter = WaterBodyFilter::default();
    assert!(filter.find_alternatives(&grid, &indicator, &ranked, 9).is_empty());
    assert_eq!(filter.find_alternatives(&grid, &indicator, &ranked, 10).len(), 1);
}

#[test]
fn test_alternatives_carry_coordinates() {
    let grid = row_grid(3);
    let indicator = IndicatorGrid::from_vec(1, 3, vec![19, 8, 8]).unwrap();
    let ranked = GeoLocator::default().rank_by_distance(&grid, 0.0, 0.0);
    let alternatives = WaterBodyFilter::default().find_alternatives(&grid, &indicator, &ranked, 9);

    assert_eq!(alternatives.len(), 2);
    assert_eq!(alternatives[0].lon, 0.01);
    assert_eq!(alternatives[0].lat, 0.0);
    assert!(alternatives[0].distance_km > 1.0);
}
