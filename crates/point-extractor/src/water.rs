//! Water-body detection and ranking of dry alternatives.
//!
//! A point whose nearest cell is a lake, river or ocean is still extracted
//! from that cell. The filter only reports which nearby cells would be
//! land, so the caller can suggest better coordinates.

use crate::config::DEFAULT_WATER_CODES;
use crate::error::Result;
use crate::types::{Candidate, Grid, GridCell, IndicatorGrid};

/// Classifies indicator codes as water and finds non-water neighbours.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterBodyFilter {
    water_codes: Vec<i32>,
    max_alternatives: usize,
}

impl Default for WaterBodyFilter {
    fn default() -> Self {
        Self::new(DEFAULT_WATER_CODES.to_vec(), 9)
    }
}

impl WaterBodyFilter {
    pub fn new(water_codes: Vec<i32>, max_alternatives: usize) -> Self {
        Self {
            water_codes,
            max_alternatives,
        }
    }

    pub fn water_codes(&self) -> &[i32] {
        &self.water_codes
    }

    pub fn is_water_code(&self, code: i32) -> bool {
        self.water_codes.contains(&code)
    }

    /// Whether cell `(y, x)` is a water body.
    pub fn is_water(&self, indicator: &IndicatorGrid, y: usize, x: usize) -> Result<bool> {
        Ok(self.is_water_code(indicator.code_at(y, x)?))
    }

    /// Non-water cells among the `max_candidates` ranked neighbours that
    /// follow the nearest cell.
    ///
    /// `ranked` must start with the nearest cell itself; it is skipped. The
    /// result keeps the ranking order and holds at most `max_alternatives`
    /// entries. Cells without an indicator code or coordinates are ignored.
    pub fn find_alternatives(
        &self,
        grid: &Grid,
        indicator: &IndicatorGrid,
        ranked: &[GridCell],
        max_candidates: usize,
    ) -> Vec<Candidate> {
        ranked
            .iter()
            .skip(1)
            .take(max_candidates)
            .filter(|cell| {
                indicator
                    .code(cell.y, cell.x)
                    .is_some_and(|code| !self.is_water_code(code))
            })
            .filter_map(|cell| {
                let (lon, lat) = grid.coord(cell.y, cell.x)?;
                Some(Candidate {
                    y: cell.y,
                    x: cell.x,
                    lon,
                    lat,
                    distance_km: cell.distance_km,
                })
            })
            .take(self.max_alternatives)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_grid(n: usize) -> Grid {
        let lon: Vec<f64> = (0..n).map(|i| i as f64 * 0.1).collect();
        Grid::from_vecs(1, n, lon, vec![0.0; n]).unwrap()
    }

    fn ranked_row(n: usize) -> Vec<GridCell> {
        (0..n)
            .map(|x| GridCell {
                y: 0,
                x,
                distance_km: x as f64,
            })
            .collect()
    }

    #[test]
    fn test_is_water() {
        let filter = WaterBodyFilter::default();
        let indicator = IndicatorGrid::from_vec(1, 4, vec![19, 20, 21, 8]).unwrap();
        assert!(filter.is_water(&indicator, 0, 0).unwrap());
        assert!(filter.is_water(&indicator, 0, 1).unwrap());
        assert!(filter.is_water(&indicator, 0, 2).unwrap());
        assert!(!filter.is_water(&indicator, 0, 3).unwrap());
        assert!(filter.is_water(&indicator, 0, 4).is_err());
    }

    #[test]
    fn test_custom_codes() {
        let filter = WaterBodyFilter::new(vec![0], 9);
        assert!(filter.is_water_code(0));
        assert!(!filter.is_water_code(19));
    }

    #[test]
    fn test_nearest_cell_is_never_an_alternative() {
        let grid = row_grid(3);
        let indicator = IndicatorGrid::from_vec(1, 3, vec![8, 8, 8]).unwrap();
        let alternatives =
            WaterBodyFilter::default().find_alternatives(&grid, &indicator, &ranked_row(3), 9);
        assert_eq!(alternatives.len(), 2);
        assert!(alternatives.iter().all(|c| c.x != 0));
    }

    #[test]
    fn test_window_limits_search() {
        let grid = row_grid(6);
        // Only the cell at x=5 is dry, outside a window of 3.
        let indicator = IndicatorGrid::from_vec(1, 6, vec![19, 20, 21, 19, 20, 8]).unwrap();
        let filter = WaterBodyFilter::default();
        assert!(filter
            .find_alternatives(&grid, &indicator, &ranked_row(6), 3)
            .is_empty());
        assert_eq!(
            filter
                .find_alternatives(&grid, &indicator, &ranked_row(6), 5)
                .len(),
            1
        );
    }

    #[test]
    fn test_max_alternatives_caps_result() {
        let grid = row_grid(6);
        let indicator = IndicatorGrid::from_vec(1, 6, vec![19, 1, 2, 3, 4, 5]).unwrap();
        let filter = WaterBodyFilter::new(vec![19], 2);
        let alternatives = filter.find_alternatives(&grid, &indicator, &ranked_row(6), 9);
        assert_eq!(alternatives.len(), 2);
        assert_eq!((alternatives[0].x, alternatives[1].x), (1, 2));
        assert!((alternatives[1].lon - 0.2).abs() < 1e-12);
    }
}
