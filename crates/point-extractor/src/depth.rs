//! Depth-to-layer resolution.
//!
//! A model column is described by the lower (deeper) boundary of each layer,
//! listed from the deepest layer to the shallowest and implicitly closed by
//! the surface at 0.0 m:
//!
//! ```text
//!  0.00 ─────────── surface
//!        layer n-1
//!  b[n-1] ─────────
//!        ...
//!  b[1] ───────────
//!        layer 0
//!  b[0] ─────────── deepest boundary
//! ```
//!
//! Layer `i` covers `(b[i+1], b[i]]`. A depth equal to a listed boundary
//! therefore belongs to the layer whose lower boundary it is. A depth of
//! exactly 0.0 belongs to the shallowest layer.

use crate::error::{ExtractError, Result};
use crate::types::ResolvedDepth;

/// Depth of the surface, the implicit upper bound of the shallowest layer.
pub const SURFACE_DEPTH: f64 = 0.0;

/// Lower layer boundaries of the ParFlow/CLM soil column, in metres.
pub const PARFLOW_LAYER_BOUNDS: [f64; 15] = [
    60.0, 42.0, 27.0, 17.0, 7.0, 3.0, 2.0, 1.3, 0.8, 0.5, 0.3, 0.17, 0.1, 0.05, 0.02,
];

/// Maps depths to layer indices for one validated boundary list.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthResolver {
    bounds: Vec<f64>,
}

impl DepthResolver {
    /// Validate a boundary list: non-empty, finite, positive and strictly
    /// decreasing.
    pub fn new(bounds: Vec<f64>) -> Result<Self> {
        if bounds.is_empty() {
            return Err(ExtractError::invalid_bounds("boundary list is empty"));
        }
        if let Some(bad) = bounds.iter().find(|b| !b.is_finite() || **b <= SURFACE_DEPTH) {
            return Err(ExtractError::invalid_bounds(format!(
                "boundary {} is not a positive depth",
                bad
            )));
        }
        if let Some(pair) = bounds.windows(2).find(|w| w[0] <= w[1]) {
            return Err(ExtractError::invalid_bounds(format!(
                "boundaries must be strictly decreasing, found {} before {}",
                pair[0], pair[1]
            )));
        }
        Ok(Self { bounds })
    }

    /// Resolver for the ParFlow/CLM 15-layer column.
    pub fn parflow() -> Self {
        Self {
            bounds: PARFLOW_LAYER_BOUNDS.to_vec(),
        }
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    pub fn layer_count(&self) -> usize {
        self.bounds.len()
    }

    /// Deepest resolvable depth.
    pub fn max_depth(&self) -> f64 {
        self.bounds[0]
    }

    /// Find the layer containing `depth` (metres below the surface).
    pub fn resolve(&self, depth: f64) -> Result<ResolvedDepth> {
        if !depth.is_finite() || depth < SURFACE_DEPTH {
            return Err(ExtractError::InvalidDepth(depth));
        }
        if depth > self.max_depth() {
            return Err(ExtractError::DepthOutOfRange {
                depth,
                min: SURFACE_DEPTH,
                max: self.max_depth(),
            });
        }

        if let Some(index) = self.bounds.iter().position(|&b| b == depth) {
            return Ok(self.layer(index));
        }
        if depth == SURFACE_DEPTH {
            return Ok(self.layer(self.bounds.len() - 1));
        }

        // Deepest pair first, ending with the implicit surface.
        (0..self.bounds.len())
            .find(|&i| self.bounds[i] >= depth && depth > self.upper_of(i))
            .map(|i| self.layer(i))
            .ok_or(ExtractError::DepthOutOfRange {
                depth,
                min: SURFACE_DEPTH,
                max: self.max_depth(),
            })
    }

    fn upper_of(&self, index: usize) -> f64 {
        self.bounds.get(index + 1).copied().unwrap_or(SURFACE_DEPTH)
    }

    fn layer(&self, index: usize) -> ResolvedDepth {
        ResolvedDepth {
            layer_index: index,
            lower_boundary: self.bounds[index],
            upper_boundary: self.upper_of(index),
        }
    }
}

/// Validate `bounds` and resolve `depth` against them.
pub fn resolve(depth: f64, bounds: &[f64]) -> Result<ResolvedDepth> {
    DepthResolver::new(bounds.to_vec())?.resolve(depth)
}
