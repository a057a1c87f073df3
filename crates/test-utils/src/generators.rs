//! Synthetic grid generators.
//!
//! All generators return row-major vectors (row `y = 0` first), matching the
//! `[y, x]` layout of model grids.

/// Creates a regular lon/lat mesh.
///
/// Cell `(y, x)` has longitude `lon0 + x * dlon` and latitude `lat0 + y * dlat`.
///
/// # Returns
///
/// `(lon, lat)` vectors of length `nx * ny`.
///
/// # Example
///
/// ```
/// use test_utils::regular_mesh;
///
/// let (lon, lat) = regular_mesh(6.0, 50.0, 0.5, 0.25, 3, 2);
/// assert_eq!(lon, vec![6.0, 6.5, 7.0, 6.0, 6.5, 7.0]);
/// assert_eq!(lat, vec![50.0, 50.0, 50.0, 50.25, 50.25, 50.25]);
/// ```
pub fn regular_mesh(
    lon0: f64,
    lat0: f64,
    dlon: f64,
    dlat: f64,
    nx: usize,
    ny: usize,
) -> (Vec<f64>, Vec<f64>) {
    let mut lon = Vec::with_capacity(nx * ny);
    let mut lat = Vec::with_capacity(nx * ny);
    for y in 0..ny {
        for x in 0..nx {
            lon.push(lon0 + x as f64 * dlon);
            lat.push(lat0 + y as f64 * dlat);
        }
    }
    (lon, lat)
}

/// Creates a curvilinear mesh: a regular mesh rotated by `angle_deg` around
/// its centre, similar to the rotated-pole grids of regional models.
pub fn rotated_mesh(
    lon0: f64,
    lat0: f64,
    spacing: f64,
    nx: usize,
    ny: usize,
    angle_deg: f64,
) -> (Vec<f64>, Vec<f64>) {
    let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
    let cx = (nx.saturating_sub(1)) as f64 * spacing / 2.0;
    let cy = (ny.saturating_sub(1)) as f64 * spacing / 2.0;

    let mut lon = Vec::with_capacity(nx * ny);
    let mut lat = Vec::with_capacity(nx * ny);
    for y in 0..ny {
        for x in 0..nx {
            let dx = x as f64 * spacing - cx;
            let dy = y as f64 * spacing - cy;
            lon.push(lon0 + cx + dx * cos_a - dy * sin_a);
            lat.push(lat0 + cy + dx * sin_a + dy * cos_a);
        }
    }
    (lon, lat)
}

/// Adds `offset` degrees to every longitude.
pub fn shift_longitudes(lon: &[f64], offset: f64) -> Vec<f64> {
    lon.iter().map(|l| l + offset).collect()
}

/// Creates indicator codes filled with `default`, with `(y, x, code)`
/// overrides applied.
///
/// # Example
///
/// ```
/// use test_utils::indicator_codes;
///
/// let codes = indicator_codes(2, 2, 8, &[(1, 0, 20)]);
/// assert_eq!(codes, vec![8, 8, 20, 8]);
/// ```
pub fn indicator_codes(
    nx: usize,
    ny: usize,
    default: i32,
    overrides: &[(usize, usize, i32)],
) -> Vec<i32> {
    let mut codes = vec![default; nx * ny];
    for &(y, x, code) in overrides {
        if y < ny && x < nx {
            codes[y * nx + x] = code;
        }
    }
    codes
}

/// Encodes a time step, layer and cell into one exactly representable value:
/// `t * 1_000_000 + layer * 10_000 + y * 100 + x`.
///
/// This makes it easy to verify that the right cell and layer were read.
pub fn encode_cell(t: usize, layer: usize, y: usize, x: usize) -> f64 {
    (t * 1_000_000 + layer * 10_000 + y * 100 + x) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_mesh_layout() {
        let (lon, lat) = regular_mesh(0.0, 0.0, 1.0, 2.0, 4, 3);
        assert_eq!(lon.len(), 12);
        assert_eq!(lon[5], 1.0); // y=1, x=1
        assert_eq!(lat[5], 2.0);
    }

    #[test]
    fn test_rotated_mesh_zero_angle_is_regular() {
        let rotated = rotated_mesh(6.0, 50.0, 0.1, 3, 3, 0.0);
        let regular = regular_mesh(6.0, 50.0, 0.1, 0.1, 3, 3);
        for (a, b) in rotated.0.iter().zip(&regular.0) {
            assert!((a - b).abs() < 1e-12);
        }
        for (a, b) in rotated.1.iter().zip(&regular.1) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_indicator_overrides_outside_grid_are_ignored() {
        let codes = indicator_codes(2, 1, 1, &[(5, 5, 20)]);
        assert_eq!(codes, vec![1, 1]);
    }

    #[test]
    fn test_encode_cell() {
        assert_eq!(encode_cell(2, 3, 4, 5), 2_030_405.0);
    }
}
