//! Model grid and land-cover classification from netCDF.

use std::path::{Path, PathBuf};

use point_extractor::{GridSource, Grid, IndicatorGrid};
use tracing::{debug, info};

use crate::config::NetCdfSourceConfig;
use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{open_file, require_variable, shape_of};

/// Reads cell-centre coordinates and the indicator slice from one file.
///
/// Coordinates may be 2D `[y, x]` arrays or 1D axes that are broadcast to a
/// mesh. The indicator may be `[time, level, y, x]`, `[level, y, x]` or
/// `[y, x]`; higher-rank cubes are sliced at the configured indices.
#[derive(Debug, Clone)]
pub struct NetCdfGridSource {
    path: PathBuf,
    config: NetCdfSourceConfig,
}

impl NetCdfGridSource {
    pub fn new(path: impl Into<PathBuf>, config: NetCdfSourceConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_grid(&self, file: &netcdf::File) -> NetCdfResult<Grid> {
        let lon_var = require_variable(file, &self.config.lon_variable)?;
        let lat_var = require_variable(file, &self.config.lat_variable)?;
        let lon_shape = shape_of(&lon_var);
        let lat_shape = shape_of(&lat_var);

        let lon: Vec<f64> = lon_var.get_values(..)?;
        let lat: Vec<f64> = lat_var.get_values(..)?;

        let grid = match (lon_shape.as_slice(), lat_shape.as_slice()) {
            ([ny, nx], [lat_ny, lat_nx]) if (ny, nx) == (lat_ny, lat_nx) => {
                Grid::from_vecs(*ny, *nx, lon, lat)
            }
            ([nx], [ny]) => {
                debug!(nx, ny, "Broadcasting 1D coordinate axes to a mesh");
                let (ny, nx) = (*ny, *nx);
                let mut lon_mesh = Vec::with_capacity(ny * nx);
                let mut lat_mesh = Vec::with_capacity(ny * nx);
                for &la in &lat {
                    lon_mesh.extend_from_slice(&lon);
                    lat_mesh.extend(std::iter::repeat(la).take(nx));
                }
                Grid::from_vecs(ny, nx, lon_mesh, lat_mesh)
            }
            _ => {
                return Err(NetCdfError::invalid(format!(
                    "coordinate shapes {:?} ({}) and {:?} ({}) do not describe a grid",
                    lon_shape, self.config.lon_variable, lat_shape, self.config.lat_variable
                )))
            }
        };
        grid.map_err(|e| NetCdfError::invalid(e.to_string()))
    }

    fn read_indicator(&self, file: &netcdf::File) -> NetCdfResult<IndicatorGrid> {
        let name = &self.config.indicator_variable;
        let var = require_variable(file, name)?;
        let shape = shape_of(&var);
        let (t, level) = (
            self.config.indicator_time_index,
            self.config.indicator_level_index,
        );

        let out_of_range = |axis: &str, index: usize, len: usize| {
            NetCdfError::invalid(format!(
                "{} index {} is outside {} of length {} in '{}'",
                axis, index, axis, len, name
            ))
        };

        let (ny, nx, codes): (usize, usize, Vec<i32>) = match shape.as_slice() {
            &[nt, nz, ny, nx] => {
                if t >= nt {
                    return Err(out_of_range("time", t, nt));
                }
                if level >= nz {
                    return Err(out_of_range("level", level, nz));
                }
                (ny, nx, var.get_values((t, level, .., ..))?)
            }
            &[nz, ny, nx] => {
                if level >= nz {
                    return Err(out_of_range("level", level, nz));
                }
                (ny, nx, var.get_values((level, .., ..))?)
            }
            &[ny, nx] => (ny, nx, var.get_values(..)?),
            other => {
                return Err(NetCdfError::invalid(format!(
                    "'{}' has {} dimensions, expected 2, 3 or 4",
                    name,
                    other.len()
                )))
            }
        };

        IndicatorGrid::from_vec(ny, nx, codes).map_err(|e| NetCdfError::invalid(e.to_string()))
    }
}

impl GridSource for NetCdfGridSource {
    type Error = NetCdfError;

    fn load_grid(&self) -> NetCdfResult<Grid> {
        let file = open_file(&self.path)?;
        let grid = self.read_grid(&file)?;
        let (ny, nx) = grid.shape();
        info!(path = %self.path.display(), ny, nx, "Loaded model grid");
        Ok(grid)
    }

    fn load_indicator_grid(&self) -> NetCdfResult<IndicatorGrid> {
        let file = open_file(&self.path)?;
        let indicator = self.read_indicator(&file)?;
        let (ny, nx) = indicator.shape();
        info!(
            path = %self.path.display(),
            variable = %self.config.indicator_variable,
            ny,
            nx,
            "Loaded indicator grid"
        );
        Ok(indicator)
    }
}
