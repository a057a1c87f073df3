//! Point time series from netCDF model output.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use netcdf::types::{FloatType, NcVariableType};
use point_extractor::{
    DataSource, ExtractedSeries, PointOfInterest, SourceProvider, VariableDescription,
};
use tracing::{debug, info};

use crate::config::NetCdfSourceConfig;
use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{
    get_global_string_attr, get_string_attr, mask_missing, missing_markers, open_file,
    require_variable, shape_of, variable_names,
};
use crate::select::VariableSelection;
use crate::time::CfTimeAxis;

/// One open model file and its target variable.
///
/// Surface variables are `[time, y, x]`; depth-resolved variables are
/// `[time, layer, y, x]` with layers ordered like the configured bounds.
pub struct NetCdfDataSource {
    path: PathBuf,
    file: netcdf::File,
    variable: String,
    times: Vec<DateTime<Utc>>,
    config: NetCdfSourceConfig,
}

impl std::fmt::Debug for NetCdfDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetCdfDataSource")
            .field("path", &self.path)
            .field("variable", &self.variable)
            .field("time_steps", &self.times.len())
            .finish()
    }
}

impl NetCdfDataSource {
    /// Open `path`, select the target variable and decode its time axis.
    pub fn open(
        path: impl Into<PathBuf>,
        selection: &VariableSelection,
        config: NetCdfSourceConfig,
    ) -> NetCdfResult<Self> {
        let path = path.into();
        let file = open_file(&path)?;

        let declared = variable_names(&file);
        let variable = selection
            .select(&declared, &config.coordinate_variables())?
            .to_string();

        let times = read_time_axis(&file, &config.time_variable)?;
        info!(
            path = %path.display(),
            variable = %variable,
            steps = times.len(),
            "Opened data source"
        );

        Ok(Self {
            path,
            file,
            variable,
            times,
            config,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the selected target variable.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    fn target(&self) -> NetCdfResult<netcdf::Variable<'_>> {
        require_variable(&self.file, &self.variable)
    }
}

impl DataSource for NetCdfDataSource {
    type Error = NetCdfError;

    fn describe_variable(&self) -> NetCdfResult<VariableDescription> {
        let var = self.target()?;
        let shape = shape_of(&var);

        let (is_depth_resolved, layer_lower_bounds) = match shape.as_slice() {
            [_, _, _] => (false, None),
            [_, nz, _, _] => {
                let bounds = self.config.layer_bounds();
                if bounds.len() != *nz {
                    return Err(NetCdfError::invalid(format!(
                        "'{}' has {} layers but {} layer bounds are configured",
                        self.variable,
                        nz,
                        bounds.len()
                    )));
                }
                (true, Some(bounds))
            }
            other => {
                return Err(NetCdfError::invalid(format!(
                    "'{}' has {} dimensions, expected [time, y, x] or [time, layer, y, x]",
                    self.variable,
                    other.len()
                )))
            }
        };

        let time_steps = shape[0];
        if time_steps != self.times.len() {
            return Err(NetCdfError::invalid(format!(
                "'{}' has {} time steps but '{}' has {}",
                self.variable,
                time_steps,
                self.config.time_variable,
                self.times.len()
            )));
        }

        Ok(VariableDescription {
            name: self.variable.clone(),
            long_name: get_string_attr(&var, "long_name"),
            units: get_string_attr(&var, "units"),
            institution: get_global_string_attr(&self.file, "institution"),
            is_depth_resolved,
            layer_lower_bounds,
            time_steps,
            single_precision: matches!(var.vartype(), NcVariableType::Float(FloatType::F32)),
        })
    }

    fn read_series(
        &self,
        y: usize,
        x: usize,
        layer: Option<usize>,
    ) -> NetCdfResult<ExtractedSeries> {
        let var = self.target()?;
        let shape = shape_of(&var);

        let out_of_range = || {
            NetCdfError::invalid(format!(
                "cell ({}, {}) layer {:?} is outside '{}' of shape {:?}",
                y, x, layer, self.variable, shape
            ))
        };

        let mut values: Vec<f64> = match (shape.as_slice(), layer) {
            ([_, ny, nx], _) => {
                if y >= *ny || x >= *nx {
                    return Err(out_of_range());
                }
                var.get_values((.., y, x))?
            }
            ([_, nz, ny, nx], Some(layer)) => {
                if layer >= *nz || y >= *ny || x >= *nx {
                    return Err(out_of_range());
                }
                var.get_values((.., layer, y, x))?
            }
            ([_, _, _, _], None) => {
                return Err(NetCdfError::missing(format!(
                    "layer index for depth-resolved variable '{}'",
                    self.variable
                )))
            }
            _ => return Err(out_of_range()),
        };

        mask_missing(&mut values, &missing_markers(&var));
        debug!(variable = %self.variable, y, x, ?layer, steps = values.len(), "Read series");

        ExtractedSeries::new(self.times.clone(), values)
            .map_err(|e| NetCdfError::invalid(e.to_string()))
    }
}

/// Decode the CF time coordinate of a file.
fn read_time_axis(file: &netcdf::File, name: &str) -> NetCdfResult<Vec<DateTime<Utc>>> {
    let var = require_variable(file, name)?;
    let units = get_string_attr(&var, "units")
        .ok_or_else(|| NetCdfError::missing(format!("units attribute of '{}'", name)))?;
    let calendar = get_string_attr(&var, "calendar");
    let axis = CfTimeAxis::parse(&units, calendar.as_deref())?;

    let offsets: Vec<f64> = var.get_values(..)?;
    axis.decode_all(&offsets)
}

/// Opens a [`NetCdfDataSource`] for each point.
///
/// The point's `source` is the file path or URL; its `variable`, when set,
/// overrides the last-declared default.
#[derive(Debug, Clone, Default)]
pub struct NetCdfSourceProvider {
    config: NetCdfSourceConfig,
}

impl NetCdfSourceProvider {
    pub fn new(config: NetCdfSourceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NetCdfSourceConfig {
        &self.config
    }
}

impl SourceProvider for NetCdfSourceProvider {
    type Source = NetCdfDataSource;
    type Error = NetCdfError;

    fn open(&self, poi: &PointOfInterest) -> NetCdfResult<NetCdfDataSource> {
        let selection = VariableSelection::from_option(poi.variable.as_deref());
        NetCdfDataSource::open(&poi.source, &selection, self.config.clone())
    }
}
