//! Per-point orchestration of lookup, water check, depth resolution and
//! series retrieval.
//!
//! A run has two phases. The plan phase resolves every point and describes
//! its variable, so the uniform row length is known and checked before any
//! series is read. The fill phase reopens each source, reads its series
//! into the pre-sized row of the output matrix and closes it again.

use std::fmt;

use ndarray::{aview1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ExtractorConfig;
use crate::depth::DepthResolver;
use crate::error::{BoxedError, ExtractError, Result};
use crate::geo::{nearest_in, rank_nearest_in, GeoLocator};
use crate::source::{DataSource, GridSource, SourceProvider};
use crate::types::{
    Candidate, ExtractedSeries, Grid, IndicatorGrid, PointOfInterest, ResolvedDepth,
    ResolvedLocation, RowMetadata, VariableDescription,
};
use crate::water::WaterBodyFilter;

/// Non-fatal findings reported while resolving points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// The nearest cell is a water body; dry cells nearby are listed.
    WaterBody {
        poi: String,
        y: usize,
        x: usize,
        code: i32,
        alternatives: Vec<Candidate>,
    },
    /// The nearest cell is a water body and no dry cell is close by.
    NoAlternative {
        poi: String,
        y: usize,
        x: usize,
        code: i32,
    },
}

impl Diagnostic {
    /// Identifier of the point this diagnostic refers to.
    pub fn poi(&self) -> &str {
        match self {
            Self::WaterBody { poi, .. } | Self::NoAlternative { poi, .. } => poi,
        }
    }

    pub fn alternatives(&self) -> &[Candidate] {
        match self {
            Self::WaterBody { alternatives, .. } => alternatives,
            Self::NoAlternative { .. } => &[],
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaterBody {
                poi, alternatives, ..
            } => {
                write!(
                    f,
                    "location '{}' lies directly on a lake, river or sea; suggested locations:",
                    poi
                )?;
                for c in alternatives {
                    write!(f, " (lat {:.5}, lon {:.5})", c.lat, c.lon)?;
                }
                Ok(())
            }
            Self::NoAlternative { poi, .. } => write!(
                f,
                "location '{}' lies directly on a lake, river or sea and no land cell is nearby; \
                 please choose a different location",
                poi
            ),
        }
    }
}

/// Receives diagnostics and filled rows as a run progresses.
pub trait ExtractionObserver {
    fn on_diagnostic(&mut self, _diagnostic: &Diagnostic) {}

    /// Called once per point, right after its row has been filled.
    fn on_row(
        &mut self,
        _row: &RowMetadata,
        _series: &ExtractedSeries,
    ) -> std::result::Result<(), BoxedError> {
        Ok(())
    }
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ExtractionObserver for NoopObserver {}

/// Result of a run: one matrix row per point, in input order.
#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    /// `points × time steps`.
    pub matrix: Array2<f64>,
    pub rows: Vec<RowMetadata>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ExtractionOutput {
    pub fn shape(&self) -> (usize, usize) {
        self.matrix.dim()
    }
}

struct PlannedRow<'p> {
    row: usize,
    poi: &'p PointOfInterest,
    location: ResolvedLocation,
    depth: Option<ResolvedDepth>,
    variable: VariableDescription,
}

/// Resolves points against one grid and extracts their series.
#[derive(Debug, Clone)]
pub struct ExtractionPipeline {
    grid: Grid,
    indicator: IndicatorGrid,
    locator: GeoLocator,
    water: WaterBodyFilter,
    candidate_window: usize,
}

impl ExtractionPipeline {
    pub fn new(grid: Grid, indicator: IndicatorGrid, config: &ExtractorConfig) -> Result<Self> {
        config.validate().map_err(ExtractError::InvalidConfig)?;

        if grid.shape() != indicator.shape() {
            return Err(ExtractError::shape_mismatch(format!(
                "grid {:?} and indicator grid {:?} differ",
                grid.shape(),
                indicator.shape()
            )));
        }

        Ok(Self {
            grid,
            indicator,
            locator: GeoLocator::new(config.earth_radius_km),
            water: WaterBodyFilter::new(config.water_codes.clone(), config.max_alternatives),
            candidate_window: config.candidate_window,
        })
    }

    /// Load the grid and indicator grid once and build a pipeline on them.
    pub fn from_source<G: GridSource>(source: &G, config: &ExtractorConfig) -> Result<Self> {
        let grid = source
            .load_grid()
            .map_err(|e| ExtractError::source_failed("grid", e))?;
        let indicator = source
            .load_indicator_grid()
            .map_err(|e| ExtractError::source_failed("indicator grid", e))?;

        let (ny, nx) = grid.shape();
        info!(ny, nx, "Loaded grid and indicator grid");

        Self::new(grid, indicator, config)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn indicator(&self) -> &IndicatorGrid {
        &self.indicator
    }

    pub fn locator(&self) -> &GeoLocator {
        &self.locator
    }

    pub fn water_filter(&self) -> &WaterBodyFilter {
        &self.water
    }

    /// Find the nearest cell for `poi` and check it for water.
    pub fn resolve_location(
        &self,
        poi: &PointOfInterest,
    ) -> Result<(ResolvedLocation, Option<Diagnostic>)> {
        // One distance array per query serves both the lookup and the ranking.
        let distances = self
            .locator
            .distances(&self.grid, poi.longitude, poi.latitude);
        let nearest = nearest_in(&distances).ok_or(ExtractError::NoValidCell {
            lon: poi.longitude,
            lat: poi.latitude,
        })?;
        let code = self.indicator.code_at(nearest.y, nearest.x)?;

        info!(
            poi = %poi.id,
            y = nearest.y,
            x = nearest.x,
            distance_km = nearest.distance_km,
            "Resolved nearest grid cell"
        );

        let mut location = ResolvedLocation {
            y: nearest.y,
            x: nearest.x,
            distance_km: nearest.distance_km,
            indicator_code: code,
            is_water_body: self.water.is_water_code(code),
            alternatives: Vec::new(),
        };

        if !location.is_water_body {
            return Ok((location, None));
        }

        // Index 0 of the ranking is the nearest cell itself.
        let window = self.candidate_window.min(self.grid.len());
        let ranked = rank_nearest_in(&distances, window.saturating_add(1));
        location.alternatives =
            self.water
                .find_alternatives(&self.grid, &self.indicator, &ranked, window);

        let diagnostic = if location.alternatives.is_empty() {
            Diagnostic::NoAlternative {
                poi: poi.id.clone(),
                y: location.y,
                x: location.x,
                code,
            }
        } else {
            Diagnostic::WaterBody {
                poi: poi.id.clone(),
                y: location.y,
                x: location.x,
                code,
                alternatives: location.alternatives.clone(),
            }
        };
        warn!(
            poi = %poi.id,
            code,
            alternatives = location.alternatives.len(),
            "{}",
            diagnostic
        );

        Ok((location, Some(diagnostic)))
    }

    /// Resolve the layer for `poi`, or `None` when the variable has no
    /// vertical dimension.
    pub fn resolve_depth(
        &self,
        poi: &PointOfInterest,
        variable: &VariableDescription,
    ) -> Result<Option<ResolvedDepth>> {
        if !variable.is_depth_resolved {
            debug!(poi = %poi.id, variable = %variable.name, "Variable has no depth dimension");
            return Ok(None);
        }

        let depth = poi.depth.ok_or_else(|| ExtractError::MissingField {
            poi: poi.id.clone(),
            field: "depth",
        })?;
        let bounds = variable.layer_lower_bounds.clone().ok_or_else(|| {
            ExtractError::invalid_bounds(format!(
                "depth-resolved variable '{}' has no layer bounds",
                variable.name
            ))
        })?;

        let resolved = DepthResolver::new(bounds)?.resolve(depth)?;
        debug!(
            poi = %poi.id,
            depth,
            layer = resolved.layer_index,
            lower = resolved.lower_boundary,
            upper = resolved.upper_boundary,
            "Resolved depth layer"
        );
        Ok(Some(resolved))
    }

    /// Extract every point, returning the output matrix.
    pub fn run<P: SourceProvider>(
        &self,
        pois: &[PointOfInterest],
        provider: &P,
    ) -> Result<ExtractionOutput> {
        self.run_with(pois, provider, &mut NoopObserver)
    }

    /// Extract every point, reporting diagnostics and rows to `observer`.
    pub fn run_with<P, O>(
        &self,
        pois: &[PointOfInterest],
        provider: &P,
        observer: &mut O,
    ) -> Result<ExtractionOutput>
    where
        P: SourceProvider,
        O: ExtractionObserver + ?Sized,
    {
        info!(points = pois.len(), "Starting extraction run");

        let mut diagnostics = Vec::new();
        let mut plans = Vec::with_capacity(pois.len());

        for (row, poi) in pois.iter().enumerate() {
            poi.validate()?;

            let (location, diagnostic) = self.resolve_location(poi)?;
            if let Some(diagnostic) = diagnostic {
                observer.on_diagnostic(&diagnostic);
                diagnostics.push(diagnostic);
            }

            // Only the description outlives this iteration, so at most one
            // source is open at a time.
            let variable = provider
                .open(poi)
                .map_err(|e| ExtractError::source_failed(&poi.id, e))?
                .describe_variable()
                .map_err(|e| ExtractError::source_failed(&poi.id, e))?;
            let depth = self.resolve_depth(poi, &variable)?;

            plans.push(PlannedRow {
                row,
                poi,
                location,
                depth,
                variable,
            });
        }

        let columns = plans.first().map_or(0, |plan| plan.variable.time_steps);
        if let Some(plan) = plans
            .iter()
            .find(|plan| plan.variable.time_steps != columns)
        {
            return Err(ExtractError::SeriesLengthMismatch {
                poi: plan.poi.id.clone(),
                expected: columns,
                found: plan.variable.time_steps,
            });
        }

        let mut matrix = Array2::from_elem((plans.len(), columns), f64::NAN);
        let mut rows = Vec::with_capacity(plans.len());

        for plan in plans {
            let layer = plan.depth.map(|d| d.layer_index);
            let series = provider
                .open(plan.poi)
                .map_err(|e| ExtractError::source_failed(&plan.poi.id, e))?
                .read_series(plan.location.y, plan.location.x, layer)
                .map_err(|e| ExtractError::source_failed(&plan.poi.id, e))?;

            if series.len() != columns {
                return Err(ExtractError::SeriesLengthMismatch {
                    poi: plan.poi.id.clone(),
                    expected: columns,
                    found: series.len(),
                });
            }
            matrix.row_mut(plan.row).assign(&aview1(series.values()));

            info!(
                poi = %plan.poi.id,
                variable = %plan.variable.name,
                steps = series.len(),
                "Extracted series"
            );

            let metadata = RowMetadata {
                row: plan.row,
                poi: plan.poi.clone(),
                location: plan.location,
                depth: plan.depth,
                variable: plan.variable,
            };
            observer
                .on_row(&metadata, &series)
                .map_err(|e| ExtractError::export_failed(&metadata.poi.id, e))?;
            rows.push(metadata);
        }

        info!(
            rows = matrix.nrows(),
            columns = matrix.ncols(),
            warnings = diagnostics.len(),
            "Extraction run complete"
        );

        Ok(ExtractionOutput {
            matrix,
            rows,
            diagnostics,
        })
    }
}
