//! Configuration for the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Indicator codes for lake, river and ocean cells in the TSMP/ParFlow
/// land-cover classification.
pub const DEFAULT_WATER_CODES: [i32; 3] = [19, 20, 21];

/// Configuration for the extraction pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Sphere radius used for great-circle distances, in kilometres.
    pub earth_radius_km: f64,

    /// Indicator codes that mark a cell as a water body.
    pub water_codes: Vec<i32>,

    /// Number of ranked neighbours (after the nearest cell) inspected when
    /// looking for non-water alternatives.
    pub candidate_window: usize,

    /// Maximum number of alternatives reported per point.
    pub max_alternatives: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            earth_radius_km: EARTH_RADIUS_KM,
            water_codes: DEFAULT_WATER_CODES.to_vec(),
            candidate_window: 9,
            max_alternatives: 9,
        }
    }
}

impl ExtractorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("EARTH_RADIUS_KM") {
            if let Ok(radius) = val.parse() {
                config.earth_radius_km = radius;
            }
        }

        if let Ok(val) = std::env::var("WATER_CODES") {
            if let Some(codes) = parse_code_list(&val) {
                config.water_codes = codes;
            }
        }

        if let Ok(val) = std::env::var("CANDIDATE_WINDOW") {
            if let Ok(window) = val.parse() {
                config.candidate_window = window;
            }
        }

        if let Ok(val) = std::env::var("MAX_ALTERNATIVES") {
            if let Ok(max) = val.parse() {
                config.max_alternatives = max;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.earth_radius_km.is_finite() || self.earth_radius_km <= 0.0 {
            return Err("earth_radius_km must be a positive number".to_string());
        }

        if self.water_codes.is_empty() {
            return Err("water_codes must not be empty".to_string());
        }

        if self.candidate_window == 0 {
            return Err("candidate_window must be > 0".to_string());
        }

        if self.max_alternatives == 0 {
            return Err("max_alternatives must be > 0".to_string());
        }

        Ok(())
    }
}

/// Parse a comma separated list of indicator codes ("19, 20,21").
fn parse_code_list(s: &str) -> Option<Vec<i32>> {
    let codes: Result<Vec<i32>, _> = s
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect();
    codes.ok().filter(|codes| !codes.is_empty())
}
