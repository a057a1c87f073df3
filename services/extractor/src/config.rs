//! Run-control documents.
//!
//! A run-control file names the indicator file and the stations to extract:
//!
//! ```json
//! {
//!     "IndicatorPath": "/data/indicator.nc",
//!     "locations": [
//!         {"stationID": "DE-Jue", "stationLat": 50.91, "stationLon": 6.41,
//!          "ParFlowData": "/data/swc.nc", "Depth": 0.5}
//!     ]
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use point_extractor::PointOfInterest;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Filename tag used when the run control does not set `ProductTag`.
pub const DEFAULT_PRODUCT_TAG: &str =
    "ADAPTER_DE05_ECMWF-HRES-forecast_FZJ-IBG3-ParFlowCLM380_v04aJuwelsGpuProd";

/// Top-level run-control document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunControl {
    /// Grid and land-cover classification file.
    #[serde(rename = "IndicatorPath")]
    pub indicator_path: String,

    /// Stations to extract, in output row order.
    pub locations: Vec<StationEntry>,

    /// Product tag embedded in CSV filenames.
    #[serde(rename = "ProductTag", default, skip_serializing_if = "Option::is_none")]
    pub product_tag: Option<String>,

    /// Directory for CSV output.
    #[serde(rename = "OutputDir", default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

/// One station of a run-control document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationEntry {
    #[serde(rename = "stationID", deserialize_with = "string_or_number")]
    pub station_id: String,

    #[serde(rename = "stationLat")]
    pub latitude: f64,

    #[serde(rename = "stationLon")]
    pub longitude: f64,

    /// Model output file or URL holding the target variable.
    #[serde(rename = "ParFlowData")]
    pub data_path: String,

    /// Depth in metres; only needed for depth-resolved variables.
    #[serde(rename = "Depth", default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,

    /// Target variable; defaults to the last variable in the file.
    #[serde(rename = "Variable", default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
}

impl StationEntry {
    pub fn to_point(&self) -> PointOfInterest {
        PointOfInterest {
            id: self.station_id.clone(),
            longitude: self.longitude,
            latitude: self.latitude,
            depth: self.depth,
            source: self.data_path.clone(),
            variable: self.variable.clone(),
        }
    }
}

impl RunControl {
    /// Load a run-control file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read run control {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Failed to parse run control {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Points of interest in station order.
    pub fn points(&self) -> Vec<PointOfInterest> {
        self.locations.iter().map(StationEntry::to_point).collect()
    }

    pub fn product_tag(&self) -> &str {
        self.product_tag.as_deref().unwrap_or(DEFAULT_PRODUCT_TAG)
    }
}

/// Station identifiers appear both as strings and as bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a station identifier string or number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
