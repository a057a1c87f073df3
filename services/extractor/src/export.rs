//! Per-station CSV export.
//!
//! Each file starts with a block of `key:,value` header rows, a blank row,
//! and then one `timestamp,value` row per daily step:
//!
//! ```text
//! stationID:,DE-Jue
//! stationLat:,50.91
//! stationLon:,6.41
//! Parameter:,soil water content
//! Depth:,0.5
//! Unit:,m^3/m^3
//! Time aggregation:,daily
//! Institution:,FZJ IBG-3
//! Time series extracted on:,2024-05-02
//! ""
//! 2024-01-01 12:00:00,0.31
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use point_extractor::{BoxedError, Diagnostic, ExtractedSeries, ExtractionObserver, RowMetadata};
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while writing CSV files.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error for {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Writes one CSV file per extracted row.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
    product_tag: String,
    extracted_on: NaiveDate,
    written: Vec<PathBuf>,
}

impl CsvExporter {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        product_tag: impl Into<String>,
        extracted_on: NaiveDate,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            product_tag: product_tag.into(),
            extracted_on,
            written: Vec::new(),
        }
    }

    /// Files written so far, in row order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// `Station_{id}_{tag}_{variable}_{start}-{end}.csv`, with path
    /// separators in any part replaced so the file stays in `output_dir`.
    pub fn file_name(&self, row: &RowMetadata, series: &ExtractedSeries) -> String {
        format!(
            "Station_{}_{}_{}_{}-{}.csv",
            file_component(&row.poi.id),
            file_component(&self.product_tag),
            file_component(&row.variable.name),
            compact_date(series.first_time()),
            compact_date(series.last_time()),
        )
    }

    fn write_file(
        &self,
        path: &Path,
        row: &RowMetadata,
        series: &ExtractedSeries,
    ) -> Result<(), ExportError> {
        let csv_err = |source: csv::Error| ExportError::Csv {
            path: path.to_path_buf(),
            source,
        };

        std::fs::create_dir_all(&self.output_dir).map_err(|source| ExportError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(csv_err)?;

        let variable = &row.variable;
        let parameter = variable.long_name.as_deref().unwrap_or(&variable.name);

        writer
            .write_record(["stationID:", row.poi.id.as_str()])
            .map_err(csv_err)?;
        writer
            .write_record(["stationLat:", format_float(row.poi.latitude, false).as_str()])
            .map_err(csv_err)?;
        writer
            .write_record(["stationLon:", format_float(row.poi.longitude, false).as_str()])
            .map_err(csv_err)?;
        writer.write_record(["Parameter:", parameter]).map_err(csv_err)?;
        if row.depth.is_some() {
            let depth = row
                .poi
                .depth
                .map(|d| format_float(d, false))
                .unwrap_or_default();
            writer.write_record(["Depth:", depth.as_str()]).map_err(csv_err)?;
        }
        writer
            .write_record(["Unit:", variable.units.as_deref().unwrap_or("")])
            .map_err(csv_err)?;
        writer
            .write_record(["Time aggregation:", "daily"])
            .map_err(csv_err)?;
        writer
            .write_record(["Institution:", variable.institution.as_deref().unwrap_or("")])
            .map_err(csv_err)?;
        writer
            .write_record([
                "Time series extracted on:",
                self.extracted_on.format("%Y-%m-%d").to_string().as_str(),
            ])
            .map_err(csv_err)?;
        writer.write_record([""]).map_err(csv_err)?;

        for (time, value) in series.iter() {
            writer
                .write_record([
                    daily_midpoint(time),
                    format_float(value, variable.single_precision),
                ])
                .map_err(csv_err)?;
        }

        writer.flush().map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ExtractionObserver for CsvExporter {
    fn on_diagnostic(&mut self, diagnostic: &Diagnostic) {
        warn!(poi = %diagnostic.poi(), "CSV for this station uses a water-body cell");
    }

    fn on_row(&mut self, row: &RowMetadata, series: &ExtractedSeries) -> Result<(), BoxedError> {
        let path = self.output_dir.join(self.file_name(row, series));
        self.write_file(&path, row, series)?;
        info!(poi = %row.poi.id, path = %path.display(), rows = series.len(), "CSV file saved");
        self.written.push(path);
        Ok(())
    }
}

/// Shortest text that reads back as the same value at the source's
/// precision; whole numbers keep a trailing `.0`.
fn format_float(value: f64, single_precision: bool) -> String {
    if single_precision {
        format!("{:?}", value as f32)
    } else {
        format!("{:?}", value)
    }
}

fn file_component(part: &str) -> String {
    part.chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// `YYYYMMDD`, or `unknown` for an empty series.
fn compact_date(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y%m%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// The timestamp's date at 12:00:00, the midpoint of a daily aggregate.
fn daily_midpoint(time: DateTime<Utc>) -> String {
    time.date_naive()
        .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default())
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
