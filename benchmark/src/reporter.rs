// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Report generation for benchmark results.
//!
//! JSON files carry the full report. CSV files carry raw samples, one row per
//! message size, in the `message_size, v0, v1, ..., ` layout the plotting
//! scripts read.

use crate::metrics::BenchmarkReport;
use chrono::Utc;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// JSON reporter for benchmark results.
pub struct JsonReporter {
    /// Output directory for benchmark data
    output_dir: PathBuf,
}

impl JsonReporter {
    /// Create a new JSON reporter with the specified output directory.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReporterError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Save a benchmark report to a JSON file.
    ///
    /// Returns the path to the created file.
    pub fn save(&self, report: &BenchmarkReport) -> Result<PathBuf, ReporterError> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ");
        let category = match report.results.first() {
            Some(first) if report.results.iter().all(|r| r.category == first.category) => {
                first.category.to_string()
            }
            _ => "mixed".to_string(),
        };

        let filename = format!("{}_{}.json", category, timestamp);
        let filepath = self.output_dir.join(&filename);

        let file = File::create(&filepath)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, report)?;

        Ok(filepath)
    }
}

/// Raw samples measured at one message size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub message_size: usize,
    pub values: Vec<i64>,
}

/// CSV reporter for raw samples.
pub struct CsvReporter {
    output_dir: PathBuf,
}

impl CsvReporter {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReporterError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Render rows with a `what, value0, ...` header sized to the widest row.
    pub fn render(rows: &[CsvRow]) -> String {
        let width = rows.iter().map(|r| r.values.len()).max().unwrap_or(0);
        let header: String = (0..width).map(|i| format!("value{}, ", i)).collect();
        let mut out = format!("what, {}\n", header);
        for row in rows {
            let values: String = row.values.iter().map(|v| format!("{}, ", v)).collect();
            out.push_str(&format!("{}, {}\n", row.message_size, values));
        }
        out
    }

    /// Write `rows` to `<name>.csv` in the output directory.
    pub fn save(&self, name: &str, rows: &[CsvRow]) -> Result<PathBuf, ReporterError> {
        let filepath = self.output_dir.join(format!("{}.csv", name));
        let mut writer = BufWriter::new(File::create(&filepath)?);
        writer.write_all(Self::render(rows).as_bytes())?;
        writer.flush()?;
        Ok(filepath)
    }
}
