//! Output formatting and persistence for unit averages.
//!
//! Supports a plain-text report, a JSON report file, and CSV history append.
//! Rounding to two decimals happens here, never in the rollup.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::rollup::{Standing, UnitResult, standing};
use csv::WriterBuilder;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::path::Path;

/// One unit line of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitReport {
    pub period: String,
    pub unit: String,
    pub average: f64,
    pub standing: Standing,
}

/// A complete report, written as JSON.
#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub units: Vec<UnitReport>,
}

impl Report {
    pub fn from_results(results: &[UnitResult]) -> Self {
        Self {
            generated_at: Utc::now(),
            units: results.iter().map(unit_report).collect(),
        }
    }
}

fn unit_report(result: &UnitResult) -> UnitReport {
    UnitReport {
        period: result.unit.period.clone(),
        unit: result.unit.unit.clone(),
        average: result.average,
        standing: standing(result.average),
    }
}

/// A row of the history CSV.
#[derive(Debug, Serialize)]
struct HistoryRow<'a> {
    timestamp: DateTime<Utc>,
    period: &'a str,
    unit: &'a str,
    average: f64,
    standing: Standing,
}

/// Renders results grouped by period:
///
/// ```text
/// S1 :
///   UE1 : 11.20 (pass)
/// ```
pub fn render_text(results: &[UnitResult]) -> String {
    let mut out = String::new();
    let mut current: Option<&str> = None;

    for result in results {
        let period = result.unit.period.as_str();
        if current != Some(period) {
            if current.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "{period} :");
            current = Some(period);
        }
        let _ = writeln!(
            out,
            "  {} : {:.2} ({})",
            result.unit.unit,
            result.average,
            standing(result.average)
        );
    }

    out
}

/// Writes the report as pretty-printed JSON to `path`.
pub fn write_json(path: &Path, report: &Report) -> Result<()> {
    let body = serde_json::to_vec_pretty(report)?;
    std::fs::write(path, body)?;
    debug!(path = %path.display(), units = report.units.len(), "Wrote JSON report");
    Ok(())
}

/// Appends every result as a row to a CSV history file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_history(path: &Path, results: &[UnitResult]) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending history records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    let timestamp = Utc::now();
    for result in results {
        writer.serialize(HistoryRow {
            timestamp,
            period: &result.unit.period,
            unit: &result.unit.unit,
            average: result.average,
            standing: standing(result.average),
        })?;
    }
    writer.flush()?;

    Ok(())
}
