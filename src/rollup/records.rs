//! Rollup over flat grade records.
//!
//! Each line of a record file is `period;unit;subject;credits;grade` with no
//! header. Credits are whole numbers; grades may use a decimal comma. Lines
//! with a missing grade, a non-integer credit, a non-numeric grade, or the
//! wrong number of fields are skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Result, RollupError};
use crate::grid::Cell;
use crate::rollup::types::{UnitId, UnitResult, WeightedSum};

const FIELD_COUNT: usize = 5;

/// A validated record line.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeLine {
    pub period: String,
    pub unit: String,
    pub subject: String,
    pub credits: i64,
    pub grade: f64,
}

impl GradeLine {
    fn from_record(record: &StringRecord) -> Option<Self> {
        if record.len() != FIELD_COUNT {
            return None;
        }
        let grade = &record[4];
        if grade.is_empty() {
            return None;
        }
        Some(Self {
            period: record[0].to_string(),
            unit: record[1].to_string(),
            subject: record[2].to_string(),
            credits: record[3].trim().parse().ok()?,
            grade: Cell::parse(grade).as_number()?,
        })
    }
}

/// Reads and rolls up a record file.
pub fn rollup_records_file(path: &Path) -> Result<Vec<UnitResult>> {
    let file = File::open(path).map_err(|source| RollupError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    rollup_records(file).map_err(|e| match e {
        RollupError::SourceCorrupt { message, .. } => RollupError::SourceCorrupt {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// Rolls up records read from `reader`, one average per `(period, unit)`.
///
/// Periods come out in first-seen order, and each period's units in
/// first-seen order within it, so a period's units stay together even when
/// the input interleaves periods. Units whose credits sum to zero are left
/// out rather than reported as 0.
pub fn rollup_records<R: Read>(reader: R) -> Result<Vec<UnitResult>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut periods: Vec<(String, Vec<(String, WeightedSum)>)> = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.records() {
        let record = result.map_err(|e| RollupError::SourceCorrupt {
            path: Default::default(),
            message: e.to_string(),
        })?;

        let Some(line) = GradeLine::from_record(&record) else {
            skipped += 1;
            continue;
        };

        let units = entry(&mut periods, line.period, Vec::new);
        entry(units, line.unit, WeightedSum::default).add(line.credits as f64, line.grade);
    }

    debug!(
        periods = periods.len(),
        units = periods.iter().map(|(_, units)| units.len()).sum::<usize>(),
        skipped,
        "Rolled up grade records"
    );

    Ok(periods
        .into_iter()
        .flat_map(|(period, units)| {
            units.into_iter().filter_map(move |(unit, sum)| {
                sum.average().map(|average| UnitResult {
                    unit: UnitId::new(period.clone(), unit),
                    average,
                })
            })
        })
        .collect())
}

/// Finds `key` in an insertion-ordered list, appending it if absent.
fn entry<V>(list: &mut Vec<(String, V)>, key: String, init: impl FnOnce() -> V) -> &mut V {
    let pos = match list.iter().position(|(k, _)| *k == key) {
        Some(pos) => pos,
        None => {
            list.push((key, init()));
            list.len() - 1
        }
    };
    &mut list[pos].1
}
