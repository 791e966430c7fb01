//! Curriculum grid parser.
//!
//! Turns a raw curriculum [`Workbook`] into a typed [`Curriculum`]: for each
//! period, the subject titles in column order and the teaching units with
//! their `(title, coefficient)` members. All positional conventions of the
//! grid live here; the rollup only ever sees the parsed form.

use tracing::debug;

use crate::error::Result;
use crate::grid::{Grid, Workbook};

/// First row holding subject data. Row 1 is metadata, row 2 is reserved.
pub const DATA_START_ROW: usize = 3;
/// Column holding subject titles.
pub const TITLE_COLUMN: usize = 1;
/// Text prefix identifying a unit marker cell.
pub const UNIT_MARKER_PREFIX: &str = "UE";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Curriculum {
    pub periods: Vec<Period>,
}

/// One curriculum sheet, e.g. a semester.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub name: String,
    /// Column-1 titles from the data rows, in sheet order. May repeat.
    pub subjects: Vec<String>,
    /// Units in the order their markers are first met, scanning column-major.
    pub units: Vec<Unit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub name: String,
    pub members: Vec<Member>,
}

/// A subject's weight inside one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub title: String,
    pub coefficient: f64,
}

impl Curriculum {
    /// Parses every sheet of `workbook` as a period.
    ///
    /// # Errors
    ///
    /// Returns [`RollupError::MalformedInput`](crate::error::RollupError::MalformedInput)
    /// if the workbook is not a proper sheet mapping (empty or repeated names).
    pub fn from_workbook(workbook: &Workbook) -> Result<Self> {
        workbook.validate()?;

        let periods = workbook
            .sheets()
            .map(|sheet| parse_period(&sheet.name, &sheet.grid))
            .collect();

        Ok(Self { periods })
    }

    pub fn period(&self, name: &str) -> Option<&Period> {
        self.periods.iter().find(|p| p.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

fn parse_period(name: &str, grid: &Grid) -> Period {
    let subjects: Vec<String> = (DATA_START_ROW..=grid.row_count())
        .filter_map(|row| grid.get(row, TITLE_COLUMN).as_text())
        .map(str::to_string)
        .collect();

    let mut units: Vec<Unit> = Vec::new();

    for col in 1..=grid.column_count() {
        for row in 1..=grid.row_count() {
            let Some(marker) = grid.get(row, col).as_text() else {
                continue;
            };
            if !marker.starts_with(UNIT_MARKER_PREFIX) {
                continue;
            }

            let members = unit_members(grid, col);

            match units.iter_mut().find(|u| u.name == marker) {
                Some(unit) => unit.members.extend(members),
                None => units.push(Unit {
                    name: marker.to_string(),
                    members,
                }),
            }
        }
    }

    debug!(
        period = name,
        subjects = subjects.len(),
        units = units.len(),
        "Parsed curriculum period"
    );

    Period {
        name: name.to_string(),
        subjects,
        units,
    }
}

/// Walks the data rows of a marker's column. Rows without a text title or
/// without a numeric coefficient are skipped.
fn unit_members(grid: &Grid, col: usize) -> Vec<Member> {
    (DATA_START_ROW..=grid.row_count())
        .filter_map(|row| {
            let title = grid.get(row, TITLE_COLUMN).as_text()?;
            let coefficient = grid.get(row, col).as_number()?;
            Some(Member {
                title: title.to_string(),
                coefficient,
            })
        })
        .collect()
}
