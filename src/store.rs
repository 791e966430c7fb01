//! The user-editable grade store.
//!
//! One sheet per period. Row 1 is a header; every following row is a subject
//! title in column 1 followed by zero or more grade cells.

use serde::Serialize;

use crate::error::{Result, RollupError};
use crate::grid::{Cell, Grid, Workbook};

pub const HEADER_ROW: usize = 1;
pub const TITLE_COLUMN: usize = 1;
pub const FIRST_GRADE_COLUMN: usize = 2;

/// A store row as seen by the reporting and edit surfaces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeRecord {
    pub title: String,
    pub grades: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradeStore {
    workbook: Workbook,
}

impl GradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a loaded workbook.
    ///
    /// # Errors
    ///
    /// Returns [`RollupError::MalformedInput`] if sheet names are empty or repeated.
    pub fn from_workbook(workbook: Workbook) -> Result<Self> {
        workbook.validate()?;
        Ok(Self { workbook })
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.workbook.contains(name)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.workbook.sheet_names()
    }

    /// Data rows of a sheet in order. Rows with an empty title are skipped;
    /// non-numeric grade cells are ignored.
    pub fn records(&self, sheet: &str) -> Option<Vec<GradeRecord>> {
        let grid = self.workbook.sheet(sheet)?;
        Some(records_of(grid))
    }

    /// Iterates `(sheet name, records)` over every sheet.
    pub fn all_records(&self) -> impl Iterator<Item = (&str, Vec<GradeRecord>)> {
        self.workbook
            .sheets()
            .map(|s| (s.name.as_str(), records_of(&s.grid)))
    }

    /// Titles of a sheet's data rows, in order.
    pub fn titles(&self, sheet: &str) -> Vec<String> {
        self.records(sheet)
            .map(|rs| rs.into_iter().map(|r| r.title).collect())
            .unwrap_or_default()
    }

    /// Writes `grade` into the first free grade cell of `title`'s row.
    ///
    /// This is the entry point for an edit surface; synchronization and
    /// rollup never change grades.
    pub fn record_grade(&mut self, sheet: &str, title: &str, grade: f64) -> Result<()> {
        let grid = self
            .workbook
            .sheet_mut(sheet)
            .ok_or_else(|| RollupError::UnknownSheet(sheet.to_string()))?;

        let row = (HEADER_ROW + 1..=grid.row_count())
            .find(|&r| grid.get(r, TITLE_COLUMN).to_string() == title)
            .ok_or_else(|| RollupError::UnknownTitle {
                sheet: sheet.to_string(),
                title: title.to_string(),
            })?;

        let col = (FIRST_GRADE_COLUMN..)
            .find(|&c| grid.get(row, c).is_empty())
            .unwrap_or(FIRST_GRADE_COLUMN);
        grid.set(row, col, Cell::Number(grade));
        Ok(())
    }

    pub(crate) fn add_sheet(&mut self, name: &str, header: &[String]) {
        let mut grid = Grid::new();
        grid.push_row(header.iter().map(|h| Cell::text(h.as_str())).collect());
        self.workbook.add_sheet(name, grid);
    }

    pub(crate) fn append_title(&mut self, sheet: &str, title: &str) {
        if let Some(grid) = self.workbook.sheet_mut(sheet) {
            grid.push_row(vec![Cell::text(title)]);
        }
    }
}

fn records_of(grid: &Grid) -> Vec<GradeRecord> {
    (HEADER_ROW + 1..=grid.row_count())
        .filter_map(|r| {
            let row = grid.row(r);
            let title = row.first()?.to_string();
            if title.is_empty() {
                return None;
            }
            let grades = row
                .iter()
                .skip(FIRST_GRADE_COLUMN - 1)
                .filter_map(Cell::as_number)
                .collect();
            Some(GradeRecord { title, grades })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(rows: Vec<Vec<Cell>>) -> GradeStore {
        let mut wb = Workbook::new();
        wb.add_sheet("S1", Grid::from_rows(rows));
        GradeStore::from_workbook(wb).unwrap()
    }

    #[test]
    fn test_records_skip_header_and_text_grades() {
        let store = store_with(vec![
            vec![Cell::text("Subject"), Cell::text("Grade")],
            vec![Cell::text("Algèbre"), Cell::Number(12.0), Cell::text("abs"), Cell::Number(9.5)],
            vec![Cell::text("Analyse")],
            vec![Cell::Empty, Cell::Number(20.0)],
        ]);

        let records = store.records("S1").unwrap();
        assert_eq!(
            records,
            vec![
                GradeRecord { title: "Algèbre".into(), grades: vec![12.0, 9.5] },
                GradeRecord { title: "Analyse".into(), grades: vec![] },
            ]
        );
        assert!(store.records("S2").is_none());
    }

    #[test]
    fn test_record_grade_fills_first_free_column() {
        let mut store = store_with(vec![
            vec![Cell::text("Subject"), Cell::text("Grade")],
            vec![Cell::text("Algèbre"), Cell::Number(12.0)],
        ]);

        store.record_grade("S1", "Algèbre", 15.0).unwrap();

        let grid = store.workbook().sheet("S1").unwrap();
        assert_eq!(grid.get(2, 3), &Cell::Number(15.0));
        assert_eq!(store.records("S1").unwrap()[0].grades, vec![12.0, 15.0]);
    }

    #[test]
    fn test_record_grade_unknown_targets() {
        let mut store = store_with(vec![vec![Cell::text("Subject")]]);
        assert!(matches!(
            store.record_grade("S9", "x", 1.0),
            Err(RollupError::UnknownSheet(_))
        ));
        assert!(matches!(
            store.record_grade("S1", "x", 1.0),
            Err(RollupError::UnknownTitle { .. })
        ));
    }

    #[test]
    fn test_header_row_is_never_a_record() {
        let store = store_with(vec![vec![Cell::text("Subject"), Cell::Number(3.0)]]);
        assert!(store.titles("S1").is_empty());
    }
}
