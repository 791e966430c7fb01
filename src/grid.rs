//! Typed cell grids and workbooks.
//!
//! A [`Workbook`] is an ordered mapping from sheet name to a [`Grid`]. Grids
//! are addressed 1-based by `(row, column)`, like a spreadsheet. Reads outside
//! the populated area return [`Cell::Empty`].

use std::collections::HashSet;
use std::fmt;

use crate::error::{Result, RollupError};

/// A single typed cell value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    /// Types a raw text field as loaded from storage.
    ///
    /// An empty field is [`Cell::Empty`]. A field that parses as a finite real
    /// number is [`Cell::Number`]; a decimal comma is accepted (`12,5`).
    /// Anything else is kept verbatim as [`Cell::Text`].
    pub fn parse(field: &str) -> Self {
        if field.is_empty() {
            return Cell::Empty;
        }
        match parse_number(field) {
            Some(n) => Cell::Number(n),
            None => Cell::Text(field.to_string()),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Display text of a cell: text verbatim, numbers in shortest decimal form.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{n}"),
        }
    }
}

fn parse_number(field: &str) -> Option<f64> {
    let normalized = field.replacen(',', ".", 1);
    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// A 2-D grid of cells, stored row-major. Rows may be ragged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Returns the cell at 1-based `(row, col)`, or an empty cell outside the grid.
    pub fn get(&self, row: usize, col: usize) -> &Cell {
        if row == 0 || col == 0 {
            return &EMPTY;
        }
        self.rows
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .unwrap_or(&EMPTY)
    }

    /// Writes a cell at 1-based `(row, col)`, growing the grid as needed.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        assert!(row > 0 && col > 0, "grid coordinates are 1-based");
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let r = &mut self.rows[row - 1];
        if r.len() < col {
            r.resize_with(col, Cell::default);
        }
        r[col - 1] = cell;
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Number of rows, including empty trailing ones.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cells of a 1-based row; empty slice outside the grid.
    pub fn row(&self, row: usize) -> &[Cell] {
        if row == 0 {
            return &[];
        }
        self.rows.get(row - 1).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub grid: Grid,
}

/// Ordered sheet-name → grid mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, name: impl Into<String>, grid: Grid) {
        self.sheets.push(Sheet {
            name: name.into(),
            grid,
        });
    }

    pub fn sheet(&self, name: &str) -> Option<&Grid> {
        self.sheets.iter().find(|s| s.name == name).map(|s| &s.grid)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Grid> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .map(|s| &mut s.grid)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sheets.iter().any(|s| s.name == name)
    }

    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Checks that the workbook is a proper mapping: every sheet has a
    /// non-empty name and no name appears twice.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for sheet in &self.sheets {
            if sheet.name.is_empty() {
                return Err(RollupError::MalformedInput(
                    "sheet with an empty name".to_string(),
                ));
            }
            if !seen.insert(sheet.name.as_str()) {
                return Err(RollupError::MalformedInput(format!(
                    "duplicate sheet '{}'",
                    sheet.name
                )));
            }
        }
        Ok(())
    }
}
