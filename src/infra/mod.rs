//! Workbook storage.
//!
//! [`GridLoader`] and [`GridWriter`] are the seams between the core and
//! whatever medium holds the grids. [`CsvWorkbook`] implements both over a
//! directory of delimited text files, one per sheet, ordered by a
//! [`WorkbookManifest`].

mod csv_workbook;
mod manifest;

pub use csv_workbook::CsvWorkbook;
pub use manifest::{MANIFEST_FILE, WorkbookManifest};

use crate::error::Result;
use crate::grid::Workbook;

/// Reads a sheet-name → grid mapping from a storage location.
pub trait GridLoader {
    fn load(&self) -> Result<Workbook>;

    /// Like [`GridLoader::load`], but an absent location is `Ok(None)`.
    fn load_optional(&self) -> Result<Option<Workbook>>;
}

/// Durably persists a sheet-name → grid mapping.
pub trait GridWriter {
    fn save(&self, workbook: &Workbook) -> Result<()>;
}
