//! Run settings shared by the CLI commands.
//!
//! Paths can come from flags or from the environment (a `.env` file is loaded
//! at startup), so a fixed curriculum/store pair needs no flags at all.

use clap::Args;
use std::path::PathBuf;

use crate::infra::CsvWorkbook;
use crate::sync::SyncConfig;

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Directory holding the curriculum workbook
    #[arg(long, env = "GRADE_ROLLUP_CURRICULUM", default_value = "curriculum")]
    pub curriculum: PathBuf,

    /// Directory holding the grade store workbook (created if absent)
    #[arg(long, env = "GRADE_ROLLUP_STORE", default_value = "grades")]
    pub store: PathBuf,

    /// Field delimiter of the sheet files
    #[arg(long, default_value = ";", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Grade columns reserved when a period is added to an existing store
    #[arg(long, default_value_t = 3)]
    pub grade_columns: usize,
}

impl Settings {
    pub fn curriculum_storage(&self) -> CsvWorkbook {
        CsvWorkbook::new(&self.curriculum).with_delimiter(self.delimiter)
    }

    pub fn store_storage(&self) -> CsvWorkbook {
        CsvWorkbook::new(&self.store).with_delimiter(self.delimiter)
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            grade_columns: self.grade_columns,
        }
    }
}

/// Accepts a single ASCII character.
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!("delimiter must be one ASCII character, got '{s}'")),
    }
}
