use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::{debug, info, warn};

use super::manifest::{MANIFEST_FILE, WorkbookManifest};
use super::{GridLoader, GridWriter};
use crate::error::{Result, RollupError};
use crate::grid::{Cell, Grid, Workbook};

const SHEET_EXTENSION: &str = "csv";
const TMP_SUFFIX: &str = ".tmp";

/// A workbook stored as a directory of delimited text files.
///
/// Each sheet is `<dir>/<sheet>.csv`; `<dir>/workbook.json` lists the sheet
/// order. Without a manifest, sheets load in file-name order. Blank lines keep
/// their row position, so a reserved empty row 2 survives a round trip.
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    dir: PathBuf,
    delimiter: u8,
}

impl CsvWorkbook {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            delimiter: b';',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self) -> bool {
        self.dir.is_dir()
    }

    fn sheet_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{SHEET_EXTENSION}"))
    }

    fn sheet_order(&self) -> Result<Vec<String>> {
        let manifest_path = self.dir.join(MANIFEST_FILE);
        if manifest_path.exists() {
            let manifest = WorkbookManifest::load(&manifest_path)?;
            return Ok(manifest.sheets().map(str::to_string).collect());
        }

        let entries = fs::read_dir(&self.dir).map_err(|source| RollupError::SourceUnavailable {
            path: self.dir.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| RollupError::SourceUnavailable {
                    path: self.dir.clone(),
                    source,
                })?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some(SHEET_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_sheet(&self, path: &Path) -> Result<Grid> {
        let corrupt = |message: String| RollupError::SourceCorrupt {
            path: path.to_path_buf(),
            message,
        };

        let content = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => corrupt("sheet listed in manifest is missing".into()),
            _ => RollupError::SourceUnavailable {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let mut rdr = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_slice());

        let mut grid = Grid::new();
        let mut record = StringRecord::new();
        loop {
            let start = rdr.position().byte() as usize;
            if !rdr.read_record(&mut record).map_err(|e| corrupt(e.to_string()))? {
                break;
            }
            // The reader skips blank lines; put them back as empty rows.
            for _ in 0..leading_blank_lines(&content, start) {
                grid.push_row(Vec::new());
            }
            grid.push_row(record.iter().map(Cell::parse).collect());
        }

        Ok(grid)
    }

    fn write_sheet(&self, path: &Path, grid: &Grid) -> io::Result<()> {
        let mut wtr = WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        for row in grid.rows() {
            wtr.write_record(row.iter().map(|c| c.to_string()))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn remove_stale_sheets(&self, workbook: &Workbook) -> Result<()> {
        let entries = fs::read_dir(&self.dir).map_err(persist_failed(&self.dir))?;
        for entry in entries {
            let path = entry.map_err(persist_failed(&self.dir))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SHEET_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !workbook.contains(stem) {
                debug!(path = %path.display(), "Removing stale sheet file");
                fs::remove_file(&path).map_err(persist_failed(&path))?;
            }
        }
        Ok(())
    }
}

impl GridLoader for CsvWorkbook {
    fn load(&self) -> Result<Workbook> {
        if !self.exists() {
            return Err(RollupError::SourceUnavailable {
                path: self.dir.clone(),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }

        let mut workbook = Workbook::new();
        for name in self.sheet_order()? {
            let grid = self.read_sheet(&self.sheet_path(&name))?;
            debug!(sheet = %name, rows = grid.row_count(), "Loaded sheet");
            workbook.add_sheet(name, grid);
        }

        info!(dir = %self.dir.display(), sheets = workbook.len(), "Workbook loaded");
        Ok(workbook)
    }

    fn load_optional(&self) -> Result<Option<Workbook>> {
        if !self.exists() {
            debug!(dir = %self.dir.display(), "Workbook absent");
            return Ok(None);
        }
        self.load().map(Some)
    }
}

impl GridWriter for CsvWorkbook {
    /// Writes every sheet and the manifest to temporary files first and only
    /// renames them into place once all writes succeeded. Temporary files
    /// still present after a failed write or rename are removed. Sheet files
    /// that are no longer part of the workbook are removed afterwards.
    fn save(&self, workbook: &Workbook) -> Result<()> {
        workbook.validate()?;
        for name in workbook.sheet_names() {
            if name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(RollupError::MalformedInput(format!(
                    "sheet name '{name}' cannot be used as a file name"
                )));
            }
        }

        fs::create_dir_all(&self.dir).map_err(persist_failed(&self.dir))?;

        let mut staged = Vec::new();
        if let Err(e) = self
            .stage(workbook, &mut staged)
            .and_then(|()| commit(&staged))
        {
            discard_staged(&staged);
            return Err(e);
        }

        self.remove_stale_sheets(workbook)?;

        info!(dir = %self.dir.display(), sheets = workbook.len(), "Workbook saved");
        Ok(())
    }
}

impl CsvWorkbook {
    /// Writes each sheet and the manifest next to its target. Every
    /// `(tmp, target)` pair is recorded before its write starts.
    fn stage(&self, workbook: &Workbook, staged: &mut Vec<(PathBuf, PathBuf)>) -> Result<()> {
        for sheet in workbook.sheets() {
            let target = self.sheet_path(&sheet.name);
            let tmp = tmp_path(&target);
            staged.push((tmp.clone(), target));
            self.write_sheet(&tmp, &sheet.grid).map_err(persist_failed(&tmp))?;
        }

        let manifest = WorkbookManifest::new(workbook.sheet_names().map(str::to_string).collect());
        let manifest_target = self.dir.join(MANIFEST_FILE);
        let manifest_tmp = tmp_path(&manifest_target);
        let json = manifest
            .to_json()
            .map_err(|e| persist_failed(&manifest_tmp)(io::Error::other(e)))?;
        staged.push((manifest_tmp.clone(), manifest_target));
        fs::write(&manifest_tmp, json).map_err(persist_failed(&manifest_tmp))
    }
}

fn commit(staged: &[(PathBuf, PathBuf)]) -> Result<()> {
    for (tmp, target) in staged {
        fs::rename(tmp, target).map_err(persist_failed(target))?;
    }
    Ok(())
}

fn discard_staged(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        match fs::remove_file(tmp) {
            Ok(()) => debug!(path = %tmp.display(), "Discarded staged file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %tmp.display(), error = %e, "Could not discard staged file"),
        }
    }
}

fn persist_failed(path: &Path) -> impl Fn(io::Error) -> RollupError + use<> {
    let path = path.to_path_buf();
    move |source| RollupError::PersistFailed {
        path: path.clone(),
        source,
    }
}

/// Counts the empty lines starting at byte `start`. A `\n` completing the
/// previous record's `\r\n` terminator is not a blank line.
fn leading_blank_lines(content: &[u8], start: usize) -> usize {
    let mut i = start;
    if i > 0 && content[i - 1] == b'\r' && content.get(i) == Some(&b'\n') {
        i += 1;
    }

    let mut blanks = 0;
    loop {
        match content.get(i) {
            Some(b'\r') => {
                blanks += 1;
                i += 1;
                if content.get(i) == Some(&b'\n') {
                    i += 1;
                }
            }
            Some(b'\n') => {
                blanks += 1;
                i += 1;
            }
            _ => break,
        }
    }
    blanks
}

fn tmp_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(TMP_SUFFIX);
    target.with_file_name(name)
}
