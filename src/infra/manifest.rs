use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, RollupError};

pub const MANIFEST_FILE: &str = "workbook.json";

/// Sheet order of a workbook directory.
///
/// Stored as a plain JSON object next to the sheet files:
/// ```json
/// { "sheets": ["S1", "S2"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkbookManifest {
    sheets: Vec<String>,
}

impl WorkbookManifest {
    pub fn new(sheets: Vec<String>) -> Self {
        Self { sheets }
    }

    /// Loads the manifest from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| RollupError::SourceUnavailable {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|e| RollupError::SourceCorrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn sheets(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        let manifest = WorkbookManifest::new(vec!["S2".into(), "S1".into()]);
        std::fs::write(&path, manifest.to_json().unwrap()).unwrap();

        let loaded = WorkbookManifest::load(&path).unwrap();
        assert_eq!(loaded.sheets().collect::<Vec<_>>(), vec!["S2", "S1"]);
    }

    #[test]
    fn test_invalid_manifest_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            WorkbookManifest::load(&path),
            Err(RollupError::SourceCorrupt { .. })
        ));
    }
}
