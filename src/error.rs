//! Error types for loading, synchronizing and persisting workbooks.
//!
//! Every variant is terminal for the current invocation. Per-cell anomalies
//! (a non-numeric coefficient, an unmatched title, an empty unit) are never
//! errors; the rollup absorbs them.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RollupError {
    /// The expected input does not exist or cannot be opened.
    #[error("source unavailable: {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input exists but cannot be read as a grid.
    #[error("source corrupt: {}: {message}", path.display())]
    SourceCorrupt { path: PathBuf, message: String },

    /// The grid is readable but structurally unusable.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The grid writer could not persist the workbook.
    #[error("failed to persist workbook to {}", path.display())]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no sheet named '{0}' in grade store")]
    UnknownSheet(String),

    #[error("no subject '{title}' in sheet '{sheet}'")]
    UnknownTitle { sheet: String, title: String },
}

impl RollupError {
    /// Returns the recommended process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            RollupError::MalformedInput(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, RollupError>;
