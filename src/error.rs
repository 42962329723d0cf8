use std::fmt::Display;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure taxonomy shared by the source and sink seams. Unmatched line
/// items are deliberately not represented here: they are diagnostics
/// carried in the run report, not failures.
#[derive(Debug, Error)]
pub enum FilingError {
    /// Source document missing, unreadable, or addressed out of range
    /// (bad page index, absent sheet). Fatal for the run.
    #[error("failed to read {path}: {detail}")]
    DocumentRead { path: PathBuf, detail: String },

    /// The record sink rejected a write. Fatal for the run, never retried.
    #[error("persistence failed: {detail}")]
    Persistence { detail: String },
}

impl FilingError {
    pub fn document_read(path: &Path, detail: impl Display) -> Self {
        Self::DocumentRead {
            path: path.to_path_buf(),
            detail: detail.to_string(),
        }
    }

    pub fn persistence(detail: impl Display) -> Self {
        Self::Persistence {
            detail: detail.to_string(),
        }
    }
}

impl From<rusqlite::Error> for FilingError {
    fn from(err: rusqlite::Error) -> Self {
        Self::persistence(err)
    }
}
