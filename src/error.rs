use crate::parsers::property_groups::MarkupError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while validating a version or processing a descriptor file.
///
/// `InvalidVersionFormat` and `MissingVersion` abort a whole run. The per-file
/// variants are caught at the file boundary and reported as a failed outcome.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("Invalid version format '{0}'. Use format X.X.X.X")]
    InvalidVersionFormat(String),

    #[error("In silent mode, you must provide a valid version argument (X.X.X.X)")]
    MissingVersion,

    #[error("Failed to parse '{}': {source}", path.display())]
    ParseFailure {
        path: PathBuf,
        #[source]
        source: MarkupError,
    },

    #[error("Failed to scan '{}': {reason}", path.display())]
    ScanFailure { path: PathBuf, reason: String },

    #[error("I/O error on '{}': {source}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UpdateError {
    /// Path the error belongs to: the file for per-file errors, the root for a failed scan
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            UpdateError::ParseFailure { path, .. }
            | UpdateError::ScanFailure { path, .. }
            | UpdateError::IoFailure { path, .. } => Some(path),
            _ => None,
        }
    }
}
