//! Failures an extraction run can hit.

use std::path::PathBuf;

/// Errors raised while walking, parsing, filtering, or writing.
///
/// Every variant carries the path it concerns so the orchestrator can report
/// (or skip) the offending file.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected structure in {}: {reason}", path.display())]
    Schema { path: PathBuf, reason: String },
}

impl ExtractError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn schema(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Parse and schema failures stay local to one file; I/O failures do not.
    pub fn is_file_local(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Schema { .. })
    }
}

pub type Result<T, E = ExtractError> = std::result::Result<T, E>;
