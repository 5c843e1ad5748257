/// Error taxonomy for the collection core
///
/// Read failures are recovered by the loader and handed back as a warning.
/// Everything else is returned to the caller, and the in-memory state is
/// left exactly as it was before the rejected operation.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectionError {
    /// Snapshot missing, unreadable, or unparsable. Recovered as empty state.
    #[error("could not read collection data from {path}: {reason}")]
    StorageRead { path: PathBuf, reason: String },

    /// Snapshot could not be written. Nothing is guaranteed saved.
    #[error("could not save collection data to {path}: {reason}")]
    StorageWrite { path: PathBuf, reason: String },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("series '{series}' already exists in {category}")]
    DuplicateSeries { category: String, series: String },

    #[error("{0} not found")]
    NotFound(String),
}

impl CollectionError {
    pub(crate) fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::StorageRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::StorageWrite {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for errors that the loader recovers from on its own
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::StorageRead { .. })
    }
}

pub type Result<T> = std::result::Result<T, CollectionError>;
