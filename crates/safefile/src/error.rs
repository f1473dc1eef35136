//! Error types for safe file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during safe file operations.
#[derive(Error, Debug)]
pub enum SafeFileError {
    /// The logical file name is empty.
    #[error("invalid file name")]
    InvalidName,

    /// No artifact of the logical file exists, or the only trace is an
    /// in-progress write that a read refuses to resolve.
    #[error("file does not exist: {path}")]
    DoesNotExist { path: PathBuf },

    /// The logical file name resolves to a directory.
    #[error("not a file: {path}")]
    NotAFile { path: PathBuf },

    /// Failed to read from file system.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to file system.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to rename one artifact onto another.
    #[error("failed to rename {from} to {to}: {source}")]
    RenameError {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove an artifact.
    #[error("failed to remove {path}: {source}")]
    RemoveError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize or deserialize JSON content.
    #[error("failed to serialize: {0}")]
    SerializeError(#[from] serde_json::Error),
}

impl SafeFileError {
    /// Returns true for the deterministic validation kinds
    /// (`InvalidName`, `DoesNotExist`, `NotAFile`).
    ///
    /// Anything else was propagated from the filesystem or the JSON codec
    /// and may leave crash artifacts behind for a later recovery.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidName | Self::DoesNotExist { .. } | Self::NotAFile { .. }
        )
    }
}

/// Result type alias for safe file operations.
pub type Result<T> = std::result::Result<T, SafeFileError>;
