//! Handle binding a filesystem to one logical file.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, SafeFileError};
use crate::fs::{Filesystem, OsFilesystem};
use crate::paths::{ArtifactPaths, Layout};
use crate::read::safe_read;
use crate::recovery::{recover, RecoveryReport};
use crate::state::{classify, SafetyState};
use crate::write::safe_write;
use crate::SafeFileConfig;

/// A logical file protected by the staged-rename protocol.
///
/// ```no_run
/// use safefile::SafeFile;
///
/// let file = SafeFile::new("/var/lib/app/state.json");
/// file.write(b"{}").unwrap();
/// assert_eq!(file.read().unwrap(), b"{}");
/// ```
#[derive(Debug, Clone)]
pub struct SafeFile<F = OsFilesystem> {
    fs: F,
    path: PathBuf,
}

impl SafeFile<OsFilesystem> {
    /// Creates a handle on the OS filesystem with default durability.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_filesystem(OsFilesystem::new(), path)
    }

    /// Creates a handle on the OS filesystem with the given configuration.
    pub fn with_config(path: impl Into<PathBuf>, config: SafeFileConfig) -> Self {
        Self::with_filesystem(OsFilesystem::with_config(config), path)
    }
}

impl<F: Filesystem> SafeFile<F> {
    /// Creates a handle on an arbitrary filesystem.
    pub fn with_filesystem(fs: F, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    /// Returns the base path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the underlying filesystem.
    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    /// Derives the artifact paths of this file.
    pub fn artifacts(&self) -> Result<ArtifactPaths> {
        ArtifactPaths::new(&self.path)
    }

    /// Scans which artifacts currently exist.
    pub fn layout(&self) -> Result<Layout> {
        Ok(Layout::scan(&self.fs, &self.artifacts()?))
    }

    /// Classifies the on-disk layout.
    pub fn state(&self) -> SafetyState {
        classify(&self.fs, &self.path)
    }

    /// Collapses the layout back to a single base file.
    pub fn recover(&self) -> Result<RecoveryReport> {
        recover(&self.fs, &self.path)
    }

    /// Reads the committed content, recovering first when safe.
    pub fn read(&self) -> Result<Vec<u8>> {
        safe_read(&self.fs, &self.path)
    }

    /// Commits new content.
    pub fn write(&self, data: impl AsRef<[u8]>) -> Result<()> {
        safe_write(&self.fs, &self.path, data)
    }

    /// Serializes `value` as pretty JSON and commits it.
    pub fn save_json<T: Serialize>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.write(json.as_bytes())
    }

    /// Reads and deserializes JSON content.
    pub fn load_json<T: DeserializeOwned>(&self) -> Result<T> {
        let data = self.read()?;
        let value = serde_json::from_slice(&data)?;
        Ok(value)
    }

    /// Reads JSON content, returning None if the file doesn't exist.
    pub fn load_json_optional<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match self.load_json() {
            Ok(value) => Ok(Some(value)),
            Err(SafeFileError::DoesNotExist { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
