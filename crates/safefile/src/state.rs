//! Safety classification of a logical file's on-disk layout.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SafeFileError};
use crate::fs::Filesystem;
use crate::paths::{ArtifactPaths, Layout};

/// Outcome of classifying a logical file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyState {
    /// Only the base file exists.
    Normal,
    /// A ready, backup or tertiary artifact exists and no write is in flight.
    Recoverable,
    /// An ephemeral artifact exists; a write may have been cut short.
    Intervene,
    /// The path is empty.
    InvalidName,
    /// None of the five artifacts exist.
    DoesNotExist,
    /// The path is a directory.
    NotAFile,
}

impl SafetyState {
    /// Returns true if the layout holds at least one artifact of a valid
    /// logical file.
    pub fn is_present(self) -> bool {
        matches!(self, Self::Normal | Self::Recoverable | Self::Intervene)
    }

    /// Returns the snake_case name of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Recoverable => "recoverable",
            Self::Intervene => "intervene",
            Self::InvalidName => "invalid_name",
            Self::DoesNotExist => "does_not_exist",
            Self::NotAFile => "not_a_file",
        }
    }
}

impl fmt::Display for SafetyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates `path` and derives its artifact paths.
///
/// Fails with `InvalidName` for an empty path and `NotAFile` when the base
/// path is a directory. Existence is not checked here.
pub(crate) fn validate<F: Filesystem + ?Sized>(fs: &F, path: &Path) -> Result<ArtifactPaths> {
    let paths = ArtifactPaths::new(path)?;
    if fs.is_dir(paths.base()) {
        return Err(SafeFileError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(paths)
}

/// Validates `path` and scans which artifacts exist.
pub(crate) fn inspect<F: Filesystem + ?Sized>(
    fs: &F,
    path: &Path,
) -> Result<(ArtifactPaths, Layout)> {
    let paths = validate(fs, path)?;
    let layout = Layout::scan(fs, &paths);
    Ok((paths, layout))
}

/// Classifies the on-disk layout of the logical file at `path`.
///
/// Pure inspection: never mutates the filesystem and never fails.
pub fn classify<F: Filesystem + ?Sized>(fs: &F, path: impl AsRef<Path>) -> SafetyState {
    let path = path.as_ref();
    let state = match inspect(fs, path) {
        Ok((_, layout)) => layout.safety_state(),
        Err(SafeFileError::NotAFile { .. }) => SafetyState::NotAFile,
        Err(_) => SafetyState::InvalidName,
    };
    debug!(path = %path.display(), state = %state, "classified");
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryFilesystem;

    #[test]
    fn test_classify_normal() {
        let fs = MemoryFilesystem::new();
        fs.insert_file("sgs1.txt", b"test base");

        assert_eq!(classify(&fs, "sgs1.txt"), SafetyState::Normal);
    }

    #[test]
    fn test_classify_ephemeral_only_is_intervene() {
        let fs = MemoryFilesystem::new();
        fs.insert_file("sgs2.txt.eph", b"test eph");

        assert_eq!(classify(&fs, "sgs2.txt"), SafetyState::Intervene);
    }

    #[test]
    fn test_classify_recoverable_artifacts() {
        for suffix in ["rdy", "bak", "bk2"] {
            let fs = MemoryFilesystem::new();
            fs.insert_file(format!("f.{}", suffix), b"content");

            assert_eq!(classify(&fs, "f"), SafetyState::Recoverable, "{}", suffix);
        }
    }

    #[test]
    fn test_ephemeral_dominates_everything() {
        let fs = MemoryFilesystem::new();
        for name in ["f", "f.eph", "f.rdy", "f.bak", "f.bk2"] {
            fs.insert_file(name, b"x");
        }

        assert_eq!(classify(&fs, "f"), SafetyState::Intervene);
    }

    #[test]
    fn test_classify_invalid_inputs() {
        let fs = MemoryFilesystem::new();
        fs.add_dir("dir");

        assert_eq!(classify(&fs, ""), SafetyState::InvalidName);
        assert_eq!(classify(&fs, "dir"), SafetyState::NotAFile);
        assert_eq!(classify(&fs, "nofile.txt"), SafetyState::DoesNotExist);
    }

    #[test]
    fn test_classify_does_not_mutate() {
        let fs = MemoryFilesystem::new();
        fs.insert_file("f.eph", b"partial");
        fs.insert_file("f.rdy", b"ready");

        classify(&fs, "f");

        assert_eq!(fs.mutations(), 0);
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&SafetyState::DoesNotExist).unwrap();
        assert_eq!(json, "\"does_not_exist\"");
        assert_eq!(SafetyState::NotAFile.to_string(), "not_a_file");
    }

    #[test]
    fn test_is_present() {
        assert!(SafetyState::Intervene.is_present());
        assert!(!SafetyState::DoesNotExist.is_present());
        assert!(!SafetyState::InvalidName.is_present());
    }
}
