//! Read pipeline.

use std::path::Path;

use tracing::warn;

use crate::error::{Result, SafeFileError};
use crate::fs::Filesystem;
use crate::paths::ArtifactPaths;
use crate::recovery::recover;
use crate::state::{classify, validate, SafetyState};

/// Reads the committed content of the logical file.
///
/// A recoverable layout is recovered first. A layout with an ephemeral
/// artifact is left exactly as found and reported as missing, since an
/// interrupted write may hold data someone should inspect.
///
/// # Errors
/// `InvalidName`, `NotAFile`, or `DoesNotExist` (including the
/// interrupted-write case).
pub fn safe_read<F: Filesystem + ?Sized>(fs: &F, path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    match classify(fs, path) {
        SafetyState::InvalidName => Err(SafeFileError::InvalidName),
        SafetyState::NotAFile => Err(SafeFileError::NotAFile {
            path: path.to_path_buf(),
        }),
        SafetyState::DoesNotExist => Err(SafeFileError::DoesNotExist {
            path: path.to_path_buf(),
        }),
        SafetyState::Intervene => {
            warn!(path = %path.display(), "interrupted write found, refusing to read");
            Err(SafeFileError::DoesNotExist {
                path: path.to_path_buf(),
            })
        }
        SafetyState::Recoverable => {
            recover(fs, path)?;
            read_base(fs, path)
        }
        SafetyState::Normal => read_base(fs, path),
    }
}

/// Reads the base file directly, ignoring every other artifact.
///
/// # Errors
/// `InvalidName`, `NotAFile`, or `DoesNotExist` when base is missing.
pub fn read<F: Filesystem + ?Sized>(fs: &F, path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let paths = validate(fs, path)?;
    if !fs.exists(paths.base()) {
        return Err(SafeFileError::DoesNotExist {
            path: path.to_path_buf(),
        });
    }
    fs.read(paths.base())
}

fn read_base<F: Filesystem + ?Sized>(fs: &F, path: &Path) -> Result<Vec<u8>> {
    let paths = ArtifactPaths::new(path)?;
    // recovery may legitimately leave no base behind
    if !fs.exists(paths.base()) {
        return Err(SafeFileError::DoesNotExist {
            path: path.to_path_buf(),
        });
    }
    fs.read(paths.base())
}
