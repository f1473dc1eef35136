//! Recovery: collapse any artifact layout back to a single base file.
//!
//! Priority, applied once per call:
//! 1. ephemeral is deleted, its content is never trusted
//! 2. ready is committed (current base rotates to backup)
//! 3. otherwise a missing base is restored from backup, then tertiary
//!
//! Running recovery on its own output changes nothing.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, SafeFileError};
use crate::fs::Filesystem;
use crate::paths::{Artifact, ArtifactPaths, Layout};
use crate::state::inspect;

/// What recovery did to the base file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum RecoveryAction {
    /// Base was already the only committed generation.
    None,
    /// Ready was committed over base.
    PromotedReady {
        /// Whether an existing base was rotated into backup.
        rotated_base: bool,
    },
    /// A missing base was restored from a fallback generation.
    Restored { from: Artifact },
    /// Nothing trustworthy survived; base stays absent.
    NothingSurvived,
}

/// Summary of one recovery pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecoveryReport {
    pub discarded_ephemeral: bool,
    #[serde(flatten)]
    pub action: RecoveryAction,
}

impl RecoveryReport {
    /// Returns true if recovery touched the filesystem.
    pub fn changed(&self) -> bool {
        self.discarded_ephemeral || self.action != RecoveryAction::None
    }
}

/// Recovers the logical file at `path`.
///
/// # Errors
/// `InvalidName` for an empty path, `NotAFile` for a directory,
/// `DoesNotExist` when none of the five artifacts exist. A failing
/// filesystem call is propagated and leaves a layout that a later call can
/// still resolve.
pub fn recover<F: Filesystem + ?Sized>(fs: &F, path: impl AsRef<Path>) -> Result<RecoveryReport> {
    let path = path.as_ref();
    let (paths, layout) = inspect(fs, path)?;
    if layout.is_empty() {
        return Err(SafeFileError::DoesNotExist {
            path: path.to_path_buf(),
        });
    }

    let report = apply(fs, &paths, &layout)?;
    info!(
        path = %path.display(),
        discarded_ephemeral = report.discarded_ephemeral,
        action = ?report.action,
        "recovered"
    );
    Ok(report)
}

fn apply<F: Filesystem + ?Sized>(
    fs: &F,
    paths: &ArtifactPaths,
    layout: &Layout,
) -> Result<RecoveryReport> {
    let discarded_ephemeral = layout.has(Artifact::Ephemeral);
    if discarded_ephemeral {
        warn!(path = %paths.ephemeral().display(), "discarding ephemeral file");
        fs.remove(paths.ephemeral())?;
    }

    let action = if layout.has(Artifact::Ready) {
        let rotated_base = promote_ready(fs, paths)?;
        RecoveryAction::PromotedReady { rotated_base }
    } else if layout.has(Artifact::Base) {
        RecoveryAction::None
    } else if let Some(from) = [Artifact::Backup, Artifact::Tertiary]
        .into_iter()
        .find(|&artifact| layout.has(artifact))
    {
        rename(fs, paths.path(from), paths.base())?;
        RecoveryAction::Restored { from }
    } else {
        RecoveryAction::NothingSurvived
    };

    Ok(RecoveryReport {
        discarded_ephemeral,
        action,
    })
}

/// Commits ready into base, rotating an existing base into backup first.
///
/// Returns whether a base was rotated. The caller must know ready exists.
pub(crate) fn promote_ready<F: Filesystem + ?Sized>(fs: &F, paths: &ArtifactPaths) -> Result<bool> {
    let rotated = fs.exists(paths.base());
    if rotated {
        rename(fs, paths.base(), paths.backup())?;
    }
    rename(fs, paths.ready(), paths.base())?;
    Ok(rotated)
}

fn rename<F: Filesystem + ?Sized>(fs: &F, from: &Path, to: &Path) -> Result<()> {
    debug!(from = %from.display(), to = %to.display(), "renaming");
    fs.rename(from, to)
}
