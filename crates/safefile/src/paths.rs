//! Artifact naming for a logical file.
//!
//! A logical file `P` is backed by up to five sibling files:
//! ```text
//! P        base       committed, readable version
//! P.eph    ephemeral  content being staged, never trusted
//! P.rdy    ready      fully staged content, one rename from base
//! P.bak    backup     previous generation of base
//! P.bk2    tertiary   reserve generation, only ever consumed
//! ```

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SafeFileError};
use crate::fs::Filesystem;
use crate::state::SafetyState;

/// Suffix of the ephemeral staging artifact.
pub const EPHEMERAL_SUFFIX: &str = "eph";
/// Suffix of the ready-to-commit artifact.
pub const READY_SUFFIX: &str = "rdy";
/// Suffix of the backup generation.
pub const BACKUP_SUFFIX: &str = "bak";
/// Suffix of the tertiary generation.
pub const TERTIARY_SUFFIX: &str = "bk2";

/// One of the five on-disk artifacts of a logical file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    Base,
    Ephemeral,
    Ready,
    Backup,
    Tertiary,
}

impl Artifact {
    /// All artifacts, in the order recovery considers them.
    pub const ALL: [Artifact; 5] = [
        Artifact::Ephemeral,
        Artifact::Ready,
        Artifact::Base,
        Artifact::Backup,
        Artifact::Tertiary,
    ];

    /// Suffix appended to the base path, or `None` for the base itself.
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            Artifact::Base => None,
            Artifact::Ephemeral => Some(EPHEMERAL_SUFFIX),
            Artifact::Ready => Some(READY_SUFFIX),
            Artifact::Backup => Some(BACKUP_SUFFIX),
            Artifact::Tertiary => Some(TERTIARY_SUFFIX),
        }
    }

    /// Returns the lowercase name of this artifact.
    pub fn as_str(self) -> &'static str {
        match self {
            Artifact::Base => "base",
            Artifact::Ephemeral => "ephemeral",
            Artifact::Ready => "ready",
            Artifact::Backup => "backup",
            Artifact::Tertiary => "tertiary",
        }
    }

    fn index(self) -> usize {
        match self {
            Artifact::Ephemeral => 0,
            Artifact::Ready => 1,
            Artifact::Base => 2,
            Artifact::Backup => 3,
            Artifact::Tertiary => 4,
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five derived paths of a logical file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    paths: [PathBuf; 5],
}

impl ArtifactPaths {
    /// Derives the artifact paths for `base`.
    ///
    /// Suffixes are appended to the whole path, so `state.json` yields
    /// `state.json.rdy` rather than `state.rdy`.
    ///
    /// # Errors
    /// Returns `InvalidName` if `base` is empty.
    pub fn new(base: impl AsRef<Path>) -> Result<Self> {
        let base = base.as_ref();
        if base.as_os_str().is_empty() {
            return Err(SafeFileError::InvalidName);
        }

        let paths = Artifact::ALL.map(|artifact| match artifact.suffix() {
            None => base.to_path_buf(),
            Some(suffix) => with_suffix(base, suffix),
        });

        Ok(Self { paths })
    }

    /// Returns the path of one artifact.
    pub fn path(&self, artifact: Artifact) -> &Path {
        &self.paths[artifact.index()]
    }

    pub fn base(&self) -> &Path {
        self.path(Artifact::Base)
    }

    pub fn ephemeral(&self) -> &Path {
        self.path(Artifact::Ephemeral)
    }

    pub fn ready(&self) -> &Path {
        self.path(Artifact::Ready)
    }

    pub fn backup(&self) -> &Path {
        self.path(Artifact::Backup)
    }

    pub fn tertiary(&self) -> &Path {
        self.path(Artifact::Tertiary)
    }

    /// Iterates over every artifact with its path.
    pub fn iter(&self) -> impl Iterator<Item = (Artifact, &Path)> + '_ {
        Artifact::ALL
            .into_iter()
            .map(move |artifact| (artifact, self.path(artifact)))
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Which artifacts of a logical file exist at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Layout {
    present: [bool; 5],
}

impl Layout {
    /// Probes every artifact path with `exists`. Never mutates anything.
    pub fn scan<F: Filesystem + ?Sized>(fs: &F, paths: &ArtifactPaths) -> Self {
        let mut layout = Self::default();
        for (artifact, path) in paths.iter() {
            layout.present[artifact.index()] = fs.exists(path);
        }
        layout
    }

    /// Returns whether `artifact` was present.
    pub fn has(&self, artifact: Artifact) -> bool {
        self.present[artifact.index()]
    }

    /// Returns true if none of the five artifacts exist.
    pub fn is_empty(&self) -> bool {
        !self.present.iter().any(|&p| p)
    }

    /// Lists the present artifacts in recovery order.
    pub fn present(&self) -> Vec<Artifact> {
        Artifact::ALL
            .into_iter()
            .filter(|&artifact| self.has(artifact))
            .collect()
    }

    /// Safety state implied by this layout.
    ///
    /// An ephemeral artifact always wins: a write may have been cut short,
    /// whatever else survived.
    pub fn safety_state(&self) -> SafetyState {
        if self.is_empty() {
            SafetyState::DoesNotExist
        } else if self.has(Artifact::Ephemeral) {
            SafetyState::Intervene
        } else if self.has(Artifact::Ready)
            || self.has(Artifact::Backup)
            || self.has(Artifact::Tertiary)
        {
            SafetyState::Recoverable
        } else {
            SafetyState::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryFilesystem;

    #[test]
    fn test_paths_append_suffix_to_full_name() {
        let paths = ArtifactPaths::new("/data/state.json").unwrap();

        assert_eq!(paths.base(), Path::new("/data/state.json"));
        assert_eq!(paths.ephemeral(), Path::new("/data/state.json.eph"));
        assert_eq!(paths.ready(), Path::new("/data/state.json.rdy"));
        assert_eq!(paths.backup(), Path::new("/data/state.json.bak"));
        assert_eq!(paths.tertiary(), Path::new("/data/state.json.bk2"));
    }

    #[test]
    fn test_paths_reject_empty_name() {
        let result = ArtifactPaths::new("");
        assert!(matches!(result, Err(SafeFileError::InvalidName)));
    }

    #[test]
    fn test_iter_covers_every_artifact_once() {
        let paths = ArtifactPaths::new("f").unwrap();
        let listed: Vec<_> = paths.iter().map(|(a, _)| a).collect();

        assert_eq!(listed, Artifact::ALL.to_vec());
    }

    #[test]
    fn test_layout_states() {
        let paths = ArtifactPaths::new("f").unwrap();
        let fs = MemoryFilesystem::new();
        assert_eq!(
            Layout::scan(&fs, &paths).safety_state(),
            SafetyState::DoesNotExist
        );

        fs.insert_file("f", b"base");
        assert_eq!(Layout::scan(&fs, &paths).safety_state(), SafetyState::Normal);

        fs.insert_file("f.bk2", b"old");
        assert_eq!(
            Layout::scan(&fs, &paths).safety_state(),
            SafetyState::Recoverable
        );

        fs.insert_file("f.eph", b"partial");
        let layout = Layout::scan(&fs, &paths);
        assert_eq!(layout.safety_state(), SafetyState::Intervene);
        assert_eq!(
            layout.present(),
            vec![Artifact::Ephemeral, Artifact::Base, Artifact::Tertiary]
        );
    }
}
