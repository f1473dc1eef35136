//! In-memory [`Filesystem`] for tests and crash simulation.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{Result, SafeFileError};
use crate::fs::Filesystem;

/// A mutating filesystem primitive, used to target injected faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    Write,
    Rename,
    Remove,
}

#[derive(Debug, Default)]
struct Inner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    faults: Vec<(FsOp, PathBuf)>,
    mutations: usize,
}

impl Inner {
    /// Consumes a pending fault for `op` on `path`, if one is armed.
    fn take_fault(&mut self, op: FsOp, path: &Path) -> Option<io::Error> {
        let idx = self
            .faults
            .iter()
            .position(|(o, p)| *o == op && p == path)?;
        self.faults.remove(idx);
        Some(io::Error::new(
            io::ErrorKind::Other,
            format!("injected {:?} fault", op),
        ))
    }
}

/// Filesystem held entirely in memory.
///
/// Paths are compared literally. Directories exist only where added with
/// [`add_dir`](Self::add_dir). Every successful write, rename or remove of
/// an existing file bumps [`mutations`](Self::mutations).
#[derive(Debug, Default)]
pub struct MemoryFilesystem {
    inner: Mutex<Inner>,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Places a file directly, bypassing the mutation counter.
    pub fn insert_file(&self, path: impl AsRef<Path>, data: &[u8]) {
        self.lock()
            .files
            .insert(path.as_ref().to_path_buf(), data.to_vec());
    }

    /// Registers a directory.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.lock().dirs.insert(path.as_ref().to_path_buf());
    }

    /// Returns the content of a file, if present.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.lock().files.get(path.as_ref()).cloned()
    }

    /// Lists every file path in sorted order.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.lock().files.keys().cloned().collect()
    }

    /// Number of mutations performed through the [`Filesystem`] trait.
    pub fn mutations(&self) -> usize {
        self.lock().mutations
    }

    /// Makes the next `op` on `path` fail without touching anything.
    ///
    /// For renames `path` is the source.
    pub fn fail_next(&self, op: FsOp, path: impl AsRef<Path>) {
        self.lock().faults.push((op, path.as_ref().to_path_buf()));
    }
}

impl Filesystem for MemoryFilesystem {
    fn exists(&self, path: &Path) -> bool {
        let inner = self.lock();
        inner.files.contains_key(path) || inner.dirs.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.lock().dirs.contains(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let inner = self.lock();
        let kind = if inner.dirs.contains(path) {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        inner
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| SafeFileError::ReadError {
                path: path.to_path_buf(),
                source: io::Error::from(kind),
            })
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let mut inner = self.lock();
        if let Some(source) = inner.take_fault(FsOp::Write, path) {
            return Err(SafeFileError::WriteError {
                path: path.to_path_buf(),
                source,
            });
        }
        if inner.dirs.contains(path) {
            return Err(SafeFileError::WriteError {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::Other),
            });
        }
        inner.files.insert(path.to_path_buf(), data.to_vec());
        inner.mutations += 1;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut inner = self.lock();
        let fault = inner.take_fault(FsOp::Rename, from);
        let result = match fault {
            Some(source) => Err(source),
            None => inner
                .files
                .remove(from)
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound)),
        };

        match result {
            Ok(data) => {
                inner.files.insert(to.to_path_buf(), data);
                inner.mutations += 1;
                Ok(())
            }
            Err(source) => Err(SafeFileError::RenameError {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source,
            }),
        }
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let mut inner = self.lock();
        if let Some(source) = inner.take_fault(FsOp::Remove, path) {
            return Err(SafeFileError::RemoveError {
                path: path.to_path_buf(),
                source,
            });
        }
        if inner.files.remove(path).is_some() {
            inner.mutations += 1;
        }
        Ok(())
    }
}
