//! Filesystem primitives the protocol is built on.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::config::SafeFileConfig;
use crate::error::{Result, SafeFileError};

/// The primitive operations the protocol consumes.
///
/// Implementations must make `rename` overwrite an existing destination and
/// treat a completed call as durable. `remove` of a missing path succeeds.
pub trait Filesystem {
    /// Returns true if anything (file or directory) exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Returns true if `path` exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Reads the whole file. Fails if missing or a directory.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Creates or truncates `path` and writes `data` to it.
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Renames `from` onto `to`, replacing `to` if present.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Removes the file at `path` if there is one.
    fn remove(&self, path: &Path) -> Result<()>;
}

impl<T: Filesystem + ?Sized> Filesystem for &T {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        (**self).is_dir(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        (**self).read(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        (**self).write(path, data)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        (**self).rename(from, to)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        (**self).remove(path)
    }
}

/// [`Filesystem`] backed by `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct OsFilesystem {
    config: SafeFileConfig,
}

impl OsFilesystem {
    /// Creates a backend with the default (fully synced) configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend with the given configuration.
    pub fn with_config(config: SafeFileConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &SafeFileConfig {
        &self.config
    }

    #[cfg(unix)]
    fn sync_parent(&self, path: &Path) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::File::open(dir)?.sync_all()
    }

    #[cfg(not(unix))]
    fn sync_parent(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

impl Filesystem for OsFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|source| SafeFileError::ReadError {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let write = || -> io::Result<()> {
            let mut file = fs::File::create(path)?;
            file.write_all(data)?;
            file.flush()?;
            if self.config.sync_data {
                file.sync_all()?;
            }
            Ok(())
        };

        write().map_err(|source| SafeFileError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let rename = || -> io::Result<()> {
            fs::rename(from, to)?;
            if self.config.sync_directory {
                self.sync_parent(to)?;
            }
            Ok(())
        };

        rename().map_err(|source| SafeFileError::RenameError {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
    }

    fn remove(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SafeFileError::RemoveError {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.txt");
        let fs = OsFilesystem::new();

        fs.write(&path, b"hello world").unwrap();

        assert!(fs.exists(&path));
        assert!(!fs.is_dir(&path));
        assert_eq!(fs.read(&path).unwrap(), b"hello world");
    }

    #[test]
    fn test_write_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.txt");
        let fs = OsFilesystem::with_config(SafeFileConfig::unsynced());

        fs.write(&path, b"a much longer first version").unwrap();
        fs.write(&path, b"short").unwrap();

        assert_eq!(fs.read(&path).unwrap(), b"short");
    }

    #[test]
    fn test_rename_overwrites_destination() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("a");
        let to = dir.path().join("b");
        let fs = OsFilesystem::new();

        fs.write(&from, b"new").unwrap();
        fs.write(&to, b"old").unwrap();
        fs.rename(&from, &to).unwrap();

        assert!(!fs.exists(&from));
        assert_eq!(fs.read(&to).unwrap(), b"new");
    }

    #[test]
    fn test_rename_missing_source_fails() {
        let dir = tempdir().unwrap();
        let fs = OsFilesystem::new();

        let result = fs.rename(&dir.path().join("missing"), &dir.path().join("b"));
        assert!(matches!(result, Err(SafeFileError::RenameError { .. })));
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let dir = tempdir().unwrap();
        let fs = OsFilesystem::new();

        fs.remove(&dir.path().join("missing")).unwrap();
    }

    #[test]
    fn test_read_directory_fails() {
        let dir = tempdir().unwrap();
        let fs = OsFilesystem::new();

        assert!(fs.is_dir(dir.path()));
        assert!(matches!(
            fs.read(dir.path()),
            Err(SafeFileError::ReadError { .. })
        ));
    }
}
