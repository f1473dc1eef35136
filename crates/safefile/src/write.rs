//! Write pipeline.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;
use crate::fs::Filesystem;
use crate::recovery::promote_ready;
use crate::state::validate;

/// Writes `data` as the new committed version of the logical file.
///
/// The content is staged through the ephemeral and ready artifacts and
/// committed with a single backup rotation. A ready file left behind by an
/// earlier crash is committed first, so a fully staged update is never
/// lost to the write that follows it. Afterwards base holds `data`, backup
/// holds the base it displaced, and neither ephemeral nor ready exists.
///
/// # Errors
/// `InvalidName` for an empty path, `NotAFile` for a directory. A failing
/// filesystem call aborts the write and leaves its artifacts in place for
/// [`recover`](crate::recover).
pub fn safe_write<F: Filesystem + ?Sized>(
    fs: &F,
    path: impl AsRef<Path>,
    data: impl AsRef<[u8]>,
) -> Result<()> {
    let path = path.as_ref();
    let paths = validate(fs, path)?;

    if fs.exists(paths.ready()) {
        warn!(path = %paths.ready().display(), "committing stale ready file before write");
        promote_ready(fs, &paths)?;
    }

    let data = data.as_ref();
    debug!(path = %paths.ephemeral().display(), len = data.len(), "staging");
    fs.write(paths.ephemeral(), data)?;
    fs.rename(paths.ephemeral(), paths.ready())?;

    let rotated = promote_ready(fs, &paths)?;
    debug!(path = %path.display(), rotated_base = rotated, "committed");
    Ok(())
}

/// Writes `data` straight to the base file with no staging or backup.
///
/// # Errors
/// `InvalidName` for an empty path, `NotAFile` for a directory.
pub fn write<F: Filesystem + ?Sized>(
    fs: &F,
    path: impl AsRef<Path>,
    data: impl AsRef<[u8]>,
) -> Result<()> {
    let paths = validate(fs, path.as_ref())?;
    fs.write(paths.base(), data.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SafeFileError;
    use crate::memory::{FsOp, MemoryFilesystem};
    use crate::state::{classify, SafetyState};
    use crate::{recover, safe_read};

    #[test]
    fn test_write_new_file() {
        let fs = MemoryFilesystem::new();

        safe_write(&fs, "sws1.txt", "test").unwrap();

        assert_eq!(
            fs.file_paths(),
            vec![std::path::PathBuf::from("sws1.txt")]
        );
        assert_eq!(fs.contents("sws1.txt").unwrap(), b"test");
    }

    #[test]
    fn test_write_existing_file_keeps_backup() {
        let fs = MemoryFilesystem::new();
        fs.insert_file("f", b"A");

        safe_write(&fs, "f", "B").unwrap();

        assert_eq!(fs.contents("f").unwrap(), b"B");
        assert_eq!(fs.contents("f.bak").unwrap(), b"A");
        assert!(fs.contents("f.eph").is_none());
        assert!(fs.contents("f.rdy").is_none());
    }

    #[test]
    fn test_write_absorbs_stale_ready() {
        let fs = MemoryFilesystem::new();
        fs.insert_file("f", b"base");
        fs.insert_file("f.rdy", b"staged");

        safe_write(&fs, "f", "new").unwrap();

        // staged was committed first, then rotated out by the new write
        assert_eq!(fs.contents("f").unwrap(), b"new");
        assert_eq!(fs.contents("f.bak").unwrap(), b"staged");
        assert!(fs.contents("f.rdy").is_none());
    }

    #[test]
    fn test_write_ready_only() {
        let fs = MemoryFilesystem::new();
        fs.insert_file("f.rdy", b"staged");

        safe_write(&fs, "f", "new").unwrap();

        assert_eq!(fs.contents("f").unwrap(), b"new");
        assert_eq!(fs.contents("f.bak").unwrap(), b"staged");
    }

    #[test]
    fn test_write_overwrites_stale_ephemeral() {
        let fs = MemoryFilesystem::new();
        fs.insert_file("f.eph", b"partial");

        safe_write(&fs, "f", "new").unwrap();

        assert_eq!(fs.contents("f").unwrap(), b"new");
        assert!(fs.contents("f.eph").is_none());
        assert!(fs.contents("f.bak").is_none());
    }

    #[test]
    fn test_write_validation_errors() {
        let fs = MemoryFilesystem::new();
        fs.add_dir("ws2dir");

        assert!(matches!(
            safe_write(&fs, "", "x"),
            Err(SafeFileError::InvalidName)
        ));
        assert!(matches!(
            safe_write(&fs, "ws2dir", "x"),
            Err(SafeFileError::NotAFile { .. })
        ));
        assert_eq!(fs.mutations(), 0);
    }

    #[test]
    fn test_crash_while_staging_is_intervene() {
        let fs = MemoryFilesystem::new();
        fs.insert_file("f", b"A");
        fs.fail_next(FsOp::Rename, "f.eph");

        assert!(safe_write(&fs, "f", "B").is_err());
        assert_eq!(classify(&fs, "f"), SafetyState::Intervene);
        assert!(matches!(
            safe_read(&fs, "f"),
            Err(SafeFileError::DoesNotExist { .. })
        ));

        recover(&fs, "f").unwrap();
        assert_eq!(fs.contents("f").unwrap(), b"A");
    }

    #[test]
    fn test_crash_before_commit_keeps_staged_content() {
        let fs = MemoryFilesystem::new();
        fs.insert_file("f", b"A");
        fs.fail_next(FsOp::Rename, "f.rdy");

        assert!(safe_write(&fs, "f", "B").is_err());
        assert_eq!(classify(&fs, "f"), SafetyState::Recoverable);

        assert_eq!(safe_read(&fs, "f").unwrap(), b"B");
        assert_eq!(fs.contents("f.bak").unwrap(), b"A");
    }

    #[test]
    fn test_plain_write() {
        let fs = MemoryFilesystem::new();
        fs.insert_file("f", b"old");

        write(&fs, "f", "new").unwrap();

        assert_eq!(fs.file_paths(), vec![std::path::PathBuf::from("f")]);
        assert_eq!(fs.contents("f").unwrap(), b"new");
        assert!(matches!(write(&fs, "", "x"), Err(SafeFileError::InvalidName)));
    }
}
