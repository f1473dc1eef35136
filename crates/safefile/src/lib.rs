//! Crash-safe persistence for a single logical file.
//!
//! Every write is staged through side files next to the target and
//! committed by rename, so the file is never observed half-written. If the
//! process dies at any point, the side files that remain are enough to
//! reconstruct the last good version:
//!
//! ```text
//! write:   data -> P.eph -> P.rdy -> P      (old P -> P.bak)
//! recover: drop P.eph; commit P.rdy; else restore P from P.bak, then P.bk2
//! ```
//!
//! All operations are generic over the [`Filesystem`] trait. Use
//! [`OsFilesystem`] for real files or [`MemoryFilesystem`] for tests and
//! crash simulation. A single writer per logical file is assumed; nothing
//! here locks across threads or processes.
//!
//! # Example
//!
//! ```no_run
//! use safefile::{classify, recover, safe_read, safe_write, OsFilesystem, SafetyState};
//!
//! let fs = OsFilesystem::new();
//! if classify(&fs, "settings.json") == SafetyState::Intervene {
//!     // an earlier write was interrupted; a read will refuse until this runs
//!     recover(&fs, "settings.json").unwrap();
//! }
//!
//! safe_write(&fs, "settings.json", b"{\"theme\":\"dark\"}").unwrap();
//! let data = safe_read(&fs, "settings.json").unwrap();
//! ```

pub mod config;
pub mod error;
pub mod fs;
pub mod memory;
pub mod paths;
pub mod read;
pub mod recovery;
pub mod state;
pub mod store;
pub mod write;

pub use config::SafeFileConfig;
pub use error::{Result, SafeFileError};
pub use fs::{Filesystem, OsFilesystem};
pub use memory::{FsOp, MemoryFilesystem};
pub use paths::{Artifact, ArtifactPaths, Layout};
pub use read::{read, safe_read};
pub use recovery::{recover, RecoveryAction, RecoveryReport};
pub use state::{classify, SafetyState};
pub use store::SafeFile;
pub use write::{safe_write, write};
