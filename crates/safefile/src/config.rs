//! Durability configuration for the OS filesystem backend.

/// Configuration for [`OsFilesystem`](crate::OsFilesystem).
///
/// The protocol itself (artifact suffixes, two auxiliary generations) is
/// fixed; only how hard the backend pushes each step to stable storage is
/// tunable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeFileConfig {
    /// Call `sync_all` on every artifact after writing it.
    pub sync_data: bool,
    /// Fsync the parent directory after every rename (Unix only).
    pub sync_directory: bool,
}

impl Default for SafeFileConfig {
    fn default() -> Self {
        Self {
            sync_data: true,
            sync_directory: true,
        }
    }
}

impl SafeFileConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config that skips every fsync.
    ///
    /// Renames stay atomic but a power loss may lose the latest commit.
    pub fn unsynced() -> Self {
        Self {
            sync_data: false,
            sync_directory: false,
        }
    }

    /// Sets whether written artifacts are synced.
    pub fn with_sync_data(mut self, sync: bool) -> Self {
        self.sync_data = sync;
        self
    }

    /// Sets whether the parent directory is synced after renames.
    pub fn with_sync_directory(mut self, sync: bool) -> Self {
        self.sync_directory = sync;
        self
    }
}
