// Local presence checks against the flat download directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::DOWNLOAD_SUBDIR;

/// Answers "is this file already cached?" for `<download_root>/tests/<name>`.
///
/// Files are keyed by name only, so same-named files from different remote
/// directories share one slot. Nothing is cached: every query stats the disk.
pub struct PresenceStore {
    dir: PathBuf,
    revision: AtomicU64,
}

impl PresenceStore {
    pub fn new(download_root: &Path) -> Self {
        Self {
            dir: download_root.join(DOWNLOAD_SUBDIR),
            revision: AtomicU64::new(0),
        }
    }

    /// Directory holding cached files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Local path a file with this name is stored at.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub async fn exists(&self, file_name: &str) -> bool {
        if file_name.is_empty() {
            return false;
        }
        tokio::fs::try_exists(self.path_for(file_name))
            .await
            .unwrap_or(false)
    }

    /// Blocking variant for callers on a render path.
    pub fn exists_sync(&self, file_name: &str) -> bool {
        !file_name.is_empty() && self.path_for(file_name).exists()
    }

    /// Counter bumped after every successful download; renderers re-derive
    /// presence when it changes.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    pub fn bump_revision(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::AcqRel) + 1
    }
}
