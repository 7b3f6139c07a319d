//! In-process exclusivity for persisted files
//!
//! Tracks which paths are currently being saved or loaded. There should never
//! be two overlapping operations on one path, as there is no way to tell
//! which order they were meant to run in; a second claim is rejected rather
//! than queued.

use crate::error::PersistError;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Registry of paths with an in-flight save or load
///
/// The mutex guards only the membership test and the insert/remove, never
/// the I/O of the operation holding the claim. Clones share the same set of
/// claims.
#[derive(Debug, Clone, Default)]
pub struct FileRegistry {
    active: Arc<Mutex<HashSet<PathBuf>>>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `path` for the duration of one operation
    ///
    /// Fails with `FileInUse` if the path is already claimed. The returned
    /// guard releases the claim when dropped.
    pub fn claim(&self, path: impl AsRef<Path>) -> Result<FileClaim, PersistError> {
        let path = path.as_ref().to_path_buf();
        let mut active = self.active.lock();
        if !active.insert(path.clone()) {
            return Err(PersistError::FileInUse(path));
        }
        debug!(path = %path.display(), "Claimed file");
        Ok(FileClaim {
            path,
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_claimed(&self, path: impl AsRef<Path>) -> bool {
        self.active.lock().contains(path.as_ref())
    }

    /// Number of claims currently held
    pub fn active_count(&self) -> usize {
        self.active.lock().len()
    }
}

/// Exclusive claim on a path, released on drop
#[derive(Debug)]
#[must_use = "the claim is released as soon as it is dropped"]
pub struct FileClaim {
    path: PathBuf,
    active: Arc<Mutex<HashSet<PathBuf>>>,
}

impl FileClaim {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the claim now instead of at end of scope
    pub fn release(self) {}
}

impl Drop for FileClaim {
    fn drop(&mut self) {
        self.active.lock().remove(&self.path);
        debug!(path = %self.path.display(), "Released file");
    }
}
