//! Atomic file replacement and restricted file/directory creation.

use super::{DEFAULT_DIR_PERMISSIONS, DEFAULT_FILE_PERMISSIONS, TEMP_SUFFIX};
use crate::error::PersistError;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Sibling path used as the staging area for `path`
///
/// The suffix is appended to the full file name: `state.json` stages through
/// `state.json_temp`.
pub fn staging_path(path: &Path) -> PathBuf {
    let mut staged: OsString = path.as_os_str().to_os_string();
    staged.push(TEMP_SUFFIX);
    PathBuf::from(staged)
}

/// Create `dir` and any missing parents, owner access only
pub fn create_dir_all_restricted(dir: &Path) -> Result<(), PersistError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DEFAULT_DIR_PERMISSIONS);
    }
    builder
        .create(dir)
        .map_err(|e| PersistError::io(dir, e))
}

fn create_restricted_file(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(DEFAULT_FILE_PERMISSIONS);
    }
    options.open(path)
}

/// Replace `path` with `data` without readers ever observing a partial file
///
/// The full contents are written and synced to the staging path, then renamed
/// over the target. If anything fails before the rename the target is left
/// untouched and the partial staging file is removed. Once the rename has
/// happened the save is reported as successful; a failed directory fsync
/// after that point is only logged.
pub fn write_atomic(path: &Path, data: &[u8], sync_dir: bool) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            create_dir_all_restricted(parent)?;
        }
    }

    let staged = staging_path(path);
    let write_result = (|| -> std::io::Result<()> {
        let mut file = create_restricted_file(&staged)?;
        file.write_all(data)?;
        file.sync_all()
    })();

    if let Err(e) = write_result {
        let _ = fs::remove_file(&staged);
        return Err(PersistError::io(&staged, e));
    }

    fs::rename(&staged, path).map_err(|e| {
        let _ = fs::remove_file(&staged);
        PersistError::io(path, e)
    })?;

    if sync_dir {
        sync_parent_after_replace(path);
    }

    debug!(path = %path.display(), bytes = data.len(), "Replaced file atomically");
    Ok(())
}

/// Fsync the directory holding `path`, returning whether it succeeded
fn sync_parent_after_replace(path: &Path) -> bool {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => return true,
    };
    match sync_directory(parent) {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Directory sync failed after replace");
            false
        }
    }
}

#[cfg(unix)]
fn sync_directory(dir: &Path) -> Result<(), PersistError> {
    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| PersistError::io(dir, e))
}

#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> Result<(), PersistError> {
    Ok(())
}

/// Remove a staging file orphaned by an interrupted save
///
/// Returns `true` if a stale file was found and removed.
pub fn remove_stale_staging(path: &Path) -> Result<bool, PersistError> {
    let staged = staging_path(path);
    match fs::remove_file(&staged) {
        Ok(()) => {
            warn!(path = %staged.display(), "Removed stale staging file");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(PersistError::io(staged, e)),
    }
}
