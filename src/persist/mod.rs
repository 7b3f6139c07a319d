//! Versioned File Persistence
//!
//! Every persisted file carries a [`Metadata`] header and version that are
//! validated on load. Writes go through a staging file that is atomically
//! renamed over the target, and a [`FileRegistry`] guards against two
//! in-process operations touching the same path at once.

pub mod atomic;
pub mod engine;
pub mod registry;

pub use atomic::{
    create_dir_all_restricted, remove_stale_staging, staging_path, write_atomic,
};
pub use engine::{Checksum, Inspection, Persister};
pub use registry::{FileClaim, FileRegistry};

use crate::error::PersistError;
use serde::{Deserialize, Serialize};

/// Permissions used when creating directories
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;

/// Permissions used when creating files
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o600;

/// Suffix applied to the staging version of a file being persisted
pub const TEMP_SUFFIX: &str = "_temp";

/// Checksum token that disables checksum verification for hand-edited files
pub const MANUAL_CHECKSUM: &str = "manual";

/// Header and version of the data being stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub header: String,
    pub version: String,
}

impl Metadata {
    pub fn new(header: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            version: version.into(),
        }
    }

    /// Check this (stored) metadata against what the caller expects.
    ///
    /// Header is checked before version so a foreign file reports
    /// `BadHeader` even when its version also differs.
    pub fn verify(&self, expected: &Metadata) -> Result<(), PersistError> {
        verify_header(&self.header, &expected.header)?;
        verify_version(&self.version, &expected.version)
    }
}

/// Fails with `BadHeader` when the stored header differs from the expected one
pub fn verify_header(got: &str, expected: &str) -> Result<(), PersistError> {
    if got != expected {
        return Err(PersistError::BadHeader);
    }
    Ok(())
}

/// Fails with `BadVersion` when the stored version differs from the expected one
pub fn verify_version(got: &str, expected: &str) -> Result<(), PersistError> {
    if got != expected {
        return Err(PersistError::BadVersion);
    }
    Ok(())
}
