//! Configuration
//!
//! Layered configuration for the persister and logging. Sources, lowest to
//! highest precedence: built-in defaults, a TOML file, `PERSIST__*`
//! environment variables.

mod facade;
pub mod merge;
pub mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Persister configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistConfig {
    /// Fsync the parent directory after the staging file is renamed into place
    #[serde(default = "default_true")]
    pub sync_parent_dir: bool,

    /// Compare stored checksums against the payload on load
    #[serde(default = "default_true")]
    pub verify_checksum: bool,

    /// Remove an orphaned staging file before each save
    #[serde(default = "default_true")]
    pub clean_stale_staging: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            sync_parent_dir: true,
            verify_checksum: true,
            clean_stale_staging: true,
            logging: LoggingConfig::default(),
        }
    }
}
