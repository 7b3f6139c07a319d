//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::PersistConfig;
use config::ConfigError;
use std::path::{Path, PathBuf};

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Default config file location (`<config dir>/persist/config.toml`)
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "persist", "persist")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default file (if present) and environment.
    pub fn load() -> Result<PersistConfig, ConfigError> {
        MergeService::load(Self::default_config_path().as_deref())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<PersistConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> PersistConfig {
        PersistConfig::default()
    }
}
