//! MergeService: orchestrates sources, applies merge policy, deserializes to PersistConfig.

use crate::config::sources::{environment, file};
use crate::config::PersistConfig;
use config::ConfigError;
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from an optional file and the environment.
    /// Precedence: defaults (lowest) -> file -> environment (highest).
    pub fn load(config_file: Option<&Path>) -> Result<PersistConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = match config_file {
            Some(path) => file::add_to_builder(builder, path, false)?,
            None => builder,
        };
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load config from a file that must exist, with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<PersistConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = file::add_to_builder(builder, path, true)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
