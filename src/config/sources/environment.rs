//! Environment variable source: PERSIST_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// Uses PERSIST__ prefix and __ as separator for nested keys,
/// e.g. `PERSIST__LOGGING__LEVEL=debug`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("PERSIST")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
