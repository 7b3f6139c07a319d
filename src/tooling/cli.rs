//! CLI Tooling
//!
//! Command-line access to digests and persisted files: hash arbitrary files,
//! inspect or verify a persisted file's wrapper, clean up orphaned staging
//! files.

use crate::config::PersistConfig;
use crate::error::{ApiError, PersistError};
use crate::hash::hash_bytes;
use crate::logging::{LogFormat, LogOutput};
use crate::persist::{remove_stale_staging, staging_path, Checksum, Metadata, Persister};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

/// Persist CLI - content digests and versioned file persistence
#[derive(Parser)]
#[command(name = "persist")]
#[command(about = "Content digests and guarded atomic file persistence")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<LogOutput>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the BLAKE2b-256 digest of a file's bytes
    Hash {
        file: PathBuf,
        /// Print the quoted JSON form instead of bare hex
        #[arg(long)]
        json: bool,
    },
    /// Show header, version and checksum state of a persisted file
    Inspect { file: PathBuf },
    /// Load a persisted file, failing unless header and version match
    Verify {
        file: PathBuf,
        #[arg(long)]
        header: String,
        #[arg(long)]
        version: String,
    },
    /// Remove a staging file orphaned by an interrupted save
    Clean { file: PathBuf },
}

impl Cli {
    /// Fold the logging flags into a loaded configuration
    pub fn apply_logging_overrides(&self, config: &mut PersistConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(output) = self.log_output {
            config.logging.output = output;
        }
    }
}

/// CLI execution context
pub struct CliContext {
    persister: Persister,
}

impl CliContext {
    pub fn with_config(config: PersistConfig) -> Self {
        Self {
            persister: Persister::new(config),
        }
    }

    /// Execute a command and return its printable output
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Hash { file, json } => self.handle_hash(file, *json),
            Commands::Inspect { file } => self.handle_inspect(file),
            Commands::Verify {
                file,
                header,
                version,
            } => self.handle_verify(file, header, version),
            Commands::Clean { file } => self.handle_clean(file),
        }
    }

    fn handle_hash(&self, file: &Path, json: bool) -> Result<String, ApiError> {
        let data = std::fs::read(file).map_err(|e| PersistError::io(file, e))?;
        let digest = hash_bytes(&data);
        Ok(if json { digest.to_json() } else { digest.to_hex() })
    }

    fn handle_inspect(&self, file: &Path) -> Result<String, ApiError> {
        let inspection = self.persister.inspect(file)?;
        let meta = inspection.metadata;
        let checksum_text = match inspection.checksum {
            Checksum::Manual => "manual".to_string(),
            Checksum::Hash(h) => h.to_hex(),
        };
        let integrity = match inspection.checksum_matches {
            None => "skipped",
            Some(true) => "ok",
            Some(false) => "mismatch",
        };

        let mut lines = vec![
            format!("header:    {}", meta.header),
            format!("version:   {}", meta.version),
            format!("checksum:  {}", checksum_text),
            format!("integrity: {}", integrity),
        ];
        if staging_path(file).exists() {
            lines.push(format!(
                "warning:   stale staging file {}",
                staging_path(file).display()
            ));
        }
        Ok(lines.join("\n"))
    }

    fn handle_verify(&self, file: &Path, header: &str, version: &str) -> Result<String, ApiError> {
        let expected = Metadata::new(header, version);
        let payload = self.persister.load_bytes(&expected, file)?;
        info!(path = %file.display(), header, version, "Verified persist file");
        Ok(format!(
            "{}: ok ({} {}, {} payload bytes)",
            file.display(),
            header,
            version,
            payload.len()
        ))
    }

    fn handle_clean(&self, file: &Path) -> Result<String, ApiError> {
        let staged = staging_path(file);
        if remove_stale_staging(file)? {
            Ok(format!("Removed {}", staged.display()))
        } else {
            Ok(format!("No staging file at {}", staged.display()))
        }
    }
}
