//! Error types for digest decoding, persistence, and the tooling layer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while decoding an encoded hash
#[derive(Debug, Error)]
pub enum HashError {
    /// The encoded token is not exactly 64 hex characters plus its two delimiters
    #[error("encoded value has the wrong length to be a hash")]
    WrongLength,

    #[error("could not unmarshal hash: {0}")]
    Decode(#[from] hex::FromHexError),
}

/// Errors raised by save and load operations
#[derive(Debug, Error)]
pub enum PersistError {
    /// The file opened is not the file that was expected
    #[error("wrong header")]
    BadHeader,

    /// The version of the file is not compatible with the current codebase
    #[error("incompatible version")]
    BadVersion,

    /// The stored checksum does not match the payload
    #[error("checksum mismatch")]
    BadChecksum,

    /// Another save or load on the same path is still in flight
    #[error("file {} is already in use by another save or load", .0.display())]
    FileInUse(PathBuf),

    #[error("malformed persist file {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Hash(#[from] HashError),
}

impl PersistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PersistError::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by configuration, logging and the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl From<HashError> for ApiError {
    fn from(err: HashError) -> Self {
        ApiError::Persist(PersistError::Hash(err))
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
