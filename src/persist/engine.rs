//! Persister: save and load of versioned, checksummed files
//!
//! File layout, one compact JSON value per line for the wrapper:
//!
//! ```text
//! "<header>"
//! "<version>"
//! "<checksum hex>"   or "manual"
//! <payload>
//! ```
//!
//! The checksum is the [`Hash`] of the payload bytes.

use super::atomic::{remove_stale_staging, write_atomic};
use super::registry::FileRegistry;
use super::{verify_header, verify_version, Metadata, MANUAL_CHECKSUM};
use crate::config::PersistConfig;
use crate::error::PersistError;
use crate::hash::{hash_bytes, Hash};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Checksum line of a persisted file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checksum {
    Hash(Hash),
    /// Verification disabled, typically because the file was edited by hand
    Manual,
}

/// Wrapper and payload of a persisted file
struct Envelope<'a> {
    metadata: Metadata,
    checksum: Checksum,
    payload: &'a [u8],
}

/// Result of [`Persister::inspect`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub metadata: Metadata,
    pub checksum: Checksum,
    /// `None` for manual checksums, otherwise whether the payload matches
    pub checksum_matches: Option<bool>,
}

/// Saves and loads persisted files on behalf of one application
///
/// Owns the registry of in-flight paths; clones share it, separate instances
/// do not.
#[derive(Debug, Clone, Default)]
pub struct Persister {
    registry: FileRegistry,
    config: PersistConfig,
}

impl Persister {
    pub fn new(config: PersistConfig) -> Self {
        Self {
            registry: FileRegistry::new(),
            config,
        }
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    pub fn config(&self) -> &PersistConfig {
        &self.config
    }

    /// Atomically write `data` to `path` behind the metadata and checksum lines
    pub fn save_bytes(
        &self,
        meta: &Metadata,
        data: &[u8],
        path: impl AsRef<Path>,
    ) -> Result<(), PersistError> {
        let path = path.as_ref();
        let _claim = self.registry.claim(path)?;

        if self.config.clean_stale_staging {
            remove_stale_staging(path)?;
        }

        let encoded = encode_envelope(meta, data)?;
        write_atomic(path, &encoded, self.config.sync_parent_dir)?;
        debug!(
            path = %path.display(),
            header = %meta.header,
            version = %meta.version,
            payload_bytes = data.len(),
            "Saved persist file"
        );
        Ok(())
    }

    /// Read `path`, validate it against `expected`, and return the payload
    pub fn load_bytes(
        &self,
        expected: &Metadata,
        path: impl AsRef<Path>,
    ) -> Result<Vec<u8>, PersistError> {
        let path = path.as_ref();
        let _claim = self.registry.claim(path)?;

        let bytes = fs::read(path).map_err(|e| PersistError::io(path, e))?;
        let envelope = decode_envelope(path, &bytes, Some(expected))?;

        match envelope.checksum {
            Checksum::Manual => {
                warn!(path = %path.display(), "Checksum verification skipped for manual file");
            }
            Checksum::Hash(stored) if self.config.verify_checksum => {
                if hash_bytes(envelope.payload) != stored {
                    return Err(PersistError::BadChecksum);
                }
            }
            Checksum::Hash(_) => {}
        }

        debug!(path = %path.display(), payload_bytes = envelope.payload.len(), "Loaded persist file");
        Ok(envelope.payload.to_vec())
    }

    /// Serialize `object` as pretty JSON and save it
    pub fn save_json<T: Serialize + ?Sized>(
        &self,
        meta: &Metadata,
        object: &T,
        path: impl AsRef<Path>,
    ) -> Result<(), PersistError> {
        let data = serde_json::to_vec_pretty(object)?;
        self.save_bytes(meta, &data, path)
    }

    /// Load a file saved by [`Persister::save_json`]
    pub fn load_json<T: DeserializeOwned>(
        &self,
        expected: &Metadata,
        path: impl AsRef<Path>,
    ) -> Result<T, PersistError> {
        let data = self.load_bytes(expected, path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Read the metadata and checksum of `path` without any expectations
    pub fn read_metadata(&self, path: impl AsRef<Path>) -> Result<(Metadata, Checksum), PersistError> {
        let inspection = self.inspect(path)?;
        Ok((inspection.metadata, inspection.checksum))
    }

    /// Read the wrapper of `path` and check the payload against its checksum
    ///
    /// The comparison runs even when `verify_checksum` is off in the config.
    pub fn inspect(&self, path: impl AsRef<Path>) -> Result<Inspection, PersistError> {
        let path = path.as_ref();
        let _claim = self.registry.claim(path)?;

        let bytes = fs::read(path).map_err(|e| PersistError::io(path, e))?;
        let envelope = decode_envelope(path, &bytes, None)?;
        let checksum_matches = match envelope.checksum {
            Checksum::Manual => None,
            Checksum::Hash(stored) => Some(hash_bytes(envelope.payload) == stored),
        };
        Ok(Inspection {
            metadata: envelope.metadata,
            checksum: envelope.checksum,
            checksum_matches,
        })
    }
}

fn encode_envelope(meta: &Metadata, data: &[u8]) -> Result<Vec<u8>, PersistError> {
    let mut buf = Vec::with_capacity(data.len() + 128);
    serde_json::to_writer(&mut buf, &meta.header)?;
    buf.push(b'\n');
    serde_json::to_writer(&mut buf, &meta.version)?;
    buf.push(b'\n');
    buf.extend_from_slice(hash_bytes(data).to_json().as_bytes());
    buf.push(b'\n');
    buf.extend_from_slice(data);
    Ok(buf)
}

/// Split the next `\n`-terminated wrapper line off `rest`
fn next_line<'a>(path: &Path, rest: &mut &'a [u8], n: usize) -> Result<&'a [u8], PersistError> {
    let end = rest
        .iter()
        .position(|b| *b == b'\n')
        .ok_or_else(|| PersistError::corrupt(path, format!("missing wrapper line {}", n)))?;
    let line = &rest[..end];
    *rest = &rest[end + 1..];
    Ok(line)
}

/// Decode the wrapper line by line, checking each field against `expected`
/// as soon as it is read so a foreign file reports `BadHeader` before
/// anything past its header is parsed.
fn decode_envelope<'a>(
    path: &Path,
    bytes: &'a [u8],
    expected: Option<&Metadata>,
) -> Result<Envelope<'a>, PersistError> {
    let mut rest = bytes;

    let header: String = serde_json::from_slice(next_line(path, &mut rest, 1)?)
        .map_err(|e| PersistError::corrupt(path, format!("unreadable header: {}", e)))?;
    if let Some(expected) = expected {
        verify_header(&header, &expected.header)?;
    }

    let version: String = serde_json::from_slice(next_line(path, &mut rest, 2)?)
        .map_err(|e| PersistError::corrupt(path, format!("unreadable version: {}", e)))?;
    if let Some(expected) = expected {
        verify_version(&version, &expected.version)?;
    }

    let raw_checksum = next_line(path, &mut rest, 3)?;
    let checksum = if raw_checksum == format!("\"{}\"", MANUAL_CHECKSUM).as_bytes() {
        Checksum::Manual
    } else {
        Checksum::Hash(Hash::from_json(raw_checksum)?)
    };

    Ok(Envelope {
        metadata: Metadata { header, version },
        checksum,
        payload: rest,
    })
}
