//! Content digests
//!
//! A [`Hash`] is a BLAKE2b 256-bit digest. It renders as 64 lowercase hex
//! characters and travels through JSON as a quoted hex string.

use crate::error::HashError;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of a Hash in bytes
pub const HASH_SIZE: usize = 32;

/// Length of the JSON encoding: two hex characters per byte plus the two quotes
const JSON_ENCODED_LEN: usize = HASH_SIZE * 2 + 2;

type Blake2b256 = Blake2b<U32>;

/// BLAKE2b 256-bit digest
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash([u8; HASH_SIZE]);

/// Hash a byte slice
pub fn hash_bytes(data: &[u8]) -> Hash {
    let digest = Blake2b256::digest(data);
    let mut bytes = [0u8; HASH_SIZE];
    bytes.copy_from_slice(&digest);
    Hash(bytes)
}

impl Hash {
    pub const fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Lowercase hex rendering, always 64 characters
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// JSON string encoding of the hash, quotes included
    pub fn to_json(&self) -> String {
        format!("\"{}\"", self.to_hex())
    }

    /// Decode a raw JSON token produced by [`Hash::to_json`].
    ///
    /// Only the total length is checked before the first and last bytes are
    /// dropped; they are not required to be quote characters.
    pub fn from_json(raw: &[u8]) -> Result<Self, HashError> {
        if raw.len() != JSON_ENCODED_LEN {
            return Err(HashError::WrongLength);
        }
        let decoded = hex::decode(&raw[1..raw.len() - 1])?;
        let mut bytes = [0u8; HASH_SIZE];
        bytes.copy_from_slice(&decoded);
        Ok(Hash(bytes))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl FromStr for Hash {
    type Err = HashError;

    /// Parse the bare 64-character hex form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HASH_SIZE * 2 {
            return Err(HashError::WrongLength);
        }
        let mut bytes = [0u8; HASH_SIZE];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Hash(bytes))
    }
}

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(<D::Error as serde::de::Error>::custom)
    }
}
