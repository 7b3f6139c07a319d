//! Persist: Content Digests and Versioned File Persistence
//!
//! BLAKE2b-256 content digests with strict hex/JSON encodings, and atomic,
//! header/version-checked file persistence guarded against concurrent use of
//! the same file within one process.

pub mod config;
pub mod error;
pub mod hash;
pub mod logging;
pub mod persist;
pub mod tooling;

pub use error::{ApiError, HashError, PersistError};
pub use hash::{hash_bytes, Hash, HASH_SIZE};
pub use persist::{FileClaim, FileRegistry, Metadata, Persister};
