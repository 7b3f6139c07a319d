//! Integration tests for digests and versioned file persistence

mod blake2_verification;
mod concurrent_access;
mod persist_roundtrip;
