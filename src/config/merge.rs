//! Merge policy and service for config composition.

mod merge_policy;
pub mod service;
