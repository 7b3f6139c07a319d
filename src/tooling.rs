//! Tooling Layer
//!
//! Command-line access to the digest and persistence facilities.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
