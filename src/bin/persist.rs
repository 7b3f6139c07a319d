//! Persist CLI Binary
//!
//! Command-line interface for content digests and persisted files.

use clap::Parser;
use persist::logging::init_logging;
use persist::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => persist::config::ConfigLoader::load_from_file(path),
        None => persist::config::ConfigLoader::load(),
    }
    .unwrap_or_else(|e| {
        eprintln!("Error loading configuration: {}", e);
        process::exit(1);
    });
    cli.apply_logging_overrides(&mut config);

    if let Err(e) = init_logging(Some(&config.logging)) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let context = CliContext::with_config(config);
    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
