//! CLI logic for the WebIDL tool.
//!
//! This module contains the core CLI logic: load the configuration, parse
//! the input files as one corpus and write the dependency manifest.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fmt::Write as _;

use log::info;

use webidl::{DependencyManifest, Definitions, IdlBuilder, WebIdlError};

/// Run the WebIDL CLI application
///
/// Parses every input file, then writes the dependency manifest when a
/// cache directory is configured.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `WebIdlError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing and validation errors
/// - Manifest serialization errors
pub fn run(args: &Args) -> Result<Definitions, WebIdlError> {
    info!(files = args.files.len(); "Processing WebIDL files");

    let app_config = config::load_config(args.config.as_ref())?;
    let app_config = config::apply_overrides(app_config, args);

    let mut builder = IdlBuilder::new(app_config.clone());
    for file in &args.files {
        builder.add_file(file);
    }
    let definitions = builder.build()?;

    if let Some(cache_dir) = app_config.output().cache_dir() {
        let manifest = DependencyManifest::from_definitions(&definitions);
        manifest.write_to(cache_dir)?;
    }

    Ok(definitions)
}

/// One line per definition, `<kind> <name>`, in declaration order.
pub fn summary(definitions: &Definitions) -> String {
    let mut out = String::new();
    for (_, definition) in definitions.iter() {
        let _ = writeln!(out, "{} {}", definition.kind(), definition.name());
    }
    out
}
