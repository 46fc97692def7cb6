//! Command-line argument definitions for the WebIDL CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input files, the cache directory,
//! configuration file and logging verbosity.

use clap::Parser;

/// Command-line arguments for the WebIDL tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// WebIDL files to parse as one corpus, in order
    #[arg(required = true, help = "Paths to the input files")]
    pub files: Vec<String>,

    /// Directory the dependency manifest is written to
    #[arg(long)]
    pub cache_dir: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Print the full error trace with every location on failure
    #[arg(short, long)]
    pub verbose: bool,

    /// Fail on any warning
    #[arg(long)]
    pub deny_warnings: bool,
}
