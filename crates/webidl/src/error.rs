//! Error types for WebIDL operations.
//!
//! This module provides the main error type [`WebIdlError`] which wraps
//! the failures that can occur while loading and parsing WebIDL sources.

use std::io;

use thiserror::Error;

use webidl_core::location::SourceMap;
use webidl_parser::error::ParseError;

/// The main error type for WebIDL operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the source map its diagnostic locations point
/// into, so the error can be rendered with source excerpts after the parser
/// that produced it is gone.
#[derive(Debug, Error)]
pub enum WebIdlError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, sources: SourceMap },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Manifest error: {0}")]
    Manifest(#[from] toml::ser::Error),
}

impl WebIdlError {
    /// Create a new `Parse` error with the sources its locations refer to.
    pub fn new_parse_error(err: ParseError, sources: SourceMap) -> Self {
        Self::Parse { err, sources }
    }

    /// Render the error the way WebIDL tooling prints it: each diagnostic
    /// followed by the source excerpt of every location it names.
    pub fn render(&self) -> String {
        match self {
            WebIdlError::Parse { err, sources } => err.render(sources),
            other => other.to_string(),
        }
    }
}
