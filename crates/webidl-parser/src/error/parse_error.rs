//! The ParseError type for wrapping parsing diagnostics.
//!
//! [`ParseError`] wraps the diagnostics that stopped a parse session.

use thiserror::Error;
use webidl_core::location::SourceMap;

use crate::error::Diagnostic;

/// A type alias for `Result<T, Diagnostic>`.
pub type Result<T> = std::result::Result<T, Diagnostic>;

/// Error type for the parse lifecycle.
///
/// Wraps one or more diagnostics. The first one is the fatal error; any
/// others are warnings collected before it.
#[derive(Debug, Error)]
#[error("{}", summarize(.diagnostics))]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    /// Create a new parse error from diagnostics.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all diagnostics in this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The first fatal diagnostic, falling back to the first diagnostic.
    pub fn primary(&self) -> Option<&Diagnostic> {
        self.diagnostics
            .iter()
            .find(|d| d.severity().is_error())
            .or_else(|| self.diagnostics.first())
    }

    /// Render every diagnostic against `sources`, separated by blank lines.
    pub fn render(&self, sources: &SourceMap) -> String {
        self.diagnostics
            .iter()
            .map(|d| d.render(sources))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// The first error, or the first diagnostic, followed by a count of the rest.
fn summarize(diagnostics: &[Diagnostic]) -> String {
    let primary = diagnostics
        .iter()
        .find(|d| d.severity().is_error())
        .or_else(|| diagnostics.first());
    match primary {
        Some(first) if diagnostics.len() > 1 => {
            format!("{} (+{} more)", first, diagnostics.len() - 1)
        }
        Some(first) => first.to_string(),
        None => String::new(),
    }
}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}
