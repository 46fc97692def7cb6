//! Collector for accumulating diagnostics across a parse session.
//!
//! Errors still abort the pipeline at the point they are found. The
//! collector exists so that warnings raised while parsing several files can
//! be reported together once the session finishes.

use crate::error::{Diagnostic, ParseError};

/// A collector for accumulating diagnostics during a parse session.
///
/// # Example
///
/// ```text
/// let mut collector = DiagnosticCollector::new();
/// collector.emit(Diagnostic::warning("exception declarations are ignored"));
/// let warnings = collector.finish()?;
/// assert_eq!(warnings.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
    deny_warnings: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat every warning emitted from now on as fatal.
    pub fn deny_warnings(mut self, deny: bool) -> Self {
        self.deny_warnings = deny;
        self
    }

    /// Emit a diagnostic to this collector.
    ///
    /// Errors, and warnings while warnings are denied, mark the collector as
    /// failed.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() || self.deny_warnings {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Diagnostics emitted so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns `true` if the collector holds a fatal diagnostic.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Finish collection and return a result.
    ///
    /// - If there are errors, returns `Err(ParseError)` with all diagnostics.
    /// - Otherwise, returns the collected warnings.
    pub fn finish(self) -> Result<Vec<Diagnostic>, ParseError> {
        if self.has_errors {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_collector_new_finish_ok() {
        let collector = DiagnosticCollector::new();
        assert!(collector.finish().unwrap().is_empty());
    }

    #[test]
    fn test_collector_emit_error_finish_err() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::error("test error"));

        assert!(collector.has_errors());
        assert!(collector.finish().is_err());
    }

    #[test]
    fn test_collector_warnings_returned_on_success() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::warning("warning 1").with_code(ErrorCode::E102));
        collector.emit(Diagnostic::warning("warning 2"));

        let warnings = collector.finish().unwrap();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].code(), Some(ErrorCode::E102));
    }

    #[test]
    fn test_collector_deny_warnings() {
        let mut collector = DiagnosticCollector::new().deny_warnings(true);

        collector.emit(Diagnostic::warning("module declarations are ignored"));

        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 1);
    }
}
