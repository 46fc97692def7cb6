//! The core diagnostic type for the WebIDL error system.
//!
//! A [`Diagnostic`] represents a single error or warning with optional
//! error code, multiple labeled source locations, and help text.

use std::fmt;

use webidl_core::location::{Location, SourceMap};

use crate::error::{Severity, error_code::ErrorCode, label::Label};

/// A rich diagnostic message with source location information.
///
/// Diagnostics carry:
/// - A severity level
/// - An optional error code for documentation and searchability
/// - A primary message describing the issue
/// - Labeled locations, the offending construct first
/// - Optional help text with suggestions
///
/// # Example
///
/// ```text
/// error[E601]: Dictionary C has two members with name x, a.webidl line 3:23
/// dictionary C : B { long x; };
///                        ^
/// a.webidl line 1:23
/// dictionary A { long x; };
///                     ^
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use webidl_parser::error::{Diagnostic, ErrorCode};
    /// # use webidl_core::location::Location;
    ///
    /// let diag = Diagnostic::error("Unresolved type 'Foo'")
    ///     .with_code(ErrorCode::E202)
    ///     .with_label(Location::builtin("<builtin>"), "not found")
    ///     .with_help("declare `Foo` or fix the spelling");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// The labeled locations in order.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.labels.iter().map(Label::location)
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, location: Location, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(location, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, location: Location, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(location, message));
        self
    }

    /// Add one secondary label per location, all sharing `message`.
    pub fn with_secondary_labels(
        mut self,
        locations: impl IntoIterator<Item = Location>,
        message: &str,
    ) -> Self {
        self.labels
            .extend(locations.into_iter().map(|loc| Label::secondary(loc, message)));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the diagnostic with every location resolved against `sources`.
    ///
    /// The layout is the header, then `", "` and the rendered locations joined
    /// by newlines when there are any.
    pub fn render(&self, sources: &SourceMap) -> String {
        let locations: Vec<String> = self.locations().map(|loc| loc.render(sources)).collect();
        if locations.is_empty() {
            self.to_string()
        } else {
            format!("{}, {}", self, locations.join("\n"))
        }
    }

    /// Create a new diagnostic with the given severity and message.
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use webidl_core::span::Span;

    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::new(Severity::Error, "test error");

        assert!(diag.severity().is_error());
        assert_eq!(diag.message(), "test error");
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_with_secondary_label() {
        let diag = Diagnostic::error("duplicate definition")
            .with_label(Location::builtin("<builtin>"), "duplicate here")
            .with_secondary_labels(
                [Location::builtin("<a>"), Location::builtin("<b>")],
                "also here",
            );

        assert_eq!(diag.labels().len(), 3);
        assert!(diag.labels()[0].is_primary());
        assert!(diag.labels()[1].is_secondary());
        assert!(diag.labels()[2].is_secondary());
    }

    #[test]
    fn test_diagnostic_display_with_code() {
        let diag = Diagnostic::error("Unresolved type 'Foo'").with_code(ErrorCode::E202);

        assert_eq!(diag.to_string(), "error[E202]: Unresolved type 'Foo'");
    }

    #[test]
    fn test_diagnostic_display_without_code() {
        let diag = Diagnostic::warning("exception declarations are ignored");

        assert_eq!(diag.to_string(), "warning: exception declarations are ignored");
    }

    #[test]
    fn test_render_without_locations() {
        let sources = SourceMap::new();
        let diag = Diagnostic::error("something broke");

        assert_eq!(diag.render(&sources), "error: something broke");
    }

    #[test]
    fn test_render_joins_locations() {
        let mut sources = SourceMap::new();
        let file = sources.add("a.webidl", "enum E { \"a\", \"a\" };");
        let diag = Diagnostic::error("Enum E has multiple identical strings")
            .with_code(ErrorCode::E603)
            .with_label(Location::new(file, Span::new(5..6)), "enum declared here")
            .with_secondary_label(Location::builtin("<builtin>"), "peer");

        assert_eq!(
            diag.render(&sources),
            "error[E603]: Enum E has multiple identical strings, a.webidl line 1:5\n\
             enum E { \"a\", \"a\" };\n     ^\n<builtin>"
        );
    }
}
