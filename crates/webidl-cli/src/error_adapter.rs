//! Error adapter for converting WebIdlError to miette diagnostics.
//!
//! This module provides the bridge between the library's error types and
//! miette's rich diagnostic formatting used in the CLI.
//!
//! # Multi-File Labels
//!
//! miette renders a diagnostic against a single source. Labels in the file
//! of the primary label are drawn as spans; labels pointing into other
//! files are listed in the help text with their line and column.

use std::fmt::{self, Write as _};

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, NamedSource, SourceSpan};

use webidl::{WebIdlError, diagnostics::Diagnostic};
use webidl_core::location::{FileId, Location, SourceMap};

/// Adapter for a single WebIDL diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    /// File of the primary label, when it has one.
    file: Option<FileId>,
    src: Option<NamedSource<String>>,
    help: Option<String>,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(diag: &'a Diagnostic, sources: &SourceMap) -> Self {
        let file = diag.locations().next().and_then(|location| location.file());
        let src = file
            .and_then(|file| sources.get(file))
            .map(|src| NamedSource::new(src.name(), src.text().to_owned()));

        let mut help = diag.help().map(str::to_owned);
        for label in diag.labels() {
            let location = label.location();
            if location.file().is_some() && location.file() == file {
                continue;
            }
            let notes = help.get_or_insert_with(String::new);
            if !notes.is_empty() {
                notes.push('\n');
            }
            let _ = write!(notes, "{}: {}", label.message(), describe(location, sources));
        }

        Self {
            diag,
            file,
            src,
            help,
        }
    }
}

fn describe(location: Location, sources: &SourceMap) -> String {
    let name = location.filename(sources).unwrap_or("<unknown file>");
    match location.resolve(sources) {
        Some((line, col)) => format!("{name} line {line}:{col}"),
        None => name.to_owned(),
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .field("file", &self.file)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(if self.diag.severity().is_error() {
            miette::Severity::Error
        } else {
            miette::Severity::Warning
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.src.as_ref().map(|src| src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        self.src.as_ref()?;
        let file = self.file;
        Some(Box::new(self.diag.labels().iter().filter_map(move |label| {
            let location = label.location();
            if location.file() != file {
                return None;
            }
            let span = location.span()?;
            let span = SourceSpan::new(span.start().into(), span.len());
            let message = Some(label.message().to_string());
            Some(if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            })
        })))
    }
}

/// Adapter for non-diagnostic [`WebIdlError`] variants.
pub struct ErrorAdapter<'a>(pub &'a WebIdlError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            WebIdlError::Io(_) => "webidl::io",
            WebIdlError::Parse { .. } => return None,
            WebIdlError::Config(_) => "webidl::config",
            WebIdlError::Manifest(_) => "webidl::manifest",
        };
        Some(Box::new(code))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A rich diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`WebIdlError`] into a list of reportable errors.
///
/// A parse error yields one [`Reportable`] per diagnostic, the error first
/// and any warnings collected before it after. Other variants yield one.
pub fn to_reportables(err: &WebIdlError) -> Vec<Reportable<'_>> {
    match err {
        WebIdlError::Parse {
            err: parse_err,
            sources,
        } => parse_err
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, sources)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use webidl::diagnostics::{ErrorCode, ParseError};
    use webidl_core::span::Span;

    use super::*;

    fn two_files() -> (SourceMap, FileId, FileId) {
        let mut sources = SourceMap::new();
        let a = sources.add("a.webidl", "interface A {};\n");
        let b = sources.add("b.webidl", "\ndictionary A {};\n");
        (sources, a, b)
    }

    #[test]
    fn test_single_diagnostic() {
        let (sources, a, _) = two_files();
        let diag = Diagnostic::error("test error")
            .with_code(ErrorCode::E201)
            .with_label(Location::new(a, Span::new(10..11)), "here")
            .with_help("try this");
        let err = WebIdlError::new_parse_error(ParseError::from(diag), sources);

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Diagnostic(d) => {
                assert_eq!(d.to_string(), "test error");
                assert_eq!(d.code().unwrap().to_string(), "E201");
                assert_eq!(d.help().unwrap().to_string(), "try this");
            }
            Reportable::Error(_) => panic!("Expected Diagnostic"),
        }
    }

    #[test]
    fn test_labels_in_other_files_move_to_help() {
        let (sources, a, b) = two_files();
        let diag = Diagnostic::error("Name collision")
            .with_label(Location::new(b, Span::new(12..13)), "declared again here")
            .with_secondary_label(Location::new(a, Span::new(10..11)), "first declared here");

        let adapter = DiagnosticAdapter::new(&diag, &sources);
        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].primary());
        assert_eq!(labels[0].offset(), 12);

        let help = adapter.help().unwrap().to_string();
        assert_eq!(help, "first declared here: a.webidl line 1:10");
    }

    #[test]
    fn test_same_file_labels_keep_primary_flag() {
        let (sources, a, _) = two_files();
        let diag = Diagnostic::error("error with labels")
            .with_label(Location::new(a, Span::new(0..9)), "primary")
            .with_secondary_label(Location::new(a, Span::new(10..11)), "secondary");

        let adapter = DiagnosticAdapter::new(&diag, &sources);
        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
        assert!(adapter.help().is_none());
    }

    #[test]
    fn test_builtin_location_has_no_source() {
        let sources = SourceMap::new();
        let diag = Diagnostic::warning("builtin")
            .with_label(Location::builtin("<builtin>"), "somewhere");

        let adapter = DiagnosticAdapter::new(&diag, &sources);
        assert!(adapter.source_code().is_none());
        assert!(adapter.labels().is_none());
        assert_eq!(adapter.severity(), Some(miette::Severity::Warning));
    }

    #[test]
    fn test_non_parse_error() {
        let err = WebIdlError::Config("bad".to_string());

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "Configuration error: bad");
                assert_eq!(e.code().unwrap().to_string(), "webidl::config");
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }
}
