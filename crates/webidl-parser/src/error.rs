//! Error and diagnostic system for the WebIDL parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled locations (offending construct first, then conflicting peers)
//! - Severity levels
//! - Diagnostic collector for accumulating warnings
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, multiple source
//! locations, and help text. Diagnostics are wrapped in [`ParseError`] when
//! returned from the public API.
//!
//! # Example
//!
//! ```
//! # use webidl_parser::error::{Diagnostic, ErrorCode};
//! # use webidl_core::{location::{Location, SourceMap}, span::Span};
//!
//! let mut sources = SourceMap::new();
//! let file = sources.add("a.webidl", "interface A {};\ninterface A {};\n");
//!
//! let diag = Diagnostic::error("Multiple unresolvable definitions of identifier 'A' in scope '::'")
//!     .with_code(ErrorCode::E201)
//!     .with_label(Location::new(file, Span::new(26..27)), "redefined here")
//!     .with_secondary_label(Location::new(file, Span::new(10..11)), "first defined here");
//!
//! assert!(diag.render(&sources).starts_with("error[E201]: Multiple unresolvable"));
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;
pub(crate) use parse_error::Result;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
