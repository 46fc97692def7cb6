//! WebIDL - parsing and semantic analysis of WebIDL for binding generators.
//!
//! Sources are parsed into a resolved, validated model: partial interfaces
//! merged, implements statements applied, maplike and setlike declarations
//! expanded and overloads checked for distinguishability.

pub mod config;

mod error;
mod manifest;

pub use webidl_core::{identifier, location};
pub use webidl_parser::{Definition, Definitions, model};

pub use error::WebIdlError;
pub use manifest::{DependencyManifest, MANIFEST_FILE};

/// Diagnostics produced by the parser.
pub mod diagnostics {
    pub use webidl_parser::error::{Diagnostic, ErrorCode, Label, ParseError, Severity};
}

use std::{borrow::Cow, fs, path::PathBuf};

use log::{debug, info};

use webidl_core::location::SourceMap;
use webidl_parser::Parser;

use config::AppConfig;

#[derive(Debug, Clone)]
enum Source {
    Text { name: String, text: String },
    File(PathBuf),
}

/// Builder that collects WebIDL sources and parses them as one corpus.
///
/// Definitions may refer to names declared in any other source, in any
/// order.
///
/// # Examples
///
/// ```rust
/// use webidl::{IdlBuilder, config::AppConfig};
///
/// let mut builder = IdlBuilder::new(AppConfig::default());
/// builder
///     .add_source("window.webidl", "[PrimaryGlobal] interface Window : EventTarget {};")
///     .add_source("event.webidl", "interface EventTarget {};");
///
/// let definitions = builder.build().expect("Failed to parse");
/// assert_eq!(definitions.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct IdlBuilder {
    config: AppConfig,
    sources: Vec<Source>,
}

impl IdlBuilder {
    /// Create a new builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration, of which the parser section
    ///   applies here
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            sources: Vec::new(),
        }
    }

    /// Queue in-memory source text under `name`, the file name diagnostics
    /// and dependency sets report.
    pub fn add_source(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.sources.push(Source::Text {
            name: name.into(),
            text: text.into(),
        });
        self
    }

    /// Queue a file, read when [`IdlBuilder::build`] runs.
    pub fn add_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.sources.push(Source::File(path.into()));
        self
    }

    /// Number of queued sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Parse every queued source in order and finish the corpus.
    ///
    /// # Errors
    ///
    /// Returns `WebIdlError::Io` when a file cannot be read and
    /// `WebIdlError::Parse` for any lexical, syntactic or semantic error.
    /// The first error stops the build.
    pub fn build(&self) -> Result<Definitions, WebIdlError> {
        info!(sources = self.sources.len(); "Parsing WebIDL sources");

        let mut parser = Parser::with_config(self.config.parser().parse_config())
            .map_err(|err| WebIdlError::new_parse_error(err, SourceMap::new()))?;

        for source in &self.sources {
            let (name, text): (Cow<'_, str>, Cow<'_, str>) = match source {
                Source::Text { name, text } => (name.into(), text.into()),
                Source::File(path) => {
                    debug!(path = path.display().to_string(); "Reading source file");
                    let text = fs::read_to_string(path)?;
                    (path.display().to_string().into(), text.into())
                }
            };
            if let Err(err) = parser.parse(&text, &name) {
                return Err(WebIdlError::new_parse_error(err, parser.into_sources()));
            }
        }

        let definitions = match parser.finish() {
            Ok(definitions) => definitions,
            Err(err) => return Err(WebIdlError::new_parse_error(err, parser.into_sources())),
        };

        info!(
            definitions = definitions.len(),
            warnings = definitions.warnings().len();
            "WebIDL sources parsed"
        );
        Ok(definitions)
    }
}
