//! # WebIDL Parser
//!
//! Lexer, grammar and semantic model for WebIDL as consumed by DOM binding
//! generators. Sources are fed one file at a time; nothing is resolved until
//! [`Parser::finish`] sees the whole corpus, so definitions may refer to
//! names declared in later files.
//!
//! ## Usage
//!
//! ```
//! # use webidl_parser::{Parser, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let mut parser = Parser::new()?;
//!     parser.parse("[PrimaryGlobal] interface Window {};", "window.webidl")?;
//!     parser.parse(
//!         "interface Node { readonly attribute DOMString nodeName; };",
//!         "node.webidl",
//!     )?;
//!
//!     let definitions = parser.finish()?;
//!     assert_eq!(definitions.len(), 2);
//!     Ok(())
//! }
//! ```

mod attributes;
mod builtins;
mod complete;
mod definitions;
mod dependencies;
mod distinguish;
mod elaborate;
pub mod error;
mod finish;
mod lexer;
mod link;
pub mod model;
mod naming;
mod parser;
#[cfg(test)]
mod parser_tests;
mod parser_types;
mod scope;
mod span;
mod tokens;
mod validate;

pub use definitions::{Definition, Definitions};
pub use distinguish::is_distinguishable;
pub use scope::GlobalScope;

use std::collections::BTreeSet;

use log::{debug, info, warn};

use webidl_core::location::{FileId, SourceMap};

use elaborate::{Builder, Elaborated};
use error::{Diagnostic, DiagnosticCollector, ParseError};
use model::{Model, Production};

/// Options for a parse session.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseConfig {
    /// Fail as soon as any warning is raised.
    pub deny_warnings: bool,
}

/// A parse session over any number of source files.
///
/// The parser owns the [`SourceMap`] every diagnostic location points
/// into; keep it around (or take it with [`Parser::into_sources`]) to
/// render errors.
#[derive(Debug)]
pub struct Parser {
    model: Model,
    sources: SourceMap,
    productions: Vec<Production>,
    collector: DiagnosticCollector,
}

impl Parser {
    /// Create a parser with the builtin definitions installed.
    pub fn new() -> Result<Self, ParseError> {
        Self::with_config(ParseConfig::default())
    }

    pub fn with_config(config: ParseConfig) -> Result<Self, ParseError> {
        let mut model = Model::new();
        let mut sources = SourceMap::new();
        builtins::install(&mut model, &mut sources)?;

        Ok(Self {
            model,
            sources,
            productions: Vec::new(),
            collector: DiagnosticCollector::new().deny_warnings(config.deny_warnings),
        })
    }

    /// Parse one source file and add its definitions to the session.
    ///
    /// The pipeline for a single file:
    ///
    /// 1. **Tokenize** - Convert source text to tokens
    /// 2. **Parse** - Build the definition list from tokens
    /// 3. **Elaborate** - Bind names and create model objects, leaving
    ///    references to other definitions unresolved
    ///
    /// On failure the error diagnostic comes first, followed by the
    /// warnings collected so far.
    pub fn parse(&mut self, text: &str, filename: &str) -> Result<FileId, ParseError> {
        info!(file = filename, bytes = text.len(); "Parsing source");
        let file = self.sources.add(filename, text);

        let elaborated = match elaborate_file(&mut self.model, text, file) {
            Ok(elaborated) => elaborated,
            Err(diagnostic) => return Err(self.fail(diagnostic)),
        };

        for warning in elaborated.warnings {
            warn!(file = filename; "{}", warning.message());
            self.collector.emit(warning);
        }
        if self.collector.has_errors() {
            return Err(ParseError::new(self.collector.diagnostics().to_vec()));
        }

        debug!(file = filename, productions = elaborated.productions.len(); "Parsed source");
        self.productions.extend(elaborated.productions);
        Ok(file)
    }

    /// Resolve, finish and validate everything parsed so far.
    ///
    /// 1. **Link** - Resolve implements statements and reject cycles
    /// 2. **Finish** - Complete types, merge partials, import
    ///    consequential interfaces and expand maplike/setlike
    /// 3. **Validate** - Run the checks that need every definition finished
    ///
    /// The accumulated definitions move into the returned [`Definitions`];
    /// the parser keeps only its sources afterwards.
    pub fn finish(&mut self) -> Result<Definitions, ParseError> {
        let mut model = std::mem::take(&mut self.model);
        let productions = std::mem::take(&mut self.productions);
        info!(productions = productions.len(); "Finishing parse session");

        let result = link::link(&mut model, &productions)
            .and_then(|()| finish::finish_all(&mut model, &productions))
            .and_then(|()| validate::validate(&mut model, &productions));
        if let Err(diagnostic) = result {
            return Err(self.fail(diagnostic));
        }

        let mut seen = BTreeSet::new();
        let order: Vec<_> = productions
            .iter()
            .filter_map(|production| match *production {
                Production::Definition(id) => Some(id),
                Production::Partial(_) | Production::Implements(_) => None,
            })
            .filter(|id| seen.insert(*id))
            .collect();
        let file_names = self
            .sources
            .iter()
            .map(|(_, file)| file.name().to_owned())
            .collect();
        let warnings = std::mem::take(&mut self.collector).finish()?;

        info!(definitions = order.len(), warnings = warnings.len(); "Parse session finished");
        Ok(Definitions::new(model, order, file_names, warnings))
    }

    /// Every source registered so far, the builtin fragment included.
    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn into_sources(self) -> SourceMap {
        self.sources
    }

    fn fail(&self, diagnostic: Diagnostic) -> ParseError {
        let mut diagnostics = vec![diagnostic];
        diagnostics.extend(self.collector.diagnostics().iter().cloned());
        ParseError::new(diagnostics)
    }
}

fn elaborate_file(model: &mut Model, text: &str, file: FileId) -> error::Result<Elaborated> {
    let tokens = lexer::tokenize(text, file)?;
    let definitions = parser::build_definitions(&tokens, file)?;
    Builder::new(model, file).build(definitions)
}
