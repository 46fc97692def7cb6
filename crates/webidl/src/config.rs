//! Configuration types for WebIDL processing.
//!
//! All types implement [`serde::Deserialize`] and every section defaults
//! when absent, so an empty TOML document is a valid configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`ParserConfig`] - How strictly sources are parsed.
//! - [`OutputConfig`] - Where generated artifacts go.
//!
//! # Example
//!
//! ```
//! # use webidl::config::AppConfig;
//! let config: AppConfig = toml::from_str("[parser]\ndeny_warnings = true\n").unwrap();
//! assert!(config.parser().deny_warnings());
//! assert!(config.output().cache_dir().is_none());
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use webidl_parser::ParseConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Parser configuration section.
    #[serde(default)]
    parser: ParserConfig,

    /// Output configuration section.
    #[serde(default)]
    output: OutputConfig,
}

impl AppConfig {
    pub fn new(parser: ParserConfig, output: OutputConfig) -> Self {
        Self { parser, output }
    }

    /// Returns the parser configuration.
    pub fn parser(&self) -> &ParserConfig {
        &self.parser
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParserConfig {
    /// Treat every warning as a fatal error.
    #[serde(default)]
    deny_warnings: bool,
}

impl ParserConfig {
    pub fn new(deny_warnings: bool) -> Self {
        Self { deny_warnings }
    }

    pub fn deny_warnings(&self) -> bool {
        self.deny_warnings
    }

    /// The options handed to [`webidl_parser::Parser`].
    pub fn parse_config(&self) -> ParseConfig {
        ParseConfig {
            deny_warnings: self.deny_warnings,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory the dependency manifest is written to.
    #[serde(default)]
    cache_dir: Option<PathBuf>,
}

impl OutputConfig {
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        Self { cache_dir }
    }

    /// Returns the configured cache directory, if any.
    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();

        assert!(!config.parser().deny_warnings());
        assert!(config.output().cache_dir().is_none());
    }

    #[test]
    fn test_all_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [parser]
            deny_warnings = true

            [output]
            cache_dir = "target/webidl"
            "#,
        )
        .unwrap();

        assert!(config.parser().parse_config().deny_warnings);
        assert_eq!(config.output().cache_dir(), Some(Path::new("target/webidl")));
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let result = toml::from_str::<AppConfig>("[parser]\ndeny_warnings = \"yes\"\n");
        assert!(result.is_err());
    }
}
