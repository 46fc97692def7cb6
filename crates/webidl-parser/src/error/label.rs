//! Labeled source locations for diagnostic messages.

use webidl_core::location::Location;

/// A labeled location in source code.
///
/// # Primary vs Secondary Labels
///
/// - **Primary labels** mark the offending construct. A diagnostic carries one.
/// - **Secondary labels** point at conflicting peers, such as the first
///   declaration of a duplicated name.
#[derive(Debug, Clone)]
pub struct Label {
    location: Location,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
            is_primary: false,
        }
    }

    /// Get the location this label applies to.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Get the label message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a primary label.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Check if this is a secondary label.
    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use webidl_core::{location::SourceMap, span::Span};

    use super::*;

    #[test]
    fn test_primary_label() {
        let mut sources = SourceMap::new();
        let file = sources.add("a.webidl", "interface A {};");
        let label = Label::primary(Location::new(file, Span::new(10..11)), "declared here");

        assert_eq!(label.location().span(), Some(Span::new(10..11)));
        assert_eq!(label.message(), "declared here");
        assert!(label.is_primary());
        assert!(!label.is_secondary());
    }

    #[test]
    fn test_secondary_builtin_label() {
        let label = Label::secondary(Location::builtin("<builtin>"), "builtin typedef");

        assert!(label.location().is_builtin());
        assert!(label.is_secondary());
    }
}
