//! Identifier hygiene.
//!
//! Declared and referenced names go through [`declare`] before they are
//! bound or looked up. A single leading underscore escapes a name that would
//! otherwise be a keyword and is stripped; a double underscore is reserved
//! for names the parser itself synthesizes.

use webidl_core::{identifier::Id, location::Location};

use crate::error::{Diagnostic, ErrorCode, Result};

/// Names that are legal only where the parser creates them itself.
const FORBIDDEN: [&str; 2] = ["constructor", "toString"];

/// How strictly [`declare`] treats a name.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NameRules {
    pub allow_double_underscore: bool,
    pub allow_forbidden: bool,
}

impl NameRules {
    /// Rules for names the parser synthesizes.
    pub fn synthesized() -> Self {
        Self {
            allow_double_underscore: true,
            allow_forbidden: true,
        }
    }
}

/// Check a declared name and return the identifier it is bound under.
pub(crate) fn declare(name: &str, location: Location, rules: NameRules) -> Result<Id> {
    if name == "__noSuchMethod__" {
        return Err(reserved("__noSuchMethod__ is deprecated", location));
    }

    let name = if name.starts_with("__") && name != "__content" {
        if !rules.allow_double_underscore {
            return Err(reserved("Identifiers beginning with __ are reserved", location));
        }
        name
    } else {
        name.strip_prefix('_').unwrap_or(name)
    };

    if !rules.allow_forbidden && FORBIDDEN.contains(&name) {
        return Err(reserved(
            &format!("Cannot use reserved identifier '{name}'"),
            location,
        ));
    }

    Ok(Id::new(name))
}

fn reserved(message: &str, location: Location) -> Diagnostic {
    Diagnostic::error(message)
        .with_code(ErrorCode::E200)
        .with_label(location, "reserved identifier")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Location {
        Location::builtin("<test>")
    }

    #[test]
    fn test_single_underscore_is_stripped() {
        let id = declare("_interface", loc(), NameRules::default()).unwrap();
        assert_eq!(id, "interface");
    }

    #[test]
    fn test_double_underscore_is_reserved() {
        let err = declare("__foo", loc(), NameRules::default()).unwrap_err();
        assert_eq!(err.message(), "Identifiers beginning with __ are reserved");
        assert_eq!(err.code(), Some(ErrorCode::E200));

        let id = declare("__stringifier", loc(), NameRules::synthesized()).unwrap();
        assert_eq!(id, "__stringifier");
    }

    #[test]
    fn test_content_is_exempt() {
        // Not reserved, but still loses its escaping underscore.
        assert_eq!(
            declare("__content", loc(), NameRules::default()).unwrap(),
            "_content"
        );
    }

    #[test]
    fn test_no_such_method_is_deprecated() {
        let err = declare("__noSuchMethod__", loc(), NameRules::synthesized()).unwrap_err();
        assert_eq!(err.message(), "__noSuchMethod__ is deprecated");
    }

    #[test]
    fn test_forbidden_names() {
        let err = declare("constructor", loc(), NameRules::default()).unwrap_err();
        assert_eq!(err.message(), "Cannot use reserved identifier 'constructor'");
        assert!(declare("_toString", loc(), NameRules::default()).is_err());
        assert!(
            declare(
                "constructor",
                loc(),
                NameRules {
                    allow_forbidden: true,
                    ..Default::default()
                }
            )
            .is_ok()
        );
    }
}
