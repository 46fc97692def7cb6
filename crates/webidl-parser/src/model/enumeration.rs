//! Enumerations.

use webidl_core::{identifier::Id, location::Location};

/// `enum Name { "a", "b" };`
///
/// Values keep their declaration order and are unique.
#[derive(Debug, Clone)]
pub struct Enumeration {
    name: Id,
    location: Location,
    values: Vec<String>,
}

impl Enumeration {
    pub(crate) fn new(name: Id, location: Location, values: Vec<String>) -> Self {
        Self {
            name,
            location,
            values,
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}
