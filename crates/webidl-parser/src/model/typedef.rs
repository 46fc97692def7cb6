//! Typedefs.

use webidl_core::{identifier::Id, location::Location};

use super::Type;

#[derive(Debug, Clone)]
pub struct Typedef {
    name: Id,
    location: Location,
    pub(crate) inner: Type,
}

impl Typedef {
    pub(crate) fn new(name: Id, location: Location, inner: Type) -> Self {
        Self {
            name,
            location,
            inner,
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// The aliased type, fully resolved once finished.
    pub fn inner(&self) -> &Type {
        &self.inner
    }
}
