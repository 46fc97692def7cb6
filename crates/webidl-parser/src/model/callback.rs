//! Callback function types.

use webidl_core::{identifier::Id, location::Location};

use super::{Argument, ExtendedAttributes, Type};

/// `callback Name = ReturnType (arguments);`
#[derive(Debug, Clone)]
pub struct Callback {
    name: Id,
    location: Location,
    pub(crate) return_type: Type,
    pub(crate) arguments: Vec<Argument>,
    pub(crate) ext_attrs: ExtendedAttributes,
    pub(crate) treat_non_callable_as_null: bool,
    pub(crate) treat_non_object_as_null: bool,
    pub(crate) finished: bool,
}

impl Callback {
    pub(crate) fn new(
        name: Id,
        location: Location,
        return_type: Type,
        arguments: Vec<Argument>,
    ) -> Self {
        Self {
            name,
            location,
            return_type,
            arguments,
            ext_attrs: ExtendedAttributes::new(),
            treat_non_callable_as_null: false,
            treat_non_object_as_null: false,
            finished: false,
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn ext_attrs(&self) -> &ExtendedAttributes {
        &self.ext_attrs
    }

    pub fn treat_non_callable_as_null(&self) -> bool {
        self.treat_non_callable_as_null
    }

    pub fn treat_non_object_as_null(&self) -> bool {
        self.treat_non_object_as_null
    }
}
