//! Dictionaries.

use webidl_core::{identifier::Id, location::Location};

use super::{Argument, DictionaryId};

#[derive(Debug, Clone)]
pub struct Dictionary {
    name: Id,
    location: Location,
    pub(crate) parent_name: Option<(Id, Location)>,
    pub(crate) parent: Option<DictionaryId>,
    /// Sorted by name once finished.
    pub(crate) members: Vec<Argument>,
    pub(crate) finished: bool,
}

impl Dictionary {
    pub(crate) fn new(name: Id, location: Location, parent_name: Option<(Id, Location)>) -> Self {
        Self {
            name,
            location,
            parent_name,
            parent: None,
            members: Vec::new(),
            finished: false,
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn parent(&self) -> Option<DictionaryId> {
        self.parent
    }

    pub fn members(&self) -> &[Argument] {
        &self.members
    }

    pub fn member(&self, name: Id) -> Option<&Argument> {
        self.members.iter().find(|member| member.name == name)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BuiltinType, Type};

    #[test]
    fn test_member_lookup() {
        let mut dict = Dictionary::new(Id::new("Init"), Location::builtin("<test>"), None);
        dict.members.push(Argument::new(
            Id::new("bubbles"),
            Location::builtin("<test>"),
            Type::builtin(BuiltinType::Boolean),
        ));

        assert!(dict.member(Id::new("bubbles")).is_some());
        assert!(dict.member(Id::new("cancelable")).is_none());
        assert!(dict.parent().is_none());
    }
}
