//! Semantic model of a WebIDL corpus.
//!
//! Every top-level definition lives in an arena owned by [`Model`] and is
//! addressed by a stable id. Cross references between definitions (parents,
//! implemented interfaces, type references) are ids, never pointers, so a
//! forward declaration and its later completion are the same arena slot.

mod callback;
mod dictionary;
mod enumeration;
mod ext_attr;
mod interface;
mod member;
mod typedef;
mod types;
mod value;

pub use callback::Callback;
pub use dictionary::Dictionary;
pub use enumeration::Enumeration;
pub use ext_attr::{ExtendedAttribute, ExtendedAttributeArgs, ExtendedAttributes, ExtendedAttributeValue};
pub use interface::{ImplementsStatement, Interface, PartialInterface};
pub use member::{
    Affects, Argument, Attribute, Const, DependsOn, MaplikeOrSetlike, MaplikeOrSetlikeKind, Member,
    MemberInfo, Method, NamedOrIndexed, Overload, SpecialFlags,
};
pub use typedef::Typedef;
pub use types::{BuiltinType, InterfaceType, NamedType, Type, UnionType};
pub use value::Value;

use std::fmt;

use webidl_core::{identifier::Id, location::Location};

use crate::scope::GlobalScope;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position of the definition inside its arena.
            pub fn index(&self) -> usize {
                self.0
            }
        }
    };
}

arena_id!(
    /// Handle to an [`Interface`].
    InterfaceId
);
arena_id!(
    /// Handle to a [`PartialInterface`].
    PartialId
);
arena_id!(
    /// Handle to a [`Dictionary`].
    DictionaryId
);
arena_id!(
    /// Handle to an [`Enumeration`].
    EnumId
);
arena_id!(
    /// Handle to a [`Callback`].
    CallbackId
);
arena_id!(
    /// Handle to a [`Typedef`].
    TypedefId
);
arena_id!(
    /// Handle to an [`ImplementsStatement`].
    ImplementsId
);

/// A top-level definition visible in the final result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DefinitionId {
    Interface(InterfaceId),
    Dictionary(DictionaryId),
    Enum(EnumId),
    Callback(CallbackId),
    Typedef(TypedefId),
}

/// Everything a parse session produced, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Production {
    Definition(DefinitionId),
    Partial(PartialId),
    Implements(ImplementsId),
}

/// Arena of every definition seen by a parse session.
#[derive(Debug, Default)]
pub struct Model {
    pub(crate) interfaces: Vec<Interface>,
    pub(crate) partials: Vec<PartialInterface>,
    pub(crate) dictionaries: Vec<Dictionary>,
    pub(crate) enums: Vec<Enumeration>,
    pub(crate) callbacks: Vec<Callback>,
    pub(crate) typedefs: Vec<Typedef>,
    pub(crate) implements: Vec<ImplementsStatement>,
    pub(crate) scope: GlobalScope,
}

impl Model {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn interface(&self, id: InterfaceId) -> &Interface {
        &self.interfaces[id.0]
    }

    pub(crate) fn interface_mut(&mut self, id: InterfaceId) -> &mut Interface {
        &mut self.interfaces[id.0]
    }

    pub fn interfaces(&self) -> impl Iterator<Item = (InterfaceId, &Interface)> {
        self.interfaces
            .iter()
            .enumerate()
            .map(|(idx, iface)| (InterfaceId(idx), iface))
    }

    pub(crate) fn partial(&self, id: PartialId) -> &PartialInterface {
        &self.partials[id.0]
    }

    pub(crate) fn partial_mut(&mut self, id: PartialId) -> &mut PartialInterface {
        &mut self.partials[id.0]
    }

    pub fn dictionary(&self, id: DictionaryId) -> &Dictionary {
        &self.dictionaries[id.0]
    }

    pub(crate) fn dictionary_mut(&mut self, id: DictionaryId) -> &mut Dictionary {
        &mut self.dictionaries[id.0]
    }

    pub fn enumeration(&self, id: EnumId) -> &Enumeration {
        &self.enums[id.0]
    }

    pub fn callback(&self, id: CallbackId) -> &Callback {
        &self.callbacks[id.0]
    }

    pub(crate) fn callback_mut(&mut self, id: CallbackId) -> &mut Callback {
        &mut self.callbacks[id.0]
    }

    pub fn typedef(&self, id: TypedefId) -> &Typedef {
        &self.typedefs[id.0]
    }

    pub(crate) fn typedef_mut(&mut self, id: TypedefId) -> &mut Typedef {
        &mut self.typedefs[id.0]
    }

    pub(crate) fn implements_statement(&self, id: ImplementsId) -> &ImplementsStatement {
        &self.implements[id.0]
    }

    /// Every interface is based on itself.
    /// Global names and top-level bindings.
    pub fn scope(&self) -> &GlobalScope {
        &self.scope
    }

    pub(crate) fn add_interface(&mut self, mut interface: Interface) -> InterfaceId {
        let id = InterfaceId(self.interfaces.len());
        interface.interfaces_based_on_self.insert(id);
        self.interfaces.push(interface);
        id
    }

    pub(crate) fn add_partial(&mut self, partial: PartialInterface) -> PartialId {
        self.partials.push(partial);
        PartialId(self.partials.len() - 1)
    }

    pub(crate) fn add_dictionary(&mut self, dictionary: Dictionary) -> DictionaryId {
        self.dictionaries.push(dictionary);
        DictionaryId(self.dictionaries.len() - 1)
    }

    pub(crate) fn add_enum(&mut self, enumeration: Enumeration) -> EnumId {
        self.enums.push(enumeration);
        EnumId(self.enums.len() - 1)
    }

    pub(crate) fn add_callback(&mut self, callback: Callback) -> CallbackId {
        self.callbacks.push(callback);
        CallbackId(self.callbacks.len() - 1)
    }

    pub(crate) fn add_typedef(&mut self, typedef: Typedef) -> TypedefId {
        self.typedefs.push(typedef);
        TypedefId(self.typedefs.len() - 1)
    }

    pub(crate) fn add_implements(&mut self, statement: ImplementsStatement) -> ImplementsId {
        self.implements.push(statement);
        ImplementsId(self.implements.len() - 1)
    }

    /// Name of a definition.
    pub fn name_of(&self, id: DefinitionId) -> Id {
        match id {
            DefinitionId::Interface(id) => self.interface(id).name(),
            DefinitionId::Dictionary(id) => self.dictionary(id).name(),
            DefinitionId::Enum(id) => self.enumeration(id).name(),
            DefinitionId::Callback(id) => self.callback(id).name(),
            DefinitionId::Typedef(id) => self.typedef(id).name(),
        }
    }

    /// Declaration site of a definition.
    pub fn location_of(&self, id: DefinitionId) -> Location {
        match id {
            DefinitionId::Interface(id) => self.interface(id).location(),
            DefinitionId::Dictionary(id) => self.dictionary(id).location(),
            DefinitionId::Enum(id) => self.enumeration(id).location(),
            DefinitionId::Callback(id) => self.callback(id).location(),
            DefinitionId::Typedef(id) => self.typedef(id).location(),
        }
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            DefinitionId::Interface(_) => "interface",
            DefinitionId::Dictionary(_) => "dictionary",
            DefinitionId::Enum(_) => "enum",
            DefinitionId::Callback(_) => "callback",
            DefinitionId::Typedef(_) => "typedef",
        };
        f.write_str(kind)
    }
}
