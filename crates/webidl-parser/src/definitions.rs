//! The finished result of a parse session.

use std::collections::BTreeSet;

use webidl_core::{identifier::Id, location::Location};

use crate::{
    dependencies::DependencyWalker,
    error::Diagnostic,
    model::{Callback, DefinitionId, Dictionary, Enumeration, Interface, Model, Typedef},
    scope::Binding,
};

/// A borrowed view of one top-level definition.
#[derive(Debug, Clone, Copy)]
pub enum Definition<'a> {
    Interface(&'a Interface),
    Dictionary(&'a Dictionary),
    Enum(&'a Enumeration),
    Callback(&'a Callback),
    Typedef(&'a Typedef),
}

impl Definition<'_> {
    pub fn name(&self) -> Id {
        match self {
            Definition::Interface(iface) => iface.name(),
            Definition::Dictionary(dictionary) => dictionary.name(),
            Definition::Enum(enumeration) => enumeration.name(),
            Definition::Callback(callback) => callback.name(),
            Definition::Typedef(typedef) => typedef.name(),
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Definition::Interface(iface) => iface.location(),
            Definition::Dictionary(dictionary) => dictionary.location(),
            Definition::Enum(enumeration) => enumeration.location(),
            Definition::Callback(callback) => callback.location(),
            Definition::Typedef(typedef) => typedef.location(),
        }
    }

    /// Keyword the definition is declared with.
    pub fn kind(&self) -> &'static str {
        match self {
            Definition::Interface(iface) if iface.is_callback() => "callback interface",
            Definition::Interface(_) => "interface",
            Definition::Dictionary(_) => "dictionary",
            Definition::Enum(_) => "enum",
            Definition::Callback(_) => "callback",
            Definition::Typedef(_) => "typedef",
        }
    }
}

/// Every visible definition of a finished session, deduplicated and in
/// declaration order. Implements statements and partial interfaces have
/// been folded into the interfaces they target.
#[derive(Debug)]
pub struct Definitions {
    model: Model,
    order: Vec<DefinitionId>,
    /// Source file names indexed by `FileId`.
    file_names: Vec<String>,
    warnings: Vec<Diagnostic>,
}

impl Definitions {
    pub(crate) fn new(
        model: Model,
        order: Vec<DefinitionId>,
        file_names: Vec<String>,
        warnings: Vec<Diagnostic>,
    ) -> Self {
        Self {
            model,
            order,
            file_names,
            warnings,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Definition ids in declaration order.
    pub fn ids(&self) -> &[DefinitionId] {
        &self.order
    }

    pub fn get(&self, id: DefinitionId) -> Definition<'_> {
        match id {
            DefinitionId::Interface(id) => Definition::Interface(self.model.interface(id)),
            DefinitionId::Dictionary(id) => Definition::Dictionary(self.model.dictionary(id)),
            DefinitionId::Enum(id) => Definition::Enum(self.model.enumeration(id)),
            DefinitionId::Callback(id) => Definition::Callback(self.model.callback(id)),
            DefinitionId::Typedef(id) => Definition::Typedef(self.model.typedef(id)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (DefinitionId, Definition<'_>)> {
        self.order.iter().map(|&id| (id, self.get(id)))
    }

    /// Find a top-level definition by name. Builtin typedefs such as
    /// `BufferSource` are found too, although they are never iterated.
    pub fn lookup(&self, name: &str) -> Option<DefinitionId> {
        match self.model.scope.lookup(Id::new(name))? {
            Binding::Interface(id) => Some(DefinitionId::Interface(id)),
            Binding::Dictionary(id) => Some(DefinitionId::Dictionary(id)),
            Binding::Enum(id) => Some(DefinitionId::Enum(id)),
            Binding::Callback(id) => Some(DefinitionId::Callback(id)),
            Binding::Typedef(id) => Some(DefinitionId::Typedef(id)),
            Binding::NamedConstructor(_) => None,
        }
    }

    /// The underlying model, for walking types and members by id.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Sorted names of every source file `id` depends on.
    pub fn dependencies(&self, id: DefinitionId) -> BTreeSet<String> {
        DependencyWalker::new(&self.model, &self.file_names).walk(id)
    }

    /// Warnings raised while parsing, in the order they were found.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}
