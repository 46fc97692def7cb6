//! Source files each definition depends on.
//!
//! A definition depends on its own file and on every file declaring
//! something reachable from it: members and their arguments, parents,
//! implemented interfaces, and the dictionaries and callbacks its types
//! name. Interface types are not followed; code generated for a type
//! reference only needs the interface to exist. The set is meant as a
//! cache-invalidation signal for build systems.

use std::collections::{BTreeSet, HashSet};

use log::trace;

use webidl_core::location::Location;

use crate::{
    builtins::BUILTIN_FILE,
    model::{Argument, DefinitionId, Member, Model, Type},
};

pub(crate) struct DependencyWalker<'a> {
    model: &'a Model,
    file_names: &'a [String],
    visited: HashSet<DefinitionId>,
    files: BTreeSet<String>,
}

impl<'a> DependencyWalker<'a> {
    pub(crate) fn new(model: &'a Model, file_names: &'a [String]) -> Self {
        Self {
            model,
            file_names,
            visited: HashSet::new(),
            files: BTreeSet::new(),
        }
    }

    /// Every file `id` depends on, its own included.
    pub(crate) fn walk(mut self, id: DefinitionId) -> BTreeSet<String> {
        self.definition(id);
        trace!(files = self.files.len(), definitions = self.visited.len(); "Collected dependencies");
        self.files
    }

    fn location(&mut self, location: Location) {
        let Some(name) = location
            .file()
            .and_then(|file| self.file_names.get(file.index()))
        else {
            return;
        };
        if name != BUILTIN_FILE {
            self.files.insert(name.clone());
        }
    }

    fn definition(&mut self, id: DefinitionId) {
        if !self.visited.insert(id) {
            return;
        }
        let model = self.model;
        self.location(model.location_of(id));

        match id {
            DefinitionId::Interface(iface) => {
                let iface = model.interface(iface);
                for member in &iface.members {
                    self.member(member);
                }
                for &implemented in &iface.implemented {
                    self.definition(DefinitionId::Interface(implemented));
                }
                if let Some(parent) = iface.parent {
                    self.definition(DefinitionId::Interface(parent));
                }
            }
            DefinitionId::Dictionary(dictionary) => {
                let dictionary = model.dictionary(dictionary);
                for member in &dictionary.members {
                    self.argument(member);
                }
                if let Some(parent) = dictionary.parent {
                    self.definition(DefinitionId::Dictionary(parent));
                }
            }
            DefinitionId::Callback(callback) => {
                let callback = model.callback(callback);
                self.ty(&callback.return_type);
                for argument in &callback.arguments {
                    self.argument(argument);
                }
            }
            DefinitionId::Typedef(typedef) => self.ty(model.typedef(typedef).inner()),
            DefinitionId::Enum(_) => {}
        }
    }

    fn member(&mut self, member: &Member) {
        self.location(member.location());
        match member {
            Member::Const(constant) => self.ty(&constant.ty),
            Member::Attribute(attr) => self.ty(&attr.ty),
            Member::Method(method) => {
                for overload in &method.overloads {
                    self.location(overload.location);
                    self.ty(&overload.return_type);
                    for argument in &overload.arguments {
                        self.argument(argument);
                    }
                }
            }
            Member::MaplikeOrSetlike(decl) => {
                self.ty(&decl.key_type);
                if let Some(value_type) = &decl.value_type {
                    self.ty(value_type);
                }
            }
        }
    }

    fn argument(&mut self, argument: &Argument) {
        self.location(argument.location);
        self.ty(&argument.ty);
    }

    fn ty(&mut self, ty: &Type) {
        match ty {
            Type::Nullable(inner) | Type::Sequence(inner) | Type::MozMap(inner) | Type::Array(inner) => {
                self.ty(inner)
            }
            Type::Union(union) => {
                for member in &union.members {
                    self.ty(member);
                }
            }
            Type::Dictionary(named) => self.definition(DefinitionId::Dictionary(named.id)),
            Type::Callback(named) => self.definition(DefinitionId::Callback(named.id)),
            Type::Interface(iface) => {
                if let Some(inner) = &iface.promise_inner {
                    self.ty(inner);
                }
            }
            Type::Builtin(_) | Type::Enum(_) | Type::Unresolved { .. } => {}
        }
    }
}
