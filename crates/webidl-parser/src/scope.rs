//! The global scope.
//!
//! Every top-level name is bound here exactly once. The scope also owns the
//! global-name tables that `[Global]`, `[PrimaryGlobal]` and `[Exposed]`
//! share across the whole corpus.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use log::trace;
use webidl_core::{identifier::Id, location::Location};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    model::{CallbackId, DictionaryId, EnumId, InterfaceId, TypedefId},
};

/// What a top-level name is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Binding {
    Interface(InterfaceId),
    Dictionary(DictionaryId),
    Enum(EnumId),
    Callback(CallbackId),
    Typedef(TypedefId),
    /// A `[NamedConstructor]` owned by an interface.
    NamedConstructor(InterfaceId),
}

impl Binding {
    pub fn kind(&self) -> &'static str {
        match self {
            Binding::Interface(_) => "interface",
            Binding::Dictionary(_) => "dictionary",
            Binding::Enum(_) => "enum",
            Binding::Callback(_) => "callback",
            Binding::Typedef(_) => "typedef",
            Binding::NamedConstructor(_) => "named constructor",
        }
    }
}

#[derive(Debug, Default)]
pub struct GlobalScope {
    bindings: IndexMap<Id, (Binding, Location)>,
    pub(crate) global_names: BTreeSet<Id>,
    /// Global name to the names of the interfaces carrying it.
    pub(crate) global_name_mapping: BTreeMap<Id, BTreeSet<Id>>,
    pub(crate) primary_global_name: Option<Id>,
    pub(crate) primary_global_attr: Option<Location>,
}

impl GlobalScope {
    pub(crate) fn lookup(&self, name: Id) -> Option<Binding> {
        self.bindings.get(&name).map(|(binding, _)| *binding)
    }

    pub(crate) fn location_of(&self, name: Id) -> Option<Location> {
        self.bindings.get(&name).map(|(_, location)| *location)
    }

    /// Bind `name`, failing if anything else already holds it.
    pub(crate) fn bind(&mut self, name: Id, binding: Binding, location: Location) -> Result<()> {
        if let Some((existing, existing_location)) = self.bindings.get(&name) {
            let dictionary = matches!(existing, Binding::Dictionary(_))
                || matches!(binding, Binding::Dictionary(_));
            return Err(if dictionary {
                Diagnostic::error(format!(
                    "Name collision between dictionary declarations for identifier '{name}'."
                ))
                .with_code(ErrorCode::E201)
                .with_label(location, "declared again here")
                .with_secondary_label(*existing_location, "first declared here")
            } else {
                multiple_definitions(name, "::", location, *existing_location)
            });
        }

        trace!(name = name.as_string(), kind = binding.kind(); "Binding global name");
        self.bindings.insert(name, (binding, location));
        Ok(())
    }

    pub fn global_names(&self) -> &BTreeSet<Id> {
        &self.global_names
    }

    pub fn primary_global_name(&self) -> Option<Id> {
        self.primary_global_name
    }

    /// Record that interface `interface` is reachable as global `global`.
    pub(crate) fn add_global_name(&mut self, global: Id, interface: Id) {
        self.global_names.insert(global);
        self.global_name_mapping
            .entry(global)
            .or_default()
            .insert(interface);
    }

    /// The interfaces the given global names map to.
    pub(crate) fn exposure_set(&self, names: &BTreeSet<Id>) -> BTreeSet<Id> {
        names
            .iter()
            .filter_map(|name| self.global_name_mapping.get(name))
            .flatten()
            .copied()
            .collect()
    }

    /// The exposure set of something exposed only in the primary global.
    pub(crate) fn primary_exposure(&self) -> BTreeSet<Id> {
        self.primary_global_name.into_iter().collect()
    }

    /// Name of the primary global for diagnostics.
    pub(crate) fn primary_global_label(&self) -> String {
        self.primary_global_name
            .map_or_else(|| "primary global".to_string(), |name| name.as_string())
    }
}

/// Two definitions of one name that cannot be merged.
///
/// Scopes are written `::` for the global scope and `::Name::` for the
/// scope a definition opens.
pub(crate) fn multiple_definitions(
    name: Id,
    scope: &str,
    location: Location,
    existing: Location,
) -> Diagnostic {
    Diagnostic::error(format!(
        "Multiple unresolvable definitions of identifier '{name}' in scope '{scope}'"
    ))
    .with_code(ErrorCode::E201)
    .with_label(location, "defined again here")
    .with_secondary_label(existing, "first defined here")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Location {
        Location::builtin("<test>")
    }

    #[test]
    fn test_bind_and_lookup() {
        let mut scope = GlobalScope::default();
        let name = Id::new("Color");

        scope.bind(name, Binding::Enum(EnumId(0)), loc()).unwrap();

        assert_eq!(scope.lookup(name), Some(Binding::Enum(EnumId(0))));
        assert!(scope.lookup(Id::new("Missing")).is_none());
    }

    #[test]
    fn test_rebinding_is_an_error() {
        let mut scope = GlobalScope::default();
        let name = Id::new("Node");
        scope.bind(name, Binding::Typedef(TypedefId(0)), loc()).unwrap();

        let err = scope
            .bind(name, Binding::Callback(CallbackId(0)), loc())
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Multiple unresolvable definitions of identifier 'Node' in scope '::'"
        );
        assert_eq!(err.labels().len(), 2);
    }

    #[test]
    fn test_dictionary_collision_message() {
        let mut scope = GlobalScope::default();
        let name = Id::new("Init");
        scope.bind(name, Binding::Dictionary(DictionaryId(0)), loc()).unwrap();

        let err = scope
            .bind(name, Binding::Enum(EnumId(0)), loc())
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Name collision between dictionary declarations for identifier 'Init'."
        );
    }

    #[test]
    fn test_exposure_set_maps_global_names() {
        let mut scope = GlobalScope::default();
        scope.add_global_name(Id::new("Worker"), Id::new("DedicatedWorkerGlobalScope"));
        scope.add_global_name(Id::new("Worker"), Id::new("SharedWorkerGlobalScope"));
        scope.add_global_name(Id::new("Window"), Id::new("Window"));

        let names = [Id::new("Worker")].into_iter().collect();
        let set = scope.exposure_set(&names);

        assert_eq!(set.len(), 2);
        assert!(set.contains(&Id::new("SharedWorkerGlobalScope")));
        assert!(scope.global_names().contains(&Id::new("Window")));
    }
}
