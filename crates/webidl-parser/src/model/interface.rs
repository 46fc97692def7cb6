//! Interfaces, partial interface fragments and implements statements.

use std::collections::BTreeSet;

use webidl_core::{identifier::Id, location::Location};

use super::{
    ExtendedAttribute, ExtendedAttributes, InterfaceId, MaplikeOrSetlike, Member, Method, PartialId,
};

/// An interface, from its first mention (forward declaration, partial or
/// full declaration) until it is finished.
#[derive(Debug, Clone)]
pub struct Interface {
    name: Id,
    location: Location,
    pub(crate) is_callback: bool,
    /// Set once the non-partial declaration has been seen.
    pub(crate) is_known_non_partial: bool,
    pub(crate) parent_name: Option<(Id, Location)>,
    pub(crate) parent: Option<InterfaceId>,
    pub(crate) members: Vec<Member>,
    /// Own members, snapshotted before members of implemented interfaces
    /// are imported.
    pub(crate) original_members: Vec<Member>,
    pub(crate) ext_attrs: ExtendedAttributes,
    pub(crate) partials: Vec<PartialId>,
    /// Site of an `interface Name;` seen before any definition.
    pub(crate) forward_declaration: Option<Location>,
    /// Site of the interface's own maplike or setlike declaration.
    pub(crate) maplike_or_setlike: Option<Location>,
    pub(crate) implemented: Vec<InterfaceId>,
    pub(crate) consequential: bool,
    pub(crate) interfaces_based_on_self: BTreeSet<InterfaceId>,
    pub(crate) interfaces_implementing_self: BTreeSet<InterfaceId>,
    pub(crate) exposure_global_names: BTreeSet<Id>,
    pub(crate) exposure_set: BTreeSet<Id>,
    pub(crate) ctor: Option<Method>,
    pub(crate) named_constructors: Vec<Method>,
    pub(crate) global_names: Vec<Id>,
    pub(crate) is_on_global_proto_chain: bool,
    pub(crate) has_child_interfaces: bool,
    pub(crate) own_members_in_slots: usize,
    pub(crate) total_members_in_slots: usize,
    pub(crate) finished: bool,
}

impl Interface {
    pub(crate) fn new(name: Id, location: Location) -> Self {
        Self {
            name,
            location,
            is_callback: false,
            is_known_non_partial: false,
            parent_name: None,
            parent: None,
            members: Vec::new(),
            original_members: Vec::new(),
            ext_attrs: ExtendedAttributes::new(),
            partials: Vec::new(),
            forward_declaration: None,
            maplike_or_setlike: None,
            implemented: Vec::new(),
            consequential: false,
            interfaces_based_on_self: BTreeSet::new(),
            interfaces_implementing_self: BTreeSet::new(),
            exposure_global_names: BTreeSet::new(),
            exposure_set: BTreeSet::new(),
            ctor: None,
            named_constructors: Vec::new(),
            global_names: Vec::new(),
            is_on_global_proto_chain: false,
            has_child_interfaces: false,
            own_members_in_slots: 0,
            total_members_in_slots: 0,
            finished: false,
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    /// Location of the non-partial declaration once seen, else of the
    /// first mention.
    pub fn location(&self) -> Location {
        self.location
    }

    pub(crate) fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    pub fn is_callback(&self) -> bool {
        self.is_callback
    }

    pub fn is_known_non_partial(&self) -> bool {
        self.is_known_non_partial
    }

    pub fn parent(&self) -> Option<InterfaceId> {
        self.parent
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn original_members(&self) -> &[Member] {
        &self.original_members
    }

    pub fn ext_attrs(&self) -> &ExtendedAttributes {
        &self.ext_attrs
    }

    pub fn implemented_interfaces(&self) -> &[InterfaceId] {
        &self.implemented
    }

    /// Mixed into another interface by an implements statement.
    pub fn is_consequential(&self) -> bool {
        self.consequential
    }

    /// This interface, every descendant and every interface that
    /// (transitively) implements it.
    pub fn interfaces_based_on_self(&self) -> &BTreeSet<InterfaceId> {
        &self.interfaces_based_on_self
    }

    pub fn interfaces_implementing_self(&self) -> &BTreeSet<InterfaceId> {
        &self.interfaces_implementing_self
    }

    pub fn exposure_set(&self) -> &BTreeSet<Id> {
        &self.exposure_set
    }

    pub fn constructor(&self) -> Option<&Method> {
        self.ctor.as_ref()
    }

    pub fn named_constructors(&self) -> &[Method] {
        &self.named_constructors
    }

    pub fn global_names(&self) -> &[Id] {
        &self.global_names
    }

    pub fn is_on_global_proto_chain(&self) -> bool {
        self.is_on_global_proto_chain
    }

    pub fn has_child_interfaces(&self) -> bool {
        self.has_child_interfaces
    }

    /// Slots used by this interface and its ancestors.
    pub fn total_members_in_slots(&self) -> usize {
        self.total_members_in_slots
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_global(&self) -> bool {
        self.ext_attrs.contains("Global") || self.ext_attrs.contains("PrimaryGlobal")
    }

    /// Callback interfaces get an interface object only to hold constants.
    pub fn has_interface_object(&self) -> bool {
        if self.is_callback {
            return self.members.iter().any(Member::is_const);
        }
        !self.ext_attrs.contains("NoInterfaceObject")
    }

    pub fn is_navigator_property(&self) -> bool {
        self.ext_attrs.contains("NavigatorProperty")
    }

    /// The interface's own `maplike` or `setlike` declaration. Declarations
    /// imported through implements statements do not count.
    pub fn maplike_or_setlike(&self) -> Option<&MaplikeOrSetlike> {
        let location = self.maplike_or_setlike?;
        self.members
            .iter()
            .filter_map(Member::as_maplike_or_setlike)
            .find(|decl| decl.info.location == location)
    }

    pub fn is_js_implemented(&self) -> bool {
        self.ext_attrs.contains("JSImplementation")
    }

    /// Global names listed in `[Exposed]`, or the primary global by default.
    pub fn exposure_global_names(&self) -> &BTreeSet<Id> {
        &self.exposure_global_names
    }

    /// Slots used by `[StoreInSlot]` attributes declared on this interface.
    pub fn own_members_in_slots(&self) -> usize {
        self.own_members_in_slots
    }

    pub fn is_exposed_conditionally(&self) -> bool {
        ["Pref", "ChromeOnly", "Func", "AvailableIn", "CheckAnyPermissions", "CheckAllPermissions"]
            .iter()
            .any(|name| self.ext_attrs.contains(name))
    }

    pub fn member(&self, name: Id) -> Option<&Member> {
        self.members.iter().find(|member| member.name() == name)
    }
}

/// A `partial interface` fragment awaiting merge into its interface.
#[derive(Debug, Clone)]
pub struct PartialInterface {
    pub(crate) name: Id,
    pub(crate) location: Location,
    pub(crate) members: Vec<Member>,
    pub(crate) non_partial: InterfaceId,
    /// `[Constructor]` and `[NamedConstructor]`, applied to the interface
    /// when the fragment is merged.
    pub(crate) propagated_ext_attrs: Vec<ExtendedAttribute>,
}

impl PartialInterface {
    pub(crate) fn new(name: Id, location: Location, non_partial: InterfaceId) -> Self {
        Self {
            name,
            location,
            members: Vec::new(),
            non_partial,
            propagated_ext_attrs: Vec::new(),
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }
}

/// `A implements B;`
#[derive(Debug, Clone)]
pub struct ImplementsStatement {
    pub(crate) location: Location,
    pub(crate) implementor: (Id, Location),
    pub(crate) implementee: (Id, Location),
}

impl ImplementsStatement {
    pub fn location(&self) -> Location {
        self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExtendedAttribute, ExtendedAttributeArgs};

    #[test]
    fn test_new_interface_is_a_stub() {
        let iface = Interface::new(Id::new("Node"), Location::builtin("<test>"));

        assert!(!iface.is_known_non_partial());
        assert!(!iface.is_finished());
        assert!(iface.has_interface_object());
        assert!(iface.maplike_or_setlike().is_none());
    }

    #[test]
    fn test_global_flags() {
        let mut iface = Interface::new(Id::new("Window"), Location::builtin("<test>"));
        iface.ext_attrs.push(ExtendedAttribute::new(
            Id::new("PrimaryGlobal"),
            ExtendedAttributeArgs::None,
            Location::builtin("<test>"),
        ));

        assert!(iface.is_global());
        assert!(!iface.is_exposed_conditionally());
    }
}
