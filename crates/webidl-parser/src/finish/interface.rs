//! Finishing a single interface.
//!
//! An interface is finished after its parent and every interface it
//! implements, so everything it imports is already in final form.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace};

use crate::{
    attributes,
    error::{Diagnostic, ErrorCode, Result},
    model::{Interface, InterfaceId, Member, Model, NamedOrIndexed},
};

use super::{maplike, members, resolve_exposure};

pub(crate) fn finish_interface(model: &mut Model, id: InterfaceId) -> Result<()> {
    if model.interface(id).finished {
        return Ok(());
    }
    model.interface_mut(id).finished = true;
    debug!(name:% = model.interface(id).name(); "Finishing interface");

    check_declared(model, id)?;
    finish_exposure(model, id)?;
    merge_partials(model, id)?;
    maplike::expand(model, id)?;
    default_member_exposure(model.interface_mut(id));
    finish_parent(model, id)?;
    for implemented in model.interface(id).implemented.clone() {
        finish_interface(model, implemented)?;
    }
    check_maplike_collisions(model, id)?;
    finish_members(model, id)?;
    import_consequential(model, id)?;
    register_with_ancestors(model, id)?;
    check_unforgeable(model.interface(id))?;
    mark_originating_interface(model.interface_mut(id), id);
    assign_slots(model.interface_mut(id));
    inherit_unforgeables(model, id)?;
    check_special_members(model.interface(id))?;
    propagate_global(model, id)
}

fn check_declared(model: &Model, id: InterfaceId) -> Result<()> {
    let iface = model.interface(id);
    if iface.is_known_non_partial {
        return Ok(());
    }
    if iface.partials.is_empty() {
        if let Some(location) = iface.forward_declaration {
            return Err(Diagnostic::error(format!(
                "Interface {} is forward-declared but never defined; external interfaces are not supported",
                iface.name()
            ))
            .with_code(ErrorCode::E203)
            .with_label(location, "forward declaration"));
        }
    }
    Err(Diagnostic::error(format!(
        "Interface {} does not have a non-partial declaration",
        iface.name()
    ))
    .with_code(ErrorCode::E400)
    .with_label(iface.location(), "first mentioned here")
    .with_secondary_labels(
        iface
            .partials
            .iter()
            .map(|&partial| model.partial(partial).location()),
        "partial interface",
    ))
}

fn finish_exposure(model: &mut Model, id: InterfaceId) -> Result<()> {
    let location = model.interface(id).location();
    let mut names = std::mem::take(&mut model.interface_mut(id).exposure_global_names);
    let exposure_set = resolve_exposure(&model.scope, &mut names, location)?;

    let iface = model.interface_mut(id);
    iface.exposure_global_names = names;
    iface.exposure_set = exposure_set;
    Ok(())
}

fn merge_partials(model: &mut Model, id: InterfaceId) -> Result<()> {
    for partial in model.interface(id).partials.clone() {
        let propagated = std::mem::take(&mut model.partial_mut(partial).propagated_ext_attrs);
        attributes::apply_to_interface(model, id, propagated)?;
        let members = model.partial(partial).members.clone();
        trace!(members = members.len(); "Merging partial interface");
        model.interface_mut(id).members.extend(members);
    }
    Ok(())
}

/// Members without `[Exposed]` of their own, or of the partial they came
/// from, are exposed wherever the interface is.
fn default_member_exposure(iface: &mut Interface) {
    for member in &mut iface.members {
        let info = member.info_mut();
        if info.exposure_global_names.is_empty() {
            info.exposure_global_names = iface.exposure_global_names.clone();
        }
    }
}

fn finish_parent(model: &mut Model, id: InterfaceId) -> Result<()> {
    let Some(parent_id) = model.interface(id).parent else {
        return Ok(());
    };
    finish_interface(model, parent_id)?;

    let iface = model.interface(id);
    let parent = model.interface(parent_id);
    let labelled = |message: String, code: ErrorCode| {
        Diagnostic::error(message)
            .with_code(code)
            .with_label(iface.location(), "interface")
            .with_secondary_label(parent.location(), "parent interface")
    };

    if parent.is_global() {
        return Err(labelled(
            "[Global] interface has another interface inheriting from it".to_string(),
            ErrorCode::E405,
        ));
    }
    if !iface.exposure_set.is_subset(&parent.exposure_set) {
        return Err(labelled(
            format!(
                "Interface {} is exposed in globals where its parent interface {} is not exposed.",
                iface.name(),
                parent.name()
            ),
            ErrorCode::E407,
        ));
    }
    if iface.is_callback && !parent.is_callback {
        return Err(labelled(
            format!(
                "Callback interface {} inheriting from non-callback interface {}",
                iface.name(),
                parent.name()
            ),
            ErrorCode::E401,
        ));
    }
    if !iface.is_callback && parent.is_callback {
        return Err(labelled(
            format!(
                "Non-callback interface {} inheriting from callback interface {}",
                iface.name(),
                parent.name()
            ),
            ErrorCode::E401,
        ));
    }
    if parent.ext_attrs.contains("NoInterfaceObject")
        && !iface.ext_attrs.contains("NoInterfaceObject")
    {
        return Err(labelled(
            format!(
                "Interface {} does not have [NoInterfaceObject] but inherits from interface {} which does",
                iface.name(),
                parent.name()
            ),
            ErrorCode::E401,
        ));
    }

    let total = parent.total_members_in_slots;
    model.interface_mut(parent_id).has_child_interfaces = true;
    model.interface_mut(id).total_members_in_slots = total;
    Ok(())
}

/// Parent, grandparent and so on.
fn ancestors(model: &Model, id: InterfaceId) -> Vec<InterfaceId> {
    let mut chain = Vec::new();
    let mut current = model.interface(id).parent;
    while let Some(ancestor) = current {
        chain.push(ancestor);
        current = model.interface(ancestor).parent;
    }
    chain
}

/// Every interface whose members `id` imports: the interfaces it
/// implements, their ancestors and, recursively, their own consequential
/// interfaces.
fn consequential_interfaces(model: &Model, id: InterfaceId) -> BTreeSet<InterfaceId> {
    let mut found = BTreeSet::new();
    let mut stack = model.interface(id).implemented.clone();
    while let Some(next) = stack.pop() {
        if found.insert(next) {
            let iface = model.interface(next);
            stack.extend(iface.parent);
            stack.extend(iface.implemented.iter().copied());
        }
    }
    found
}

fn check_maplike_collisions(model: &Model, id: InterfaceId) -> Result<()> {
    let iface = model.interface(id);
    let Some(decl) = iface.maplike_or_setlike() else {
        return Ok(());
    };
    maplike::check_collisions(decl, &iface.members, false)?;
    for ancestor in ancestors(model, id) {
        maplike::check_collisions(decl, &model.interface(ancestor).members, true)?;
    }
    Ok(())
}

fn finish_members(model: &mut Model, id: InterfaceId) -> Result<()> {
    let iface = model.interface_mut(id);
    let name = iface.name();
    let unresolved = std::mem::take(&mut iface.members);
    let mut ctor = iface.ctor.take();
    let mut named_constructors = std::mem::take(&mut iface.named_constructors);
    let exposure_global_names = iface.exposure_global_names.clone();

    let mut resolved = members::resolve(name, unresolved)?;
    for member in &mut resolved {
        members::finish_member(model, member)?;
    }
    for constructor in ctor.iter_mut().chain(named_constructors.iter_mut()) {
        members::finish_constructor(model, constructor, &exposure_global_names)?;
    }

    let iface = model.interface_mut(id);
    if let Some(member) = resolved
        .iter()
        .find(|member| !member.info().exposure_set.is_subset(&iface.exposure_set))
    {
        return Err(Diagnostic::error(
            "Interface member has larger exposure set than the interface itself",
        )
        .with_code(ErrorCode::E407)
        .with_label(member.location(), "member")
        .with_secondary_label(iface.location(), "interface"));
    }
    iface.members = resolved;
    iface.ctor = ctor;
    iface.named_constructors = named_constructors;
    Ok(())
}

fn import_consequential(model: &mut Model, id: InterfaceId) -> Result<()> {
    let own = model.interface(id).members.clone();
    model.interface_mut(id).original_members = own;

    let mut consequential: Vec<InterfaceId> = consequential_interfaces(model, id).into_iter().collect();
    consequential.sort_by_key(|&other| model.interface(other).name().as_string());

    for other_id in consequential {
        let iface = model.interface(id);
        let other = model.interface(other_id);
        if !iface.exposure_set.is_subset(&other.exposure_set) {
            return Err(Diagnostic::error(format!(
                "Interface {} is exposed in globals where its consequential interface {} is not exposed.",
                iface.name(),
                other.name()
            ))
            .with_code(ErrorCode::E407)
            .with_label(iface.location(), "interface")
            .with_secondary_label(other.location(), "consequential interface"));
        }
        if iface.maplike_or_setlike.is_some() && other.maplike_or_setlike.is_some() {
            return Err(Diagnostic::error(format!(
                "Maplike/setlike interface {} cannot have maplike/setlike interface {} as a consequential interface",
                iface.name(),
                other.name()
            ))
            .with_code(ErrorCode::E408)
            .with_label(iface.location(), "interface")
            .with_secondary_label(other.location(), "consequential interface"));
        }
        if let Some((imported, existing)) = other.original_members.iter().find_map(|imported| {
            iface
                .members
                .iter()
                .find(|member| member.name() == imported.name())
                .map(|existing| (imported, existing))
        }) {
            return Err(Diagnostic::error(format!(
                "Multiple definitions of {} on {} coming from 'implements' statements",
                existing.name(),
                iface.name()
            ))
            .with_code(ErrorCode::E409)
            .with_label(existing.location(), "defined here")
            .with_secondary_label(imported.location(), "imported definition"));
        }

        let imported = other.original_members.clone();
        trace!(from:% = other.name(), members = imported.len(); "Importing consequential members");
        model.interface_mut(id).members.extend(imported);

        let other = model.interface_mut(other_id);
        other.consequential = true;
        other.interfaces_based_on_self.insert(id);
        other.interfaces_implementing_self.insert(id);
    }
    Ok(())
}

fn register_with_ancestors(model: &mut Model, id: InterfaceId) -> Result<()> {
    for ancestor_id in ancestors(model, id) {
        let iface = model.interface(id);
        let ancestor = model.interface(ancestor_id);
        if iface.maplike_or_setlike.is_some() && ancestor.maplike_or_setlike.is_some() {
            return Err(Diagnostic::error(format!(
                "Cannot have maplike/setlike on {} that inherits {}, which is already maplike/setlike",
                iface.name(),
                ancestor.name()
            ))
            .with_code(ErrorCode::E408)
            .with_label(iface.location(), "interface")
            .with_secondary_label(ancestor.location(), "ancestor"));
        }

        let ancestor_consequential = consequential_interfaces(model, ancestor_id);
        model.interface_mut(ancestor_id).interfaces_based_on_self.insert(id);
        for other in ancestor_consequential {
            model.interface_mut(other).interfaces_based_on_self.insert(id);
        }
    }
    Ok(())
}

/// Code generation adds its own `toJSON` and `valueOf` to `[Unforgeable]`
/// interfaces and reuses their stringifier.
fn check_unforgeable(iface: &Interface) -> Result<()> {
    if !iface.ext_attrs.contains("Unforgeable") {
        return Ok(());
    }
    let methods = || iface.members.iter().filter_map(Member::as_method);
    let unforgeable_error = |problem: &str| {
        Diagnostic::error(format!("Unforgeable interface {} {problem}", iface.name()))
            .with_code(ErrorCode::E406)
            .with_label(iface.location(), "[Unforgeable] interface")
    };

    if !methods().any(|method| method.special.stringifier) {
        return Err(unforgeable_error("does not have a stringifier"));
    }
    if let Some(method) =
        methods().find(|method| method.special.jsonifier || method.name() == "toJSON")
    {
        return Err(unforgeable_error(
            "has a jsonifier so we won't be able to add one ourselves",
        )
        .with_secondary_label(method.location(), "jsonifier"));
    }
    if let Some(method) = methods().find(|method| !method.is_static && method.name() == "valueOf") {
        return Err(unforgeable_error(
            "has a valueOf member so we won't be able to add one ourselves",
        )
        .with_secondary_label(method.location(), "valueOf"));
    }
    Ok(())
}

fn mark_originating_interface(iface: &mut Interface, id: InterfaceId) {
    for member in iface.members.iter_mut().chain(iface.original_members.iter_mut()) {
        if (member.is_attr() || member.is_method()) && member.is_unforgeable() {
            let info = member.info_mut();
            info.originating_interface.get_or_insert(id);
        }
    }
}

fn assign_slots(iface: &mut Interface) {
    let mut total = iface.total_members_in_slots;
    let mut own = iface.own_members_in_slots;
    for member in &mut iface.members {
        match member {
            Member::Attribute(attr)
                if attr.info.ext_attrs.contains("StoreInSlot")
                    || attr.info.ext_attrs.contains("Cached") =>
            {
                attr.slot_index = Some(total);
                total += 1;
                if attr.info.ext_attrs.contains("StoreInSlot") {
                    own += 1;
                }
            }
            Member::MaplikeOrSetlike(decl) => {
                decl.slot_index = Some(total);
                total += 1;
            }
            _ => {}
        }
    }
    iface.total_members_in_slots = total;
    iface.own_members_in_slots = own;
}

/// The parent already carries its own ancestors' unforgeable members, so
/// only one level is pulled down.
fn inherit_unforgeables(model: &mut Model, id: InterfaceId) -> Result<()> {
    let Some(parent_id) = model.interface(id).parent else {
        return Ok(());
    };
    let parent = model.interface(parent_id);
    let iface = model.interface(id);
    let mut inherited = Vec::new();

    for unforgeable in parent
        .members
        .iter()
        .filter(|member| (member.is_attr() || member.is_method()) && member.is_unforgeable())
    {
        let shadows: Vec<_> = iface
            .members
            .iter()
            .filter(|member| {
                (member.is_attr() || member.is_method())
                    && !member.is_static()
                    && member.name() == unforgeable.name()
            })
            .map(Member::location)
            .collect();
        if !shadows.is_empty() {
            return Err(Diagnostic::error(format!(
                "Interface {} shadows [Unforgeable] members of {}",
                iface.name(),
                parent.name()
            ))
            .with_code(ErrorCode::E406)
            .with_label(unforgeable.location(), "[Unforgeable] member")
            .with_secondary_labels(shadows, "shadowed here"));
        }
        inherited.push(unforgeable.clone());
    }

    model.interface_mut(id).members.extend(inherited);
    Ok(())
}

fn special_category(member: &Member) -> Option<String> {
    let method = member.as_method()?;
    let special = &method.special;
    let category = if special.getter {
        "getters"
    } else if special.setter {
        "setters"
    } else if special.creator {
        "creators"
    } else if special.deleter {
        "deleters"
    } else if special.stringifier {
        return Some("stringifiers".to_string());
    } else if special.jsonifier {
        return Some("jsonifiers".to_string());
    } else if special.legacycaller {
        return Some("legacycallers".to_string());
    } else {
        return None;
    };
    let key = if method.is_named_or_indexed(NamedOrIndexed::Named) {
        NamedOrIndexed::Named
    } else {
        NamedOrIndexed::Indexed
    };
    Some(format!("{key} {category}"))
}

fn check_special_members(iface: &Interface) -> Result<()> {
    let mut seen = BTreeMap::new();
    for member in &iface.members {
        let Some(category) = special_category(member) else {
            continue;
        };
        if let Some(first) = seen.insert(category.clone(), member.location()) {
            return Err(Diagnostic::error(format!(
                "Multiple {category} on {}",
                iface.name()
            ))
            .with_code(ErrorCode::E404)
            .with_label(iface.location(), "interface")
            .with_secondary_label(first, "first declared here")
            .with_secondary_label(member.location(), "declared again here"));
        }
    }
    Ok(())
}

fn propagate_global(model: &mut Model, id: InterfaceId) -> Result<()> {
    let iface = model.interface(id);
    if !iface.is_on_global_proto_chain {
        return Ok(());
    }
    let global_error = |message: String, location| {
        Diagnostic::error(message)
            .with_code(ErrorCode::E405)
            .with_label(location, "global interface")
    };

    for method in iface.members.iter().filter_map(Member::as_method) {
        if !method.is_named_or_indexed(NamedOrIndexed::Named) {
            continue;
        }
        let kind = if method.special.setter {
            "setter"
        } else if method.special.creator {
            "creator"
        } else if method.special.deleter {
            "deleter"
        } else {
            continue;
        };
        return Err(global_error(
            format!("Interface with [Global] has a named {kind}"),
            iface.location(),
        )
        .with_secondary_label(method.location(), kind));
    }
    if iface.ext_attrs.contains("OverrideBuiltins") {
        return Err(global_error(
            "Interface with [Global] also has [OverrideBuiltins]".to_string(),
            iface.location(),
        ));
    }

    let location = iface.location();
    for ancestor in ancestors(model, id) {
        let ancestor_iface = model.interface_mut(ancestor);
        if ancestor_iface.ext_attrs.contains("OverrideBuiltins") {
            return Err(global_error(
                "Interface with [Global] inherits from interface with [OverrideBuiltins]"
                    .to_string(),
                location,
            )
            .with_secondary_label(ancestor_iface.location(), "[OverrideBuiltins] interface"));
        }
        ancestor_iface.is_on_global_proto_chain = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use webidl_core::identifier::Id;

    use super::*;
    use crate::{finish::tests::finished, scope::Binding};

    fn iface<'m>(model: &'m Model, name: &str) -> (InterfaceId, &'m Interface) {
        match model.scope.lookup(Id::new(name)) {
            Some(Binding::Interface(id)) => (id, model.interface(id)),
            other => panic!("{name} is not an interface: {other:?}"),
        }
    }

    fn names(iface: &Interface) -> Vec<String> {
        iface.members().iter().map(|m| m.name().as_string()).collect()
    }

    #[test]
    fn test_partials_merge_in_order() {
        let model = finished(
            "partial interface A { void early(); };
             interface A { attribute long own; };
             partial interface A { const long LATE = 1; };",
        )
        .unwrap();
        assert_eq!(names(iface(&model, "A").1), ["own", "early", "LATE"]);
    }

    #[test]
    fn test_partial_without_interface() {
        let err = finished("partial interface Lost { void f(); };").unwrap_err();
        assert_eq!(
            err.message(),
            "Interface Lost does not have a non-partial declaration"
        );
        assert_eq!(err.code(), Some(ErrorCode::E400));
    }

    #[test]
    fn test_forward_declaration_only() {
        let err = finished("interface Ext; interface A { attribute Ext e; };").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E203));
    }

    #[test]
    fn test_consequential_members_are_imported() {
        let model = finished(
            "interface Base { void fromBase(); };
             interface Mixin : Base { void fromMixin(); };
             interface A { void own(); };
             A implements Mixin;",
        )
        .unwrap();
        let (a_id, a) = iface(&model, "A");
        let (_, mixin) = iface(&model, "Mixin");
        let (_, base) = iface(&model, "Base");

        assert_eq!(names(a), ["own", "fromBase", "fromMixin"]);
        assert_eq!(a.original_members().len(), 1);
        assert!(mixin.is_consequential());
        assert!(base.is_consequential());
        assert!(mixin.interfaces_implementing_self().contains(&a_id));
        assert!(base.interfaces_based_on_self().contains(&a_id));
    }

    #[test]
    fn test_consequential_name_clash() {
        let err = finished(
            "interface Mixin { void f(); }; interface A { void f(); }; A implements Mixin;",
        )
        .unwrap_err();
        assert_eq!(
            err.message(),
            "Multiple definitions of f on A coming from 'implements' statements"
        );
    }

    #[test]
    fn test_descendants_are_based_on_ancestors() {
        let model = finished(
            "interface Base {}; interface Mid : Base {}; interface Leaf : Mid {};",
        )
        .unwrap();
        let (leaf, _) = iface(&model, "Leaf");
        let (mid, _) = iface(&model, "Mid");
        let (base_id, base) = iface(&model, "Base");

        assert!(base.has_child_interfaces());
        assert_eq!(
            base.interfaces_based_on_self().iter().copied().collect::<Vec<_>>(),
            {
                let mut expected = vec![base_id, mid, leaf];
                expected.sort();
                expected
            }
        );
    }

    #[test]
    fn test_parent_rules() {
        let err = finished("callback interface C {}; interface A : C {};").unwrap_err();
        assert_eq!(
            err.message(),
            "Non-callback interface A inheriting from callback interface C"
        );

        let err = finished("[NoInterfaceObject] interface P {}; interface A : P {};").unwrap_err();
        assert!(err.message().contains("does not have [NoInterfaceObject]"));

        let err = finished("[Global] interface G {}; interface A : G {};").unwrap_err();
        assert_eq!(
            err.message(),
            "[Global] interface has another interface inheriting from it"
        );
    }

    #[test]
    fn test_exposure_narrower_than_parent() {
        let err = finished(
            "[PrimaryGlobal] interface Window {};
             [Global] interface Worker {};
             interface Base {};
             [Exposed=(Window, Worker)] interface Derived : Base {};",
        )
        .unwrap_err();
        assert_eq!(
            err.message(),
            "Interface Derived is exposed in globals where its parent interface Base is not exposed."
        );
    }

    #[test]
    fn test_member_exposure_wider_than_interface() {
        let err = finished(
            "[PrimaryGlobal] interface Window {};
             [Global] interface Worker {};
             interface A { [Exposed=Worker] void f(); };",
        )
        .unwrap_err();
        assert_eq!(
            err.message(),
            "Interface member has larger exposure set than the interface itself"
        );
    }

    #[test]
    fn test_slots_continue_from_parent() {
        let model = finished(
            "interface Base { [StoreInSlot, Pure] readonly attribute long a; };
             interface Derived : Base {
               [Cached, Pure] readonly attribute long b;
               [StoreInSlot, Pure] readonly attribute long c;
             };",
        )
        .unwrap();
        let (_, derived) = iface(&model, "Derived");
        let slot = |name: &str| derived.member(Id::new(name)).unwrap().as_attr().unwrap().slot_index;

        assert_eq!(slot("b"), Some(1));
        assert_eq!(slot("c"), Some(2));
        assert_eq!(derived.total_members_in_slots(), 3);
        assert_eq!(derived.own_members_in_slots(), 1);
    }

    #[test]
    fn test_unforgeable_members_are_inherited() {
        let model = finished(
            "interface Base { [Unforgeable] readonly attribute long id; };
             interface Derived : Base {};",
        )
        .unwrap();
        let (base_id, _) = iface(&model, "Base");
        let (_, derived) = iface(&model, "Derived");
        let inherited = derived.member(Id::new("id")).unwrap();

        assert_eq!(inherited.info().originating_interface, Some(base_id));

        let err = finished(
            "interface Base { [Unforgeable] readonly attribute long id; };
             interface Derived : Base { void id(); };",
        )
        .unwrap_err();
        assert_eq!(
            err.message(),
            "Interface Derived shadows [Unforgeable] members of Base"
        );
    }

    #[test]
    fn test_unforgeable_interface_rules() {
        let err = finished("[Unforgeable] interface A { };").unwrap_err();
        assert_eq!(
            err.message(),
            "Unforgeable interface A does not have a stringifier"
        );

        let err = finished("[Unforgeable] interface A { stringifier; object valueOf(); };")
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E406));

        assert!(finished("[Unforgeable] interface A { stringifier; };").is_ok());
    }

    #[test]
    fn test_duplicate_special_members() {
        let err = finished(
            "interface A {
               getter long (unsigned long index);
               getter long item(unsigned long index);
             };",
        )
        .unwrap_err();
        assert_eq!(err.message(), "Multiple indexed getters on A");
        assert_eq!(err.labels().len(), 3);

        assert!(
            finished(
                "interface A {
                   getter long (unsigned long index);
                   getter long (DOMString name);
                 };"
            )
            .is_ok()
        );
    }

    #[test]
    fn test_global_proto_chain() {
        let model = finished(
            "interface EventTarget {};
             interface GlobalBase : EventTarget {};
             [PrimaryGlobal] interface Window : GlobalBase {};",
        )
        .unwrap();
        assert!(iface(&model, "EventTarget").1.is_on_global_proto_chain());
        assert!(iface(&model, "GlobalBase").1.is_on_global_proto_chain());

        let err = finished(
            "[PrimaryGlobal] interface Window { setter void (DOMString name, any value); };",
        )
        .unwrap_err();
        assert_eq!(err.message(), "Interface with [Global] has a named setter");

        let err = finished(
            "[OverrideBuiltins] interface Base {}; [PrimaryGlobal] interface Window : Base {};",
        )
        .unwrap_err();
        assert_eq!(
            err.message(),
            "Interface with [Global] inherits from interface with [OverrideBuiltins]"
        );
    }
}
