//! Cross-definition checks.
//!
//! Validation runs once every production has been finished, so each
//! interface sees the final form of its ancestors, descendants and
//! consequential interfaces. It also settles overload distinguishing
//! indices, which depend on the complete inheritance graph.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace};

use webidl_core::{identifier::Id, location::Location};

use crate::{
    distinguish::is_distinguishable,
    error::{Diagnostic, ErrorCode, Result},
    model::{
        Affects, Attribute, DefinitionId, DependsOn, DictionaryId, Interface, InterfaceId, Member,
        MemberInfo, Method, Model, Production, Type,
    },
};

/// Extended attributes that make an operation conditionally exposed.
const CONDITIONAL_EXPOSURE: &[&str] = &[
    "Exposed",
    "ChromeOnly",
    "Pref",
    "Func",
    "AvailableIn",
    "CheckAnyPermissions",
    "CheckAllPermissions",
];

/// Attributes that restrict exposure to the primary global.
const PRIMARY_ONLY: &[&str] = &["Pref", "CheckAnyPermissions", "CheckAllPermissions"];

pub(crate) fn validate(model: &mut Model, productions: &[Production]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for production in productions {
        let Production::Definition(id) = *production else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        match id {
            DefinitionId::Interface(iface) => {
                assign_distinguishing_indices(model, iface)?;
                validate_interface(model, iface)?;
            }
            DefinitionId::Dictionary(dictionary) => validate_dictionary(model, dictionary)?,
            DefinitionId::Enum(_) | DefinitionId::Callback(_) | DefinitionId::Typedef(_) => {}
        }
    }
    debug!(definitions = seen.len(); "Validated definitions");
    Ok(())
}

/// First argument position at which every pair of overloads callable with
/// `count` arguments is distinguishable.
fn distinguishing_index(model: &Model, method: &Method, count: usize) -> Result<Option<usize>> {
    let candidates = method.overloads_for_arg_count(count);
    if candidates.len() < 2 {
        return Ok(None);
    }
    let valid = |idx: usize| {
        candidates.iter().enumerate().all(|(i, first)| {
            candidates[i + 1..].iter().all(|second| {
                match (first.argument_type(idx), second.argument_type(idx)) {
                    (Some(a), Some(b)) => is_distinguishable(model, a, b),
                    _ => false,
                }
            })
        })
    };
    match (0..count).find(|&idx| valid(idx)) {
        Some(idx) => Ok(Some(idx)),
        None => Err(Diagnostic::error(format!(
            "Signatures with {count} arguments for method '{}' are not distinguishable",
            method.name()
        ))
        .with_code(ErrorCode::E501)
        .with_label(candidates[0].location, "overload")
        .with_secondary_labels(
            candidates[1..].iter().map(|overload| overload.location),
            "overload",
        )),
    }
}

fn distinguishing_indices(model: &Model, method: &Method) -> Result<BTreeMap<usize, usize>> {
    let mut indices = BTreeMap::new();
    for &count in &method.allowed_arg_counts {
        if let Some(idx) = distinguishing_index(model, method, count)? {
            indices.insert(count, idx);
        }
    }
    Ok(indices)
}

fn assign_distinguishing_indices(model: &mut Model, id: InterfaceId) -> Result<()> {
    let iface = model.interface(id);
    let mut member_indices = Vec::new();
    for (position, member) in iface.members.iter().enumerate() {
        if let Member::Method(method) = member {
            if method.has_overloads() {
                member_indices.push((position, distinguishing_indices(model, method)?));
            }
        }
    }
    let ctor_indices = iface
        .ctor
        .as_ref()
        .map(|ctor| distinguishing_indices(model, ctor))
        .transpose()?;
    let named_indices = iface
        .named_constructors
        .iter()
        .map(|ctor| distinguishing_indices(model, ctor))
        .collect::<Result<Vec<_>>>()?;

    let iface = model.interface_mut(id);
    for (position, indices) in member_indices {
        if let Some(method) = iface.members[position].as_method_mut() {
            method.distinguishing_indices = indices;
        }
    }
    if let (Some(ctor), Some(indices)) = (iface.ctor.as_mut(), ctor_indices) {
        ctor.distinguishing_indices = indices;
    }
    for (ctor, indices) in iface.named_constructors.iter_mut().zip(named_indices) {
        ctor.distinguishing_indices = indices;
    }
    Ok(())
}

fn validate_interface(model: &Model, id: InterfaceId) -> Result<()> {
    let iface = model.interface(id);
    trace!(name:% = iface.name(); "Validating interface");

    if iface.ext_attrs.contains("Unforgeable") {
        if iface.is_consequential() {
            return Err(Diagnostic::error(format!(
                "{} is an unforgeable consequential interface",
                iface.name()
            ))
            .with_code(ErrorCode::E406)
            .with_label(iface.location(), "[Unforgeable] interface")
            .with_secondary_labels(
                iface
                    .interfaces_implementing_self
                    .iter()
                    .map(|&other| model.interface(other).location()),
                "implemented here",
            ));
        }
        if iface.has_child_interfaces() {
            return Err(Diagnostic::error(format!(
                "{} is an unforgeable ancestor interface",
                iface.name()
            ))
            .with_code(ErrorCode::E406)
            .with_label(iface.location(), "[Unforgeable] interface")
            .with_secondary_labels(
                iface
                    .interfaces_based_on_self
                    .iter()
                    .map(|&other| model.interface(other))
                    .filter(|other| other.parent == Some(id))
                    .map(Interface::location),
                "inherits from it",
            ));
        }
    }

    for member in &iface.members {
        validate_member(model, member)?;
        if iface.is_callback {
            for name in ["Replaceable", "PutForwards"] {
                if member.is_attr() && member.ext_attrs().contains(name) {
                    return Err(Diagnostic::error(format!(
                        "[{name}] used on an attribute on interface {} which is a callback interface",
                        iface.name()
                    ))
                    .with_code(ErrorCode::E504)
                    .with_label(iface.location(), "callback interface")
                    .with_secondary_label(member.location(), "attribute"));
                }
            }
        }
        if let Member::Attribute(attr) = member {
            check_put_forwards(model, id, attr)?;
        }
        if let Member::Method(method) = member {
            check_aliases(iface, method)?;
        }
    }

    let primary = model.scope.primary_exposure();
    for name in PRIMARY_ONLY {
        if iface.ext_attrs.contains(name) && iface.exposure_global_names != primary {
            return Err(Diagnostic::error(format!(
                "[{name}] used on an interface that is not {}-only",
                model.scope.primary_global_label()
            ))
            .with_code(ErrorCode::E407)
            .with_label(iface.location(), "interface"));
        }
    }

    if iface.is_exposed_conditionally()
        && !iface.has_interface_object()
        && !iface.is_navigator_property()
    {
        return Err(Diagnostic::error(
            "Interface with no interface object is exposed conditionally",
        )
        .with_code(ErrorCode::E407)
        .with_label(iface.location(), "interface"));
    }
    Ok(())
}

/// Follow `[PutForwards]` from attribute to attribute until a target
/// without one is reached.
fn check_put_forwards(model: &Model, id: InterfaceId, start: &Attribute) -> Result<()> {
    let mut owner = model.interface(id).name();
    let mut attr = start;
    let mut visited = BTreeSet::new();

    while let Some(target_name) = attr.info.ext_attrs.value_of("PutForwards") {
        let Some(target_iface) = attr.ty.unroll().as_interface() else {
            return Ok(());
        };
        let forward_iface = model.interface(target_iface.id);
        let forwarded = forward_iface
            .members
            .iter()
            .filter_map(Member::as_attr)
            .find(|member| member.info.name == target_name);

        let Some(forwarded) = forwarded else {
            return Err(Diagnostic::error(format!(
                "Attribute {} on {owner} forwards to missing attribute {target_name}",
                attr.info.name
            ))
            .with_code(ErrorCode::E410)
            .with_label(attr.info.location, "[PutForwards] attribute"));
        };
        let same_as_start = forwarded.info.location == start.info.location
            && forwarded.info.name == start.info.name;
        if same_as_start || !visited.insert((target_iface.id, target_name)) {
            return Err(Diagnostic::error(format!(
                "Cycle detected in forwarded assignments for attribute {} on {}",
                start.info.name,
                model.interface(id).name()
            ))
            .with_code(ErrorCode::E410)
            .with_label(start.info.location, "attribute"));
        }

        owner = forward_iface.name();
        attr = forwarded;
    }
    Ok(())
}

fn check_aliases(iface: &Interface, method: &Method) -> Result<()> {
    let Some(&first_alias) = method.aliases.first() else {
        return Ok(());
    };
    let alias_error = |message: String| {
        Diagnostic::error(message)
            .with_code(ErrorCode::E411)
            .with_label(method.location(), "operation")
    };
    let restriction = if iface.is_on_global_proto_chain {
        Some("a [Global] interface operation")
    } else if CONDITIONAL_EXPOSURE
        .iter()
        .any(|name| method.info.ext_attrs.contains(name))
    {
        Some("a conditionally exposed operation")
    } else if method.is_static {
        Some("a static operation")
    } else if method.is_identifierless() {
        Some("an identifierless operation")
    } else if method.unforgeable {
        Some("an [Unforgeable] operation")
    } else {
        None
    };
    if let Some(restriction) = restriction {
        return Err(alias_error(format!(
            "[Alias] must not be used on {restriction}"
        ))
        .with_help(format!("alias `{first_alias}` declared here")));
    }

    for &alias in &method.aliases {
        for member in &iface.members {
            if member.name() == alias {
                return Err(alias_error(format!(
                    "[Alias={alias}] has same name as interface member"
                ))
                .with_secondary_label(member.location(), "member"));
            }
            if let Member::Method(other) = member {
                if !std::ptr::eq(other, method) && other.aliases.contains(&alias) {
                    return Err(alias_error(format!("duplicate [Alias={alias}] definitions"))
                        .with_secondary_label(other.location(), "other definition"));
                }
            }
        }
    }
    Ok(())
}

fn validate_member(model: &Model, member: &Member) -> Result<()> {
    let info = member.info();
    let primary = model.scope.primary_exposure();
    if let Some(name) = PRIMARY_ONLY
        .iter()
        .find(|name| info.ext_attrs.contains(name))
    {
        if info.exposure_set != primary {
            return Err(Diagnostic::error(format!(
                "[{name}] used on an interface member that is not {}-only",
                model.scope.primary_global_label()
            ))
            .with_code(ErrorCode::E407)
            .with_label(info.location, "member"));
        }
    }

    if (member.is_attr() || member.is_method())
        && info.affects == Affects::Everything
        && info.depends_on != DependsOn::Everything
    {
        return Err(Diagnostic::error(
            "Interface member is flagged as affecting everything but not depending on everything.  That seems rather unlikely.",
        )
        .with_code(ErrorCode::E506)
        .with_label(info.location, "member"));
    }
    if info.ext_attrs.contains("NewObject")
        && matches!(info.depends_on, DependsOn::Nothing | DependsOn::DOMState)
    {
        return Err(Diagnostic::error(
            "A [NewObject] method is not idempotent, so it has to depend on something other than DOM state.",
        )
        .with_code(ErrorCode::E506)
        .with_label(info.location, "member"));
    }

    match member {
        Member::Attribute(attr) => validate_attribute(model, attr),
        Member::Method(method) => validate_method(model, method),
        Member::Const(_) | Member::MaplikeOrSetlike(_) => Ok(()),
    }
}

/// Whether every interface `ty` mentions is exposed at least wherever
/// `exposure_set` reaches.
fn is_exposed_in_all_of(model: &Model, ty: &Type, exposure_set: &BTreeSet<Id>) -> bool {
    let ty = ty.unroll();
    if let Some(union) = ty.as_union() {
        return union
            .flat_members
            .iter()
            .all(|member| is_exposed_in_all_of(model, member, exposure_set));
    }
    let Some(iface) = ty.as_interface() else {
        return true;
    };
    let exposed = model
        .interface(iface.id)
        .exposure_set
        .is_superset(exposure_set);
    exposed
        && iface
            .promise_inner
            .as_deref()
            .is_none_or(|inner| is_exposed_in_all_of(model, inner, exposure_set))
}

fn validate_attribute(model: &Model, attr: &Attribute) -> Result<()> {
    let info = &attr.info;
    let invalid = |message: &str, code: ErrorCode| {
        Diagnostic::error(message)
            .with_code(code)
            .with_label(info.location, "attribute")
    };

    if (info.ext_attrs.contains("Cached") || info.ext_attrs.contains("StoreInSlot"))
        && info.affects != Affects::Nothing
    {
        return Err(invalid(
            "Cached attributes and attributes stored in slots must be [Constant] or [Pure] or [Affects=Nothing], since the getter won't always be called.",
            ErrorCode::E504,
        ));
    }
    if info.ext_attrs.contains("Frozen")
        && !attr.ty.is_sequence()
        && !attr.ty.is_dictionary()
        && !attr.ty.is_mozmap()
    {
        return Err(invalid(
            "[Frozen] is only allowed on sequence-valued, dictionary-valued, and MozMap-valued attributes",
            ErrorCode::E504,
        ));
    }
    if !is_exposed_in_all_of(model, &attr.ty, &info.exposure_set) {
        return Err(invalid(
            "Attribute returns a type that is not exposed everywhere where the attribute is exposed",
            ErrorCode::E407,
        ));
    }
    Ok(())
}

/// A dictionary with no required members anywhere in its ancestry accepts
/// `undefined`.
fn dictionary_can_be_empty(model: &Model, id: DictionaryId) -> bool {
    let mut visited = BTreeSet::new();
    let mut current = Some(id);
    while let Some(id) = current {
        if !visited.insert(id) {
            break;
        }
        let dictionary = model.dictionary(id);
        if dictionary.members.iter().any(|member| !member.optional) {
            return false;
        }
        current = dictionary.parent;
    }
    true
}

fn has_possibly_empty_dictionary(model: &Model, ty: &Type) -> bool {
    if let Some(id) = ty.as_dictionary() {
        return dictionary_can_be_empty(model, id);
    }
    ty.as_union().is_some_and(|union| {
        union
            .flat_members
            .iter()
            .filter_map(Type::as_dictionary)
            .any(|id| dictionary_can_be_empty(model, id))
    })
}

fn validate_method(model: &Model, method: &Method) -> Result<()> {
    let name = method.name();
    let info: &MemberInfo = &method.info;

    for (&count, &distinguishing) in &method.distinguishing_indices {
        let candidates = method.overloads_for_arg_count(count);
        let Some((first, rest)) = candidates.split_first() else {
            continue;
        };
        for idx in 0..distinguishing {
            if let Some(overload) = rest
                .iter()
                .find(|overload| overload.argument_type(idx) != first.argument_type(idx))
            {
                return Err(Diagnostic::error(format!(
                    "Signatures for method '{name}' with {count} arguments have different types of arguments at index {idx}, which is before distinguishing index {distinguishing}"
                ))
                .with_code(ErrorCode::E501)
                .with_label(method.location(), "method")
                .with_secondary_label(overload.location, "overload"));
            }
        }
    }

    let mut with_promise = None;
    let mut without_promise = None;
    for overload in &method.overloads {
        if !is_exposed_in_all_of(model, &overload.return_type, &info.exposure_set) {
            return Err(Diagnostic::error(
                "Overload returns a type that is not exposed everywhere where the method is exposed",
            )
            .with_code(ErrorCode::E407)
            .with_label(overload.location, "overload"));
        }

        let mut variadic = None;
        for (idx, argument) in overload.arguments.iter().enumerate() {
            if has_possibly_empty_dictionary(model, &argument.ty) {
                let trailing_optional = overload.arguments[idx + 1..]
                    .iter()
                    .all(|later| later.optional);
                if !argument.optional && trailing_optional {
                    return Err(Diagnostic::error(
                        "Dictionary argument or union argument containing a dictionary not followed by a required argument must be optional",
                    )
                    .with_code(ErrorCode::E502)
                    .with_label(argument.location, "argument"));
                }
                if argument.ty.nullable() {
                    return Err(Diagnostic::error(
                        "An argument cannot be a nullable dictionary or nullable union containing a dictionary",
                    )
                    .with_code(ErrorCode::E502)
                    .with_label(argument.location, "argument"));
                }
            }
            if let Some(location) = variadic {
                return Err(Diagnostic::error("Variadic argument is not last argument")
                    .with_code(ErrorCode::E502)
                    .with_label(location, "variadic argument"));
            }
            if argument.variadic {
                variadic = Some(argument.location);
            }
        }

        if overload.return_type.is_promise() {
            with_promise = Some(overload.location);
        } else {
            without_promise = Some(overload.location);
        }
    }

    if let (Some(promise), Some(other)) = (with_promise, without_promise) {
        return Err(Diagnostic::error(
            "We have overloads with both Promise and non-Promise return types",
        )
        .with_code(ErrorCode::E204)
        .with_label(promise, "returns a Promise")
        .with_secondary_label(other, "does not return a Promise"));
    }
    if let (Some(promise), true) = (with_promise, method.special.legacycaller) {
        return Err(Diagnostic::error("May not have a Promise return type for a legacycaller.")
            .with_code(ErrorCode::E500)
            .with_label(promise, "legacycaller"));
    }
    if info.ext_attrs.contains("StaticClassOverride") {
        let js_implemented = info
            .originating_interface
            .is_some_and(|iface| model.interface(iface).is_js_implemented());
        if !(js_implemented && method.is_static) {
            return Err(Diagnostic::error(
                "StaticClassOverride can be applied to static methods on JS-implemented classes only.",
            )
            .with_code(ErrorCode::E504)
            .with_label(info.location, "method"));
        }
    }
    Ok(())
}

fn validate_dictionary(model: &Model, id: DictionaryId) -> Result<()> {
    let dictionary = model.dictionary(id);
    for member in &dictionary.members {
        if member.ty.is_dictionary() && member.ty.nullable() {
            return Err(Diagnostic::error(format!(
                "Dictionary {} has member with nullable dictionary type",
                dictionary.name()
            ))
            .with_code(ErrorCode::E604)
            .with_label(member.location, "member"));
        }
        let mut path = Vec::new();
        let mut visited = BTreeSet::new();
        if type_contains_dictionary(model, &member.ty, id, &mut visited, &mut path) {
            return Err(Diagnostic::error(format!(
                "Dictionary {} has member with itself as type.",
                dictionary.name()
            ))
            .with_code(ErrorCode::E600)
            .with_label(member.location, "member")
            .with_secondary_labels(path, "through here"));
        }
    }
    Ok(())
}

fn type_contains_dictionary(
    model: &Model,
    ty: &Type,
    target: DictionaryId,
    visited: &mut BTreeSet<DictionaryId>,
    path: &mut Vec<Location>,
) -> bool {
    match ty {
        Type::Nullable(inner) | Type::Array(inner) | Type::Sequence(inner) | Type::MozMap(inner) => {
            type_contains_dictionary(model, inner, target, visited, path)
        }
        Type::Dictionary(named) => {
            named.id == target || dictionary_contains_dictionary(model, named.id, target, visited, path)
        }
        Type::Union(union) => union
            .flat_members
            .iter()
            .any(|member| type_contains_dictionary(model, member, target, visited, path)),
        _ => false,
    }
}

fn dictionary_contains_dictionary(
    model: &Model,
    id: DictionaryId,
    target: DictionaryId,
    visited: &mut BTreeSet<DictionaryId>,
    path: &mut Vec<Location>,
) -> bool {
    if !visited.insert(id) {
        return false;
    }
    let dictionary = model.dictionary(id);
    for member in &dictionary.members {
        if type_contains_dictionary(model, &member.ty, target, visited, path) {
            path.insert(0, member.location);
            return true;
        }
    }
    match dictionary.parent {
        Some(parent) if parent == target => {
            path.insert(0, dictionary.location());
            true
        }
        Some(parent) => {
            let contains = dictionary_contains_dictionary(model, parent, target, visited, path);
            if contains {
                path.insert(0, dictionary.location());
            }
            contains
        }
        None => false,
    }
}
