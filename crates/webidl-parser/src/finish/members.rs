//! Resolution and finishing of interface members.

use std::collections::BTreeSet;

use log::trace;

use webidl_core::identifier::Id;

use crate::{
    complete::{complete_argument, complete_type},
    error::{Diagnostic, ErrorCode, Result},
    model::{Attribute, Const, MaplikeOrSetlike, Member, MemberInfo, Method, Model},
    scope,
};

use super::resolve_exposure;

/// Bind members by name inside the interface: a method declared twice
/// gains an overload, anything else declared twice is an error.
pub(super) fn resolve(interface_name: Id, members: Vec<Member>) -> Result<Vec<Member>> {
    let scope_name = format!("::{interface_name}::");
    let mut resolved: Vec<Member> = Vec::with_capacity(members.len());

    for member in members {
        let Some(idx) = resolved.iter().position(|seen| seen.name() == member.name()) else {
            resolved.push(member);
            continue;
        };
        match (&mut resolved[idx], member) {
            (Member::Method(existing), Member::Method(overload)) => {
                trace!(name:% = existing.name(); "Merging overload");
                existing.add_overload(overload)?;
            }
            (existing, member) => {
                return Err(scope::multiple_definitions(
                    member.name(),
                    &scope_name,
                    member.location(),
                    existing.location(),
                ));
            }
        }
    }
    Ok(resolved)
}

pub(super) fn finish_member(model: &Model, member: &mut Member) -> Result<()> {
    finish_exposure(model, member.info_mut())?;
    match member {
        Member::Const(constant) => finish_const(model, constant),
        Member::Attribute(attribute) => finish_attribute(model, attribute),
        Member::Method(method) => finish_method(model, method),
        Member::MaplikeOrSetlike(decl) => finish_maplike(model, decl),
    }
}

fn finish_exposure(model: &Model, info: &mut MemberInfo) -> Result<()> {
    info.exposure_set = resolve_exposure(&model.scope, &mut info.exposure_global_names, info.location)?;
    Ok(())
}

fn finish_const(model: &Model, constant: &mut Const) -> Result<()> {
    let location = constant.info.location;
    constant.ty = complete_type(model, &constant.ty, location)?;
    if !constant.ty.is_primitive() && !constant.ty.is_string() {
        return Err(Diagnostic::error("Incorrect type for constant")
            .with_code(ErrorCode::E303)
            .with_label(location, format!("constant of type {}", constant.ty)));
    }
    constant.value = constant.value.coerce_to(&constant.ty, model, location)?;
    Ok(())
}

fn finish_attribute(model: &Model, attribute: &mut Attribute) -> Result<()> {
    let location = attribute.info.location;
    attribute.ty = complete_type(model, &attribute.ty, location)?;
    let ty = &attribute.ty;
    let ext_attrs = &attribute.info.ext_attrs;
    let invalid = |message: &str| {
        Diagnostic::error(message)
            .with_code(ErrorCode::E503)
            .with_label(location, format!("attribute of type {ty}"))
    };

    if !ext_attrs.contains("Cached") {
        if ty.is_dictionary() {
            return Err(invalid("An attribute cannot be of a dictionary type"));
        }
        if ty.is_sequence() {
            return Err(invalid("A non-cached attribute cannot be of a sequence type"));
        }
        if ty.is_mozmap() {
            return Err(invalid("A non-cached attribute cannot be of a MozMap type"));
        }
    }

    if let Some(union) = ty.as_union() {
        for member in &union.flat_members {
            let kind = if member.is_dictionary() {
                "a dictionary"
            } else if member.is_sequence() {
                "a sequence"
            } else if member.is_mozmap() {
                "a MozMap"
            } else {
                continue;
            };
            return Err(invalid(&format!(
                "An attribute cannot be of a union type if one of its member types (or one of its member types's member types, and so on) is {kind} type"
            )));
        }
    }

    for name in ["PutForwards", "SameObject"] {
        if ext_attrs.contains(name) && !ty.is_interface() {
            return Err(invalid(&format!(
                "An attribute with [{name}] must have an interface type as its type"
            )));
        }
    }
    Ok(())
}

/// Complete every signature and record the argument counts overload
/// resolution has to consider.
pub(super) fn finish_method(model: &Model, method: &mut Method) -> Result<()> {
    for overload in &mut method.overloads {
        overload.return_type = complete_type(model, &overload.return_type, overload.location)?;
        for argument in &mut overload.arguments {
            complete_argument(model, argument)?;
        }
    }

    method.max_arg_count = method
        .overloads
        .iter()
        .map(|overload| overload.arguments.len())
        .max()
        .unwrap_or(0);
    method.allowed_arg_counts = (0..=method.max_arg_count)
        .filter(|&count| !method.overloads_for_arg_count(count).is_empty())
        .collect::<BTreeSet<_>>();
    Ok(())
}

/// Finish a constructor or named constructor exposed wherever its
/// interface is.
pub(super) fn finish_constructor(
    model: &Model,
    ctor: &mut Method,
    exposure_global_names: &BTreeSet<Id>,
) -> Result<()> {
    ctor.info.exposure_global_names = exposure_global_names.clone();
    finish_exposure(model, &mut ctor.info)?;
    finish_method(model, ctor)
}

fn finish_maplike(model: &Model, decl: &mut MaplikeOrSetlike) -> Result<()> {
    let location = decl.info.location;
    decl.key_type = complete_type(model, &decl.key_type, location)?;
    if let Some(value_type) = &decl.value_type {
        decl.value_type = Some(complete_type(model, value_type, location)?);
    }
    Ok(())
}
