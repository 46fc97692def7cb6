//! Expansion of maplike and setlike declarations into ordinary members.

use log::trace;

use webidl_core::{identifier::Id, location::Location};

use crate::{
    attributes,
    error::{Diagnostic, ErrorCode, Result},
    model::{
        Argument, Attribute, BuiltinType, ExtendedAttribute, ExtendedAttributeArgs,
        ExtendedAttributeValue, InterfaceId, MaplikeOrSetlike, Member, MemberInfo, Method, Model,
        Overload, Type,
    },
    naming::{self, NameRules},
};

/// How a generated method may be used by code generation.
#[derive(Default)]
struct Flags {
    /// Skip generation when the interface already has a non-static method
    /// of that name.
    allow_existing: bool,
    chrome_only: bool,
    pure: bool,
    /// Returns a fresh object on each call.
    new_object: bool,
}

struct Expander<'a> {
    decl: &'a mut MaplikeOrSetlike,
    members: &'a mut Vec<Member>,
}

impl Expander<'_> {
    fn location(&self) -> Location {
        self.decl.info.location
    }

    fn key_argument(&self) -> Result<Argument> {
        self.argument("key", self.decl.key_type.clone(), false)
    }

    fn value_argument(&self) -> Result<Argument> {
        let ty = self
            .decl
            .value_type
            .clone()
            .unwrap_or(Type::builtin(BuiltinType::Any));
        self.argument("value", ty, false)
    }

    fn argument(&self, name: &str, ty: Type, optional: bool) -> Result<Argument> {
        let name = naming::declare(name, self.location(), NameRules::default())?;
        let mut argument = Argument::new(name, self.location(), ty);
        argument.optional = optional;
        Ok(argument)
    }

    fn add_method(
        &mut self,
        name: &str,
        return_type: BuiltinType,
        arguments: Vec<Argument>,
        flags: Flags,
    ) -> Result<()> {
        let location = self.location();
        let name = if flags.chrome_only {
            format!("__{name}")
        } else {
            let id = Id::new(name);
            if flags.allow_existing {
                self.decl.disallowed_non_method_names.push(id);
            } else {
                self.decl.disallowed_member_names.push(id);
            }
            name.to_string()
        };

        if flags.allow_existing
            && self.members.iter().any(|member| {
                member.name() == name.as_str() && member.is_method() && !member.is_static()
            })
        {
            trace!(name = name.as_str(); "Keeping existing operation");
            return Ok(());
        }

        let rules = if flags.chrome_only {
            NameRules::synthesized()
        } else {
            NameRules::default()
        };
        let name = naming::declare(&name, location, rules)?;
        let overload = Overload {
            return_type: Type::builtin(return_type),
            arguments,
            location,
        };
        let mut method = Method::new(MemberInfo::new(name, location), overload);
        method.maplike_or_setlike = true;

        let mut ext_attrs = vec![flag("Throws", location)];
        if flags.chrome_only {
            ext_attrs.push(flag("ChromeOnly", location));
        }
        if flags.pure {
            ext_attrs.push(flag("Pure", location));
        }
        if flags.new_object {
            ext_attrs.push(valued("DependsOn", "Everything", location));
            ext_attrs.push(valued("Affects", "Nothing", location));
            ext_attrs.push(flag("NewObject", location));
        }
        attributes::apply_to_method(&mut method, ext_attrs)?;

        trace!(name:% = name; "Generated collection operation");
        self.members.push(Member::Method(method));
        Ok(())
    }

    fn expand(&mut self, js_implemented: bool) -> Result<()> {
        let location = self.location();
        let mut size = Attribute::new(
            MemberInfo::new(Id::new("size"), location),
            Type::builtin(BuiltinType::UnsignedLong),
        );
        size.readonly = true;
        size.maplike_or_setlike = true;
        self.members.push(Member::Attribute(size));

        for name in ["entries", "keys", "values"] {
            self.add_method(
                name,
                BuiltinType::Object,
                Vec::new(),
                Flags {
                    new_object: true,
                    ..Flags::default()
                },
            )?;
        }

        let for_each = vec![
            self.argument("callback", Type::builtin(BuiltinType::Object), false)?,
            self.argument("thisArg", Type::builtin(BuiltinType::Any), true)?,
        ];
        self.add_method("forEach", BuiltinType::Void, for_each, Flags::default())?;

        let has = vec![self.key_argument()?];
        let pure = || Flags {
            pure: true,
            ..Flags::default()
        };
        self.add_method("has", BuiltinType::Boolean, has, pure())?;

        let writable = !self.decl.readonly;
        let mut modifier_variants = Vec::new();
        if writable {
            modifier_variants.push(false);
        }
        if js_implemented {
            modifier_variants.push(true);
        }

        for &chrome_only in &modifier_variants {
            let flags = || Flags {
                allow_existing: true,
                chrome_only,
                ..Flags::default()
            };
            self.add_method("clear", BuiltinType::Void, Vec::new(), flags())?;
            let delete = vec![self.key_argument()?];
            self.add_method("delete", BuiltinType::Boolean, delete, flags())?;
        }

        if self.decl.is_setlike() {
            for &chrome_only in &modifier_variants {
                let add = vec![self.key_argument()?];
                self.add_method(
                    "add",
                    BuiltinType::Object,
                    add,
                    Flags {
                        allow_existing: true,
                        chrome_only,
                        ..Flags::default()
                    },
                )?;
            }
            return Ok(());
        }

        let get = vec![self.key_argument()?];
        self.add_method("get", BuiltinType::Any, get, pure())?;

        for &chrome_only in &modifier_variants {
            let set = vec![self.key_argument()?, self.value_argument()?];
            self.add_method(
                "set",
                BuiltinType::Object,
                set,
                Flags {
                    allow_existing: true,
                    chrome_only,
                    ..Flags::default()
                },
            )?;
        }
        Ok(())
    }
}

fn flag(name: &str, location: Location) -> ExtendedAttribute {
    ExtendedAttribute::new(Id::new(name), ExtendedAttributeArgs::None, location)
}

fn valued(name: &str, value: &str, location: Location) -> ExtendedAttribute {
    ExtendedAttribute::new(
        Id::new(name),
        ExtendedAttributeArgs::Value(ExtendedAttributeValue::Identifier(Id::new(value))),
        location,
    )
}

/// Find the interface's maplike or setlike declaration and append the
/// members it stands for.
pub(super) fn expand(model: &mut Model, id: InterfaceId) -> Result<()> {
    let js_implemented = model.interface(id).is_js_implemented();
    let iface = model.interface_mut(id);

    let mut declarations = iface
        .members
        .iter()
        .enumerate()
        .filter_map(|(idx, member)| member.as_maplike_or_setlike().map(|decl| (idx, decl)));
    let Some((idx, first)) = declarations.next() else {
        return Ok(());
    };
    if let Some((_, second)) = declarations.next() {
        return Err(Diagnostic::error(format!(
            "{} declaration used on interface that already has {} declaration",
            second.kind, first.kind
        ))
        .with_code(ErrorCode::E408)
        .with_label(first.info.location, "first declaration")
        .with_secondary_label(second.info.location, "second declaration"));
    }

    let mut decl = first.clone();
    iface.maplike_or_setlike = Some(decl.info.location);
    Expander {
        decl: &mut decl,
        members: &mut iface.members,
    }
    .expand(js_implemented)?;
    iface.members[idx] = Member::MaplikeOrSetlike(decl);
    Ok(())
}

/// Reject members that clash with the names a maplike or setlike
/// declaration reserves. `is_ancestor` is set when `members` belong to an
/// ancestor of the declaring interface.
pub(super) fn check_collisions(
    decl: &MaplikeOrSetlike,
    members: &[Member],
    is_ancestor: bool,
) -> Result<()> {
    for member in members {
        let name = member.name();
        let generated = match member {
            Member::Method(method) => method.maplike_or_setlike,
            Member::Attribute(attr) => attr.maplike_or_setlike,
            _ => false,
        };
        if decl.disallowed_member_names.contains(&name) && !generated {
            return Err(collision(decl, member, "name"));
        }
        let restricted_kind = is_ancestor || member.is_attr() || member.is_const();
        if restricted_kind && decl.disallowed_non_method_names.contains(&name) {
            return Err(collision(decl, member, "method"));
        }
    }
    Ok(())
}

fn collision(decl: &MaplikeOrSetlike, member: &Member, what: &str) -> Diagnostic {
    Diagnostic::error(format!(
        "Member '{}' conflicts with reserved {} {what}.",
        member.name(),
        decl.kind
    ))
    .with_code(ErrorCode::E408)
    .with_label(member.location(), "conflicting member")
    .with_secondary_label(decl.info.location, "declaration")
}
