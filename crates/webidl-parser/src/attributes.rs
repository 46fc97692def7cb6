//! Extended attribute handlers.
//!
//! Every construct accepts its own set of extended attributes. A handler
//! checks one attribute against what the construct looks like so far,
//! updates the flags the attribute controls and then records it, so a later
//! attribute in the same list sees the earlier ones.

use std::collections::BTreeSet;

use log::trace;
use webidl_core::{identifier::Id, location::Location};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    model::{
        Affects, Argument, Attribute, BuiltinType, Callback, Const, DependsOn, ExtendedAttribute,
        ExtendedAttributeArgs, InterfaceId, InterfaceType, MaplikeOrSetlike, Member, MemberInfo,
        Method, Model, Overload, PartialId, Type,
    },
    naming::{self, NameRules},
    scope::{self, Binding},
};

/// Interface attributes that take no arguments and need no handling.
const INTERFACE_FLAGS: &[&str] = &[
    "NeedResolve",
    "OverrideBuiltins",
    "ChromeOnly",
    "Unforgeable",
    "UnsafeInPrerendering",
    "LegacyEventInit",
    "ProbablyShortLivingObject",
    "LegacyUnenumerableNamedProperties",
    "NonOrdinaryGetPrototypeOf",
    "Abstract",
    "Inline",
];

/// Interface attributes that must carry a value.
const INTERFACE_VALUES: &[&str] = &[
    "Pref",
    "JSImplementation",
    "HeaderFile",
    "NavigatorProperty",
    "AvailableIn",
    "Func",
    "CheckAnyPermissions",
    "CheckAllPermissions",
    "Deprecated",
];

const ATTRIBUTE_PASSTHROUGH: &[&str] = &[
    "Pref",
    "Deprecated",
    "SetterThrows",
    "Throws",
    "GetterThrows",
    "ChromeOnly",
    "Func",
    "Frozen",
    "AvailableIn",
    "NewObject",
    "UnsafeInPrerendering",
    "CheckAnyPermissions",
    "CheckAllPermissions",
    "BinaryName",
];

const METHOD_PASSTHROUGH: &[&str] = &[
    "Throws",
    "NewObject",
    "ChromeOnly",
    "UnsafeInPrerendering",
    "Pref",
    "Deprecated",
    "Func",
    "AvailableIn",
    "CheckAnyPermissions",
    "CheckAllPermissions",
    "BinaryName",
    "MethodIdentityTestable",
    "StaticClassOverride",
];

const CONST_PASSTHROUGH: &[&str] = &[
    "Pref",
    "ChromeOnly",
    "Func",
    "AvailableIn",
    "CheckAnyPermissions",
    "CheckAllPermissions",
];

pub(crate) fn apply_to_interface(
    model: &mut Model,
    id: InterfaceId,
    attrs: Vec<ExtendedAttribute>,
) -> Result<()> {
    for attr in attrs {
        trace!(
            interface = model.interface(id).name().as_string(),
            attribute = attr.to_string();
            "Applying extended attribute"
        );
        interface_attribute(model, id, &attr)?;
        model.interface_mut(id).ext_attrs.push(attr);
    }
    Ok(())
}

fn interface_attribute(model: &mut Model, id: InterfaceId, attr: &ExtendedAttribute) -> Result<()> {
    let name = attr.name().as_string();
    let iface = model.interface(id);
    let own_name = iface.name();
    let location = iface.location();

    match name.as_str() {
        "TreatNonCallableAsNull" | "TreatNonObjectAsNull" => Err(misuse_on(
            format!("{name} cannot be specified on interfaces"),
            attr,
            location,
        )),
        "NoInterfaceObject" => {
            require_no_arguments(attr)?;
            if iface.ctor.is_some() {
                return Err(misuse_on(
                    "Constructor and NoInterfaceObject are incompatible",
                    attr,
                    location,
                ));
            }
            Ok(())
        }
        "Constructor" | "ChromeConstructor" | "NamedConstructor" => {
            add_constructor(model, id, attr, &name)
        }
        "ArrayClass" | "ExceptionClass" => {
            require_no_arguments(attr)?;
            if iface.parent_name.is_some() {
                return Err(misuse_on(
                    format!("[{name}] must not be specified on an interface with inherited interfaces"),
                    attr,
                    location,
                ));
            }
            Ok(())
        }
        "Global" => {
            let mut names = attr.list_value();
            if names.is_empty() {
                names.push(own_name);
            }
            for global in &names {
                model.scope.add_global_name(*global, own_name);
            }
            let iface = model.interface_mut(id);
            iface.global_names = names;
            iface.is_on_global_proto_chain = true;
            Ok(())
        }
        "PrimaryGlobal" => {
            require_no_arguments(attr)?;
            if let Some(previous) = model.scope.primary_global_attr {
                return Err(Diagnostic::error("[PrimaryGlobal] specified twice")
                    .with_code(ErrorCode::E405)
                    .with_label(attr.location(), "second primary global")
                    .with_secondary_label(previous, "first primary global"));
            }
            model.scope.primary_global_attr = Some(attr.location());
            model.scope.primary_global_name = Some(own_name);
            model.scope.add_global_name(own_name, own_name);
            let iface = model.interface_mut(id);
            iface.global_names = vec![own_name];
            iface.is_on_global_proto_chain = true;
            Ok(())
        }
        "Exposed" => set_exposure(&mut model.interface_mut(id).exposure_global_names, attr),
        flag if INTERFACE_FLAGS.contains(&flag) => require_no_arguments(attr),
        valued if INTERFACE_VALUES.contains(&valued) => {
            if attr.has_value() {
                Ok(())
            } else {
                Err(misuse(format!("[{name}] must have a value"), attr))
            }
        }
        _ => Err(unknown(attr, "interface")),
    }
}

/// The name a `[NamedConstructor]` introduces, in either of its forms.
fn named_constructor_name(attr: &ExtendedAttribute) -> Option<String> {
    match attr.args() {
        ExtendedAttributeArgs::Value(_) => attr.value_id().map(|id| id.as_string()),
        ExtendedAttributeArgs::NamedArguments { name, .. } => Some(name.as_string()),
        _ => None,
    }
}

fn add_constructor(
    model: &mut Model,
    id: InterfaceId,
    attr: &ExtendedAttribute,
    kind: &str,
) -> Result<()> {
    let iface = model.interface(id);
    let location = iface.location();
    let named = kind == "NamedConstructor";

    if !named && !iface.has_interface_object() {
        return Err(misuse_on(
            format!("{kind} and NoInterfaceObject are incompatible"),
            attr,
            location,
        ));
    }

    let (name, rules) = if named {
        let Some(name) = named_constructor_name(attr) else {
            return Err(misuse(
                "NamedConstructor must either take an identifier or take a named argument list",
                attr,
            ));
        };
        (name, NameRules::default())
    } else {
        let rules = NameRules {
            allow_forbidden: true,
            ..Default::default()
        };
        ("constructor".to_string(), rules)
    };
    let method_name = naming::declare(&name, location, rules)?;

    let promise_inner =
        (iface.name() == "Promise").then(|| Box::new(Type::builtin(BuiltinType::Any)));
    let return_type = Type::Interface(InterfaceType {
        id,
        name: iface.name(),
        is_callback: iface.is_callback(),
        promise_inner,
    });
    let overload = Overload {
        return_type,
        arguments: attr.arguments().map(<[Argument]>::to_vec).unwrap_or_default(),
        location,
    };

    let mut method = Method::new(MemberInfo::new(method_name, location), overload);
    method.is_static = true;
    let mut generated = vec![
        ExtendedAttribute::new(Id::new("NewObject"), ExtendedAttributeArgs::None, location),
        ExtendedAttribute::new(Id::new("Throws"), ExtendedAttributeArgs::None, location),
    ];
    if kind == "ChromeConstructor" {
        generated.push(ExtendedAttribute::new(
            Id::new("ChromeOnly"),
            ExtendedAttributeArgs::None,
            location,
        ));
    }
    apply_to_method(&mut method, generated)?;

    if !named {
        let iface = model.interface_mut(id);
        match &mut iface.ctor {
            Some(ctor) => ctor.add_overload(method)?,
            None => iface.ctor = Some(method),
        }
        return Ok(());
    }

    match model.scope.lookup(method_name) {
        None => {
            model
                .scope
                .bind(method_name, Binding::NamedConstructor(id), location)?;
            model.interface_mut(id).named_constructors.push(method);
        }
        Some(Binding::NamedConstructor(owner)) if owner == id => {
            let iface = model.interface_mut(id);
            if let Some(existing) = iface
                .named_constructors
                .iter_mut()
                .find(|ctor| ctor.name() == method_name)
            {
                existing.add_overload(method)?;
            }
        }
        Some(Binding::NamedConstructor(_)) => {
            let mut err = Diagnostic::error(
                "NamedConstructor conflicts with a NamedConstructor of a different interface",
            )
            .with_code(ErrorCode::E201)
            .with_label(location, "named constructor");
            if let Some(existing) = model.scope.location_of(method_name) {
                err = err.with_secondary_label(existing, "other named constructor");
            }
            return Err(err);
        }
        Some(_) => {
            let existing = model.scope.location_of(method_name).unwrap_or(location);
            return Err(scope::multiple_definitions(method_name, "::", location, existing));
        }
    }
    Ok(())
}

/// Attributes on a `partial interface`.
///
/// `[Constructor]` and `[NamedConstructor]` wait until the fragment is
/// merged; `[Exposed]` is handed down to every member of the fragment.
pub(crate) fn apply_to_partial(
    model: &mut Model,
    id: PartialId,
    attrs: Vec<ExtendedAttribute>,
) -> Result<()> {
    for attr in attrs {
        let partial = model.partial_mut(id);
        if attr.is("Constructor") || attr.is("NamedConstructor") {
            partial.propagated_ext_attrs.push(attr);
        } else if attr.is("Exposed") {
            for member in &mut partial.members {
                if !member.info().exposure_global_names.is_empty() {
                    return Err(Diagnostic::error(
                        "[Exposed] specified on both a partial interface member and on the partial interface itself",
                    )
                    .with_code(ErrorCode::E407)
                    .with_label(member.location(), "member exposure")
                    .with_secondary_label(attr.location(), "partial interface exposure"));
                }
                apply_to_member(member, vec![attr.clone()])?;
            }
        } else {
            return Err(unknown(&attr, "partial interface"));
        }
    }
    Ok(())
}

pub(crate) fn apply_to_member(member: &mut Member, attrs: Vec<ExtendedAttribute>) -> Result<()> {
    match member {
        Member::Const(constant) => apply_to_const(constant, attrs),
        Member::Attribute(attribute) => apply_to_attribute(attribute, attrs),
        Member::Method(method) => apply_to_method(method, attrs),
        Member::MaplikeOrSetlike(decl) => apply_to_maplike(decl, attrs),
    }
}

pub(crate) fn apply_to_const(constant: &mut Const, attrs: Vec<ExtendedAttribute>) -> Result<()> {
    for attr in attrs {
        if attr.is("Exposed") {
            set_exposure(&mut constant.info.exposure_global_names, &attr)?;
        } else if !CONST_PASSTHROUGH.iter().any(|name| attr.is(name)) {
            return Err(unknown(&attr, "constant"));
        }
        constant.info.ext_attrs.push(attr);
    }
    Ok(())
}

pub(crate) fn apply_to_maplike(
    decl: &mut MaplikeOrSetlike,
    attrs: Vec<ExtendedAttribute>,
) -> Result<()> {
    for attr in attrs {
        if attr.is("Exposed") {
            set_exposure(&mut decl.info.exposure_global_names, &attr)?;
        }
        decl.info.ext_attrs.push(attr);
    }
    Ok(())
}

pub(crate) fn apply_to_attribute(
    attribute: &mut Attribute,
    attrs: Vec<ExtendedAttribute>,
) -> Result<()> {
    let attrs = take_treat_null_as(
        &attribute.ty,
        false,
        attrs,
        &mut attribute.treat_null_as_empty_string,
    )?;
    for attr in attrs {
        attribute_attribute(attribute, &attr)?;
        attribute.info.ext_attrs.push(attr);
    }
    Ok(())
}

fn attribute_attribute(attribute: &mut Attribute, attr: &ExtendedAttribute) -> Result<()> {
    let name = attr.name().as_string();
    let location = attribute.info.location;
    let existing = &attribute.info.ext_attrs;

    match name.as_str() {
        "SetterThrows" if attribute.readonly => Err(misuse_on(
            "Readonly attributes must not be flagged as [SetterThrows]",
            attr,
            location,
        )),
        "Throws" | "GetterThrows" if existing.contains("StoreInSlot") => Err(misuse_on(
            "Throwing things can't be [StoreInSlot]",
            attr,
            location,
        )),
        "StoreInSlot" if existing.contains("Throws") || existing.contains("GetterThrows") => Err(
            misuse_on("Throwing things can't be [StoreInSlot]", attr, location),
        ),
        "LenientThis" => {
            require_no_arguments(attr)?;
            if attribute.is_static {
                return Err(misuse_on(
                    "[LenientThis] is only allowed on non-static attributes",
                    attr,
                    location,
                ));
            }
            for other in ["CrossOriginReadable", "CrossOriginWritable"] {
                if existing.contains(other) {
                    return Err(misuse_on(
                        format!("[LenientThis] is not allowed in combination with [{other}]"),
                        attr,
                        location,
                    ));
                }
            }
            attribute.lenient_this = true;
            Ok(())
        }
        "Unforgeable" => {
            if attribute.is_static {
                return Err(misuse_on(
                    "[Unforgeable] is only allowed on non-static attributes",
                    attr,
                    location,
                ));
            }
            attribute.unforgeable = true;
            Ok(())
        }
        "SameObject" | "Constant" if !attribute.readonly => Err(misuse_on(
            format!("[{name}] only allowed on readonly attributes"),
            attr,
            location,
        )),
        "PutForwards" => {
            if !attribute.readonly {
                return Err(misuse_on(
                    "[PutForwards] is only allowed on readonly attributes",
                    attr,
                    location,
                ));
            }
            if attribute.is_static {
                return Err(misuse_on(
                    "[PutForwards] is only allowed on non-static attributes",
                    attr,
                    location,
                ));
            }
            if existing.contains("Replaceable") {
                return Err(misuse_on(
                    "[PutForwards] and [Replaceable] can't both appear on the same attribute",
                    attr,
                    location,
                ));
            }
            if !attr.has_value() {
                return Err(misuse_on("[PutForwards] takes an identifier", attr, location));
            }
            Ok(())
        }
        "Replaceable" => {
            require_no_arguments(attr)?;
            if !attribute.readonly {
                return Err(misuse_on(
                    "[Replaceable] is only allowed on readonly attributes",
                    attr,
                    location,
                ));
            }
            if attribute.is_static {
                return Err(misuse_on(
                    "[Replaceable] is only allowed on non-static attributes",
                    attr,
                    location,
                ));
            }
            if existing.contains("PutForwards") {
                return Err(misuse_on(
                    "[PutForwards] and [Replaceable] can't both appear on the same attribute",
                    attr,
                    location,
                ));
            }
            Ok(())
        }
        "LenientFloat" => {
            if attribute.readonly {
                return Err(misuse_on(
                    "[LenientFloat] used on a readonly attribute",
                    attr,
                    location,
                ));
            }
            if !attribute.ty.includes_restricted_float() {
                return Err(misuse_on(
                    "[LenientFloat] used on an attribute with a non-restricted-float type",
                    attr,
                    location,
                ));
            }
            Ok(())
        }
        "EnforceRange" | "Clamp" => {
            if attribute.readonly {
                return Err(misuse_on(
                    format!("[{name}] used on a readonly attribute"),
                    attr,
                    location,
                ));
            }
            if name == "Clamp" {
                attribute.clamp = true;
            } else {
                attribute.enforce_range = true;
            }
            Ok(())
        }
        "StoreInSlot" if existing.contains("Cached") => Err(misuse_on(
            "[StoreInSlot] and [Cached] must not be specified on the same attribute",
            attr,
            location,
        )),
        "Cached" if existing.contains("StoreInSlot") => Err(misuse_on(
            "[Cached] and [StoreInSlot] must not be specified on the same attribute",
            attr,
            location,
        )),
        "StoreInSlot" | "Cached" => Ok(()),
        "CrossOriginReadable" | "CrossOriginWritable" => {
            if name == "CrossOriginReadable" {
                require_no_arguments(attr)?;
            }
            if attribute.is_static {
                return Err(misuse_on(
                    format!("[{name}] is only allowed on non-static attributes"),
                    attr,
                    location,
                ));
            }
            if existing.contains("LenientThis") {
                return Err(misuse_on(
                    format!("[LenientThis] is not allowed in combination with [{name}]"),
                    attr,
                    location,
                ));
            }
            Ok(())
        }
        "Exposed" => set_exposure(&mut attribute.info.exposure_global_names, attr),
        "Pure" => {
            require_no_arguments(attr)?;
            set_depends_on(&mut attribute.info, "DOMState", attr)?;
            set_affects(&mut attribute.info, "Nothing", attr)
        }
        "Constant" | "SameObject" => {
            require_no_arguments(attr)?;
            set_depends_on(&mut attribute.info, "Nothing", attr)?;
            set_affects(&mut attribute.info, "Nothing", attr)
        }
        "Affects" => {
            let value = required_value(attr, "[Affects] takes an identifier")?;
            set_affects(&mut attribute.info, &value, attr)
        }
        "DependsOn" => {
            let value = required_value(attr, "[DependsOn] takes an identifier")?;
            if value != "Everything" && value != "DOMState" && !attribute.readonly {
                return Err(misuse_on(
                    format!("[DependsOn={value}] only allowed on readonly attributes"),
                    attr,
                    location,
                ));
            }
            set_depends_on(&mut attribute.info, &value, attr)
        }
        passthrough if ATTRIBUTE_PASSTHROUGH.contains(&passthrough) => Ok(()),
        _ => Err(unknown(attr, "attribute")),
    }
}

pub(crate) fn apply_to_method(method: &mut Method, attrs: Vec<ExtendedAttribute>) -> Result<()> {
    for attr in attrs {
        method_attribute(method, &attr)?;
        method.info.ext_attrs.push(attr);
    }
    Ok(())
}

fn method_attribute(method: &mut Method, attr: &ExtendedAttribute) -> Result<()> {
    let name = attr.name().as_string();
    let location = method.info.location;

    match name.as_str() {
        "GetterThrows" | "SetterThrows" | "SameObject" | "Constant" => Err(misuse_on(
            format!("Methods must not be flagged as [{name}]"),
            attr,
            location,
        )),
        "Unforgeable" => {
            if method.is_static {
                return Err(misuse_on(
                    "[Unforgeable] is only allowed on non-static methods",
                    attr,
                    location,
                ));
            }
            method.unforgeable = true;
            Ok(())
        }
        "PutForwards" => Err(misuse_on("Only attributes support [PutForwards]", attr, location)),
        "LenientFloat" => {
            let Some(signature) = method.overloads.first() else {
                return Ok(());
            };
            if !signature.return_type.is_void() {
                return Err(misuse_on(
                    "[LenientFloat] used on a non-void method",
                    attr,
                    location,
                ));
            }
            if !signature
                .arguments
                .iter()
                .any(|arg| arg.ty.includes_restricted_float())
            {
                return Err(misuse_on(
                    "[LenientFloat] used on an operation with no restricted float type arguments",
                    attr,
                    location,
                ));
            }
            Ok(())
        }
        "Exposed" => set_exposure(&mut method.info.exposure_global_names, attr),
        "CrossOriginCallable" | "WebGLHandlesContextLoss" => require_no_arguments(attr),
        "Pure" => {
            require_no_arguments(attr)?;
            set_depends_on(&mut method.info, "DOMState", attr)?;
            set_affects(&mut method.info, "Nothing", attr)
        }
        "Affects" => {
            let value = required_value(attr, "[Affects] takes an identifier")?;
            set_affects(&mut method.info, &value, attr)
        }
        "DependsOn" => {
            let value = required_value(attr, "[DependsOn] takes an identifier")?;
            set_depends_on(&mut method.info, &value, attr)
        }
        "Alias" => {
            let Some(alias) = attr.value_id() else {
                return Err(Diagnostic::error("[Alias] takes an identifier or string")
                    .with_code(ErrorCode::E411)
                    .with_label(attr.location(), "alias"));
            };
            method.aliases.push(alias);
            Ok(())
        }
        passthrough if METHOD_PASSTHROUGH.contains(&passthrough) => Ok(()),
        _ => Err(unknown(attr, "method")),
    }
}

/// Attributes on an operation argument or a dictionary member.
pub(crate) fn apply_to_argument(
    argument: &mut Argument,
    attrs: Vec<ExtendedAttribute>,
) -> Result<()> {
    let attrs = take_treat_null_as(
        &argument.ty,
        argument.dictionary_member,
        attrs,
        &mut argument.treat_null_as_empty_string,
    )?;
    for attr in attrs {
        if attr.is("Clamp") || attr.is("EnforceRange") {
            require_no_arguments(&attr)?;
            if argument.clamp || argument.enforce_range {
                return Err(misuse_on(
                    "[EnforceRange] and [Clamp] are mutually exclusive",
                    &attr,
                    argument.location,
                ));
            }
            if attr.is("Clamp") {
                argument.clamp = true;
            } else {
                argument.enforce_range = true;
            }
        } else if attr.is("TreatNonCallableAsNull") {
            argument.treat_non_callable_as_null = true;
        } else {
            let target = if argument.dictionary_member {
                "a dictionary member"
            } else {
                "an argument"
            };
            return Err(Diagnostic::error(format!("Unhandled extended attribute on {target}"))
                .with_code(ErrorCode::E505)
                .with_label(attr.location(), "extended attribute")
                .with_secondary_label(argument.location, target));
        }
        argument.ext_attrs.push(attr);
    }
    Ok(())
}

pub(crate) fn apply_to_callback(callback: &mut Callback, attrs: Vec<ExtendedAttribute>) -> Result<()> {
    for attr in attrs {
        if attr.is("TreatNonCallableAsNull") {
            callback.treat_non_callable_as_null = true;
        } else if attr.is("TreatNonObjectAsNull") {
            callback.treat_non_object_as_null = true;
        } else {
            return Err(Diagnostic::error(
                "There are no extended attributes that are allowed on types",
            )
            .with_code(ErrorCode::E505)
            .with_label(attr.location(), "extended attribute")
            .with_secondary_label(callback.location(), "callback"));
        }
        callback.ext_attrs.push(attr);
    }
    if callback.treat_non_callable_as_null && callback.treat_non_object_as_null {
        return Err(Diagnostic::error(
            "Cannot specify both [TreatNonCallableAsNull] and [TreatNonObjectAsNull]",
        )
        .with_code(ErrorCode::E504)
        .with_label(callback.location(), "callback"));
    }
    Ok(())
}

/// Dictionaries, enums, typedefs and implements statements take no
/// extended attributes at all.
pub(crate) fn reject_all(attrs: &[ExtendedAttribute], kind: &str, location: Location) -> Result<()> {
    match attrs.first() {
        None => Ok(()),
        Some(attr) => Err(Diagnostic::error(format!(
            "There are no extended attributes that are allowed on {kind}"
        ))
        .with_code(ErrorCode::E505)
        .with_label(attr.location(), "extended attribute")
        .with_secondary_label(location, "declared here")),
    }
}

/// Consume `[TreatNullAs=EmptyString]` and return the other attributes.
fn take_treat_null_as(
    ty: &Type,
    dictionary_member: bool,
    attrs: Vec<ExtendedAttribute>,
    flag: &mut bool,
) -> Result<Vec<ExtendedAttribute>> {
    let mut rest = Vec::with_capacity(attrs.len());
    for attr in attrs {
        if !(attr.is("TreatNullAs") && attr.has_value()) {
            rest.push(attr);
            continue;
        }
        if !matches!(ty, Type::Builtin(BuiltinType::DOMString)) {
            return Err(misuse(
                "[TreatNullAs] is only allowed on arguments or attributes whose type is DOMString",
                &attr,
            ));
        }
        if dictionary_member {
            return Err(misuse(
                "[TreatNullAs] is not allowed for dictionary members",
                &attr,
            ));
        }
        let value = attr.value_id().map(|id| id.as_string()).unwrap_or_default();
        if value != "EmptyString" {
            return Err(misuse(
                format!("[TreatNullAs] must take the identifier 'EmptyString', not '{value}'"),
                &attr,
            ));
        }
        *flag = true;
    }
    Ok(rest)
}

fn set_exposure(names: &mut BTreeSet<Id>, attr: &ExtendedAttribute) -> Result<()> {
    if !names.is_empty() {
        return Err(Diagnostic::error("[Exposed] specified twice")
            .with_code(ErrorCode::E407)
            .with_label(attr.location(), "exposure"));
    }
    let list = attr.list_value();
    if list.is_empty() {
        return Err(Diagnostic::error(
            "[Exposed] must take an identifier or an identifier list",
        )
        .with_code(ErrorCode::E407)
        .with_label(attr.location(), "exposure"));
    }
    names.extend(list);
    Ok(())
}

fn set_depends_on(info: &mut MemberInfo, value: &str, attr: &ExtendedAttribute) -> Result<()> {
    if info.depends_on != DependsOn::Everything {
        return Err(Diagnostic::error(
            "Trying to specify multiple different DependsOn, Pure, or Constant extended attributes for attribute",
        )
        .with_code(ErrorCode::E506)
        .with_label(attr.location(), "extended attribute")
        .with_secondary_label(info.location, "member"));
    }
    info.depends_on = value.parse().map_err(|()| {
        Diagnostic::error(format!("Invalid [DependsOn={value}] on attribute"))
            .with_code(ErrorCode::E506)
            .with_label(attr.location(), "extended attribute")
    })?;
    Ok(())
}

fn set_affects(info: &mut MemberInfo, value: &str, attr: &ExtendedAttribute) -> Result<()> {
    if info.affects != Affects::Everything {
        return Err(Diagnostic::error(
            "Trying to specify multiple different Affects, Pure, or Constant extended attributes for attribute",
        )
        .with_code(ErrorCode::E506)
        .with_label(attr.location(), "extended attribute")
        .with_secondary_label(info.location, "member"));
    }
    info.affects = value.parse().map_err(|()| {
        Diagnostic::error(format!("Invalid [Affects={value}] on attribute"))
            .with_code(ErrorCode::E506)
            .with_label(attr.location(), "extended attribute")
    })?;
    Ok(())
}

fn required_value(attr: &ExtendedAttribute, message: &str) -> Result<String> {
    attr.value_id()
        .map(|id| id.as_string())
        .ok_or_else(|| misuse(message, attr))
}

fn require_no_arguments(attr: &ExtendedAttribute) -> Result<()> {
    if attr.no_arguments() {
        Ok(())
    } else {
        Err(misuse(format!("[{}] must take no arguments", attr.name()), attr))
    }
}

fn misuse(message: impl Into<String>, attr: &ExtendedAttribute) -> Diagnostic {
    Diagnostic::error(message)
        .with_code(ErrorCode::E504)
        .with_label(attr.location(), "extended attribute")
}

fn misuse_on(message: impl Into<String>, attr: &ExtendedAttribute, target: Location) -> Diagnostic {
    misuse(message, attr).with_secondary_label(target, "applied here")
}

fn unknown(attr: &ExtendedAttribute, kind: &str) -> Diagnostic {
    Diagnostic::error(format!(
        "Unknown extended attribute {} on {kind}",
        attr.name()
    ))
    .with_code(ErrorCode::E505)
    .with_label(attr.location(), "unknown extended attribute")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExtendedAttributeValue, Interface};

    fn loc() -> Location {
        Location::builtin("<test>")
    }

    fn flag(name: &str) -> ExtendedAttribute {
        ExtendedAttribute::new(Id::new(name), ExtendedAttributeArgs::None, loc())
    }

    fn valued(name: &str, value: &str) -> ExtendedAttribute {
        ExtendedAttribute::new(
            Id::new(name),
            ExtendedAttributeArgs::Value(ExtendedAttributeValue::Identifier(Id::new(value))),
            loc(),
        )
    }

    fn attribute(ty: Type, readonly: bool) -> Attribute {
        let mut attribute = Attribute::new(MemberInfo::new(Id::new("value"), loc()), ty);
        attribute.readonly = readonly;
        attribute
    }

    fn model_with(name: &str) -> (Model, InterfaceId) {
        let mut model = Model::new();
        let id = model.add_interface(Interface::new(Id::new(name), loc()));
        model.interface_mut(id).is_known_non_partial = true;
        (model, id)
    }

    #[test]
    fn test_pure_sets_depends_on_and_affects() {
        let mut attr = attribute(Type::builtin(BuiltinType::Long), true);
        apply_to_attribute(&mut attr, vec![flag("Pure")]).unwrap();

        assert_eq!(attr.info.depends_on, DependsOn::DOMState);
        assert_eq!(attr.info.affects, Affects::Nothing);
        assert!(attr.info.ext_attrs.contains("Pure"));
    }

    #[test]
    fn test_pure_and_constant_conflict() {
        let mut attr = attribute(Type::builtin(BuiltinType::Long), true);
        let err = apply_to_attribute(&mut attr, vec![flag("Pure"), flag("Constant")]).unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::E506));
    }

    #[test]
    fn test_setter_throws_on_readonly() {
        let mut attr = attribute(Type::builtin(BuiltinType::Long), true);
        let err = apply_to_attribute(&mut attr, vec![flag("SetterThrows")]).unwrap_err();

        assert_eq!(
            err.message(),
            "Readonly attributes must not be flagged as [SetterThrows]"
        );
    }

    #[test]
    fn test_store_in_slot_and_cached() {
        let mut attr = attribute(Type::builtin(BuiltinType::Long), true);
        let err =
            apply_to_attribute(&mut attr, vec![flag("Cached"), flag("StoreInSlot")]).unwrap_err();
        assert_eq!(
            err.message(),
            "[StoreInSlot] and [Cached] must not be specified on the same attribute"
        );

        let mut attr = attribute(Type::builtin(BuiltinType::Long), true);
        let err =
            apply_to_attribute(&mut attr, vec![flag("StoreInSlot"), flag("Throws")]).unwrap_err();
        assert_eq!(err.message(), "Throwing things can't be [StoreInSlot]");
    }

    #[test]
    fn test_lenient_float_needs_restricted_float() {
        let mut attr = attribute(Type::builtin(BuiltinType::UnrestrictedDouble), false);
        let err = apply_to_attribute(&mut attr, vec![flag("LenientFloat")]).unwrap_err();
        assert_eq!(
            err.message(),
            "[LenientFloat] used on an attribute with a non-restricted-float type"
        );

        let mut attr = attribute(Type::builtin(BuiltinType::Float), false);
        assert!(apply_to_attribute(&mut attr, vec![flag("LenientFloat")]).is_ok());
    }

    #[test]
    fn test_treat_null_as() {
        let mut attr = attribute(Type::builtin(BuiltinType::DOMString), false);
        apply_to_attribute(&mut attr, vec![valued("TreatNullAs", "EmptyString")]).unwrap();
        assert!(attr.treat_null_as_empty_string);
        assert!(!attr.info.ext_attrs.contains("TreatNullAs"));

        let mut attr = attribute(Type::builtin(BuiltinType::Long), false);
        let err =
            apply_to_attribute(&mut attr, vec![valued("TreatNullAs", "EmptyString")]).unwrap_err();
        assert_eq!(
            err.message(),
            "[TreatNullAs] is only allowed on arguments or attributes whose type is DOMString"
        );

        let mut attr = attribute(Type::builtin(BuiltinType::DOMString), false);
        let err = apply_to_attribute(&mut attr, vec![valued("TreatNullAs", "Null")]).unwrap_err();
        assert_eq!(
            err.message(),
            "[TreatNullAs] must take the identifier 'EmptyString', not 'Null'"
        );
    }

    #[test]
    fn test_unknown_attribute() {
        let mut attr = attribute(Type::builtin(BuiltinType::Long), false);
        let err = apply_to_attribute(&mut attr, vec![flag("Sparkly")]).unwrap_err();

        assert_eq!(err.message(), "Unknown extended attribute Sparkly on attribute");
        assert_eq!(err.code(), Some(ErrorCode::E505));
    }

    #[test]
    fn test_argument_clamp_and_enforce_range_exclusive() {
        let mut arg = Argument::new(Id::new("x"), loc(), Type::builtin(BuiltinType::Octet));
        let err = apply_to_argument(&mut arg, vec![flag("Clamp"), flag("EnforceRange")])
            .unwrap_err();
        assert_eq!(err.message(), "[EnforceRange] and [Clamp] are mutually exclusive");

        let mut member = Argument::new(Id::new("x"), loc(), Type::builtin(BuiltinType::Octet));
        member.dictionary_member = true;
        let err = apply_to_argument(&mut member, vec![flag("Pure")]).unwrap_err();
        assert_eq!(
            err.message(),
            "Unhandled extended attribute on a dictionary member"
        );
    }

    #[test]
    fn test_method_alias_and_getter_throws() {
        let info = MemberInfo::new(Id::new("forEach"), loc());
        let overload = Overload {
            return_type: Type::builtin(BuiltinType::Void),
            arguments: Vec::new(),
            location: loc(),
        };
        let mut method = Method::new(info, overload);

        apply_to_method(&mut method, vec![valued("Alias", "each")]).unwrap();
        assert_eq!(method.aliases, vec![Id::new("each")]);

        let err = apply_to_method(&mut method, vec![flag("GetterThrows")]).unwrap_err();
        assert_eq!(err.message(), "Methods must not be flagged as [GetterThrows]");
    }

    #[test]
    fn test_global_registers_global_names() {
        let (mut model, id) = model_with("Window");
        apply_to_interface(&mut model, id, vec![flag("Global")]).unwrap();

        let iface = model.interface(id);
        assert!(iface.is_on_global_proto_chain());
        assert_eq!(iface.global_names(), &[Id::new("Window")]);
        assert!(model.scope.global_names().contains(&Id::new("Window")));
    }

    #[test]
    fn test_primary_global_specified_twice() {
        let (mut model, first) = model_with("Window");
        let second = model.add_interface(Interface::new(Id::new("Other"), loc()));
        apply_to_interface(&mut model, first, vec![flag("PrimaryGlobal")]).unwrap();

        let err = apply_to_interface(&mut model, second, vec![flag("PrimaryGlobal")]).unwrap_err();
        assert_eq!(err.message(), "[PrimaryGlobal] specified twice");
        assert_eq!(model.scope.primary_global_name(), Some(Id::new("Window")));
    }

    #[test]
    fn test_constructor_overloads_merge() {
        let (mut model, id) = model_with("Point");
        apply_to_interface(&mut model, id, vec![flag("Constructor"), flag("Constructor")])
            .unwrap();

        let ctor = model.interface(id).constructor().unwrap();
        assert_eq!(ctor.name(), "constructor");
        assert!(ctor.is_static);
        assert_eq!(ctor.overloads.len(), 2);
        assert!(ctor.info.ext_attrs.contains("NewObject"));
    }

    #[test]
    fn test_constructor_and_no_interface_object() {
        let (mut model, id) = model_with("Point");
        let err = apply_to_interface(
            &mut model,
            id,
            vec![flag("NoInterfaceObject"), flag("Constructor")],
        )
        .unwrap_err();

        assert_eq!(err.message(), "Constructor and NoInterfaceObject are incompatible");
    }

    #[test]
    fn test_named_constructor_conflict() {
        let (mut model, first) = model_with("HTMLImageElement");
        let second = model.add_interface(Interface::new(Id::new("Other"), loc()));
        apply_to_interface(&mut model, first, vec![valued("NamedConstructor", "Image")]).unwrap();

        let err = apply_to_interface(&mut model, second, vec![valued("NamedConstructor", "Image")])
            .unwrap_err();
        assert_eq!(
            err.message(),
            "NamedConstructor conflicts with a NamedConstructor of a different interface"
        );
        assert_eq!(model.interface(first).named_constructors().len(), 1);
    }

    #[test]
    fn test_interface_value_required() {
        let (mut model, id) = model_with("Node");
        let err = apply_to_interface(&mut model, id, vec![flag("Pref")]).unwrap_err();

        assert_eq!(err.message(), "[Pref] must have a value");
    }

    #[test]
    fn test_callback_treat_flags_exclusive() {
        let mut callback = Callback::new(
            Id::new("Handler"),
            loc(),
            Type::builtin(BuiltinType::Void),
            Vec::new(),
        );
        let err = apply_to_callback(
            &mut callback,
            vec![flag("TreatNonCallableAsNull"), flag("TreatNonObjectAsNull")],
        )
        .unwrap_err();

        assert_eq!(
            err.message(),
            "Cannot specify both [TreatNonCallableAsNull] and [TreatNonObjectAsNull]"
        );
    }

    #[test]
    fn test_reject_all() {
        assert!(reject_all(&[], "dictionaries", loc()).is_ok());
        let err = reject_all(&[flag("Pure")], "enums", loc()).unwrap_err();
        assert_eq!(
            err.message(),
            "There are no extended attributes that are allowed on enums"
        );
    }
}
