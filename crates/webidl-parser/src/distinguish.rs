//! Distinguishability of WebIDL types.
//!
//! Two types are distinguishable when a JavaScript value can be routed to
//! at most one of them. Union members and the arguments at an overload's
//! distinguishing index must be pairwise distinguishable.

use crate::model::{BuiltinType, InterfaceType, Model, Type};

/// Whether values of `a` and `b` can always be told apart.
///
/// The relation is symmetric. `void`, `any` and promise types are never
/// distinguishable from anything.
pub fn is_distinguishable(model: &Model, a: &Type, b: &Type) -> bool {
    if a.is_promise() || b.is_promise() {
        return false;
    }

    if let Type::Nullable(inner) = a {
        let other_has_null = b.nullable()
            || b
                .as_union()
                .is_some_and(|union| union.has_nullable || union.members.iter().any(Type::nullable))
            || b.is_dictionary();
        return !other_has_null && is_distinguishable(model, inner, b);
    }

    if let Type::Union(union) = a {
        let others: Vec<&Type> = match b.as_union() {
            Some(other) => other.members.iter().collect(),
            None => vec![b],
        };
        return others.iter().all(|other| {
            union
                .members
                .iter()
                .all(|member| is_distinguishable(model, member, other))
        });
    }

    if b.is_union() {
        return is_distinguishable(model, b, a);
    }

    match a {
        Type::Builtin(builtin) => builtin_distinguishable(*builtin, b),
        Type::Interface(iface) => interface_distinguishable(model, iface, b),
        Type::Dictionary(_) => {
            !b.nullable()
                && (b.is_primitive()
                    || b.is_string()
                    || b.is_enum()
                    || b.is_date()
                    || b.is_sequence()
                    || b.is_non_callback_interface())
        }
        Type::Enum(_) => {
            b.is_primitive()
                || b.is_interface()
                || b.is_object()
                || b.is_callback()
                || b.is_dictionary()
                || b.is_sequence()
                || b.is_mozmap()
                || b.is_array()
                || b.is_date()
        }
        Type::Callback(_) => {
            b.is_primitive()
                || b.is_string()
                || b.is_enum()
                || b.is_non_callback_interface()
                || b.is_date()
                || b.is_sequence()
        }
        Type::Sequence(_) => {
            b.is_primitive()
                || b.is_string()
                || b.is_enum()
                || b.is_date()
                || b.is_interface()
                || b.is_dictionary()
                || b.is_callback()
                || b.is_mozmap()
        }
        Type::MozMap(_) => {
            b.is_primitive()
                || b.is_string()
                || b.is_enum()
                || b.is_non_callback_interface()
                || b.is_sequence()
                || b.is_date()
        }
        Type::Array(_) => {
            b.is_primitive()
                || b.is_string()
                || b.is_enum()
                || b.is_date()
                || b.is_non_callback_interface()
        }
        Type::Unresolved { .. } | Type::Nullable(_) | Type::Union(_) => false,
    }
}

/// Everything a boolean or a number can be told apart from.
fn distinct_from_scalar(other: &Type) -> bool {
    other.is_enum()
        || other.is_interface()
        || other.is_object()
        || other.is_callback()
        || other.is_dictionary()
        || other.is_sequence()
        || other.is_mozmap()
        || other.is_array()
        || other.is_date()
}

fn builtin_distinguishable(builtin: BuiltinType, other: &Type) -> bool {
    match builtin {
        BuiltinType::Boolean => {
            other.is_numeric() || other.is_string() || distinct_from_scalar(other)
        }
        b if b.is_numeric() => {
            other.is_boolean() || other.is_string() || distinct_from_scalar(other)
        }
        b if b.is_string() => {
            other.is_primitive()
                || other.is_interface()
                || other.is_object()
                || other.is_callback()
                || other.is_dictionary()
                || other.is_sequence()
                || other.is_mozmap()
                || other.is_array()
                || other.is_date()
        }
        BuiltinType::Any | BuiltinType::Void => false,
        BuiltinType::Object => other.is_primitive() || other.is_string() || other.is_enum(),
        BuiltinType::Date => {
            other.is_primitive()
                || other.is_string()
                || other.is_enum()
                || other.is_interface()
                || other.is_callback()
                || other.is_dictionary()
                || other.is_sequence()
                || other.is_mozmap()
                || other.is_array()
        }
        buffer => {
            other.is_primitive()
                || other.is_string()
                || other.is_enum()
                || other.is_callback()
                || other.is_dictionary()
                || other.is_sequence()
                || other.is_mozmap()
                || other.is_array()
                || other.is_date()
                || (other.is_interface() && buffer_distinguishable(buffer, other))
        }
    }
}

/// A buffer type against another interface-like type.
fn buffer_distinguishable(buffer: BuiltinType, other: &Type) -> bool {
    let other_builtin = other.as_builtin();
    let is = |kind: BuiltinType| other_builtin == Some(kind);
    let other_typed = other_builtin.is_some_and(|b| b.is_typed_array());
    let other_shared_typed = other_builtin.is_some_and(|b| b.is_shared_typed_array());

    match buffer {
        BuiltinType::ArrayBuffer => !is(BuiltinType::ArrayBuffer),
        BuiltinType::SharedArrayBuffer => !is(BuiltinType::SharedArrayBuffer),
        BuiltinType::ArrayBufferView => !is(BuiltinType::ArrayBufferView) && !other_typed,
        BuiltinType::SharedArrayBufferView => {
            !is(BuiltinType::SharedArrayBufferView) && !other_shared_typed
        }
        typed if typed.is_typed_array() => !is(BuiltinType::ArrayBufferView) && !is(typed),
        typed if typed.is_shared_typed_array() => {
            !is(BuiltinType::SharedArrayBufferView) && !is(typed)
        }
        _ => false,
    }
}

fn interface_distinguishable(model: &Model, iface: &InterfaceType, other: &Type) -> bool {
    if other.is_primitive()
        || other.is_string()
        || other.is_enum()
        || other.is_date()
        || other.is_sequence()
    {
        return true;
    }

    if let Some(builtin) = other.as_builtin().filter(BuiltinType::is_buffer) {
        return builtin_distinguishable(builtin, &Type::Interface(iface.clone()));
    }

    if let Some(other_iface) = other.as_interface() {
        let ours = model.interface(iface.id).interfaces_based_on_self();
        let theirs = model.interface(other_iface.id).interfaces_based_on_self();
        return ours.is_disjoint(theirs) && (!iface.is_callback || !other_iface.is_callback);
    }

    if other.is_dictionary() || other.is_callback() || other.is_mozmap() || other.is_array() {
        return !iface.is_callback;
    }

    false
}
