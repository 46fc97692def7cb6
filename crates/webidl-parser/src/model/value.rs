//! Constant and default values.

use std::fmt;

use webidl_core::location::Location;

use super::{BuiltinType, Model, Type};
use crate::error::{Diagnostic, ErrorCode};

/// Largest magnitude an integer literal may have to convert to a float
/// without losing precision.
const FLOAT_EXACT_LIMIT: i64 = 1 << 24;

/// A literal value after (or before) coercion to a declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer { value: i64, ty: BuiltinType },
    Float { value: f64, ty: BuiltinType },
    /// A string, typed either as a string builtin or as an enum.
    String { value: String, ty: Type },
    Null,
    /// `[]`, only valid for sequence types.
    EmptySequence,
    /// Implicit default of an optional `any` argument.
    Undefined,
}

impl Value {
    /// An integer literal as written; literals start out as `long`.
    pub(crate) fn integer_literal(value: i64) -> Self {
        Value::Integer {
            value,
            ty: BuiltinType::Long,
        }
    }

    /// A float literal as written; literals start out as `unrestricted float`.
    pub(crate) fn float_literal(value: f64) -> Self {
        Value::Float {
            value,
            ty: BuiltinType::UnrestrictedFloat,
        }
    }

    pub(crate) fn string_literal(value: &str) -> Self {
        Value::String {
            value: value.to_string(),
            ty: Type::builtin(BuiltinType::DOMString),
        }
    }

    /// The type a value currently has.
    pub fn ty(&self) -> Option<Type> {
        match self {
            Value::Boolean(_) => Some(Type::builtin(BuiltinType::Boolean)),
            Value::Integer { ty, .. } | Value::Float { ty, .. } => Some(Type::builtin(*ty)),
            Value::String { ty, .. } => Some(ty.clone()),
            Value::Null | Value::EmptySequence | Value::Undefined => None,
        }
    }

    /// Convert a value to `target`, checking ranges and enum membership.
    ///
    /// `location` is the construct that owns the value and labels any error.
    pub fn coerce_to(
        &self,
        target: &Type,
        model: &Model,
        location: Location,
    ) -> Result<Value, Diagnostic> {
        match self {
            Value::Null => coerce_null(target, location),
            Value::EmptySequence => coerce_empty_sequence(target, location),
            Value::Undefined => {
                if target.is_any() {
                    Ok(Value::Undefined)
                } else {
                    Err(invalid_value(
                        format!("Cannot coerce undefined value to type {target}."),
                        location,
                    ))
                }
            }
            _ => self.coerce_literal(target, model, location),
        }
    }

    fn coerce_literal(
        &self,
        target: &Type,
        model: &Model,
        location: Location,
    ) -> Result<Value, Diagnostic> {
        if let Some(union) = target.as_union() {
            return union
                .flat_members
                .iter()
                .find_map(|member| self.coerce_literal(member, model, location).ok())
                .ok_or_else(|| self.cannot_coerce(target, location));
        }

        if let Type::Nullable(inner) = target {
            if !inner.is_enum() {
                return self.coerce_literal(inner, model, location);
            }
        }

        match (self, target.strip_nullable()) {
            (Value::Boolean(b), Type::Builtin(BuiltinType::Boolean)) => Ok(Value::Boolean(*b)),
            (Value::Integer { value, .. }, Type::Builtin(ty)) if ty.is_integer() => {
                let fits = ty
                    .integer_range()
                    .is_some_and(|(min, max)| (min..=max).contains(&i128::from(*value)));
                if fits {
                    Ok(Value::Integer {
                        value: *value,
                        ty: *ty,
                    })
                } else {
                    Err(invalid_value(
                        format!("Value {value} is out of range for type {ty}."),
                        location,
                    ))
                }
            }
            (Value::Integer { value, .. }, Type::Builtin(ty)) if ty.is_float() => {
                if (-FLOAT_EXACT_LIMIT..=FLOAT_EXACT_LIMIT).contains(value) {
                    Ok(Value::Float {
                        value: *value as f64,
                        ty: *ty,
                    })
                } else {
                    Err(invalid_value(
                        format!("Converting value {value} to {ty} will lose precision."),
                        location,
                    ))
                }
            }
            (Value::Float { value, .. }, Type::Builtin(ty)) if ty.is_float() => {
                if !ty.is_unrestricted() && !value.is_finite() {
                    Err(invalid_value(
                        format!(
                            "Trying to convert unrestricted value {value} to non-unrestricted"
                        ),
                        location,
                    ))
                } else {
                    Ok(Value::Float {
                        value: *value,
                        ty: *ty,
                    })
                }
            }
            (Value::String { value, .. }, Type::Enum(named)) => {
                let enumeration = model.enumeration(named.id);
                if enumeration.contains(value) {
                    Ok(Value::String {
                        value: value.clone(),
                        ty: target.clone(),
                    })
                } else {
                    Err(invalid_value(
                        format!(
                            "'{value}' is not a valid default value for enum {}",
                            enumeration.name()
                        ),
                        location,
                    )
                    .with_secondary_label(enumeration.location(), "enum declared here"))
                }
            }
            (
                Value::String { value, .. },
                Type::Builtin(ty @ (BuiltinType::DOMString | BuiltinType::USVString)),
            ) => Ok(Value::String {
                value: value.clone(),
                ty: Type::builtin(*ty),
            }),
            _ => Err(self.cannot_coerce(target, location)),
        }
    }

    fn cannot_coerce(&self, target: &Type, location: Location) -> Diagnostic {
        let source = self
            .ty()
            .map_or_else(|| "value".to_string(), |ty| ty.to_string());
        invalid_value(
            format!("Cannot coerce type {source} to type {target}."),
            location,
        )
    }
}

fn coerce_null(target: &Type, location: Location) -> Result<Value, Diagnostic> {
    let union = target.as_union();
    let accepts_null = target.nullable()
        || union.is_some_and(|u| u.has_nullable || u.has_dictionary)
        || target.is_dictionary()
        || target.is_any();
    if accepts_null {
        Ok(Value::Null)
    } else {
        Err(invalid_value(
            format!("Cannot coerce null value to type {target}."),
            location,
        ))
    }
}

fn coerce_empty_sequence(target: &Type, location: Location) -> Result<Value, Diagnostic> {
    let accepts = target.is_sequence()
        || target
            .as_union()
            .is_some_and(|u| u.flat_members.iter().any(Type::is_sequence));
    if accepts {
        Ok(Value::EmptySequence)
    } else {
        Err(invalid_value(
            format!("Cannot coerce empty sequence value to type {target}."),
            location,
        ))
    }
}

fn invalid_value(message: String, location: Location) -> Diagnostic {
    Diagnostic::error(message)
        .with_code(ErrorCode::E303)
        .with_label(location, "invalid value")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer { value, .. } => write!(f, "{value}"),
            Value::Float { value, .. } => write!(f, "{value}"),
            Value::String { value, .. } => write!(f, "\"{value}\""),
            Value::Null => f.write_str("null"),
            Value::EmptySequence => f.write_str("[]"),
            Value::Undefined => f.write_str("undefined"),
        }
    }
}
