//! Type completion.
//!
//! Completion resolves every name in a [`Type`] against the global scope,
//! unwraps typedefs, flattens unions and enforces the composition rules for
//! nullable, array and union types. Completing an already complete type
//! returns an equal type.

use log::trace;
use webidl_core::{identifier::Id, location::Location};

use crate::{
    distinguish::is_distinguishable,
    error::{Diagnostic, ErrorCode, Result},
    model::{Argument, InterfaceType, Model, NamedType, Type, TypedefId, UnionType, Value},
    scope::Binding,
};

/// Resolves types against a model.
///
/// `location` labels errors raised for types that carry no location of
/// their own.
pub(crate) struct TypeCompleter<'m> {
    model: &'m Model,
    location: Location,
    /// Typedefs currently being expanded.
    visiting: Vec<TypedefId>,
}

impl<'m> TypeCompleter<'m> {
    pub fn new(model: &'m Model, location: Location) -> Self {
        Self {
            model,
            location,
            visiting: Vec::new(),
        }
    }

    pub fn complete(&mut self, ty: &Type) -> Result<Type> {
        match ty {
            Type::Unresolved {
                name,
                location,
                promise_inner,
            } => self.resolve(*name, *location, promise_inner.as_deref()),
            Type::Builtin(_) | Type::Dictionary(_) | Type::Enum(_) | Type::Callback(_) => {
                Ok(ty.clone())
            }
            Type::Interface(iface) => {
                let promise_inner = iface
                    .promise_inner
                    .as_deref()
                    .map(|inner| self.complete(inner).map(Box::new))
                    .transpose()?;
                Ok(Type::Interface(InterfaceType {
                    promise_inner,
                    ..iface.clone()
                }))
            }
            Type::Nullable(inner) => self.complete_nullable(inner),
            Type::Sequence(inner) => Ok(Type::Sequence(Box::new(self.complete(inner)?))),
            Type::MozMap(inner) => Ok(Type::MozMap(Box::new(self.complete(inner)?))),
            Type::Array(inner) => self.complete_array(inner),
            Type::Union(union) if ty.is_complete() => Ok(Type::Union(union.clone())),
            Type::Union(union) => self.complete_union(union),
        }
    }

    fn resolve(
        &mut self,
        name: Id,
        location: Location,
        promise_inner: Option<&Type>,
    ) -> Result<Type> {
        let Some(binding) = self.model.scope.lookup(name) else {
            return Err(Diagnostic::error(format!("Unresolved type '{name}'."))
                .with_code(ErrorCode::E202)
                .with_label(location, "unknown type"));
        };

        trace!(name:% = name, kind = binding.kind(); "Resolving type");
        match binding {
            Binding::Typedef(typedef) => {
                if self.visiting.contains(&typedef) {
                    let target = self.model.typedef(typedef);
                    return Err(Diagnostic::error(format!(
                        "Typedef {} refers to itself",
                        target.name()
                    ))
                    .with_code(ErrorCode::E304)
                    .with_label(target.location(), "typedef")
                    .with_secondary_label(location, "referenced here"));
                }
                self.visiting.push(typedef);
                let inner = self.model.typedef(typedef).inner().clone();
                let completed = self.complete(&inner);
                self.visiting.pop();
                completed
            }
            Binding::Interface(iface) => {
                let promise_inner = promise_inner
                    .map(|inner| self.complete(inner).map(Box::new))
                    .transpose()?;
                let target = self.model.interface(iface);
                Ok(Type::Interface(InterfaceType {
                    id: iface,
                    name: target.name(),
                    is_callback: target.is_callback(),
                    promise_inner,
                }))
            }
            Binding::Dictionary(dictionary) => Ok(Type::Dictionary(NamedType {
                id: dictionary,
                name,
            })),
            Binding::Enum(enumeration) => Ok(Type::Enum(NamedType {
                id: enumeration,
                name,
            })),
            Binding::Callback(callback) => Ok(Type::Callback(NamedType { id: callback, name })),
            Binding::NamedConstructor(_) => {
                Err(Diagnostic::error(format!("'{name}' does not name a type"))
                    .with_code(ErrorCode::E202)
                    .with_label(location, "not a type"))
            }
        }
    }

    fn complete_nullable(&mut self, inner: &Type) -> Result<Type> {
        let inner = self.complete(inner)?;
        if inner.nullable() {
            return Err(self.error(
                ErrorCode::E300,
                "The inner type of a nullable type must not be a nullable type",
            ));
        }
        if inner.as_union().is_some_and(|union| union.has_nullable) {
            return Err(self.error(
                ErrorCode::E300,
                "The inner type of a nullable type must not be a union type that itself has a nullable type as a member type",
            ));
        }
        Ok(Type::Nullable(Box::new(inner)))
    }

    fn complete_array(&mut self, inner: &Type) -> Result<Type> {
        let inner = self.complete(inner)?;
        if inner.is_sequence() {
            return Err(self.error(
                ErrorCode::E302,
                "Array type cannot parameterize over a sequence type",
            ));
        }
        if inner.is_mozmap() {
            return Err(self.error(
                ErrorCode::E302,
                "Array type cannot parameterize over a MozMap type",
            ));
        }
        if inner.is_dictionary() {
            return Err(self.error(
                ErrorCode::E302,
                "Array type must not contain dictionary as element type.",
            ));
        }
        Ok(Type::Array(Box::new(inner)))
    }

    fn complete_union(&mut self, union: &UnionType) -> Result<Type> {
        let members = union
            .members
            .iter()
            .map(|member| self.complete(member))
            .collect::<Result<Vec<_>>>()?;
        let mut completed = UnionType::new(members.clone(), union.location);

        let mut pending = members;
        pending.reverse();
        let mut flat = Vec::new();
        let mut has_dictionary = false;
        while let Some(member) = pending.pop() {
            match member {
                Type::Nullable(inner) => {
                    if completed.has_nullable {
                        return Err(self.union_error(
                            union.location,
                            "Can't have more than one nullable types in a union",
                        ));
                    }
                    if has_dictionary {
                        return Err(self.union_error(
                            union.location,
                            "Can't have a nullable type and a dictionary type in a union",
                        ));
                    }
                    completed.has_nullable = true;
                    pending.push(*inner);
                }
                Type::Union(nested) => {
                    pending.extend(nested.members.into_iter().rev());
                }
                other => {
                    if other.is_dictionary() {
                        if completed.has_nullable {
                            return Err(self.union_error(
                                union.location,
                                "Can't have a nullable type and a dictionary type in a union",
                            ));
                        }
                        has_dictionary = true;
                    }
                    flat.push(other);
                }
            }
        }

        for (idx, first) in flat.iter().enumerate() {
            for second in &flat[idx + 1..] {
                if !is_distinguishable(self.model, first, second) {
                    return Err(self.union_error(
                        union.location,
                        &format!(
                            "Flat member types of a union should be distinguishable, {first} is not distinguishable from {second}"
                        ),
                    ));
                }
            }
        }

        completed.flat_members = flat;
        completed.has_dictionary = has_dictionary;
        completed.mark_complete();
        Ok(Type::Union(completed))
    }

    fn error(&self, code: ErrorCode, message: &str) -> Diagnostic {
        Diagnostic::error(message)
            .with_code(code)
            .with_label(self.location, "in this type")
    }

    fn union_error(&self, location: Location, message: &str) -> Diagnostic {
        Diagnostic::error(message)
            .with_code(ErrorCode::E301)
            .with_label(location, "union type")
    }
}

/// Complete a type in the context of the construct at `location`.
pub(crate) fn complete_type(model: &Model, ty: &Type, location: Location) -> Result<Type> {
    TypeCompleter::new(model, location).complete(ty)
}

/// Complete an argument or dictionary member in place.
///
/// Optional arguments that are not variadic and have no default get an
/// implicit one: `null` for dictionaries and unions containing one,
/// `undefined` for `any`. The default is then coerced to the type.
pub(crate) fn complete_argument(model: &Model, argument: &mut Argument) -> Result<()> {
    argument.ty = complete_type(model, &argument.ty, argument.location)?;

    let implicit_default = argument.optional && argument.default.is_none() && !argument.variadic;
    let holds_dictionary = argument.ty.is_dictionary()
        || argument
            .ty
            .as_union()
            .is_some_and(|union| union.has_dictionary);
    if implicit_default && holds_dictionary {
        argument.default = Some(Value::Null);
    } else if implicit_default && argument.ty.is_any() {
        argument.default = Some(Value::Undefined);
    }

    if let Some(default) = &argument.default {
        argument.default = Some(default.coerce_to(&argument.ty, model, argument.location)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BuiltinType, Dictionary, Enumeration, Interface, Typedef};

    fn loc() -> Location {
        Location::builtin("<test>")
    }

    fn named(name: &str) -> Type {
        Type::unresolved(Id::new(name), loc())
    }

    fn long() -> Type {
        Type::builtin(BuiltinType::Long)
    }

    fn union(members: Vec<Type>) -> Type {
        Type::Union(UnionType::new(members, loc()))
    }

    fn model() -> Model {
        let mut model = Model::new();
        let node = model.add_interface(Interface::new(Id::new("Node"), loc()));
        model
            .scope
            .bind(Id::new("Node"), Binding::Interface(node), loc())
            .unwrap();

        let dict = model.add_dictionary(Dictionary::new(Id::new("Init"), loc(), None));
        model
            .scope
            .bind(Id::new("Init"), Binding::Dictionary(dict), loc())
            .unwrap();

        let color = model.add_enum(Enumeration::new(
            Id::new("Color"),
            loc(),
            vec!["red".into(), "green".into()],
        ));
        model
            .scope
            .bind(Id::new("Color"), Binding::Enum(color), loc())
            .unwrap();

        let typedef = model.add_typedef(Typedef::new(
            Id::new("Size"),
            loc(),
            Type::builtin(BuiltinType::UnsignedLong),
        ));
        model
            .scope
            .bind(Id::new("Size"), Binding::Typedef(typedef), loc())
            .unwrap();
        model
    }

    #[test]
    fn test_resolves_names() {
        let model = model();

        let node = complete_type(&model, &named("Node"), loc()).unwrap();
        assert!(node.is_non_callback_interface());

        let size = complete_type(&model, &named("Size"), loc()).unwrap();
        assert_eq!(size, Type::builtin(BuiltinType::UnsignedLong));

        let color = complete_type(&model, &Type::Sequence(Box::new(named("Color"))), loc()).unwrap();
        assert_eq!(color.to_string(), "sequence<Color>");
    }

    #[test]
    fn test_unresolved_type() {
        let model = model();
        let err = complete_type(&model, &named("Missing"), loc()).unwrap_err();

        assert_eq!(err.message(), "Unresolved type 'Missing'.");
        assert_eq!(err.code(), Some(ErrorCode::E202));
    }

    #[test]
    fn test_completion_is_idempotent() {
        let model = model();
        let ty = Type::Nullable(Box::new(union(vec![named("Node"), long()])));

        let once = complete_type(&model, &ty, loc()).unwrap();
        let twice = complete_type(&model, &once, loc()).unwrap();
        assert_eq!(once, twice);
        assert!(twice.is_complete());
    }

    #[test]
    fn test_nullable_of_nullable_through_typedef() {
        let mut model = model();
        let typedef = model.add_typedef(Typedef::new(
            Id::new("MaybeLong"),
            loc(),
            Type::Nullable(Box::new(long())),
        ));
        model
            .scope
            .bind(Id::new("MaybeLong"), Binding::Typedef(typedef), loc())
            .unwrap();

        let err = complete_type(&model, &Type::Nullable(Box::new(named("MaybeLong"))), loc())
            .unwrap_err();
        assert_eq!(
            err.message(),
            "The inner type of a nullable type must not be a nullable type"
        );
    }

    #[test]
    fn test_typedef_cycle() {
        let mut model = model();
        let a = model.add_typedef(Typedef::new(Id::new("A"), loc(), named("B")));
        let b = model.add_typedef(Typedef::new(Id::new("B"), loc(), named("A")));
        model.scope.bind(Id::new("A"), Binding::Typedef(a), loc()).unwrap();
        model.scope.bind(Id::new("B"), Binding::Typedef(b), loc()).unwrap();

        let err = complete_type(&model, &named("A"), loc()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E304));
    }

    #[test]
    fn test_array_of_dictionary() {
        let model = model();
        let err = complete_type(&model, &Type::Array(Box::new(named("Init"))), loc()).unwrap_err();

        assert_eq!(
            err.message(),
            "Array type must not contain dictionary as element type."
        );
    }

    #[test]
    fn test_union_flattening() {
        let model = model();
        let nested = union(vec![
            Type::Nullable(Box::new(long())),
            union(vec![named("Node"), Type::builtin(BuiltinType::DOMString)]),
        ]);

        let completed = complete_type(&model, &nested, loc()).unwrap();
        let flat = completed.as_union().unwrap();
        assert!(flat.has_nullable);
        assert_eq!(flat.flat_members.len(), 3);
        assert_eq!(flat.flat_members[0], long());
    }

    #[test]
    fn test_union_members_must_be_distinguishable() {
        let model = model();
        let err = complete_type(
            &model,
            &union(vec![long(), Type::builtin(BuiltinType::Double)]),
            loc(),
        )
        .unwrap_err();

        assert_eq!(
            err.message(),
            "Flat member types of a union should be distinguishable, long is not distinguishable from double"
        );
    }

    #[test]
    fn test_union_nullable_and_dictionary() {
        let model = model();
        let err = complete_type(
            &model,
            &union(vec![named("Init"), Type::Nullable(Box::new(long()))]),
            loc(),
        )
        .unwrap_err();

        assert_eq!(
            err.message(),
            "Can't have a nullable type and a dictionary type in a union"
        );
    }

    #[test]
    fn test_argument_defaults() {
        let model = model();

        let mut dict = Argument::new(Id::new("init"), loc(), named("Init"));
        dict.optional = true;
        complete_argument(&model, &mut dict).unwrap();
        assert_eq!(dict.default, Some(Value::Null));

        let mut any = Argument::new(Id::new("value"), loc(), Type::builtin(BuiltinType::Any));
        any.optional = true;
        complete_argument(&model, &mut any).unwrap();
        assert_eq!(any.default, Some(Value::Undefined));

        let mut required = Argument::new(Id::new("init"), loc(), named("Init"));
        complete_argument(&model, &mut required).unwrap();
        assert_eq!(required.default, None);

        let mut color = Argument::new(Id::new("color"), loc(), named("Color"));
        color.optional = true;
        color.default = Some(Value::string_literal("blue"));
        let err = complete_argument(&model, &mut color).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E303));
    }
}
