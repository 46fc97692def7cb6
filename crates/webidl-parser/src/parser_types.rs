//! Parser syntax tree
//!
//! This module defines the data structures the grammar produces. They mirror
//! WebIDL source closely and carry no semantic information: names are not
//! resolved, types are not completed and extended attributes are not
//! interpreted. [`crate::elaborate`] turns them into the [`crate::model`].
//!
//! ## Source Location Tracking
//!
//! Names are wrapped in [`Spanned<T>`] and composite nodes carry the span of
//! the token that anchors their diagnostics.

use std::fmt;

use crate::{
    model::BuiltinType,
    span::{Span, Spanned},
};

/// Right-hand side of an extended attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtendedAttributeArgs<'src> {
    /// `[Name]`
    NoArgs,
    /// `[Name=Identifier]`
    Identifier(Spanned<&'src str>),
    /// `[Name="string"]`
    String(Spanned<&'src str>),
    /// `[Name=(A, B)]`
    Identifiers(Vec<Spanned<&'src str>>),
    /// `[Name(arguments)]`
    Arguments(Vec<Argument<'src>>),
    /// `[Name=Other(arguments)]`
    NamedArguments {
        name: Spanned<&'src str>,
        arguments: Vec<Argument<'src>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedAttribute<'src> {
    pub name: Spanned<&'src str>,
    pub args: ExtendedAttributeArgs<'src>,
    pub span: Span,
}

impl fmt::Display for ExtendedAttribute<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match &self.args {
            ExtendedAttributeArgs::NoArgs => Ok(()),
            ExtendedAttributeArgs::Identifier(id) => write!(f, "={id}"),
            ExtendedAttributeArgs::String(s) => write!(f, "=\"{s}\""),
            ExtendedAttributeArgs::Identifiers(ids) => {
                let ids: Vec<&str> = ids.iter().map(|id| *id.inner()).collect();
                write!(f, "=({})", ids.join(", "))
            }
            ExtendedAttributeArgs::Arguments(args) => write!(f, "({})", args.len()),
            ExtendedAttributeArgs::NamedArguments { name, arguments } => {
                write!(f, "={name}({})", arguments.len())
            }
        }
    }
}

/// A type as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind<'src> {
    Builtin(BuiltinType),
    Named(&'src str),
    Promise(Box<TypeExpr<'src>>),
    Sequence(Box<TypeExpr<'src>>),
    MozMap(Box<TypeExpr<'src>>),
    Union(Vec<TypeExpr<'src>>),
    Nullable(Box<TypeExpr<'src>>),
    Array(Box<TypeExpr<'src>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr<'src> {
    pub kind: TypeKind<'src>,
    pub span: Span,
}

impl<'src> TypeExpr<'src> {
    pub fn new(kind: TypeKind<'src>, span: Span) -> Self {
        Self { kind, span }
    }
}

impl fmt::Display for TypeExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Builtin(builtin) => write!(f, "{builtin}"),
            TypeKind::Named(name) => f.write_str(name),
            TypeKind::Promise(inner) => write!(f, "Promise<{inner}>"),
            TypeKind::Sequence(inner) => write!(f, "sequence<{inner}>"),
            TypeKind::MozMap(inner) => write!(f, "MozMap<{inner}>"),
            TypeKind::Union(members) => {
                let members: Vec<String> = members.iter().map(ToString::to_string).collect();
                write!(f, "({})", members.join(" or "))
            }
            TypeKind::Nullable(inner) => write!(f, "{inner}?"),
            TypeKind::Array(inner) => write!(f, "{inner}[]"),
        }
    }
}

/// Literal values for constants and defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueLiteral<'src> {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(&'src str),
    Null,
    /// `[]`
    EmptySequence,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument<'src> {
    pub ext_attrs: Vec<ExtendedAttribute<'src>>,
    pub name: Spanned<&'src str>,
    pub ty: TypeExpr<'src>,
    pub optional: bool,
    pub variadic: bool,
    pub default: Option<Spanned<ValueLiteral<'src>>>,
}

/// Qualifiers in front of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    Static,
    Getter,
    Setter,
    Creator,
    Deleter,
    Legacycaller,
    Stringifier,
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Qualifier::Static => "static",
            Qualifier::Getter => "getter",
            Qualifier::Setter => "setter",
            Qualifier::Creator => "creator",
            Qualifier::Deleter => "deleter",
            Qualifier::Legacycaller => "legacycaller",
            Qualifier::Stringifier => "stringifier",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Maplike,
    Setlike,
}

/// The body of an interface member, without extended attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceMember<'src> {
    Const {
        ty: TypeExpr<'src>,
        name: Spanned<&'src str>,
        value: Spanned<ValueLiteral<'src>>,
    },
    Attribute {
        readonly: bool,
        inherit: bool,
        is_static: bool,
        stringifier: bool,
        ty: TypeExpr<'src>,
        name: Spanned<&'src str>,
    },
    Operation {
        qualifiers: Vec<Spanned<Qualifier>>,
        return_type: TypeExpr<'src>,
        name: Option<Spanned<&'src str>>,
        arguments: Vec<Argument<'src>>,
    },
    /// `stringifier;`
    Stringifier,
    /// `jsonifier;`
    Jsonifier,
    MaplikeOrSetlike {
        kind: CollectionKind,
        readonly: bool,
        key: TypeExpr<'src>,
        value: Option<TypeExpr<'src>>,
    },
}

/// An interface member together with its extended attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Member<'src> {
    pub ext_attrs: Vec<ExtendedAttribute<'src>>,
    pub body: InterfaceMember<'src>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryMember<'src> {
    pub ext_attrs: Vec<ExtendedAttribute<'src>>,
    pub required: bool,
    pub ty: TypeExpr<'src>,
    pub name: Spanned<&'src str>,
    pub default: Option<Spanned<ValueLiteral<'src>>>,
}

/// A top-level production.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition<'src> {
    Interface {
        name: Spanned<&'src str>,
        parent: Option<Spanned<&'src str>>,
        members: Vec<Member<'src>>,
        is_callback: bool,
    },
    Partial {
        name: Spanned<&'src str>,
        members: Vec<Member<'src>>,
    },
    /// `interface Name;`
    ForwardDeclaration { name: Spanned<&'src str> },
    Dictionary {
        name: Spanned<&'src str>,
        parent: Option<Spanned<&'src str>>,
        members: Vec<DictionaryMember<'src>>,
    },
    Enum {
        name: Spanned<&'src str>,
        values: Vec<Spanned<&'src str>>,
    },
    Callback {
        name: Spanned<&'src str>,
        return_type: TypeExpr<'src>,
        arguments: Vec<Argument<'src>>,
    },
    Typedef {
        ty: TypeExpr<'src>,
        name: Spanned<&'src str>,
    },
    Implements {
        implementor: Spanned<&'src str>,
        implementee: Spanned<&'src str>,
    },
    /// `exception Name { ... };`, parsed and skipped.
    Exception { name: Spanned<&'src str> },
    /// `module Name { ... };`, parsed and skipped.
    Module { name: Spanned<&'src str> },
}

/// A definition with the extended attributes in front of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotated<'src> {
    pub ext_attrs: Vec<ExtendedAttribute<'src>>,
    pub definition: Definition<'src>,
    /// Span of the keyword that opens the definition.
    pub keyword_span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> TypeExpr<'_> {
        TypeExpr::new(TypeKind::Named(name), Span::default())
    }

    #[test]
    fn test_type_display() {
        let ty = TypeExpr::new(
            TypeKind::Nullable(Box::new(TypeExpr::new(
                TypeKind::Union(vec![
                    named("Node"),
                    TypeExpr::new(TypeKind::Builtin(BuiltinType::DOMString), Span::default()),
                ]),
                Span::default(),
            ))),
            Span::default(),
        );

        assert_eq!(ty.to_string(), "(Node or DOMString)?");
    }

    #[test]
    fn test_extended_attribute_display() {
        let attr = ExtendedAttribute {
            name: Spanned::new("Exposed", Span::default()),
            args: ExtendedAttributeArgs::Identifiers(vec![
                Spanned::new("Window", Span::default()),
                Spanned::new("Worker", Span::default()),
            ]),
            span: Span::default(),
        };

        assert_eq!(attr.to_string(), "Exposed=(Window, Worker)");
    }
}
