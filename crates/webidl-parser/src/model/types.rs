//! WebIDL types.
//!
//! A [`Type`] starts out as written in source: named references are
//! [`Type::Unresolved`] and unions have no flattened member list. Completion
//! (see [`crate::complete`]) replaces it with a fully resolved value. Every
//! predicate here looks through a nullable wrapper, so `Node?` answers
//! `is_interface()` the same way `Node` does.

use std::fmt;

use webidl_core::{identifier::Id, location::Location};

use super::{CallbackId, DictionaryId, EnumId, InterfaceId};

/// Primitive and platform types known without any declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Byte,
    Octet,
    Short,
    UnsignedShort,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    Boolean,
    UnrestrictedFloat,
    Float,
    UnrestrictedDouble,
    Double,
    Any,
    DOMString,
    ByteString,
    USVString,
    Object,
    Date,
    Void,
    ArrayBuffer,
    ArrayBufferView,
    SharedArrayBuffer,
    SharedArrayBufferView,
    Int8Array,
    Uint8Array,
    Uint8ClampedArray,
    Int16Array,
    Uint16Array,
    Int32Array,
    Uint32Array,
    Float32Array,
    Float64Array,
    SharedInt8Array,
    SharedUint8Array,
    SharedUint8ClampedArray,
    SharedInt16Array,
    SharedUint16Array,
    SharedInt32Array,
    SharedUint32Array,
    SharedFloat32Array,
    SharedFloat64Array,
}

impl BuiltinType {
    /// Buffer and typed array types, installed as builtin typedefs under
    /// their own names.
    pub const BUFFER_TYPES: [BuiltinType; 22] = [
        BuiltinType::ArrayBuffer,
        BuiltinType::ArrayBufferView,
        BuiltinType::SharedArrayBuffer,
        BuiltinType::SharedArrayBufferView,
        BuiltinType::Int8Array,
        BuiltinType::Uint8Array,
        BuiltinType::Uint8ClampedArray,
        BuiltinType::Int16Array,
        BuiltinType::Uint16Array,
        BuiltinType::Int32Array,
        BuiltinType::Uint32Array,
        BuiltinType::Float32Array,
        BuiltinType::Float64Array,
        BuiltinType::SharedInt8Array,
        BuiltinType::SharedUint8Array,
        BuiltinType::SharedUint8ClampedArray,
        BuiltinType::SharedInt16Array,
        BuiltinType::SharedUint16Array,
        BuiltinType::SharedInt32Array,
        BuiltinType::SharedUint32Array,
        BuiltinType::SharedFloat32Array,
        BuiltinType::SharedFloat64Array,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinType::Byte => "byte",
            BuiltinType::Octet => "octet",
            BuiltinType::Short => "short",
            BuiltinType::UnsignedShort => "unsigned short",
            BuiltinType::Long => "long",
            BuiltinType::UnsignedLong => "unsigned long",
            BuiltinType::LongLong => "long long",
            BuiltinType::UnsignedLongLong => "unsigned long long",
            BuiltinType::Boolean => "boolean",
            BuiltinType::UnrestrictedFloat => "unrestricted float",
            BuiltinType::Float => "float",
            BuiltinType::UnrestrictedDouble => "unrestricted double",
            BuiltinType::Double => "double",
            BuiltinType::Any => "any",
            BuiltinType::DOMString => "DOMString",
            BuiltinType::ByteString => "ByteString",
            BuiltinType::USVString => "USVString",
            BuiltinType::Object => "object",
            BuiltinType::Date => "Date",
            BuiltinType::Void => "void",
            BuiltinType::ArrayBuffer => "ArrayBuffer",
            BuiltinType::ArrayBufferView => "ArrayBufferView",
            BuiltinType::SharedArrayBuffer => "SharedArrayBuffer",
            BuiltinType::SharedArrayBufferView => "SharedArrayBufferView",
            BuiltinType::Int8Array => "Int8Array",
            BuiltinType::Uint8Array => "Uint8Array",
            BuiltinType::Uint8ClampedArray => "Uint8ClampedArray",
            BuiltinType::Int16Array => "Int16Array",
            BuiltinType::Uint16Array => "Uint16Array",
            BuiltinType::Int32Array => "Int32Array",
            BuiltinType::Uint32Array => "Uint32Array",
            BuiltinType::Float32Array => "Float32Array",
            BuiltinType::Float64Array => "Float64Array",
            BuiltinType::SharedInt8Array => "SharedInt8Array",
            BuiltinType::SharedUint8Array => "SharedUint8Array",
            BuiltinType::SharedUint8ClampedArray => "SharedUint8ClampedArray",
            BuiltinType::SharedInt16Array => "SharedInt16Array",
            BuiltinType::SharedUint16Array => "SharedUint16Array",
            BuiltinType::SharedInt32Array => "SharedInt32Array",
            BuiltinType::SharedUint32Array => "SharedUint32Array",
            BuiltinType::SharedFloat32Array => "SharedFloat32Array",
            BuiltinType::SharedFloat64Array => "SharedFloat64Array",
        }
    }

    /// Inclusive value range of an integer type.
    pub fn integer_range(&self) -> Option<(i128, i128)> {
        let range = match self {
            BuiltinType::Byte => (-(1 << 7), (1 << 7) - 1),
            BuiltinType::Octet => (0, (1 << 8) - 1),
            BuiltinType::Short => (-(1 << 15), (1 << 15) - 1),
            BuiltinType::UnsignedShort => (0, (1 << 16) - 1),
            BuiltinType::Long => (-(1 << 31), (1 << 31) - 1),
            BuiltinType::UnsignedLong => (0, (1 << 32) - 1),
            BuiltinType::LongLong => (-(1 << 63), (1 << 63) - 1),
            BuiltinType::UnsignedLongLong => (0, (1 << 64) - 1),
            _ => return None,
        };
        Some(range)
    }

    pub fn is_integer(&self) -> bool {
        self.integer_range().is_some()
    }

    pub fn is_float(&self) -> bool {
        matches!(
            self,
            BuiltinType::Float
                | BuiltinType::UnrestrictedFloat
                | BuiltinType::Double
                | BuiltinType::UnrestrictedDouble
        )
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(
            self,
            BuiltinType::UnrestrictedFloat | BuiltinType::UnrestrictedDouble
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn is_primitive(&self) -> bool {
        self.is_numeric() || *self == BuiltinType::Boolean
    }

    pub fn is_string(&self) -> bool {
        matches!(
            self,
            BuiltinType::DOMString | BuiltinType::ByteString | BuiltinType::USVString
        )
    }

    /// Buffer sources and typed arrays.
    pub fn is_buffer(&self) -> bool {
        Self::BUFFER_TYPES.contains(self)
    }

    pub fn is_typed_array(&self) -> bool {
        matches!(
            self,
            BuiltinType::Int8Array
                | BuiltinType::Uint8Array
                | BuiltinType::Uint8ClampedArray
                | BuiltinType::Int16Array
                | BuiltinType::Uint16Array
                | BuiltinType::Int32Array
                | BuiltinType::Uint32Array
                | BuiltinType::Float32Array
                | BuiltinType::Float64Array
        )
    }

    pub fn is_shared_typed_array(&self) -> bool {
        matches!(
            self,
            BuiltinType::SharedInt8Array
                | BuiltinType::SharedUint8Array
                | BuiltinType::SharedUint8ClampedArray
                | BuiltinType::SharedInt16Array
                | BuiltinType::SharedUint16Array
                | BuiltinType::SharedInt32Array
                | BuiltinType::SharedUint32Array
                | BuiltinType::SharedFloat32Array
                | BuiltinType::SharedFloat64Array
        )
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference to a declared dictionary, enum or callback.
#[derive(Debug, Clone, Copy)]
pub struct NamedType<I> {
    pub id: I,
    pub name: Id,
}

impl<I: PartialEq> PartialEq for NamedType<I> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Reference to a declared interface.
///
/// `Promise<T>` resolves to the interface named `Promise` and keeps `T` in
/// `promise_inner`.
#[derive(Debug, Clone)]
pub struct InterfaceType {
    pub id: InterfaceId,
    pub name: Id,
    pub is_callback: bool,
    pub promise_inner: Option<Box<Type>>,
}

impl PartialEq for InterfaceType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// A union of two or more member types.
#[derive(Debug, Clone)]
pub struct UnionType {
    pub members: Vec<Type>,
    /// Members with nested unions, nullables and typedefs expanded.
    /// Empty until the union is completed.
    pub flat_members: Vec<Type>,
    pub has_nullable: bool,
    pub has_dictionary: bool,
    pub location: Location,
    complete: bool,
}

impl UnionType {
    pub(crate) fn new(members: Vec<Type>, location: Location) -> Self {
        Self {
            members,
            flat_members: Vec::new(),
            has_nullable: false,
            has_dictionary: false,
            location,
            complete: false,
        }
    }

    pub(crate) fn mark_complete(&mut self) {
        self.complete = true;
    }
}

impl PartialEq for UnionType {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

/// A WebIDL type.
#[derive(Debug, Clone)]
pub enum Type {
    /// A name that has not been looked up yet.
    Unresolved {
        name: Id,
        location: Location,
        promise_inner: Option<Box<Type>>,
    },
    Builtin(BuiltinType),
    Interface(InterfaceType),
    Dictionary(NamedType<DictionaryId>),
    Enum(NamedType<EnumId>),
    Callback(NamedType<CallbackId>),
    Nullable(Box<Type>),
    Sequence(Box<Type>),
    MozMap(Box<Type>),
    Array(Box<Type>),
    Union(UnionType),
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Unresolved { name: a, .. }, Type::Unresolved { name: b, .. }) => a == b,
            (Type::Builtin(a), Type::Builtin(b)) => a == b,
            (Type::Interface(a), Type::Interface(b)) => a == b,
            (Type::Dictionary(a), Type::Dictionary(b)) => a == b,
            (Type::Enum(a), Type::Enum(b)) => a == b,
            (Type::Callback(a), Type::Callback(b)) => a == b,
            (Type::Nullable(a), Type::Nullable(b))
            | (Type::Sequence(a), Type::Sequence(b))
            | (Type::MozMap(a), Type::MozMap(b))
            | (Type::Array(a), Type::Array(b)) => a == b,
            (Type::Union(a), Type::Union(b)) => a == b,
            _ => false,
        }
    }
}

impl Type {
    pub fn builtin(builtin: BuiltinType) -> Self {
        Type::Builtin(builtin)
    }

    pub(crate) fn unresolved(name: Id, location: Location) -> Self {
        Type::Unresolved {
            name,
            location,
            promise_inner: None,
        }
    }

    pub fn nullable(&self) -> bool {
        matches!(self, Type::Nullable(_))
    }

    /// The type with one nullable wrapper removed.
    pub fn strip_nullable(&self) -> &Type {
        match self {
            Type::Nullable(inner) => inner,
            other => other,
        }
    }

    /// The innermost element type, looking through nullable, sequence,
    /// array and MozMap wrappers. Unions are not unrolled.
    pub fn unroll(&self) -> &Type {
        match self {
            Type::Nullable(inner)
            | Type::Sequence(inner)
            | Type::MozMap(inner)
            | Type::Array(inner) => inner.unroll(),
            other => other,
        }
    }

    pub fn as_builtin(&self) -> Option<BuiltinType> {
        match self.strip_nullable() {
            Type::Builtin(builtin) => Some(*builtin),
            _ => None,
        }
    }

    fn builtin_is(&self, f: impl FnOnce(BuiltinType) -> bool) -> bool {
        self.as_builtin().is_some_and(f)
    }

    pub fn is_primitive(&self) -> bool {
        self.builtin_is(|b| b.is_primitive())
    }

    pub fn is_numeric(&self) -> bool {
        self.builtin_is(|b| b.is_numeric())
    }

    pub fn is_integer(&self) -> bool {
        self.builtin_is(|b| b.is_integer())
    }

    pub fn is_float(&self) -> bool {
        self.builtin_is(|b| b.is_float())
    }

    pub fn is_boolean(&self) -> bool {
        self.builtin_is(|b| b == BuiltinType::Boolean)
    }

    pub fn is_string(&self) -> bool {
        self.builtin_is(|b| b.is_string())
    }

    pub fn is_dom_string(&self) -> bool {
        self.builtin_is(|b| b == BuiltinType::DOMString)
    }

    pub fn is_any(&self) -> bool {
        self.builtin_is(|b| b == BuiltinType::Any)
    }

    pub fn is_void(&self) -> bool {
        self.builtin_is(|b| b == BuiltinType::Void)
    }

    pub fn is_object(&self) -> bool {
        self.builtin_is(|b| b == BuiltinType::Object)
    }

    pub fn is_date(&self) -> bool {
        self.builtin_is(|b| b == BuiltinType::Date)
    }

    pub fn is_buffer(&self) -> bool {
        self.builtin_is(|b| b.is_buffer())
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.strip_nullable(), Type::Sequence(_))
    }

    pub fn is_mozmap(&self) -> bool {
        matches!(self.strip_nullable(), Type::MozMap(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.strip_nullable(), Type::Array(_))
    }

    pub fn is_union(&self) -> bool {
        matches!(self.strip_nullable(), Type::Union(_))
    }

    pub fn as_union(&self) -> Option<&UnionType> {
        match self.strip_nullable() {
            Type::Union(union) => Some(union),
            _ => None,
        }
    }

    pub fn is_dictionary(&self) -> bool {
        matches!(self.strip_nullable(), Type::Dictionary(_))
    }

    pub fn as_dictionary(&self) -> Option<DictionaryId> {
        match self.strip_nullable() {
            Type::Dictionary(named) => Some(named.id),
            _ => None,
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.strip_nullable(), Type::Enum(_))
    }

    pub fn as_enum(&self) -> Option<EnumId> {
        match self.strip_nullable() {
            Type::Enum(named) => Some(named.id),
            _ => None,
        }
    }

    pub fn is_callback(&self) -> bool {
        matches!(self.strip_nullable(), Type::Callback(_))
    }

    /// Declared interfaces, callback interfaces and buffer types.
    pub fn is_interface(&self) -> bool {
        matches!(self.strip_nullable(), Type::Interface(_)) || self.is_buffer()
    }

    pub fn as_interface(&self) -> Option<&InterfaceType> {
        match self.strip_nullable() {
            Type::Interface(iface) => Some(iface),
            _ => None,
        }
    }

    pub fn is_callback_interface(&self) -> bool {
        self.as_interface().is_some_and(|iface| iface.is_callback)
    }

    pub fn is_non_callback_interface(&self) -> bool {
        self.is_interface() && !self.is_callback_interface()
    }

    pub fn is_promise(&self) -> bool {
        self.as_interface()
            .is_some_and(|iface| iface.promise_inner.is_some() || iface.name == "Promise")
    }

    /// The `T` of a `Promise<T>`.
    pub fn promise_inner(&self) -> Option<&Type> {
        self.as_interface()
            .and_then(|iface| iface.promise_inner.as_deref())
    }

    /// True once every reference is resolved and every union flattened.
    pub fn is_complete(&self) -> bool {
        match self {
            Type::Unresolved { .. } => false,
            Type::Builtin(_) | Type::Dictionary(_) | Type::Enum(_) | Type::Callback(_) => true,
            Type::Interface(iface) => iface
                .promise_inner
                .as_ref()
                .is_none_or(|inner| inner.is_complete()),
            Type::Nullable(inner)
            | Type::Sequence(inner)
            | Type::MozMap(inner)
            | Type::Array(inner) => inner.is_complete(),
            Type::Union(union) => union.complete,
        }
    }

    /// A `float` or `double` anywhere inside. Names not yet resolved count
    /// as not restricted.
    pub fn includes_restricted_float(&self) -> bool {
        match self {
            Type::Builtin(builtin) => builtin.is_float() && !builtin.is_unrestricted(),
            Type::Nullable(inner) | Type::Sequence(inner) | Type::Array(inner) => {
                inner.includes_restricted_float()
            }
            Type::Union(union) => union.members.iter().any(Type::includes_restricted_float),
            _ => false,
        }
    }

    /// Name of the definition a type refers to, if any.
    pub fn referenced_name(&self) -> Option<Id> {
        match self.strip_nullable() {
            Type::Unresolved { name, .. } => Some(*name),
            Type::Interface(iface) => Some(iface.name),
            Type::Dictionary(named) => Some(named.name),
            Type::Enum(named) => Some(named.name),
            Type::Callback(named) => Some(named.name),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unresolved {
                name,
                promise_inner: Some(inner),
                ..
            } => write!(f, "{name}<{inner}>"),
            Type::Unresolved { name, .. } => write!(f, "{name}"),
            Type::Builtin(builtin) => write!(f, "{builtin}"),
            Type::Interface(InterfaceType {
                name,
                promise_inner: Some(inner),
                ..
            }) => write!(f, "{name}<{inner}>"),
            Type::Interface(iface) => write!(f, "{}", iface.name),
            Type::Dictionary(named) => write!(f, "{}", named.name),
            Type::Enum(named) => write!(f, "{}", named.name),
            Type::Callback(named) => write!(f, "{}", named.name),
            Type::Nullable(inner) => write!(f, "{inner}?"),
            Type::Sequence(inner) => write!(f, "sequence<{inner}>"),
            Type::MozMap(inner) => write!(f, "MozMap<{inner}>"),
            Type::Array(inner) => write!(f, "{inner}[]"),
            Type::Union(union) => {
                write!(f, "(")?;
                for (idx, member) in union.members.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " or ")?;
                    }
                    write!(f, "{member}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long() -> Type {
        Type::builtin(BuiltinType::Long)
    }

    #[test]
    fn test_integer_ranges() {
        assert_eq!(BuiltinType::Octet.integer_range(), Some((0, 255)));
        assert_eq!(BuiltinType::Short.integer_range(), Some((-32768, 32767)));
        assert_eq!(
            BuiltinType::UnsignedLongLong.integer_range(),
            Some((0, u64::MAX as i128))
        );
        assert_eq!(BuiltinType::Double.integer_range(), None);
    }

    #[test]
    fn test_predicates_look_through_nullable() {
        let nullable = Type::Nullable(Box::new(long()));

        assert!(nullable.nullable());
        assert!(nullable.is_integer());
        assert!(nullable.is_primitive());
        assert!(!nullable.is_string());
    }

    #[test]
    fn test_buffer_types_are_interfaces() {
        let buffer = Type::builtin(BuiltinType::Uint8Array);

        assert!(buffer.is_interface());
        assert!(buffer.is_non_callback_interface());
        assert!(!buffer.is_callback_interface());
        assert!(BuiltinType::Uint8Array.is_typed_array());
        assert!(!BuiltinType::ArrayBufferView.is_typed_array());
    }

    #[test]
    fn test_unroll() {
        let ty = Type::Nullable(Box::new(Type::Sequence(Box::new(Type::Array(Box::new(
            long(),
        ))))));

        assert_eq!(ty.unroll(), &long());
    }

    #[test]
    fn test_display() {
        let union = Type::Union(UnionType::new(
            vec![long(), Type::builtin(BuiltinType::DOMString)],
            Location::builtin("<builtin>"),
        ));
        assert_eq!(union.to_string(), "(long or DOMString)");

        let ty = Type::Nullable(Box::new(Type::Sequence(Box::new(Type::builtin(
            BuiltinType::UnsignedLong,
        )))));
        assert_eq!(ty.to_string(), "sequence<unsigned long>?");
    }

    #[test]
    fn test_completeness() {
        let loc = Location::builtin("<builtin>");
        assert!(long().is_complete());
        assert!(!Type::Sequence(Box::new(Type::unresolved(Id::new("Node"), loc))).is_complete());

        let mut union = UnionType::new(vec![long()], loc);
        assert!(!Type::Union(union.clone()).is_complete());
        union.mark_complete();
        assert!(Type::Union(union).is_complete());
    }

    #[test]
    fn test_includes_restricted_float() {
        let loc = Location::builtin("<builtin>");
        let float = Type::builtin(BuiltinType::Float);
        let unrestricted = Type::builtin(BuiltinType::UnrestrictedDouble);

        assert!(float.includes_restricted_float());
        assert!(!unrestricted.includes_restricted_float());
        assert!(Type::Sequence(Box::new(Type::Nullable(Box::new(float.clone())))).includes_restricted_float());
        assert!(
            Type::Union(UnionType::new(vec![long(), float], loc)).includes_restricted_float()
        );
        assert!(!Type::unresolved(Id::new("Seconds"), loc).includes_restricted_float());
    }

    #[test]
    fn test_unresolved_equality_ignores_location() {
        let a = Type::unresolved(Id::new("Node"), Location::builtin("<a>"));
        let b = Type::unresolved(Id::new("Node"), Location::builtin("<b>"));

        assert_eq!(a, b);
    }
}
