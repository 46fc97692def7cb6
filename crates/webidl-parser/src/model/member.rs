//! Interface members: constants, attributes, operations and maplike/setlike
//! declarations, plus the arguments they take.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    str::FromStr,
};

use webidl_core::{identifier::Id, location::Location};

use super::{ExtendedAttributes, InterfaceId, Type, Value};
use crate::error::{Diagnostic, ErrorCode};

/// What an operation or attribute may change when invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affects {
    #[default]
    Everything,
    Nothing,
}

impl FromStr for Affects {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Everything" => Ok(Affects::Everything),
            "Nothing" => Ok(Affects::Nothing),
            _ => Err(()),
        }
    }
}

/// What state an operation or attribute reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependsOn {
    #[default]
    Everything,
    DOMState,
    DeviceState,
    Nothing,
}

impl FromStr for DependsOn {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Everything" => Ok(DependsOn::Everything),
            "DOMState" => Ok(DependsOn::DOMState),
            "DeviceState" => Ok(DependsOn::DeviceState),
            "Nothing" => Ok(DependsOn::Nothing),
            _ => Err(()),
        }
    }
}

/// State shared by every kind of member.
#[derive(Debug, Clone)]
pub struct MemberInfo {
    pub name: Id,
    pub location: Location,
    pub ext_attrs: ExtendedAttributes,
    /// Global names listed in `[Exposed]`, before mapping.
    pub exposure_global_names: BTreeSet<Id>,
    /// Names of the global interfaces the member is exposed in.
    pub exposure_set: BTreeSet<Id>,
    pub affects: Affects,
    pub depends_on: DependsOn,
    pub originating_interface: Option<InterfaceId>,
}

impl MemberInfo {
    pub(crate) fn new(name: Id, location: Location) -> Self {
        Self {
            name,
            location,
            ext_attrs: ExtendedAttributes::new(),
            exposure_global_names: BTreeSet::new(),
            exposure_set: BTreeSet::new(),
            affects: Affects::default(),
            depends_on: DependsOn::default(),
            originating_interface: None,
        }
    }
}

/// An operation argument or dictionary member.
#[derive(Debug, Clone)]
pub struct Argument {
    pub name: Id,
    pub location: Location,
    pub ty: Type,
    pub optional: bool,
    pub variadic: bool,
    pub default: Option<Value>,
    pub ext_attrs: ExtendedAttributes,
    /// Dictionary members are arguments whose `optional` is `!required`.
    pub dictionary_member: bool,
    pub clamp: bool,
    pub enforce_range: bool,
    pub treat_non_callable_as_null: bool,
    pub treat_null_as_empty_string: bool,
}

impl Argument {
    pub(crate) fn new(name: Id, location: Location, ty: Type) -> Self {
        Self {
            name,
            location,
            ty,
            optional: false,
            variadic: false,
            default: None,
            ext_attrs: ExtendedAttributes::new(),
            dictionary_member: false,
            clamp: false,
            enforce_range: false,
            treat_non_callable_as_null: false,
            treat_null_as_empty_string: false,
        }
    }

    /// Dictionary members declared with `required`.
    pub fn is_required(&self) -> bool {
        self.dictionary_member && !self.optional
    }
}

#[derive(Debug, Clone)]
pub struct Const {
    pub info: MemberInfo,
    pub ty: Type,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub info: MemberInfo,
    pub ty: Type,
    pub readonly: bool,
    pub inherit: bool,
    pub is_static: bool,
    pub stringifier: bool,
    pub lenient_this: bool,
    pub unforgeable: bool,
    pub clamp: bool,
    pub enforce_range: bool,
    pub treat_null_as_empty_string: bool,
    pub slot_index: Option<usize>,
    /// The `size` attribute generated by a maplike or setlike declaration.
    pub maplike_or_setlike: bool,
}

impl Attribute {
    pub(crate) fn new(info: MemberInfo, ty: Type) -> Self {
        Self {
            info,
            ty,
            readonly: false,
            inherit: false,
            is_static: false,
            stringifier: false,
            lenient_this: false,
            unforgeable: false,
            clamp: false,
            enforce_range: false,
            treat_null_as_empty_string: false,
            slot_index: None,
            maplike_or_setlike: false,
        }
    }
}

/// Which kind of key a getter, setter, creator or deleter handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedOrIndexed {
    Named,
    Indexed,
}

impl fmt::Display for NamedOrIndexed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamedOrIndexed::Named => f.write_str("named"),
            NamedOrIndexed::Indexed => f.write_str("indexed"),
        }
    }
}

/// Special-operation qualifiers on a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecialFlags {
    pub getter: bool,
    pub setter: bool,
    pub creator: bool,
    pub deleter: bool,
    pub legacycaller: bool,
    pub stringifier: bool,
    pub jsonifier: bool,
}

impl SpecialFlags {
    /// The flags of a special operation that may not be overloaded.
    pub(crate) fn without_legacycaller(self) -> Self {
        Self {
            legacycaller: false,
            ..self
        }
    }

    pub fn any(&self) -> bool {
        self.getter
            || self.setter
            || self.creator
            || self.deleter
            || self.legacycaller
            || self.stringifier
            || self.jsonifier
    }
}

/// One signature of an operation.
#[derive(Debug, Clone)]
pub struct Overload {
    pub return_type: Type,
    pub arguments: Vec<Argument>,
    pub location: Location,
}

impl Overload {
    /// Number of arguments a call must pass at minimum.
    pub fn required_argument_count(&self) -> usize {
        self.arguments
            .iter()
            .rposition(|arg| !arg.optional)
            .map_or(0, |idx| idx + 1)
    }

    pub fn is_variadic(&self) -> bool {
        self.arguments.last().is_some_and(|arg| arg.variadic)
    }

    /// Type of the argument at `idx`. Positions past the end of a variadic
    /// signature repeat its last argument.
    pub fn argument_type(&self, idx: usize) -> Option<&Type> {
        match self.arguments.get(idx) {
            Some(argument) => Some(&argument.ty),
            None if self.is_variadic() => self.arguments.last().map(|arg| &arg.ty),
            None => None,
        }
    }

    /// Whether a call with `count` arguments can select this overload.
    pub fn accepts_count(&self, count: usize) -> bool {
        count >= self.required_argument_count()
            && (count <= self.arguments.len() || self.is_variadic())
    }
}

/// An operation with all of its overloads.
#[derive(Debug, Clone)]
pub struct Method {
    pub info: MemberInfo,
    pub overloads: Vec<Overload>,
    pub is_static: bool,
    pub special: SpecialFlags,
    pub named_or_indexed: Option<NamedOrIndexed>,
    pub unforgeable: bool,
    pub aliases: Vec<Id>,
    /// Generated by a maplike or setlike declaration.
    pub maplike_or_setlike: bool,
    /// Argument counts any overload accepts, filled in during finishing.
    pub allowed_arg_counts: BTreeSet<usize>,
    pub max_arg_count: usize,
    /// Argument count to the first position where every overload callable
    /// with that count can be told apart. Only counts with more than one
    /// candidate overload appear.
    pub distinguishing_indices: BTreeMap<usize, usize>,
}

impl Method {
    pub(crate) fn new(info: MemberInfo, overload: Overload) -> Self {
        Self {
            info,
            overloads: vec![overload],
            is_static: false,
            special: SpecialFlags::default(),
            named_or_indexed: None,
            unforgeable: false,
            aliases: Vec::new(),
            maplike_or_setlike: false,
            allowed_arg_counts: BTreeSet::new(),
            max_arg_count: 0,
            distinguishing_indices: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> Id {
        self.info.name
    }

    pub fn location(&self) -> Location {
        self.info.location
    }

    /// Names synthesized for special operations start with `__`.
    pub fn is_identifierless(&self) -> bool {
        self.info.name.is_reserved()
    }

    pub fn distinguishing_index_for_arg_count(&self, count: usize) -> Option<usize> {
        self.distinguishing_indices.get(&count).copied()
    }

    pub fn is_special(&self) -> bool {
        self.special.any()
    }

    pub fn has_overloads(&self) -> bool {
        self.overloads.len() > 1
    }

    /// Overloads a call with `count` arguments can select: those declaring
    /// at least `count` arguments, all of them optional past `count`, plus
    /// variadic ones whose tail stretches to `count`.
    pub fn overloads_for_arg_count(&self, count: usize) -> Vec<&Overload> {
        self.overloads
            .iter()
            .filter(|overload| overload.accepts_count(count))
            .collect()
    }

    /// Merge the single signature of `other` into this operation.
    pub(crate) fn add_overload(&mut self, other: Method) -> Result<(), Diagnostic> {
        let name = self.name();
        if self.info.ext_attrs.signature() != other.info.ext_attrs.signature() {
            return Err(Diagnostic::error(format!(
                "Extended attributes differ on different overloads of {name}"
            ))
            .with_code(ErrorCode::E204)
            .with_label(self.location(), "first overload")
            .with_secondary_label(other.location(), "differing overload"));
        }
        if self.is_static != other.is_static {
            return Err(inconsistent(name, "static", other.location()));
        }
        if self.special.legacycaller != other.special.legacycaller {
            return Err(inconsistent(name, "legacycaller", other.location()));
        }
        if self.special.without_legacycaller().any() || other.special.without_legacycaller().any() {
            return Err(Diagnostic::error(format!(
                "Special operation {name} cannot be overloaded"
            ))
            .with_code(ErrorCode::E204)
            .with_label(other.location(), "overload")
            .with_secondary_label(self.location(), "special operation"));
        }

        self.overloads.extend(other.overloads);
        Ok(())
    }

    pub fn returns_promise(&self) -> bool {
        self.overloads
            .first()
            .is_some_and(|overload| overload.return_type.is_promise())
    }

    /// Whether this is `getter`/`setter`/`creator`/`deleter` of a given key
    /// kind.
    pub fn is_named_or_indexed(&self, kind: NamedOrIndexed) -> bool {
        self.named_or_indexed == Some(kind)
    }
}

fn inconsistent(name: Id, qualifier: &str, location: Location) -> Diagnostic {
    Diagnostic::error(format!(
        "Overloaded identifier {name} appears with different values of the '{qualifier}' attribute"
    ))
    .with_code(ErrorCode::E204)
    .with_label(location, "overload")
}

/// Whether a declaration is `maplike` or `setlike`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaplikeOrSetlikeKind {
    Maplike,
    Setlike,
}

impl fmt::Display for MaplikeOrSetlikeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaplikeOrSetlikeKind::Maplike => f.write_str("maplike"),
            MaplikeOrSetlikeKind::Setlike => f.write_str("setlike"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MaplikeOrSetlike {
    pub info: MemberInfo,
    pub kind: MaplikeOrSetlikeKind,
    pub readonly: bool,
    pub key_type: Type,
    /// Only maplike declarations carry a value type.
    pub value_type: Option<Type>,
    pub slot_index: Option<usize>,
    /// Names of generated members that may not be redeclared.
    pub disallowed_member_names: Vec<Id>,
    /// Names that may be declared only as methods.
    pub disallowed_non_method_names: Vec<Id>,
}

impl MaplikeOrSetlike {
    pub fn is_maplike(&self) -> bool {
        self.kind == MaplikeOrSetlikeKind::Maplike
    }

    pub fn is_setlike(&self) -> bool {
        self.kind == MaplikeOrSetlikeKind::Setlike
    }
}

/// A member of an interface.
#[derive(Debug, Clone)]
pub enum Member {
    Const(Const),
    Attribute(Attribute),
    Method(Method),
    MaplikeOrSetlike(MaplikeOrSetlike),
}

impl Member {
    pub fn info(&self) -> &MemberInfo {
        match self {
            Member::Const(c) => &c.info,
            Member::Attribute(a) => &a.info,
            Member::Method(m) => &m.info,
            Member::MaplikeOrSetlike(m) => &m.info,
        }
    }

    pub fn info_mut(&mut self) -> &mut MemberInfo {
        match self {
            Member::Const(c) => &mut c.info,
            Member::Attribute(a) => &mut a.info,
            Member::Method(m) => &mut m.info,
            Member::MaplikeOrSetlike(m) => &mut m.info,
        }
    }

    pub fn name(&self) -> Id {
        self.info().name
    }

    pub fn location(&self) -> Location {
        self.info().location
    }

    pub fn ext_attrs(&self) -> &ExtendedAttributes {
        &self.info().ext_attrs
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Member::Const(_))
    }

    pub fn is_attr(&self) -> bool {
        matches!(self, Member::Attribute(_))
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Member::Method(_))
    }

    pub fn is_maplike_or_setlike(&self) -> bool {
        matches!(self, Member::MaplikeOrSetlike(_))
    }

    pub fn as_attr(&self) -> Option<&Attribute> {
        match self {
            Member::Attribute(attr) => Some(attr),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Member::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_method_mut(&mut self) -> Option<&mut Method> {
        match self {
            Member::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_maplike_or_setlike(&self) -> Option<&MaplikeOrSetlike> {
        match self {
            Member::MaplikeOrSetlike(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            Member::Attribute(attr) => attr.is_static,
            Member::Method(method) => method.is_static,
            _ => false,
        }
    }

    pub fn is_unforgeable(&self) -> bool {
        match self {
            Member::Attribute(attr) => attr.unforgeable,
            Member::Method(method) => method.unforgeable,
            _ => false,
        }
    }

    /// Same declaration: members are cloned into other interfaces, so
    /// identity is the name plus the declaration site.
    pub fn same_declaration(&self, other: &Member) -> bool {
        self.name() == other.name() && self.location() == other.location()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Member::Const(_) => "constant",
            Member::Attribute(_) => "attribute",
            Member::Method(_) => "method",
            Member::MaplikeOrSetlike(decl) => match decl.kind {
                MaplikeOrSetlikeKind::Maplike => "maplike",
                MaplikeOrSetlikeKind::Setlike => "setlike",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BuiltinType;

    fn arg(name: &str, optional: bool, variadic: bool) -> Argument {
        let mut arg = Argument::new(
            Id::new(name),
            Location::builtin("<test>"),
            Type::builtin(BuiltinType::Long),
        );
        arg.optional = optional;
        arg.variadic = variadic;
        arg
    }

    fn overload(arguments: Vec<Argument>) -> Overload {
        Overload {
            return_type: Type::builtin(BuiltinType::Void),
            arguments,
            location: Location::builtin("<test>"),
        }
    }

    #[test]
    fn test_required_argument_count() {
        let ov = overload(vec![arg("a", false, false), arg("b", true, false)]);
        assert_eq!(ov.required_argument_count(), 1);
        assert!(ov.accepts_count(1));
        assert!(ov.accepts_count(2));
        assert!(!ov.accepts_count(3));
        assert!(!ov.accepts_count(0));
    }

    #[test]
    fn test_variadic_accepts_any_longer_count() {
        let ov = overload(vec![arg("a", false, false), arg("rest", true, true)]);
        assert!(ov.is_variadic());
        assert!(ov.accepts_count(7));
        assert_eq!(ov.argument_type(5), Some(&Type::builtin(BuiltinType::Long)));
        assert!(overload(vec![arg("a", false, false)]).argument_type(1).is_none());
    }

    #[test]
    fn test_variadic_overload_counts_for_longer_calls() {
        let mut first = method("log", vec![arg("parts", true, true)]);
        first
            .add_overload(method(
                "log",
                vec![arg("level", false, false), arg("message", false, false)],
            ))
            .unwrap();

        assert_eq!(first.overloads_for_arg_count(2).len(), 2);
        assert_eq!(first.overloads_for_arg_count(3).len(), 1);
    }

    #[test]
    fn test_affects_and_depends_on_parsing() {
        assert_eq!("Nothing".parse::<Affects>(), Ok(Affects::Nothing));
        assert!("DOMState".parse::<Affects>().is_err());
        assert_eq!("DeviceState".parse::<DependsOn>(), Ok(DependsOn::DeviceState));
        assert!("Sometimes".parse::<DependsOn>().is_err());
    }

    #[test]
    fn test_special_flags() {
        let flags = SpecialFlags {
            stringifier: true,
            ..Default::default()
        };
        assert!(flags.any());
        assert!(!SpecialFlags::default().any());
    }

    fn method(name: &str, arguments: Vec<Argument>) -> Method {
        Method::new(
            MemberInfo::new(Id::new(name), Location::builtin("<test>")),
            overload(arguments),
        )
    }

    #[test]
    fn test_add_overload_merges_signatures() {
        let mut first = method("item", vec![arg("index", false, false)]);
        first.add_overload(method("item", vec![])).unwrap();

        assert!(first.has_overloads());
        assert_eq!(first.overloads_for_arg_count(0).len(), 1);
    }

    #[test]
    fn test_add_overload_rejects_static_mismatch() {
        let mut first = method("create", vec![]);
        let mut second = method("create", vec![arg("a", false, false)]);
        second.is_static = true;

        let err = first.add_overload(second).unwrap_err();
        assert_eq!(
            err.message(),
            "Overloaded identifier create appears with different values of the 'static' attribute"
        );
    }

    #[test]
    fn test_add_overload_rejects_special_operations() {
        let mut getter = method("__namedgetter", vec![]);
        getter.special.getter = true;
        let mut other = method("__namedgetter", vec![]);
        other.special.getter = true;

        assert!(getter.add_overload(other).is_err());

        let mut caller = method("call", vec![]);
        caller.special.legacycaller = true;
        let mut other = method("call", vec![arg("a", false, false)]);
        other.special.legacycaller = true;
        assert!(caller.add_overload(other).is_ok());
    }
}
