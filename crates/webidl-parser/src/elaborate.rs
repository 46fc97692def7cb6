//! Elaboration of the syntax tree into the semantic model.
//!
//! The [`Builder`] walks the definitions of one source file, checks the
//! rules that only need the declaration itself (identifier hygiene, special
//! operation shapes, duplicate qualifiers) and registers every top-level
//! name in the global scope. Nothing is resolved here: types stay
//! unresolved until the whole corpus has been read.

use log::{debug, trace, warn};

use webidl_core::{
    identifier::Id,
    location::{FileId, Location},
};

use crate::{
    attributes,
    error::{Diagnostic, ErrorCode, Result},
    model::{
        Argument, Attribute, BuiltinType, Callback, Const, DefinitionId, Dictionary, Enumeration,
        ExtendedAttribute, ExtendedAttributeArgs, ExtendedAttributeValue, ImplementsStatement,
        Interface, InterfaceId, MaplikeOrSetlike, MaplikeOrSetlikeKind, Member, MemberInfo, Method,
        Model, NamedOrIndexed, Overload, PartialInterface, Production, SpecialFlags, Type, Typedef,
        UnionType, Value,
    },
    naming::{self, NameRules},
    parser_types as types,
    scope::Binding,
    span::{Span, Spanned},
};

/// What elaborating one file produced.
#[derive(Debug, Default)]
pub(crate) struct Elaborated {
    pub productions: Vec<Production>,
    pub warnings: Vec<Diagnostic>,
}

pub(crate) struct Builder<'m> {
    model: &'m mut Model,
    file: FileId,
    output: Elaborated,
}

impl<'m> Builder<'m> {
    pub fn new(model: &'m mut Model, file: FileId) -> Self {
        Self {
            model,
            file,
            output: Elaborated::default(),
        }
    }

    // ============================================================================
    // Main Entry Methods
    // ============================================================================

    pub fn build(mut self, definitions: Vec<types::Annotated<'_>>) -> Result<Elaborated> {
        debug!(definitions = definitions.len(); "Elaborating definitions");
        for annotated in definitions {
            self.build_definition(annotated)?;
        }
        Ok(self.output)
    }

    fn build_definition(&mut self, annotated: types::Annotated<'_>) -> Result<()> {
        let location = self.location(annotated.keyword_span);
        let ext_attrs = self.build_ext_attrs(&annotated.ext_attrs)?;

        match annotated.definition {
            types::Definition::Interface {
                name,
                parent,
                members,
                is_callback,
            } => self.build_interface(ext_attrs, location, name, parent, &members, is_callback),
            types::Definition::Partial { name, members } => {
                self.build_partial(ext_attrs, location, name, &members)
            }
            types::Definition::ForwardDeclaration { name } => {
                self.build_forward_declaration(&ext_attrs, location, name)
            }
            types::Definition::Dictionary {
                name,
                parent,
                members,
            } => self.build_dictionary(&ext_attrs, location, name, parent, &members),
            types::Definition::Enum { name, values } => {
                self.build_enum(&ext_attrs, location, name, &values)
            }
            types::Definition::Callback {
                name,
                return_type,
                arguments,
            } => self.build_callback(ext_attrs, location, name, &return_type, &arguments),
            types::Definition::Typedef { ty, name } => {
                self.build_typedef(&ext_attrs, location, &ty, name)
            }
            types::Definition::Implements {
                implementor,
                implementee,
            } => self.build_implements(&ext_attrs, location, implementor, implementee),
            types::Definition::Exception { name } => {
                self.ignore("exception", location, name);
                Ok(())
            }
            types::Definition::Module { name } => {
                self.ignore("module", location, name);
                Ok(())
            }
        }
    }

    fn location(&self, span: Span) -> Location {
        Location::new(self.file, span)
    }

    fn declare(&self, name: Spanned<&str>) -> Result<(Id, Location)> {
        let location = self.location(name.span());
        let id = naming::declare(name.inner(), location, NameRules::default())?;
        Ok((id, location))
    }

    fn bind(&mut self, name: Id, binding: Binding, location: Location) -> Result<()> {
        self.model.scope.bind(name, binding, location)
    }

    fn existing_location(&self, name: Id, fallback: Location) -> Location {
        self.model.scope.location_of(name).unwrap_or(fallback)
    }

    // ============================================================================
    // Definitions
    // ============================================================================

    fn build_interface(
        &mut self,
        ext_attrs: Vec<ExtendedAttribute>,
        location: Location,
        name: Spanned<&str>,
        parent: Option<Spanned<&str>>,
        members: &[types::Member<'_>],
        is_callback: bool,
    ) -> Result<()> {
        let (name, _) = self.declare(name)?;
        let parent_name = parent.map(|parent| self.declare(parent)).transpose()?;
        let mut members = self.build_members(members)?;
        debug!(name:% = name, members = members.len(), callback = is_callback; "Elaborating interface");

        let id = match self.model.scope.lookup(name) {
            Some(Binding::Interface(existing)) => {
                let iface = self.model.interface_mut(existing);
                if iface.is_known_non_partial {
                    return Err(Diagnostic::error("Two non-partial definitions for the same interface")
                        .with_code(ErrorCode::E400)
                        .with_label(location, "second definition")
                        .with_secondary_label(iface.location(), "first definition"));
                }
                iface.is_known_non_partial = true;
                iface.set_location(location);
                iface.parent_name = parent_name;
                members.append(&mut iface.members);
                iface.members = members;
                iface.is_callback = is_callback;
                existing
            }
            Some(_) => {
                return Err(Diagnostic::error("Interface has the same name as non-interface object")
                    .with_code(ErrorCode::E201)
                    .with_label(location, "interface")
                    .with_secondary_label(self.existing_location(name, location), "other definition"));
            }
            None => {
                let mut iface = Interface::new(name, location);
                iface.is_known_non_partial = true;
                iface.is_callback = is_callback;
                iface.parent_name = parent_name;
                iface.members = members;
                let id = self.model.add_interface(iface);
                self.bind(name, Binding::Interface(id), location)?;
                id
            }
        };

        attributes::apply_to_interface(self.model, id, ext_attrs)?;
        self.push_definition(DefinitionId::Interface(id));
        Ok(())
    }

    fn build_partial(
        &mut self,
        ext_attrs: Vec<ExtendedAttribute>,
        location: Location,
        name: Spanned<&str>,
        members: &[types::Member<'_>],
    ) -> Result<()> {
        let (name, _) = self.declare(name)?;
        let members = self.build_members(members)?;
        debug!(name:% = name, members = members.len(); "Elaborating partial interface");

        let non_partial = match self.model.scope.lookup(name) {
            Some(Binding::Interface(existing)) => existing,
            Some(_) => {
                return Err(Diagnostic::error(
                    "Partial interface has the same name as non-interface object",
                )
                .with_code(ErrorCode::E201)
                .with_label(location, "partial interface")
                .with_secondary_label(self.existing_location(name, location), "other definition"));
            }
            None => self.add_stub(name, location)?,
        };

        let mut partial = PartialInterface::new(name, location, non_partial);
        partial.members = members;
        let id = self.model.add_partial(partial);
        self.model.interface_mut(non_partial).partials.push(id);

        attributes::apply_to_partial(self.model, id, ext_attrs)?;
        self.output.productions.push(Production::Partial(id));
        Ok(())
    }

    /// `interface Name;` names an interface that must still be defined in
    /// full somewhere in the corpus.
    fn build_forward_declaration(
        &mut self,
        ext_attrs: &[ExtendedAttribute],
        location: Location,
        name: Spanned<&str>,
    ) -> Result<()> {
        attributes::reject_all(ext_attrs, "external interfaces", location)?;
        let (name, _) = self.declare(name)?;

        match self.model.scope.lookup(name) {
            Some(Binding::Interface(_)) => Ok(()),
            Some(other) => Err(Diagnostic::error(format!(
                "Name collision between external interface declaration for identifier '{name}' and {} {name}",
                other.kind()
            ))
            .with_code(ErrorCode::E201)
            .with_label(location, "external interface")
            .with_secondary_label(self.existing_location(name, location), "other definition")),
            None => {
                let id = self.add_stub(name, location)?;
                self.model.interface_mut(id).forward_declaration = Some(location);
                self.push_definition(DefinitionId::Interface(id));
                Ok(())
            }
        }
    }

    fn add_stub(&mut self, name: Id, location: Location) -> Result<InterfaceId> {
        let id = self.model.add_interface(Interface::new(name, location));
        self.bind(name, Binding::Interface(id), location)?;
        Ok(id)
    }

    fn build_dictionary(
        &mut self,
        ext_attrs: &[ExtendedAttribute],
        location: Location,
        name: Spanned<&str>,
        parent: Option<Spanned<&str>>,
        members: &[types::DictionaryMember<'_>],
    ) -> Result<()> {
        attributes::reject_all(ext_attrs, "dictionaries", location)?;
        let (name, _) = self.declare(name)?;
        let parent_name = parent.map(|parent| self.declare(parent)).transpose()?;
        debug!(name:% = name, members = members.len(); "Elaborating dictionary");

        let mut dictionary = Dictionary::new(name, location, parent_name);
        dictionary.members = members
            .iter()
            .map(|member| self.build_dictionary_member(member))
            .collect::<Result<_>>()?;

        let id = self.model.add_dictionary(dictionary);
        self.bind(name, Binding::Dictionary(id), location)?;
        self.push_definition(DefinitionId::Dictionary(id));
        Ok(())
    }

    fn build_enum(
        &mut self,
        ext_attrs: &[ExtendedAttribute],
        location: Location,
        name: Spanned<&str>,
        values: &[Spanned<&str>],
    ) -> Result<()> {
        attributes::reject_all(ext_attrs, "enums", location)?;
        let (name, _) = self.declare(name)?;

        for (idx, value) in values.iter().enumerate() {
            if let Some(first) = values[..idx].iter().find(|seen| seen.inner() == value.inner()) {
                return Err(Diagnostic::error(format!(
                    "Enum {name} has multiple identical strings"
                ))
                .with_code(ErrorCode::E603)
                .with_label(self.location(value.span()), "duplicate value")
                .with_secondary_label(self.location(first.span()), "first occurrence"));
            }
        }

        let values = values.iter().map(|value| value.inner().to_string()).collect();
        let id = self.model.add_enum(Enumeration::new(name, location, values));
        self.bind(name, Binding::Enum(id), location)?;
        self.push_definition(DefinitionId::Enum(id));
        Ok(())
    }

    fn build_callback(
        &mut self,
        ext_attrs: Vec<ExtendedAttribute>,
        location: Location,
        name: Spanned<&str>,
        return_type: &types::TypeExpr<'_>,
        arguments: &[types::Argument<'_>],
    ) -> Result<()> {
        let (name, _) = self.declare(name)?;
        let return_type = self.build_type(return_type)?;
        let arguments = self.build_arguments(arguments)?;

        let mut callback = Callback::new(name, location, return_type, arguments);
        attributes::apply_to_callback(&mut callback, ext_attrs)?;

        let id = self.model.add_callback(callback);
        self.bind(name, Binding::Callback(id), location)?;
        self.push_definition(DefinitionId::Callback(id));
        Ok(())
    }

    fn build_typedef(
        &mut self,
        ext_attrs: &[ExtendedAttribute],
        location: Location,
        ty: &types::TypeExpr<'_>,
        name: Spanned<&str>,
    ) -> Result<()> {
        attributes::reject_all(ext_attrs, "typedefs", location)?;
        let (name, _) = self.declare(name)?;
        let inner = self.build_type(ty)?;

        let id = self.model.add_typedef(Typedef::new(name, location, inner));
        self.bind(name, Binding::Typedef(id), location)?;
        self.push_definition(DefinitionId::Typedef(id));
        Ok(())
    }

    fn build_implements(
        &mut self,
        ext_attrs: &[ExtendedAttribute],
        location: Location,
        implementor: Spanned<&str>,
        implementee: Spanned<&str>,
    ) -> Result<()> {
        attributes::reject_all(ext_attrs, "implements statements", location)?;
        let statement = ImplementsStatement {
            location,
            implementor: self.declare(implementor)?,
            implementee: self.declare(implementee)?,
        };
        let id = self.model.add_implements(statement);
        self.output.productions.push(Production::Implements(id));
        Ok(())
    }

    fn ignore(&mut self, kind: &str, location: Location, name: Spanned<&str>) {
        warn!(kind = kind, name = *name.inner(); "Ignoring declaration");
        self.output.warnings.push(
            Diagnostic::warning(format!("{kind} declarations are ignored"))
                .with_code(ErrorCode::E102)
                .with_label(location, format!("{kind} {}", name.inner())),
        );
    }

    fn push_definition(&mut self, id: DefinitionId) {
        self.output.productions.push(Production::Definition(id));
    }

    // ============================================================================
    // Members
    // ============================================================================

    fn build_members(&self, members: &[types::Member<'_>]) -> Result<Vec<Member>> {
        members.iter().map(|member| self.build_member(member)).collect()
    }

    fn build_member(&self, member: &types::Member<'_>) -> Result<Member> {
        let location = self.location(member.span);
        let ext_attrs = self.build_ext_attrs(&member.ext_attrs)?;
        trace!(kind = member_kind(&member.body); "Elaborating member");

        match &member.body {
            types::InterfaceMember::Const { ty, name, value } => {
                let (name, _) = self.declare(*name)?;
                if name == "prototype" {
                    return Err(prototype_error("a constant", location));
                }
                let mut constant = Const {
                    info: MemberInfo::new(name, location),
                    ty: self.build_type(ty)?,
                    value: build_value(value.inner()),
                };
                attributes::apply_to_const(&mut constant, ext_attrs)?;
                Ok(Member::Const(constant))
            }
            types::InterfaceMember::Attribute {
                readonly,
                inherit,
                is_static,
                stringifier,
                ty,
                name,
            } => {
                let (name, _) = self.declare(*name)?;
                if *is_static && name == "prototype" {
                    return Err(prototype_error("a static attribute", location));
                }
                if *readonly && *inherit {
                    return Err(
                        Diagnostic::error("An attribute cannot be both 'readonly' and 'inherit'")
                            .with_code(ErrorCode::E503)
                            .with_label(location, "attribute"),
                    );
                }
                let mut attribute = Attribute::new(MemberInfo::new(name, location), self.build_type(ty)?);
                attribute.readonly = *readonly;
                attribute.inherit = *inherit;
                attribute.is_static = *is_static;
                attribute.stringifier = *stringifier;
                attributes::apply_to_attribute(&mut attribute, ext_attrs)?;
                Ok(Member::Attribute(attribute))
            }
            types::InterfaceMember::Operation {
                qualifiers,
                return_type,
                name,
                arguments,
            } => {
                let mut method =
                    self.build_operation(location, qualifiers, return_type, *name, arguments)?;
                attributes::apply_to_method(&mut method, ext_attrs)?;
                Ok(Member::Method(method))
            }
            types::InterfaceMember::Stringifier => {
                let mut method = synthesized_method(
                    "__stringifier",
                    location,
                    BuiltinType::DOMString,
                    SpecialFlags {
                        stringifier: true,
                        ..SpecialFlags::default()
                    },
                )?;
                attributes::apply_to_method(&mut method, ext_attrs)?;
                Ok(Member::Method(method))
            }
            types::InterfaceMember::Jsonifier => {
                let mut method = synthesized_method(
                    "__jsonifier",
                    location,
                    BuiltinType::Object,
                    SpecialFlags {
                        jsonifier: true,
                        ..SpecialFlags::default()
                    },
                )?;
                attributes::apply_to_method(&mut method, ext_attrs)?;
                Ok(Member::Method(method))
            }
            types::InterfaceMember::MaplikeOrSetlike {
                kind,
                readonly,
                key,
                value,
            } => {
                let (kind, name) = match kind {
                    types::CollectionKind::Maplike => (MaplikeOrSetlikeKind::Maplike, "__maplike"),
                    types::CollectionKind::Setlike => (MaplikeOrSetlikeKind::Setlike, "__setlike"),
                };
                let name = naming::declare(name, location, NameRules::synthesized())?;
                let mut decl = MaplikeOrSetlike {
                    info: MemberInfo::new(name, location),
                    kind,
                    readonly: *readonly,
                    key_type: self.build_type(key)?,
                    value_type: value.as_ref().map(|value| self.build_type(value)).transpose()?,
                    slot_index: None,
                    disallowed_member_names: Vec::new(),
                    disallowed_non_method_names: Vec::new(),
                };
                attributes::apply_to_maplike(&mut decl, ext_attrs)?;
                Ok(Member::MaplikeOrSetlike(decl))
            }
        }
    }

    /// An operation with its special qualifiers checked and, if it has no
    /// identifier, a name synthesized from them.
    fn build_operation(
        &self,
        location: Location,
        qualifiers: &[Spanned<types::Qualifier>],
        return_type: &types::TypeExpr<'_>,
        name: Option<Spanned<&str>>,
        arguments: &[types::Argument<'_>],
    ) -> Result<Method> {
        for (idx, qualifier) in qualifiers.iter().enumerate() {
            if qualifiers[..idx].iter().any(|seen| seen.inner() == qualifier.inner()) {
                return Err(special_error(
                    "Duplicate qualifiers are not allowed",
                    self.location(qualifier.span()),
                ));
            }
        }

        let has = |wanted: types::Qualifier| qualifiers.iter().any(|q| *q.inner() == wanted);
        let is_static = has(types::Qualifier::Static);
        let special = SpecialFlags {
            getter: has(types::Qualifier::Getter),
            setter: has(types::Qualifier::Setter),
            creator: has(types::Qualifier::Creator),
            deleter: has(types::Qualifier::Deleter),
            legacycaller: has(types::Qualifier::Legacycaller),
            stringifier: has(types::Qualifier::Stringifier),
            jsonifier: false,
        };

        if (special.getter || special.deleter) && (special.setter || special.creator) {
            return Err(special_error(
                "getter and deleter are incompatible with setter and creator",
                location,
            ));
        }

        let return_type = self.build_type(return_type)?;
        let arguments = self.build_arguments(arguments)?;
        let mut named_or_indexed = None;

        if special.getter || special.deleter {
            let qualifier = if special.getter { "getter" } else { "deleter" };
            if arguments.len() != 1 {
                return Err(special_error(
                    &format!("{qualifier} has wrong number of arguments"),
                    location,
                ));
            }
            named_or_indexed = Some(key_kind(qualifier, &arguments[0])?);
            check_plain_argument(qualifier, &arguments[0])?;
            if special.getter && return_type.is_void() {
                return Err(special_error("getter cannot have void return type", location));
            }
        }

        if special.setter || special.creator {
            let qualifier = if special.setter { "setter" } else { "creator" };
            if arguments.len() != 2 {
                return Err(special_error(
                    &format!("{qualifier} has wrong number of arguments"),
                    location,
                ));
            }
            named_or_indexed = Some(key_kind(qualifier, &arguments[0])?);
            check_plain_argument(qualifier, &arguments[0])?;
            check_plain_argument(qualifier, &arguments[1])?;
        }

        if special.stringifier {
            if !arguments.is_empty() {
                return Err(special_error("stringifier has wrong number of arguments", location));
            }
            if !matches!(return_type, Type::Builtin(BuiltinType::DOMString)) {
                return Err(special_error("stringifier must have DOMString return type", location));
            }
        }

        let name = match name {
            Some(name) => self.declare(name)?.0,
            None => {
                if !special.any() {
                    return Err(special_error(
                        "Identifier required for non-special methods",
                        location,
                    ));
                }
                naming::declare(
                    &synthesized_name(named_or_indexed, special),
                    location,
                    NameRules::synthesized(),
                )?
            }
        };
        if is_static && name == "prototype" {
            return Err(prototype_error("a static operation", location));
        }

        let overload = Overload {
            return_type,
            arguments,
            location,
        };
        let mut method = Method::new(MemberInfo::new(name, location), overload);
        method.is_static = is_static;
        method.special = special;
        method.named_or_indexed = named_or_indexed;
        Ok(method)
    }

    // ============================================================================
    // Arguments, Types and Values
    // ============================================================================

    fn build_arguments(&self, arguments: &[types::Argument<'_>]) -> Result<Vec<Argument>> {
        arguments.iter().map(|arg| self.build_argument(arg)).collect()
    }

    fn build_argument(&self, argument: &types::Argument<'_>) -> Result<Argument> {
        let (name, location) = self.declare(argument.name)?;
        let mut built = Argument::new(name, location, self.build_type(&argument.ty)?);
        built.optional = argument.optional || argument.variadic;
        built.variadic = argument.variadic;
        built.default = argument.default.as_ref().map(|value| build_value(value.inner()));

        let ext_attrs = self.build_ext_attrs(&argument.ext_attrs)?;
        attributes::apply_to_argument(&mut built, ext_attrs)?;
        Ok(built)
    }

    /// Dictionary members are optional arguments unless declared `required`.
    fn build_dictionary_member(&self, member: &types::DictionaryMember<'_>) -> Result<Argument> {
        let (name, location) = self.declare(member.name)?;
        if let (true, Some(default)) = (member.required, &member.default) {
            return Err(Diagnostic::error(
                "Required dictionary members can't have a default value.",
            )
            .with_code(ErrorCode::E502)
            .with_label(self.location(default.span()), "default value"));
        }

        let mut built = Argument::new(name, location, self.build_type(&member.ty)?);
        built.optional = !member.required;
        built.dictionary_member = true;
        built.default = member.default.as_ref().map(|value| build_value(value.inner()));

        let ext_attrs = self.build_ext_attrs(&member.ext_attrs)?;
        attributes::apply_to_argument(&mut built, ext_attrs)?;
        Ok(built)
    }

    fn build_type(&self, ty: &types::TypeExpr<'_>) -> Result<Type> {
        let location = self.location(ty.span);
        let built = match &ty.kind {
            types::TypeKind::Builtin(builtin) => Type::builtin(*builtin),
            types::TypeKind::Named(name) => {
                let name = naming::declare(name, location, NameRules::default())?;
                if name == "Promise" {
                    return Err(Diagnostic::error(
                        "Promise used without saying what it's parametrized over",
                    )
                    .with_code(ErrorCode::E100)
                    .with_label(location, "bare Promise"));
                }
                Type::unresolved(name, location)
            }
            types::TypeKind::Promise(inner) => Type::Unresolved {
                name: Id::new("Promise"),
                location,
                promise_inner: Some(Box::new(self.build_type(inner)?)),
            },
            types::TypeKind::Sequence(inner) => Type::Sequence(Box::new(self.build_type(inner)?)),
            types::TypeKind::MozMap(inner) => Type::MozMap(Box::new(self.build_type(inner)?)),
            types::TypeKind::Union(members) => {
                let members = members
                    .iter()
                    .map(|member| self.build_type(member))
                    .collect::<Result<_>>()?;
                Type::Union(UnionType::new(members, location))
            }
            types::TypeKind::Nullable(inner) => Type::Nullable(Box::new(self.build_type(inner)?)),
            types::TypeKind::Array(inner) => Type::Array(Box::new(self.build_type(inner)?)),
        };
        Ok(built)
    }

    fn build_ext_attrs(
        &self,
        attrs: &[types::ExtendedAttribute<'_>],
    ) -> Result<Vec<ExtendedAttribute>> {
        attrs
            .iter()
            .map(|attr| {
                let args = match &attr.args {
                    types::ExtendedAttributeArgs::NoArgs => ExtendedAttributeArgs::None,
                    types::ExtendedAttributeArgs::Identifier(value) => ExtendedAttributeArgs::Value(
                        ExtendedAttributeValue::Identifier(Id::new(value.inner())),
                    ),
                    types::ExtendedAttributeArgs::String(value) => ExtendedAttributeArgs::Value(
                        ExtendedAttributeValue::String(value.inner().to_string()),
                    ),
                    types::ExtendedAttributeArgs::Identifiers(values) => {
                        ExtendedAttributeArgs::Identifiers(
                            values.iter().map(|value| Id::new(value.inner())).collect(),
                        )
                    }
                    types::ExtendedAttributeArgs::Arguments(arguments) => {
                        ExtendedAttributeArgs::Arguments(self.build_arguments(arguments)?)
                    }
                    types::ExtendedAttributeArgs::NamedArguments { name, arguments } => {
                        ExtendedAttributeArgs::NamedArguments {
                            name: Id::new(name.inner()),
                            arguments: self.build_arguments(arguments)?,
                        }
                    }
                };
                Ok(ExtendedAttribute::new(
                    Id::new(attr.name.inner()),
                    args,
                    self.location(attr.span),
                ))
            })
            .collect()
    }
}

fn build_value(literal: &types::ValueLiteral<'_>) -> Value {
    match literal {
        types::ValueLiteral::Boolean(value) => Value::Boolean(*value),
        types::ValueLiteral::Integer(value) => Value::integer_literal(*value),
        types::ValueLiteral::Float(value) => Value::float_literal(*value),
        types::ValueLiteral::String(value) => Value::string_literal(value),
        types::ValueLiteral::Null => Value::Null,
        types::ValueLiteral::EmptySequence => Value::EmptySequence,
    }
}

/// `__namedgetter`, `__indexedsetter`, `__legacycaller` and so on.
fn synthesized_name(named_or_indexed: Option<NamedOrIndexed>, special: SpecialFlags) -> String {
    let mut name = String::from("__");
    match named_or_indexed {
        Some(NamedOrIndexed::Named) => name.push_str("named"),
        Some(NamedOrIndexed::Indexed) => name.push_str("indexed"),
        None => {}
    }
    for (set, qualifier) in [
        (special.getter, "getter"),
        (special.setter, "setter"),
        (special.deleter, "deleter"),
        (special.creator, "creator"),
        (special.legacycaller, "legacycaller"),
        (special.stringifier, "stringifier"),
    ] {
        if set {
            name.push_str(qualifier);
        }
    }
    name
}

fn synthesized_method(
    name: &str,
    location: Location,
    return_type: BuiltinType,
    special: SpecialFlags,
) -> Result<Method> {
    let name = naming::declare(name, location, NameRules::synthesized())?;
    let overload = Overload {
        return_type: Type::builtin(return_type),
        arguments: Vec::new(),
        location,
    };
    let mut method = Method::new(MemberInfo::new(name, location), overload);
    method.special = special;
    Ok(method)
}

/// The key argument of a getter, setter, creator or deleter decides
/// whether it is named or indexed.
fn key_kind(qualifier: &str, argument: &Argument) -> Result<NamedOrIndexed> {
    match argument.ty {
        Type::Builtin(BuiltinType::DOMString) => Ok(NamedOrIndexed::Named),
        Type::Builtin(BuiltinType::UnsignedLong) => Ok(NamedOrIndexed::Indexed),
        _ => Err(special_error(
            &format!("{qualifier} has wrong argument type (must be DOMString or UnsignedLong)"),
            argument.location,
        )),
    }
}

fn check_plain_argument(qualifier: &str, argument: &Argument) -> Result<()> {
    if argument.optional || argument.variadic {
        let kind = if argument.variadic { "variadic" } else { "optional" };
        return Err(special_error(
            &format!("{qualifier} cannot have {kind} argument"),
            argument.location,
        ));
    }
    Ok(())
}

fn special_error(message: &str, location: Location) -> Diagnostic {
    Diagnostic::error(message)
        .with_code(ErrorCode::E500)
        .with_label(location, "operation")
}

fn prototype_error(what: &str, location: Location) -> Diagnostic {
    Diagnostic::error(format!("The identifier of {what} must not be 'prototype'"))
        .with_code(ErrorCode::E200)
        .with_label(location, "reserved name")
}

fn member_kind(member: &types::InterfaceMember<'_>) -> &'static str {
    match member {
        types::InterfaceMember::Const { .. } => "const",
        types::InterfaceMember::Attribute { .. } => "attribute",
        types::InterfaceMember::Operation { .. } => "operation",
        types::InterfaceMember::Stringifier => "stringifier",
        types::InterfaceMember::Jsonifier => "jsonifier",
        types::InterfaceMember::MaplikeOrSetlike { .. } => "maplike or setlike",
    }
}

#[cfg(test)]
mod tests {
    use webidl_core::location::SourceMap;

    use super::*;
    use crate::{lexer::tokenize, parser::build_definitions};

    fn elaborate(source: &str) -> Result<(Model, Elaborated)> {
        let mut sources = SourceMap::new();
        let file = sources.add("test.webidl", source);
        let tokens = tokenize(source, file)?;
        let definitions = build_definitions(&tokens, file)?;
        let mut model = Model::new();
        let elaborated = Builder::new(&mut model, file).build(definitions)?;
        Ok((model, elaborated))
    }

    fn elaborate_error(source: &str) -> Diagnostic {
        match elaborate(source) {
            Ok(_) => panic!("expected elaboration to fail"),
            Err(err) => err,
        }
    }

    fn only_method(model: &Model) -> &Method {
        let (_, iface) = model.interfaces().next().expect("no interface");
        iface.members()[0].as_method().expect("not a method")
    }

    #[test]
    fn test_interface_registers_name() {
        let (model, elaborated) =
            elaborate("interface Node { attribute DOMString name; };").unwrap();

        assert_eq!(elaborated.productions.len(), 1);
        assert!(matches!(
            model.scope.lookup(Id::new("Node")),
            Some(Binding::Interface(_))
        ));
        let (_, iface) = model.interfaces().next().unwrap();
        assert!(iface.is_known_non_partial());
        assert_eq!(iface.members().len(), 1);
    }

    #[test]
    fn test_partial_before_interface_reuses_stub() {
        let (model, elaborated) = elaborate(
            "partial interface Node { attribute long b; };
             interface Node { attribute long a; };",
        )
        .unwrap();

        assert_eq!(model.interfaces.len(), 1);
        assert_eq!(model.partials.len(), 1);
        assert_eq!(elaborated.productions.len(), 2);
        let (_, iface) = model.interfaces().next().unwrap();
        assert!(iface.is_known_non_partial());
        assert_eq!(iface.members()[0].name(), "a");
    }

    #[test]
    fn test_two_non_partial_definitions() {
        let err = elaborate_error("interface A {}; interface A {};");
        assert_eq!(err.message(), "Two non-partial definitions for the same interface");
        assert_eq!(err.code(), Some(ErrorCode::E400));
        assert_eq!(err.labels().len(), 2);
    }

    #[test]
    fn test_interface_collides_with_dictionary() {
        let err = elaborate_error("dictionary A {}; interface A {};");
        assert_eq!(
            err.message(),
            "Interface has the same name as non-interface object"
        );
    }

    #[test]
    fn test_special_operation_names() {
        let (model, _) =
            elaborate("interface A { getter DOMString (unsigned long index); };").unwrap();
        let method = only_method(&model);

        assert_eq!(method.name(), "__indexedgetter");
        assert!(method.is_identifierless());
        assert!(method.is_named_or_indexed(NamedOrIndexed::Indexed));

        let (model, _) =
            elaborate("interface A { setter creator void (DOMString name, long value); };")
                .unwrap();
        assert_eq!(only_method(&model).name(), "__namedsettercreator");
    }

    #[test]
    fn test_special_operation_shapes() {
        let err = elaborate_error("interface A { getter DOMString (long index); };");
        assert_eq!(
            err.message(),
            "getter has wrong argument type (must be DOMString or UnsignedLong)"
        );

        let err = elaborate_error("interface A { deleter void (DOMString a, DOMString b); };");
        assert_eq!(err.message(), "deleter has wrong number of arguments");

        let err = elaborate_error("interface A { getter void (DOMString name); };");
        assert_eq!(err.message(), "getter cannot have void return type");

        let err = elaborate_error("interface A { setter void (DOMString name, optional long v); };");
        assert_eq!(err.message(), "setter cannot have optional argument");

        let err = elaborate_error("interface A { stringifier long (); };");
        assert_eq!(err.message(), "stringifier must have DOMString return type");

        let err = elaborate_error("interface A { getter setter DOMString (DOMString name); };");
        assert_eq!(
            err.message(),
            "getter and deleter are incompatible with setter and creator"
        );
    }

    #[test]
    fn test_identifier_required_for_plain_operations() {
        let err = elaborate_error("interface A { void (); };");
        assert_eq!(err.message(), "Identifier required for non-special methods");
    }

    #[test]
    fn test_stringifier_and_jsonifier() {
        let (model, _) = elaborate("interface A { stringifier; jsonifier; };").unwrap();
        let (_, iface) = model.interfaces().next().unwrap();

        let stringifier = iface.members()[0].as_method().unwrap();
        assert_eq!(stringifier.name(), "__stringifier");
        assert!(stringifier.special.stringifier);
        assert!(matches!(
            stringifier.overloads[0].return_type,
            Type::Builtin(BuiltinType::DOMString)
        ));

        let jsonifier = iface.members()[1].as_method().unwrap();
        assert_eq!(jsonifier.name(), "__jsonifier");
        assert!(jsonifier.special.jsonifier);
    }

    #[test]
    fn test_maplike_declaration() {
        let (model, _) = elaborate("interface A { readonly maplike<DOMString, long>; };").unwrap();
        let (_, iface) = model.interfaces().next().unwrap();
        let decl = iface.members()[0].as_maplike_or_setlike().unwrap();

        assert_eq!(decl.info.name, "__maplike");
        assert!(decl.readonly);
        assert!(decl.value_type.is_some());
    }

    #[test]
    fn test_reserved_identifiers() {
        let err = elaborate_error("interface A { attribute long __secret; };");
        assert_eq!(err.code(), Some(ErrorCode::E200));

        let err = elaborate_error("interface A { const long prototype = 1; };");
        assert_eq!(
            err.message(),
            "The identifier of a constant must not be 'prototype'"
        );

        let (model, _) = elaborate("interface _interface {};").unwrap();
        assert!(model.scope.lookup(Id::new("interface")).is_some());
    }

    #[test]
    fn test_readonly_inherit_attribute() {
        let err = elaborate_error("interface A { inherit readonly attribute long x; };");
        assert_eq!(
            err.message(),
            "An attribute cannot be both 'readonly' and 'inherit'"
        );
    }

    #[test]
    fn test_duplicate_enum_values() {
        let err = elaborate_error(r#"enum Mode { "a", "b", "a" };"#);
        assert_eq!(err.message(), "Enum Mode has multiple identical strings");
        assert_eq!(err.code(), Some(ErrorCode::E603));
    }

    #[test]
    fn test_required_dictionary_member_default() {
        let err = elaborate_error("dictionary D { required long x = 1; };");
        assert_eq!(
            err.message(),
            "Required dictionary members can't have a default value."
        );
    }

    #[test]
    fn test_dictionary_members_are_optional_arguments() {
        let (model, _) = elaborate("dictionary D { long x; required long y; };").unwrap();
        let dict = &model.dictionaries[0];

        assert!(dict.members()[0].optional);
        assert!(dict.members()[1].is_required());
    }

    #[test]
    fn test_bare_promise() {
        // `Promise` is a keyword; only the escaped spelling reaches a named type.
        let err = elaborate_error("interface A { _Promise foo(); };");
        assert_eq!(
            err.message(),
            "Promise used without saying what it's parametrized over"
        );
    }

    #[test]
    fn test_promise_keeps_inner_type() {
        let (model, _) = elaborate("interface A { Promise<long> foo(); };").unwrap();
        let method = only_method(&model);

        match &method.overloads[0].return_type {
            Type::Unresolved {
                name,
                promise_inner: Some(inner),
                ..
            } => {
                assert_eq!(*name, "Promise");
                assert!(matches!(**inner, Type::Builtin(BuiltinType::Long)));
            }
            other => panic!("expected unresolved Promise, got {other:?}"),
        }
    }

    #[test]
    fn test_ignored_productions_warn() {
        let (_, elaborated) =
            elaborate("exception Failure { long code; }; module gfx { };").unwrap();

        assert!(elaborated.productions.is_empty());
        assert_eq!(elaborated.warnings.len(), 2);
        assert_eq!(elaborated.warnings[0].message(), "exception declarations are ignored");
        assert_eq!(elaborated.warnings[1].code(), Some(ErrorCode::E102));
    }

    #[test]
    fn test_forward_declaration_creates_stub() {
        let (model, elaborated) = elaborate("interface Later;").unwrap();
        let (_, iface) = model.interfaces().next().unwrap();

        assert!(!iface.is_known_non_partial());
        assert!(iface.forward_declaration.is_some());
        assert_eq!(elaborated.productions.len(), 1);

        let err = elaborate_error("enum Later { \"a\" }; interface Later;");
        assert_eq!(err.code(), Some(ErrorCode::E201));
    }

    #[test]
    fn test_named_constructor_registers_global_name() {
        let (model, _) =
            elaborate("[NamedConstructor=Image(long width)] interface HTMLImageElement {};")
                .unwrap();

        assert!(matches!(
            model.scope.lookup(Id::new("Image")),
            Some(Binding::NamedConstructor(_))
        ));
    }
}
