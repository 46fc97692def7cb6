//! Extended attributes attached to definitions, members and arguments.

use std::{collections::BTreeMap, fmt};

use webidl_core::{identifier::Id, location::Location};

use super::Argument;

/// Right-hand side of `[Name=value]`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtendedAttributeValue {
    Identifier(Id),
    String(String),
}

impl fmt::Display for ExtendedAttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtendedAttributeValue::Identifier(id) => write!(f, "{id}"),
            ExtendedAttributeValue::String(s) => f.write_str(s),
        }
    }
}

/// The forms an extended attribute can take.
#[derive(Debug, Clone)]
pub enum ExtendedAttributeArgs {
    /// `[Name]`
    None,
    /// `[Name=value]`
    Value(ExtendedAttributeValue),
    /// `[Name=(A, B)]`
    Identifiers(Vec<Id>),
    /// `[Name(arguments)]`
    Arguments(Vec<Argument>),
    /// `[Name=Other(arguments)]`
    NamedArguments { name: Id, arguments: Vec<Argument> },
}

#[derive(Debug, Clone)]
pub struct ExtendedAttribute {
    name: Id,
    args: ExtendedAttributeArgs,
    location: Location,
}

impl ExtendedAttribute {
    pub fn new(name: Id, args: ExtendedAttributeArgs, location: Location) -> Self {
        Self {
            name,
            args,
            location,
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn args(&self) -> &ExtendedAttributeArgs {
        &self.args
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// `[Name]` with nothing after it.
    pub fn no_arguments(&self) -> bool {
        matches!(self.args, ExtendedAttributeArgs::None)
    }

    pub fn has_value(&self) -> bool {
        matches!(self.args, ExtendedAttributeArgs::Value(_))
    }

    pub fn value(&self) -> Option<&ExtendedAttributeValue> {
        match &self.args {
            ExtendedAttributeArgs::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Value as an identifier; string values are interned as written.
    pub fn value_id(&self) -> Option<Id> {
        self.value().map(|value| match value {
            ExtendedAttributeValue::Identifier(id) => *id,
            ExtendedAttributeValue::String(s) => Id::new(s),
        })
    }

    /// `[Name(args)]` or `[Name=Other(args)]`.
    pub fn has_args(&self) -> bool {
        matches!(
            self.args,
            ExtendedAttributeArgs::Arguments(_)
                | ExtendedAttributeArgs::NamedArguments { .. }
                | ExtendedAttributeArgs::Identifiers(_)
        )
    }

    pub fn arguments(&self) -> Option<&[Argument]> {
        match &self.args {
            ExtendedAttributeArgs::Arguments(arguments)
            | ExtendedAttributeArgs::NamedArguments { arguments, .. } => Some(arguments),
            _ => None,
        }
    }

    /// Either a single value or a parenthesized identifier list, as a list.
    pub fn list_value(&self) -> Vec<Id> {
        match &self.args {
            ExtendedAttributeArgs::Identifiers(ids) => ids.clone(),
            ExtendedAttributeArgs::Value(_) => self.value_id().into_iter().collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for ExtendedAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match &self.args {
            ExtendedAttributeArgs::None => Ok(()),
            ExtendedAttributeArgs::Value(value) => write!(f, "={value}"),
            ExtendedAttributeArgs::Identifiers(ids) => {
                let ids: Vec<String> = ids.iter().map(Id::to_string).collect();
                write!(f, "=({})", ids.join(", "))
            }
            ExtendedAttributeArgs::Arguments(arguments) => {
                write!(f, "({} arguments)", arguments.len())
            }
            ExtendedAttributeArgs::NamedArguments { name, arguments } => {
                write!(f, "={name}({} arguments)", arguments.len())
            }
        }
    }
}

/// The extended attributes accepted on a construct, in source order.
///
/// Lookups return the last attribute with a given name, so a repeated
/// attribute overrides the earlier one.
#[derive(Debug, Clone, Default)]
pub struct ExtendedAttributes(Vec<ExtendedAttribute>);

impl ExtendedAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, attr: ExtendedAttribute) {
        self.0.push(attr);
    }

    pub fn get(&self, name: &str) -> Option<&ExtendedAttribute> {
        self.0.iter().rev().find(|attr| attr.is(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Identifier value of `[name=value]`.
    pub fn value_of(&self, name: &str) -> Option<Id> {
        self.get(name).and_then(ExtendedAttribute::value_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtendedAttribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Name to value-list table, used to compare the attributes of two
    /// overloads.
    pub(crate) fn signature(&self) -> BTreeMap<Id, Vec<Id>> {
        self.0
            .iter()
            .map(|attr| (attr.name(), attr.list_value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str, args: ExtendedAttributeArgs) -> ExtendedAttribute {
        ExtendedAttribute::new(Id::new(name), args, Location::builtin("<test>"))
    }

    #[test]
    fn test_list_value_forms() {
        let single = attr(
            "Exposed",
            ExtendedAttributeArgs::Value(ExtendedAttributeValue::Identifier(Id::new("Window"))),
        );
        let list = attr(
            "Exposed",
            ExtendedAttributeArgs::Identifiers(vec![Id::new("Window"), Id::new("Worker")]),
        );

        assert_eq!(single.list_value(), vec![Id::new("Window")]);
        assert_eq!(list.list_value().len(), 2);
        assert!(list.has_args());
        assert!(!single.has_args());
        assert!(attr("Pure", ExtendedAttributeArgs::None).no_arguments());
    }

    #[test]
    fn test_last_attribute_wins() {
        let mut attrs = ExtendedAttributes::new();
        attrs.push(attr(
            "Pref",
            ExtendedAttributeArgs::Value(ExtendedAttributeValue::String("a.b".into())),
        ));
        attrs.push(attr(
            "Pref",
            ExtendedAttributeArgs::Value(ExtendedAttributeValue::String("c.d".into())),
        ));

        assert_eq!(attrs.value_of("Pref"), Some(Id::new("c.d")));
        assert_eq!(attrs.len(), 2);
        assert!(!attrs.contains("Func"));
    }

    #[test]
    fn test_display() {
        let list = attr(
            "Exposed",
            ExtendedAttributeArgs::Identifiers(vec![Id::new("Window"), Id::new("Worker")]),
        );
        assert_eq!(list.to_string(), "Exposed=(Window, Worker)");
    }
}
