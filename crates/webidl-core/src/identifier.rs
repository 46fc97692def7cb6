//! Identifier management using string interning for efficient string storage and comparison
//!
//! This module provides the [`Id`] type. Every WebIDL name (interfaces, members,
//! arguments, extended attributes, global names) is interned once and compared
//! by symbol afterwards.

use std::{
    cmp::Ordering,
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for efficient identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Efficient identifier type using string interning
///
/// Equality and hashing work on the interned symbol. Ordering compares the
/// underlying strings so that sorted collections of identifiers come out in
/// lexicographic order.
///
/// # Examples
///
/// ```
/// use webidl_core::identifier::Id;
///
/// let window = Id::new("Window");
/// let getter = Id::new("__namedgetter");
///
/// assert_eq!(window, "Window");
/// assert!(getter.is_reserved());
/// assert!(Id::new("abc") < Id::new("abd"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// # Examples
    ///
    /// ```
    /// use webidl_core::identifier::Id;
    ///
    /// let iface = Id::new("Node");
    /// let member = Id::new("appendChild");
    /// ```
    pub fn new(name: &str) -> Self {
        with_interner(|interner| Self(interner.get_or_intern(name)))
    }

    /// Returns an owned copy of the identifier text.
    pub fn as_string(&self) -> String {
        self.to_string()
    }

    /// Returns `true` when the identifier uses the double-underscore form
    /// reserved for names synthesized by the parser.
    pub fn is_reserved(&self) -> bool {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .is_some_and(|name| name.starts_with("__"))
        })
    }

    /// Returns the length of the identifier text in bytes.
    pub fn len(&self) -> usize {
        with_interner(|interner| interner.resolve(self.0).map_or(0, str::len))
    }

    /// Returns `true` for the empty identifier.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_owned()
        });
        f.write_str(&value)
    }
}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Id {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            return Ordering::Equal;
        }
        with_interner(|interner| {
            let lhs = interner.resolve(self.0).unwrap_or_default();
            let rhs = interner.resolve(other.0).unwrap_or_default();
            lhs.cmp(rhs)
        })
    }
}

impl std::str::FromStr for Id {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// This is a convenience implementation that calls `Id::new`.
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| interner.resolve(self.0) == Some(other))
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
