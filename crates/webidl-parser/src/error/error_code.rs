//! Error codes for the WebIDL diagnostic system.
//!
//! Error codes are organized by origin:
//! - `E0xx` - Lexical errors
//! - `E1xx` - Syntax errors and ignored productions
//! - `E2xx` - Identifier hygiene, scope and resolution errors
//! - `E3xx` - Type composition errors
//! - `E4xx` - Interface semantic errors
//! - `E5xx` - Member semantic errors
//! - `E6xx` - Dictionary and enum errors

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexical Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A string was opened with a quote but never closed.
    E001,

    /// Unrecognized input.
    ///
    /// A character matched none of the token rules.
    E002,

    /// Malformed integer literal.
    ///
    /// The literal does not fit in a signed 64-bit integer.
    E003,

    /// Unterminated block comment.
    E004,

    // =========================================================================
    // Syntax Errors (E1xx)
    // =========================================================================
    /// Invalid syntax.
    ///
    /// The parser encountered a token it did not expect at this position.
    E100,

    /// Incomplete input.
    ///
    /// The input ended before a construct was closed, usually a missing
    /// semicolon or brace.
    E101,

    /// Ignored production.
    ///
    /// `exception` and `module` declarations are parsed but not processed.
    E102,

    // =========================================================================
    // Identifier and Scope Errors (E2xx)
    // =========================================================================
    /// Reserved identifier.
    ///
    /// Double-underscore names, `constructor`, `toString` and
    /// `__noSuchMethod__` cannot be declared in source.
    E200,

    /// Conflicting definitions.
    ///
    /// Two incompatible definitions share a name in the same scope.
    E201,

    /// Unresolved name.
    ///
    /// A referenced type or interface is not declared anywhere.
    E202,

    /// External interface.
    ///
    /// Forward-declared interfaces without a full definition are not
    /// supported.
    E203,

    /// Inconsistent overloads.
    ///
    /// Overloads of one operation disagree on extended attributes or
    /// qualifiers, or a special operation is overloaded.
    E204,

    // =========================================================================
    // Type Composition Errors (E3xx)
    // =========================================================================
    /// Invalid nullable type.
    E300,

    /// Invalid union type.
    ///
    /// Members are not distinguishable, or nullability is declared twice.
    E301,

    /// Invalid element type.
    ///
    /// An array or sequence wraps a type it cannot hold.
    E302,

    /// Invalid value.
    ///
    /// A constant or default value does not fit its declared type.
    E303,

    /// Typedef cycle.
    E304,

    // =========================================================================
    // Interface Semantic Errors (E4xx)
    // =========================================================================
    /// Missing or duplicate non-partial declaration.
    E400,

    /// Inheritance rule violation.
    E401,

    /// Inheritance or implements cycle.
    E402,

    /// Invalid implements statement.
    E403,

    /// Duplicate special member.
    E404,

    /// Global interface rule violation.
    E405,

    /// Unforgeable rule violation.
    E406,

    /// Exposure rule violation.
    E407,

    /// Maplike or setlike conflict.
    E408,

    /// Member name conflict.
    E409,

    /// Invalid `[PutForwards]` target.
    E410,

    /// Invalid `[Alias]`.
    E411,

    // =========================================================================
    // Member Semantic Errors (E5xx)
    // =========================================================================
    /// Malformed special operation.
    E500,

    /// Overloads are not distinguishable.
    E501,

    /// Invalid argument list.
    E502,

    /// Invalid attribute type.
    E503,

    /// Extended attribute misuse.
    ///
    /// A known attribute was given the wrong form or used in a forbidden
    /// combination.
    E504,

    /// Unknown extended attribute.
    E505,

    /// Invalid `[Affects]` or `[DependsOn]` combination.
    E506,

    // =========================================================================
    // Dictionary and Enum Errors (E6xx)
    // =========================================================================
    /// Dictionary refers to itself.
    E600,

    /// Duplicate dictionary member.
    E601,

    /// Invalid dictionary parent.
    E602,

    /// Duplicate enum value.
    E603,

    /// Nullable dictionary member type.
    E604,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexical errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            // Syntax errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            // Identifier and scope errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            // Type composition errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
            ErrorCode::E304 => "E304",
            // Interface errors
            ErrorCode::E400 => "E400",
            ErrorCode::E401 => "E401",
            ErrorCode::E402 => "E402",
            ErrorCode::E403 => "E403",
            ErrorCode::E404 => "E404",
            ErrorCode::E405 => "E405",
            ErrorCode::E406 => "E406",
            ErrorCode::E407 => "E407",
            ErrorCode::E408 => "E408",
            ErrorCode::E409 => "E409",
            ErrorCode::E410 => "E410",
            ErrorCode::E411 => "E411",
            // Member errors
            ErrorCode::E500 => "E500",
            ErrorCode::E501 => "E501",
            ErrorCode::E502 => "E502",
            ErrorCode::E503 => "E503",
            ErrorCode::E504 => "E504",
            ErrorCode::E505 => "E505",
            ErrorCode::E506 => "E506",
            // Dictionary and enum errors
            ErrorCode::E600 => "E600",
            ErrorCode::E601 => "E601",
            ErrorCode::E602 => "E602",
            ErrorCode::E603 => "E603",
            ErrorCode::E604 => "E604",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unrecognized input",
            ErrorCode::E003 => "malformed integer literal",
            ErrorCode::E004 => "unterminated block comment",
            ErrorCode::E100 => "invalid syntax",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "ignored production",
            ErrorCode::E200 => "reserved identifier",
            ErrorCode::E201 => "conflicting definitions",
            ErrorCode::E202 => "unresolved name",
            ErrorCode::E203 => "external interface",
            ErrorCode::E204 => "inconsistent overloads",
            ErrorCode::E300 => "invalid nullable type",
            ErrorCode::E301 => "invalid union type",
            ErrorCode::E302 => "invalid element type",
            ErrorCode::E303 => "invalid value",
            ErrorCode::E304 => "typedef cycle",
            ErrorCode::E400 => "invalid non-partial declaration",
            ErrorCode::E401 => "inheritance rule violation",
            ErrorCode::E402 => "inheritance cycle",
            ErrorCode::E403 => "invalid implements statement",
            ErrorCode::E404 => "duplicate special member",
            ErrorCode::E405 => "global interface violation",
            ErrorCode::E406 => "unforgeable violation",
            ErrorCode::E407 => "exposure violation",
            ErrorCode::E408 => "maplike or setlike conflict",
            ErrorCode::E409 => "member name conflict",
            ErrorCode::E410 => "invalid PutForwards",
            ErrorCode::E411 => "invalid Alias",
            ErrorCode::E500 => "malformed special operation",
            ErrorCode::E501 => "indistinguishable overloads",
            ErrorCode::E502 => "invalid argument",
            ErrorCode::E503 => "invalid attribute type",
            ErrorCode::E504 => "extended attribute misuse",
            ErrorCode::E505 => "unknown extended attribute",
            ErrorCode::E506 => "invalid dependency annotation",
            ErrorCode::E600 => "dictionary cycle",
            ErrorCode::E601 => "duplicate dictionary member",
            ErrorCode::E602 => "invalid dictionary parent",
            ErrorCode::E603 => "duplicate enum value",
            ErrorCode::E604 => "nullable dictionary member",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
