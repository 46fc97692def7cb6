//! Parser for WebIDL source tokens.
//!
//! This module transforms a token stream from the [`lexer`](super::lexer) into
//! the syntax tree defined in [`parser_types`](super::parser_types). The public
//! entry point is [`build_definitions`].
//!
//! The grammar is LL(1) on tokens: every production is selected by peeking
//! at the next token, and once a definition keyword has been consumed any
//! later mismatch is a hard (cut) error so the diagnostic points into the
//! definition rather than at its first token.

use winnow::{
    Parser as _,
    combinator::{delimited, opt, preceded, separated},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use webidl_core::location::{FileId, Location};

use crate::{
    error::{Diagnostic, ErrorCode},
    model::BuiltinType,
    parser_types as types,
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) at error start position
    ///
    /// Used to calculate start_offset as: `tokens.len() - start_offset_value`
    StartOffset(usize),
}

type Input<'src> = WebIdlTokenSlice<'src>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;
/// Type alias for winnow TokenSlice with our positioned tokens
type WebIdlTokenSlice<'src> = TokenSlice<'src, PositionedToken<'src>>;

/// Keywords that may still name an argument.
fn is_argument_name_keyword(token: &Token<'_>) -> bool {
    matches!(
        token,
        Token::Attribute
            | Token::Callback
            | Token::Const
            | Token::Creator
            | Token::Deleter
            | Token::Dictionary
            | Token::Enum
            | Token::Exception
            | Token::Getter
            | Token::Implements
            | Token::Inherit
            | Token::Interface
            | Token::Legacycaller
            | Token::Partial
            | Token::Jsonifier
            | Token::Setter
            | Token::Static
            | Token::Stringifier
            | Token::Typedef
            | Token::Unrestricted
            | Token::Maplike
            | Token::Setlike
            | Token::Required
    )
}

fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

/// A recoverable failure naming what was expected.
fn backtrack<O>(label: &'static str) -> IResult<O> {
    let mut e = ContextError::new();
    e.push(Context::Label(label));
    Err(ErrMode::Backtrack(e))
}

/// The next token, without consuming it.
fn peek<'src>(input: &Input<'src>) -> Option<Token<'src>> {
    input.peek_token().map(|token| token.token)
}

fn next_is(input: &Input<'_>, expected: Token<'static>) -> bool {
    peek(input) == Some(expected)
}

/// Match one specific token and return its span.
fn expect<'src>(
    expected: Token<'static>,
    label: &'static str,
) -> impl FnMut(&mut Input<'src>) -> IResult<Span> {
    move |input: &mut Input<'src>| {
        any.verify_map(|token: &PositionedToken<'src>| {
            (token.token == expected).then_some(token.span)
        })
        .context(Context::Label(label))
        .parse_next(input)
    }
}

fn semicolon<'src>(input: &mut Input<'src>) -> IResult<Span> {
    expect(Token::Semicolon, "semicolon").parse_next(input)
}

/// Parse an identifier token
fn identifier<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    any.verify_map(|token: &PositionedToken<'src>| match token.token {
        Token::Identifier(name) => Some(Spanned::new(name, token.span)),
        _ => None,
    })
    .context(Context::Label("identifier"))
    .parse_next(input)
}

/// Identifier or one of the keywords allowed as an argument name.
fn argument_name<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    any.verify_map(|token: &PositionedToken<'src>| match token.token {
        Token::Identifier(name) => Some(Spanned::new(name, token.span)),
        keyword if is_argument_name_keyword(&keyword) => keyword
            .keyword_text()
            .map(|text| Spanned::new(text, token.span)),
        _ => None,
    })
    .context(Context::Label("argument name"))
    .parse_next(input)
}

/// Identifier or `required`.
fn attribute_name<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    any.verify_map(|token: &PositionedToken<'src>| match token.token {
        Token::Identifier(name) => Some(Spanned::new(name, token.span)),
        Token::Required => Some(Spanned::new("required", token.span)),
        _ => None,
    })
    .context(Context::Label("attribute name"))
    .parse_next(input)
}

fn string_literal<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    any.verify_map(|token: &PositionedToken<'src>| match token.token {
        Token::StringLiteral(s) => Some(Spanned::new(s, token.span)),
        _ => None,
    })
    .context(Context::Label("string literal"))
    .parse_next(input)
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// `short`, `long` or `long long`, optionally `unsigned`.
fn integer_type<'src>(input: &mut Input<'src>, unsigned: bool) -> IResult<Spanned<BuiltinType>> {
    let first = any
        .verify_map(|token: &PositionedToken<'src>| match token.token {
            Token::Short | Token::Long => Some(Spanned::new(token.token, token.span)),
            _ => None,
        })
        .context(Context::Label("integer type"))
        .parse_next(input)?;

    let (builtin, span) = match first.inner() {
        Token::Short if unsigned => (BuiltinType::UnsignedShort, first.span()),
        Token::Short => (BuiltinType::Short, first.span()),
        _ => match opt(expect(Token::Long, "long")).parse_next(input)? {
            Some(second) if unsigned => {
                (BuiltinType::UnsignedLongLong, first.span().union(second))
            }
            Some(second) => (BuiltinType::LongLong, first.span().union(second)),
            None if unsigned => (BuiltinType::UnsignedLong, first.span()),
            None => (BuiltinType::Long, first.span()),
        },
    };
    Ok(Spanned::new(builtin, span))
}

/// `float` or `double`, optionally `unrestricted`.
fn float_type<'src>(input: &mut Input<'src>, unrestricted: bool) -> IResult<Spanned<BuiltinType>> {
    any.verify_map(|token: &PositionedToken<'src>| {
        let builtin = match (token.token, unrestricted) {
            (Token::Float, false) => BuiltinType::Float,
            (Token::Float, true) => BuiltinType::UnrestrictedFloat,
            (Token::Double, false) => BuiltinType::Double,
            (Token::Double, true) => BuiltinType::UnrestrictedDouble,
            _ => return None,
        };
        Some(Spanned::new(builtin, token.span))
    })
    .context(Context::Label("float type"))
    .parse_next(input)
}

fn primitive_or_string_type<'src>(input: &mut Input<'src>) -> IResult<Spanned<BuiltinType>> {
    match peek(input) {
        Some(Token::Unsigned) => {
            let start = expect(Token::Unsigned, "unsigned").parse_next(input)?;
            let ty = integer_type(input, true)?;
            Ok(Spanned::new(*ty.inner(), start.union(ty.span())))
        }
        Some(Token::Short | Token::Long) => integer_type(input, false),
        Some(Token::Unrestricted) => {
            let start = expect(Token::Unrestricted, "unrestricted").parse_next(input)?;
            let ty = float_type(input, true)?;
            Ok(Spanned::new(*ty.inner(), start.union(ty.span())))
        }
        Some(Token::Float | Token::Double) => float_type(input, false),
        _ => any
            .verify_map(|token: &PositionedToken<'src>| {
                let builtin = match token.token {
                    Token::Boolean => BuiltinType::Boolean,
                    Token::Byte => BuiltinType::Byte,
                    Token::Octet => BuiltinType::Octet,
                    Token::DOMString => BuiltinType::DOMString,
                    Token::ByteString => BuiltinType::ByteString,
                    Token::USVString => BuiltinType::USVString,
                    _ => return None,
                };
                Some(Spanned::new(builtin, token.span))
            })
            .context(Context::Label("type"))
            .parse_next(input),
    }
}

/// Trailing `[]` and `?` modifiers, applied left to right.
///
/// A `?` may not directly follow another `?`.
fn type_suffix<'src>(
    input: &mut Input<'src>,
    mut ty: types::TypeExpr<'src>,
    mut allow_nullable: bool,
) -> IResult<types::TypeExpr<'src>> {
    loop {
        match peek(input) {
            Some(Token::LeftBracket) => {
                let open = expect(Token::LeftBracket, "[").parse_next(input)?;
                let close = cut_err(input, |input| {
                    expect(Token::RightBracket, "]").parse_next(input)
                })?;
                let span = ty.span.union(open).union(close);
                ty = types::TypeExpr::new(types::TypeKind::Array(Box::new(ty)), span);
                allow_nullable = true;
            }
            Some(Token::Question) if allow_nullable => {
                let question = expect(Token::Question, "?").parse_next(input)?;
                let span = ty.span.union(question);
                ty = types::TypeExpr::new(types::TypeKind::Nullable(Box::new(ty)), span);
                allow_nullable = false;
            }
            _ => return Ok(ty),
        }
    }
}

/// An optional single `?`.
fn null_suffix<'src>(
    input: &mut Input<'src>,
    ty: types::TypeExpr<'src>,
) -> IResult<types::TypeExpr<'src>> {
    match opt(expect(Token::Question, "?")).parse_next(input)? {
        Some(question) => {
            let span = ty.span.union(question);
            Ok(types::TypeExpr::new(
                types::TypeKind::Nullable(Box::new(ty)),
                span,
            ))
        }
        None => Ok(ty),
    }
}

/// `sequence<T>`, `MozMap<T>` and `Promise<T>`.
fn parameterized_type<'src>(input: &mut Input<'src>) -> IResult<types::TypeExpr<'src>> {
    let keyword = any
        .verify_map(|token: &PositionedToken<'src>| match token.token {
            Token::Sequence | Token::MozMap | Token::Promise => {
                Some(Spanned::new(token.token, token.span))
            }
            _ => None,
        })
        .parse_next(input)?;

    cut_err(input, |input| {
        expect(Token::LeftAngle, "<").parse_next(input)?;
        let inner = if *keyword.inner() == Token::Promise {
            return_type(input)?
        } else {
            type_(input)?
        };
        let close = expect(Token::RightAngle, ">").parse_next(input)?;
        let span = keyword.span().union(close);
        let inner = Box::new(inner);
        let kind = match keyword.inner() {
            Token::Sequence => types::TypeKind::Sequence(inner),
            Token::MozMap => types::TypeKind::MozMap(inner),
            _ => types::TypeKind::Promise(inner),
        };
        null_suffix(input, types::TypeExpr::new(kind, span))
    })
}

fn non_any_type<'src>(input: &mut Input<'src>) -> IResult<types::TypeExpr<'src>> {
    match peek(input) {
        Some(Token::Sequence | Token::MozMap | Token::Promise) => parameterized_type(input),
        Some(Token::Identifier(_)) => {
            let name = identifier(input)?;
            let base = types::TypeExpr::new(types::TypeKind::Named(*name.inner()), name.span());
            type_suffix(input, base, true)
        }
        Some(Token::Object | Token::Date) => {
            let builtin = any
                .verify_map(|token: &PositionedToken<'src>| match token.token {
                    Token::Object => Some(Spanned::new(BuiltinType::Object, token.span)),
                    Token::Date => Some(Spanned::new(BuiltinType::Date, token.span)),
                    _ => None,
                })
                .parse_next(input)?;
            let base = types::TypeExpr::new(
                types::TypeKind::Builtin(*builtin.inner()),
                builtin.span(),
            );
            type_suffix(input, base, true)
        }
        _ => {
            let builtin = primitive_or_string_type(input)?;
            let base = types::TypeExpr::new(
                types::TypeKind::Builtin(*builtin.inner()),
                builtin.span(),
            );
            type_suffix(input, base, true)
        }
    }
}

/// `any`, which only takes array suffixes.
fn any_type<'src>(input: &mut Input<'src>) -> IResult<types::TypeExpr<'src>> {
    let span = expect(Token::Any, "any").parse_next(input)?;
    let base = types::TypeExpr::new(types::TypeKind::Builtin(BuiltinType::Any), span);
    type_suffix(input, base, false)
}

fn union_member_type<'src>(input: &mut Input<'src>) -> IResult<types::TypeExpr<'src>> {
    match peek(input) {
        Some(Token::LeftParen) => {
            let union = union_type(input)?;
            type_suffix(input, union, true)
        }
        Some(Token::Any) => {
            let span = expect(Token::Any, "any").parse_next(input)?;
            let open = expect(Token::LeftBracket, "[").parse_next(input)?;
            let close = expect(Token::RightBracket, "]").parse_next(input)?;
            let any = types::TypeExpr::new(types::TypeKind::Builtin(BuiltinType::Any), span);
            let array = types::TypeExpr::new(
                types::TypeKind::Array(Box::new(any)),
                span.union(open).union(close),
            );
            type_suffix(input, array, true)
        }
        _ => non_any_type(input),
    }
}

/// `(A or B or ...)` with at least two members.
fn union_type<'src>(input: &mut Input<'src>) -> IResult<types::TypeExpr<'src>> {
    let open = expect(Token::LeftParen, "(").parse_next(input)?;
    cut_err(input, |input| {
        let first = union_member_type(input)?;
        expect(Token::Or, "or").parse_next(input)?;
        let mut members = vec![first, union_member_type(input)?];
        while opt(expect(Token::Or, "or")).parse_next(input)?.is_some() {
            members.push(union_member_type(input)?);
        }
        let close = expect(Token::RightParen, ")").parse_next(input)?;
        Ok(types::TypeExpr::new(
            types::TypeKind::Union(members),
            open.union(close),
        ))
    })
}

fn type_<'src>(input: &mut Input<'src>) -> IResult<types::TypeExpr<'src>> {
    match peek(input) {
        Some(Token::LeftParen) => {
            let union = union_type(input)?;
            type_suffix(input, union, true)
        }
        Some(Token::Any) => any_type(input),
        _ => non_any_type(input),
    }
    .map_err(|e| e.map(|mut e: ContextError<Context>| {
        e.push(Context::Label("type"));
        e
    }))
}

fn return_type<'src>(input: &mut Input<'src>) -> IResult<types::TypeExpr<'src>> {
    match opt(expect(Token::Void, "void")).parse_next(input)? {
        Some(span) => Ok(types::TypeExpr::new(
            types::TypeKind::Builtin(BuiltinType::Void),
            span,
        )),
        None => type_(input),
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

fn const_value<'src>(input: &mut Input<'src>) -> IResult<Spanned<types::ValueLiteral<'src>>> {
    any.verify_map(|token: &PositionedToken<'src>| {
        let value = match token.token {
            Token::True => types::ValueLiteral::Boolean(true),
            Token::False => types::ValueLiteral::Boolean(false),
            Token::Integer(n) => types::ValueLiteral::Integer(n),
            Token::FloatLiteral(n) => types::ValueLiteral::Float(n),
            Token::Null => types::ValueLiteral::Null,
            _ => return None,
        };
        Some(Spanned::new(value, token.span))
    })
    .context(Context::Label("constant value"))
    .parse_next(input)
}

fn default_value<'src>(input: &mut Input<'src>) -> IResult<Spanned<types::ValueLiteral<'src>>> {
    match peek(input) {
        Some(Token::StringLiteral(_)) => {
            let s = string_literal(input)?;
            Ok(s.map(|s| types::ValueLiteral::String(s)))
        }
        Some(Token::LeftBracket) => {
            let open = expect(Token::LeftBracket, "[").parse_next(input)?;
            let close = expect(Token::RightBracket, "]").parse_next(input)?;
            Ok(Spanned::new(
                types::ValueLiteral::EmptySequence,
                open.union(close),
            ))
        }
        _ => const_value(input),
    }
}

/// `= value`, if present.
fn default<'src>(input: &mut Input<'src>) -> IResult<Option<Spanned<types::ValueLiteral<'src>>>> {
    opt(preceded(expect(Token::Equals, "="), default_value))
        .context(Context::Label("default value"))
        .parse_next(input)
}

// ---------------------------------------------------------------------------
// Extended attributes and arguments
// ---------------------------------------------------------------------------

fn parenthesized_arguments<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Argument<'src>>> {
    delimited(
        expect(Token::LeftParen, "("),
        argument_list,
        expect(Token::RightParen, ")"),
    )
    .parse_next(input)
}

fn extended_attribute<'src>(input: &mut Input<'src>) -> IResult<types::ExtendedAttribute<'src>> {
    let name = identifier(input)?;
    let mut span = name.span();

    let args = match peek(input) {
        Some(Token::LeftParen) => {
            types::ExtendedAttributeArgs::Arguments(parenthesized_arguments(input)?)
        }
        Some(Token::Equals) => {
            expect(Token::Equals, "=").parse_next(input)?;
            match peek(input) {
                Some(Token::LeftParen) => {
                    let ids = delimited(
                        expect(Token::LeftParen, "("),
                        separated(1.., identifier, expect(Token::Comma, "comma")),
                        expect(Token::RightParen, ")"),
                    )
                    .context(Context::Label("identifier list"))
                    .parse_next(input)?;
                    types::ExtendedAttributeArgs::Identifiers(ids)
                }
                Some(Token::StringLiteral(_)) => {
                    let value = string_literal(input)?;
                    span = span.union(value.span());
                    types::ExtendedAttributeArgs::String(value)
                }
                _ => {
                    let value = identifier(input)?;
                    span = span.union(value.span());
                    if next_is(input, Token::LeftParen) {
                        types::ExtendedAttributeArgs::NamedArguments {
                            name: value,
                            arguments: parenthesized_arguments(input)?,
                        }
                    } else {
                        types::ExtendedAttributeArgs::Identifier(value)
                    }
                }
            }
        }
        _ => types::ExtendedAttributeArgs::NoArgs,
    };

    Ok(types::ExtendedAttribute { name, args, span })
}

/// `[A, B=c, D(args)]`, or nothing.
fn extended_attribute_list<'src>(
    input: &mut Input<'src>,
) -> IResult<Vec<types::ExtendedAttribute<'src>>> {
    if !next_is(input, Token::LeftBracket) {
        return Ok(Vec::new());
    }
    expect(Token::LeftBracket, "[").parse_next(input)?;
    cut_err(input, |input| {
        let attrs = separated(1.., extended_attribute, expect(Token::Comma, "comma"))
            .context(Context::Label("extended attribute"))
            .parse_next(input)?;
        expect(Token::RightBracket, "]").parse_next(input)?;
        Ok(attrs)
    })
}

fn argument<'src>(input: &mut Input<'src>) -> IResult<types::Argument<'src>> {
    let ext_attrs = extended_attribute_list(input)?;

    if opt(expect(Token::Optional, "optional"))
        .parse_next(input)?
        .is_some()
    {
        let ty = type_(input)?;
        let name = argument_name(input)?;
        let default = default(input)?;
        return Ok(types::Argument {
            ext_attrs,
            name,
            ty,
            optional: true,
            variadic: false,
            default,
        });
    }

    let ty = type_(input)?;
    let variadic = opt(expect(Token::Ellipsis, "..."))
        .parse_next(input)?
        .is_some();
    let name = argument_name(input)?;
    Ok(types::Argument {
        ext_attrs,
        name,
        ty,
        optional: false,
        variadic,
        default: None,
    })
}

/// Comma-separated arguments, possibly none. Stops before `)`.
fn argument_list<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Argument<'src>>> {
    if next_is(input, Token::RightParen) {
        return Ok(Vec::new());
    }
    separated(1.., argument, expect(Token::Comma, "comma"))
        .context(Context::Label("argument list"))
        .parse_next(input)
}

// ---------------------------------------------------------------------------
// Interface members
// ---------------------------------------------------------------------------

fn const_member<'src>(input: &mut Input<'src>) -> IResult<types::InterfaceMember<'src>> {
    expect(Token::Const, "const").parse_next(input)?;
    cut_err(input, |input| {
        let ty = match peek(input) {
            Some(Token::Identifier(_)) => {
                let name = identifier(input)?;
                types::TypeExpr::new(types::TypeKind::Named(*name.inner()), name.span())
            }
            _ => {
                let builtin = primitive_or_string_type(input)?;
                types::TypeExpr::new(types::TypeKind::Builtin(*builtin.inner()), builtin.span())
            }
        };
        let ty = null_suffix(input, ty)?;
        let name = identifier(input)?;
        expect(Token::Equals, "=").parse_next(input)?;
        let value = const_value(input)?;
        semicolon(input)?;
        Ok(types::InterfaceMember::Const { ty, name, value })
    })
}

/// `attribute Type name;` after any `readonly`/`inherit`/`static` prefix.
fn attribute_rest<'src>(
    input: &mut Input<'src>,
    readonly: bool,
    inherit: bool,
    is_static: bool,
    stringifier: bool,
) -> IResult<types::InterfaceMember<'src>> {
    expect(Token::Attribute, "attribute").parse_next(input)?;
    cut_err(input, |input| {
        let ty = type_(input)?;
        let name = attribute_name(input)?;
        semicolon(input)?;
        Ok(types::InterfaceMember::Attribute {
            readonly,
            inherit,
            is_static,
            stringifier,
            ty,
            name,
        })
    })
}

/// `readonly`? then `attribute ...`.
fn readonly_attribute<'src>(
    input: &mut Input<'src>,
    inherit: bool,
    is_static: bool,
    stringifier: bool,
) -> IResult<types::InterfaceMember<'src>> {
    let readonly = opt(expect(Token::Readonly, "readonly"))
        .parse_next(input)?
        .is_some();
    attribute_rest(input, readonly, inherit, is_static, stringifier)
}

/// `ReturnType name? (arguments);`
fn operation_rest<'src>(
    input: &mut Input<'src>,
    qualifiers: Vec<Spanned<types::Qualifier>>,
) -> IResult<types::InterfaceMember<'src>> {
    let return_type = return_type(input)?;
    cut_err(input, |input| {
        let name = opt(identifier).parse_next(input)?;
        let arguments = parenthesized_arguments(input)?;
        semicolon(input)?;
        Ok(types::InterfaceMember::Operation {
            qualifiers,
            return_type,
            name,
            arguments,
        })
    })
}

fn special_qualifier<'src>(input: &mut Input<'src>) -> IResult<Spanned<types::Qualifier>> {
    any.verify_map(|token: &PositionedToken<'src>| {
        let qualifier = match token.token {
            Token::Getter => types::Qualifier::Getter,
            Token::Setter => types::Qualifier::Setter,
            Token::Creator => types::Qualifier::Creator,
            Token::Deleter => types::Qualifier::Deleter,
            Token::Legacycaller => types::Qualifier::Legacycaller,
            _ => return None,
        };
        Some(Spanned::new(qualifier, token.span))
    })
    .context(Context::Label("special qualifier"))
    .parse_next(input)
}

/// `maplike<K, V>;` or `setlike<K>;`
fn maplike_or_setlike<'src>(
    input: &mut Input<'src>,
    readonly: bool,
) -> IResult<types::InterfaceMember<'src>> {
    let kind = any
        .verify_map(|token: &PositionedToken<'src>| match token.token {
            Token::Maplike => Some(types::CollectionKind::Maplike),
            Token::Setlike => Some(types::CollectionKind::Setlike),
            _ => None,
        })
        .context(Context::Label("maplike or setlike"))
        .parse_next(input)?;

    cut_err(input, |input| {
        expect(Token::LeftAngle, "<").parse_next(input)?;
        let key = type_(input)?;
        let value = match kind {
            types::CollectionKind::Maplike => {
                expect(Token::Comma, "comma").parse_next(input)?;
                Some(type_(input)?)
            }
            types::CollectionKind::Setlike => None,
        };
        expect(Token::RightAngle, ">").parse_next(input)?;
        semicolon(input)?;
        Ok(types::InterfaceMember::MaplikeOrSetlike {
            kind,
            readonly,
            key,
            value,
        })
    })
}

fn interface_member_body<'src>(input: &mut Input<'src>) -> IResult<types::InterfaceMember<'src>> {
    match peek(input) {
        Some(Token::Const) => const_member(input),
        Some(Token::Stringifier) => {
            let span = expect(Token::Stringifier, "stringifier").parse_next(input)?;
            match peek(input) {
                Some(Token::Semicolon) => {
                    semicolon(input)?;
                    Ok(types::InterfaceMember::Stringifier)
                }
                Some(Token::Readonly | Token::Attribute) => {
                    readonly_attribute(input, false, false, true)
                }
                _ => operation_rest(
                    input,
                    vec![Spanned::new(types::Qualifier::Stringifier, span)],
                ),
            }
        }
        Some(Token::Jsonifier) => {
            expect(Token::Jsonifier, "jsonifier").parse_next(input)?;
            cut_err(input, semicolon)?;
            Ok(types::InterfaceMember::Jsonifier)
        }
        Some(Token::Static) => {
            let span = expect(Token::Static, "static").parse_next(input)?;
            match peek(input) {
                Some(Token::Readonly | Token::Attribute) => {
                    readonly_attribute(input, false, true, false)
                }
                _ => operation_rest(input, vec![Spanned::new(types::Qualifier::Static, span)]),
            }
        }
        Some(Token::Readonly) => {
            expect(Token::Readonly, "readonly").parse_next(input)?;
            match peek(input) {
                Some(Token::Maplike | Token::Setlike) => maplike_or_setlike(input, true),
                _ => cut_err(input, |input| attribute_rest(input, true, false, false, false)),
            }
        }
        Some(Token::Inherit) => {
            expect(Token::Inherit, "inherit").parse_next(input)?;
            cut_err(input, |input| readonly_attribute(input, true, false, false))
        }
        Some(Token::Attribute) => attribute_rest(input, false, false, false, false),
        Some(Token::Maplike | Token::Setlike) => maplike_or_setlike(input, false),
        Some(
            Token::Getter | Token::Setter | Token::Creator | Token::Deleter | Token::Legacycaller,
        ) => {
            let mut qualifiers = vec![special_qualifier(input)?];
            while let Some(qualifier) = opt(special_qualifier).parse_next(input)? {
                qualifiers.push(qualifier);
            }
            operation_rest(input, qualifiers)
        }
        _ => operation_rest(input, Vec::new()),
    }
}

fn interface_member<'src>(input: &mut Input<'src>) -> IResult<types::Member<'src>> {
    let ext_attrs = extended_attribute_list(input)?;
    let span = input
        .peek_token()
        .map(|token| token.span)
        .unwrap_or_default();
    let body = interface_member_body
        .context(Context::Label("interface member"))
        .parse_next(input)?;
    Ok(types::Member {
        ext_attrs,
        body,
        span,
    })
}

/// `{ members };`
fn interface_body<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Member<'src>>> {
    expect(Token::LeftBrace, "{").parse_next(input)?;
    let mut members = Vec::new();
    while !next_is(input, Token::RightBrace) {
        if input.eof_offset() == 0 {
            return backtrack("}");
        }
        members.push(interface_member(input)?);
    }
    expect(Token::RightBrace, "}").parse_next(input)?;
    semicolon(input)?;
    Ok(members)
}

fn inheritance<'src>(input: &mut Input<'src>) -> IResult<Option<Spanned<&'src str>>> {
    opt(preceded(expect(Token::Colon, ":"), identifier))
        .context(Context::Label("inheritance"))
        .parse_next(input)
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// `interface Name : Parent { ... };` or `interface Name;`
fn interface<'src>(input: &mut Input<'src>, is_callback: bool) -> IResult<types::Definition<'src>> {
    expect(Token::Interface, "interface").parse_next(input)?;
    cut_err(input, |input| {
        let name = identifier(input)?;
        if !is_callback && opt(semicolon).parse_next(input)?.is_some() {
            return Ok(types::Definition::ForwardDeclaration { name });
        }
        let parent = inheritance(input)?;
        let members = interface_body(input)?;
        Ok(types::Definition::Interface {
            name,
            parent,
            members,
            is_callback,
        })
    })
}

fn partial<'src>(input: &mut Input<'src>) -> IResult<types::Definition<'src>> {
    expect(Token::Partial, "partial").parse_next(input)?;
    cut_err(input, |input| {
        expect(Token::Interface, "interface").parse_next(input)?;
        let name = identifier(input)?;
        let members = interface_body(input)?;
        Ok(types::Definition::Partial { name, members })
    })
}

/// `callback interface ...` or `callback Name = ReturnType (args);`
fn callback<'src>(input: &mut Input<'src>) -> IResult<types::Definition<'src>> {
    expect(Token::Callback, "callback").parse_next(input)?;
    if next_is(input, Token::Interface) {
        return interface(input, true);
    }
    cut_err(input, |input| {
        let name = identifier(input)?;
        expect(Token::Equals, "=").parse_next(input)?;
        let return_type = return_type(input)?;
        let arguments = parenthesized_arguments(input)?;
        semicolon(input)?;
        Ok(types::Definition::Callback {
            name,
            return_type,
            arguments,
        })
    })
}

fn dictionary_member<'src>(input: &mut Input<'src>) -> IResult<types::DictionaryMember<'src>> {
    let ext_attrs = extended_attribute_list(input)?;
    let required = opt(expect(Token::Required, "required"))
        .parse_next(input)?
        .is_some();
    let ty = type_(input)?;
    let name = identifier(input)?;
    let default = default(input)?;
    semicolon(input)?;
    Ok(types::DictionaryMember {
        ext_attrs,
        required,
        ty,
        name,
        default,
    })
}

fn dictionary<'src>(input: &mut Input<'src>) -> IResult<types::Definition<'src>> {
    expect(Token::Dictionary, "dictionary").parse_next(input)?;
    cut_err(input, |input| {
        let name = identifier(input)?;
        let parent = inheritance(input)?;
        expect(Token::LeftBrace, "{").parse_next(input)?;
        let mut members = Vec::new();
        while !next_is(input, Token::RightBrace) {
            if input.eof_offset() == 0 {
                return backtrack("}");
            }
            members.push(dictionary_member(input)?);
        }
        expect(Token::RightBrace, "}").parse_next(input)?;
        semicolon(input)?;
        Ok(types::Definition::Dictionary {
            name,
            parent,
            members,
        })
    })
}

/// `enum Name { "a", "b", };` A trailing comma is allowed.
fn enumeration<'src>(input: &mut Input<'src>) -> IResult<types::Definition<'src>> {
    expect(Token::Enum, "enum").parse_next(input)?;
    cut_err(input, |input| {
        let name = identifier(input)?;
        expect(Token::LeftBrace, "{").parse_next(input)?;
        let mut values = vec![string_literal(input)?];
        while opt(expect(Token::Comma, "comma")).parse_next(input)?.is_some() {
            match opt(string_literal).parse_next(input)? {
                Some(value) => values.push(value),
                None => break,
            }
        }
        expect(Token::RightBrace, "}").parse_next(input)?;
        semicolon(input)?;
        Ok(types::Definition::Enum { name, values })
    })
}

fn typedef<'src>(input: &mut Input<'src>) -> IResult<types::Definition<'src>> {
    expect(Token::Typedef, "typedef").parse_next(input)?;
    cut_err(input, |input| {
        let ty = type_(input)?;
        let name = identifier(input)?;
        semicolon(input)?;
        Ok(types::Definition::Typedef { ty, name })
    })
}

fn implements_statement<'src>(input: &mut Input<'src>) -> IResult<types::Definition<'src>> {
    let implementor = identifier(input)?;
    cut_err(input, |input| {
        expect(Token::Implements, "implements").parse_next(input)?;
        let implementee = identifier(input)?;
        semicolon(input)?;
        Ok(types::Definition::Implements {
            implementor,
            implementee,
        })
    })
}

/// Skip a brace-delimited block, honoring nesting.
fn skip_block<'src>(input: &mut Input<'src>) -> IResult<()> {
    expect(Token::LeftBrace, "{").parse_next(input)?;
    let mut depth = 1usize;
    while depth > 0 {
        let Some(token) = input.next_token() else {
            return backtrack("}");
        };
        match token.token {
            Token::LeftBrace => depth += 1,
            Token::RightBrace => depth -= 1,
            _ => {}
        }
    }
    Ok(())
}

/// `exception` and `module` declarations: the name is kept, the body is
/// skipped.
fn ignored_definition<'src>(input: &mut Input<'src>) -> IResult<types::Definition<'src>> {
    let keyword = any
        .verify_map(|token: &PositionedToken<'src>| match token.token {
            Token::Exception | Token::Module => Some(token.token),
            _ => None,
        })
        .parse_next(input)?;
    cut_err(input, |input| {
        let name = identifier(input)?;
        if keyword == Token::Exception {
            inheritance(input)?;
        }
        skip_block(input)?;
        semicolon(input)?;
        Ok(match keyword {
            Token::Exception => types::Definition::Exception { name },
            _ => types::Definition::Module { name },
        })
    })
}

fn definition<'src>(input: &mut Input<'src>) -> IResult<types::Definition<'src>> {
    match peek(input) {
        Some(Token::Interface) => interface(input, false),
        Some(Token::Callback) => callback(input),
        Some(Token::Partial) => partial(input),
        Some(Token::Dictionary) => dictionary(input),
        Some(Token::Enum) => enumeration(input),
        Some(Token::Typedef) => typedef(input),
        Some(Token::Exception | Token::Module) => ignored_definition(input),
        Some(Token::Identifier(_)) => implements_statement(input),
        _ => backtrack("definition"),
    }
}

fn annotated_definition<'src>(input: &mut Input<'src>) -> IResult<types::Annotated<'src>> {
    let ext_attrs = extended_attribute_list(input)?;
    let keyword_span = input
        .peek_token()
        .map(|token| token.span)
        .unwrap_or_default();
    let definition = definition(input)?;
    Ok(types::Annotated {
        ext_attrs,
        definition,
        keyword_span,
    })
}

fn definitions<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Annotated<'src>>> {
    let mut definitions = Vec::new();
    while input.eof_offset() > 0 {
        definitions.push(annotated_definition(input)?);
    }
    Ok(definitions)
}

fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken],
    current_remaining: usize,
    file: FileId,
) -> Diagnostic {
    // Extract start offset from error context if available
    let start_remaining = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.context().find_map(|ctx| match ctx {
            Context::StartOffset(n) => Some(*n),
            _ => None,
        }),
        _ => None,
    };

    let end_offset = tokens.len() - current_remaining;
    let start_offset = start_remaining.map(|r| tokens.len() - r).unwrap_or(0);
    let last_span = tokens.last().map(|t| t.span).unwrap_or_default();

    match error {
        ErrMode::Backtrack(_) | ErrMode::Cut(_) if end_offset >= tokens.len() => {
            Diagnostic::error(
                "Syntax Error at end of file. Possibly due to missing semicolon(;), braces(}) or both",
            )
            .with_code(ErrorCode::E101)
            .with_label(Location::new(file, last_span), "input ends here")
            .with_help("close every block with `};`")
        }
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => {
            let mut contexts: Vec<String> = e
                .context()
                .filter_map(|ctx| match ctx {
                    Context::Label(label) => Some(format!("expected {label}")),
                    _ => None,
                })
                .collect();
            contexts.dedup();

            let message = if contexts.is_empty() {
                "unexpected token".to_string()
            } else {
                contexts.join(" → ")
            };

            let error_span = {
                let examine_range = if start_offset < end_offset {
                    // Consumed tokens: point at the whole construct up to
                    // and including the offending token.
                    start_offset..(end_offset + 1).min(tokens.len())
                } else if matches!(
                    tokens[end_offset].token,
                    Token::RightBrace | Token::RightBracket
                ) && end_offset > 0
                {
                    // Stopped at a closing delimiter, likely a missing semicolon
                    // before it.
                    end_offset - 1..end_offset
                } else {
                    end_offset..end_offset + 1
                };

                let slice = &tokens[examine_range];
                match (slice.first(), slice.last()) {
                    (Some(first), Some(last)) => first.span.union(last.span),
                    _ => last_span,
                }
            };

            Diagnostic::error(format!("invalid syntax: {message}"))
                .with_code(ErrorCode::E100)
                .with_label(Location::new(file, error_span), "unexpected token")
                .with_help("check syntax and token positioning")
        }
        ErrMode::Incomplete(_) => {
            // Token slices are complete input; kept for exhaustiveness.
            Diagnostic::error("incomplete input, more tokens expected")
                .with_code(ErrorCode::E101)
                .with_label(Location::new(file, last_span), "incomplete")
                .with_help("ensure input is complete")
        }
    }
}

/// Build the definitions of one source file from its tokens.
pub fn build_definitions<'src>(
    tokens: &'src [PositionedToken<'src>],
    file: FileId,
) -> Result<Vec<types::Annotated<'src>>, Diagnostic> {
    let mut token_slice = TokenSlice::new(tokens);

    match definitions.parse_next(&mut token_slice) {
        Ok(definitions) => Ok(definitions),
        Err(e) => {
            let current_remaining = token_slice.eof_offset();
            Err(convert_error(e, tokens, current_remaining, file))
        }
    }
}
