//! Lexical analyzer for WebIDL source text.
//!
//! The lexer converts source text into a vector of [`PositionedToken`]s.
//! Whitespace and comments are discarded. At each position the rules are
//! tried in a fixed order: float literal, integer literal, identifier or
//! keyword, string literal, then punctuation (the `...` ellipsis before
//! single characters).
//!
//! There is no recovery: the first unrecognized input aborts the file.

use log::trace;
use winnow::{
    Parser as _,
    ascii::{digit0, digit1, multispace1},
    combinator::{alt, cut_err, not, opt, peek, preceded, repeat, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location as _, Stream},
    token::{literal, one_of, take_until, take_while},
};

use webidl_core::location::{FileId, Location};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()`. The error span covers
/// `start` up to the position where the error was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    pub code: ErrorCode,
    pub message: &'static str,
    pub help: Option<&'static str>,
    pub start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Decimal exponent: `e`, optional sign, digits.
fn exponent<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    (one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)
        .void()
        .parse_next(input)
}

/// Parse a float literal.
///
/// Accepts `1.`, `.5`, `1.5e3`, `1e3`, `Infinity`, `-Infinity` and `NaN`.
/// The named forms must end on a word boundary so that `Infinityish` stays
/// an identifier.
fn float_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let word_end = peek(not(one_of(is_identifier_char)));
    let decimal = alt((
        (
            alt(((digit1, '.', digit0).void(), (digit0, '.', digit1).void())),
            opt(exponent),
        )
            .void(),
        (digit1, exponent).void(),
    ));
    let named = terminated(literal("Infinity"), word_end).void();

    alt((
        (opt('-'), alt((decimal, named))).take(),
        terminated(literal("NaN"), peek(not(one_of(is_identifier_char)))),
    ))
    .try_map(str::parse::<f64>)
    .map(Token::FloatLiteral)
    .parse_next(input)
}

/// Parse an integer literal.
///
/// A leading `0x`/`0X` selects hex, any other leading zero selects octal,
/// everything else is decimal. The sign is applied after the unsigned digits
/// are parsed in their base.
fn integer_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start = input.current_token_start();

    let (negative, (digits, radix)) = (
        opt('-').map(|sign| sign.is_some()),
        alt((
            preceded(
                ('0', one_of(['x', 'X'])),
                take_while(1.., |c: char| c.is_ascii_hexdigit()),
            )
            .map(|digits| (digits, 16)),
            preceded('0', take_while(0.., |c: char| ('0'..='7').contains(&c)))
                .map(|digits| (digits, 8)),
            (one_of('1'..='9'), digit0)
                .take()
                .map(|digits| (digits, 10)),
        )),
    )
        .parse_next(input)?;

    let magnitude = if digits.is_empty() {
        Some(0)
    } else {
        u64::from_str_radix(digits, radix).ok()
    };
    let value = magnitude
        .map(|m| if negative { -i128::from(m) } else { i128::from(m) })
        .and_then(|v| i64::try_from(v).ok());

    match value {
        Some(value) => Ok(Token::Integer(value)),
        None => Err(ErrMode::Cut(ContextError::new().add_context(
            input,
            &input.checkpoint(),
            LexerDiagnostic {
                code: ErrorCode::E003,
                message: "integer literal out of range",
                help: Some("integer literals must fit in a signed 64-bit value"),
                start,
            },
        ))),
    }
}

/// Parse an identifier, mapping reserved words to their keyword tokens.
fn identifier_or_keyword<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_identifier_char),
    )
        .take()
        .map(|word: &str| Token::keyword(word).unwrap_or(Token::Identifier(word)))
        .parse_next(input)
}

/// Parse a double-quoted string. There are no escape sequences.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start = input.current_token_start();

    '"'.parse_next(input)?;

    cut_err(terminated(take_while(0.., |c| c != '"'), '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"`"),
            start,
        })
        .map(Token::StringLiteral)
        .parse_next(input)
}

/// Parse punctuation, trying the ellipsis before single characters.
fn punctuation<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((
        literal("...").value(Token::Ellipsis),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        '<'.value(Token::LeftAngle),
        '>'.value(Token::RightAngle),
        ','.value(Token::Comma),
        ':'.value(Token::Colon),
        ';'.value(Token::Semicolon),
        '='.value(Token::Equals),
        '?'.value(Token::Question),
        '-'.value(Token::Minus),
        '.'.value(Token::Dot),
    ))
    .parse_next(input)
}

fn line_comment<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    preceded("//", take_while(0.., |c| c != '\n'))
        .void()
        .parse_next(input)
}

fn block_comment<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    let start = input.current_token_start();

    "/*".parse_next(input)?;

    cut_err((take_until(0.., "*/"), "*/"))
        .context(LexerDiagnostic {
            code: ErrorCode::E004,
            message: "unterminated block comment",
            help: Some("add closing `*/`"),
            start,
        })
        .void()
        .parse_next(input)
}

/// Skip any run of whitespace and comments.
fn trivia<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    repeat(
        0..,
        alt((multispace1.void(), line_comment, block_comment)),
    )
    .parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<'a, PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        float_literal,         // Must come before integer and identifier
        integer_literal,       // Must come before `-` punctuation
        identifier_or_keyword, // Keywords are looked up after matching
        string_literal,
        punctuation,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Lexer that accumulates tokens for one source file.
struct Lexer<'a> {
    file: FileId,
    tokens: Vec<PositionedToken<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(file: FileId) -> Self {
        Self {
            file,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the input, stopping at the first error.
    fn tokenize(&mut self, mut input: Input<'a>) -> Result<()> {
        loop {
            trivia(&mut input).map_err(|e| self.convert_err_mode(e, &input))?;
            if input.is_empty() {
                return Ok(());
            }
            let token =
                positioned_token(&mut input).map_err(|e| self.convert_err_mode(e, &input))?;
            trace!(token:% = token.token, offset = token.span.start(); "Lexed token");
            self.tokens.push(token);
        }
    }

    /// Convert an ErrMode to a Diagnostic.
    ///
    /// Uses the first `LexerDiagnostic` context when present and falls back
    /// to E002 (unrecognized input) otherwise.
    fn convert_err_mode(
        &self,
        err: ErrMode<ContextError<LexerDiagnostic>>,
        input: &Input<'a>,
    ) -> Diagnostic {
        let error_pos = input.current_token_start();
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let location = Location::new(self.file, Span::new(*start..error_pos));
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(location, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let location = Location::new(self.file, Span::new(error_pos..error_pos + 1));
        Diagnostic::error("Unrecognized Input")
            .with_code(ErrorCode::E002)
            .with_label(location, ErrorCode::E002.description())
    }
}

/// Tokenize one source file.
///
/// # Errors
///
/// Returns the diagnostic for the first unrecognized or malformed token.
pub fn tokenize(input: &str, file: FileId) -> Result<Vec<PositionedToken<'_>>> {
    let mut lexer = Lexer::new(file);
    lexer.tokenize(LocatingSlice::new(input))?;
    trace!(tokens = lexer.tokens.len(); "Tokenized source");
    Ok(lexer.tokens)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use webidl_core::location::SourceMap;

    use super::*;

    fn file() -> FileId {
        SourceMap::new().add("test.webidl", "")
    }

    fn lex(input: &str) -> Vec<Token<'_>> {
        tokenize(input, file())
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    fn test_single_token(input: &str, expected: Token<'_>) {
        let mut located_input = LocatingSlice::new(input);
        let result = positioned_token(&mut located_input);
        assert!(result.is_ok(), "Failed to parse: {}", input);
        let positioned = result.unwrap();
        assert_eq!(positioned.token, expected);
        assert!(located_input.is_empty(), "Leftover input for: {}", input);
    }

    fn lex_error(input: &str) -> Diagnostic {
        tokenize(input, file()).unwrap_err()
    }

    #[test]
    fn test_keywords() {
        test_single_token("interface", Token::Interface);
        test_single_token("partial", Token::Partial);
        test_single_token("legacycaller", Token::Legacycaller);
        test_single_token("MozMap", Token::MozMap);
        test_single_token("USVString", Token::USVString);
        test_single_token("maplike", Token::Maplike);
        test_single_token("or", Token::Or);
    }

    #[test]
    fn test_identifiers() {
        test_single_token("Node", Token::Identifier("Node"));
        test_single_token("_interface", Token::Identifier("_interface"));
        test_single_token("interfaces", Token::Identifier("interfaces"));
        test_single_token("data-x", Token::Identifier("data-x"));
        test_single_token("Infinityish", Token::Identifier("Infinityish"));
    }

    #[test]
    fn test_integer_bases() {
        test_single_token("42", Token::Integer(42));
        test_single_token("0", Token::Integer(0));
        test_single_token("017", Token::Integer(15));
        test_single_token("0x1F", Token::Integer(31));
        test_single_token("0XfF", Token::Integer(255));
        test_single_token("-10", Token::Integer(-10));
        test_single_token("-010", Token::Integer(-8));
        test_single_token("-0x10", Token::Integer(-16));
    }

    #[test]
    fn test_integer_limits() {
        test_single_token("-9223372036854775808", Token::Integer(i64::MIN));
        test_single_token("0x7fffffffffffffff", Token::Integer(i64::MAX));

        let err = lex_error("const long long x = 9223372036854775808;");
        assert_eq!(err.code(), Some(ErrorCode::E003));
    }

    #[test]
    fn test_octal_stops_at_non_octal_digit() {
        assert_eq!(lex("08"), vec![Token::Integer(0), Token::Integer(8)]);
    }

    #[test]
    fn test_floats() {
        test_single_token("1.5", Token::FloatLiteral(1.5));
        test_single_token("1.", Token::FloatLiteral(1.0));
        test_single_token(".5", Token::FloatLiteral(0.5));
        test_single_token("-2.5e2", Token::FloatLiteral(-250.0));
        test_single_token("3E-1", Token::FloatLiteral(0.3));
        test_single_token("Infinity", Token::FloatLiteral(f64::INFINITY));
        test_single_token("-Infinity", Token::FloatLiteral(f64::NEG_INFINITY));

        let nan = lex("NaN");
        assert!(matches!(nan[0], Token::FloatLiteral(f) if f.is_nan()));
    }

    #[test]
    fn test_strings_have_no_escapes() {
        test_single_token(r#""a\n""#, Token::StringLiteral(r"a\n"));
        test_single_token(r#""""#, Token::StringLiteral(""));
    }

    #[test]
    fn test_punctuation_and_ellipsis() {
        assert_eq!(
            lex("(long... a)"),
            vec![
                Token::LeftParen,
                Token::Long,
                Token::Ellipsis,
                Token::Identifier("a"),
                Token::RightParen,
            ]
        );
        assert_eq!(lex(". -"), vec![Token::Dot, Token::Minus]);
    }

    #[test]
    fn test_comments_and_whitespace_discarded() {
        let tokens = lex("// leading\ninterface /* inline */ A {\r\n};\n/* trailing */");
        assert_eq!(
            tokens,
            vec![
                Token::Interface,
                Token::Identifier("A"),
                Token::LeftBrace,
                Token::RightBrace,
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_token_spans() {
        let tokens = tokenize("enum E {};", file()).unwrap();
        assert_eq!(tokens[0].span, Span::new(0..4));
        assert_eq!(tokens[1].span, Span::new(5..6));
    }

    #[test]
    fn test_unterminated_string() {
        let err = lex_error("enum E { \"a };");
        assert_eq!(err.code(), Some(ErrorCode::E001));
        assert_eq!(
            err.labels()[0].location().span(),
            Some(Span::new(9..14))
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = lex_error("interface A {}; /* never closed");
        assert_eq!(err.code(), Some(ErrorCode::E004));
    }

    #[test]
    fn test_unrecognized_input() {
        let err = lex_error("interface A { # };");
        assert_eq!(err.code(), Some(ErrorCode::E002));
        assert_eq!(err.message(), "Unrecognized Input");
        assert_eq!(
            err.labels()[0].location().span(),
            Some(Span::new(14..15))
        );
    }

    fn format_in_base(value: u64, radix: u32) -> String {
        match radix {
            8 => format!("0{value:o}"),
            16 => format!("0x{value:x}"),
            _ => value.to_string(),
        }
    }

    proptest! {
        #[test]
        fn prop_integer_literal_bases(value in 0u64..=i64::MAX as u64, radix in prop::sample::select(vec![8u32, 10, 16]), negative: bool) {
            let text = format!("{}{}", if negative { "-" } else { "" }, format_in_base(value, radix));
            let expected = if negative { -(value as i64) } else { value as i64 };
            let tokens = lex(&text);
            prop_assert_eq!(tokens, vec![Token::Integer(expected)]);
        }

        #[test]
        fn prop_identifiers_lex_as_one_token(word in "_?[A-Za-z][A-Za-z0-9_-]{0,16}") {
            let tokens = lex(&word);
            prop_assert_eq!(tokens.len(), 1);
            match word.as_str() {
                "Infinity" | "NaN" => prop_assert!(matches!(tokens[0], Token::FloatLiteral(_))),
                _ => match Token::keyword(&word) {
                    Some(keyword) => prop_assert_eq!(tokens[0], keyword),
                    None => prop_assert_eq!(tokens[0], Token::Identifier(&word)),
                },
            }
        }
    }
}
