//! Token definitions for WebIDL source text.

use std::fmt;

use winnow::stream::Location;

use crate::span::Span;

/// Token types for WebIDL
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'src> {
    // Definition keywords
    Module,
    Interface,
    Partial,
    Dictionary,
    Exception,
    Enum,
    Callback,
    Typedef,
    Implements,

    // Member keywords
    Const,
    Attribute,
    Readonly,
    Inherit,
    Static,
    Getter,
    Setter,
    Creator,
    Deleter,
    Legacycaller,
    Stringifier,
    Jsonifier,
    Optional,
    Required,
    Maplike,
    Setlike,

    // Value keywords
    Null,
    True,
    False,

    // Type keywords
    Unrestricted,
    Date,
    DOMString,
    ByteString,
    USVString,
    Any,
    Boolean,
    Byte,
    Double,
    Float,
    Long,
    Object,
    Octet,
    Promise,
    Sequence,
    MozMap,
    Short,
    Unsigned,
    Void,
    Or,

    // Literals
    Integer(i64),
    FloatLiteral(f64),
    StringLiteral(&'src str),
    Identifier(&'src str),

    // Punctuation
    LeftParen,    // (
    RightParen,   // )
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    LeftAngle,    // <
    RightAngle,   // >
    Comma,        // ,
    Colon,        // :
    Semicolon,    // ;
    Equals,       // =
    Question,     // ?
    Minus,        // -
    Dot,          // .
    Ellipsis,     // ...
}

/// Reserved words and the tokens they map to.
const KEYWORDS: &[(&str, Token<'static>)] = &[
    ("module", Token::Module),
    ("interface", Token::Interface),
    ("partial", Token::Partial),
    ("dictionary", Token::Dictionary),
    ("exception", Token::Exception),
    ("enum", Token::Enum),
    ("callback", Token::Callback),
    ("typedef", Token::Typedef),
    ("implements", Token::Implements),
    ("const", Token::Const),
    ("null", Token::Null),
    ("true", Token::True),
    ("false", Token::False),
    ("stringifier", Token::Stringifier),
    ("jsonifier", Token::Jsonifier),
    ("unrestricted", Token::Unrestricted),
    ("attribute", Token::Attribute),
    ("readonly", Token::Readonly),
    ("inherit", Token::Inherit),
    ("static", Token::Static),
    ("getter", Token::Getter),
    ("setter", Token::Setter),
    ("creator", Token::Creator),
    ("deleter", Token::Deleter),
    ("legacycaller", Token::Legacycaller),
    ("optional", Token::Optional),
    ("Date", Token::Date),
    ("DOMString", Token::DOMString),
    ("ByteString", Token::ByteString),
    ("USVString", Token::USVString),
    ("any", Token::Any),
    ("boolean", Token::Boolean),
    ("byte", Token::Byte),
    ("double", Token::Double),
    ("float", Token::Float),
    ("long", Token::Long),
    ("object", Token::Object),
    ("octet", Token::Octet),
    ("Promise", Token::Promise),
    ("required", Token::Required),
    ("sequence", Token::Sequence),
    ("MozMap", Token::MozMap),
    ("short", Token::Short),
    ("unsigned", Token::Unsigned),
    ("void", Token::Void),
    ("or", Token::Or),
    ("maplike", Token::Maplike),
    ("setlike", Token::Setlike),
];

impl<'src> Token<'src> {
    /// Look up the keyword token for `word`, if it is reserved.
    pub fn keyword(word: &str) -> Option<Token<'static>> {
        KEYWORDS
            .iter()
            .find(|(text, _)| *text == word)
            .map(|(_, token)| *token)
    }

    /// The source text of a keyword token.
    pub fn keyword_text(&self) -> Option<&'static str> {
        KEYWORDS
            .iter()
            .find(|(_, token)| token == self)
            .map(|(text, _)| *text)
    }
}

/// A token with position information for winnow integration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl<'src> From<(Token<'src>, Span)> for PositionedToken<'src> {
    fn from((token, span): (Token<'src>, Span)) -> Self {
        Self::new(token, span)
    }
}

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl Location for PositionedToken<'_> {
    fn previous_token_end(&self) -> usize {
        self.span.start()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.keyword_text() {
            return f.write_str(text);
        }
        match self {
            Token::Integer(n) => write!(f, "{n}"),
            Token::FloatLiteral(n) => write!(f, "{n}"),
            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::Identifier(name) => write!(f, "{name}"),

            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::LeftAngle => write!(f, "<"),
            Token::RightAngle => write!(f, ">"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Semicolon => write!(f, ";"),
            Token::Equals => write!(f, "="),
            Token::Question => write!(f, "?"),
            Token::Minus => write!(f, "-"),
            Token::Dot => write!(f, "."),
            Token::Ellipsis => write!(f, "..."),
            _ => Ok(()),
        }
    }
}
