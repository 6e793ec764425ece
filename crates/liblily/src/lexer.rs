//! Token stream producer for the Lily language compiler.
//!
//! This module is an internal convenience sitting ahead of the preparser: it turns raw
//! source text into a flat, located token stream using the same nom/`nom_locate`
//! combinators and `State`/`NomSpan`/`Span` location-tracking idiom the parser itself
//! uses. It is not a hand-off boundary between separately maintained stages - the
//! preparser and parser are free to keep working directly off source text - but gives
//! both a shared, already-classified view of keywords, operators and literals where
//! that is more convenient than re-deriving it from raw characters.

use std::fmt::Display;

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1},
    combinator::{map, opt, recognize, value},
    multi::many0,
    sequence::{delimited, pair},
    IResult, Parser,
};
use strum_macros::EnumIs;

use crate::nom_tools::{NomSpan, Span, State};

/// The classification of a single lexeme.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs)]
pub enum TokenKind {
    Identifier,
    Integer,
    Float,
    StringLiteral,
    Keyword(Keyword),
    Punctuation(Punctuation),
    Eof,
}

/// Reserved words recognized by the lexer. Every keyword the parser matches with
/// `tag(...)` inside `cleanup(...)` has a matching variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Fun,
    Class,
    Object,
    Record,
    Enum,
    Trait,
    Impl,
    Use,
    As,
    Pub,
    Var,
    Ref,
    This,
    If,
    Else,
    For,
    Const,
    Constant,
    Error,
    Type,
    True,
    False,
}

impl Keyword {
    const ALL: &'static [(&'static str, Keyword)] = &[
        ("fun", Keyword::Fun),
        ("class", Keyword::Class),
        ("object", Keyword::Object),
        ("record", Keyword::Record),
        ("enum", Keyword::Enum),
        ("trait", Keyword::Trait),
        ("impl", Keyword::Impl),
        ("use", Keyword::Use),
        ("as", Keyword::As),
        ("pub", Keyword::Pub),
        ("var", Keyword::Var),
        ("ref", Keyword::Ref),
        ("this", Keyword::This),
        ("if", Keyword::If),
        ("else", Keyword::Else),
        ("for", Keyword::For),
        ("const", Keyword::Const),
        ("constant", Keyword::Constant),
        ("error", Keyword::Error),
        ("type", Keyword::Type),
        ("true", Keyword::True),
        ("false", Keyword::False),
    ];

    fn from_ident(text: &str) -> Option<Keyword> {
        Self::ALL.iter().find(|(lexeme, _)| *lexeme == text).map(|(_, kw)| *kw)
    }
}

/// Multi- and single-character punctuation and operator tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuation {
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    DoubleColon,
    Semicolon,
    Dot,
    Question,
    Underscore,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Bang,
    BangEq,
    Eq,
    EqEq,
    Lt,
    LtEq,
    LtLt,
    Gt,
    GtEq,
    GtGt,
}

impl Punctuation {
    /// Ordered longest-match-first so `==` is never split into `=`, `=`.
    const ALL: &'static [(&'static str, Punctuation)] = &[
        ("<<", Punctuation::LtLt),
        (">>", Punctuation::GtGt),
        ("::", Punctuation::DoubleColon),
        ("&&", Punctuation::AmpAmp),
        ("||", Punctuation::PipePipe),
        ("==", Punctuation::EqEq),
        ("!=", Punctuation::BangEq),
        ("<=", Punctuation::LtEq),
        (">=", Punctuation::GtEq),
        ("(", Punctuation::LParen),
        (")", Punctuation::RParen),
        ("{", Punctuation::LBrace),
        ("}", Punctuation::RBrace),
        ("[", Punctuation::LBracket),
        ("]", Punctuation::RBracket),
        (",", Punctuation::Comma),
        (":", Punctuation::Colon),
        (";", Punctuation::Semicolon),
        (".", Punctuation::Dot),
        ("?", Punctuation::Question),
        ("_", Punctuation::Underscore),
        ("+", Punctuation::Plus),
        ("-", Punctuation::Minus),
        ("*", Punctuation::Star),
        ("/", Punctuation::Slash),
        ("%", Punctuation::Percent),
        ("^", Punctuation::Caret),
        ("&", Punctuation::Amp),
        ("|", Punctuation::Pipe),
        ("!", Punctuation::Bang),
        ("=", Punctuation::Eq),
        ("<", Punctuation::Lt),
        (">", Punctuation::Gt),
    ];
}

impl Display for Punctuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (lexeme, _) = Punctuation::ALL.iter().find(|(_, p)| p == self).expect("every Punctuation variant is listed in ALL");
        f.write_str(lexeme)
    }
}

/// A single located lexeme.
#[derive(Debug, Clone)]
pub struct Token<'base> {
    pub kind: TokenKind,
    pub span: Span<'base>,
}

impl<'base> Token<'base> {
    pub fn lexeme(&self) -> &'base str {
        self.span.text
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.span.text)
    }
}

fn skip_trivia(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ()> {
    let line_comment = recognize(pair(tag("//"), opt(is_not("\n\r"))));
    let block_comment = recognize((tag("/*"), many0(alt((is_not("*"), recognize(pair(char('*'), is_not("/")))))), opt(tag("*/"))));

    map(many0(alt((value((), multispace1), value((), line_comment), value((), block_comment)))), |_| ()).parse(input)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn lex_identifier_or_keyword(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Token<'_>> {
    let (rest, text) = recognize(pair(take_while1(is_ident_start), take_while(is_ident_continue))).parse(input)?;
    let span: Span<'_> = text.into();

    let kind = match Keyword::from_ident(span.text) {
        Some(keyword) => TokenKind::Keyword(keyword),
        None => TokenKind::Identifier,
    };

    Ok((rest, Token { kind, span }))
}

fn lex_number(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Token<'_>> {
    let (rest, text) = recognize(pair(digit1, opt(pair(char('.'), digit1)))).parse(input)?;
    let span: Span<'_> = text.into();
    let kind = if span.text.contains('.') { TokenKind::Float } else { TokenKind::Integer };
    Ok((rest, Token { kind, span }))
}

fn lex_string(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Token<'_>> {
    let (rest, text) = recognize(delimited(char('"'), many0(alt((is_not("\"\\"), recognize(pair(char('\\'), nom::character::complete::anychar))))), char('"'))).parse(input)?;
    Ok((rest, Token { kind: TokenKind::StringLiteral, span: text.into() }))
}

fn lex_punctuation(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Token<'_>> {
    for (lexeme, punctuation) in Punctuation::ALL {
        if let Ok((rest, text)) = tag::<_, NomSpan<'_>, ()>(*lexeme)(input.clone()) {
            return Ok((rest, Token { kind: TokenKind::Punctuation(*punctuation), span: text.into() }));
        }
    }

    Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)))
}

fn lex_one(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Token<'_>> {
    alt((lex_string, lex_identifier_or_keyword, lex_number, lex_punctuation)).parse(input)
}

/// Tokenizes an entire source file, skipping whitespace and comments.
///
/// The returned stream always ends with a single `TokenKind::Eof` token whose span is
/// empty and positioned at the end of the input, so downstream consumers (preparser,
/// precompiler) can peek one token past the end without bounds-checking every call.
pub fn tokenize<'base>(state: &'base State) -> Result<Vec<Token<'base>>, crate::tir::TirError> {
    let mut input: NomSpan<'_> = NomSpan::new_extra(state.file.code().as_str(), state.clone());
    let mut tokens = Vec::new();

    loop {
        let (rest, ()) = skip_trivia(input).map_err(|_| crate::tir::TirError::lexer_error(state.file.clone(), 0..state.file.code.len()))?;
        input = rest;

        if input.fragment().is_empty() {
            break;
        }

        match lex_one(input) {
            Ok((rest, token)) => {
                input = rest;
                tokens.push(token);
            }
            Err(_) => {
                let offset = input.location_offset();
                return Err(crate::tir::TirError::lexer_error(state.file.clone(), offset..offset + 1));
            }
        }
    }

    let eof_offset = state.file.code.len();
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span { text: "", position: eof_offset..eof_offset, state: state.clone() },
    });

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::SourceFile;

    fn kinds(tokens: &[Token<'_>]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind.clone()).collect()
    }

    #[test]
    fn tokenizes_function_definition() {
        let state = State::new(SourceFile::new(vec!["source".into()], "fun test(a: i32): i32 {}".to_string()));
        let tokens = tokenize(&state).unwrap();

        assert_eq!(tokens.first().unwrap().kind, TokenKind::Keyword(Keyword::Fun));
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Identifier && t.lexeme() == "test"));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Punctuation(Punctuation::LBrace)));
    }

    #[test]
    fn skips_line_and_block_comments() {
        let state = State::new(SourceFile::new(vec!["source".into()], "// a comment\nvar /* inline */ a = 1;".to_string()));
        let tokens = tokenize(&state).unwrap();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme()).collect();

        assert_eq!(lexemes, vec!["var", "a", "=", "1", ";", ""]);
    }

    #[test]
    fn recognizes_multi_char_operators_longest_match_first() {
        let state = State::new(SourceFile::new(vec!["source".into()], "a == b && c != d".to_string()));
        let tokens = tokenize(&state).unwrap();

        assert!(kinds(&tokens).contains(&TokenKind::Punctuation(Punctuation::EqEq)));
        assert!(kinds(&tokens).contains(&TokenKind::Punctuation(Punctuation::AmpAmp)));
        assert!(kinds(&tokens).contains(&TokenKind::Punctuation(Punctuation::BangEq)));
    }

    #[test]
    fn lexes_string_literals_with_escapes() {
        let state = State::new(SourceFile::new(vec!["source".into()], r#""hello \"world\"""#.to_string()));
        let tokens = tokenize(&state).unwrap();

        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].lexeme(), r#""hello \"world\"""#);
    }

    #[test]
    fn lexes_integer_and_float_literals() {
        let state = State::new(SourceFile::new(vec!["source".into()], "42 3.14".to_string()));
        let tokens = tokenize(&state).unwrap();

        assert_eq!(tokens[0].kind, TokenKind::Integer);
        assert_eq!(tokens[1].kind, TokenKind::Float);
    }

    #[test]
    fn reports_error_on_unrecognized_character() {
        let state = State::new(SourceFile::new(vec!["source".into()], "var a = `".to_string()));
        assert!(tokenize(&state).is_err());
    }
}
