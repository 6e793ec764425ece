//! Lily language parser implementation using nom combinators.
//!
//! Transforms an expanded declaration-shell token span into `ast.rs` nodes,
//! handling:
//!
//! - Import statements (`use`)
//! - Object definitions (`class`, `record`, `enum`, `enum object`, `record object`)
//! - Trait definitions and trait implementations (`trait`, `impl … for …`)
//! - Functions and methods (`fun`)
//! - Constants, error sets and type aliases (`constant`, `error`, `type`)
//! - Expressions, with full operator-precedence climbing
//!
//! # Architecture
//!
//! - [`expression`] - expression parsing with operator precedence
//! - [`primitive`] - literal parsing (strings, numbers, booleans)
//! - [`object`], [`trait_def`], [`impl_def`] - declaration-level constructs
//! - [`function_definition`], [`function_call`] - function handling
//! - [`variable`], [`field`] - variable and field declarations
//! - [`constant`], [`error_def`], [`alias`] - remaining top-level declarations
//! - [`type_info`], [`ref_info`] - type-system support
//! - [`if_condition`], [`body`] - control flow and blocks
//! - [`module_use`] - import handling
//! - [`splited_path`] - qualified path handling
//!
//! The entry point is [`parse`], which takes a [`State`] and returns a [`FileAst`].

use nom::bytes::complete::{tag, take_until};
use nom::character::complete::{alpha1, alphanumeric1, char};
use nom::combinator::{cut, map, opt, recognize};
use nom::sequence::{pair, preceded, terminated};
use nom::Err;
use nom::branch::alt;
use nom::error::context;
use nom::multi::{many0, many0_count};
use nom::{IResult, Parser};
use nom_language::error::{VerboseError, VerboseErrorKind};

use crate::ast::{AliasDefinitionAst, ConstantDefinitionAst, ErrorDefinitionAst, FileAst, FunctionDefinitionAst, ImplDefinitionAst, ObjectDefinitionAst, TraitDefinitionAst, UseAst};
use crate::nom_tools::{NomSpan, State, cleanup};

pub mod alias;
mod body;
pub mod constant;
mod error_def;
mod expression;
mod field;
mod file;
mod function_definition;
mod function_call;
mod if_condition;
mod impl_def;
mod module_use;
mod object;
mod primitive;
mod ref_info;
mod trait_def;
mod type_info;
mod variable;
pub mod splited_path;

/// Type alias for parser errors with rich context information
pub type LilyParserError<'base> = VerboseError<NomSpan<'base>>;

/// Parses a complete Lily source file into an Abstract Syntax Tree.
///
/// # Errors
/// Returns a `LilyParserError` if unknown syntax is encountered, required
/// elements (braces, semicolons, return types, ...) are missing, or a
/// construct is malformed.
pub fn parse<'base>(state: &'base State) -> IResult<NomSpan<'base>, FileAst<'base>, LilyParserError<'base>> {
    let file = state.file.clone();
    let extra = state.clone();

    let input = NomSpan::new_extra(state.file.code().as_str(), extra);
    let (remaining, statements) =
        many0(alt((
            cleanup(UseAst::parse_for_file),
            cleanup(ObjectDefinitionAst::parse),
            cleanup(TraitDefinitionAst::parse),
            cleanup(ImplDefinitionAst::parse),
            cleanup(FunctionDefinitionAst::parse_for_file),
            cleanup(ConstantDefinitionAst::parse),
            cleanup(ErrorDefinitionAst::parse),
            cleanup(AliasDefinitionAst::parse),
        )))
        .parse(input)?;

    if remaining.len() > 0 {
        let error = VerboseError {
            errors: vec![(remaining, VerboseErrorKind::Context("Unknown syntax"))],
        };
        return Err(Err::Failure(error));
    }

    Ok((
        remaining,
        FileAst {
            file,
            statements,
        },
    ))
}

/// Parses block comments in the form `/* ... */`
#[allow(warnings)]
pub fn comment<'base>(input: NomSpan<'base>) -> IResult<NomSpan<'base>, NomSpan<'base>, LilyParserError<'base>> {
    preceded(char('/'), alt((preceded(char('*'), cut(terminated(take_until("*/"), tag("*/")))),))).parse(input)
}

/// Parses the optional `pub` visibility modifier.
pub fn is_public(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Option<NomSpan<'_>>, LilyParserError<'_>> {
    cleanup(opt(tag("pub"))).parse(input)
}

/// Parses the optional `?` nullable type modifier.
pub fn is_nullable(input: NomSpan<'_>) -> IResult<NomSpan<'_>, bool, LilyParserError<'_>> {
    cleanup(map(opt(char('?')), |item| item.is_some())).parse(input)
}

/// Parses the optional `&` reference type modifier.
pub fn is_reference(input: NomSpan<'_>) -> IResult<NomSpan<'_>, bool, LilyParserError<'_>> {
    cleanup(map(opt(char('&')), |item| item.is_some())).parse(input)
}

/// Parses an identifier, with a custom error message on failure.
pub fn expected_ident<'base>(message: &'static str, input: NomSpan<'base>) -> IResult<NomSpan<'base>, NomSpan<'base>, LilyParserError<'base>> {
    context(message, cut(ident())).parse(input)
}

/// Parses a valid Lily identifier: an alphabetic character or underscore,
/// followed by any number of alphanumeric characters or underscores.
pub fn ident<'base>() -> impl Parser<NomSpan<'base>, Output = NomSpan<'base>, Error = LilyParserError<'base>> {
    cleanup(recognize(pair(alt((alpha1, tag("_"))), many0_count(alt((alphanumeric1, tag("_")))))))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::vec;

    use rstest::rstest;

    use crate::{
        ast::{PrimitiveValue, TypeNameAst},
        file::SourceFile, nom_tools::State, parser::primitive::{number, string},
    };

    use super::NomSpan;

    #[rstest]
    #[case(r#""hello""#, PrimitiveValue::String("hello".into()))]
    #[case(r#""hello\nworld""#, PrimitiveValue::String("hello\nworld".into()))]
    #[case(r#""hello\tworld""#, PrimitiveValue::String("hello\tworld".into()))]
    #[case(r#""hello\\world""#, PrimitiveValue::String("hello\\world".into()))]
    #[case(r#""hello\"world""#, PrimitiveValue::String("hello\"world".into()))]
    #[case(r#""hello/world""#, PrimitiveValue::String("hello/world".into()))]
    fn string_test<'base>(#[case] code: &'base str, #[case] expected: PrimitiveValue) {
        let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());

        let state = State {
            file: source_file.clone(),
            indexer: Default::default(),
        };

        let input = NomSpan::new_extra(code, state);
        let (_, string) = string(input).unwrap();

        assert_eq!(string, expected, "Parsed string does not match expected");
    }

    #[rstest]
    #[case("true", PrimitiveValue::Bool(true))]
    #[case("false", PrimitiveValue::Bool(false))]
    fn boolean_test<'base>(#[case] code: &'base str, #[case] expected: PrimitiveValue) {
        let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());

        let state = State {
            file: source_file.clone(),
            indexer: Default::default(),
        };

        let input = NomSpan::new_extra(code, state);
        let (_, (_, boolean)) = PrimitiveValue::parse(input).unwrap();

        assert_eq!(boolean, expected, "Parsed boolean does not match expected");
    }

    #[rstest]
    #[case("123", PrimitiveValue::I8(123))]
    #[case("-123", PrimitiveValue::I8(-123))]
    #[case("255", PrimitiveValue::U8(255))]
    #[case("32767", PrimitiveValue::I16(32767))]
    #[case("65535", PrimitiveValue::U16(65535))]
    #[case("2147483647", PrimitiveValue::I32(2147483647))]
    #[case("4294967295", PrimitiveValue::U32(4294967295))]
    #[case("9223372036854775807", PrimitiveValue::I64(9223372036854775807))]
    #[case("18446744073709551615", PrimitiveValue::U64(18446744073709551615))]
    fn integer_test<'base>(#[case] code: &'base str, #[case] expected: PrimitiveValue) {
        let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());

        let state = State {
            file: source_file.clone(),
            indexer: Default::default(),
        };

        let input = NomSpan::new_extra(code, state);
        let (_, number) = number(input).unwrap();

        assert_eq!(number, expected, "Parsed integer does not match expected");
    }

    #[rstest]
    #[case("string", false, vec!["string"])]
    #[case(" string ", false, vec!["string"])]
    #[case("string.base", false, vec!["string", "base"])]
    #[case("string.base . test", false, vec!["string", "base", "test"])]
    #[case(" string   .        base        . test", false, vec!["string", "base", "test"])]
    #[case(" ? string   .        base        . test", true, vec!["string", "base", "test"])]
    #[case("?string", true, vec!["string"])]
    fn parse_type_name_test<'base>(#[case] code: &'base str, #[case] nullable: bool, #[case] expected: Vec<&str>) {
        let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());

        let state = State {
            file: source_file.clone(),
            indexer: Default::default(),
        };

        let input = NomSpan::new_extra(code, state);
        let result = TypeNameAst::parse(input);
        assert!(result.is_ok(), "Failed to parse type name: {:?}", result.err());
        let (_, parsed) = result.unwrap();

        assert_eq!(parsed.nullable, nullable, "nullable info does not match expected");

        let parsed: Vec<_> = parsed.names.into_iter().map(|s| s.text.to_string()).collect();
        assert_eq!(parsed, expected, "Parsed type name does not match expected");
    }

    #[rstest]
    #[case("1.2", 1.2, 1)]
    #[case("2.2", 2.2, 1)]
    #[case("2.20000000000000", 2.2, 14)]
    #[case("1.23", 1.23, 2)]
    #[case("1024.0", 1024.0, 1)]
    #[case("-1024.0", -1024.0, 1)]
    #[case("1.0e-7", 1.0e-7, 1)]
    #[case("123456789.0e+7", 1234567890000000.0, 1)]
    fn float_test<'base>(#[case] code: &'base str, #[case] expected: f64, #[case] dot_place: u8) {
        let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());

        let state = State {
            file: source_file.clone(),
            indexer: Default::default(),
        };

        let input = NomSpan::new_extra(code, state);
        let (_, number) = number(input).unwrap();

        assert_eq!(number, PrimitiveValue::Float(expected, dot_place), "Parsed type name does not match expected");
    }

    #[rstest]
    #[case("1.7976931348623157E+300", 1797693134862315647938267463293564874600617718166104931943772918675666340832537361829116717802808644459281636809871223917508254623303542508952824391223228755068260245991425339269180741930617451225745000201898803634683406373476746438518757597828943183163861984879702567874510145974570799930947550576640.0000000000000000, 16)]
    fn double_test<'base>(#[case] code: &'base str, #[case] expected: f64, #[case] dot_place: u8) {
        let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());

        let state = State {
            file: source_file.clone(),
            indexer: Default::default(),
        };

        let input = NomSpan::new_extra(code, state);
        let (_, number) = number(input).unwrap();

        assert_eq!(number, PrimitiveValue::Double(expected, dot_place), "Parsed type name does not match expected");
    }
}
