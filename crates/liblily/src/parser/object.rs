//! Object definition parsing: `class`, `record`, `enum`, `enum object` and
//! `record object`.
//!
//! ```lily
//! class Person {
//!     name: string;
//!     pub age: i32;
//!
//!     fun greeting(this): string {
//!         return this.name;
//!     }
//! }
//!
//! enum Color { Red, Green, Blue }
//!
//! enum object Shape {
//!     Circle(f64),
//!     Rectangle(f64, f64),
//! }
//! ```

use std::fmt::{Display, Formatter};

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{cut, map, opt, peek};
use nom::error::context;
use nom::multi::{many0, separated_list0, separated_list1};
use nom::{IResult, Parser, sequence::delimited};

use crate::ast::{AstIndex, FieldAst, FunctionDefinitionAst, ObjectDefinitionAst, ObjectDefinitionFieldAst, ObjectKind, TypeNameAst, VariantAst};
use crate::{ast::FileStatementAst, nom_tools::{cleanup, NomSpan}};

use super::{expected_ident, is_public, LilyParserError};

fn object_kind(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ObjectKind, LilyParserError<'_>> {
    alt((
        map(cleanup((tag("enum"), cleanup(tag("object")))), |_| ObjectKind::EnumObject),
        map(cleanup((tag("record"), cleanup(tag("object")))), |_| ObjectKind::RecordObject),
        map(cleanup(tag("class")), |_| ObjectKind::Class),
        map(cleanup(tag("record")), |_| ObjectKind::Record),
        map(cleanup(tag("enum")), |_| ObjectKind::Enum),
    ))
    .parse(input)
}

fn variant(input: NomSpan<'_>) -> IResult<NomSpan<'_>, VariantAst<'_>, LilyParserError<'_>> {
    let (input, name) = expected_ident("Missing variant name", input)?;
    let (input, payload) = opt(delimited(
        cleanup(char('(')),
        cleanup(separated_list0(char(','), TypeNameAst::parse)),
        context("Missing ')'", cut(char(')'))),
    ))
    .parse(input)?;

    Ok((
        input,
        VariantAst {
            name: name.into(),
            payload: payload.unwrap_or_default(),
        },
    ))
}

impl ObjectDefinitionAst<'_> {
    /// Parses a complete object definition: visibility, kind keyword, name
    /// and a body appropriate to that kind (fields/methods for
    /// class/record, variants for enum/enum-object/record-object).
    pub fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, FileStatementAst<'_>, LilyParserError<'_>> {
        let (input, is_public) = is_public(input)?;
        let (input, kind) = object_kind(input)?;
        let (input, name) = expected_ident("Missing object name", input)?;
        let (input, _) = context("Object's opening '{' missing", cut(peek(cleanup(char('{'))))).parse(input)?;

        let is_variant_kind = matches!(kind, ObjectKind::Enum | ObjectKind::EnumObject | ObjectKind::RecordObject);

        let (input, (fields, variants)) = if is_variant_kind {
            let (input, variants) = delimited(
                char('{'),
                cleanup(separated_list0(char(','), variant)),
                context("Object's closing '}' missing", cut(preceded_trailing_comma)),
            )
            .parse(input)?;
            (input, (vec![], variants))
        } else {
            let (input, fields) = delimited(
                char('{'),
                cleanup(many0(alt((
                    |input| FunctionDefinitionAst::parse_object_function(input, name.clone()),
                    FieldAst::parse_object_field,
                )))),
                context("Object's closing '}' missing", cut(char('}'))),
            )
            .parse(input)?;
            (input, (fields, vec![]))
        };

        let index = AstIndex(input.extra.indexer.fetch_add(1, std::sync::atomic::Ordering::Relaxed));

        Ok((
            input,
            FileStatementAst::Object(ObjectDefinitionAst {
                kind,
                is_public: is_public.map(|item| item.into()),
                name: name.into(),
                fields,
                variants,
                index,
            }.into()),
        ))
    }
}

fn preceded_trailing_comma(input: NomSpan<'_>) -> IResult<NomSpan<'_>, NomSpan<'_>, LilyParserError<'_>> {
    let (input, _) = cleanup(opt(char(','))).parse(input)?;
    cleanup(char('}')).parse(input)
}

impl Display for ObjectDefinitionAst<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{} {} {{",
            if self.is_public.is_some() { "pub " } else { "" },
            self.kind.keyword(),
            self.name.text
        )?;
        for field in self.fields.iter() {
            write!(f, "{field}")?;
        }
        for (index, variant) in self.variants.iter().enumerate() {
            write!(f, "{}", variant.name.text)?;
            if !variant.payload.is_empty() {
                write!(f, "(")?;
                for (p_index, payload) in variant.payload.iter().enumerate() {
                    write!(f, "{payload}")?;
                    if p_index < variant.payload.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, ")")?;
            }
            if index < self.variants.len() - 1 {
                write!(f, ", ")?;
            }
        }
        write!(f, "}}")
    }
}

impl Display for ObjectDefinitionFieldAst<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectDefinitionFieldAst::Field(field) => write!(f, "{field}"),
            ObjectDefinitionFieldAst::Method(function) => write!(f, "{function}"),
        }
    }
}
