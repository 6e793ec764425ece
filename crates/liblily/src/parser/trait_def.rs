//! Trait definition parsing.
//!
//! ```lily
//! trait Drawable {
//!     fun draw(this): void;
//! }
//!
//! trait ColoredShape: Drawable {
//!     color: string;
//!     fun area(this): f64;
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

use crate::ast::{AstIndex, FieldAst, FunctionArgumentAst, TraitDefinitionAst, TraitDefinitionFieldAst, TraitMethodDefinitionAst, TypeNameAst};
use crate::{ast::FileStatementAst, nom_tools::{cleanup, NomSpan}};

use super::{expected_ident, LilyParserError};

impl TraitDefinitionAst<'_> {
    /// Parses a trait: keyword, name, optional base-trait list, body.
    pub fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, FileStatementAst<'_>, LilyParserError<'_>> {
        let (input, _) = cleanup(tag("trait")).parse(input)?;
        let (input, name) = expected_ident("Missing trait name", input)?;

        let (input, base_traits) = match cleanup(opt(char(':'))).parse(input)? {
            (input, Some(_)) => {
                let (input, base_traits) = context("Missing base trait", cut(separated_list1(tag(","), TypeNameAst::parse))).parse(input)?;
                (input, base_traits)
            }
            (input, None) => (input, vec![]),
        };

        let (input, _) = context("Trait's opening '{' missing", cut(peek(cleanup(char('{'))))).parse(input)?;
        let (input, fields) = delimited(
            char('{'),
            cleanup(many0(alt((
                TraitMethodDefinitionAst::parse,
                FieldAst::parse_trait_field,
            )))),
            context("Trait's closing '}' missing", cut(char('}'))),
        )
        .parse(input)?;
        let index = AstIndex(input.extra.indexer.fetch_add(1, std::sync::atomic::Ordering::Relaxed));

        Ok((
            input,
            FileStatementAst::Trait(TraitDefinitionAst {
                name: name.into(),
                fields,
                base_traits,
                index,
            }.into()),
        ))
    }
}

impl Display for TraitDefinitionAst<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "trait {}", self.name.text)?;

        if !self.base_traits.is_empty() {
            write!(f, ": ")?;
            for (index, base_trait) in self.base_traits.iter().enumerate() {
                write!(f, "{base_trait}")?;
                if index < self.base_traits.len() - 1 {
                    write!(f, ", ")?;
                }
            }
        }

        write!(f, " {{")?;
        for field in self.fields.iter() {
            match field {
                TraitDefinitionFieldAst::Method(method) => write!(f, "{method}")?,
                TraitDefinitionFieldAst::Field(field) => write!(f, "{field}")?,
            }
        }
        write!(f, "}}")
    }
}

impl TraitMethodDefinitionAst<'_> {
    /// Parses a trait method signature (no body, terminated by `;`).
    pub fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, TraitDefinitionFieldAst<'_>, LilyParserError<'_>> {
        let (input, _) = cleanup(tag("fun")).parse(input)?;
        let (input, name) = expected_ident("Missing function name", input)?;
        let (input, _) = context("Missing '('", cut(peek(cleanup(char('('))))).parse(input)?;
        let (input, arguments) =
            map(delimited(char('('), cleanup(separated_list0(char(','), FunctionArgumentAst::parse)), context("Missing ')'", cut(char(')')))), |items| items)
                .parse(input)?;

        let (input, _) = context("Missing ':'", cleanup(opt(char(':')))).parse(input)?;
        let (input, return_type) = context("Missing function return type", cut(cleanup(cleanup(TypeNameAst::parse)))).parse(input)?;
        let (input, _) = cleanup(char(';')).parse(input)?;

        Ok((
            input,
            TraitDefinitionFieldAst::Method(TraitMethodDefinitionAst {
                name: name.into(),
                arguments,
                return_type,
            }),
        ))
    }
}

impl Display for TraitMethodDefinitionAst<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "fun {}(", self.name.text)?;
        for (index, arg) in self.arguments.iter().enumerate() {
            write!(f, "{arg}")?;
            if index < self.arguments.len() - 1 {
                write!(f, ", ")?;
            }
        }
        write!(f, "): {};", self.return_type)
    }
}
