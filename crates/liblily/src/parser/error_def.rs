//! Error-set parsing.
//!
//! ```lily
//! error IoError {
//!     NotFound,
//!     PermissionDenied(string),
//! }
//! ```

use std::fmt::{Display, Formatter};

use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{cut, opt, peek};
use nom::error::context;
use nom::multi::separated_list0;
use nom::{IResult, Parser, sequence::delimited};

use crate::ast::{ErrorDefinitionAst, FileStatementAst, TypeNameAst, VariantAst};
use crate::nom_tools::{cleanup, NomSpan};

use super::{expected_ident, is_public, LilyParserError};

fn variant(input: NomSpan<'_>) -> IResult<NomSpan<'_>, VariantAst<'_>, LilyParserError<'_>> {
    let (input, name) = expected_ident("Missing error variant name", input)?;
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

impl ErrorDefinitionAst<'_> {
    pub fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, FileStatementAst<'_>, LilyParserError<'_>> {
        let (input, is_public) = is_public(input)?;
        let (input, _) = cleanup(tag("error")).parse(input)?;
        let (input, name) = expected_ident("Missing error set name", input)?;
        let (input, _) = context("Error's opening '{' missing", cut(peek(cleanup(char('{'))))).parse(input)?;

        let (input, variants) = delimited(
            char('{'),
            cleanup(separated_list0(char(','), variant)),
            context("Error's closing '}' missing", cut(trailing_close)),
        )
        .parse(input)?;

        Ok((
            input,
            FileStatementAst::Error(ErrorDefinitionAst {
                is_public: is_public.map(|item| item.into()),
                name: name.into(),
                variants,
            }.into()),
        ))
    }
}

fn trailing_close(input: NomSpan<'_>) -> IResult<NomSpan<'_>, NomSpan<'_>, LilyParserError<'_>> {
    let (input, _) = cleanup(opt(char(','))).parse(input)?;
    cleanup(char('}')).parse(input)
}

impl Display for ErrorDefinitionAst<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}error {} {{", if self.is_public.is_some() { "pub " } else { "" }, self.name.text)?;
        for (index, variant) in self.variants.iter().enumerate() {
            write!(f, "{}", variant.name.text)?;
            if index < self.variants.len() - 1 {
                write!(f, ", ")?;
            }
        }
        write!(f, "}}")
    }
}
