//! Type-alias parsing.
//!
//! ```lily
//! pub type UserId = i64;
//! ```

use std::fmt::{Display, Formatter};

use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::cut;
use nom::error::context;
use nom::{IResult, Parser};

use crate::ast::{AliasDefinitionAst, FileStatementAst, TypeNameAst};
use crate::nom_tools::{cleanup, NomSpan};

use super::{expected_ident, is_public, LilyParserError};

impl AliasDefinitionAst<'_> {
    pub fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, FileStatementAst<'_>, LilyParserError<'_>> {
        let (input, is_public) = is_public(input)?;
        let (input, _) = cleanup(tag("type")).parse(input)?;
        let (input, name) = expected_ident("Missing alias name", input)?;
        let (input, _) = context("Missing '='", cut(cleanup(char('=')))).parse(input)?;
        let (input, target) = context("Missing aliased type", cut(TypeNameAst::parse)).parse(input)?;
        let (input, _) = context("Missing ';'", cut(cleanup(char(';')))).parse(input)?;

        Ok((
            input,
            FileStatementAst::Alias(AliasDefinitionAst {
                is_public: is_public.map(|item| item.into()),
                name: name.into(),
                target,
            }.into()),
        ))
    }
}

impl Display for AliasDefinitionAst<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}type {} = {};", if self.is_public.is_some() { "pub " } else { "" }, self.name.text, self.target)
    }
}
