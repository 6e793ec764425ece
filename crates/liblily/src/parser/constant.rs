//! Module-level constant parsing.
//!
//! ```lily
//! pub constant MaxRetries: i32 = 5;
//! constant Greeting = "hello";
//! ```

use std::fmt::{Display, Formatter};

use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{cut, opt};
use nom::error::context;
use nom::{IResult, Parser};

use crate::ast::{ConstantDefinitionAst, ExpressionAst, FileStatementAst, TypeNameAst};
use crate::nom_tools::{cleanup, NomSpan};

use super::{expected_ident, is_public, LilyParserError};

impl ConstantDefinitionAst<'_> {
    pub fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, FileStatementAst<'_>, LilyParserError<'_>> {
        let (input, is_public) = is_public(input)?;
        let (input, _) = cleanup(tag("constant")).parse(input)?;
        let (input, name) = expected_ident("Missing constant name", input)?;

        let (input, constant_type) = match cleanup(opt(char(':'))).parse(input)? {
            (input, Some(_)) => {
                let (input, constant_type) = context("Missing constant type", cut(TypeNameAst::parse)).parse(input)?;
                (input, Some(constant_type))
            }
            (input, None) => (input, None),
        };

        let (input, _) = context("Missing '='", cut(cleanup(char('=')))).parse(input)?;
        let (input, expression) = context("Missing constant value", cut(ExpressionAst::parse)).parse(input)?;
        let (input, _) = context("Missing ';'", cut(cleanup(char(';')))).parse(input)?;

        Ok((
            input,
            FileStatementAst::Constant(ConstantDefinitionAst {
                is_public: is_public.map(|item| item.into()),
                name: name.into(),
                constant_type,
                expression,
            }.into()),
        ))
    }
}

impl Display for ConstantDefinitionAst<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}constant {}", if self.is_public.is_some() { "pub " } else { "" }, self.name.text)?;
        if let Some(constant_type) = &self.constant_type {
            write!(f, ": {constant_type}")?;
        }
        write!(f, " = {:?};", self.expression)
    }
}
