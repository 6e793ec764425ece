//! Trait implementation parsing.
//!
//! ```lily
//! impl Drawable for Person {
//!     fun draw(this): void { }
//! }
//!
//! impl Drawable, Serializable for Point {
//!     color: string;
//!     fun draw(this): void { }
//!     fun serialize(this): string { }
//! }
//! ```

use std::fmt::{Display, Formatter};

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{cut, peek};
use nom::error::context;
use nom::multi::{many0, separated_list1};
use nom::{IResult, Parser, sequence::delimited};

use crate::ast::{FieldAst, FunctionDefinitionAst, ImplDefinitionAst, ImplDefinitionFieldAst, TypeNameAst};
use crate::{ast::FileStatementAst, nom_tools::{cleanup, NomSpan}};

use super::{expected_ident, LilyParserError};

impl ImplDefinitionAst<'_> {
    /// Parses `impl <Trait>[, <Trait>]* for <Type> { ... }`.
    pub fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, FileStatementAst<'_>, LilyParserError<'_>> {
        let (input, _) = cleanup(tag("impl")).parse(input)?;
        let (input, target_traits) = context("Missing trait name(s)", cut(separated_list1(tag(","), TypeNameAst::parse))).parse(input)?;
        let (input, _) = context("Missing 'for'", cut(cleanup(tag("for")))).parse(input)?;
        let (input, name) = expected_ident("Missing implementing type name", input)?;

        let (input, _) = context("Impl's opening '{' missing", cut(peek(cleanup(char('{'))))).parse(input)?;
        let (input, fields) = delimited(
            char('{'),
            cleanup(many0(alt((
                |input| FunctionDefinitionAst::parse_impl_function(input, name.clone()),
                FieldAst::parse_impl_field,
            )))),
            context("Impl's closing '}' missing", cut(char('}'))),
        )
        .parse(input)?;

        let target = TypeNameAst {
            reference: false,
            nullable: false,
            names: vec![name.clone().into()],
            names_span: name.into(),
        };

        Ok((
            input,
            FileStatementAst::Impl(ImplDefinitionAst {
                target,
                target_traits,
                fields,
            }.into()),
        ))
    }
}

impl Display for ImplDefinitionAst<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "impl ")?;
        for (index, target_trait) in self.target_traits.iter().enumerate() {
            write!(f, "{target_trait}")?;
            if index < self.target_traits.len() - 1 {
                write!(f, ", ")?;
            }
        }
        write!(f, " for {}", self.target.names.first().unwrap().text)?;

        write!(f, " {{")?;
        for field in self.fields.iter() {
            match field {
                ImplDefinitionFieldAst::Method(method) => write!(f, "{method}")?,
                ImplDefinitionFieldAst::Field(field) => write!(f, "{field}")?,
            }
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use nom::Finish;
    use nom_language::error::VerboseErrorKind;
    use rstest::rstest;

    use crate::{file::SourceFile, nom_tools::State};

    #[rstest]
    #[case("impl a for Myclass {}", "impl a for Myclass {}")]
    #[case("    impl     a,b   for Myclass \r\n\t{} ", "impl a, b for Myclass {}")]
    #[case("impl a for ___MyType___ {}", "impl a for ___MyType___ {}")]
    #[case("impl a for Myclass { a: string; }", "impl a for Myclass {a: string;}")]
    #[case("impl a for Myclass { fun init(): MyType {} }", "impl a for Myclass {fun init(): MyType {}}")]
    fn impl_test<'base>(#[case] code: &'base str, #[case] expected: &'base str) {
        let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());

        let state = State {
            file: source_file.clone(),
            indexer: Default::default(),
        };

        let (_, response) = crate::parser::parse(&state).finish().unwrap();
        assert_eq!(response.statements[0].to_string(), expected, "{code}");
    }

    #[rstest]
    #[case("impl a for Myclass { pub a: string; }", "All impl fields are already public")]
    #[case("impl a for Myclass { pub fun init(): MyType {} }", "All impl methods are already public")]
    fn already_public<'base>(#[case] code: &'base str, #[case] expected: &'base str) {
        let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());

        let state = State {
            file: source_file.clone(),
            indexer: Default::default(),
        };

        let error = crate::parser::parse(&state).finish().unwrap_err();
        if let VerboseErrorKind::Context(ctx) = error.errors[0].1 {
            assert_eq!(ctx, expected, "{code}");
        } else {
            panic!("Expected an error, but got: {error:?}");
        }
    }
}
