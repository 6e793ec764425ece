//! Function (and method) definition parsing.
//!
//! ```lily
//! fun privateFunction(): void { }
//! pub fun publicFunction(arg: i32): string { }
//!
//! class MyClass {
//!     fun method(this): void { }
//! }
//!
//! impl Drawable for MyClass {
//!     fun draw(this): void { }
//! }
//! ```

use std::fmt::{Display, Formatter};

use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{consumed, cut, map, opt, peek};
use nom::error::context;
use nom::multi::separated_list0;
use nom::sequence::terminated;
use nom::{IResult, Parser, sequence::delimited};
use nom_language::error::{VerboseError, VerboseErrorKind};

use crate::ast::{
    AstIndex, BodyAst, FileStatementAst, FunctionArgumentAst, FunctionDefinitionAst, FunctionDefinitionLocationAst, ImplDefinitionFieldAst, ObjectDefinitionFieldAst, TypeNameAst,
};
use crate::nom_tools::{NomSpan, cleanup};
use crate::parser::{expected_ident, ident, is_public};

use super::LilyParserError;

impl<'base> FunctionDefinitionAst<'base> {
    /// Parses a standalone, file/module-level function.
    pub fn parse_for_file(input: NomSpan<'base>) -> IResult<NomSpan<'base>, FileStatementAst<'base>, LilyParserError<'base>> {
        let (input, (_, function)) = Self::parse(input)?;
        Ok((input, FileStatementAst::Function(function.into())))
    }

    /// Parses a method definition inside an object body, tagging it with the
    /// enclosing object's name.
    pub fn parse_object_function(input: NomSpan<'base>, object_name: NomSpan<'base>) -> IResult<NomSpan<'base>, ObjectDefinitionFieldAst<'base>, LilyParserError<'base>> {
        let (input, (_, mut function)) = Self::parse(input)?;
        function.location = FunctionDefinitionLocationAst::Object(object_name.into()).into();
        Ok((input, ObjectDefinitionFieldAst::Method(function)))
    }

    /// Parses a method provided by a trait implementation. Impl methods are
    /// implicitly public, so an explicit `pub` is rejected.
    pub fn parse_impl_function(input: NomSpan<'base>, target_name: NomSpan<'base>) -> IResult<NomSpan<'base>, ImplDefinitionFieldAst<'base>, LilyParserError<'base>> {
        let (input, (is_public, mut function)) = Self::parse(input)?;
        if let Some(is_public) = is_public {
            let error = VerboseError {
                errors: vec![(is_public, VerboseErrorKind::Context("All impl methods are already public"))],
            };
            return Err(nom::Err::Failure(error));
        }
        function.location = FunctionDefinitionLocationAst::Impl(target_name.into()).into();
        Ok((input, ImplDefinitionFieldAst::Method(function)))
    }

    /// Core function-definition parser: visibility, `fun` keyword, name,
    /// parameters, return type and body.
    pub fn parse(
        input: NomSpan<'base>,
    ) -> IResult<NomSpan<'base>, (Option<NomSpan<'base>>, FunctionDefinitionAst<'base>), LilyParserError<'base>> {
        let (input, is_public) = is_public(input)?;
        let (input, _) = cleanup(tag("fun")).parse(input)?;
        let (input, name) = expected_ident("Missing function name", input)?;
        let (input, generics) = opt(delimited(
            cleanup(char('[')),
            cleanup(separated_list0(char(','), cleanup(ident()))),
            cleanup(char(']')),
        )).parse(input)?;
        let (input, _) = context("Missing '('", cut(peek(cleanup(char('('))))).parse(input)?;
        let (input, (arguments_span, arguments)) =
            consumed(map(delimited(char('('), cleanup(separated_list0(char(','), FunctionArgumentAst::parse)), context("Missing ')'", cut(char(')')))), |items| {
                items
            }))
            .parse(input)?;

        let (input, _) = context("Missing ':'", cleanup(opt(char(':')))).parse(input)?;
        let (input, return_type) = context("Missing function return type", cut(cleanup(cleanup(TypeNameAst::parse)))).parse(input)?;
        let (input, raises) = opt(preceded_raises).parse(input)?;

        let (input, body) = BodyAst::parse(input)?;
        let index = AstIndex(input.extra.indexer.fetch_add(1, std::sync::atomic::Ordering::Relaxed));
        let original_is_public = is_public.clone();

        Ok((
            input,
            (original_is_public, FunctionDefinitionAst {
                is_public: is_public.map(|item| item.into()),
                name: name.into(),
                generics: generics.unwrap_or_default().into_iter().map(|span: NomSpan<'base>| span.into()).collect(),
                arguments,
                arguments_span: arguments_span.into(),
                body: body.into(),
                return_type,
                raises,
                location: FunctionDefinitionLocationAst::Module.into(),
                index
            },
        )))
    }
}

/// Parses the optional `!ErrorType` raise-effect annotation following a return type.
fn preceded_raises(input: NomSpan<'_>) -> IResult<NomSpan<'_>, TypeNameAst<'_>, LilyParserError<'_>> {
    let (input, _) = cleanup(char('!')).parse(input)?;
    context("Missing raised error type after '!'", cut(cleanup(TypeNameAst::parse))).parse(input)
}

impl Display for FunctionDefinitionAst<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}fun {}", if self.is_public.is_some() { "pub " } else { "" }, self.name.text)?;
        if !self.generics.is_empty() {
            write!(f, "[{}]", self.generics.iter().map(|g| g.text).collect::<Vec<_>>().join(", "))?;
        }
        write!(f, "(")?;
        for (index, arg) in self.arguments.iter().enumerate() {
            write!(f, "{arg}")?;
            if index < self.arguments.len() - 1 {
                write!(f, ", ")?;
            }
        }
        write!(f, "): {}", self.return_type)?;
        if let Some(raises) = &self.raises {
            write!(f, "!{raises}")?;
        }
        write!(f, " {}", self.body)
    }
}

impl FunctionArgumentAst<'_> {
    /// Parses a single parameter: either the special `this` receiver, or a
    /// named, typed argument.
    pub fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, FunctionArgumentAst<'_>, LilyParserError<'_>> {
        let (input, this) = cleanup(opt(tag("this"))).parse(input)?;

        if let Some(this) = this {
            return Ok((input, FunctionArgumentAst::This(this.into())));
        }

        let (input, (name, field_type)) = (cleanup(terminated(ident(), cleanup(char(':')))), cleanup(TypeNameAst::parse)).parse(input)?;
        Ok((
            input,
            FunctionArgumentAst::Argument {
                name: name.into(),
                field_type,
            },
        ))
    }
}

impl Display for FunctionArgumentAst<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionArgumentAst::This(_) => write!(f, "this"),
            FunctionArgumentAst::Argument { name, field_type } => write!(f, "{}: {}", name.text, field_type),
        }
    }
}
