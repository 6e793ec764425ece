//! Field declaration parsing, shared by object, trait and impl bodies.

use std::fmt::{Display, Formatter};

use nom::character::complete::char;
use nom::sequence::terminated;
use nom::{IResult, Parser};
use nom_language::error::{VerboseError, VerboseErrorKind};

use crate::ast::{FieldAst, ImplDefinitionFieldAst, ObjectDefinitionFieldAst, TraitDefinitionFieldAst, TypeNameAst};
use crate::nom_tools::{cleanup, NomSpan};

use super::{ident, is_public, LilyParserError};

impl FieldAst<'_> {
    pub fn parse_field(input: NomSpan<'_>) -> IResult<NomSpan<'_>, (Option<NomSpan<'_>>, FieldAst<'_>), LilyParserError<'_>> {
        let (input, (is_public, name, field_type, _)) =
            (is_public, cleanup(terminated(ident(), cleanup(char(':')))), cleanup(TypeNameAst::parse), cleanup(char(';'))).parse(input)?;

        let original_is_public = is_public.clone();
        Ok((
            input,
            (original_is_public, FieldAst {
                is_public: is_public.map(|item| item.into()),
                name: name.into(),
                field_type,
            },
        )))
    }

    pub fn parse_object_field(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ObjectDefinitionFieldAst<'_>, LilyParserError<'_>> {
        let (input, (_, field)) = Self::parse_field(input)?;
        Ok((input, ObjectDefinitionFieldAst::Field(field)))
    }

    pub fn parse_trait_field(input: NomSpan<'_>) -> IResult<NomSpan<'_>, TraitDefinitionFieldAst<'_>, LilyParserError<'_>> {
        let (input, (_, field)) = Self::parse_field(input)?;
        Ok((input, TraitDefinitionFieldAst::Field(field)))
    }

    pub fn parse_impl_field(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ImplDefinitionFieldAst<'_>, LilyParserError<'_>> {
        let (input, (is_public, field)) = Self::parse_field(input)?;
        if let Some(is_public) = is_public {
            let error = VerboseError {
                errors: vec![(is_public, VerboseErrorKind::Context("All impl fields are already public"))],
            };
            return Err(nom::Err::Failure(error));
        }

        Ok((input, ImplDefinitionFieldAst::Field(field)))
    }
}

impl Display for FieldAst<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}: {};",
            match self.is_public {
                Some(_) => "pub ",
                None => "",
            },
            self.name.text,
            self.field_type
        )
    }
}
