//! Function call resolution for the Lily TIR system.
//!
//! Resolves a [`FunctionCallAst`] path (`this.foo.bar(...)` or `foo.bar(...)`) against the
//! current scope, one path segment at a time, using [`GetItem::get_item_location`] to walk
//! from variables into object fields and function arguments. The last location reached must
//! name a function, whose argument count and types are then checked against the call site.

use std::ops::Range;

use liblily_macros::LilyError;
use liblily_macros_core::SourceCode;
use strum_macros::{EnumDiscriminants, EnumProperty};

use crate::{
    ast::{BodyStatementAst, ExpressionAst, FunctionCallAst},
    nom_tools::{SpanInfo, ToRange},
    tir::{
        context::TirContext,
        object_signature::{GetItem, TypeValue},
        resolver::function::find_object_location,
        scope::ScopeLocation,
        TirError,
    },
};

use super::{super::ResolverError, try_resolve_primitive, TypeLocation};

impl<'base> BodyStatementAst<'base> {
    pub(super) fn resolve_function_call(context: &mut TirContext<'base>, scope_location: ScopeLocation, function_call: &FunctionCallAst<'base>) -> Result<TypeLocation, TirError> {
        simplelog::debug!("Resolving function call: <u><b>{}</b></u>", function_call.path.call());

        let path = function_call.path.get_path();

        let mut callee_location = if function_call.path.is_this() {
            match find_object_location(context, scope_location) {
                Some(location) => location,
                None => return Err(FunctionCallError::not_callable(function_call.call_span.clone().into())),
            }
        } else {
            let first = path.first().expect("function call path is never empty");
            let scope = context.get_scope(scope_location).expect("Scope not found, it is a bug");
            match scope.get_variable(context, first) {
                Some(variable) => variable.location,
                None => return Err(TirError::type_not_found(context, first.text.to_string(), first.to_range(), first.state.file.clone())),
            }
        };

        let remaining = if function_call.path.is_this() { &path[..] } else { &path[1..] };
        for segment in remaining {
            let signature = context.types.get_from_location(callee_location).unwrap_or_else(|| panic!("Type location not found, it is a bug"));
            callee_location = match signature.value.get_item_location(context, segment.text) {
                Some(location) => location,
                None => return Err(TirError::type_not_found(context, segment.text.to_string(), segment.to_range(), segment.state.file.clone())),
            };
        }

        let callee_signature = context.types.get_from_location(callee_location).unwrap_or_else(|| panic!("Type location not found, it is a bug"));
        let callee = match &callee_signature.value {
            TypeValue::Function(function) => function.as_ref().clone(),
            _ => return Err(FunctionCallError::not_callable(function_call.call_span.clone().into())),
        };

        if callee.arguments.len() != function_call.arguments.len() {
            return Err(FunctionCallError::argument_count_mismatch(callee.arguments.len(), function_call.arguments.len(), function_call.arguments_span.clone().into()));
        }

        for (index, argument) in function_call.arguments.iter().enumerate() {
            let expected_location = callee.arguments[index].field_type;

            let actual_location = match argument {
                ExpressionAst::FunctionCall(inner_call) => Self::resolve_function_call(context, scope_location, inner_call)?,
                ExpressionAst::Primitive { span, value } => try_resolve_primitive(context, value, span)?,
                ExpressionAst::Ident(name) => {
                    let scope = context.get_scope(scope_location).expect("Scope not found, it is a bug");
                    match scope.get_variable(context, name) {
                        Some(variable) => variable.location,
                        None => return Err(TirError::type_not_found(context, name.text.to_string(), name.to_range(), name.state.file.clone())),
                    }
                },
                _ => return Err(FunctionCallError::unsupported_argument(function_call.arguments_span.clone().into())),
            };

            let expected = context.types.get_from_location(expected_location).unwrap_or_else(|| panic!("Type location not found, it is a bug")).value.clone();
            let actual = context.types.get_from_location(actual_location).unwrap_or_else(|| panic!("Type location not found, it is a bug")).value.clone();

            if !expected.is_same_type(context, &actual) {
                return Err(TirError::types_do_not_match(function_call.arguments_span.to_range(), function_call.arguments_span.state.file.clone()));
            }
        }

        Ok(callee_location)
    }
}

#[derive(Clone, Debug, LilyError, thiserror::Error)]
#[error("Value is not callable")]
pub struct NotCallable {
    #[label("this does not resolve to a function")]
    pub position: Range<usize>,

    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, LilyError, thiserror::Error)]
#[error("Function call argument count mismatch, expected {expected}, got {found}")]
pub struct ArgumentCountMismatch {
    pub expected: usize,
    pub found: usize,

    #[label("called with the wrong number of arguments")]
    pub position: Range<usize>,

    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, LilyError, thiserror::Error)]
#[error("Unsupported function call argument")]
pub struct UnsupportedArgument {
    #[label("this expression cannot be used as a function argument yet")]
    pub position: Range<usize>,

    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, LilyError, thiserror::Error, EnumDiscriminants, EnumProperty)]
pub enum FunctionCallError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    NotCallable(Box<NotCallable>),

    #[error(transparent)]
    #[diagnostic(transparent)]
    ArgumentCountMismatch(Box<ArgumentCountMismatch>),

    #[error(transparent)]
    #[diagnostic(transparent)]
    UnsupportedArgument(Box<UnsupportedArgument>),
}

impl From<FunctionCallError> for TirError {
    fn from(value: FunctionCallError) -> Self {
        ResolverError::FunctionCall(Box::new(value)).into()
    }
}

impl FunctionCallError {
    pub fn not_callable(span: SpanInfo) -> TirError {
        FunctionCallError::NotCallable(NotCallable {
            position: span.position.clone(),
            code: span.file.clone().into(),
        }.into()).into()
    }

    pub fn argument_count_mismatch(expected: usize, found: usize, span: SpanInfo) -> TirError {
        FunctionCallError::ArgumentCountMismatch(ArgumentCountMismatch {
            expected,
            found,
            position: span.position.clone(),
            code: span.file.clone().into(),
        }.into()).into()
    }

    pub fn unsupported_argument(span: SpanInfo) -> TirError {
        FunctionCallError::UnsupportedArgument(UnsupportedArgument {
            position: span.position.clone(),
            code: span.file.clone().into(),
        }.into()).into()
    }
}
