//! Expression parsing with operator precedence for the Lily language.
//!
//! This module implements a recursive descent parser for Lily expressions using operator
//! precedence climbing. It handles all expression types including:
//!
//! - Arithmetic operations: `+`, `-`, `*`, `/`, `%`, `**`
//! - Word-form boolean operations: `and`, `or`, unary `not`
//! - Bitwise operations: `&`, `|`, `^`, `<<`, `>>`
//! - Comparison operations: `==`, `not=`, `<`, `>`, `<=`, `>=`
//! - Range (`..`), pipe (`|>`) and list head/tail (`->`, `<-`) operators
//! - Function calls and method invocations
//! - Variable references and field access
//! - Parenthesized expressions
//!
//! # Operator Precedence
//!
//! The parser implements the following precedence levels (highest to lowest):
//! 1. **Primary expressions**: literals, identifiers, parentheses, function calls, unary
//!    prefixes (`not`, `-`, `*` deref, `&`/`&mut` ref, `trace`/`untrace`)
//! 2. **Exponentiation**: `**` (right-associative)
//! 3. **Multiplicative**: `*`, `/`, `%`
//! 4. **Additive**: `+`, `-`
//! 5. **Shift**: `<<`, `>>`
//! 6. **Bitwise AND**: `&`
//! 7. **Bitwise XOR**: `^`
//! 8. **Bitwise OR**: `|`
//! 9. **Range**: `..`
//! 10. **Equality/relational**: `==`, `not=`, `<`, `<=`, `>`, `>=`
//! 11. **Word AND**: `and`
//! 12. **Word OR**: `or`
//! 13. **Pipe**: `|>`
//! 14. **List head/tail**: `->` (lowest, right-associative), `<-`
//!
//! # Architecture
//!
//! The module uses a trait-based approach where each precedence level is implemented
//! as a separate parser struct implementing `LilyExpressionParser`. This provides
//! clean separation of concerns and makes the precedence hierarchy explicit.

use std::fmt::{Display, Formatter};

use nom::{branch::alt, bytes::complete::tag, character::complete::{alphanumeric1, char}, combinator::{cut, not, value}, error::context, multi::many, sequence::{delimited, pair, preceded}, IResult, Parser};

use crate::{ast::{BodyAst, ExpressionAst, ExpressionOperatorType, FunctionCallAst, PrimitiveValue, RefAst, TryCatchAst, UnaryOp}, nom_tools::{cleanup, NomSpan}};

use super::{ident, LilyParserError};

/// Type alias for expression generator functions used in operator parsing
///
/// This function type is used to create binary expression AST nodes from
/// left operand, operator, and right operand.
pub type ControlExpressionGeneratorFn<'base, T> = fn(ExpressionAst<'base>, T, ExpressionAst<'base>) -> ExpressionAst<'base>;

/// Trait for expression parsers at different precedence levels
///
/// Each precedence level implements this trait to provide a uniform
/// interface for parsing expressions at that level.
pub trait LilyExpressionParser {
    /// Parse an expression at this precedence level
    fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>>;
}

// Precedence level parsers (listed from lowest to highest precedence)

/// Parser for list head/tail expressions (`->`, `<-`) - lowest precedence
struct ListHeadTailParser;

/// Parser for pipe expressions (`|>`)
struct PipeParser;

/// Parser for word-form logical OR expressions (`or`)
struct OrParser;

/// Parser for word-form logical AND expressions (`and`)
struct AndParser;

/// Parser for equality/relational expressions (`==`, `not=`, `<`, `<=`, `>`, `>=`)
struct EqualityParser;

/// Parser for range expressions (`..`)
struct RangeParser;

/// Parser for bitwise OR expressions (`|`)
struct BitwiseOrParser;

/// Parser for bitwise XOR expressions (`^`)
struct BitwiseXorParser;

/// Parser for bitwise AND expressions (`&`)
struct BitwiseAndParser;

/// Parser for shift expressions (`<<`, `>>`)
struct BitwiseShiftParser;

/// Parser for additive expressions (`+`, `-`)
struct AddSubParser;

/// Parser for multiplicative expressions (`*`, `/`, `%`)
struct MulDivModParser;

/// Parser for exponentiation expressions (`**`), right-associative, binds
/// tighter than any other binary operator.
struct PowParser;

/// Parser for primary expressions (literals, identifiers, function calls, parentheses,
/// unary prefixes)
struct InnerParser;

impl LilyExpressionParser for PowParser {
    fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        let (input, base) = InnerParser::parse(input)?;
        match cleanup(tag::<_, NomSpan<'_>, LilyParserError<'_>>("**")).parse(input) {
            Ok((input, _)) => {
                let (input, exponent) = context("Expression missing after '**'", cut(Self::parse)).parse(input)?;
                Ok((input, ExpressionAst::expr_builder(base, ExpressionOperatorType::Pow, exponent)))
            }
            Err(_) => Ok((input, base)),
        }
    }
}

impl LilyExpressionParser for MulDivModParser {
    fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        ExpressionAst::value_parser::<'_, PowParser, _, _>(input, alt((
            value(ExpressionOperatorType::Div, char('/')),
            value(ExpressionOperatorType::Mul, (char('*'), not(char('*')))),
            value(ExpressionOperatorType::Mod, char('%')),
        )), ExpressionAst::expr_builder)
    }
}

impl LilyExpressionParser for AddSubParser {
    fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        ExpressionAst::value_parser::<'_, MulDivModParser, _, _>(input, alt((
            value(ExpressionOperatorType::Add, char('+')),
            // Guarded so a trailing `->` (list-head) is left for `ListHeadTailParser`.
            value(ExpressionOperatorType::Sub, (char('-'), not(char('>')))),
        )), ExpressionAst::expr_builder)
    }
}

impl LilyExpressionParser for BitwiseShiftParser {
    fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        ExpressionAst::value_parser::<'_, AddSubParser, _, _>(input, alt((
            value(ExpressionOperatorType::BitwiseShiftRight, tag(">>")),
            value(ExpressionOperatorType::BitwiseShiftLeft, tag("<<")),
        )), ExpressionAst::expr_builder)
    }
}

impl LilyExpressionParser for BitwiseAndParser {
    fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        ExpressionAst::single_parser::<'_, BitwiseShiftParser, _, _>(input, ExpressionOperatorType::LogicalAnd, char('&'), ExpressionAst::expr_builder)
    }
}

impl LilyExpressionParser for BitwiseXorParser {
    fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        ExpressionAst::single_parser::<'_, BitwiseAndParser, _, _>(input, ExpressionOperatorType::Xor, char('^'), ExpressionAst::expr_builder)
    }
}

impl LilyExpressionParser for BitwiseOrParser {
    fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        // Guarded so a trailing `|>` (pipe) is left for `PipeParser`.
        ExpressionAst::single_parser::<'_, BitwiseXorParser, _, _>(input, ExpressionOperatorType::LogicalOr, (char('|'), not(char('>'))), ExpressionAst::expr_builder)
    }
}

impl LilyExpressionParser for RangeParser {
    fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        ExpressionAst::single_parser::<'_, BitwiseOrParser, _, _>(input, ExpressionOperatorType::Range, tag(".."), ExpressionAst::expr_builder)
    }
}

impl LilyExpressionParser for EqualityParser {
    fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        ExpressionAst::value_parser::<'_, RangeParser, _, _>(input, alt((
            value(ExpressionOperatorType::Equal, tag("==")),
            value(ExpressionOperatorType::NotEqual, tag("not=")),
            value(ExpressionOperatorType::LessEqualThan, tag("<=")),
            value(ExpressionOperatorType::GreaterEqualThan, tag(">=")),
            value(ExpressionOperatorType::GreaterThan, char('>')),
            // Guarded so a trailing `<-` (list-tail) is left for `ListHeadTailParser`.
            value(ExpressionOperatorType::LessThan, (char('<'), not(char('-')))),
        )), ExpressionAst::expr_builder)
    }
}

impl LilyExpressionParser for AndParser {
    fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        ExpressionAst::single_parser::<'_, EqualityParser, _, _>(input, ExpressionOperatorType::And, keyword("and"), ExpressionAst::expr_builder)
    }
}

impl LilyExpressionParser for OrParser {
    fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        ExpressionAst::single_parser::<'_, AndParser, _, _>(input, ExpressionOperatorType::Or, keyword("or"), ExpressionAst::expr_builder)
    }
}

impl LilyExpressionParser for PipeParser {
    fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        ExpressionAst::single_parser::<'_, OrParser, _, _>(input, ExpressionOperatorType::Pipe, tag("|>"), ExpressionAst::expr_builder)
    }
}

impl LilyExpressionParser for ListHeadTailParser {
    fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        let (input, left) = PipeParser::parse(input)?;
        match cleanup(alt((
            value(ExpressionOperatorType::ListHead, tag("->")),
            value(ExpressionOperatorType::ListTail, tag("<-")),
        ))).parse(input)
        {
            Ok((input, operator)) => {
                // Right-associative: the tail is itself a list-head/tail expression.
                let (input, right) = context("Expression missing after '->'/'<-'", cut(Self::parse)).parse(input)?;
                Ok((input, ExpressionAst::expr_builder(left, operator, right)))
            }
            Err(_) => Ok((input, left)),
        }
    }
}

impl LilyExpressionParser for InnerParser {
    fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        ExpressionAst::inner(input)
    }
}

/// Matches a bare word keyword (`and`, `or`, `trace`, `untrace`) that must not be a
/// prefix of a longer identifier, e.g. `andy` is not the `and` operator.
fn keyword<'base>(word: &'static str) -> impl Parser<NomSpan<'base>, Output = NomSpan<'base>, Error = LilyParserError<'base>> {
    (tag(word), not(alt((alphanumeric1, tag("_"))))).map(|(matched, _)| matched)
}

impl ExpressionAst<'_> {
    pub fn parse(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        ListHeadTailParser::parse(input)
    }

    fn inner(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        let (input, expression) = cleanup(alt((
            Self::try_catch_expr,
            Self::raise_expr,
            RefAst::parse_for_expression,
            FunctionCallAst::parse_for_expression,
            PrimitiveValue::parse_for_expression,
            Self::unary_not,
            Self::unary_make_ref_mut,
            Self::unary_make_ref,
            Self::unary_deref,
            Self::unary_neg,
            Self::unary_trace,
            Self::unary_untrace,
            Self::ident_for_expression,
            Self::parentheses,
        ))).parse(input)?;

        Ok((input, expression))
    }

    pub fn parentheses(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        let (input, expr) = delimited(char('('), cleanup(Self::parse), char(')')).parse(input)?;
        Ok((input, expr))
    }

    fn unary(input: NomSpan<'_>, op: UnaryOp) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        let (input, expression) = context("Expression missing", cut(Self::inner)).parse(input)?;
        Ok((
            input,
            ExpressionAst::Unary { op, expression: Box::new(expression) },
        ))
    }

    pub fn unary_not(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        let (input, _) = cleanup(keyword("not")).parse(input)?;
        Self::unary(input, UnaryOp::Not)
    }

    pub fn unary_neg(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        let (input, _) = cleanup(char('-')).parse(input)?;
        Self::unary(input, UnaryOp::Neg)
    }

    pub fn unary_deref(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        let (input, _) = cleanup((char('*'), not(char('*')))).parse(input)?;
        Self::unary(input, UnaryOp::Deref)
    }

    pub fn unary_make_ref_mut(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        let (input, _) = cleanup((char('&'), cleanup(keyword("mut")))).parse(input)?;
        Self::unary(input, UnaryOp::MakeRefMut)
    }

    pub fn unary_make_ref(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        let (input, _) = cleanup((char('&'), not(char('&')))).parse(input)?;
        Self::unary(input, UnaryOp::MakeRef)
    }

    pub fn unary_trace(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        let (input, _) = cleanup(keyword("trace")).parse(input)?;
        Self::unary(input, UnaryOp::Trace)
    }

    pub fn unary_untrace(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        let (input, _) = cleanup(keyword("untrace")).parse(input)?;
        Self::unary(input, UnaryOp::Untrace)
    }

    /// `raise <expr>` - constructs a [`crate::ast::ExpressionAst::Raise`].
    pub fn raise_expr(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        let (input, _) = cleanup(keyword("raise")).parse(input)?;
        let (input, expression) = context("Expression missing after 'raise'", cut(Self::parse)).parse(input)?;
        Ok((input, ExpressionAst::Raise(Box::new(expression))))
    }

    /// `try <expr> catch <name> { <body> }` - constructs a
    /// [`crate::ast::ExpressionAst::TryCatch`].
    pub fn try_catch_expr(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst, LilyParserError<'_>> {
        let (input, _) = cleanup(keyword("try")).parse(input)?;
        let (input, expression) = context("Expression missing after 'try'", cut(Self::parse)).parse(input)?;
        let (input, _) = context("Missing 'catch' after 'try' expression", cut(cleanup(keyword("catch")))).parse(input)?;
        let (input, catch_name) = context("Missing catch binding name", cut(cleanup(ident()))).parse(input)?;
        let (input, catch_body) = context("Missing catch body", cut(BodyAst::parse)).parse(input)?;
        Ok((
            input,
            ExpressionAst::TryCatch(Box::new(TryCatchAst {
                expression,
                catch_name: catch_name.into(),
                catch_body,
            })),
        ))
    }

    fn ident_for_expression(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ExpressionAst<'_>, LilyParserError<'_>> {
        let (input, ident) = ident().parse(input)?;
        Ok((
            input,
            ExpressionAst::Ident(ident.into()),
        ))
    }

    pub fn expr_builder<'base>(left: ExpressionAst<'base>, operator: ExpressionOperatorType, right: ExpressionAst<'base>) -> ExpressionAst<'base> {
        ExpressionAst::Operation {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    #[allow(private_bounds)]
    pub fn single_parser<'base, P: LilyExpressionParser, T: Copy, F: Parser<NomSpan<'base>, Error = LilyParserError<'base>>>(input: NomSpan<'base>, val: T, parser: F, expr_func: ControlExpressionGeneratorFn<'base, T>) -> IResult<NomSpan<'base>, ExpressionAst<'base>, LilyParserError<'base>> {
        let (input, initial) = P::parse(input)?;
        let (input, remainder): (NomSpan<'_>, Vec<ExpressionAst<'_>>) = many(0.., preceded(parser, P::parse)).parse(input)?;
        Ok((input, Self::single_fold_exprs::<T>(initial, val, remainder, expr_func)))
    }

    #[allow(private_bounds)]
    pub fn value_parser<'base, P: LilyExpressionParser, T: Copy, F: Parser<NomSpan<'base>, Error = LilyParserError<'base>>>(input: NomSpan<'base>, parser: F, expr_func: ControlExpressionGeneratorFn<'base, T>) -> IResult<NomSpan<'base>, ExpressionAst<'base>, LilyParserError<'base>>
        where Vec<(T, ExpressionAst<'base>)>: Extend<(<F as Parser<NomSpan<'base>>>::Output, ExpressionAst<'base>)>
    {
        let (input, initial) = P::parse(input)?;
        let (input, remainder): (NomSpan<'_>, Vec<(T, ExpressionAst<'_>)>) = many(0.., pair(parser, P::parse)).parse(input)?;
        Ok((input, Self::value_fold_exprs::<T>(initial, remainder, expr_func)))
    }

    pub fn single_fold_exprs<'base, T: Copy>(initial: ExpressionAst<'base>, operator: T, remainder: Vec<ExpressionAst<'base>>, expr_func: ControlExpressionGeneratorFn<'base, T>) -> ExpressionAst<'base> {
        remainder.into_iter().fold(initial, |left, right| {
          expr_func(left, operator, right)
        })
    }

    pub fn value_fold_exprs<'base, T: Copy>(initial: ExpressionAst<'base>, remainder: Vec<(T, ExpressionAst<'base>)>, expr_func: ControlExpressionGeneratorFn<'base, T>) -> ExpressionAst<'base> {
        remainder.into_iter().fold(initial, |left, (operator, right)| {
          expr_func(left, operator, right)
        })
    }
}

impl Display for ExpressionAst<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpressionAst::Primitive { value, .. } => write!(f, "{value}"),
            ExpressionAst::Ident(ident) => write!(f, "{ident}"),
            ExpressionAst::FunctionCall(function_call) => write!(f, "{function_call}"),
            ExpressionAst::Operation { left, operator, right } => {
                write!(f, "({left} {operator} {right})")
            },
            ExpressionAst::Ref(ref_expr) => {
                write!(f, "{ref_expr}")
            },
            ExpressionAst::Unary { op, expression } => {
                write!(f, "{op}{expression}")
            },
            ExpressionAst::Raise(expression) => {
                write!(f, "raise {expression}")
            },
            ExpressionAst::TryCatch(try_catch) => {
                write!(f, "try {} catch {} {{ {} }}", try_catch.expression, try_catch.catch_name, try_catch.catch_body)
            },
        }
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "not "),
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Deref => write!(f, "*"),
            UnaryOp::MakeRef => write!(f, "&"),
            UnaryOp::MakeRefMut => write!(f, "&mut "),
            UnaryOp::Trace => write!(f, "trace "),
            UnaryOp::Untrace => write!(f, "untrace "),
        }
    }
}

impl Display for ExpressionOperatorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpressionOperatorType::Pow => write!(f, "**"),
            ExpressionOperatorType::Add => write!(f, "+"),
            ExpressionOperatorType::Sub => write!(f, "-"),
            ExpressionOperatorType::Mul => write!(f, "*"),
            ExpressionOperatorType::Div => write!(f, "/"),
            ExpressionOperatorType::Mod => write!(f, "%"),
            ExpressionOperatorType::And => write!(f, "and"),
            ExpressionOperatorType::Or => write!(f, "or"),
            ExpressionOperatorType::Equal => write!(f, "=="),
            ExpressionOperatorType::NotEqual => write!(f, "not="),
            ExpressionOperatorType::LessThan => write!(f, "<"),
            ExpressionOperatorType::GreaterThan => write!(f, ">"),
            ExpressionOperatorType::GreaterEqualThan => write!(f, ">="),
            ExpressionOperatorType::LessEqualThan => write!(f, "<="),
            ExpressionOperatorType::Xor => write!(f, "^"),
            ExpressionOperatorType::LogicalOr => write!(f, "|"),
            ExpressionOperatorType::LogicalAnd => write!(f, "&"),
            ExpressionOperatorType::BitwiseShiftLeft => write!(f, "<<"),
            ExpressionOperatorType::BitwiseShiftRight => write!(f, ">>"),
            ExpressionOperatorType::Range => write!(f, ".."),
            ExpressionOperatorType::Pipe => write!(f, "|>"),
            ExpressionOperatorType::ListHead => write!(f, "->"),
            ExpressionOperatorType::ListTail => write!(f, "<-"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::{ast::ExpressionAst, file::SourceFile, nom_tools::{NomSpan, State}};

    #[rstest]
    #[case("1", "1")]
    #[case("1-2", "(1 - 2)")]
    #[case("1+2", "(1 + 2)")]
    #[case("(1+2)", "(1 + 2)")]
    #[case("    1 / 2  ", "(1 / 2)")]
    #[case("    1 / 2  ", "(1 / 2)")]
    #[case("    call(1,2,3) / 2  ", "(call(1, 2, 3) / 2)")]
    #[case("  \r\n\t  1 \r\n\t/\r\n\t 2  \r\n\t", "(1 / 2)")]
    #[case("2*2/ 2 * 22 - 2 - ( 5 - 1) + 3", "((((((2 * 2) / 2) * 22) - 2) - (5 - 1)) + 3)")]
    fn binary_test<'base>(#[case] code: &'base str, #[case] expected: &'base str) {
        let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());

        let state = State {
            file: source_file.clone(),
        indexer: Default::default(),
    };

        let input = NomSpan::new_extra(source_file.code().as_str(), state);
        let (_, response) = ExpressionAst::parse(input).unwrap();
        assert_eq!(response.to_string(), expected, "{code}");
    }

    #[rstest]
    #[case("not 1", "not 1")]
    #[case("not 1 and 10", "(not 1 and 10)")]
    #[case("not call(10)", "not call(10)")]
    #[case("not call(10) - 20", "(not call(10) - 20)")]
    #[case("-5", "-5")]
    #[case("-5 + 1", "(-5 + 1)")]
    fn unary_test<'base>(#[case] code: &'base str, #[case] expected: &'base str) {
        let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());

        let state = State {
            file: source_file.clone(),
            indexer: Default::default(),
        };

        let input = NomSpan::new_extra(source_file.code().as_str(), state);
        let (_, response) = ExpressionAst::parse(input).unwrap();
        assert_eq!(response.to_string(), expected, "{code}");
    }

    #[rstest]
    #[case("1 - 10 == 20", "((1 - 10) == 20)")]
    #[case("1 - 10 == 20 * 4", "((1 - 10) == (20 * 4))")]
    #[case("1 - 10 == 20 * 4 >> 2", "((1 - 10) == ((20 * 4) >> 2))")]
    #[case("1 - 10 == 20 * 4 << 2", "((1 - 10) == ((20 * 4) << 2))")]
    #[case("20 and 10 | 30", "(20 and (10 | 30))")]
    #[case("20 or 10 & 30", "(20 or (10 & 30))")]
    #[case("20 % 10 == 10 or 30 > 20", "(((20 % 10) == 10) or (30 > 20))")]
    #[case("20 % 10 not= 10 or 30 >= 20", "(((20 % 10) not= 10) or (30 >= 20))")]
    #[case("20 % 10 not= 10 or 30 < 20", "(((20 % 10) not= 10) or (30 < 20))")]
    #[case("20 % 10 not= 10 or 30 <= 20", "(((20 % 10) not= 10) or (30 <= 20))")]
    #[case("20 ^ 10 | 30", "(20 ^ (10 | 30))")]
    #[case("1 .. 10", "(1 .. 10)")]
    #[case("a |> b |> c", "((a |> b) |> c)")]
    #[case("a -> b -> c", "(a -> (b -> c))")]
    #[case("a <- b", "(a <- b)")]
    fn general_test<'base>(#[case] code: &'base str, #[case] expected: &'base str) {
        let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());

        let state = State {
            file: source_file.clone(),
            indexer: Default::default(),
        };

        let input = NomSpan::new_extra(source_file.code().as_str(), state);
        let (_, response) = ExpressionAst::parse(input).unwrap();
        assert_eq!(response.to_string(), expected, "{code}");
    }
}
