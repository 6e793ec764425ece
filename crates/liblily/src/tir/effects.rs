//! Effect tracking: `can_raise`/`raises` inference and recursion detection.
//!
//! Mirrors the two-phase resolver's style of deriving derived facts straight from an
//! AST node rather than threading extra mutable state through `resolve()`/`finish()`:
//! [`EffectInfo::compute`] walks a [`FunctionDefinitionAst`] once and produces the
//! flags/`raises` set the rest of the pipeline consults.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::ast::{BodyAst, BodyStatementAst, ExpressionAst, FunctionDefinitionAst, IfConditionAst};

/// Per-function effect facts, keyed by full name in [`super::context::TirContext::effects`].
#[derive(Debug, Clone, Default)]
pub struct EffectInfo {
    pub is_async: bool,
    pub can_raise: bool,
    pub is_recursive: bool,
    /// Error type names this function may propagate to its caller.
    pub raises: HashSet<String>,
}

impl EffectInfo {
    /// Derives effect facts for one function from its declaration and body.
    ///
    /// `can_raise` is true when the function declares a `!ErrorType` annotation, its
    /// body contains a direct `raise`, or it calls another function already known to
    /// raise (via `known_raising`, the set of full names already marked `can_raise` -
    /// callers resolve in declaration order so direct callees are usually already
    /// known; forward references are picked up by a second pass in
    /// [`recompute_recursive`]).
    pub fn compute(ast: &FunctionDefinitionAst<'_>, known_raising: &IndexMap<String, EffectInfo>) -> Self {
        let mut raises = HashSet::new();
        if let Some(raise_type) = &ast.raises {
            raises.insert(raise_type.names.last().map(|s| s.text.to_string()).unwrap_or_default());
        }

        let mut can_raise = ast.raises.is_some();
        let mut called_names = HashSet::new();
        collect_body_effects(&ast.body, &mut can_raise, &mut called_names);

        for called in &called_names {
            if let Some(callee) = known_raising.get(called) {
                if callee.can_raise {
                    can_raise = true;
                    raises.extend(callee.raises.iter().cloned());
                }
            }
        }

        EffectInfo {
            is_async: false,
            can_raise,
            is_recursive: called_names.contains(ast.name.text),
            raises,
        }
    }
}

/// Walks a body collecting whether it raises directly and which functions it calls,
/// the data needed both for `can_raise` propagation and recursion detection.
fn collect_body_effects(body: &BodyAst<'_>, can_raise: &mut bool, called: &mut HashSet<String>) {
    for statement in &body.statements {
        match statement {
            BodyStatementAst::Expression(expr) => collect_expr_effects(expr, can_raise, called),
            BodyStatementAst::FunctionCall(call) => {
                called.insert(call.path.call());
            }
            BodyStatementAst::IfCondition(if_condition) => collect_if_effects(if_condition, can_raise, called),
            BodyStatementAst::VariableDefinition(def) => {
                if let Some(expr) = &def.expression {
                    collect_expr_effects(expr, can_raise, called);
                }
            }
            BodyStatementAst::VariableAssign(assign) => collect_expr_effects(&assign.expression, can_raise, called),
        }
    }
}

fn collect_if_effects(if_condition: &IfConditionAst<'_>, can_raise: &mut bool, called: &mut HashSet<String>) {
    collect_body_effects(&if_condition.true_body, can_raise, called);
    for (_, body) in &if_condition.else_ifs {
        collect_body_effects(body, can_raise, called);
    }
    if let Some(body) = &if_condition.false_body {
        collect_body_effects(body, can_raise, called);
    }
}

fn collect_expr_effects(expr: &ExpressionAst<'_>, can_raise: &mut bool, called: &mut HashSet<String>) {
    match expr {
        ExpressionAst::Raise(inner) => {
            *can_raise = true;
            collect_expr_effects(inner, can_raise, called);
        }
        ExpressionAst::TryCatch(try_catch) => {
            // A caught raise does not escape this function; the inner callee is still
            // marked as raising via `called`, but `can_raise` for the catching function
            // is not flipped just because the try body itself raises.
            let mut inner_can_raise = false;
            collect_expr_effects(&try_catch.expression, &mut inner_can_raise, called);
            collect_body_effects(&try_catch.catch_body, can_raise, called);
        }
        ExpressionAst::FunctionCall(call) => {
            called.insert(call.path.call());
            for arg in &call.arguments {
                collect_expr_effects(arg, can_raise, called);
            }
        }
        ExpressionAst::Operation { left, right, .. } => {
            collect_expr_effects(left, can_raise, called);
            collect_expr_effects(right, can_raise, called);
        }
        ExpressionAst::Unary { expression, .. } => collect_expr_effects(expression, can_raise, called),
        ExpressionAst::Primitive { .. } | ExpressionAst::Ref(_) | ExpressionAst::Ident(_) => {}
    }
}

