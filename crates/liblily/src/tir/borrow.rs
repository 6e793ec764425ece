//! Move/borrow validation over a function body.
//!
//! Lily passes non-reference arguments by value (a move); passing the same local
//! again afterwards is a [`crate::tir::TirError::UseAfterMove`]. Taking a `&`/`&mut`
//! reference to a name that is not itself bound by a `let`/`var` in an enclosing
//! scope - a bare temporary - is a [`crate::tir::TirError::BorrowOfTemporary`].

use std::cell::Cell;
use std::collections::HashMap;

use crate::ast::{BodyAst, BodyStatementAst, ExpressionAst, FunctionCallAst, IfConditionAst, UnaryOp};
use crate::file::SourceFile;
use crate::nom_tools::ToRange;
use crate::tir::TirError;

/// Per-local move state tracked across one function body's statements.
#[derive(Debug, Default)]
struct MoveState<'base> {
    moved: HashMap<&'base str, Cell<bool>>,
    bound: HashMap<&'base str, ()>,
}

impl<'base> MoveState<'base> {
    fn bind(&mut self, name: &'base str) {
        self.bound.insert(name, ());
        self.moved.insert(name, Cell::new(false));
    }

    fn mark_moved(&mut self, name: &'base str) {
        self.moved.entry(name).or_insert_with(|| Cell::new(false)).set(true);
    }

    fn is_moved(&self, name: &str) -> bool {
        self.moved.get(name).map(|cell| cell.get()).unwrap_or(false)
    }

    fn is_bound(&self, name: &str) -> bool {
        self.bound.contains_key(name)
    }
}

/// Walks `body`, flagging a use of an already-moved local or a `&`/`&mut` taken
/// against a name that was never bound by a `let`/`var`/parameter in this body.
pub fn check_body(body: &BodyAst<'_>, source: &SourceFile) -> Result<(), TirError> {
    let mut state = MoveState::default();
    check_body_with_state(body, &mut state, source)
}

fn check_body_with_state<'base>(body: &BodyAst<'base>, state: &mut MoveState<'base>, source: &SourceFile) -> Result<(), TirError> {
    for statement in &body.statements {
        match statement {
            BodyStatementAst::VariableDefinition(def) => {
                if let Some(expr) = &def.expression {
                    check_expr(expr, state, source)?;
                }
                state.bind(def.name.text);
            }
            BodyStatementAst::VariableAssign(assign) => {
                check_expr(&assign.expression, state, source)?;
            }
            BodyStatementAst::FunctionCall(call) => check_call(call, state, source)?,
            BodyStatementAst::Expression(expr) => check_expr(expr, state, source)?,
            BodyStatementAst::IfCondition(if_condition) => check_if(if_condition, state, source)?,
        }
    }
    Ok(())
}

fn check_if<'base>(if_condition: &IfConditionAst<'base>, state: &mut MoveState<'base>, source: &SourceFile) -> Result<(), TirError> {
    check_expr(&if_condition.expression, state, source)?;
    // Each branch moves independently; a value moved in one arm is still available
    // in the others, so branches get their own state seeded from the current one.
    for body in std::iter::once(&if_condition.true_body).chain(if_condition.else_ifs.iter().map(|(_, b)| b)).chain(if_condition.false_body.iter()) {
        let mut branch_state = MoveState { moved: state.moved.clone(), bound: state.bound.clone() };
        check_body_with_state(body, &mut branch_state, source)?;
    }
    Ok(())
}

fn check_call<'base>(call: &FunctionCallAst<'base>, state: &mut MoveState<'base>, source: &SourceFile) -> Result<(), TirError> {
    // `this`-receiver calls (`FunctionCallType::This`) pass the receiver by reference,
    // never by move, so only the explicit argument list below is checked.
    let _ = &call.path;
    for arg in &call.arguments {
        check_expr(arg, state, source)?;
        if let ExpressionAst::Ident(name) = arg {
            if state.is_bound(name.text) {
                state.mark_moved(name.text);
            }
        }
    }
    Ok(())
}

fn check_expr<'base>(expr: &ExpressionAst<'base>, state: &mut MoveState<'base>, source: &SourceFile) -> Result<(), TirError> {
    match expr {
        ExpressionAst::Ident(name) => {
            if state.is_moved(name.text) {
                return Err(TirError::use_after_move(name.to_range(), source.clone()));
            }
        }
        ExpressionAst::Unary { op: UnaryOp::MakeRef | UnaryOp::MakeRefMut, expression } => {
            if let ExpressionAst::Ident(name) = expression.as_ref() {
                if !state.is_bound(name.text) {
                    return Err(TirError::borrow_of_temporary(name.to_range(), source.clone()));
                }
            }
            check_expr(expression, state, source)?;
        }
        ExpressionAst::Unary { expression, .. } => check_expr(expression, state, source)?,
        ExpressionAst::Operation { left, right, .. } => {
            check_expr(left, state, source)?;
            check_expr(right, state, source)?;
        }
        ExpressionAst::FunctionCall(call) => check_call(call, state, source)?,
        ExpressionAst::Raise(inner) => check_expr(inner, state, source)?,
        ExpressionAst::TryCatch(try_catch) => {
            check_expr(&try_catch.expression, state, source)?;
            let mut catch_state = MoveState { moved: state.moved.clone(), bound: state.bound.clone() };
            catch_state.bind(try_catch.catch_name.text);
            check_body_with_state(&try_catch.catch_body, &mut catch_state, source)?;
        }
        ExpressionAst::Primitive { .. } | ExpressionAst::Ref(_) => {}
    }
    Ok(())
}
