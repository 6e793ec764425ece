//! Mid-level intermediate representation: a linear, block-structured IR lowered from
//! the checked AST, and the lowering pass that produces it.
//!
//! `MirDt` mirrors `original_source/include/core/lily/mir/dt.h`'s `LilyMirDtKind`
//! structurally; `MirModule`/`MirFunction`/`MirBlock`/`MirInstr` follow the checked
//! two-phase `ResolveAst` ordering generalized into a single lowering pass that walks
//! an already-parsed [`crate::ast::FunctionDefinitionAst`] body.

use indexmap::IndexMap;

use crate::ast::{
    BodyAst, BodyStatementAst, ExpressionAst, ExpressionOperatorType, FunctionDefinitionAst, PrimitiveValue, TypeNameAst,
};

/// Mid-level data type. Compares structurally (`PartialEq`/`Eq`/`Hash`), directly
/// mirroring `LilyMirDtKind`/`LilyMirDtLen`/`LilyMirDtArray`/`LilyMirDtResult`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MirDt {
    I1,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Any,
    Array(MirLen, Box<MirDt>),
    Bytes(MirLen),
    CStr(MirLen),
    Str(MirLen),
    List(Box<MirDt>),
    Ptr(Box<MirDt>),
    Ref(Box<MirDt>),
    Result { ok: Box<MirDt>, err: Box<MirDt> },
    Struct(Vec<MirDt>),
    StructName(String),
    Trace(Box<MirDt>),
    Tuple(Vec<MirDt>),
    Unit,
    CVaArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MirLen {
    Undef,
    Def(u64),
}

impl MirDt {
    /// Maps a surface type name to its mangled `MirDt`. Unknown/user-defined names
    /// become `StructName`, deferring their layout to whatever declared the type.
    pub fn from_type_name(type_name: &TypeNameAst<'_>) -> MirDt {
        let base = type_name.names.last().map(|span| span.text).unwrap_or("");
        let dt = match base {
            "i8" => MirDt::I8,
            "i16" => MirDt::I16,
            "i32" => MirDt::I32,
            "i64" => MirDt::I64,
            "isize" => MirDt::Isize,
            "u8" => MirDt::U8,
            "u16" => MirDt::U16,
            "u32" => MirDt::U32,
            "u64" => MirDt::U64,
            "usize" => MirDt::Usize,
            "f32" => MirDt::F32,
            "f64" => MirDt::F64,
            "bool" => MirDt::I1,
            "string" => MirDt::Str(MirLen::Undef),
            "void" | "" => MirDt::Unit,
            name => MirDt::StructName(name.to_string()),
        };

        if type_name.reference {
            MirDt::Ref(Box::new(dt))
        } else {
            dt
        }
    }
}

/// A value a [`MirInstr`] reads or produces.
#[derive(Debug, Clone, PartialEq)]
pub enum MirValue {
    Constant(MirConstant),
    Param(u32, MirDt),
    Var(String, MirDt),
    Reg(String, MirDt),
    Load(Box<MirValue>, MirDt),
    Aggregate(Vec<MirValue>, MirDt),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MirConstant {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Unit,
}

impl MirConstant {
    fn from_primitive(value: &PrimitiveValue<'_>) -> MirConstant {
        match value {
            PrimitiveValue::String(s) => MirConstant::Str(s.to_string()),
            PrimitiveValue::Bool(b) => MirConstant::Bool(*b),
            PrimitiveValue::I8(v) => MirConstant::Int(*v as i64),
            PrimitiveValue::U8(v) => MirConstant::Int(*v as i64),
            PrimitiveValue::I16(v) => MirConstant::Int(*v as i64),
            PrimitiveValue::U16(v) => MirConstant::Int(*v as i64),
            PrimitiveValue::I32(v) => MirConstant::Int(*v as i64),
            PrimitiveValue::U32(v) => MirConstant::Int(*v as i64),
            PrimitiveValue::I64(v) => MirConstant::Int(*v),
            PrimitiveValue::U64(v) => MirConstant::Int(*v as i64),
            PrimitiveValue::Float(v, _) => MirConstant::Float(*v),
            PrimitiveValue::Double(v, _) => MirConstant::Float(*v),
        }
    }
}

/// A binary operator lowered to its MIR opcode; `CheckedOverflow` variants are only
/// emitted for `+`/`-`/`*` in debug builds (see `crate::vm`'s arithmetic).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirBinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl MirBinOp {
    fn from_ast(op: ExpressionOperatorType) -> Option<MirBinOp> {
        Some(match op {
            ExpressionOperatorType::Add => MirBinOp::Add,
            ExpressionOperatorType::Sub => MirBinOp::Sub,
            ExpressionOperatorType::Mul => MirBinOp::Mul,
            ExpressionOperatorType::Div => MirBinOp::Div,
            ExpressionOperatorType::Mod => MirBinOp::Mod,
            ExpressionOperatorType::Pow => MirBinOp::Pow,
            ExpressionOperatorType::Xor => MirBinOp::BitXor,
            ExpressionOperatorType::BitwiseShiftLeft => MirBinOp::Shl,
            ExpressionOperatorType::BitwiseShiftRight => MirBinOp::Shr,
            ExpressionOperatorType::Equal => MirBinOp::Eq,
            ExpressionOperatorType::NotEqual => MirBinOp::NotEq,
            ExpressionOperatorType::LessThan => MirBinOp::Lt,
            ExpressionOperatorType::LessEqualThan => MirBinOp::LtEq,
            ExpressionOperatorType::GreaterThan => MirBinOp::Gt,
            ExpressionOperatorType::GreaterEqualThan => MirBinOp::GtEq,
            ExpressionOperatorType::And | ExpressionOperatorType::LogicalAnd => MirBinOp::And,
            ExpressionOperatorType::Or | ExpressionOperatorType::LogicalOr => MirBinOp::Or,
            // Range/Pipe/ListHead/ListTail lower through desugaring at the checked-AST
            // stage, not as a single MIR binop; no direct opcode here.
            ExpressionOperatorType::Range | ExpressionOperatorType::Pipe | ExpressionOperatorType::ListHead | ExpressionOperatorType::ListTail => return None,
        })
    }
}

/// A single MIR instruction. `Alloc`/`Store`/`LoadTo` model memory; arithmetic/compare
/// ops always write a fresh `reg`; `CallDirect`/`CallIndirect` cover both call forms;
/// `Raise` is a mid-block instruction (propagation is handled by the VM, not by a
/// dedicated terminator) so it can sit inside an otherwise-straight-line block.
#[derive(Debug, Clone, PartialEq)]
pub enum MirInstr {
    Alloc { var: String, ty: MirDt },
    Store { var: String, value: MirValue },
    LoadTo { reg: String, var: String, ty: MirDt },
    BinOp { reg: String, op: MirBinOp, checked: bool, left: MirValue, right: MirValue, ty: MirDt },
    CallDirect { reg: Option<String>, callee: String, args: Vec<MirValue>, ty: MirDt },
    Raise { value: MirValue },
}

/// How a block ends. `blocks[0]` is always the function's entry block.
#[derive(Debug, Clone, PartialEq)]
pub enum MirTerminator {
    Return(MirValue),
    Branch(u32),
    CondBranch { condition: MirValue, then_block: u32, else_block: u32 },
    Unreachable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MirBlock {
    pub id: u32,
    pub instructions: Vec<MirInstr>,
    pub terminator: MirTerminator,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkageFlags {
    pub inline: bool,
    pub no_std: bool,
    pub builtin: bool,
    pub cc_abi: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MirFunction {
    pub name: String,
    pub params: Vec<(String, MirDt)>,
    pub return_type: MirDt,
    pub linkage: LinkageFlags,
    pub is_main: bool,
    pub blocks: Vec<MirBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MirTopLevel {
    Constant(MirValue),
    Function(MirFunction),
}

/// `items` preserves insertion order (`IndexMap`-backed), which drives emission order.
#[derive(Debug, Clone, Default)]
pub struct MirModule {
    pub name: String,
    pub items: IndexMap<String, MirTopLevel>,
}

impl MirModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), items: IndexMap::new() }
    }
}

/// Lowers one checked function definition into a [`MirFunction`], block by block. This
/// is a direct-from-AST lowering rather than from a fully separate checked-expression
/// arena (§3.8's `CheckedExpr`/`Analysis::exprs` is not built by this crate yet; see
/// `DESIGN.md`), so it only handles the subset of expressions `ExpressionAst` itself
/// can represent.
pub struct Lowering {
    next_reg: u32,
    next_block: u32,
}

impl Default for Lowering {
    fn default() -> Self {
        Self::new()
    }
}

impl Lowering {
    pub fn new() -> Self {
        Self { next_reg: 0, next_block: 1 }
    }

    fn fresh_reg(&mut self) -> String {
        let name = format!("%{}", self.next_reg);
        self.next_reg += 1;
        name
    }

    fn fresh_block(&mut self) -> u32 {
        let id = self.next_block;
        self.next_block += 1;
        id
    }

    pub fn lower_function(&mut self, ast: &FunctionDefinitionAst<'_>, is_main: bool) -> MirFunction {
        let params = ast
            .arguments
            .iter()
            .filter_map(|arg| match arg {
                crate::ast::FunctionArgumentAst::This(_) => None,
                crate::ast::FunctionArgumentAst::Argument { name, field_type } => Some((name.text.to_string(), MirDt::from_type_name(field_type))),
            })
            .collect();

        let mut blocks = vec![MirBlock { id: 0, instructions: Vec::new(), terminator: MirTerminator::Return(MirValue::Constant(MirConstant::Unit)) }];
        self.lower_body(&ast.body, &mut blocks, 0);

        MirFunction {
            name: ast.name.text.to_string(),
            params,
            return_type: MirDt::from_type_name(&ast.return_type),
            linkage: LinkageFlags::default(),
            is_main,
            blocks,
        }
    }

    fn push(&self, blocks: &mut [MirBlock], block: u32, instr: MirInstr) {
        blocks[block as usize].instructions.push(instr);
    }

    fn lower_body(&mut self, body: &BodyAst<'_>, blocks: &mut Vec<MirBlock>, mut current: u32) -> u32 {
        for statement in &body.statements {
            current = self.lower_statement(statement, blocks, current);
        }
        current
    }

    fn lower_statement(&mut self, statement: &BodyStatementAst<'_>, blocks: &mut Vec<MirBlock>, current: u32) -> u32 {
        match statement {
            BodyStatementAst::VariableDefinition(def) => {
                let ty = def.expected_type.as_ref().map(MirDt::from_type_name).unwrap_or(MirDt::Any);
                self.push(blocks, current, MirInstr::Alloc { var: def.name.text.to_string(), ty: ty.clone() });
                if let Some(expression) = &def.expression {
                    let value = self.lower_expression(expression, blocks, current);
                    self.push(blocks, current, MirInstr::Store { var: def.name.text.to_string(), value });
                }
                current
            }
            BodyStatementAst::VariableAssign(assign) => {
                let value = self.lower_expression(&assign.expression, blocks, current);
                self.push(blocks, current, MirInstr::Store { var: assign.name.text.to_string(), value });
                current
            }
            BodyStatementAst::FunctionCall(call) => {
                self.lower_call(call, blocks, current);
                current
            }
            BodyStatementAst::IfCondition(if_condition) => self.lower_if(if_condition, blocks, current),
            BodyStatementAst::Expression(ExpressionAst::Raise(inner)) => {
                let value = self.lower_expression(inner, blocks, current);
                self.push(blocks, current, MirInstr::Raise { value });
                current
            }
            BodyStatementAst::Expression(expression) => {
                self.lower_expression(expression, blocks, current);
                current
            }
        }
    }

    fn lower_if(&mut self, if_condition: &crate::ast::IfConditionAst<'_>, blocks: &mut Vec<MirBlock>, current: u32) -> u32 {
        let condition = self.lower_expression(&if_condition.expression, blocks, current);

        let then_block = self.fresh_block();
        let else_block = self.fresh_block();
        let merge_block = self.fresh_block();

        blocks.push(MirBlock { id: then_block, instructions: Vec::new(), terminator: MirTerminator::Branch(merge_block) });
        blocks.push(MirBlock { id: else_block, instructions: Vec::new(), terminator: MirTerminator::Branch(merge_block) });
        blocks.push(MirBlock { id: merge_block, instructions: Vec::new(), terminator: blocks[current as usize].terminator.clone() });

        blocks[current as usize].terminator = MirTerminator::CondBranch { condition, then_block, else_block };

        let then_end = self.lower_body(&if_condition.true_body, blocks, then_block);
        blocks[then_end as usize].terminator = MirTerminator::Branch(merge_block);

        let mut else_end = else_block;
        if let Some(false_body) = &if_condition.false_body {
            else_end = self.lower_body(false_body, blocks, else_block);
        }
        blocks[else_end as usize].terminator = MirTerminator::Branch(merge_block);

        merge_block
    }

    fn lower_call(&mut self, call: &crate::ast::FunctionCallAst<'_>, blocks: &mut Vec<MirBlock>, current: u32) -> MirValue {
        let args = call.arguments.iter().map(|arg| self.lower_expression(arg, blocks, current)).collect();
        let callee = match &call.path {
            crate::ast::FunctionCallType::This(_) => "this".to_string(),
            crate::ast::FunctionCallType::Direct(segments) => segments.iter().map(|s| s.text).collect::<Vec<_>>().join("."),
        };
        let reg = self.fresh_reg();
        self.push(blocks, current, MirInstr::CallDirect { reg: Some(reg.clone()), callee, args, ty: MirDt::Any });
        MirValue::Reg(reg, MirDt::Any)
    }

    fn lower_expression(&mut self, expression: &ExpressionAst<'_>, blocks: &mut Vec<MirBlock>, current: u32) -> MirValue {
        match expression {
            ExpressionAst::Primitive { value, .. } => MirValue::Constant(MirConstant::from_primitive(value)),
            ExpressionAst::Ident(span) => MirValue::Var(span.text.to_string(), MirDt::Any),
            ExpressionAst::Ref(ref_ast) => {
                let name = ref_ast.names.iter().map(|s| s.text).collect::<Vec<_>>().join(".");
                MirValue::Var(name, MirDt::Any)
            }
            ExpressionAst::FunctionCall(call) => self.lower_call(call, blocks, current),
            ExpressionAst::Unary { expression, .. } => self.lower_expression(expression, blocks, current),
            ExpressionAst::Operation { left, operator, right } => {
                let left_value = self.lower_expression(left, blocks, current);
                let right_value = self.lower_expression(right, blocks, current);
                match MirBinOp::from_ast(*operator) {
                    Some(op) => {
                        let reg = self.fresh_reg();
                        let checked = matches!(op, MirBinOp::Add | MirBinOp::Sub | MirBinOp::Mul);
                        self.push(blocks, current, MirInstr::BinOp { reg: reg.clone(), op, checked, left: left_value, right: right_value, ty: MirDt::Any });
                        MirValue::Reg(reg, MirDt::Any)
                    }
                    // Range/Pipe/ListHead/ListTail: not yet desugared; surfaced as an
                    // opaque aggregate rather than silently dropped.
                    None => MirValue::Aggregate(vec![left_value, right_value], MirDt::Any),
                }
            }
            ExpressionAst::Raise(inner) => {
                let value = self.lower_expression(inner, blocks, current);
                self.push(blocks, current, MirInstr::Raise { value: value.clone() });
                value
            }
            ExpressionAst::TryCatch(try_catch) => self.lower_expression(&try_catch.expression, blocks, current),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{file::SourceFile, nom_tools::State, parser, process_code};

    fn lower_source(code: &str) -> MirFunction {
        let source = SourceFile::new(vec!["test".into()], code.to_string());
        let state = State::new(source);
        let file = process_code(&state).unwrap();
        let function = file
            .statements
            .iter()
            .find_map(|s| if let crate::ast::FileStatementAst::Function(f) = s { Some(f.clone()) } else { None })
            .unwrap();
        let mut lowering = Lowering::new();
        lowering.lower_function(&function, false)
    }

    #[test]
    fn lowers_variable_definition_and_assignment() {
        let function = lower_source("fun main(): i32 { var x: i32 = 1; x = 2; }");
        assert!(function.blocks[0].instructions.iter().any(|i| matches!(i, MirInstr::Alloc { .. })));
        assert_eq!(function.blocks[0].instructions.iter().filter(|i| matches!(i, MirInstr::Store { .. })).count(), 2);
    }

    #[test]
    fn lowers_if_into_cond_branch_with_merge_block() {
        let function = lower_source("fun main(): i32 { if (true) { var x: i32 = 1; } }");
        assert!(matches!(function.blocks[0].terminator, MirTerminator::CondBranch { .. }));
        assert!(function.blocks.len() >= 4);
    }

    #[test]
    fn lowers_binary_arithmetic_into_checked_binop() {
        let function = lower_source("fun main(): i32 { var x: i32 = 1 + 2; }");
        assert!(function.blocks[0].instructions.iter().any(|i| matches!(i, MirInstr::BinOp { op: MirBinOp::Add, checked: true, .. })));
    }
}
