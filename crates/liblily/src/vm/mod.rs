//! Single-threaded bytecode interpreter that executes a [`crate::mir::MirModule`]
//! directly, without any native codegen step.
//!
//! Grounded on `original_source/include/core/lily/interpreter/vm/vm.h` for the stack/
//! block-frame model and `.../runtime/operator.h` for the per-width overflow-checked
//! arithmetic family. Each `Vm` owns its own stack and heap; multiple VMs never share
//! either.

use std::collections::HashMap;
use std::ops::Range;

use liblily_macros::LilyError;
use liblily_macros_core::SourceCode;

use crate::{
    file::SourceFile,
    mir::{MirBinOp, MirBlock, MirConstant, MirFunction, MirInstr, MirModule, MirTerminator, MirTopLevel, MirValue},
};

/// A runtime value living on the VM's value buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum VmValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Unit,
    Aggregate(Vec<VmValue>),
}

impl VmValue {
    fn as_int(&self) -> Option<i64> {
        match self {
            VmValue::Int(v) => Some(*v),
            VmValue::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            VmValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    fn truthy(&self) -> bool {
        matches!(self, VmValue::Bool(true)) || matches!(self, VmValue::Int(v) if *v != 0)
    }
}

/// The outcome of running a call to completion: either it returned normally, or a
/// `raise` escaped it uncaught by the callee.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameReturn {
    Normal(VmValue),
    Raise(VmValue),
}

/// A lexical block within a stack frame. `parent` indexes into the owning frame's own
/// `block_frames`, never a raw pointer, per the arena-of-indices convention used
/// throughout this crate's analysis stage.
#[derive(Debug, Clone)]
pub struct BlockFrame {
    pub names: HashMap<String, usize>,
    pub begin: usize,
    pub end: usize,
    pub limit_id: u64,
    pub parent: Option<usize>,
}

/// One call's activation record.
#[derive(Debug, Clone)]
pub struct StackFrame {
    pub function: String,
    pub params: Vec<VmValue>,
    pub return_slot: Option<FrameReturn>,
    pub begin: usize,
    pub end: usize,
    pub limit_id: u64,
    pub block_frames: Vec<BlockFrame>,
}

/// The VM's value stack: a flat buffer shared by every live frame, sliced by each
/// frame's `begin`/`end`.
#[derive(Debug, Default)]
pub struct VmStack {
    pub buffer: Vec<VmValue>,
    pub frames: Vec<StackFrame>,
    pub max_capacity: usize,
}

impl VmStack {
    pub fn new(max_capacity: usize) -> Self {
        Self { buffer: Vec::new(), frames: Vec::new(), max_capacity }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VmConfig {
    pub debug: bool,
    pub max_heap: usize,
    pub max_stack: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self { debug: true, max_heap: 64 * 1024 * 1024, max_stack: 8 * 1024 * 1024 }
    }
}

#[derive(Clone, Debug, LilyError, thiserror::Error)]
#[error("integer overflow in '{op}' ({width}-bit)")]
#[diagnostic(code("lily::error::vm_integer_overflow"), help("switch to a wrapping operator or a wider integer width"))]
pub struct IntegerOverflowError {
    pub op: String,
    pub width: u32,

    #[label("overflowed here")]
    pub position: Range<usize>,

    #[source_code]
    pub code: SourceCode,
}

/// Runtime failures the VM can abort with. Mirrors `VmError` from spec §4.6; unlike
/// `TirError`, most of these carry no source span since they are raised well after
/// static analysis, against a `MirModule` that no longer names source positions per
/// instruction (the containing function's name is attached instead where useful).
#[derive(Debug, Clone, thiserror::Error)]
pub enum VmError {
    #[error("missing symbol '{0}'")]
    MissingSymbol(String),

    #[error(transparent)]
    IntegerOverflow(#[from] IntegerOverflowError),

    #[error("division by zero")]
    DivisionByZero,

    #[error("heap allocation exceeded max_heap")]
    OutOfMemory,

    #[error("stack depth exceeded max_capacity")]
    StackOverflow,

    #[error("raise escaped to the top level: {0:?}")]
    UncaughtRaise(VmValue),
}

/// Per-width overflow-checked addition, matching the `add_with_overflow_*` family
/// named in §1/§4.6. Only `i64`-width values actually flow through this interpreter's
/// `VmValue::Int`, so one width covers every integer MIR type currently lowered; a
/// narrower-width checked path (`i8`/`i16`/`i32`) would re-truncate-then-check here if
/// `VmValue` ever grows distinct per-width variants.
pub fn add_with_overflow_i64(a: i64, b: i64) -> Result<i64, ()> {
    a.checked_add(b).ok_or(())
}

pub fn sub_with_overflow_i64(a: i64, b: i64) -> Result<i64, ()> {
    a.checked_sub(b).ok_or(())
}

pub fn mul_with_overflow_i64(a: i64, b: i64) -> Result<i64, ()> {
    a.checked_mul(b).ok_or(())
}

/// Interpreter state for one run of one `MirModule`. Owns its own stack and heap;
/// never shared with another `Vm`.
pub struct Vm {
    pub stack: VmStack,
    pub heap: Vec<VmValue>,
    pub config: VmConfig,
}

impl Vm {
    pub fn new(config: VmConfig) -> Self {
        Self { stack: VmStack::new(config.max_stack), heap: Vec::new(), config }
    }

    /// Starts at the function flagged `is_main`, executes to normal return or raise,
    /// and returns its process exit code: `0` on normal return, the integer payload if
    /// the entry returns an int, `101` (matching Rust's own panic convention) if a
    /// raise escapes to the top level.
    pub fn run(&mut self, module: &MirModule, _args: Vec<String>) -> Result<i32, VmError> {
        let entry = module
            .items
            .values()
            .find_map(|item| match item {
                MirTopLevel::Function(f) if f.is_main => Some(f),
                _ => None,
            })
            .ok_or_else(|| VmError::MissingSymbol("main".to_string()))?;

        match self.call(module, entry, Vec::new())? {
            FrameReturn::Normal(VmValue::Int(code)) => Ok(code as i32),
            FrameReturn::Normal(_) => Ok(0),
            FrameReturn::Raise(value) => Err(VmError::UncaughtRaise(value)),
        }
    }

    fn call(&mut self, module: &MirModule, function: &MirFunction, params: Vec<VmValue>) -> Result<FrameReturn, VmError> {
        // `max_capacity` models byte budget per §3.12; this interpreter tracks call
        // depth instead of buffer bytes (no fixed-width value layout yet), so the
        // recursion guard uses a depth proxy rather than `buffer.len()` bytes.
        const MAX_CALL_DEPTH: usize = 10_000;
        if self.stack.frames.len() >= MAX_CALL_DEPTH {
            return Err(VmError::StackOverflow);
        }

        let begin = self.stack.buffer.len();
        self.stack.frames.push(StackFrame {
            function: function.name.clone(),
            params: params.clone(),
            return_slot: None,
            begin,
            end: begin,
            limit_id: 0,
            block_frames: Vec::new(),
        });

        let mut locals: HashMap<String, VmValue> = function
            .params
            .iter()
            .zip(params.iter())
            .map(|((name, _), value)| (name.clone(), value.clone()))
            .collect();

        let result = self.run_block(module, function, 0, &mut locals);
        self.stack.frames.pop();
        result
    }

    fn run_block(&mut self, module: &MirModule, function: &MirFunction, block_id: u32, locals: &mut HashMap<String, VmValue>) -> Result<FrameReturn, VmError> {
        let block: &MirBlock = &function.blocks[block_id as usize];

        for instr in &block.instructions {
            match instr {
                MirInstr::Alloc { var, .. } => {
                    locals.entry(var.clone()).or_insert(VmValue::Unit);
                }
                MirInstr::Store { var, value } => {
                    let evaluated = self.eval(value, locals);
                    locals.insert(var.clone(), evaluated);
                }
                MirInstr::LoadTo { reg, var, .. } => {
                    let value = locals.get(var).cloned().unwrap_or(VmValue::Unit);
                    locals.insert(reg.clone(), value);
                }
                MirInstr::BinOp { reg, op, checked, left, right, .. } => {
                    let left = self.eval(left, locals);
                    let right = self.eval(right, locals);
                    let result = self.apply_binop(*op, *checked, left, right)?;
                    locals.insert(reg.clone(), result);
                }
                MirInstr::CallDirect { reg, callee, args, .. } => {
                    let evaluated_args: Vec<VmValue> = args.iter().map(|a| self.eval(a, locals)).collect();
                    if let Some(target) = find_function(module, callee) {
                        match self.call(module, target, evaluated_args)? {
                            FrameReturn::Normal(value) => {
                                if let Some(reg) = reg {
                                    locals.insert(reg.clone(), value);
                                }
                            }
                            raise @ FrameReturn::Raise(_) => return Ok(raise),
                        }
                    } else if reg.is_some() {
                        return Err(VmError::MissingSymbol(callee.clone()));
                    }
                }
                MirInstr::Raise { value } => {
                    let evaluated = self.eval(value, locals);
                    return Ok(FrameReturn::Raise(evaluated));
                }
            }
        }

        match &block.terminator {
            MirTerminator::Return(value) => Ok(FrameReturn::Normal(self.eval(value, locals))),
            MirTerminator::Branch(target) => self.run_block(module, function, *target, locals),
            MirTerminator::CondBranch { condition, then_block, else_block } => {
                let value = self.eval(condition, locals);
                let target = if value.truthy() { *then_block } else { *else_block };
                self.run_block(module, function, target, locals)
            }
            MirTerminator::Unreachable => Ok(FrameReturn::Normal(VmValue::Unit)),
        }
    }

    fn eval(&self, value: &MirValue, locals: &HashMap<String, VmValue>) -> VmValue {
        match value {
            MirValue::Constant(constant) => match constant {
                MirConstant::Int(v) => VmValue::Int(*v),
                MirConstant::Float(v) => VmValue::Float(*v),
                MirConstant::Bool(v) => VmValue::Bool(*v),
                MirConstant::Str(v) => VmValue::Str(v.clone()),
                MirConstant::Unit => VmValue::Unit,
            },
            MirValue::Param(index, _) => self.stack.frames.last().and_then(|f| f.params.get(*index as usize)).cloned().unwrap_or(VmValue::Unit),
            MirValue::Var(name, _) | MirValue::Reg(name, _) => locals.get(name).cloned().unwrap_or(VmValue::Unit),
            MirValue::Load(inner, _) => self.eval(inner, locals),
            MirValue::Aggregate(values, _) => VmValue::Aggregate(values.iter().map(|v| self.eval(v, locals)).collect()),
        }
    }

    fn apply_binop(&self, op: MirBinOp, checked: bool, left: VmValue, right: VmValue) -> Result<VmValue, VmError> {
        use MirBinOp::*;

        if let (Some(a), Some(b)) = (left.as_float(), right.as_float()) {
            return Ok(match op {
                Add => VmValue::Float(a + b),
                Sub => VmValue::Float(a - b),
                Mul => VmValue::Float(a * b),
                Div => VmValue::Float(a / b),
                Mod => VmValue::Float(a % b),
                Pow => VmValue::Float(a.powf(b)),
                Eq => VmValue::Bool(a == b),
                NotEq => VmValue::Bool(a != b),
                Lt => VmValue::Bool(a < b),
                LtEq => VmValue::Bool(a <= b),
                Gt => VmValue::Bool(a > b),
                GtEq => VmValue::Bool(a >= b),
                _ => VmValue::Unit,
            });
        }

        let a = left.as_int().unwrap_or(0);
        let b = right.as_int().unwrap_or(0);

        let int_result = match op {
            Add if checked && self.config.debug => {
                add_with_overflow_i64(a, b).map_err(|_| IntegerOverflowError { op: "+".into(), width: 64, position: 0..0, code: SourceFile::new(vec![], String::new()).into() })?
            }
            Add => a.wrapping_add(b),
            Sub if checked && self.config.debug => {
                sub_with_overflow_i64(a, b).map_err(|_| IntegerOverflowError { op: "-".into(), width: 64, position: 0..0, code: SourceFile::new(vec![], String::new()).into() })?
            }
            Sub => a.wrapping_sub(b),
            Mul if checked && self.config.debug => {
                mul_with_overflow_i64(a, b).map_err(|_| IntegerOverflowError { op: "*".into(), width: 64, position: 0..0, code: SourceFile::new(vec![], String::new()).into() })?
            }
            Mul => a.wrapping_mul(b),
            Div => {
                if b == 0 {
                    return Err(VmError::DivisionByZero);
                }
                a / b
            }
            Mod => {
                if b == 0 {
                    return Err(VmError::DivisionByZero);
                }
                a % b
            }
            Pow => a.pow(b.max(0) as u32),
            BitAnd => a & b,
            BitOr => a | b,
            BitXor => a ^ b,
            Shl => a << b,
            Shr => a >> b,
            Eq => return Ok(VmValue::Bool(a == b)),
            NotEq => return Ok(VmValue::Bool(a != b)),
            Lt => return Ok(VmValue::Bool(a < b)),
            LtEq => return Ok(VmValue::Bool(a <= b)),
            Gt => return Ok(VmValue::Bool(a > b)),
            GtEq => return Ok(VmValue::Bool(a >= b)),
            And => return Ok(VmValue::Bool(a != 0 && b != 0)),
            Or => return Ok(VmValue::Bool(a != 0 || b != 0)),
        };

        Ok(VmValue::Int(int_result))
    }
}

fn find_function<'m>(module: &'m MirModule, name: &str) -> Option<&'m MirFunction> {
    module.items.get(name).and_then(|item| match item {
        MirTopLevel::Function(f) => Some(f),
        _ => None,
    })
}
