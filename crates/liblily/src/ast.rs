//! Abstract Syntax Tree (AST) definitions for the Lily language.
//!
//! This module defines the AST produced by the parser from a declaration shell's
//! expanded token span. The AST is the bridge between the parser and the analysis
//! (`tir`) stage.
//!
//! # Declaration vocabulary
//!
//! Every top-level construct in a Lily source file is one of:
//!
//! - [`UseAst`] - import statement
//! - [`FunctionDefinitionAst`] - standalone function (`fun`)
//! - [`ObjectDefinitionAst`] - `class`, `record`, `enum`, `enum object` or
//!   `record object`, distinguished by [`ObjectKind`]
//! - [`TraitDefinitionAst`] - a trait contract
//! - [`ImplDefinitionAst`] - a trait implementation for an object type
//! - [`ConstantDefinitionAst`] - a module-level constant
//! - [`ErrorDefinitionAst`] - an error set (a closed enumeration of raise-able values)
//! - [`AliasDefinitionAst`] - a type alias
//!
//! All AST nodes borrow from the originating source text via the lifetime
//! parameter `'base` and carry [`Span`]s for diagnostics.

use std::{borrow::Cow, rc::Rc};
use strum_macros::EnumIs;
use crate::{
    file::SourceFile,
    nom_tools::{Span, ToRange},
    parser::splited_path::SplitedPath, tir::PrimitiveType,
};

/// Unique identifier for AST nodes within a compilation unit.
#[derive(PartialEq, Debug, Copy, Clone, Eq, PartialOrd, Ord, Hash)]
pub struct AstIndex(pub usize);

/// Literal values appearing in Lily source code.
#[derive(PartialEq, Debug, Clone)]
pub enum PrimitiveValue<'base> {
    String(Cow<'base, str>),
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    /// Fits in `f32` precision; decimal place count kept for display fidelity.
    Float(f64, u8),
    /// Requires `f64` precision; decimal place count kept for display fidelity.
    Double(f64, u8),
}

impl PrimitiveValue<'_> {
    /// Maps a literal to the primitive type used for inference defaulting.
    pub fn to_type(&self) -> PrimitiveType {
        match self {
            PrimitiveValue::String(_) => PrimitiveType::String,
            PrimitiveValue::Bool(_) => PrimitiveType::Bool,
            PrimitiveValue::I8(_) => PrimitiveType::I8,
            PrimitiveValue::U8(_) => PrimitiveType::U8,
            PrimitiveValue::I16(_) => PrimitiveType::I16,
            PrimitiveValue::U16(_) => PrimitiveType::U16,
            PrimitiveValue::I32(_) => PrimitiveType::I32,
            PrimitiveValue::U32(_) => PrimitiveType::U32,
            PrimitiveValue::I64(_) => PrimitiveType::I64,
            PrimitiveValue::U64(_) => PrimitiveType::U64,
            PrimitiveValue::Float(_, _) => PrimitiveType::Float,
            PrimitiveValue::Double(_, _) => PrimitiveType::Double,
        }
    }
}

impl<'base> AsRef<PrimitiveValue<'base>> for PrimitiveValue<'base> {
    fn as_ref(&self) -> &PrimitiveValue<'base> {
        self
    }
}

impl<'base> AsMut<PrimitiveValue<'base>> for PrimitiveValue<'base> {
    fn as_mut(&mut self) -> &mut PrimitiveValue<'base> {
        self
    }
}

/// Mutability of a local variable binding.
#[derive(PartialEq, Debug)]
pub enum VariableDefinitionType {
    /// `const` - value cannot be reassigned after initialization.
    Const,
    /// `var` - value can be reassigned.
    Var,
}

/// Binary operators, grouped by precedence (highest to lowest):
/// `**`; `*` `/` `%`; `+` `-`; `<<` `>>`; `&`; `^`; `|`; `..`; `==` `not=` `<` `<=` `>`
/// `>=`; `and`; `or`; `|>`; `->` `<-`.
#[derive(PartialEq, Copy, Clone, Debug)]
pub enum ExpressionOperatorType {
    Pow,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Equal,
    NotEqual,
    GreaterEqualThan,
    GreaterThan,
    LessEqualThan,
    LessThan,
    Xor,
    LogicalOr,
    LogicalAnd,
    BitwiseShiftLeft,
    BitwiseShiftRight,
    /// `..` range construction.
    Range,
    /// `|>` pipe: passes the left value as the first argument of the call on the right.
    Pipe,
    /// `->` list-head: prepends the left value onto the list on the right.
    ListHead,
    /// `<-` list-tail: the list on the left with its head dropped, then `<-` the right.
    ListTail,
}

/// Root AST node for a single parsed source file.
#[derive(Debug)]
pub struct FileAst<'base> {
    pub file: SourceFile,
    pub statements: Vec<FileStatementAst<'base>>,
}

/// Top-level declarations that can appear in a Lily source file.
///
/// `EnumIs` generates `is_use()`, `is_function()`, and so on for pattern matching.
#[derive(EnumIs, Debug)]
pub enum FileStatementAst<'base> {
    Use(Rc<UseAst<'base>>),
    Function(Rc<FunctionDefinitionAst<'base>>),
    Object(Rc<ObjectDefinitionAst<'base>>),
    Trait(Rc<TraitDefinitionAst<'base>>),
    Impl(Rc<ImplDefinitionAst<'base>>),
    Constant(Rc<ConstantDefinitionAst<'base>>),
    Error(Rc<ErrorDefinitionAst<'base>>),
    Alias(Rc<AliasDefinitionAst<'base>>),
}

/// Import statement.
///
/// ```lily
/// use module.SomeType;
/// use module.SomeType as Alias;
/// ```
#[derive(Debug)]
pub struct UseAst<'base> {
    pub alias: Option<Span<'base>>,
    pub import: SplitedPath<'base>,
}

impl<'base> UseAst<'base> {
    /// The name this import becomes available as: the alias, or else the
    /// last path component.
    pub fn ast_name(&self) -> Span<'base> {
        self.import.paths.last().unwrap().clone()
    }
}

/// Distinguishes the four object shapes sharing the `ObjectDefinitionAst` grammar.
///
/// `Class` and `Record` hold named fields and methods; `Enum` holds bare variants;
/// `EnumObject`/`RecordObject` hold variants that themselves carry payload fields,
/// the "object" flavor of a sum type.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ObjectKind {
    Class,
    Record,
    Enum,
    EnumObject,
    RecordObject,
}

impl ObjectKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ObjectKind::Class => "class",
            ObjectKind::Record => "record",
            ObjectKind::Enum => "enum",
            ObjectKind::EnumObject => "enum object",
            ObjectKind::RecordObject => "record object",
        }
    }
}

/// A single case of an `enum`/`enum object`/`record object` definition.
///
/// A bare `enum` variant carries no payload; `enum object`/`record object` variants
/// may carry a tuple-style payload of types.
#[derive(Debug, PartialEq)]
pub struct VariantAst<'base> {
    pub name: Span<'base>,
    pub payload: Vec<TypeNameAst<'base>>,
}

/// A class/record/enum/enum-object/record-object definition.
///
/// ```lily
/// class Person {
///     name: string;
///     pub age: i32;
///
///     fun greeting(this): string {
///         return this.name;
///     }
/// }
///
/// enum Color { Red, Green, Blue }
///
/// enum object Shape {
///     Circle(f64),
///     Rectangle(f64, f64),
/// }
/// ```
#[derive(Debug, PartialEq)]
pub struct ObjectDefinitionAst<'base> {
    pub kind: ObjectKind,
    pub is_public: Option<Span<'base>>,
    pub name: Span<'base>,
    pub fields: Vec<ObjectDefinitionFieldAst<'base>>,
    pub variants: Vec<VariantAst<'base>>,
    pub index: AstIndex,
}

/// Members that can appear within an object definition.
#[derive(Debug, PartialEq)]
pub enum ObjectDefinitionFieldAst<'base> {
    Field(FieldAst<'base>),
    Method(FunctionDefinitionAst<'base>),
}

/// A trait contract: method signatures and fields that implementing types must
/// provide, with optional inheritance from base traits.
///
/// ```lily
/// trait Drawable {
///     fun draw(this): void;
/// }
///
/// trait ColoredShape: Drawable {
///     color: string;
///     fun area(this): f64;
/// }
/// ```
#[derive(Debug, PartialEq)]
pub struct TraitDefinitionAst<'base> {
    pub name: Span<'base>,
    pub fields: Vec<TraitDefinitionFieldAst<'base>>,
    pub base_traits: Vec<TypeNameAst<'base>>,
    pub index: AstIndex,
}

/// Members that can appear within a trait definition.
#[derive(Debug, PartialEq)]
pub enum TraitDefinitionFieldAst<'base> {
    Method(TraitMethodDefinitionAst<'base>),
    Field(FieldAst<'base>),
}

/// A trait method signature (no body).
#[derive(Debug, PartialEq)]
pub struct TraitMethodDefinitionAst<'base> {
    pub name: Span<'base>,
    pub arguments: Vec<FunctionArgumentAst<'base>>,
    pub return_type: TypeNameAst<'base>,
}

/// A trait implementation for an object type.
///
/// ```lily
/// impl Drawable for Person {
///     fun draw(this): void {
///         // ...
///     }
/// }
/// ```
#[derive(Debug, PartialEq)]
pub struct ImplDefinitionAst<'base> {
    pub target: TypeNameAst<'base>,
    pub target_traits: Vec<TypeNameAst<'base>>,
    pub fields: Vec<ImplDefinitionFieldAst<'base>>,
}

/// Members that can be provided by a trait implementation.
#[derive(Debug, PartialEq)]
pub enum ImplDefinitionFieldAst<'base> {
    Method(FunctionDefinitionAst<'base>),
    Field(FieldAst<'base>),
}

/// A module-level constant declaration.
///
/// ```lily
/// pub constant MaxRetries: i32 = 5;
/// ```
#[derive(Debug, PartialEq)]
pub struct ConstantDefinitionAst<'base> {
    pub is_public: Option<Span<'base>>,
    pub name: Span<'base>,
    pub constant_type: Option<TypeNameAst<'base>>,
    pub expression: ExpressionAst<'base>,
}

/// An error set: a closed enumeration of values a function may `raise`.
///
/// ```lily
/// error IoError {
///     NotFound,
///     PermissionDenied(string),
/// }
/// ```
#[derive(Debug, PartialEq)]
pub struct ErrorDefinitionAst<'base> {
    pub is_public: Option<Span<'base>>,
    pub name: Span<'base>,
    pub variants: Vec<VariantAst<'base>>,
}

/// A type alias.
///
/// ```lily
/// pub type UserId = i64;
/// ```
#[derive(Debug, PartialEq)]
pub struct AliasDefinitionAst<'base> {
    pub is_public: Option<Span<'base>>,
    pub name: Span<'base>,
    pub target: TypeNameAst<'base>,
}

/// A type reference with its nullable (`?`) and reference (`&`) modifiers.
///
/// ```lily
/// string          // Simple type
/// string?         // Nullable type
/// &string         // Reference type
/// &string?        // Nullable reference type
/// module.Class    // Qualified type name
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeNameAst<'base> {
    pub reference: bool,
    pub nullable: bool,
    pub names: Vec<Span<'base>>,
    pub names_span: Span<'base>,
}

impl ToRange for TypeNameAst<'_> {
    fn to_range(&self) -> std::ops::Range<usize> {
        self.names_span.position.clone()
    }
}

/// A property-access chain such as `obj.field.subfield`.
#[derive(Debug, PartialEq)]
pub struct RefAst<'base> {
    pub names: Vec<Span<'base>>,
}

/// A function parameter: either the special `this` receiver, or a named,
/// typed argument.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionArgumentAst<'base> {
    This(Span<'base>),
    Argument {
        name: Span<'base>,
        field_type: TypeNameAst<'base>,
    },
}

/// A statement within a function or block body.
#[derive(Debug, PartialEq)]
pub enum BodyStatementAst<'base> {
    VariableDefinition(VariableDefinitionAst<'base>),
    VariableAssign(VariableAssignAst<'base>),
    FunctionCall(FunctionCallAst<'base>),
    IfCondition(IfConditionAst<'base>),
    /// `raise <expr>;` or `try <expr> catch <name> { ... }` used as a bare statement.
    Expression(ExpressionAst<'base>),
}

/// A block of sequentially-executed statements.
#[derive(Debug, PartialEq)]
pub struct BodyAst<'base> {
    pub statements: Vec<BodyStatementAst<'base>>,
}

/// Where a function definition was parsed from, for method resolution.
#[derive(Debug, PartialEq)]
pub enum FunctionDefinitionLocationAst<'base> {
    /// A method defined inside an object (class/record/enum object/...) body.
    Object(Span<'base>),
    /// A method provided by a trait implementation, naming the target type.
    Impl(Span<'base>),
    /// A standalone, module-level function.
    #[allow(dead_code)]
    Module,
}

/// A function (or method) definition.
///
/// ```lily
/// pub fun calculate(this, x: i32, y: i32): i32 {
///     return x + y;
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinitionAst<'base> {
    pub is_public: Option<Span<'base>>,
    pub name: Span<'base>,
    /// Generic parameter names from an optional `[T, U]` list after the function name.
    pub generics: Vec<Span<'base>>,
    pub arguments: Vec<FunctionArgumentAst<'base>>,
    pub arguments_span: Span<'base>,
    pub return_type: TypeNameAst<'base>,
    /// Optional `!ErrorType` effect annotation declaring what this function may raise.
    pub raises: Option<TypeNameAst<'base>>,
    pub body: Rc<BodyAst<'base>>,
    pub location: Rc<FunctionDefinitionLocationAst<'base>>,
    pub index: AstIndex,
}

/// Distinguishes a call on the current object (`this.method()`) from a direct
/// call (`obj.method()`, `module.function()`).
#[derive(Debug, PartialEq)]
pub enum FunctionCallType<'base> {
    This(Vec<Span<'base>>),
    Direct(Vec<Span<'base>>),
}

/// A function or method call expression.
#[derive(Debug, PartialEq)]
pub struct FunctionCallAst<'base> {
    pub call_span: Span<'base>,
    pub arguments_span: Span<'base>,
    pub path: FunctionCallType<'base>,
    pub arguments: Vec<ExpressionAst<'base>>,
}

impl FunctionCallType<'_> {
    pub fn is_this(&self) -> bool {
        matches!(self, FunctionCallType::This(_))
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, FunctionCallType::Direct(_))
    }

    pub fn call(&self) -> String {
        match self {
            FunctionCallType::This(path) => format!("this.{}", path.iter().map(|p| p.text).collect::<Vec<_>>().join(".")),
            FunctionCallType::Direct(path) => path.iter().map(|p| p.text).collect::<Vec<_>>().join("."),
        }
    }

    pub fn get_path(&self) -> &Vec<Span<'_>> {
        match self {
            FunctionCallType::This(path) => path,
            FunctionCallType::Direct(path) => path,
        }
    }
}

/// Function-reference path component used internally by the parser.
#[derive(Debug)]
pub enum FunctionCallPathAst<'base> {
    Ident(Span<'base>),
    TypeName(TypeNameAst<'base>),
}

/// A field declaration shared by objects, traits and trait implementations.
///
/// ```lily
/// name: string;
/// pub age: i32;
/// ```
#[derive(Debug, PartialEq)]
pub struct FieldAst<'base> {
    pub is_public: Option<Span<'base>>,
    pub name: Span<'base>,
    pub field_type: TypeNameAst<'base>,
}

/// Prefix unary operators.
///
/// `Not` is the logical/bitwise negation keyword `not`; `Neg` is arithmetic negation
/// `-`; `Deref`/`MakeRef`/`MakeRefMut` are pointer-style `*`/`&`/`&mut`; `Trace`/
/// `Untrace` construct or consume a reference-counted [`Trace`](crate::ast) value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Deref,
    MakeRef,
    MakeRefMut,
    Trace,
    Untrace,
}

/// All expression forms.
#[derive(Debug, PartialEq)]
pub enum ExpressionAst<'base> {
    Primitive {
        span: Span<'base>,
        value: PrimitiveValue<'base>,
    },
    Ref(RefAst<'base>),
    Unary {
        op: UnaryOp,
        expression: Box<ExpressionAst<'base>>,
    },
    Ident(Span<'base>),
    FunctionCall(FunctionCallAst<'base>),
    Operation {
        left: Box<ExpressionAst<'base>>,
        operator: ExpressionOperatorType,
        right: Box<ExpressionAst<'base>>,
    },
    /// `raise <expr>;` - an effectful non-local exit carrying an error value.
    Raise(Box<ExpressionAst<'base>>),
    /// `try <expr> catch <binding> { <body> }`.
    TryCatch(Box<TryCatchAst<'base>>),
}

/// `try <expr> catch <name> { <body> }` - runs `expression`; on a raise, binds the
/// raised value to `catch_name` and runs `catch_body` instead.
#[derive(Debug, PartialEq)]
pub struct TryCatchAst<'base> {
    pub expression: ExpressionAst<'base>,
    pub catch_name: Span<'base>,
    pub catch_body: BodyAst<'base>,
}

/// `if`/`else if`/`else` conditional statement.
#[derive(Debug, PartialEq)]
pub struct IfConditionAst<'base> {
    pub expression: ExpressionAst<'base>,
    pub true_body: BodyAst<'base>,
    pub else_ifs: Vec<(ExpressionAst<'base>, BodyAst<'base>)>,
    pub false_body: Option<BodyAst<'base>>,
}

/// A local `var`/`const` declaration, with optional type annotation and
/// initializer.
#[derive(Debug, PartialEq)]
pub struct VariableDefinitionAst<'base> {
    pub variable_definition_type: VariableDefinitionType,
    pub name: Span<'base>,
    pub expected_type: Option<TypeNameAst<'base>>,
    pub expression: Option<ExpressionAst<'base>>,
}

/// Assignment of a new value to an existing mutable binding.
#[derive(Debug, PartialEq)]
pub struct VariableAssignAst<'base> {
    pub name: Span<'base>,
    pub expression: ExpressionAst<'base>,
}
