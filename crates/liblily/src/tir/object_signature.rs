//! Type system and object signatures for the Lily language compiler.
//!
//! This module defines the core type representations used throughout the TIR
//! (Type Intermediate Representation) phase of compilation.
//!
//! # Type System Overview
//!
//! ## Primitive Types
//! - **Integers**: `i8`, `u8`, `i16`, `u16`, `i32`, `u32`, `i64`, `u64`
//! - **Floating-point**: `float` (32-bit), `double` (64-bit)
//! - **Boolean**: `bool` with `true`/`false` values
//! - **String**: UTF-8 text with `string` type
//! - **Void**: Unit type for functions with no return value
//!
//! ## Complex Types
//! - **Objects**: `class`/`record`/`enum`/`enum object`/`record object` definitions
//! - **Traits**: Contract definitions that objects implement via `impl`
//! - **Functions**: First-class function types with signatures
//! - **Modules**: Namespace containers for organizing code
//! - **Constants**: Module-level named values
//! - **Errors**: Tagged error-set types
//! - **References**: Pointer types using `ref` keyword
//!
//! Types are represented using the [`TypeValue`] enum which encompasses all possible
//! type variants. The [`GetItem`] trait provides a uniform interface for looking up
//! members within types, enabling field access and method resolution across all
//! type categories.

use std::{borrow::Cow, fmt::Debug};

use strum_macros::{EnumDiscriminants, EnumIs};

use crate::tir::{module::ModuleRef, resolver::TypeLocation};

use super::{resolver::{object::ObjectDefinition, function::FunctionDefinition, trait_def::{TraitDefinition, TraitFunctionDefinition}}, TirContext};

/// Enumeration of primitive data types in the Lily language
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveType {
    /// UTF-8 string type
    String,
    /// Boolean type with true/false values
    Bool,
    /// 8-bit signed integer (-128 to 127)
    I8,
    /// 8-bit unsigned integer (0 to 255)
    U8,
    /// 16-bit signed integer (-32,768 to 32,767)
    I16,
    /// 16-bit unsigned integer (0 to 65,535)
    U16,
    /// 32-bit signed integer (-2^31 to 2^31-1)
    I32,
    /// 32-bit unsigned integer (0 to 2^32-1)
    U32,
    /// 64-bit signed integer (-2^63 to 2^63-1)
    I64,
    /// 64-bit unsigned integer (0 to 2^64-1)
    U64,
    /// 32-bit floating-point number
    Float,
    /// 64-bit floating-point number
    Double,
    /// Unit type representing no value
    Void,
}

impl GetItem for PrimitiveType {
    fn get_item_location(&self, _: &TirContext<'_>, _: &str) -> Option<TypeLocation> {
        None
    }
}

/// A resolved constant: its name, declared/inferred type, and defining location.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub struct ConstantDefinition<'base> {
    pub name: crate::nom_tools::Span<'base>,
    pub constant_type: TypeLocation,
}

impl GetItem for ConstantDefinition<'_> {
    fn get_item_location(&self, _: &TirContext<'_>, _: &str) -> Option<TypeLocation> {
        None
    }
}

/// A resolved error set: its name and ordered list of tagged variants.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub struct ErrorDefinition<'base> {
    pub name: crate::nom_tools::Span<'base>,
    pub variants: Vec<Cow<'base, str>>,
}

impl GetItem for ErrorDefinition<'_> {
    fn get_item_location(&self, _: &TirContext<'_>, _: &str) -> Option<TypeLocation> {
        None
    }
}

/// Comprehensive enumeration of all possible type values in the Lily type system
///
/// This enum represents the complete universe of types that can exist in Lily programs.
/// It serves as the central type representation used throughout semantic analysis,
/// type checking, and code generation phases.
///
/// `Alias` declarations do not get their own variant: an alias resolves transparently
/// by registering its name against the target's existing `TypeLocation`.
#[derive(Debug, Clone, EnumIs, EnumDiscriminants, PartialEq)]
#[strum_discriminants(vis(pub))]
pub enum TypeValue<'base> {
    /// A primitive type (integers, floats, bool, string, void)
    #[allow(dead_code)]
    PrimitiveType(PrimitiveType),

    /// A function type with complete signature information
    #[allow(dead_code)]
    Function(Box<FunctionDefinition<'base>>),

    /// An object type (class/record/enum/...) with fields, methods, and implemented traits
    #[allow(dead_code)]
    Object(ObjectDefinition<'base>),

    /// A module type representing a namespace container
    #[allow(dead_code)]
    Module(ModuleRef<'base>),

    /// A trait type defining a contract for implementations
    #[allow(dead_code)]
    Trait(TraitDefinition<'base>),

    /// A function signature defined within a trait
    #[allow(dead_code)]
    TraitFunction(TraitFunctionDefinition<'base>),

    /// A module-level constant
    #[allow(dead_code)]
    Constant(ConstantDefinition<'base>),

    /// An error set type
    #[allow(dead_code)]
    Error(ErrorDefinition<'base>),

    /// A reference type that points to another type
    #[allow(dead_code)]
    Reference(Box<TypeValue<'base>>),
}

impl<'base> AsRef<TypeValue<'base>> for TypeValue<'base> {
    fn as_ref(&self) -> &TypeValue<'base> {
        self
    }
}

impl<'base> AsMut<TypeValue<'base>> for TypeValue<'base> {
    fn as_mut(&mut self) -> &mut TypeValue<'base> {
        self
    }
}

/// Trait for types that can provide member lookup functionality
///
/// This trait enables uniform member access across all type categories in the
/// Lily type system. It allows looking up fields, methods, and other members
/// within types using string-based paths.
pub trait GetItem {
    /// Attempts to find a member with the given name within this type
    fn get_item_location(&self, context: &TirContext<'_>, path: &str) -> Option<TypeLocation>;
}

impl GetItem for TypeValue<'_> {
    fn get_item_location(&self, context: &TirContext<'_>, path: &str) -> Option<TypeLocation> {
        match self {
            TypeValue::PrimitiveType(primitive_type) => primitive_type.get_item_location(context, path),
            TypeValue::Function(function_definition) => function_definition.get_item_location(context, path),
            TypeValue::Object(object_definition) => object_definition.get_item_location(context, path),
            TypeValue::Module(module_ref) => module_ref.get_item_location(context, path),
            TypeValue::Trait(trait_definition) => trait_definition.get_item_location(context, path),
            TypeValue::TraitFunction(trait_function_definition) => trait_function_definition.get_item_location(context, path),
            TypeValue::Constant(constant_definition) => constant_definition.get_item_location(context, path),
            TypeValue::Error(error_definition) => error_definition.get_item_location(context, path),
            TypeValue::Reference(reference) => reference.get_item_location(context, path),
        }
    }
}
impl TypeValue<'_> {
    /// Determines if two type values represent the same type
    ///
    /// # Type Compatibility Rules
    /// - **Primitives**: Exact primitive type match required
    /// - **Functions**: Signature compatibility (parameters and return type)
    /// - **Objects**: Identity comparison
    /// - **Traits**: Full name comparison
    /// - **Trait-Object**: Compatibility when object implements trait via `impl`
    /// - **Trait-Function**: Signature compatibility checking
    /// - **Modules**: Always considered incompatible (no two modules are the same type)
    pub fn is_same_type(&self, context: &TirContext<'_>, other: &Self) -> bool {
        match (self, other) {
            (TypeValue::PrimitiveType(left), TypeValue::PrimitiveType(right)) => Self::compare_primitive_types(left, right),
            (TypeValue::Function(left_function), TypeValue::Function(right_function)) => Self::compare_functions(left_function, right_function),
            (TypeValue::Object(left_object), TypeValue::Object(right_object)) => Self::compare_objects(left_object, right_object),
            (TypeValue::Module(_), TypeValue::Module(_)) => false,
            (TypeValue::TraitFunction(trait_function), TypeValue::Function(function)) => Self::compare_trait_function_and_function(trait_function, function),
            (TypeValue::Function(function), TypeValue::TraitFunction(trait_function)) => Self::compare_trait_function_and_function(trait_function, function),
            (TypeValue::TraitFunction(left_function), TypeValue::TraitFunction(right_function)) => Self::compare_trait_functions(left_function, right_function),
            (TypeValue::Trait(trait_value), TypeValue::Object(object)) => Self::compare_trait_and_object(context, trait_value, object),
            (TypeValue::Trait(left), TypeValue::Trait(right)) => left.full_name == right.full_name,
            _ => false,
        }
    }

    /// Returns the display name for this type value
    pub fn get_name(&self) -> Cow<'_, str> {
        match self {
            TypeValue::PrimitiveType(primitive) => match primitive {
                PrimitiveType::String => "String".into(),
                PrimitiveType::Bool => "Bool".into(),
                PrimitiveType::I8 => "I8".into(),
                PrimitiveType::U8 => "U8".into(),
                PrimitiveType::I16 => "I16".into(),
                PrimitiveType::U16 => "U16".into(),
                PrimitiveType::I32 => "I32".into(),
                PrimitiveType::U32 => "U32".into(),
                PrimitiveType::I64 => "I64".into(),
                PrimitiveType::U64 => "U64".into(),
                PrimitiveType::Float => "Float".into(),
                PrimitiveType::Double => "Double".into(),
                PrimitiveType::Void => "Void".into(),
            },
            TypeValue::Function(function) => function.name.text.into(),
            TypeValue::Object(object) => object.name.text.into(),
            TypeValue::Module(_) => "Module".into(),
            TypeValue::Trait(trait_value) => trait_value.name.text.into(),
            TypeValue::TraitFunction(trait_function) => trait_function.name.text.into(),
            TypeValue::Constant(constant) => constant.name.text.into(),
            TypeValue::Error(error) => error.name.text.into(),
            TypeValue::Reference(reference) => format!("ref {}", reference.get_name()).into()
        }
    }

    fn compare_primitive_types(left: &PrimitiveType, right: &PrimitiveType) -> bool {
        std::ptr::eq(left, right)
    }

    fn compare_objects(left: &ObjectDefinition, right: &ObjectDefinition) -> bool {
        std::ptr::eq(left, right)
    }

    fn compare_trait_functions(left: &TraitFunctionDefinition, right: &TraitFunctionDefinition) -> bool {
        if left.name.text != right.name.text ||
            left.arguments.len() != right.arguments.len() ||
            left.return_type != right.return_type {
            return false;
        }

        for (left_arg, right_arg) in left.arguments.iter().zip(right.arguments.iter()) {
            if left_arg.name.text != right_arg.name.text || left_arg.field_type != right_arg.field_type {
                return false;
            }
        }

        true
    }

    fn compare_trait_and_object(context: &TirContext<'_>, trait_value: &TraitDefinition, object: &ObjectDefinition) -> bool {
        for type_location in object.implements.iter() {
            if let Some(TypeValue::Trait(object_trait)) = context.types.get_from_location(*type_location).map(|signature| signature.value.as_ref()) {
                if object_trait.full_name == trait_value.full_name {
                    return true;
                }
            }
        }

        false
    }

    fn compare_trait_function_and_function(left: &TraitFunctionDefinition, right: &FunctionDefinition) -> bool {
        if left.name.text != right.name.text ||
            left.arguments.len() != right.arguments.len() ||
            left.return_type != right.return_type {
            return false;
        }

        for (left_arg, right_arg) in left.arguments.iter().zip(right.arguments.iter()) {
            if left_arg.name.text != right_arg.name.text || left_arg.field_type != right_arg.field_type {
                return false;
            }
        }

        true
    }

    fn compare_functions(left: &FunctionDefinition, right: &FunctionDefinition) -> bool {
        if left.name.text != right.name.text ||
            left.arguments.len() != right.arguments.len() ||
            left.return_type != right.return_type ||
            left.is_public != right.is_public {
            return false;
        }

        for (left_arg, right_arg) in left.arguments.iter().zip(right.arguments.iter()) {
            if left_arg.name.text != right_arg.name.text || left_arg.field_type != right_arg.field_type {
                return false;
            }
        }

        true
    }
}
