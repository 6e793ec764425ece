//! File AST utility methods and display implementations.
//!
//! This module provides utility methods for the `FileAst` structure, which represents
//! a complete parsed Lily source file. It includes iterators for extracting different
//! types of declarations (objects, traits, impls, functions, constants, errors,
//! aliases, uses) and display implementations for formatting the AST back to source
//! code.
//!
//! # File Structure
//!
//! A Lily file can contain the following top-level declarations:
//! - **Use statements**: Import declarations for accessing external modules
//! - **Object definitions**: `class`/`record`/`enum`/`enum object`/`record object`
//! - **Trait definitions**: Contract specifications for implementing types
//! - **Impl definitions**: Trait implementations for a given type
//! - **Function definitions**: Standalone function declarations
//! - **Constant definitions**: Module-level constant values
//! - **Error definitions**: Error sets
//! - **Alias definitions**: Type aliases
//!
//! # Iterator Methods
//!
//! The module provides convenient iterator methods for filtering file statements by type:
//! - `get_uses()`: Returns all use/import statements
//! - `get_objects()`: Returns all object definitions
//! - `get_functions()`: Returns all standalone function definitions
//! - `get_traits()`: Returns all trait definitions
//! - `get_impls()`: Returns all impl definitions
//! - `get_constants()`: Returns all constant definitions
//! - `get_errors()`: Returns all error definitions
//! - `get_aliases()`: Returns all alias definitions
//!
//! These methods return iterators that yield `Rc<T>` references to the respective AST nodes,
//! allowing efficient shared access to the parsed declarations.

use std::{fmt::{Display, Formatter}, rc::Rc};

use crate::ast::{AliasDefinitionAst, ConstantDefinitionAst, ErrorDefinitionAst, FileAst, FileStatementAst, FunctionDefinitionAst, ImplDefinitionAst, ObjectDefinitionAst, TraitDefinitionAst, UseAst};

impl<'base> FileAst<'base> {
    /// Returns an iterator over all use/import statements in the file
    pub fn get_uses(&self) -> impl Iterator<Item = Rc<UseAst<'base>>> {
        self.statements
            .iter()
            .filter_map(|statement| {
                if let FileStatementAst::Use(import) = statement {
                    Some(import.clone())
                } else {
                    None
                }
            })
    }

    /// Returns an iterator over all object definitions in the file
    ///
    /// Covers `class`, `record`, `enum`, `enum object` and `record object`
    /// declarations alike; use `ObjectDefinitionAst::kind` to discriminate.
    pub fn get_objects(&self) -> impl Iterator<Item = Rc<ObjectDefinitionAst<'base>>> {
        self.statements
            .iter()
            .filter_map(|statement| {
                if let FileStatementAst::Object(object) = statement {
                    Some(object.clone())
                } else {
                    None
                }
            })
    }

    /// Returns an iterator over all standalone function definitions in the file
    ///
    /// This excludes methods that are part of object or impl definitions.
    pub fn get_functions(&self) -> impl Iterator<Item = Rc<FunctionDefinitionAst<'base>>> {
        self.statements
            .iter()
            .filter_map(|statement| {
                if let FileStatementAst::Function(func) = statement {
                    Some(func.clone())
                } else {
                    None
                }
            })
    }

    /// Returns an iterator over all trait definitions in the file
    pub fn get_traits(&self) -> impl Iterator<Item = Rc<TraitDefinitionAst<'base>>> {
        self.statements
            .iter()
            .filter_map(|statement| {
                if let FileStatementAst::Trait(r#trait) = statement {
                    Some(r#trait.clone())
                } else {
                    None
                }
            })
    }

    /// Returns an iterator over all impl definitions in the file
    pub fn get_impls(&self) -> impl Iterator<Item = Rc<ImplDefinitionAst<'base>>> {
        self.statements
            .iter()
            .filter_map(|statement| {
                if let FileStatementAst::Impl(r#impl) = statement {
                    Some(r#impl.clone())
                } else {
                    None
                }
            })
    }

    /// Returns an iterator over all constant definitions in the file
    pub fn get_constants(&self) -> impl Iterator<Item = Rc<ConstantDefinitionAst<'base>>> {
        self.statements
            .iter()
            .filter_map(|statement| {
                if let FileStatementAst::Constant(constant) = statement {
                    Some(constant.clone())
                } else {
                    None
                }
            })
    }

    /// Returns an iterator over all error definitions in the file
    pub fn get_errors(&self) -> impl Iterator<Item = Rc<ErrorDefinitionAst<'base>>> {
        self.statements
            .iter()
            .filter_map(|statement| {
                if let FileStatementAst::Error(error) = statement {
                    Some(error.clone())
                } else {
                    None
                }
            })
    }

    /// Returns an iterator over all alias definitions in the file
    pub fn get_aliases(&self) -> impl Iterator<Item = Rc<AliasDefinitionAst<'base>>> {
        self.statements
            .iter()
            .filter_map(|statement| {
                if let FileStatementAst::Alias(alias) = statement {
                    Some(alias.clone())
                } else {
                    None
                }
            })
    }
}

impl Display for FileAst<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, statement) in self.statements.iter().enumerate() {
            write!(f, "{statement}")?;
            if index < self.statements.len() - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl Display for FileStatementAst<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatementAst::Object(object) => write!(f, "{object}"),
            FileStatementAst::Function(function) => write!(f, "{function}"),
            FileStatementAst::Trait(r#trait) => write!(f, "{trait}"),
            FileStatementAst::Impl(r#impl) => write!(f, "{impl}"),
            FileStatementAst::Constant(constant) => write!(f, "{constant}"),
            FileStatementAst::Error(error) => write!(f, "{error}"),
            FileStatementAst::Alias(alias) => write!(f, "{alias}"),
            FileStatementAst::Use(import) => write!(f, "{import}"),
        }
    }
}
