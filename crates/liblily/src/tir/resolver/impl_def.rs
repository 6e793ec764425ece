//! Impl definition resolution for the Lily TIR system.
//!
//! This module handles the semantic analysis and validation of `impl` blocks,
//! which implement trait contracts for existing object types. Impls allow
//! adding new functionality to objects by satisfying trait requirements,
//! enabling a form of multiple inheritance and compositional design patterns.
//!
//! # Impl Resolution Process
//!
//! ## Phase 1: Target Resolution
//! 1. **Object identification**: Resolve the target object being implemented for
//! 2. **Trait resolution**: Resolve all trait contracts to implement
//! 3. **Scope preparation**: Access the object scope for member addition
//! 4. **Validation setup**: Prepare tracking structures for requirement validation
//!
//! ## Phase 2: Member Implementation
//! 1. **Field implementation**: Process field requirements from traits
//! 2. **Method implementation**: Process method requirements from traits
//! 3. **Type validation**: Ensure implementation types match trait contracts
//! 4. **Visibility validation**: Validate accessibility rules for impl fields
//!
//! ## Phase 3: Contract Validation
//! 1. **Requirement checking**: Ensure all trait requirements are satisfied
//! 2. **Type compatibility**: Validate implementation types match trait signatures
//! 3. **Completeness validation**: Ensure no trait requirements are missing
//! 4. **Extra member validation**: Detect and report unsupported extra members
//!
//! # Impl Types
//!
//! - **Single trait**: `impl Trait for Object { ... }`
//! - **Multiple traits**: one `impl` block per trait, repeated for the same object
//! - **Hierarchical traits**: support for traits that extend other traits via `base_traits`
//!
//! # Validation Rules
//!
//! - **Complete implementation**: all trait members must be implemented
//! - **Type compatibility**: implementation types must match trait signatures exactly
//! - **Impl fields are public**: fields in impl blocks are implicitly public, `pub` is an error
//!
//! # Type System Integration
//!
//! Impls modify the target object by adding fields/methods to its field map and
//! recording the implemented trait in the object's `implements` set, making the
//! trait type compatible with the object type for type-checking purposes.

use core::panic;
use std::{borrow::Cow, collections::HashSet};

use indexmap::IndexMap;

use crate::{
    ast::{ImplDefinitionAst, ImplDefinitionFieldAst}, map::LilyHashMap, nom_tools::{Span, ToRange}, tir::{context::TirContext, module::ModuleRef, object_signature::TypeValue, resolver::{build_type_name, get_object_location_or_resolve, try_resolve_signature}, scope::{ScopeLocation, TypeVariableInformation}, TirError}
};

use super::{ResolveAst, TypeLocation};

impl<'base> ResolveAst<'base> for ImplDefinitionAst<'base> {
    fn resolve(&self, context: &mut TirContext<'base>, scope_location: ScopeLocation) -> Result<TypeLocation, TirError> {
        simplelog::debug!("Resolving impl: <u><b>{}</b></u>", self.target.names.first().unwrap().text);

        let mut impl_fields = LilyHashMap::<'base, Cow<'_, str>, TypeVariableInformation<'base>>::default();
        let mut impl_fields_for_track = IndexMap::<Cow<'_, str>, Span<'base>>::default();

        let module_ref = context.get_scope(scope_location).unwrap().module_ref.clone();
        let object_location = get_object_location_or_resolve(context, &self.target, &module_ref, scope_location)?;

        let object_name = context.types.get_from_location(object_location).unwrap().value.get_name();
        let object_name = format!("{}.{}", module_ref.as_ref(), object_name);
        let object_scope = *context.types_scope.get(object_name.as_str()).unwrap();

        self.resolve_fields(context, object_name.as_str(), object_scope, &module_ref, &mut impl_fields, &mut impl_fields_for_track, object_location)?;
        self.resolve_traits(context, object_scope, &module_ref, &impl_fields, &mut impl_fields_for_track)?;

        /* Validate */
        if !impl_fields_for_track.is_empty() {
            for (_, span) in impl_fields_for_track.into_iter() {
                context.add_error(TirError::extra_field_in_impl(span.to_range(), span.state.file));
            }

            return Err(TirError::TemporaryError);
        }

        let object_binding = context.types.get_mut_from_location(object_location);
        let object = match object_binding {
            Some(signature) => match signature.value.as_mut() {
                TypeValue::Object(object) => object,
                _ => return Err(TirError::invalid_type(self.target.to_range(), "only object type is valid", self.target.names.first().unwrap().state.file.clone())),
            },
            None => return Err(TirError::type_not_found(context, self.target.to_string(), self.target.to_range(), self.target.names.first().unwrap().state.file.clone())),
        };

        for (key, argument) in impl_fields.iter() {
            object.fields.validate_insert(key.clone(), argument.clone())?;
        }

        let object_scope = context.get_mut_scope(object_scope).expect("Scope not found, it is a bug");
        for (_, argument) in impl_fields.into_iter() {
            object_scope.add_variable(argument)?;
        }

        Ok(TypeLocation::UNDEFINED)
    }

    fn finish(&self, _: &mut TirContext<'base>, _: ScopeLocation) -> Result<(), TirError> { Ok(()) }

    fn name(&self) -> Cow<'base, str> {
        let name = self.target.names.first().unwrap().text;
        let traits = self.target_traits
            .iter()
            .map(|item| build_type_name(item))
            .collect::<Vec<_>>()
            .join("-");

        format!("{name}-{traits}").into()
    }
}

impl<'base> ImplDefinitionAst<'base> {
    #[allow(clippy::too_many_arguments)]
    fn resolve_fields(&self, context: &mut TirContext<'base>, object_name: &str, object_scope_location: ScopeLocation, module: &ModuleRef<'base>, impl_fields: &mut LilyHashMap<'base, Cow<'base, str>, TypeVariableInformation<'base>>, impl_fields_for_track: &mut IndexMap<Cow<'base, str>, Span<'base>>, _: TypeLocation) -> Result<(), TirError> {
        for field in self.fields.iter() {
            match field {
                ImplDefinitionFieldAst::Method(function) => {
                    let full_name = format!("{}::{}", object_name, function.name());
                    let child_scope_location = context.create_child_scope(full_name.into(), object_scope_location, None);
                    let object_type_location = function.resolve(context, child_scope_location)?;
                    let variable = TypeVariableInformation::basic(function.name.clone(), object_type_location);

                    impl_fields.validate_insert((function.name.text).into(), variable)?;
                    impl_fields_for_track.insert((function.name.text).into(), function.name.clone());
                }
                ImplDefinitionFieldAst::Field(field) => {
                    if field.is_public.is_some() {
                        return Err(TirError::extra_accessibility_identifier(field.is_public.as_ref().unwrap().to_range(), field.name.state.file.clone()));
                    }

                    let field_type = get_object_location_or_resolve(context, &field.field_type, module, object_scope_location)?;
                    let variable = TypeVariableInformation::basic(field.name.clone(), field_type);

                    impl_fields.validate_insert((field.name.text).into(), variable)?;
                    impl_fields_for_track.insert((field.name.text).into(), field.name.clone());
                }
            };
        }

        Ok(())
    }

    fn resolve_traits(&self, context: &mut TirContext<'base>, object_scope_location: ScopeLocation, module: &ModuleRef<'base>, impl_fields: &LilyHashMap<'base, Cow<'base, str>, TypeVariableInformation<'base>>, impl_fields_for_track: &mut IndexMap<Cow<'base, str>, Span<'base>>) -> Result<(), TirError> {
        let mut errors = Vec::new();
        let mut implements = HashSet::new();

        for trait_ast in self.target_traits.iter() {
            let type_name = build_type_name(trait_ast);
            let trait_signature = try_resolve_signature(context, module, object_scope_location, type_name.as_str())?;
            let trait_signature = match trait_signature {
                Some(trait_signature) => trait_signature,
                None => {
                    errors.push(TirError::type_not_found(context, trait_ast.to_string(), trait_ast.to_range(), trait_ast.names.last().unwrap().state.file.clone()));
                    continue;
                }
            };

            implements.insert(trait_signature);
            let trait_def = if let Some(signature) = context.types.get_from_location(trait_signature) {
                match signature.value.as_ref() {
                    TypeValue::Trait(trait_def) => trait_def,
                    _ => {
                        errors.push(TirError::invalid_type(trait_ast.to_range(), "only trait type is valid", trait_ast.names.last().unwrap().state.file.clone()));
                        continue;
                    },
                }
            } else {
                errors.push(TirError::type_not_found(context, trait_ast.to_string(), trait_ast.to_range(), trait_ast.names.last().unwrap().state.file.clone()));
                continue;
            };

            for trait_field in trait_def.fields.iter() {
                let impl_field = match impl_fields.get(trait_field.0.text) {
                    Some(defined_field) => defined_field,

                    // Field not defined in the impl
                    None => {
                        errors.push(TirError::trait_field_not_defined(self.target.to_range(), self.target.names.last().unwrap().state.file.clone()));
                        continue;
                    }
                };

                // Check if the field type is the same
                let defined_field_type = match context.types.get_from_location(impl_field.location) {
                    Some(field_type) => field_type,
                    None => {
                        errors.push(TirError::type_not_found(context, trait_ast.to_string(), trait_ast.to_range(), trait_ast.names.last().unwrap().state.file.clone()));
                        continue;
                    }
                };

                let trait_field_type = match context.types.get_from_location(trait_field.1.location) {
                    Some(field_type) => field_type,
                    None => {
                        errors.push(TirError::type_not_found(context, trait_ast.to_string(), trait_ast.to_range(), trait_ast.names.last().unwrap().state.file.clone()));
                        continue;
                    }
                };

                if !defined_field_type.value.is_same_type(context, &trait_field_type.value) {
                    errors.push(TirError::types_do_not_match(trait_field.0.to_range(), trait_field.0.state.file.clone()));
                }
                else {
                    impl_fields_for_track.swap_remove(trait_field.0.text);
                }
            }
        }

        // Copy all impl informations to object
        let object_type_location = context.get_scope(object_scope_location).unwrap().current_type;
        let object_signature = context.types.get_mut_from_location(object_type_location).unwrap();

        let object = match object_signature.value.as_mut() {
           TypeValue::Object(object) => object,
            _ => panic!("Expected object type")
        };
        object.implements.extend(&mut implements.into_iter());

        if !errors.is_empty() {
            context.add_errors(errors);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{file::SourceFile, nom_tools::State, process_code, tir::{object_signature::TypeValue, TirError}};

    #[test]
    fn empty_trait() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait ITest {}
impl ITest for TestClass {}
class TestClass {}
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }

    #[test]
    fn dublicate_field_1() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait ITest { a: TestClass; }
impl ITest for TestClass { a: TestClass; }
class TestClass { a: TestClass; }
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap_err();
        Ok(())
    }

    #[test]
    fn dublicate_field_2() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait ITest { fun test(): TestClass; }
impl ITest for TestClass { fun test(): TestClass { } }
class TestClass { fun test(): TestClass { } }
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap_err();
        Ok(())
    }

    #[test]
    fn impl_fields() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait ITest { fun test(): TestClass; a: TestClass; }
impl ITest for TestClass { fun test(): TestClass { } a: TestClass; }
class TestClass { }
    "#.to_string()));
        let ast = process_code(&state)?;
        let context = crate::tir::build(vec![ast.into()]).unwrap();

        let testclass = context.types.get("source.TestClass").unwrap();
        if let TypeValue::Object(object) = testclass.value.as_ref() {
            assert_eq!(object.fields.len(), 2);
            let field1 = context.types.get_from_location(object.fields.get("test").unwrap().location).unwrap();
            let field2 = context.types.get_from_location(object.fields.get("a").unwrap().location).unwrap();

            if let TypeValue::Function(function) = field1.value.as_ref() {
                assert_eq!(function.name.text, "test");
                assert_eq!(function.arguments.len(), 0);
            } else {
                panic!("Expected TypeValue::Function but got {:?}", field1.value);
            }

            if let TypeValue::Object(field) = field2.value.as_ref() {
                assert_eq!(field.name.text, "TestClass");
            } else {
                panic!("Expected TypeValue::Object but got {:?}", field2.value);
            }
        } else {
            panic!("Expected TypeValue::Object but got {:?}", testclass.value);
        }
        Ok(())
    }

    #[test]
    fn missing_definition() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait ITest { fun test(): TestClass; a: TestClass; }
impl ITest for TestClass { fun test(): TestClass { } }
class TestClass { }
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap_err();
        Ok(())
    }

    #[test]
    fn trait_and_impl_informations_different_1() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait ITest { fun test(): TestClass; }
impl ITest for TestClass { fun test(a: TestClass): TestClass { } }
class TestClass { }
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap_err();
        Ok(())
    }

    #[test]
    fn trait_and_impl_informations_different_2() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait ITest { fun test(): TestClass; }
impl ITest for TestClass { fun test(): TmpClass { } }
class TestClass { }
class TmpClass { }
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap_err();
        Ok(())
    }

    #[test]
    fn pass_object_to_trait_variable() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait ITest {
    fun hello(): string;
}

impl ITest for TestClass {
    fun hello(): string { }
}

class TestClass {
    fun call(this): string {
        echo(this);
    }
}

fun echo(a: ITest): string {
}
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }

    #[test]
    fn pass_object_to_trait_variable_2() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait ITest {
    fun hello(): string;
}

impl ITest for TestClass {
    fun hello(): string { }
}

class TestClass {
    fun call(this): string {
        echo1(this);
        echo2(this);
    }
}

fun echo1(a: ITest): string {
    echo2(a);
}

fun echo2(a: ITest): string {
}
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }

    #[test]
    fn pass_wrong_object_to_trait_variable() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait ITest {
    fun hello(): string;
}

trait ITest2 {
    fun hello(): string;
}

impl ITest for TestClass {
    fun hello(): string { }
}

class TestClass {
    fun call(this): string {
        echo(this);
    }
}

fun echo(a: ITest2): string {
}
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap_err();
        Ok(())
    }

    #[test]
    fn multiple_trait_validation_1() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait Trait1 { fun hello(): TestClass; }
trait Trait2 { fun world(): TestClass; }

impl Trait1 for TestClass { fun hello(): TestClass { } }
impl Trait2 for TestClass { fun world(): TestClass { } }

class TestClass { }
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }

    #[test]
    fn multiple_trait_validation_2() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait Trait1 { fun hello(): TestClass; }
trait Trait2 { fun world(): TestClass; }

impl Trait1, Trait2 for TestClass { fun hello(): TestClass { } fun world(): TestClass { } }

class TestClass { }
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }

    #[test]
    fn multiple_trait_missing_field() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait Trait1 { fun hello(): TestClass; }
trait Trait2 { fun world(): TestClass; }

impl Trait1 for TestClass { fun hello(): TestClass { } }

class TestClass { }
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap_err();
        Ok(())
    }

    #[test]
    fn multiple_trait_validation_3() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait Trait2 { fun world(): TestClass; }
trait Trait1: Trait2 { fun hello(): TestClass; }

impl Trait1 for TestClass { fun hello(): TestClass { } fun world(): TestClass { } }

class TestClass { }
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }

    #[test]
    fn multiple_trait_validation_4() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait Trait1 { fun hello(): TestClass; }

impl Trait1 for TestClass { fun hello(): TestClass { } fun world(): TestClass { } }

class TestClass { }
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap_err();
        Ok(())
    }

    #[test]
    fn multiple_trait_validation_5() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait Trait3 { fun test(): TestClass; }
trait Trait2 { fun world(): TestClass; }
trait Trait1: Trait2, Trait3 { fun hello(): TestClass; }

impl Trait1 for TestClass { fun hello(): TestClass { } fun world(): TestClass { } fun test(): TestClass { } }

class TestClass { }
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }

    #[test]
    fn multiple_trait_validation_6() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait Trait3 { fun test(): TestClass; }
trait Trait2: Trait3 { fun world(): TestClass; }
trait Trait1: Trait2 { fun hello(): TestClass; }

impl Trait1 for TestClass { fun hello(): TestClass { } fun world(): TestClass { } fun test(): TestClass { } }

class TestClass { }
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }

    #[test]
    fn multiple_trait_validation_7() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait Trait3 { fun test(): TestClass; }
trait Trait2: Trait3 { fun world(): TestClass; }
trait Trait1: Trait2, Trait3 { fun hello(): TestClass; }

impl Trait1 for TestClass { fun hello(): TestClass { } fun world(): TestClass { } fun test(): TestClass { } }

class TestClass { }
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }
}
