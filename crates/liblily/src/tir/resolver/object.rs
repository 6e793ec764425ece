//! Object definition resolution for the Lily TIR system.
//!
//! This module handles the semantic analysis and type registration of object
//! definitions (`class`, `record`, `enum`, `enum object`, `record object`) within
//! the Lily Type Intermediate Representation (TIR). It resolves field types,
//! manages method signatures, and integrates objects into the type system for
//! use by other compilation phases.
//!
//! # Resolution Process
//!
//! ## Phase 1: Registration
//! 1. **Name resolution**: Build the fully qualified object name
//! 2. **Type reservation**: Reserve a location in the type system
//! 3. **Scope creation**: Establish the object's scope for member resolution
//!
//! ## Phase 2: Member Resolution
//! 1. **Field processing**: Resolve field types and validate uniqueness
//! 2. **Method processing**: Resolve method signatures and create function scopes
//! 3. **Variant processing**: For `enum`/`enum object`/`record object`, resolve
//!    each variant's payload types
//!
//! ## Phase 3: Finalization
//! Method bodies are completed in the finish phase; `impl` blocks later extend
//! the object's field map with trait-satisfying members.

use std::{borrow::Cow, collections::HashSet, rc::Rc};

use crate::{
    ast::{ObjectDefinitionAst, ObjectDefinitionFieldAst}, map::LilyHashMap, nom_tools::{Span, ToRange}, tir::{context::TirContext, object_signature::{GetItem, TypeValue, TypeValueDiscriminants}, resolver::{get_object_location_or_resolve, BuildFullNameLocater}, scope::{ScopeLocation, TypeVariableInformation, VariableInformation}, signature::SignaturePath, TirError, TypeSignature}
};

use crate::ast::ObjectKind;

use super::{TypeLocation, ResolveAst};

#[derive(Debug)]
#[allow(dead_code)]
pub struct ObjectArgument<'base> {
    pub name: Span<'base>,
    pub field_type: Rc<TypeSignature<'base>>,
}

/// A resolved object type: its shape (`kind`), fields/methods, and the traits
/// it implements (populated by `impl` resolution).
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct ObjectDefinition<'base> {
    pub name: Span<'base>,
    pub kind: ObjectKind,
    pub fields: LilyHashMap<'base, Cow<'base, str>, TypeVariableInformation<'base>>,
    pub implements: HashSet<TypeLocation>,
}

impl PartialEq for ObjectDefinition<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl GetItem for ObjectDefinition<'_> {
    fn get_item_location(&self, _: &TirContext<'_>, path: &str) -> Option<TypeLocation> {
        self
            .fields
            .get(path)
            .map(|item| item.location)
    }
}

impl<'base> ResolveAst<'base> for ObjectDefinitionAst<'base> {
    fn resolve(&self, context: &mut TirContext<'base>, scope_location: ScopeLocation) -> Result<TypeLocation, TirError> {
        simplelog::debug!("Resolving object: <u><b>{}</b></u>", self.name.text);

        let full_name = self.build_full_name(context, BuildFullNameLocater::Scope(scope_location), None);
        let module_ref = context.get_scope(scope_location).expect("Scope not found").module_ref.clone();

        let (signature_path, object_location) = context.reserve_object_location(self.name(), TypeValueDiscriminants::Object, SignaturePath::owned(full_name), &module_ref, self.name.to_range(), self.name.state.file.clone())?;
        let mut fields = LilyHashMap::<'base, Cow<'_, str>, TypeVariableInformation<'base>>::default();

        context.get_mut_scope(scope_location).expect("Scope not found, it is a bug").set_current_type(object_location);

        for field in self.fields.iter() {
            match field {
                ObjectDefinitionFieldAst::Field(field) => {
                    let field_type = get_object_location_or_resolve(context, &field.field_type, &module_ref, scope_location)?;

                    let variable = TypeVariableInformation::basic(field.name.clone(), field_type);
                    fields.validate_insert(Cow::Borrowed(field.name.text), variable)?;
                    context.get_mut_scope(scope_location).expect("Scope not found, it is a bug").add_variable(VariableInformation::basic(field.name.clone(), field_type))?;
                }
                ObjectDefinitionFieldAst::Method(function) => {
                    let type_name = function.build_full_name(context, BuildFullNameLocater::Module(&module_ref), None);

                    let function_scope_location = context.create_child_scope(type_name.into(), scope_location, None);
                    let function_type_location = function.resolve(context, function_scope_location)?;

                    context.get_mut_scope(function_scope_location).expect("Scope not found, it is a bug").set_current_type(function_type_location);

                    let variable = TypeVariableInformation::basic(function.name.clone(), function_type_location);
                    fields.validate_insert((*function.name.text).into(), variable)?;
                    context.get_mut_scope(scope_location).expect("Scope not found, it is a bug").add_variable(VariableInformation::basic(function.name.clone(), function_type_location))?;
                }
            };
        }

        for variant in self.variants.iter() {
            for payload_type in variant.payload.iter() {
                get_object_location_or_resolve(context, payload_type, &module_ref, scope_location)?;
            }
        }

        let object_signature = TypeSignature::new(TypeValue::Object(ObjectDefinition {
            name: self.name.clone(),
            kind: self.kind,
            fields,
            implements: Default::default(),
        }), self.name.state.file.clone(), self.name.to_range(), None);

        context.publish_object_location(signature_path.clone(), object_signature);

        Ok(object_location)
    }

    fn finish(&self, context: &mut TirContext<'base>, scope: ScopeLocation) -> Result<(), TirError> {

        for field in self.fields.iter() {
            if let ObjectDefinitionFieldAst::Method(function) = field {
                let module_ref = context.get_scope(scope).unwrap().module_ref.clone();
                let full_name = format!("{}.{}", module_ref.as_cow(), function.name());
                let search_scope = context.types_scope.get(full_name.as_str()).unwrap();
                function.finish(context, *search_scope)?;
            }
        }

        Ok(())
    }

    fn name(&self) -> Cow<'base, str> {
        Cow::Borrowed(self.name.text)
    }
}

#[cfg(test)]
mod tests {
    use crate::{file::SourceFile, nom_tools::State, process_code, tir::TirError};

    #[test]
    fn missing_type() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], "class test { fun test(a: a): a {} }".to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap_err();
        Ok(())
    }

    #[test]
    fn recursive_type() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], "class test { a: test; fun test(a: test): test {} }".to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }

    #[test]
    fn this_location_1() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], "class test { fun test(this): test {} }".to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }

    #[test]
    fn this_location_2() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], "class test { fun test(this, a: test): test {} }".to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }

    #[test]
    fn this_location_3() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], "class test { fun test(a: test, this): test {} }".to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap_err();
        Ok(())
    }

    #[test]
    fn call_trait_function() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"
trait ITest {
    fun test(): string;
    a: TestClass;
}

impl ITest for TestClass {
    fun test(): string {

    }
    a: TestClass;
}

class TestClass {
    fun init(this): string {
        this.test();
        this.a.test();
    }
}
    "#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }

    #[test]
    fn enum_variant_payload() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], "class test {} enum object shape { circle(test), rectangle(test, test) }".to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }
}
