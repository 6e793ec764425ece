//! Trait definition resolution for the Lily TIR system.
//!
//! This module handles the semantic analysis and type registration of trait
//! definitions within the Lily Type Intermediate Representation (TIR). Traits
//! define contracts that object types can satisfy via `impl` blocks, enabling
//! polymorphism and contract-based programming patterns in the Lily language.
//!
//! # Resolution Process
//!
//! ## Phase 1: Registration
//! 1. **Name resolution**: Build the fully qualified trait name
//! 2. **Type reservation**: Reserve a location in the type system
//! 3. **Base trait collection**: Identify inherited traits
//!
//! ## Phase 2: Member Resolution
//! 1. **Field processing**: Resolve field types and validate uniqueness
//! 2. **Method processing**: Resolve method signatures for the trait's contract
//!
//! ## Phase 3: Inheritance
//! Base traits are resolved recursively, with circular-reference detection, and
//! their members are folded into the child trait's field map.

use core::panic;
use std::borrow::Cow;

use crate::{
    ast::{FunctionArgumentAst, TraitDefinitionAst, TraitDefinitionFieldAst, TraitMethodDefinitionAst}, map::LilyHashMap, nom_tools::{Span, ToRange}, tir::{ast_signature::AstSignatureValue, context::TirContext, module::ModuleRef, object_signature::{GetItem, TypeValue, TypeValueDiscriminants}, resolver::{build_type_name, function::{unwrap_for_this, FunctionArgument}, get_object_location_or_resolve, try_resolve_signature, BuildFullNameLocater}, scope::{ScopeLocation, TypeVariableInformation}, signature::SignaturePath, TirError, TypeSignature}
};

use super::{build_signature_path, find_ast_signature, TypeLocation, ResolveAst};

/// A resolved trait: its fully qualified name and field/method contract.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub struct TraitDefinition<'base> {
    pub name: Span<'base>,
    pub full_name: String,
    pub fields: LilyHashMap<'base, Span<'base>, TypeVariableInformation<'base>>,
}

impl GetItem for TraitDefinition<'_> {
    fn get_item_location(&self, _: &TirContext<'_>, _: &str) -> Option<TypeLocation> {
        None
    }
}

/// A method signature required by a trait contract.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub struct TraitFunctionDefinition<'base> {
    pub name: Span<'base>,
    pub arguments: Vec<FunctionArgument<'base>>,
    pub return_type: TypeLocation,
}

impl GetItem for TraitFunctionDefinition<'_> {
    fn get_item_location(&self, _: &TirContext<'_>, _: &str) -> Option<TypeLocation> {
        None
    }
}

impl<'base> ResolveAst<'base> for TraitDefinitionAst<'base> {
    fn resolve(&self, context: &mut TirContext<'base>, scope_location: ScopeLocation) -> Result<TypeLocation, TirError> {
        simplelog::debug!("Resolving trait: <u><b>{}</b></u>", self.name.text);

        let (module_ref, parent) = {
            let scope = context.get_scope(scope_location).expect("Scope not found, it is a bug");
            (scope.module_ref.clone(), scope.parent_type)
        };
        let full_name = self.build_full_name(context, BuildFullNameLocater::Scope(scope_location), parent);
        let (signature_path, signature_location) = context.reserve_object_location(self.name(), TypeValueDiscriminants::Trait, SignaturePath::owned(full_name.clone()), &module_ref, self.name.to_range(), self.name.state.file.clone())?;

        let mut fields = LilyHashMap::<'base, Span<'_>, TypeVariableInformation<'base>>::default();
        let mut base_traits = LilyHashMap::<'base, Cow<'_, str>, TypeVariableInformation<'base>>::default();

        Self::resolve_trait(context, self, self, &mut fields, &mut base_traits, &module_ref, scope_location, parent)?;

        let signature = TypeSignature::new(TypeValue::Trait(TraitDefinition {
            name: self.name.clone(),
            full_name,
            fields,
        }), self.name.state.file.clone(), self.name.to_range(),None);

        context.publish_object_location(signature_path.clone(), signature);
        Ok(signature_location)
    }

    fn finish(&self, _: &mut TirContext<'base>, _: ScopeLocation) -> Result<(), TirError> { Ok(()) }

    fn name(&self) -> Cow<'base, str> {
        Cow::Borrowed(self.name.text)
    }
}

impl<'base> TraitDefinitionAst<'base> {
    #[allow(clippy::only_used_in_recursion)]
    #[allow(clippy::too_many_arguments)]
    fn resolve_trait(context: &mut TirContext<'base>, resolve_trait: &TraitDefinitionAst<'base>, trait_def: &TraitDefinitionAst<'base>, fields: &mut LilyHashMap<'base, Span<'base>, TypeVariableInformation<'base>>, base_traits: &mut LilyHashMap<'base, Cow<'base, str>, TypeVariableInformation<'base>>, module: &ModuleRef<'base>, scope_location: ScopeLocation, parent: Option<TypeLocation>) -> Result<(), TirError>  {
        let trait_path = build_signature_path(context, trait_def.name.text, module);

        // Check if the trait is already defined
        if let Some(TypeValue::Trait(trait_def)) = context.types.get(trait_path.get_raw_path()).map(|signature| signature.value.as_ref()){
            for (field, variable) in trait_def.fields.iter() {
                fields.insert(field.clone(), variable.clone());
            }
            return Ok(());
        }

        // Trait is not defined, proceed with resolution
        for field in trait_def.fields.iter() {
            match field {
                TraitDefinitionFieldAst::Method(function) => {
                    let signature = trait_def.resolve_function(context, module, scope_location, function, parent)?;
                    let variable = TypeVariableInformation::basic(function.name.clone(), signature);

                    fields.validate_insert(function.name.clone(), variable)?;
                }
                TraitDefinitionFieldAst::Field(field) => {
                    if field.is_public.is_some() {
                        return Err(TirError::extra_accessibility_identifier(field.is_public.as_ref().unwrap().to_range(), field.name.state.file.clone()));
                    }

                    let field_type = get_object_location_or_resolve(context, &field.field_type, module, scope_location)?;
                    let variable = TypeVariableInformation::basic(field.name.clone(), field_type);

                    fields.validate_insert(field.name.clone(), variable)?;
                }
            };
        }

        for base_trait in trait_def.base_traits.iter() {
            let base_trait_name = build_type_name(base_trait);
            let base_trait_name = build_signature_path(context, base_trait_name.as_str(), module);

            let base_trait_location = match find_ast_signature(context, module, base_trait_name) {
                Some(location) => location,
                None => {
                    return Err(TirError::type_not_found(context, base_trait.to_string(), base_trait.to_range(), base_trait.names.last().unwrap().state.file.clone()));
                }
            };

            let base_trait_signature = context.ast_signatures.get_from_location(base_trait_location)
                .ok_or_else(|| TirError::type_not_found(context, base_trait.to_string(), base_trait.to_range(), base_trait.names.last().unwrap().state.file.clone()))?;

            match base_trait_signature.value.clone() {
                AstSignatureValue::Trait(base_trait_ast) => {

                    if base_trait_ast.index == resolve_trait.index {
                        return Err(TirError::circular_reference(resolve_trait.name.to_range(), resolve_trait.name.state.file.clone()));
                    }

                    Self::resolve_trait(context, resolve_trait, &base_trait_ast, fields, base_traits, module, scope_location, parent)?
                },
                _ => return Err(TirError::invalid_type(base_trait.to_range(), "only trait type is valid", base_trait.names.last().unwrap().state.file.clone()))
            };
        }

        Ok(())
    }

    fn resolve_function(&self, context: &mut TirContext<'base>, module: &ModuleRef<'base>, scope_location: ScopeLocation, trait_function: &TraitMethodDefinitionAst<'base>, parent: Option<TypeLocation>) -> Result<TypeLocation, TirError> {
        simplelog::debug!("Resolving trait function: <u><b>{}</b></u>", self.name.text);

        let full_name: Cow<'base, str> = Cow::Owned(format!("{}::{}", self.name.text, trait_function.name.text));

        let tmp_module = context.modules.get_mut(module.as_ref()).unwrap_or_else(|| panic!("Module({}) not found, but this is a bug", module.as_ref()));
        let signature_path = SignaturePath::owned(format!("{}.{}", tmp_module.path, full_name));
        let signature_location = context.types.reserve(signature_path.clone(), Cow::Borrowed(trait_function.name.text), TypeValueDiscriminants::TraitFunction, trait_function.name.state.file.clone(), trait_function.name.to_range())?;
        tmp_module.types.insert(SignaturePath::cow(full_name), signature_location);

        let mut arguments = vec![];

        for argument in trait_function.arguments.iter() {
            let (argument_name, range, file) = match argument {
                FunctionArgumentAst::This(this) => {
                    let parent = context.types.get_from_location(unwrap_for_this(&parent, this)?).unwrap();
                    (Cow::Owned(parent.value.get_name().to_string()), this.to_range(), this.state.file.clone())
                },
                FunctionArgumentAst::Argument { name, .. } => (Cow::Borrowed(name.text), name.to_range(), name.state.file.clone())
            };

            let (field_type_span, type_name) = match argument {
                FunctionArgumentAst::This(this) => {
                    let parent = context.types.get_from_location(unwrap_for_this(&parent, this)?).unwrap();
                    (this.clone(), parent.value.get_name().to_string())
                },
                FunctionArgumentAst::Argument { field_type, .. } => (field_type.names_span.clone(), build_type_name(field_type)),
            };

            let field_type = match try_resolve_signature(context, module, scope_location, type_name.as_str())? {
                Some(field_type) => field_type,
                None => return Err(TirError::type_not_found(context, type_name, range, file))
            };

            if let Some(old) = arguments.iter().find(|item: &&FunctionArgument<'_>| *item.name.text == argument_name) {
                return Err(TirError::already_defined(old.name.to_range(), range, file));
            }

            arguments.push(FunctionArgument {
                name: match argument {
                    FunctionArgumentAst::This(this) => this.clone(),
                    FunctionArgumentAst::Argument { name, .. } => name.clone()
                },
                field_type,
                field_type_span,
                is_nullable: match argument {
                    FunctionArgumentAst::This(_) => false,
                    FunctionArgumentAst::Argument { field_type, .. } => field_type.nullable,
                },
                is_reference: match argument {
                    FunctionArgumentAst::This(_) => false,
                    FunctionArgumentAst::Argument { field_type, .. } => field_type.reference,
                }
            });
        }

        let return_type = get_object_location_or_resolve(context, &trait_function.return_type, module, scope_location)?;

        let signature = TypeSignature::new(
            TypeValue::TraitFunction(
                TraitFunctionDefinition {
                    name: trait_function.name.clone(),
                    arguments,
                    return_type,
                },
            ),
            self.name.state.file.clone(),
            self.name.to_range(),
            None,
        );

        Ok(context.types.update(signature_path, signature))
    }
}
