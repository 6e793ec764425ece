//! Constant definition resolution for the Lily TIR system.
//!
//! Resolves module-level `constant` declarations: when an explicit type
//! annotation is present it is resolved and checked against the literal's
//! inferred primitive type; otherwise the literal's own type is used.

use std::borrow::Cow;

use crate::{
    ast::{ConstantDefinitionAst, ExpressionAst}, tir::{context::TirContext, object_signature::{ConstantDefinition, TypeValue, TypeValueDiscriminants}, resolver::get_object_location_or_resolve, scope::ScopeLocation, signature::SignaturePath, TirError, TypeSignature}
};

use super::{BuildFullNameLocater, ResolveAst, TypeLocation};

impl<'base> ResolveAst<'base> for ConstantDefinitionAst<'base> {
    fn resolve(&self, context: &mut TirContext<'base>, scope_location: ScopeLocation) -> Result<TypeLocation, TirError> {
        simplelog::debug!("Resolving constant: <u><b>{}</b></u>", self.name.text);

        let module_ref = context.get_scope(scope_location).expect("Scope not found").module_ref.clone();
        let full_name = self.build_full_name(context, BuildFullNameLocater::Scope(scope_location), None);

        let literal_type_location = match &self.expression {
            ExpressionAst::Primitive { value, .. } => {
                let primitive_name = match value.to_type() {
                    crate::tir::PrimitiveType::String => "string",
                    crate::tir::PrimitiveType::Bool => "bool",
                    crate::tir::PrimitiveType::I8 => "i8",
                    crate::tir::PrimitiveType::U8 => "u8",
                    crate::tir::PrimitiveType::I16 => "i16",
                    crate::tir::PrimitiveType::U16 => "u16",
                    crate::tir::PrimitiveType::I32 => "i32",
                    crate::tir::PrimitiveType::U32 => "u32",
                    crate::tir::PrimitiveType::I64 => "i64",
                    crate::tir::PrimitiveType::U64 => "u64",
                    crate::tir::PrimitiveType::Float => "float",
                    crate::tir::PrimitiveType::Double => "double",
                    crate::tir::PrimitiveType::Void => "void",
                };

                context.types.location(primitive_name)
            }
            _ => None,
        };

        let constant_type = match &self.constant_type {
            Some(type_name) => {
                let declared = get_object_location_or_resolve(context, type_name, &module_ref, scope_location)?;

                if let Some(literal_location) = literal_type_location {
                    let declared_signature = context.types.get_from_location(declared).unwrap().value.clone();
                    let literal_signature = context.types.get_from_location(literal_location).unwrap().value.clone();

                    if !declared_signature.is_same_type(context, &literal_signature) {
                        return Err(TirError::types_do_not_match(self.name.to_range(), self.name.state.file.clone()));
                    }
                }

                declared
            }
            None => match literal_type_location {
                Some(location) => location,
                None => return Err(TirError::type_not_found(context, self.name.text.to_string(), self.name.to_range(), self.name.state.file.clone())),
            },
        };

        let (signature_path, signature_location) = context.reserve_object_location(self.name(), TypeValueDiscriminants::Constant, SignaturePath::owned(full_name), &module_ref, self.name.to_range(), self.name.state.file.clone())?;

        let signature = TypeSignature::new(TypeValue::Constant(ConstantDefinition {
            name: self.name.clone(),
            constant_type,
        }), self.name.state.file.clone(), self.name.to_range(), None);

        context.publish_object_location(signature_path, signature);
        Ok(signature_location)
    }

    fn finish(&self, _: &mut TirContext<'base>, _: ScopeLocation) -> Result<(), TirError> { Ok(()) }

    fn name(&self) -> Cow<'base, str> {
        Cow::Borrowed(self.name.text)
    }
}

#[cfg(test)]
mod tests {
    use crate::{file::SourceFile, nom_tools::State, process_code, tir::TirError};

    #[test]
    fn inferred_type() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"constant MaxRetries = 5;"#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }

    #[test]
    fn explicit_type() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"constant MaxRetries: i32 = 5;"#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }

    #[test]
    fn mismatched_type() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"constant Greeting: i32 = "hello";"#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap_err();
        Ok(())
    }
}
