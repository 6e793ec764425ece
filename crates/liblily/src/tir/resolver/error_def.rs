//! Error-set definition resolution for the Lily TIR system.
//!
//! Resolves `error` declarations into a closed, tagged set of variants that
//! functions can raise. Unlike object definitions, error variants carry no
//! behavior — only an ordered name list (with optional payload types parsed
//! but not yet tracked per-variant, mirroring how object variant payloads are
//! validated for existence without being stored on the variant itself).

use std::borrow::Cow;

use crate::{
    ast::ErrorDefinitionAst, tir::{context::TirContext, object_signature::{ErrorDefinition, TypeValue, TypeValueDiscriminants}, resolver::get_object_location_or_resolve, scope::ScopeLocation, signature::SignaturePath, TirError, TypeSignature}
};

use super::{BuildFullNameLocater, ResolveAst, TypeLocation};

impl<'base> ResolveAst<'base> for ErrorDefinitionAst<'base> {
    fn resolve(&self, context: &mut TirContext<'base>, scope_location: ScopeLocation) -> Result<TypeLocation, TirError> {
        simplelog::debug!("Resolving error: <u><b>{}</b></u>", self.name.text);

        let module_ref = context.get_scope(scope_location).expect("Scope not found").module_ref.clone();
        let full_name = self.build_full_name(context, BuildFullNameLocater::Scope(scope_location), None);

        let mut variants = Vec::with_capacity(self.variants.len());
        for variant in self.variants.iter() {
            if variants.contains(&Cow::Borrowed(variant.name.text)) {
                return Err(TirError::already_defined(variant.name.to_range(), self.name.to_range(), self.name.state.file.clone()));
            }

            for payload_type in variant.payload.iter() {
                get_object_location_or_resolve(context, payload_type, &module_ref, scope_location)?;
            }

            variants.push(Cow::Borrowed(variant.name.text));
        }

        let (signature_path, signature_location) = context.reserve_object_location(self.name(), TypeValueDiscriminants::Error, SignaturePath::owned(full_name), &module_ref, self.name.to_range(), self.name.state.file.clone())?;

        let signature = TypeSignature::new(TypeValue::Error(ErrorDefinition {
            name: self.name.clone(),
            variants,
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
    fn basic_error() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"error IoError { NotFound, PermissionDenied }"#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }

    #[test]
    fn payload_variant() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"error IoError { NotFound, PermissionDenied(string) }"#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap();
        Ok(())
    }

    #[test]
    fn missing_payload_type() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"error IoError { PermissionDenied(nope) }"#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap_err();
        Ok(())
    }

    #[test]
    fn duplicate_variant() -> Result<(), TirError> {
        let state = State::new(SourceFile::new(vec!["source".into()], r#"error IoError { NotFound, NotFound }"#.to_string()));
        let ast = process_code(&state)?;
        crate::tir::build(vec![ast.into()]).unwrap_err();
        Ok(())
    }
}
