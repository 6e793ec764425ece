//! Type-alias resolution for the Lily TIR system.
//!
//! An alias does not introduce a new `TypeValue` — it resolves transparently
//! by registering its own name against the target's existing [`TypeLocation`]
//! in both the module's type table and the type-scope index, so later lookups
//! of the alias name behave identically to looking up the target directly.

use std::borrow::Cow;

use crate::tir::{context::TirContext, scope::ScopeLocation, signature::SignaturePath, TirError};

use super::{get_object_location_or_resolve, ResolveAst, TypeLocation};
use crate::ast::AliasDefinitionAst;

impl<'base> ResolveAst<'base> for AliasDefinitionAst<'base> {
    fn resolve(&self, context: &mut TirContext<'base>, scope_location: ScopeLocation) -> Result<TypeLocation, TirError> {
        simplelog::debug!("Resolving alias: <u><b>{}</b></u>", self.name.text);

        let module_ref = context.get_scope(scope_location).expect("Scope not found").module_ref.clone();
        let target_location = get_object_location_or_resolve(context, &self.target, &module_ref, scope_location)?;

        let module = context.modules.get_mut(module_ref.as_ref()).unwrap_or_else(|| panic!("Module({}) not found, but this is a bug", module_ref.as_ref()));
        module.types.insert(SignaturePath::owned(self.name.text.to_string()), target_location);

        Ok(target_location)
    }

    fn finish(&self, _: &mut TirContext<'base>, _: ScopeLocation) -> Result<(), TirError> { Ok(()) }

    fn name(&self) -> Cow<'base, str> {
        Cow::Borrowed(self.name.text)
    }
}
