//! Generic monomorphization-by-signature.
//!
//! A generic function is elaborated once per distinct *signature key* - the ordered
//! tuple of concrete parameter types plus the return type it was called with. The
//! first key seen for a generic function is its "original" signature; every later,
//! distinct key appends a new entry under the same global name.

use indexmap::IndexMap;

/// One concrete instantiation of a (possibly generic) function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub global_name: String,
    /// `<global_name>__<type1>_..._<typeN>_<ret>`.
    pub serialized_global_name: String,
    pub type_names: Vec<String>,
    pub return_type_name: String,
}

/// Maps a resolved type's display name to the mangled token used in serialized names,
/// e.g. `i32 -> "Int32"`, `string -> "Str"`. Unrecognized/custom names pass through
/// with their first letter capitalized, matching a user type's own declared name.
pub fn mangle(type_name: &str) -> String {
    match type_name {
        "i8" => "Int8".to_string(),
        "u8" => "UInt8".to_string(),
        "i16" => "Int16".to_string(),
        "u16" => "UInt16".to_string(),
        "i32" => "Int32".to_string(),
        "u32" => "UInt32".to_string(),
        "i64" => "Int64".to_string(),
        "u64" => "UInt64".to_string(),
        "float" => "Float32".to_string(),
        "double" => "Float64".to_string(),
        "bool" => "Bool".to_string(),
        "string" => "Str".to_string(),
        "void" => "Unit".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        }
    }
}

fn signature_key(type_names: &[String], return_type_name: &str) -> String {
    let mut key = type_names.join("_");
    if !key.is_empty() {
        key.push('_');
    }
    key.push_str(return_type_name);
    key
}

/// Tracks the distinct signature keys elaborated per generic function's global name.
#[derive(Debug, Default)]
pub struct SignatureRegistry {
    instances: IndexMap<String, Vec<FunctionSignature>>,
}

impl SignatureRegistry {
    /// Registers a call-site instantiation, returning the existing signature if this
    /// exact key was already elaborated, or a freshly mangled one otherwise.
    pub fn register(&mut self, global_name: &str, arg_type_names: Vec<String>, return_type_name: String) -> FunctionSignature {
        let mangled_args: Vec<String> = arg_type_names.iter().map(|t| mangle(t)).collect();
        let mangled_ret = mangle(&return_type_name);
        let key = signature_key(&mangled_args, &mangled_ret);

        let entries = self.instances.entry(global_name.to_string()).or_default();
        if let Some(existing) = entries.iter().find(|s| signature_key(&s.type_names, &s.return_type_name) == key) {
            return existing.clone();
        }

        let serialized_global_name = format!("{global_name}__{key}");
        let signature = FunctionSignature {
            global_name: global_name.to_string(),
            serialized_global_name,
            type_names: mangled_args,
            return_type_name: mangled_ret,
        };
        entries.push(signature.clone());
        signature
    }

    /// All signatures elaborated so far for a generic function's global name.
    pub fn signatures_for(&self, global_name: &str) -> &[FunctionSignature] {
        self.instances.get(global_name).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_argument_types_elaborate_distinct_signatures() {
        let mut registry = SignatureRegistry::default();
        let first = registry.register("id", vec!["i32".to_string()], "i32".to_string());
        let second = registry.register("id", vec!["string".to_string()], "string".to_string());

        assert_eq!(first.serialized_global_name, "id__Int32_Int32");
        assert_eq!(second.serialized_global_name, "id__Str_Str");
        assert_eq!(registry.signatures_for("id").len(), 2);
    }

    #[test]
    fn identical_argument_types_reuse_the_same_signature() {
        let mut registry = SignatureRegistry::default();
        let first = registry.register("id", vec!["i32".to_string()], "i32".to_string());
        let second = registry.register("id", vec!["i32".to_string()], "i32".to_string());

        assert_eq!(first, second);
        assert_eq!(registry.signatures_for("id").len(), 1);
    }
}
