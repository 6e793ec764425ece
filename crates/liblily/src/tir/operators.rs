//! Operator resolution registry.
//!
//! Seeded with the default numeric/string operators; a `fun operator+(...)` style
//! declaration is just a function whose name takes the reserved form
//! `operator<op>` and appends a candidate for that operator. Resolution picks the
//! unique candidate whose parameter types unify with the argument types.

use indexmap::IndexMap;

use crate::ast::ExpressionOperatorType;

/// One registered overload: the two operand type names it accepts and the result type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorCandidate {
    pub left_type: String,
    pub right_type: String,
    pub result_type: String,
}

/// Function-name prefix a `fun` declaration must use to register as an operator
/// overload, e.g. `fun operator+(left: Money, right: Money): Money { ... }`.
pub const OPERATOR_DECL_PREFIX: &str = "operator";

#[derive(Debug, Default)]
pub struct OperatorRegistry {
    candidates: IndexMap<OperatorKey, Vec<OperatorCandidate>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum OperatorKey {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

fn key_for(op: ExpressionOperatorType) -> Option<OperatorKey> {
    match op {
        ExpressionOperatorType::Add => Some(OperatorKey::Add),
        ExpressionOperatorType::Sub => Some(OperatorKey::Sub),
        ExpressionOperatorType::Mul => Some(OperatorKey::Mul),
        ExpressionOperatorType::Div => Some(OperatorKey::Div),
        ExpressionOperatorType::Mod => Some(OperatorKey::Mod),
        ExpressionOperatorType::Pow => Some(OperatorKey::Pow),
        ExpressionOperatorType::Equal => Some(OperatorKey::Equal),
        ExpressionOperatorType::NotEqual => Some(OperatorKey::NotEqual),
        ExpressionOperatorType::LessThan => Some(OperatorKey::Less),
        ExpressionOperatorType::LessEqualThan => Some(OperatorKey::LessEqual),
        ExpressionOperatorType::GreaterThan => Some(OperatorKey::Greater),
        ExpressionOperatorType::GreaterEqualThan => Some(OperatorKey::GreaterEqual),
        _ => None,
    }
}

const NUMERIC_TYPES: &[&str] = &["i8", "u8", "i16", "u16", "i32", "u32", "i64", "u64", "float", "double"];

impl OperatorRegistry {
    /// Builds a registry pre-seeded with the default numeric arithmetic/comparison
    /// operators over every primitive numeric type, plus `string` `+` concatenation.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        for &ty in NUMERIC_TYPES {
            for key in [OperatorKey::Add, OperatorKey::Sub, OperatorKey::Mul, OperatorKey::Div, OperatorKey::Mod, OperatorKey::Pow] {
                registry.add(key, ty, ty, ty);
            }
            for key in [OperatorKey::Equal, OperatorKey::NotEqual, OperatorKey::Less, OperatorKey::LessEqual, OperatorKey::Greater, OperatorKey::GreaterEqual] {
                registry.add(key, ty, ty, "bool");
            }
        }
        registry.add(OperatorKey::Add, "string", "string", "string");
        registry.add(OperatorKey::Equal, "string", "string", "bool");
        registry.add(OperatorKey::NotEqual, "string", "string", "bool");
        registry
    }

    fn add(&mut self, key: OperatorKey, left: &str, right: &str, result: &str) {
        self.candidates.entry(key).or_default().push(OperatorCandidate {
            left_type: left.to_string(),
            right_type: right.to_string(),
            result_type: result.to_string(),
        });
    }

    /// Registers a user-defined `fun operator<op>` overload.
    pub fn register_overload(&mut self, op: ExpressionOperatorType, left: &str, right: &str, result: &str) {
        if let Some(key) = key_for(op) {
            self.add(key, left, right, result);
        }
    }

    /// Resolves the result type for `left op right`, or `None` if zero or more than
    /// one candidate matches (callers turn that into `UnresolvedOperator`/`AmbiguousOperator`).
    pub fn resolve(&self, op: ExpressionOperatorType, left: &str, right: &str) -> OperatorResolution {
        let Some(key) = key_for(op) else { return OperatorResolution::Unresolved };
        let Some(candidates) = self.candidates.get(&key) else { return OperatorResolution::Unresolved };

        let matches: Vec<&OperatorCandidate> = candidates.iter().filter(|c| c.left_type == left && c.right_type == right).collect();
        match matches.as_slice() {
            [] => OperatorResolution::Unresolved,
            [one] => OperatorResolution::Resolved((*one).clone()),
            _ => OperatorResolution::Ambiguous,
        }
    }
}

#[derive(Debug, Clone)]
pub enum OperatorResolution {
    Resolved(OperatorCandidate),
    Unresolved,
    Ambiguous,
}

/// Parses the operand-independent `<op>` suffix of a `operator<op>` function name,
/// e.g. `"operator+"` -> `Some(ExpressionOperatorType::Add)`.
pub fn operator_from_decl_name(name: &str) -> Option<ExpressionOperatorType> {
    let suffix = name.strip_prefix(OPERATOR_DECL_PREFIX)?;
    match suffix {
        "+" => Some(ExpressionOperatorType::Add),
        "-" => Some(ExpressionOperatorType::Sub),
        "*" => Some(ExpressionOperatorType::Mul),
        "/" => Some(ExpressionOperatorType::Div),
        "%" => Some(ExpressionOperatorType::Mod),
        "**" => Some(ExpressionOperatorType::Pow),
        "==" => Some(ExpressionOperatorType::Equal),
        "not=" => Some(ExpressionOperatorType::NotEqual),
        "<" => Some(ExpressionOperatorType::LessThan),
        "<=" => Some(ExpressionOperatorType::LessEqualThan),
        ">" => Some(ExpressionOperatorType::GreaterThan),
        ">=" => Some(ExpressionOperatorType::GreaterEqualThan),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_numeric_addition_resolves_uniquely() {
        let registry = OperatorRegistry::with_defaults();
        match registry.resolve(ExpressionOperatorType::Add, "i32", "i32") {
            OperatorResolution::Resolved(candidate) => assert_eq!(candidate.result_type, "i32"),
            other => panic!("expected a resolved candidate, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_operand_types_are_unresolved() {
        let registry = OperatorRegistry::with_defaults();
        assert!(matches!(registry.resolve(ExpressionOperatorType::Add, "i32", "string"), OperatorResolution::Unresolved));
    }

    #[test]
    fn a_second_overload_for_the_same_operands_is_ambiguous() {
        let mut registry = OperatorRegistry::with_defaults();
        registry.register_overload(ExpressionOperatorType::Add, "i32", "i32", "i32");
        assert!(matches!(registry.resolve(ExpressionOperatorType::Add, "i32", "i32"), OperatorResolution::Ambiguous));
    }

    #[test]
    fn operator_decl_name_parses_the_reserved_suffix() {
        assert_eq!(operator_from_decl_name("operator+"), Some(ExpressionOperatorType::Add));
        assert_eq!(operator_from_decl_name("operatornot="), Some(ExpressionOperatorType::NotEqual));
        assert_eq!(operator_from_decl_name("greeting"), None);
    }
}
