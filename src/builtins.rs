//! Built-in primitive types
//!
//! Three namespaces are registered:
//! - bare names (`string`, `integer`, ...) are strict nominal types
//! - `optional.<name>` accepts `null` as well
//! - `coercible.<name>` converts compatible values before checking

use serde_json::{Number, Value};

use crate::error::{Result, TypeError};
use crate::kind::PrimitiveKind;
use crate::registry::TypeRegistry;
use crate::types::Type;

/// Which namespaces to install
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespaces {
    pub optional: bool,
    pub coercible: bool,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            optional: true,
            coercible: true,
        }
    }
}

/// Register every built-in type
pub fn install(registry: &mut TypeRegistry) {
    install_with(registry, Namespaces::default());
}

pub fn install_with(registry: &mut TypeRegistry, namespaces: Namespaces) {
    for kind in PrimitiveKind::all() {
        let strict = Type::nominal(kind);
        if namespaces.optional {
            registry.register(format!("optional.{}", kind), strict.optional());
        }
        registry.register(kind.name(), strict);
    }

    if namespaces.coercible {
        registry.register(
            "coercible.string",
            coercible(PrimitiveKind::String, to_string),
        );
        registry.register(
            "coercible.integer",
            coercible(PrimitiveKind::Integer, to_integer),
        );
        registry.register("coercible.float", coercible(PrimitiveKind::Float, to_float));
    }
}

fn coercible(kind: PrimitiveKind, convert: fn(Value) -> Result<Value>) -> Type {
    Type::new(format!("coercible.{}", kind), kind).with_constructor(convert)
}

fn to_string(value: Value) -> Result<Value> {
    match value {
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        other => Ok(other),
    }
}

fn to_integer(value: Value) -> Result<Value> {
    let converted = if let Some(s) = value.as_str() {
        let s = s.trim();
        s.parse::<i64>()
            .map(Value::from)
            .or_else(|_| s.parse::<u64>().map(Value::from))
            .ok()
    } else if value.is_f64() {
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| Value::from(f as i64))
    } else {
        return Ok(value);
    };

    converted.ok_or_else(|| TypeError::invalid_value(value, PrimitiveKind::Integer.name()))
}

fn to_float(value: Value) -> Result<Value> {
    let Some(s) = value.as_str() else {
        return Ok(value);
    };

    s.trim()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| TypeError::invalid_value(value.clone(), PrimitiveKind::Float.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        install(&mut registry);
        registry
    }

    #[test]
    fn test_namespaces_registered() {
        let registry = registry();
        for kind in PrimitiveKind::all() {
            assert!(registry.contains(kind.name()));
            assert!(registry.contains(&format!("optional.{}", kind)));
        }
        assert!(registry.contains("coercible.integer"));
    }

    #[test]
    fn test_optional_namespace_matches_optional_builder() {
        let registry = registry();
        let optional = registry.resolve("optional.string").unwrap();
        let string = registry.resolve("string").unwrap();
        assert_eq!(optional, string.optional());
    }

    #[test]
    fn test_skipping_namespaces() {
        let mut registry = TypeRegistry::new();
        install_with(
            &mut registry,
            Namespaces {
                optional: false,
                coercible: false,
            },
        );
        assert_eq!(registry.len(), PrimitiveKind::all().len());
    }

    #[test]
    fn test_coercible_integer() {
        let t = registry().resolve("coercible.integer").unwrap();
        assert_eq!(t.build(json!("42")).unwrap(), json!(42));
        assert_eq!(t.build(json!(42)).unwrap(), json!(42));
        assert_eq!(t.build(json!(42.0)).unwrap(), json!(42));
        assert!(t.build(json!("abc")).is_err());
        assert!(t.build(json!(4.5)).is_err());
        assert!(t.build(json!(null)).is_err());
    }

    #[test]
    fn test_coercible_integer_range() {
        let t = registry().resolve("coercible.integer").unwrap();
        assert_eq!(
            t.build(json!("18446744073709551615")).unwrap(),
            json!(u64::MAX)
        );
        assert!(t.build(json!("18446744073709551616")).is_err());

        // 2^63 is one past i64::MAX and must not saturate
        match t.build(json!(9223372036854775808.0)) {
            Err(TypeError::InvalidValue { value, .. }) => {
                assert_eq!(value, json!(9223372036854775808.0))
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
        assert_eq!(
            t.build(json!(-9223372036854775808.0)).unwrap(),
            json!(i64::MIN)
        );
    }

    #[test]
    fn test_coercible_float_and_string() {
        let registry = registry();
        let float = registry.resolve("coercible.float").unwrap();
        assert_eq!(float.build(json!("1.5")).unwrap(), json!(1.5));
        assert!(float.build(json!("NaN")).is_err());

        let string = registry.resolve("coercible.string").unwrap();
        assert_eq!(string.build(json!(7)).unwrap(), json!("7"));
        assert!(string.build(json!([])).is_err());
    }

    #[test]
    fn test_strict_integer_rejects_numeric_strings() {
        let t = registry().resolve("integer").unwrap();
        assert!(matches!(
            t.build(json!("123")),
            Err(TypeError::InvalidValue { .. })
        ));
    }
}
