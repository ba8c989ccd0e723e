//! Error types for type resolution and validation

use serde_json::Value;
use thiserror::Error;

/// Result type for type operations
pub type Result<T> = std::result::Result<T, TypeError>;

/// Type registry and validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("Unknown type: {name}")]
    UnknownType { name: String },

    #[error("{} has invalid type{}, expected {expected}", describe(.value), key_suffix(.key))]
    InvalidValue {
        key: Option<String>,
        value: Value,
        expected: String,
    },

    #[error("Invalid composition: {0}")]
    InvalidComposition(String),

    #[error(":{field} is missing in hash input")]
    MissingField { field: String },

    #[error("{} has invalid type for :{field}, expected {expected}", describe(.value))]
    InvalidField {
        field: String,
        value: Value,
        expected: String,
        source: Box<TypeError>,
    },

    #[error("Malformed type spec {spec:?}: {reason}")]
    MalformedSpec { spec: String, reason: String },

    #[error("Unknown builder: {name}")]
    UnknownBuilder { name: String },
}

impl TypeError {
    /// Shorthand for a shape mismatch without a key
    pub fn invalid_value(value: Value, expected: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: None,
            value,
            expected: expected.into(),
        }
    }

    /// Whether this error was caused by the input value rather than by
    /// how the registry or the types were put together.
    ///
    /// Only data errors are recoverable through a fallback.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidValue { .. } | Self::MissingField { .. } | Self::InvalidField { .. }
        )
    }

    /// Prefix an element index onto the location of a data error
    ///
    /// Nested collections build a dotted path from the outside in, so the
    /// second element of the first row reads `0.1`. Struct errors carry the
    /// path on their field name (`2.label`).
    pub(crate) fn at_key(self, at: impl Into<String>) -> Self {
        let at = at.into();
        match self {
            Self::InvalidValue {
                key,
                value,
                expected,
            } => Self::InvalidValue {
                key: Some(join_path(at, key.as_deref())),
                value,
                expected,
            },
            Self::MissingField { field } => Self::MissingField {
                field: join_path(at, Some(&field)),
            },
            Self::InvalidField {
                field,
                value,
                expected,
                source,
            } => Self::InvalidField {
                field: join_path(at, Some(&field)),
                value,
                expected,
                source,
            },
            other => other,
        }
    }
}

fn join_path(at: String, rest: Option<&str>) -> String {
    match rest {
        Some(rest) => format!("{}.{}", at, rest),
        None => at,
    }
}

fn describe(value: &Value) -> String {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "hash",
    };
    format!("{} ({})", value, kind)
}

fn key_suffix(key: &Option<String>) -> String {
    key.as_ref()
        .map(|k| format!(" at [{}]", k))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_value_message() {
        let err = TypeError::invalid_value(json!(1), "string");
        assert_eq!(err.to_string(), "1 (integer) has invalid type, expected string");

        let err = err.at_key("3");
        assert_eq!(
            err.to_string(),
            "1 (integer) has invalid type at [3], expected string"
        );
    }

    #[test]
    fn test_at_key_builds_outer_to_inner_path() {
        let err = TypeError::invalid_value(json!("x"), "integer").at_key("0").at_key("5");
        match err {
            TypeError::InvalidValue { key, .. } => assert_eq!(key.as_deref(), Some("5.0")),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_at_key_prefixes_struct_fields() {
        let missing = TypeError::MissingField { field: "city".into() }.at_key("3");
        assert_eq!(missing, TypeError::MissingField { field: "3.city".into() });

        let composition = TypeError::InvalidComposition("nope".into()).at_key("1");
        assert_eq!(composition, TypeError::InvalidComposition("nope".into()));
    }

    #[test]
    fn test_struct_error_messages() {
        let missing = TypeError::MissingField { field: "name".into() };
        assert_eq!(missing.to_string(), ":name is missing in hash input");

        let invalid = TypeError::InvalidField {
            field: "age".into(),
            value: json!("old"),
            expected: "integer".into(),
            source: Box::new(TypeError::invalid_value(json!("old"), "integer")),
        };
        assert_eq!(
            invalid.to_string(),
            "\"old\" (string) has invalid type for :age, expected integer"
        );
        assert!(std::error::Error::source(&invalid).is_some());
    }

    #[test]
    fn test_data_error_classification() {
        assert!(TypeError::MissingField { field: "a".into() }.is_data_error());
        assert!(TypeError::invalid_value(Value::Null, "string").is_data_error());
        assert!(!TypeError::UnknownType { name: "x".into() }.is_data_error());
        assert!(!TypeError::InvalidComposition("nope".into()).is_data_error());
    }
}
