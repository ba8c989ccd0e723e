//! Primitive value kinds

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The concrete shape a value must have once a type's constructors have run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// Accepts every value
    Any,
    /// Only `null`
    Nil,
    Bool,
    /// Whole JSON numbers (signed or unsigned 64-bit)
    Integer,
    /// Any JSON number
    Float,
    String,
    /// JSON arrays; the only kind that takes a member type
    Array,
    /// JSON objects
    Hash,
}

impl PrimitiveKind {
    /// Check whether a value has this shape
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            PrimitiveKind::Any => true,
            PrimitiveKind::Nil => value.is_null(),
            PrimitiveKind::Bool => value.is_boolean(),
            PrimitiveKind::Integer => value.is_i64() || value.is_u64(),
            PrimitiveKind::Float => value.is_number(),
            PrimitiveKind::String => value.is_string(),
            PrimitiveKind::Array => value.is_array(),
            PrimitiveKind::Hash => value.is_object(),
        }
    }

    /// Whether a member type can be attached
    pub fn is_collection(&self) -> bool {
        matches!(self, PrimitiveKind::Array)
    }

    /// Registry name of the kind
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Any => "any",
            PrimitiveKind::Nil => "nil",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Float => "float",
            PrimitiveKind::String => "string",
            PrimitiveKind::Array => "array",
            PrimitiveKind::Hash => "hash",
        }
    }

    /// All kinds, in registration order
    pub fn all() -> [PrimitiveKind; 8] {
        [
            PrimitiveKind::Any,
            PrimitiveKind::Nil,
            PrimitiveKind::Bool,
            PrimitiveKind::Integer,
            PrimitiveKind::Float,
            PrimitiveKind::String,
            PrimitiveKind::Array,
            PrimitiveKind::Hash,
        ]
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
