//! Struct schemas
//!
//! A [`Struct`] is a fixed, ordered set of named fields, each with its own
//! [`Type`]. Validation walks the fields in declaration order and stops at
//! the first problem, reporting a missing key separately from a key whose
//! value has the wrong shape.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::context::TypeContext;
use crate::error::{Result, TypeError};
use crate::kind::PrimitiveKind;
use crate::registry::TypeRef;
use crate::types::Type;

/// A declared field of a struct
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

/// A record schema over JSON objects
#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    name: String,
    fields: Vec<Field>,
}

impl Struct {
    /// Create a struct from already resolved field types
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Result<Self> {
        let name = name.into();
        for (index, field) in fields.iter().enumerate() {
            if fields[..index].iter().any(|f| f.name == field.name) {
                return Err(TypeError::InvalidComposition(format!(
                    "struct {} declares field :{} twice",
                    name, field.name
                )));
            }
        }
        Ok(Self { name, fields })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Type of a declared field
    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.ty)
    }

    /// Validate an input mapping, returning the coerced record
    ///
    /// Keys that are not declared are not copied into the result. The
    /// input is never modified.
    pub fn validate(&self, input: &Map<String, Value>) -> Result<Map<String, Value>> {
        let mut output = Map::new();
        for field in &self.fields {
            let value = input.get(&field.name).ok_or_else(|| TypeError::MissingField {
                field: field.name.clone(),
            })?;

            let coerced = field
                .ty
                .build(value.clone())
                .map_err(|source| TypeError::InvalidField {
                    field: field.name.clone(),
                    value: value.clone(),
                    expected: field.ty.name().to_string(),
                    source: Box::new(source),
                })?;
            output.insert(field.name.clone(), coerced);
        }
        Ok(output)
    }

    /// A hash type that validates through this struct
    pub fn to_type(&self) -> Type {
        Type::new(self.name.clone(), PrimitiveKind::Hash).with_schema(Arc::new(self.clone()))
    }
}

/// Declares a struct by field spec, resolving every spec when built
///
/// ```
/// use familiar_types::{StructBuilder, TypeContext};
/// use serde_json::json;
///
/// let ctx = TypeContext::with_builtins();
/// let user = StructBuilder::new("User")
///     .field("name", "string")
///     .field("tags", "array<string>")
///     .build(&ctx)
///     .unwrap();
///
/// let input = json!({ "name": "Ada", "tags": ["admin"] });
/// assert!(user.validate(input.as_object().unwrap()).is_ok());
/// ```
#[derive(Debug)]
pub struct StructBuilder {
    name: String,
    fields: Vec<(String, TypeRef)>,
}

impl StructBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field by spec string or already built type
    pub fn field(mut self, name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        self.fields.push((name.into(), ty.into()));
        self
    }

    pub fn build(self, ctx: &TypeContext) -> Result<Struct> {
        let fields = self
            .fields
            .into_iter()
            .map(|(name, ty)| -> Result<Field> {
                Ok(Field { name, ty: ctx.resolve(ty)? })
            })
            .collect::<Result<Vec<_>>>()?;
        Struct::new(self.name, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("Expected object, got {}", other),
        }
    }

    fn pair() -> Struct {
        Struct::new(
            "Pair",
            vec![
                Field {
                    name: "a".into(),
                    ty: Type::nominal(PrimitiveKind::Integer),
                },
                Field {
                    name: "b".into(),
                    ty: Type::nominal(PrimitiveKind::Integer),
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_validate_success() {
        let out = pair().validate(&object(json!({"a": 1, "b": 2}))).unwrap();
        assert_eq!(Value::Object(out), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_first_missing_field_wins() {
        // :b is also wrong, but :a is declared first and absent
        let err = pair().validate(&object(json!({"b": "x"}))).unwrap_err();
        assert_eq!(err, TypeError::MissingField { field: "a".into() });
    }

    #[test]
    fn test_invalid_field() {
        let err = pair().validate(&object(json!({"a": 1, "b": "x"}))).unwrap_err();
        match err {
            TypeError::InvalidField { field, value, expected, source } => {
                assert_eq!(field, "b");
                assert_eq!(value, json!("x"));
                assert_eq!(expected, "integer");
                assert!(matches!(*source, TypeError::InvalidValue { .. }));
            }
            other => panic!("Expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_field_before_later_missing_field() {
        let err = pair().validate(&object(json!({"a": "x"}))).unwrap_err();
        assert!(matches!(err, TypeError::InvalidField { ref field, .. } if field == "a"));
    }

    #[test]
    fn test_undeclared_keys_dropped_and_input_untouched() {
        let input = object(json!({"a": 1, "b": 2, "extra": true}));
        let before = input.clone();
        let out = pair().validate(&input).unwrap();
        assert!(!out.contains_key("extra"));
        assert_eq!(input, before);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let t = Type::nominal(PrimitiveKind::String);
        let err = Struct::new(
            "Dup",
            vec![
                Field { name: "x".into(), ty: t.clone() },
                Field { name: "x".into(), ty: t },
            ],
        )
        .unwrap_err();
        assert!(matches!(err, TypeError::InvalidComposition(_)));
    }

    #[test]
    fn test_struct_as_type() {
        let t = pair().to_type();
        assert_eq!(t.name(), "Pair");
        assert_eq!(t.primitive(), PrimitiveKind::Hash);
        assert_eq!(t.build(json!({"a": 1, "b": 2})).unwrap(), json!({"a": 1, "b": 2}));
        assert!(matches!(
            t.build(json!([1, 2])),
            Err(TypeError::InvalidValue { .. })
        ));
        assert!(matches!(
            t.build(json!({"a": 1})),
            Err(TypeError::MissingField { .. })
        ));
    }

    #[test]
    fn test_builder_resolves_specs_eagerly() {
        let ctx = TypeContext::with_builtins();
        let err = StructBuilder::new("Broken")
            .field("ok", "string")
            .field("bad", "array<nope>")
            .build(&ctx)
            .unwrap_err();
        assert_eq!(err, TypeError::UnknownType { name: "nope".into() });
    }
}
