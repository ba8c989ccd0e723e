//! Composable runtime types
//!
//! A [`Type`] pairs a primitive kind with an ordered constructor chain and,
//! for collections, a member type. Types are immutable: every composition
//! operator returns a new `Type` and leaves the receiver untouched, so a
//! resolved type can be shared between threads without synchronization.
//!
//! ```
//! use familiar_types::{PrimitiveKind, Type};
//! use serde_json::json;
//!
//! let tags = Type::nominal(PrimitiveKind::Array)
//!     .with_member(Type::nominal(PrimitiveKind::String))
//!     .unwrap();
//!
//! assert!(tags.build(json!(["a", "b"])).is_ok());
//! assert!(tags.build(json!(["a", 1])).is_err());
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Result, TypeError};
use crate::kind::PrimitiveKind;
use crate::structs::Struct;

type ConstructorFn = dyn Fn(Value) -> Result<Value> + Send + Sync;

/// One step of a type's constructor chain
#[derive(Clone)]
pub struct Constructor(Arc<ConstructorFn>);

impl Constructor {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, value: Value) -> Result<Value> {
        (self.0)(value)
    }
}

impl PartialEq for Constructor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constructor({:p})", Arc::as_ptr(&self.0))
    }
}

/// An immutable validator and coercer over dynamic values
#[derive(Clone)]
pub struct Type {
    inner: Arc<TypeInner>,
}

#[derive(Clone, PartialEq)]
struct TypeInner {
    name: String,
    primitive: PrimitiveKind,
    constructors: Vec<Constructor>,
    member: Option<Type>,
    schema: Option<Arc<Struct>>,
    optional: bool,
    fallback: Option<Value>,
}

impl Type {
    /// A strict type that only checks the value's primitive kind
    pub fn nominal(primitive: PrimitiveKind) -> Self {
        Self::new(primitive.name(), primitive)
    }

    /// A strict type with a custom display name
    pub fn new(name: impl Into<String>, primitive: PrimitiveKind) -> Self {
        Self {
            inner: Arc::new(TypeInner {
                name: name.into(),
                primitive,
                constructors: Vec::new(),
                member: None,
                schema: None,
                optional: false,
                fallback: None,
            }),
        }
    }

    /// Display name, e.g. `"string"` or `"array<string>"`
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn primitive(&self) -> PrimitiveKind {
        self.inner.primitive
    }

    /// Member type of a parametric collection
    pub fn member(&self) -> Option<&Type> {
        self.inner.member.as_ref()
    }

    /// Struct schema backing this type, if it was produced by a struct declaration
    pub fn schema(&self) -> Option<&Struct> {
        self.inner.schema.as_deref()
    }

    pub fn constructors(&self) -> &[Constructor] {
        &self.inner.constructors
    }

    pub fn is_optional(&self) -> bool {
        self.inner.optional
    }

    pub fn fallback(&self) -> Option<&Value> {
        self.inner.fallback.as_ref()
    }

    /// Whether two handles point at the very same type instance
    pub fn ptr_eq(a: &Type, b: &Type) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    fn derive(&self, f: impl FnOnce(&mut TypeInner)) -> Type {
        let mut inner = (*self.inner).clone();
        f(&mut inner);
        Type {
            inner: Arc::new(inner),
        }
    }

    /// Same type under a different display name
    pub fn named(&self, name: impl Into<String>) -> Type {
        let name = name.into();
        self.derive(|inner| inner.name = name)
    }

    /// Append a step to the constructor chain
    pub fn with_constructor<F>(&self, f: F) -> Type
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        let step = Constructor::new(f);
        self.derive(|inner| inner.constructors.push(step))
    }

    /// Parametrize a collection type by the type of its elements
    pub fn with_member(&self, member: Type) -> Result<Type> {
        if !self.inner.primitive.is_collection() {
            return Err(TypeError::InvalidComposition(format!(
                "{} ({}) does not take a member type",
                self.inner.name, self.inner.primitive
            )));
        }
        if let Some(existing) = &self.inner.member {
            return Err(TypeError::InvalidComposition(format!(
                "{} is already parametrized by {}",
                self.inner.name,
                existing.name()
            )));
        }

        let name = format!("{}<{}>", self.inner.name, member.name());
        Ok(self.derive(|inner| {
            inner.name = name;
            inner.member = Some(member);
        }))
    }

    /// Accept `null` in addition to the original shape
    pub fn optional(&self) -> Type {
        self.derive(|inner| inner.optional = true)
    }

    /// Substitute `value` whenever building fails on bad input
    pub fn with_fallback(&self, value: Value) -> Type {
        self.derive(|inner| inner.fallback = Some(value))
    }

    pub(crate) fn with_schema(&self, schema: Arc<Struct>) -> Type {
        self.derive(|inner| inner.schema = Some(schema))
    }

    /// Run the constructor chain and check the result
    pub fn build(&self, input: Value) -> Result<Value> {
        let Some(fallback) = &self.inner.fallback else {
            return self.attempt(input);
        };

        match self.attempt(input) {
            Err(err) if err.is_data_error() => Ok(fallback.clone()),
            other => other,
        }
    }

    /// Alias of [`Type::build`]
    pub fn call(&self, input: Value) -> Result<Value> {
        self.build(input)
    }

    pub fn is_valid(&self, input: &Value) -> bool {
        self.build(input.clone()).is_ok()
    }

    fn attempt(&self, input: Value) -> Result<Value> {
        let inner = &*self.inner;
        if inner.optional && input.is_null() {
            return Ok(Value::Null);
        }

        let value = inner
            .constructors
            .iter()
            .try_fold(input, |value, step| step.call(value))?;

        if !inner.primitive.matches(&value) {
            return Err(TypeError::invalid_value(value, inner.primitive.name()));
        }

        let value = match (&inner.schema, value) {
            (Some(schema), Value::Object(map)) => Value::Object(schema.validate(&map)?),
            (_, value) => value,
        };

        match (&inner.member, value) {
            (Some(member), Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| member.build(item).map_err(|e| e.at_key(index.to_string())))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            (_, value) => Ok(value),
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        Type::ptr_eq(self, other) || self.inner == other.inner
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("name", &self.inner.name)
            .field("primitive", &self.inner.primitive)
            .field("constructors", &self.inner.constructors.len())
            .field("member", &self.inner.member)
            .field("schema", &self.inner.schema.as_ref().map(|s| s.name()))
            .field("optional", &self.inner.optional)
            .field("fallback", &self.inner.fallback)
            .finish()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}
