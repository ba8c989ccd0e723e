//! Type Registry
//!
//! Name-keyed store of types and lazy type factories. Populated once at
//! startup; re-registering a key replaces the previous binding.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, TypeError};
use crate::kind::PrimitiveKind;
use crate::naming::identifier;
use crate::types::Type;

type Factory = dyn Fn() -> Type + Send + Sync;

/// A registry binding
enum Binding {
    Type(Type),
    /// Built on first resolve, then reused
    Lazy {
        factory: Arc<Factory>,
        cell: OnceLock<Type>,
    },
}

impl Binding {
    fn get(&self) -> Type {
        match self {
            Binding::Type(ty) => ty.clone(),
            Binding::Lazy { factory, cell } => cell.get_or_init(|| factory()).clone(),
        }
    }
}

/// Something that can be resolved to a type: a spec string or a type
/// the caller already holds
#[derive(Debug, Clone)]
pub enum TypeRef {
    Spec(String),
    Type(Type),
}

impl From<&str> for TypeRef {
    fn from(spec: &str) -> Self {
        TypeRef::Spec(spec.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(spec: String) -> Self {
        TypeRef::Spec(spec)
    }
}

impl From<&String> for TypeRef {
    fn from(spec: &String) -> Self {
        TypeRef::Spec(spec.clone())
    }
}

impl From<Type> for TypeRef {
    fn from(ty: Type) -> Self {
        TypeRef::Type(ty)
    }
}

impl From<&Type> for TypeRef {
    fn from(ty: &Type) -> Self {
        TypeRef::Type(ty.clone())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Spec(spec) => f.write_str(spec),
            TypeRef::Type(ty) => write!(f, "{}", ty),
        }
    }
}

/// The type registry
#[derive(Default)]
pub struct TypeRegistry {
    bindings: HashMap<String, Binding>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a type under a key
    pub fn register(&mut self, name: impl Into<String>, ty: Type) {
        let name = name.into();
        tracing::trace!(name = %name, ty = %ty, "registering type");
        self.bindings.insert(name, Binding::Type(ty));
    }

    /// Bind a factory that builds the type on first resolve
    pub fn register_lazy<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Type + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::trace!(name = %name, "registering lazy type");
        self.bindings.insert(
            name,
            Binding::Lazy {
                factory: Arc::new(factory),
                cell: OnceLock::new(),
            },
        );
    }

    /// Register a type for a class, keyed by the class's identifier
    ///
    /// Returns the derived key, e.g. `billing.invoice_line` for
    /// `Billing::InvoiceLine`.
    pub fn register_class<F>(
        &mut self,
        class_name: &str,
        primitive: PrimitiveKind,
        constructor: F,
    ) -> String
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        let key = identifier(class_name);
        let ty = Type::new(key.clone(), primitive).with_constructor(constructor);
        self.register(key.clone(), ty);
        key
    }

    /// Register a Rust type whose serde implementation acts as constructor
    ///
    /// Values are deserialized into `T` and serialized back, so whatever
    /// normalization `T` performs is applied. The key is derived from the
    /// type's path.
    pub fn register_for<T>(&mut self) -> String
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        let key = identifier(std::any::type_name::<T>());
        let expected = key.clone();
        let ty = Type::new(key.clone(), PrimitiveKind::Any).with_constructor(move |value| {
            let parsed: T = serde_json::from_value(value.clone())
                .map_err(|_| TypeError::invalid_value(value, expected.clone()))?;
            serde_json::to_value(parsed)
                .map_err(|e| TypeError::InvalidComposition(format!("{}: {}", expected, e)))
        });
        self.register(key.clone(), ty);
        key
    }

    /// Look up a key, running its factory if the binding is lazy
    pub fn resolve(&self, name: &str) -> Result<Type> {
        self.bindings
            .get(name)
            .map(Binding::get)
            .ok_or_else(|| TypeError::UnknownType {
                name: name.to_string(),
            })
    }

    /// Resolve a type reference; types pass through unchanged
    pub fn resolve_ref(&self, type_ref: &TypeRef) -> Result<Type> {
        match type_ref {
            TypeRef::Spec(name) => self.resolve(name),
            TypeRef::Type(ty) => Ok(ty.clone()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.bindings.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Registered keys resembling `name`, best match first
    pub fn suggest(&self, name: &str, limit: usize) -> Vec<&str> {
        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &str)> = self
            .bindings
            .keys()
            .filter_map(|key| matcher.fuzzy_match(key, name).map(|score| (score, key.as_str())))
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored.into_iter().take(limit).map(|(_, key)| key).collect()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_unknown_type() {
        let registry = TypeRegistry::new();
        assert_eq!(
            registry.resolve("string").unwrap_err(),
            TypeError::UnknownType { name: "string".into() }
        );
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = TypeRegistry::new();
        registry.register("string", Type::nominal(PrimitiveKind::String));

        let a = registry.resolve("string").unwrap();
        let b = registry.resolve("string").unwrap();
        assert!(Type::ptr_eq(&a, &b));
        assert!(registry.contains("string"));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = TypeRegistry::new();
        registry.register("id", Type::nominal(PrimitiveKind::String));
        registry.register("id", Type::nominal(PrimitiveKind::Integer));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("id").unwrap().primitive(), PrimitiveKind::Integer);
    }

    #[test]
    fn test_lazy_factory_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut registry = TypeRegistry::new();
        registry.register_lazy("bool", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Type::nominal(PrimitiveKind::Bool)
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let a = registry.resolve("bool").unwrap();
        let b = registry.resolve("bool").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Type::ptr_eq(&a, &b));
    }

    #[test]
    fn test_register_class() {
        let mut registry = TypeRegistry::new();
        let key = registry.register_class("Billing::FlatList", PrimitiveKind::Array, |value| {
            match value {
                Value::Array(items) => Ok(Value::Array(
                    items
                        .into_iter()
                        .flat_map(|item| match item {
                            Value::Array(inner) => inner,
                            other => vec![other],
                        })
                        .collect(),
                )),
                other => Ok(other),
            }
        });

        assert_eq!(key, "billing.flat_list");
        let flat = registry.resolve("billing.flat_list").unwrap();
        assert_eq!(flat.build(json!([[1], [2]])).unwrap(), json!([1, 2]));
    }

    #[derive(Serialize, Deserialize)]
    struct Money {
        amount: i64,
        #[serde(default = "default_currency")]
        currency: String,
    }

    fn default_currency() -> String {
        "EUR".to_string()
    }

    #[test]
    fn test_register_for_serde_type() {
        let mut registry = TypeRegistry::new();
        let key = registry.register_for::<Money>();
        assert_eq!(key, identifier(std::any::type_name::<Money>()));
        assert!(key.ends_with(".money"));

        let money = registry.resolve(&key).unwrap();
        assert_eq!(
            money.build(json!({"amount": 5})).unwrap(),
            json!({"amount": 5, "currency": "EUR"})
        );
        assert!(matches!(
            money.build(json!({"amount": "five"})),
            Err(TypeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_resolve_ref_passes_types_through() {
        let registry = TypeRegistry::new();
        let custom = Type::nominal(PrimitiveKind::Float).named("custom");
        let resolved = registry.resolve_ref(&TypeRef::from(&custom)).unwrap();
        assert!(Type::ptr_eq(&custom, &resolved));
    }

    #[test]
    fn test_suggest() {
        let mut registry = TypeRegistry::new();
        registry.register("string", Type::nominal(PrimitiveKind::String));
        registry.register("integer", Type::nominal(PrimitiveKind::Integer));

        assert_eq!(registry.suggest("strng", 3), vec!["string"]);
        assert!(registry.suggest("qqq", 3).is_empty());
    }
}
