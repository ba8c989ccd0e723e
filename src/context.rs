//! Type context
//!
//! A [`TypeContext`] owns one registry, one resolution cache and one set of
//! builders. Contexts are constructed explicitly and passed to whatever
//! needs to resolve types, so independent contexts can live side by side
//! (one per test, for instance).
//!
//! ```
//! use familiar_types::TypeContext;
//! use serde_json::json;
//!
//! let ctx = TypeContext::with_builtins();
//! let matrix = ctx.resolve("array<array<integer>>").unwrap();
//!
//! assert!(matrix.build(json!([[1, 2], [3]])).is_ok());
//! assert!(matrix.build(json!([[1, 2], ["3"]])).is_err());
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::builder::BuilderRegistry;
use crate::builtins::{self, Namespaces};
use crate::cache::TypeCache;
use crate::error::Result;
use crate::kind::PrimitiveKind;
use crate::naming::identifier;
use crate::registry::{TypeRef, TypeRegistry};
use crate::spec::split;
use crate::structs::StructBuilder;
use crate::types::Type;

/// Registry, cache and builders for one independent type universe
#[derive(Debug, Default)]
pub struct TypeContext {
    registry: TypeRegistry,
    cache: TypeCache,
    builders: BuilderRegistry,
}

impl TypeContext {
    /// An empty context with nothing registered
    pub fn new() -> Self {
        Self::default()
    }

    /// A context with the built-in primitives registered
    pub fn with_builtins() -> Self {
        let mut ctx = Self::new();
        ctx.install_builtins(Namespaces::default());
        ctx
    }

    /// Register the built-in primitives and the selected namespaces
    pub fn install_builtins(&mut self, namespaces: Namespaces) {
        builtins::install_with(&mut self.registry, namespaces);
        self.cache.clear();
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &TypeCache {
        &self.cache
    }

    pub fn builders(&self) -> &BuilderRegistry {
        &self.builders
    }

    /// Bind a type under a key
    ///
    /// Cached resolutions that mention the key are dropped so they pick up
    /// the new binding.
    pub fn register(&mut self, name: impl Into<String>, ty: Type) {
        let name = name.into();
        self.cache.invalidate(&name);
        self.registry.register(name, ty);
    }

    pub fn register_lazy<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Type + Send + Sync + 'static,
    {
        let name = name.into();
        self.cache.invalidate(&name);
        self.registry.register_lazy(name, factory);
    }

    /// See [`TypeRegistry::register_class`]
    pub fn register_class<F>(
        &mut self,
        class_name: &str,
        primitive: PrimitiveKind,
        constructor: F,
    ) -> String
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.cache.invalidate(&identifier(class_name));
        self.registry.register_class(class_name, primitive, constructor)
    }

    /// See [`TypeRegistry::register_for`]
    pub fn register_for<T>(&mut self) -> String
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        let key = self.registry.register_for::<T>();
        self.cache.invalidate(&key);
        key
    }

    /// Resolve a key, a parametric spec, or pass an existing type through
    ///
    /// Spec strings are memoized: resolving the same string again returns
    /// the same instance.
    pub fn resolve(&self, type_ref: impl Into<TypeRef>) -> Result<Type> {
        match type_ref.into() {
            TypeRef::Type(ty) => Ok(ty),
            TypeRef::Spec(spec) => self.resolve_spec(&spec),
        }
    }

    /// Resolve the innermost key first, then wrap it one container at a
    /// time, caching every level under its own spec text.
    fn resolve_spec(&self, spec: &str) -> Result<Type> {
        if let Some(hit) = self.cache.get(spec) {
            return Ok(hit);
        }

        let parts = split(spec)?;
        let mut resolved = self
            .cache
            .fetch_or_build(parts.leaf, || self.registry.resolve(parts.leaf))?;

        for level in parts.levels.iter().rev() {
            let member = resolved;
            resolved = self.cache.fetch_or_build(level.spec, || {
                self.registry.resolve(level.container)?.with_member(member)
            })?;
        }
        Ok(resolved)
    }

    /// Declare a struct from `(field, spec)` pairs and register it
    ///
    /// Field specs are resolved immediately. The struct type is registered
    /// under the identifier of `name`, so `"User"` can be referred to as
    /// `user` (and `array<user>`) afterwards.
    pub fn define_struct<I, K, V>(&mut self, name: &str, fields: I) -> Result<Type>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<TypeRef>,
    {
        let schema = fields
            .into_iter()
            .fold(StructBuilder::new(name), |builder, (field, ty)| {
                builder.field(field, ty)
            })
            .build(self)?;

        let ty = schema.to_type();
        self.register(identifier(name), ty.clone());
        Ok(ty)
    }

    /// Define (or redefine) a named builder
    pub fn define_builder<F>(&mut self, name: impl Into<String>, builder: F)
    where
        F: Fn(&Type, &[Value]) -> Result<Type> + Send + Sync + 'static,
    {
        self.builders.define(name, builder);
    }

    pub fn remove_builder(&mut self, name: &str) -> bool {
        self.builders.remove(name)
    }

    /// Resolve `ty` and apply the named builder to it
    pub fn apply_builder(
        &self,
        ty: impl Into<TypeRef>,
        name: &str,
        args: &[Value],
    ) -> Result<Type> {
        let ty = self.resolve(ty)?;
        self.builders.apply(name, &ty, args)
    }
}
