//! Named composition operators
//!
//! Builders extend the composition vocabulary without touching [`Type`]:
//! each one is a function from a type (plus optional arguments) to a new
//! type. Removing a builder only stops future applications; types it has
//! already produced are self-contained and keep working.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Result, TypeError};
use crate::types::Type;

type BuilderFn = dyn Fn(&Type, &[Value]) -> Result<Type> + Send + Sync;

/// Registry of named builders
#[derive(Default, Clone)]
pub struct BuilderRegistry {
    builders: HashMap<String, Arc<BuilderFn>>,
}

impl BuilderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) a builder
    pub fn define<F>(&mut self, name: impl Into<String>, builder: F)
    where
        F: Fn(&Type, &[Value]) -> Result<Type> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(name = %name, "defining type builder");
        self.builders.insert(name, Arc::new(builder));
    }

    /// Remove a builder, returning whether it existed
    pub fn remove(&mut self, name: &str) -> bool {
        tracing::debug!(name, "removing type builder");
        self.builders.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Apply a builder to a type
    pub fn apply(&self, name: &str, ty: &Type, args: &[Value]) -> Result<Type> {
        let builder = self.builders.get(name).ok_or_else(|| TypeError::UnknownBuilder {
            name: name.to_string(),
        })?;
        builder(ty, args)
    }
}

impl fmt::Debug for BuilderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderRegistry")
            .field("builders", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::PrimitiveKind;
    use serde_json::json;

    fn or_nil(ty: &Type, _: &[Value]) -> Result<Type> {
        Ok(ty.optional().with_fallback(Value::Null))
    }

    #[test]
    fn test_define_and_apply() {
        let mut builders = BuilderRegistry::new();
        builders.define("or_nil", or_nil);

        let integer = Type::nominal(PrimitiveKind::Integer);
        let t = builders.apply("or_nil", &integer, &[]).unwrap();
        assert_eq!(t.build(json!("123")).unwrap(), Value::Null);
        assert_eq!(t.build(json!(123)).unwrap(), json!(123));
    }

    #[test]
    fn test_builder_arguments() {
        let mut builders = BuilderRegistry::new();
        builders.define("or", |ty, args| match args {
            [fallback] => Ok(ty.with_fallback(fallback.clone())),
            _ => Err(TypeError::InvalidComposition(format!(
                "or expects 1 argument, got {}",
                args.len()
            ))),
        });

        let integer = Type::nominal(PrimitiveKind::Integer);
        let t = builders.apply("or", &integer, &[json!(300)]).unwrap();
        assert_eq!(t.build(json!("123")).unwrap(), json!(300));

        assert!(matches!(
            builders.apply("or", &integer, &[]),
            Err(TypeError::InvalidComposition(_))
        ));
    }

    #[test]
    fn test_removal_keeps_built_types() {
        let mut builders = BuilderRegistry::new();
        builders.define("or_nil", or_nil);
        let integer = Type::nominal(PrimitiveKind::Integer);
        let built = builders.apply("or_nil", &integer, &[]).unwrap();

        assert!(builders.remove("or_nil"));
        assert!(!builders.remove("or_nil"));

        assert_eq!(built.build(json!("x")).unwrap(), Value::Null);
        assert_eq!(
            builders.apply("or_nil", &integer, &[]).unwrap_err(),
            TypeError::UnknownBuilder { name: "or_nil".into() }
        );
        // the receiver never changed
        assert!(integer.build(json!("x")).is_err());
    }
}
