//! Familiar Types
//!
//! Runtime type composition and validation for dynamic (JSON) values.
//!
//! ## Features
//!
//! - **Composable Types**: Immutable validators with constructor chains,
//!   member types, optional and fallback variants
//! - **Spec Strings**: Request composites on demand, e.g. `array<array<string>>`
//! - **Memoized Resolution**: Each distinct spec is built once and shared
//! - **Structs**: Record schemas that tell missing fields from malformed ones
//! - **Builders**: Named composition operators that can be added and removed
//!
//! ## Architecture
//!
//! ```text
//! TypeContext::resolve("array<user>")
//! ├── TypeCache      hit? return the cached instance
//! ├── TypeSpec       "array" + Simple("user")
//! ├── TypeRegistry   "array" -> Type, "user" -> Type
//! └── Type           array.with_member(user) -> cached
//! ```

pub mod builder;
pub mod builtins;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod kind;
pub mod naming;
pub mod registry;
pub mod spec;
pub mod structs;
pub mod types;

pub use builder::BuilderRegistry;
pub use cache::TypeCache;
pub use config::TypesConfig;
pub use context::TypeContext;
pub use error::{Result, TypeError};
pub use kind::PrimitiveKind;
pub use naming::identifier;
pub use registry::{TypeRef, TypeRegistry};
pub use spec::TypeSpec;
pub use structs::{Field, Struct, StructBuilder};
pub use types::{Constructor, Type};
