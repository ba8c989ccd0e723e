//! Configuration for type contexts
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (types.toml)
//! - Environment variables (TYPES__*)
//!
//! ## Example config file (types.toml):
//! ```toml
//! [registry]
//! builtins = true
//! optional_namespace = true
//! coercible_namespace = true
//!
//! [output]
//! format = "pretty"
//!
//! [[structs]]
//! name = "User"
//! fields = [
//!     { name = "name", type = "string" },
//!     { name = "age", type = "coercible.integer" },
//!     { name = "tags", type = "array<string>" },
//! ]
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::builtins::Namespaces;
use crate::context::TypeContext;
use crate::error::Result;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypesConfig {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Output settings for the CLI
    #[serde(default)]
    pub output: OutputConfig,

    /// Struct declarations, registered in order
    #[serde(default)]
    pub structs: Vec<StructConfig>,
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Register the built-in primitives
    #[serde(default = "default_true")]
    pub builtins: bool,

    /// Register `optional.<name>` variants of the built-ins
    #[serde(default = "default_true")]
    pub optional_namespace: bool,

    /// Register `coercible.<name>` variants of the built-ins
    #[serde(default = "default_true")]
    pub coercible_namespace: bool,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// A struct declared in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructConfig {
    /// Struct name; registered under its identifier
    pub name: String,

    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// A single struct field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,

    /// Type spec, e.g. `"array<string>"`
    #[serde(rename = "type")]
    pub spec: String,
}

fn default_true() -> bool {
    true
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            builtins: true,
            optional_namespace: true,
            coercible_namespace: true,
        }
    }
}

impl OutputFormat {
    /// Render a JSON value in this format
    pub fn render(&self, value: &serde_json::Value) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

impl TypesConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["types.toml", ".types.toml", "config/types.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "types") {
            let xdg_config = config_dir.config_dir().join("types.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (TYPES__*)
        builder = builder.add_source(
            Environment::with_prefix("TYPES")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = self
            .to_toml()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Build a context with the configured built-ins and structs
    pub fn context(&self) -> Result<TypeContext> {
        let mut ctx = TypeContext::new();
        if self.registry.builtins {
            ctx.install_builtins(Namespaces {
                optional: self.registry.optional_namespace,
                coercible: self.registry.coercible_namespace,
            });
        }

        for declared in &self.structs {
            let fields = declared
                .fields
                .iter()
                .map(|field| (field.name.as_str(), field.spec.as_str()));
            ctx.define_struct(&declared.name, fields)?;
            tracing::debug!(name = %declared.name, "registered configured struct");
        }

        Ok(ctx)
    }
}
