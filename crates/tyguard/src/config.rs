//! Registry configuration (tyguard.toml)
//!
//! Declares named types and aliases in a file so that tools can share them
//! without code:
//!
//! ```toml
//! [registry]
//! define_defaults = true
//!
//! [types]
//! Point = "{x:number, y:number}"
//!
//! [types.User]
//! properties = { name = "string", tags = "string[]" }
//! accept_undefined_properties = true
//!
//! [aliases]
//! Coordinate = "Point"
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::compiled::Definition;
use crate::error::TypeError;
use crate::registry::{TypeOptions, TypeRegistry};

/// Errors that can occur while loading or applying a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A type table is neither an expression nor a property map
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// A type or alias could not be defined
    #[error("Failed to define \"{name}\": {source}")]
    Definition {
        /// Type or alias name
        name: String,
        /// Underlying definition error
        #[source]
        source: TypeError,
    },
}

/// Parsed tyguard.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegistryConfig {
    /// Bootstrap settings
    #[serde(default)]
    pub registry: RegistrySettings,

    /// Named types, defined in file order
    #[serde(default)]
    pub types: IndexMap<String, TypeSpec>,

    /// Aliases, defined after all types
    #[serde(default)]
    pub aliases: IndexMap<String, String>,
}

/// `[registry]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistrySettings {
    /// Register the built-ins before anything else (default: true)
    #[serde(default = "default_true")]
    pub define_defaults: bool,

    /// Register the built-ins on first use (default: true)
    #[serde(default = "default_true")]
    pub just_in_time: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            define_defaults: true,
            just_in_time: true,
        }
    }
}

/// One entry of the `[types]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TypeSpec {
    /// Type expression: `Point = "{x:number, y:number}"`
    Expression(String),

    /// Table form
    Detailed {
        /// Type expression (exclusive with `properties`)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<String>,

        /// Property name -> type expression (exclusive with `expression`)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        properties: Option<IndexMap<String, String>>,

        /// Tolerate undeclared properties
        #[serde(default)]
        accept_undefined_properties: bool,
    },
}

impl TypeSpec {
    fn to_definition(&self, name: &str) -> Result<(Definition, TypeOptions), ConfigError> {
        match self {
            TypeSpec::Expression(expression) => {
                Ok((Definition::from(expression.as_str()), TypeOptions::default()))
            }
            TypeSpec::Detailed {
                expression,
                properties,
                accept_undefined_properties,
            } => {
                let options = TypeOptions::new().accept_undefined_properties(*accept_undefined_properties);
                let definition = match (expression, properties) {
                    (Some(expression), None) => Definition::from(expression.as_str()),
                    (None, Some(properties)) => Definition::from(properties.clone()),
                    (Some(_), Some(_)) => {
                        return Err(ConfigError::Invalid(format!(
                            "type \"{}\" sets both expression and properties",
                            name
                        )))
                    }
                    (None, None) => {
                        return Err(ConfigError::Invalid(format!(
                            "type \"{}\" needs an expression or properties",
                            name
                        )))
                    }
                };
                Ok((definition, options))
            }
        }
    }
}

impl RegistryConfig {
    /// Parse a configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a configuration from a string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RegistryConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Define every type, then every alias, on `registry`
    pub fn apply(&self, registry: &mut TypeRegistry) -> Result<(), ConfigError> {
        registry.set_define_defaults_just_in_time(self.registry.just_in_time);
        if self.registry.define_defaults {
            registry.define_defaults();
        }

        for (name, spec) in &self.types {
            let (definition, options) = spec.to_definition(name)?;
            registry
                .define_type_with_options(name, definition, options)
                .map_err(|source| ConfigError::Definition {
                    name: name.clone(),
                    source,
                })?;
        }

        for (name, target) in &self.aliases {
            registry
                .define_alias(name, target)
                .map_err(|source| ConfigError::Definition {
                    name: name.clone(),
                    source,
                })?;
        }

        tracing::debug!(
            types = self.types.len(),
            aliases = self.aliases.len(),
            "applied registry config"
        );
        Ok(())
    }

    /// Fresh registry with this configuration applied
    pub fn build_registry(&self) -> Result<TypeRegistry, ConfigError> {
        let mut registry = TypeRegistry::new();
        self.apply(&mut registry)?;
        Ok(registry)
    }
}
