//! Merge and validation schema (`ra-descriptor.toml`)
//!
//! Declares which element collections a vendor descriptor may extend and
//! which enumerations are open. Every field has a default, so an empty file
//! (or no file) yields the standard schema.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Mechanism types every deployment understands.
pub const STANDARD_MECHANISM_TYPES: &[&str] = &["BasicPassword", "Kerbv5"];

/// Error types for schema loading
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to read schema file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Whether a vendor descriptor may add elements the specification never declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionPolicy {
    /// Unmatched vendor elements are appended.
    Extensible,
    /// Unmatched vendor elements are merge conflicts.
    Closed,
}

/// Mergeable element collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Connectors,
    AuthenticationMechanisms,
    ConfigProperties,
    ConnectionDefinitions,
}

impl Collection {
    /// Descriptor element name of a collection member.
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::Connectors => "connector",
            Self::AuthenticationMechanisms => "authentication-mechanism",
            Self::ConfigProperties => "config-property",
            Self::ConnectionDefinitions => "connection-definition",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}

/// Per-collection extension policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionPolicies {
    pub connectors: CollectionPolicy,
    pub authentication_mechanisms: CollectionPolicy,
    pub config_properties: CollectionPolicy,
    pub connection_definitions: CollectionPolicy,
}

impl Default for CollectionPolicies {
    fn default() -> Self {
        Self {
            connectors: CollectionPolicy::Closed,
            authentication_mechanisms: CollectionPolicy::Extensible,
            config_properties: CollectionPolicy::Extensible,
            connection_definitions: CollectionPolicy::Extensible,
        }
    }
}

impl CollectionPolicies {
    pub fn policy(&self, collection: Collection) -> CollectionPolicy {
        match collection {
            Collection::Connectors => self.connectors,
            Collection::AuthenticationMechanisms => self.authentication_mechanisms,
            Collection::ConfigProperties => self.config_properties,
            Collection::ConnectionDefinitions => self.connection_definitions,
        }
    }
}

/// Rules the validator enforces on an effective tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Mechanism types accepted in addition to [`STANDARD_MECHANISM_TYPES`].
    pub extra_mechanism_types: Vec<String>,

    /// Accept any mechanism type token.
    pub mechanism_types_extensible: bool,

    /// Accept custom credential interface classes.
    pub allow_custom_credential_interfaces: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            extra_mechanism_types: Vec::new(),
            mechanism_types_extensible: false,
            allow_custom_credential_interfaces: true,
        }
    }
}

impl ValidationRules {
    pub fn is_known_mechanism_type(&self, token: &str) -> bool {
        self.mechanism_types_extensible
            || STANDARD_MECHANISM_TYPES.contains(&token)
            || self.extra_mechanism_types.iter().any(|t| t == token)
    }
}

/// Merge schema loaded from `ra-descriptor.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSchema {
    pub collections: CollectionPolicies,
    pub validation: ValidationRules,
}

impl MergeSchema {
    /// Load and parse a schema from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let contents = fs::read_to_string(path)?;
        Self::from_str(&contents)
    }

    /// Parse a schema from a TOML string
    pub fn from_str(s: &str) -> Result<Self, SchemaError> {
        let schema: MergeSchema = toml::from_str(s)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Validate the schema
    pub fn validate(&self) -> Result<(), SchemaError> {
        for token in &self.validation.extra_mechanism_types {
            if token.trim().is_empty() {
                return Err(SchemaError::ValidationError(
                    "extra_mechanism_types entries cannot be empty".to_string(),
                ));
            }
            if token.chars().any(char::is_whitespace) {
                return Err(SchemaError::ValidationError(format!(
                    "Invalid mechanism type '{}': tokens cannot contain whitespace",
                    token
                )));
            }
        }
        Ok(())
    }

    pub fn policy(&self, collection: Collection) -> CollectionPolicy {
        self.collections.policy(collection)
    }
}
