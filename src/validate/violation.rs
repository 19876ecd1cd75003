//! Validation violation types.

use serde::{Deserialize, Serialize};
use std::fmt;

use ra_metadata::CredentialInterface;

/// Machine-readable violation kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "detail")]
pub enum ViolationKind {
    /// Both an enumerated credential interface and a custom class are set.
    #[serde(rename = "CREDENTIAL_INTERFACE_CONFLICT")]
    CredentialInterfaceConflict {
        kind: CredentialInterface,
        custom: String,
    },

    /// Neither credential interface form is set.
    #[serde(rename = "CREDENTIAL_INTERFACE_MISSING")]
    CredentialInterfaceMissing,

    /// A field mandatory in the effective tree is empty.
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField(String),

    /// Mechanism type is not in the known set.
    #[serde(rename = "UNKNOWN_MECHANISM_TYPE")]
    UnknownMechanismType(String),

    /// Config property type is not a supported Java type.
    #[serde(rename = "UNKNOWN_CONFIG_PROPERTY_TYPE")]
    UnknownConfigPropertyType(String),

    /// Config property value does not parse as its declared type.
    #[serde(rename = "INVALID_CONFIG_PROPERTY_VALUE")]
    InvalidConfigPropertyValue {
        property_type: String,
        value: String,
    },

    /// Two sibling elements share a key.
    #[serde(rename = "DUPLICATE_IDENTIFIER")]
    DuplicateIdentifier(String),

    /// Pool minimum exceeds maximum.
    #[serde(rename = "POOL_SIZE_RANGE")]
    PoolSizeRange { min: u32, max: u32 },

    /// Custom credential interface while the schema forbids them.
    #[serde(rename = "CUSTOM_CREDENTIAL_NOT_ALLOWED")]
    CustomCredentialNotAllowed(String),
}

impl ViolationKind {
    /// Get a machine-readable string representation.
    pub fn to_code(&self) -> String {
        match self {
            ViolationKind::CredentialInterfaceConflict { kind, custom } => {
                format!("CREDENTIAL_INTERFACE_CONFLICT:{}+{}", kind, custom)
            }
            ViolationKind::CredentialInterfaceMissing => "CREDENTIAL_INTERFACE_MISSING".to_string(),
            ViolationKind::MissingRequiredField(f) => format!("MISSING_REQUIRED_FIELD:{}", f),
            ViolationKind::UnknownMechanismType(t) => format!("UNKNOWN_MECHANISM_TYPE:{}", t),
            ViolationKind::UnknownConfigPropertyType(t) => {
                format!("UNKNOWN_CONFIG_PROPERTY_TYPE:{}", t)
            }
            ViolationKind::InvalidConfigPropertyValue {
                property_type,
                value,
            } => format!("INVALID_CONFIG_PROPERTY_VALUE:{}={}", property_type, value),
            ViolationKind::DuplicateIdentifier(k) => format!("DUPLICATE_IDENTIFIER:{}", k),
            ViolationKind::PoolSizeRange { min, max } => format!("POOL_SIZE_RANGE:{}>{}", min, max),
            ViolationKind::CustomCredentialNotAllowed(c) => {
                format!("CUSTOM_CREDENTIAL_NOT_ALLOWED:{}", c)
            }
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::CredentialInterfaceConflict { kind, custom } => write!(
                f,
                "credential interface set both as {} and as custom class '{}'",
                kind, custom
            ),
            ViolationKind::CredentialInterfaceMissing => f.write_str("no credential interface set"),
            ViolationKind::MissingRequiredField(field) => {
                write!(f, "required field <{}> is empty", field)
            }
            ViolationKind::UnknownMechanismType(t) => write!(f, "unknown mechanism type '{}'", t),
            ViolationKind::UnknownConfigPropertyType(t) => {
                write!(f, "unsupported config property type '{}'", t)
            }
            ViolationKind::InvalidConfigPropertyValue {
                property_type,
                value,
            } => write!(f, "value '{}' is not a valid {}", value, property_type),
            ViolationKind::DuplicateIdentifier(key) => write!(f, "duplicate identifier '{}'", key),
            ViolationKind::PoolSizeRange { min, max } => write!(
                f,
                "min-pool-size {} is greater than max-pool-size {}",
                min, max
            ),
            ViolationKind::CustomCredentialNotAllowed(class) => write!(
                f,
                "custom credential interface '{}' is not allowed",
                class
            ),
        }
    }
}

/// One violation found in an effective tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violation {
    /// Tree path of the offending element, e.g. `connector[0].config-property[1]`.
    pub path: String,

    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(path: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn to_code(&self) -> String {
        self.kind.to_code()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// Violations as machine-readable codes.
pub fn violation_codes(violations: &[Violation]) -> Vec<String> {
    violations.iter().map(Violation::to_code).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let violations = vec![
            Violation::new(
                "connector[0].authentication-mechanism[0]",
                ViolationKind::UnknownMechanismType("Digest".to_string()),
            ),
            Violation::new(
                "connector[0].connection-definition[0]",
                ViolationKind::PoolSizeRange { min: 10, max: 5 },
            ),
        ];
        assert_eq!(
            violation_codes(&violations),
            vec!["UNKNOWN_MECHANISM_TYPE:Digest", "POOL_SIZE_RANGE:10>5"]
        );
    }

    #[test]
    fn test_display_includes_path() {
        let violation = Violation::new(
            "connector[0].authentication-mechanism[1]",
            ViolationKind::CredentialInterfaceMissing,
        );
        assert_eq!(
            violation.to_string(),
            "connector[0].authentication-mechanism[1]: no credential interface set"
        );
    }

    #[test]
    fn test_serialization() {
        let violation = Violation::new(
            "connector[0]",
            ViolationKind::DuplicateIdentifier("ServerName".to_string()),
        );
        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["path"], "connector[0]");
        assert_eq!(json["type"], "DUPLICATE_IDENTIFIER");
        assert_eq!(json["detail"], "ServerName");
    }
}
