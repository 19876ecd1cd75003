//! Specification-level descriptor tree.
//!
//! This is also the shape of the effective configuration: merging a vendor
//! tree into a specification tree yields another tree of these types.

use serde::{Deserialize, Serialize};

use crate::credential::CredentialInterface;
use crate::extension::ExtensionElement;
use crate::text::LocalizedText;
use crate::transaction::TransactionSupport;

/// Root of a parsed specification descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationDescriptor {
    pub connectors: Vec<ConnectorDefinition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionElement>,
}

/// One connector (resource adapter) definition.
///
/// Outbound settings (connection definitions, transaction support,
/// authentication mechanisms) are flattened onto the connector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Descriptor schema version from the `version` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<LocalizedText>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eis_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resourceadapter_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_required: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resourceadapter_class: Option<String>,

    /// Adapter-level config properties.
    #[serde(default)]
    pub config_properties: Vec<ConfigProperty>,

    #[serde(default)]
    pub connection_definitions: Vec<ConnectionDefinition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_support: Option<TransactionSupport>,

    #[serde(default)]
    pub authentication_mechanisms: Vec<AuthenticationMechanism>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reauthentication_support: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionElement>,
}

/// An authentication mechanism supported by the adapter.
///
/// Exactly one of `credential_interface` and `custom_credential_interface`
/// is expected to be set; the validator reports trees where that does not
/// hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationMechanism {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<LocalizedText>,

    /// e.g. `BasicPassword`, `Kerbv5`.
    pub mechanism_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_interface: Option<CredentialInterface>,

    /// Fully qualified class name of a custom credential interface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_credential_interface: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionElement>,
}

impl AuthenticationMechanism {
    /// Class name of the selected credential interface, enumerated or custom.
    pub fn credential_interface_class(&self) -> Option<&str> {
        self.credential_interface
            .as_ref()
            .map(CredentialInterface::class_name)
            .or(self.custom_credential_interface.as_deref())
    }
}

/// A named, typed configuration property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<LocalizedText>,

    pub name: String,

    /// Java type name, e.g. `java.lang.String`.
    #[serde(rename = "type")]
    pub property_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_dynamic_updates: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidential: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionElement>,
}

/// An outbound connection definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub managed_connection_factory_class: String,

    #[serde(default)]
    pub config_properties: Vec<ConfigProperty>,

    /// Unique per adapter; doubles as the inferred identifier.
    pub connection_factory_interface: String,

    pub connection_factory_impl_class: String,

    pub connection_interface: String,

    pub connection_impl_class: String,

    /// Deployment-time binding name, vendor descriptors only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jndi_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolSettings>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionElement>,
}

/// Pool sizing metadata. Every field is optional at every level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_pool_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pool_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefill: Option<bool>,
}

impl PoolSettings {
    pub fn is_empty(&self) -> bool {
        self.min_pool_size.is_none() && self.max_pool_size.is_none() && self.prefill.is_none()
    }
}
