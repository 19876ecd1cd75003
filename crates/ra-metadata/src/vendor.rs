//! Vendor override descriptor tree.
//!
//! Structurally mirrors the specification tree with every field optional.
//! The `From` conversions promote a vendor element that has no specification
//! counterpart into specification shape; required fields it leaves out
//! become empty strings, which validation reports.

use serde::{Deserialize, Serialize};

use crate::credential::CredentialInterface;
use crate::extension::ExtensionElement;
use crate::spec::{
    AuthenticationMechanism, ConfigProperty, ConnectionDefinition, ConnectorDefinition,
    PoolSettings, SpecificationDescriptor,
};
use crate::text::LocalizedText;
use crate::transaction::TransactionSupport;

/// Root of a parsed vendor override descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorOverrideDescriptor {
    pub connectors: Vec<VendorConnector>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorConnector {
    pub id: Option<String>,
    pub version: Option<String>,
    pub descriptions: Vec<LocalizedText>,
    pub display_name: Option<String>,
    pub vendor_name: Option<String>,
    pub eis_type: Option<String>,
    pub resourceadapter_version: Option<String>,
    pub license_required: Option<bool>,
    pub resourceadapter_class: Option<String>,
    pub config_properties: Vec<VendorConfigProperty>,
    pub connection_definitions: Vec<VendorConnectionDefinition>,
    pub transaction_support: Option<TransactionSupport>,
    pub authentication_mechanisms: Vec<VendorAuthenticationMechanism>,
    pub reauthentication_support: Option<bool>,
    pub extensions: Vec<ExtensionElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorAuthenticationMechanism {
    pub id: Option<String>,
    pub descriptions: Vec<LocalizedText>,
    pub mechanism_type: Option<String>,
    pub credential_interface: Option<CredentialInterface>,
    pub custom_credential_interface: Option<String>,
    pub extensions: Vec<ExtensionElement>,
}

impl VendorAuthenticationMechanism {
    /// True when the vendor element selects a credential interface in any form.
    pub fn sets_credential_interface(&self) -> bool {
        self.credential_interface.is_some() || self.custom_credential_interface.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorConfigProperty {
    pub id: Option<String>,
    pub descriptions: Vec<LocalizedText>,
    pub name: Option<String>,
    pub property_type: Option<String>,
    pub value: Option<String>,
    pub ignore: Option<bool>,
    pub supports_dynamic_updates: Option<bool>,
    pub confidential: Option<bool>,
    pub extensions: Vec<ExtensionElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorConnectionDefinition {
    pub id: Option<String>,
    pub managed_connection_factory_class: Option<String>,
    pub config_properties: Vec<VendorConfigProperty>,
    pub connection_factory_interface: Option<String>,
    pub connection_factory_impl_class: Option<String>,
    pub connection_interface: Option<String>,
    pub connection_impl_class: Option<String>,
    pub jndi_name: Option<String>,
    pub pool_name: Option<String>,
    pub enabled: Option<bool>,
    pub pool: Option<PoolSettings>,
    pub extensions: Vec<ExtensionElement>,
}

impl From<VendorOverrideDescriptor> for SpecificationDescriptor {
    fn from(vendor: VendorOverrideDescriptor) -> Self {
        Self {
            connectors: vendor.connectors.into_iter().map(Into::into).collect(),
            extensions: vendor.extensions,
        }
    }
}

impl From<VendorConnector> for ConnectorDefinition {
    fn from(vendor: VendorConnector) -> Self {
        Self {
            id: vendor.id,
            version: vendor.version,
            descriptions: vendor.descriptions,
            display_name: vendor.display_name,
            vendor_name: vendor.vendor_name,
            eis_type: vendor.eis_type,
            resourceadapter_version: vendor.resourceadapter_version,
            license_required: vendor.license_required,
            resourceadapter_class: vendor.resourceadapter_class,
            config_properties: vendor.config_properties.into_iter().map(Into::into).collect(),
            connection_definitions: vendor
                .connection_definitions
                .into_iter()
                .map(Into::into)
                .collect(),
            transaction_support: vendor.transaction_support,
            authentication_mechanisms: vendor
                .authentication_mechanisms
                .into_iter()
                .map(Into::into)
                .collect(),
            reauthentication_support: vendor.reauthentication_support,
            extensions: vendor.extensions,
        }
    }
}

impl From<VendorAuthenticationMechanism> for AuthenticationMechanism {
    fn from(vendor: VendorAuthenticationMechanism) -> Self {
        Self {
            id: vendor.id,
            descriptions: vendor.descriptions,
            mechanism_type: vendor.mechanism_type.unwrap_or_default(),
            credential_interface: vendor.credential_interface,
            custom_credential_interface: vendor.custom_credential_interface,
            extensions: vendor.extensions,
        }
    }
}

impl From<VendorConfigProperty> for ConfigProperty {
    fn from(vendor: VendorConfigProperty) -> Self {
        Self {
            id: vendor.id,
            descriptions: vendor.descriptions,
            name: vendor.name.unwrap_or_default(),
            property_type: vendor.property_type.unwrap_or_default(),
            value: vendor.value,
            ignore: vendor.ignore,
            supports_dynamic_updates: vendor.supports_dynamic_updates,
            confidential: vendor.confidential,
            extensions: vendor.extensions,
        }
    }
}

impl From<VendorConnectionDefinition> for ConnectionDefinition {
    fn from(vendor: VendorConnectionDefinition) -> Self {
        Self {
            id: vendor.id,
            managed_connection_factory_class: vendor
                .managed_connection_factory_class
                .unwrap_or_default(),
            config_properties: vendor.config_properties.into_iter().map(Into::into).collect(),
            connection_factory_interface: vendor.connection_factory_interface.unwrap_or_default(),
            connection_factory_impl_class: vendor
                .connection_factory_impl_class
                .unwrap_or_default(),
            connection_interface: vendor.connection_interface.unwrap_or_default(),
            connection_impl_class: vendor.connection_impl_class.unwrap_or_default(),
            jndi_name: vendor.jndi_name,
            pool_name: vendor.pool_name,
            enabled: vendor.enabled,
            pool: vendor.pool,
            extensions: vendor.extensions,
        }
    }
}
