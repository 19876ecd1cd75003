//! Merge engine
//!
//! Combines a specification tree and an optional vendor tree into one
//! effective tree. Element pairs come from the identity resolver; fields of a
//! pair merge according to the declared [`policy`] table; unmatched vendor
//! elements are additions, allowed only in collections the [`MergeSchema`]
//! marks extensible.
//!
//! Merging consumes both trees and builds a new one. The first conflict, in
//! specification document order, aborts the merge.

pub mod policy;

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use ra_metadata::{
    AuthenticationMechanism, ConfigProperty, ConnectionDefinition, ConnectorDefinition,
    Identified, PoolSettings, SpecificationDescriptor, VendorAuthenticationMechanism,
    VendorConfigProperty, VendorConnectionDefinition, VendorConnector, VendorOverrideDescriptor,
};

use crate::effective::EffectiveConfiguration;
use crate::identity;
use crate::schema::{Collection, CollectionPolicy, MergeSchema};

use policy::{CredentialSelector, FieldMerger};

pub use policy::{policy_for, FieldPolicy, FieldRule, FIELD_RULES};

/// A vendor descriptor that cannot be reconciled with the specification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "conflict", rename_all = "snake_case")]
pub enum MergeConflict {
    #[error("{path}: vendor descriptor changes immutable field {field} from {spec} to {vendor}")]
    ImmutableField {
        path: String,
        field: String,
        spec: String,
        vendor: String,
    },

    #[error("{path}: {collection} '{key}' has no specification counterpart and the collection is closed")]
    ClosedCollection {
        path: String,
        collection: Collection,
        key: String,
    },
}

impl MergeConflict {
    /// Tree path of the offending element.
    pub fn path(&self) -> &str {
        match self {
            Self::ImmutableField { path, .. } | Self::ClosedCollection { path, .. } => path,
        }
    }
}

/// Merge `vendor` into `spec`.
///
/// Without a vendor descriptor the result is the specification tree unchanged.
/// The result is not validated; see [`crate::validate`].
pub fn merge(
    spec: SpecificationDescriptor,
    vendor: Option<VendorOverrideDescriptor>,
    schema: &MergeSchema,
) -> Result<EffectiveConfiguration, MergeConflict> {
    let rules = Arc::new(schema.validation.clone());
    let Some(vendor) = vendor else {
        debug!("no vendor descriptor, specification tree is effective as-is");
        return Ok(EffectiveConfiguration::new(spec, rules));
    };

    let merger = Merger { schema };
    let tree = merger.descriptor(spec, vendor).map_err(|conflict| {
        warn!(path = conflict.path(), %conflict, "merge conflict");
        conflict
    })?;

    info!(connectors = tree.connectors.len(), "merged vendor descriptor");
    Ok(EffectiveConfiguration::new(tree, rules))
}

/// Tree path of the `index`th member of `collection` under `parent`.
///
/// Paths read `connector[0].config-property[2]`; the root has no parent.
pub fn child_path(parent: &str, collection: Collection, index: usize) -> String {
    if parent.is_empty() {
        format!("{}[{}]", collection.element_name(), index)
    } else {
        format!("{}.{}[{}]", parent, collection.element_name(), index)
    }
}

struct Merger<'a> {
    schema: &'a MergeSchema,
}

impl Merger<'_> {
    fn descriptor(
        &self,
        spec: SpecificationDescriptor,
        vendor: VendorOverrideDescriptor,
    ) -> Result<SpecificationDescriptor, MergeConflict> {
        let fields = FieldMerger::new("descriptor", "");
        let connectors = self.collection(
            "",
            Collection::Connectors,
            spec.connectors,
            vendor.connectors,
            |path, s, v| self.connector(path, s, v),
        )?;
        Ok(SpecificationDescriptor {
            connectors,
            extensions: fields.extensions(spec.extensions, vendor.extensions),
        })
    }

    /// Merge one collection: matched pairs in specification order, then
    /// additions in vendor order.
    fn collection<S, V>(
        &self,
        parent: &str,
        collection: Collection,
        spec: Vec<S>,
        vendor: Vec<V>,
        mut merge_pair: impl FnMut(&str, S, V) -> Result<S, MergeConflict>,
    ) -> Result<Vec<S>, MergeConflict>
    where
        S: Identified + From<V>,
        V: Identified,
    {
        let matching = identity::resolve(&spec, &vendor);
        debug!(
            path = parent,
            %collection,
            pairs = matching.pairs.len(),
            additions = matching.additions.len(),
            "matched collection"
        );

        let mut vendor_slots: Vec<Option<V>> = vendor.into_iter().map(Some).collect();
        let mut merged = Vec::with_capacity(spec.len() + matching.additions.len());

        for (si, element) in spec.into_iter().enumerate() {
            let path = child_path(parent, collection, si);
            let counterpart = matching
                .vendor_for(si)
                .and_then(|vi| vendor_slots.get_mut(vi))
                .and_then(Option::take);
            merged.push(match counterpart {
                Some(v) => merge_pair(&path, element, v)?,
                None => element,
            });
        }

        let closed = self.schema.policy(collection) == CollectionPolicy::Closed;
        for vi in matching.additions {
            let Some(addition) = vendor_slots.get_mut(vi).and_then(Option::take) else {
                continue;
            };
            let path = child_path(parent, collection, merged.len());
            if closed {
                let key = addition
                    .explicit_id()
                    .or_else(|| addition.inferred_id())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{}", vi));
                return Err(MergeConflict::ClosedCollection {
                    path,
                    collection,
                    key,
                });
            }
            debug!(path = %path, "vendor addition");
            merged.push(S::from(addition));
        }

        Ok(merged)
    }

    fn connector(
        &self,
        path: &str,
        spec: ConnectorDefinition,
        vendor: VendorConnector,
    ) -> Result<ConnectorDefinition, MergeConflict> {
        let f = FieldMerger::new("connector", path);

        let version = f.optional("version", spec.version, vendor.version)?;
        let config_properties = self.collection(
            path,
            Collection::ConfigProperties,
            spec.config_properties,
            vendor.config_properties,
            |p, s, v| self.config_property(p, s, v),
        )?;
        let connection_definitions = self.collection(
            path,
            Collection::ConnectionDefinitions,
            spec.connection_definitions,
            vendor.connection_definitions,
            |p, s, v| self.connection_definition(p, s, v),
        )?;
        let authentication_mechanisms = self.collection(
            path,
            Collection::AuthenticationMechanisms,
            spec.authentication_mechanisms,
            vendor.authentication_mechanisms,
            |p, s, v| self.authentication_mechanism(p, s, v),
        )?;

        Ok(ConnectorDefinition {
            id: spec.id,
            version,
            descriptions: f.descriptions(spec.descriptions, vendor.descriptions),
            display_name: f.optional("display-name", spec.display_name, vendor.display_name)?,
            vendor_name: f.optional("vendor-name", spec.vendor_name, vendor.vendor_name)?,
            eis_type: f.optional("eis-type", spec.eis_type, vendor.eis_type)?,
            resourceadapter_version: f.optional(
                "resourceadapter-version",
                spec.resourceadapter_version,
                vendor.resourceadapter_version,
            )?,
            license_required: f.optional(
                "license-required",
                spec.license_required,
                vendor.license_required,
            )?,
            resourceadapter_class: f.optional(
                "resourceadapter-class",
                spec.resourceadapter_class,
                vendor.resourceadapter_class,
            )?,
            config_properties,
            connection_definitions,
            transaction_support: f.optional(
                "transaction-support",
                spec.transaction_support,
                vendor.transaction_support,
            )?,
            authentication_mechanisms,
            reauthentication_support: f.optional(
                "reauthentication-support",
                spec.reauthentication_support,
                vendor.reauthentication_support,
            )?,
            extensions: f.extensions(spec.extensions, vendor.extensions),
        })
    }

    fn authentication_mechanism(
        &self,
        path: &str,
        spec: AuthenticationMechanism,
        vendor: VendorAuthenticationMechanism,
    ) -> Result<AuthenticationMechanism, MergeConflict> {
        let f = FieldMerger::new("authentication-mechanism", path);

        let sets_credential_interface = vendor.sets_credential_interface();
        let mechanism_type =
            f.value("authentication-mechanism-type", spec.mechanism_type, vendor.mechanism_type)?;

        let vendor_selector = sets_credential_interface.then(|| CredentialSelector {
            kind: vendor.credential_interface,
            custom: vendor.custom_credential_interface,
        });
        let selector = f.value(
            "credential-interface",
            CredentialSelector {
                kind: spec.credential_interface,
                custom: spec.custom_credential_interface,
            },
            vendor_selector,
        )?;

        Ok(AuthenticationMechanism {
            id: spec.id,
            descriptions: f.descriptions(spec.descriptions, vendor.descriptions),
            mechanism_type,
            credential_interface: selector.kind,
            custom_credential_interface: selector.custom,
            extensions: f.extensions(spec.extensions, vendor.extensions),
        })
    }

    fn config_property(
        &self,
        path: &str,
        spec: ConfigProperty,
        vendor: VendorConfigProperty,
    ) -> Result<ConfigProperty, MergeConflict> {
        let f = FieldMerger::new("config-property", path);

        Ok(ConfigProperty {
            id: spec.id,
            name: f.value("config-property-name", spec.name, vendor.name)?,
            property_type: f.value(
                "config-property-type",
                spec.property_type,
                vendor.property_type,
            )?,
            value: f.optional("config-property-value", spec.value, vendor.value)?,
            ignore: f.optional("config-property-ignore", spec.ignore, vendor.ignore)?,
            supports_dynamic_updates: f.optional(
                "config-property-supports-dynamic-updates",
                spec.supports_dynamic_updates,
                vendor.supports_dynamic_updates,
            )?,
            confidential: f.optional(
                "config-property-confidential",
                spec.confidential,
                vendor.confidential,
            )?,
            descriptions: f.descriptions(spec.descriptions, vendor.descriptions),
            extensions: f.extensions(spec.extensions, vendor.extensions),
        })
    }

    fn connection_definition(
        &self,
        path: &str,
        spec: ConnectionDefinition,
        vendor: VendorConnectionDefinition,
    ) -> Result<ConnectionDefinition, MergeConflict> {
        let f = FieldMerger::new("connection-definition", path);

        let connection_factory_interface = f.value(
            "connectionfactory-interface",
            spec.connection_factory_interface,
            vendor.connection_factory_interface,
        )?;
        let config_properties = self.collection(
            path,
            Collection::ConfigProperties,
            spec.config_properties,
            vendor.config_properties,
            |p, s, v| self.config_property(p, s, v),
        )?;
        let pool = match (spec.pool, vendor.pool) {
            (Some(s), Some(v)) => Some(pool(&f, s, v)?),
            (s, v) => v.or(s),
        };

        Ok(ConnectionDefinition {
            id: spec.id,
            managed_connection_factory_class: f.value(
                "managedconnectionfactory-class",
                spec.managed_connection_factory_class,
                vendor.managed_connection_factory_class,
            )?,
            config_properties,
            connection_factory_interface,
            connection_factory_impl_class: f.value(
                "connectionfactory-impl-class",
                spec.connection_factory_impl_class,
                vendor.connection_factory_impl_class,
            )?,
            connection_interface: f.value(
                "connection-interface",
                spec.connection_interface,
                vendor.connection_interface,
            )?,
            connection_impl_class: f.value(
                "connection-impl-class",
                spec.connection_impl_class,
                vendor.connection_impl_class,
            )?,
            jndi_name: f.optional("jndi-name", spec.jndi_name, vendor.jndi_name)?,
            pool_name: f.optional("pool-name", spec.pool_name, vendor.pool_name)?,
            enabled: f.optional("enabled", spec.enabled, vendor.enabled)?,
            pool,
            extensions: f.extensions(spec.extensions, vendor.extensions),
        })
    }
}

fn pool(
    f: &FieldMerger<'_>,
    spec: PoolSettings,
    vendor: PoolSettings,
) -> Result<PoolSettings, MergeConflict> {
    Ok(PoolSettings {
        min_pool_size: f.optional("min-pool-size", spec.min_pool_size, vendor.min_pool_size)?,
        max_pool_size: f.optional("max-pool-size", spec.max_pool_size, vendor.max_pool_size)?,
        prefill: f.optional("prefill", spec.prefill, vendor.prefill)?,
    })
}
