//! Element grammar shared by both descriptor kinds.
//!
//! Everything is parsed into the vendor-shaped tree. For specification
//! documents the mandatory children are checked when their parent closes, so
//! the conversion into the specification tree never meets a missing value.

use ra_metadata::{
    CredentialInterface, ExtensionElement, LocalizedText, PoolSettings, TransactionSupport,
    VendorAuthenticationMechanism, VendorConfigProperty, VendorConnectionDefinition,
    VendorConnector, VendorOverrideDescriptor,
};

use super::xml::{Element, XmlCursor};
use super::{DocumentKind, ParseError};

pub(super) fn document(
    cursor: &mut XmlCursor<'_>,
    root: Element,
) -> Result<VendorOverrideDescriptor, ParseError> {
    let vendor = cursor.kind() == DocumentKind::Vendor;
    let mut descriptor = VendorOverrideDescriptor::default();

    match root.name.as_str() {
        "connector" => descriptor.connectors.push(connector(cursor, root)?),
        "ironjacamar" if vendor => descriptor.connectors.push(connector(cursor, root)?),
        "connectors" => {
            while let Some(child) = cursor.next_child(&root)? {
                match child.name.as_str() {
                    "connector" => descriptor.connectors.push(connector(cursor, child)?),
                    _ => descriptor.extensions.push(cursor.unknown(child)?),
                }
            }
        }
        other => {
            let expected = if vendor {
                "<connector>, <connectors> or <ironjacamar>"
            } else {
                "<connector> or <connectors>"
            };
            return Err(cursor.error_at(
                &root,
                format!("unexpected root element <{}>, expected {}", other, expected),
            ));
        }
    }

    Ok(descriptor)
}

fn connector(cursor: &mut XmlCursor<'_>, element: Element) -> Result<VendorConnector, ParseError> {
    let mut connector = VendorConnector {
        id: element.attr("id"),
        version: element.attr("version"),
        ..Default::default()
    };
    let mut saw_adapter = false;

    while let Some(child) = cursor.next_child(&element)? {
        once(
            cursor,
            &child,
            &[
                "display-name",
                "vendor-name",
                "eis-type",
                "resourceadapter-version",
                "license",
                "resourceadapter",
            ],
        )?;
        match child.name.as_str() {
            "description" => connector.descriptions.push(localized(cursor, child)?),
            "display-name" => connector.display_name = text(cursor, child)?,
            "vendor-name" => connector.vendor_name = text(cursor, child)?,
            "eis-type" => connector.eis_type = text(cursor, child)?,
            "resourceadapter-version" => connector.resourceadapter_version = text(cursor, child)?,
            "license" => license(cursor, child, &mut connector)?,
            "resourceadapter" => {
                saw_adapter = true;
                resource_adapter(cursor, child, &mut connector)?;
            }
            _ => connector.extensions.push(cursor.unknown(child)?),
        }
    }

    if cursor.kind() == DocumentKind::Specification && !saw_adapter {
        return Err(cursor.error_at(&element, "missing required <resourceadapter>"));
    }
    Ok(connector)
}

fn license(
    cursor: &mut XmlCursor<'_>,
    element: Element,
    connector: &mut VendorConnector,
) -> Result<(), ParseError> {
    let mut descriptions = Vec::new();
    while let Some(child) = cursor.next_child(&element)? {
        once(cursor, &child, &["license-required"])?;
        match child.name.as_str() {
            "license-required" => connector.license_required = Some(cursor.read_bool(child)?),
            // License text is known vocabulary but not modeled; keep it verbatim.
            "description" => descriptions.push(cursor.capture(child)?),
            _ => connector.extensions.push(cursor.unknown(child)?),
        }
    }
    if !descriptions.is_empty() {
        connector.extensions.push(ExtensionElement {
            name: "license".to_string(),
            children: descriptions,
            ..Default::default()
        });
    }
    Ok(())
}

fn resource_adapter(
    cursor: &mut XmlCursor<'_>,
    element: Element,
    connector: &mut VendorConnector,
) -> Result<(), ParseError> {
    while let Some(child) = cursor.next_child(&element)? {
        once(cursor, &child, &["resourceadapter-class", "outbound-resourceadapter"])?;
        match child.name.as_str() {
            "resourceadapter-class" => connector.resourceadapter_class = text(cursor, child)?,
            "config-property" => connector.config_properties.push(config_property(cursor, child)?),
            "outbound-resourceadapter" => outbound(cursor, child, connector)?,
            _ => connector.extensions.push(cursor.unknown(child)?),
        }
    }
    Ok(())
}

fn outbound(
    cursor: &mut XmlCursor<'_>,
    element: Element,
    connector: &mut VendorConnector,
) -> Result<(), ParseError> {
    while let Some(child) = cursor.next_child(&element)? {
        once(cursor, &child, &["transaction-support", "reauthentication-support"])?;
        match child.name.as_str() {
            "connection-definition" => connector
                .connection_definitions
                .push(connection_definition(cursor, child)?),
            "transaction-support" => {
                connector.transaction_support =
                    Some(cursor.read_parsed(child, |t| t.parse::<TransactionSupport>())?);
            }
            "authentication-mechanism" => connector
                .authentication_mechanisms
                .push(authentication_mechanism(cursor, child)?),
            "reauthentication-support" => {
                connector.reauthentication_support = Some(cursor.read_bool(child)?);
            }
            _ => connector.extensions.push(cursor.unknown(child)?),
        }
    }
    Ok(())
}

fn authentication_mechanism(
    cursor: &mut XmlCursor<'_>,
    element: Element,
) -> Result<VendorAuthenticationMechanism, ParseError> {
    let mut mechanism = VendorAuthenticationMechanism {
        id: element.attr("id"),
        ..Default::default()
    };

    while let Some(child) = cursor.next_child(&element)? {
        once(
            cursor,
            &child,
            &[
                "authentication-mechanism-type",
                "credential-interface",
                "custom-credential-interface",
            ],
        )?;
        match child.name.as_str() {
            "description" => mechanism.descriptions.push(localized(cursor, child)?),
            "authentication-mechanism-type" => mechanism.mechanism_type = text(cursor, child)?,
            "credential-interface" => {
                if let Some(declared) = text(cursor, child)? {
                    match CredentialInterface::from_declared(&declared) {
                        Some(kind) => mechanism.credential_interface = Some(kind),
                        None => mechanism.custom_credential_interface = Some(declared),
                    }
                }
            }
            "custom-credential-interface" => {
                mechanism.custom_credential_interface = text(cursor, child)?;
            }
            _ => mechanism.extensions.push(cursor.unknown(child)?),
        }
    }

    require(cursor, &element, "authentication-mechanism-type", &mechanism.mechanism_type)?;
    if cursor.kind() == DocumentKind::Specification && !mechanism.sets_credential_interface() {
        return Err(cursor.error_at(&element, "missing required <credential-interface>"));
    }
    Ok(mechanism)
}

fn config_property(
    cursor: &mut XmlCursor<'_>,
    element: Element,
) -> Result<VendorConfigProperty, ParseError> {
    let mut property = VendorConfigProperty {
        id: element.attr("id"),
        ..Default::default()
    };

    while let Some(child) = cursor.next_child(&element)? {
        once(
            cursor,
            &child,
            &[
                "config-property-name",
                "config-property-type",
                "config-property-value",
                "config-property-ignore",
                "config-property-supports-dynamic-updates",
                "config-property-confidential",
            ],
        )?;
        match child.name.as_str() {
            "description" => property.descriptions.push(localized(cursor, child)?),
            "config-property-name" => property.name = text(cursor, child)?,
            "config-property-type" => property.property_type = text(cursor, child)?,
            // An empty value is still a value.
            "config-property-value" => property.value = Some(cursor.read_text(child)?),
            "config-property-ignore" => property.ignore = Some(cursor.read_bool(child)?),
            "config-property-supports-dynamic-updates" => {
                property.supports_dynamic_updates = Some(cursor.read_bool(child)?);
            }
            "config-property-confidential" => {
                property.confidential = Some(cursor.read_bool(child)?);
            }
            _ => property.extensions.push(cursor.unknown(child)?),
        }
    }

    require(cursor, &element, "config-property-name", &property.name)?;
    require(cursor, &element, "config-property-type", &property.property_type)?;
    Ok(property)
}

fn connection_definition(
    cursor: &mut XmlCursor<'_>,
    element: Element,
) -> Result<VendorConnectionDefinition, ParseError> {
    let vendor = cursor.kind() == DocumentKind::Vendor;
    let mut definition = VendorConnectionDefinition {
        id: element.attr("id"),
        ..Default::default()
    };

    while let Some(child) = cursor.next_child(&element)? {
        once(
            cursor,
            &child,
            &[
                "managedconnectionfactory-class",
                "connectionfactory-interface",
                "connectionfactory-impl-class",
                "connection-interface",
                "connection-impl-class",
            ],
        )?;
        if vendor {
            once(cursor, &child, &["jndi-name", "pool-name", "enabled", "pool"])?;
        }
        match child.name.as_str() {
            "managedconnectionfactory-class" => {
                definition.managed_connection_factory_class = text(cursor, child)?;
            }
            "config-property" => definition.config_properties.push(config_property(cursor, child)?),
            "connectionfactory-interface" => {
                definition.connection_factory_interface = text(cursor, child)?;
            }
            "connectionfactory-impl-class" => {
                definition.connection_factory_impl_class = text(cursor, child)?;
            }
            "connection-interface" => definition.connection_interface = text(cursor, child)?,
            "connection-impl-class" => definition.connection_impl_class = text(cursor, child)?,
            "jndi-name" if vendor => definition.jndi_name = text(cursor, child)?,
            "pool-name" if vendor => definition.pool_name = text(cursor, child)?,
            "enabled" if vendor => definition.enabled = Some(cursor.read_bool(child)?),
            "pool" if vendor => {
                definition.pool = Some(pool(cursor, child, &mut definition.extensions)?);
            }
            _ => definition.extensions.push(cursor.unknown(child)?),
        }
    }

    require(cursor, &element, "managedconnectionfactory-class", &definition.managed_connection_factory_class)?;
    require(cursor, &element, "connectionfactory-interface", &definition.connection_factory_interface)?;
    require(cursor, &element, "connectionfactory-impl-class", &definition.connection_factory_impl_class)?;
    require(cursor, &element, "connection-interface", &definition.connection_interface)?;
    require(cursor, &element, "connection-impl-class", &definition.connection_impl_class)?;
    Ok(definition)
}

fn pool(
    cursor: &mut XmlCursor<'_>,
    element: Element,
    extensions: &mut Vec<ExtensionElement>,
) -> Result<PoolSettings, ParseError> {
    let mut pool = PoolSettings::default();
    while let Some(child) = cursor.next_child(&element)? {
        once(cursor, &child, &["min-pool-size", "max-pool-size", "prefill"])?;
        match child.name.as_str() {
            "min-pool-size" => pool.min_pool_size = Some(cursor.read_u32(child)?),
            "max-pool-size" => pool.max_pool_size = Some(cursor.read_u32(child)?),
            "prefill" => pool.prefill = Some(cursor.read_bool(child)?),
            // Unknown tuning knobs land on the enclosing connection definition.
            _ => extensions.push(cursor.unknown(child)?),
        }
    }
    Ok(pool)
}

fn localized(cursor: &mut XmlCursor<'_>, element: Element) -> Result<LocalizedText, ParseError> {
    let lang = element.attr("xml:lang");
    let value = cursor.read_text(element)?;
    Ok(LocalizedText { lang, value })
}

/// Optional text leaf; empty content counts as absent.
fn text(cursor: &mut XmlCursor<'_>, element: Element) -> Result<Option<String>, ParseError> {
    let value = cursor.read_text(element)?;
    Ok(if value.is_empty() { None } else { Some(value) })
}

/// Reject a repeat of a child that may appear at most once in its parent.
fn once(cursor: &XmlCursor<'_>, child: &Element, singular: &[&str]) -> Result<(), ParseError> {
    if child.position > 1 && singular.contains(&child.name.as_str()) {
        return Err(cursor.error_at(
            child,
            format!("<{}> may appear at most once", child.name),
        ));
    }
    Ok(())
}

fn require(
    cursor: &XmlCursor<'_>,
    element: &Element,
    child: &str,
    value: &Option<String>,
) -> Result<(), ParseError> {
    if cursor.kind() == DocumentKind::Specification && value.is_none() {
        return Err(cursor.error_at(element, format!("missing required <{}>", child)));
    }
    Ok(())
}
