//! Deployment-time field overrides
//!
//! An override addresses one field of an effective tree by path:
//!
//! ```text
//! connector[SEL].display-name
//! connector[SEL].config-property[SEL].value
//! connector[SEL].connection-definition[SEL].pool.max-pool-size
//! connector[SEL].connection-definition[SEL].config-property[SEL].value
//! ```
//!
//! `SEL` is a zero-based index when it is all digits, otherwise an explicit
//! `id` or an inferred identifier (config property name, connection factory
//! interface). Selectors may contain dots; only dots outside brackets
//! separate segments.

use std::fmt;

use ra_metadata::{
    ConfigProperty, ConnectionDefinition, ConnectorDefinition, Identified, PoolSettings,
    SpecificationDescriptor, TransactionSupport,
};

use crate::parser::parse_bool;
use crate::validate::Violation;

/// Errors from building or applying overrides.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverrideError {
    #[error("invalid override path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("override path '{path}': no {element} matches selector [{selector}]")]
    UnresolvedSelector {
        path: String,
        element: String,
        selector: String,
    },

    #[error("invalid value '{value}' for '{path}': {reason}")]
    InvalidValue {
        path: String,
        value: String,
        reason: String,
    },

    #[error("derived configuration has {} violation(s)", .0.len())]
    Invalid(Vec<Violation>),
}

/// Element selector inside brackets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Index(usize),
    Key(String),
}

impl Selector {
    fn parse(text: &str) -> Self {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = text.parse() {
                return Selector::Index(index);
            }
        }
        Selector::Key(text.to_string())
    }

    /// Position of the selected element; explicit ids win over inferred ones.
    fn resolve<T: Identified>(&self, elements: &[T]) -> Option<usize> {
        match self {
            Selector::Index(index) => (*index < elements.len()).then_some(*index),
            Selector::Key(key) => elements
                .iter()
                .position(|e| e.explicit_id() == Some(key.as_str()))
                .or_else(|| {
                    elements
                        .iter()
                        .position(|e| e.inferred_id() == Some(key.as_str()))
                }),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Index(index) => write!(f, "{}", index),
            Selector::Key(key) => f.write_str(key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorField {
    DisplayName,
    VendorName,
    EisType,
    ResourceadapterVersion,
    ResourceadapterClass,
    TransactionSupport,
    ReauthenticationSupport,
    LicenseRequired,
}

impl ConnectorField {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "display-name" => Self::DisplayName,
            "vendor-name" => Self::VendorName,
            "eis-type" => Self::EisType,
            "resourceadapter-version" => Self::ResourceadapterVersion,
            "resourceadapter-class" => Self::ResourceadapterClass,
            "transaction-support" => Self::TransactionSupport,
            "reauthentication-support" => Self::ReauthenticationSupport,
            "license-required" => Self::LicenseRequired,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyField {
    Value,
    Ignore,
    SupportsDynamicUpdates,
    Confidential,
}

impl PropertyField {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "value" => Self::Value,
            "ignore" => Self::Ignore,
            "supports-dynamic-updates" => Self::SupportsDynamicUpdates,
            "confidential" => Self::Confidential,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionField {
    JndiName,
    PoolName,
    Enabled,
    MinPoolSize,
    MaxPoolSize,
    Prefill,
}

impl DefinitionField {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "jndi-name" => Self::JndiName,
            "pool-name" => Self::PoolName,
            "enabled" => Self::Enabled,
            _ => return None,
        })
    }

    fn from_pool_name(name: &str) -> Option<Self> {
        Some(match name {
            "min-pool-size" => Self::MinPoolSize,
            "max-pool-size" => Self::MaxPoolSize,
            "prefill" => Self::Prefill,
            _ => return None,
        })
    }
}

/// Field addressed by a path, below its connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTarget {
    Connector(ConnectorField),
    ConfigProperty {
        /// Owning connection definition; `None` for resource adapter properties.
        definition: Option<Selector>,
        property: Selector,
        field: PropertyField,
    },
    ConnectionDefinition {
        definition: Selector,
        field: DefinitionField,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Text,
    Flag,
    Count,
    Transaction,
}

impl FieldTarget {
    fn value_kind(&self) -> ValueKind {
        match self {
            FieldTarget::Connector(ConnectorField::TransactionSupport) => ValueKind::Transaction,
            FieldTarget::Connector(
                ConnectorField::ReauthenticationSupport | ConnectorField::LicenseRequired,
            ) => ValueKind::Flag,
            FieldTarget::Connector(_) => ValueKind::Text,
            FieldTarget::ConfigProperty { field, .. } => match field {
                PropertyField::Value => ValueKind::Text,
                _ => ValueKind::Flag,
            },
            FieldTarget::ConnectionDefinition { field, .. } => match field {
                DefinitionField::JndiName | DefinitionField::PoolName => ValueKind::Text,
                DefinitionField::Enabled | DefinitionField::Prefill => ValueKind::Flag,
                DefinitionField::MinPoolSize | DefinitionField::MaxPoolSize => ValueKind::Count,
            },
        }
    }
}

/// A parsed override path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    connector: Selector,
    target: FieldTarget,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, OverrideError> {
        let invalid = |reason: &str| OverrideError::InvalidPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        let segments = split_segments(raw).map_err(|reason| invalid(&reason))?;
        let mut segments = segments.into_iter();

        let connector = match segments.next() {
            Some(("connector", Some(selector))) => Selector::parse(selector),
            _ => return Err(invalid("path must start with connector[SEL]")),
        };

        let rest: Vec<(&str, Option<&str>)> = segments.collect();
        let target = match rest.as_slice() {
            [(name, None)] => FieldTarget::Connector(
                ConnectorField::from_name(name)
                    .ok_or_else(|| invalid(&format!("unknown connector field '{}'", name)))?,
            ),
            [("config-property", Some(property)), (name, None)] => FieldTarget::ConfigProperty {
                definition: None,
                property: Selector::parse(property),
                field: property_field(name).map_err(|r| invalid(&r))?,
            },
            [("connection-definition", Some(definition)), ("config-property", Some(property)), (name, None)] => {
                FieldTarget::ConfigProperty {
                    definition: Some(Selector::parse(definition)),
                    property: Selector::parse(property),
                    field: property_field(name).map_err(|r| invalid(&r))?,
                }
            }
            [("connection-definition", Some(definition)), ("pool", None), (name, None)] => {
                FieldTarget::ConnectionDefinition {
                    definition: Selector::parse(definition),
                    field: DefinitionField::from_pool_name(name)
                        .ok_or_else(|| invalid(&format!("unknown pool field '{}'", name)))?,
                }
            }
            [("connection-definition", Some(definition)), (name, None)] => {
                FieldTarget::ConnectionDefinition {
                    definition: Selector::parse(definition),
                    field: DefinitionField::from_name(name).ok_or_else(|| {
                        invalid(&format!("unknown connection-definition field '{}'", name))
                    })?,
                }
            }
            [] => return Err(invalid("path names no field")),
            _ => return Err(invalid("unrecognized path shape")),
        };

        Ok(Self {
            raw: raw.to_string(),
            connector,
            target,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn connector(&self) -> &Selector {
        &self.connector
    }

    pub fn target(&self) -> &FieldTarget {
        &self.target
    }

    fn check_value(&self, value: &str) -> Result<(), OverrideError> {
        match self.target.value_kind() {
            ValueKind::Text => Ok(()),
            ValueKind::Flag => self.flag(value).map(drop),
            ValueKind::Count => self.count(value).map(drop),
            ValueKind::Transaction => self.transaction(value).map(drop),
        }
    }

    fn invalid_value(&self, value: &str, reason: String) -> OverrideError {
        OverrideError::InvalidValue {
            path: self.raw.clone(),
            value: value.to_string(),
            reason,
        }
    }

    fn flag(&self, value: &str) -> Result<bool, OverrideError> {
        parse_bool(value).map_err(|reason| self.invalid_value(value, reason))
    }

    fn count(&self, value: &str) -> Result<u32, OverrideError> {
        value
            .trim()
            .parse()
            .map_err(|e| self.invalid_value(value, format!("expected a non-negative integer: {}", e)))
    }

    fn transaction(&self, value: &str) -> Result<TransactionSupport, OverrideError> {
        value
            .trim()
            .parse()
            .map_err(|reason| self.invalid_value(value, reason))
    }

    fn unresolved(&self, element: &str, selector: &Selector) -> OverrideError {
        OverrideError::UnresolvedSelector {
            path: self.raw.clone(),
            element: element.to_string(),
            selector: selector.to_string(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn property_field(name: &str) -> Result<PropertyField, String> {
    PropertyField::from_name(name).ok_or_else(|| format!("unknown config-property field '{}'", name))
}

/// Split on dots outside brackets into `(name, selector)` segments.
fn split_segments(raw: &str) -> Result<Vec<(&str, Option<&str>)>, String> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in raw.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format!("unbalanced ']' at offset {}", i))?;
            }
            '.' if depth == 0 => {
                segments.push(segment(&raw[start..i])?);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unbalanced '['".to_string());
    }
    segments.push(segment(&raw[start..])?);
    Ok(segments)
}

fn segment(text: &str) -> Result<(&str, Option<&str>), String> {
    if text.is_empty() {
        return Err("empty path segment".to_string());
    }
    match text.find('[') {
        None => Ok((text, None)),
        Some(open) => {
            let selector = text[open + 1..]
                .strip_suffix(']')
                .ok_or_else(|| format!("segment '{}' has text after its selector", text))?;
            if selector.is_empty() {
                return Err(format!("segment '{}' has an empty selector", text));
            }
            Ok((&text[..open], Some(selector)))
        }
    }
}

/// An ordered set of field overrides. Setting the same path twice keeps the
/// last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOverrides {
    entries: Vec<(FieldPath, String)>,
}

impl FieldOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an override, checking the path and the value's format.
    pub fn insert(&mut self, path: &str, value: impl Into<String>) -> Result<(), OverrideError> {
        let path = FieldPath::parse(path)?;
        let value = value.into();
        path.check_value(&value)?;

        match self.entries.iter_mut().find(|(p, _)| p.raw == path.raw) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((path, value)),
        }
        Ok(())
    }

    /// Add an override written as `PATH=VALUE`.
    pub fn insert_assignment(&mut self, assignment: &str) -> Result<(), OverrideError> {
        let (path, value) = assignment
            .split_once('=')
            .ok_or_else(|| OverrideError::InvalidPath {
                path: assignment.to_string(),
                reason: "expected PATH=VALUE".to_string(),
            })?;
        self.insert(path.trim(), value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &str)> {
        self.entries.iter().map(|(p, v)| (p, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Apply one override to a tree in place.
pub(crate) fn apply(
    tree: &mut SpecificationDescriptor,
    path: &FieldPath,
    value: &str,
) -> Result<(), OverrideError> {
    let index = path
        .connector
        .resolve(&tree.connectors)
        .ok_or_else(|| path.unresolved("connector", &path.connector))?;
    let connector = &mut tree.connectors[index];

    match &path.target {
        FieldTarget::Connector(field) => apply_connector(connector, path, *field, value),
        FieldTarget::ConfigProperty {
            definition,
            property,
            field,
        } => {
            let properties = match definition {
                Some(selector) => {
                    &mut definition_mut(&mut connector.connection_definitions, path, selector)?
                        .config_properties
                }
                None => &mut connector.config_properties,
            };
            let index = property
                .resolve(properties.as_slice())
                .ok_or_else(|| path.unresolved("config-property", property))?;
            apply_property(&mut properties[index], path, *field, value)
        }
        FieldTarget::ConnectionDefinition { definition, field } => {
            let definition = definition_mut(&mut connector.connection_definitions, path, definition)?;
            apply_definition(definition, path, *field, value)
        }
    }
}

fn definition_mut<'a>(
    definitions: &'a mut [ConnectionDefinition],
    path: &FieldPath,
    selector: &Selector,
) -> Result<&'a mut ConnectionDefinition, OverrideError> {
    let index = selector
        .resolve(&*definitions)
        .ok_or_else(|| path.unresolved("connection-definition", selector))?;
    Ok(&mut definitions[index])
}

fn apply_connector(
    connector: &mut ConnectorDefinition,
    path: &FieldPath,
    field: ConnectorField,
    value: &str,
) -> Result<(), OverrideError> {
    let text = Some(value.to_string());
    match field {
        ConnectorField::DisplayName => connector.display_name = text,
        ConnectorField::VendorName => connector.vendor_name = text,
        ConnectorField::EisType => connector.eis_type = text,
        ConnectorField::ResourceadapterVersion => connector.resourceadapter_version = text,
        ConnectorField::ResourceadapterClass => connector.resourceadapter_class = text,
        ConnectorField::TransactionSupport => {
            connector.transaction_support = Some(path.transaction(value)?);
        }
        ConnectorField::ReauthenticationSupport => {
            connector.reauthentication_support = Some(path.flag(value)?);
        }
        ConnectorField::LicenseRequired => connector.license_required = Some(path.flag(value)?),
    }
    Ok(())
}

fn apply_property(
    property: &mut ConfigProperty,
    path: &FieldPath,
    field: PropertyField,
    value: &str,
) -> Result<(), OverrideError> {
    match field {
        PropertyField::Value => property.value = Some(value.to_string()),
        PropertyField::Ignore => property.ignore = Some(path.flag(value)?),
        PropertyField::SupportsDynamicUpdates => {
            property.supports_dynamic_updates = Some(path.flag(value)?);
        }
        PropertyField::Confidential => property.confidential = Some(path.flag(value)?),
    }
    Ok(())
}

fn apply_definition(
    definition: &mut ConnectionDefinition,
    path: &FieldPath,
    field: DefinitionField,
    value: &str,
) -> Result<(), OverrideError> {
    match field {
        DefinitionField::JndiName => definition.jndi_name = Some(value.to_string()),
        DefinitionField::PoolName => definition.pool_name = Some(value.to_string()),
        DefinitionField::Enabled => definition.enabled = Some(path.flag(value)?),
        DefinitionField::MinPoolSize => {
            pool_mut(definition).min_pool_size = Some(path.count(value)?);
        }
        DefinitionField::MaxPoolSize => {
            pool_mut(definition).max_pool_size = Some(path.count(value)?);
        }
        DefinitionField::Prefill => pool_mut(definition).prefill = Some(path.flag(value)?),
    }
    Ok(())
}

fn pool_mut(definition: &mut ConnectionDefinition) -> &mut PoolSettings {
    definition.pool.get_or_insert_with(PoolSettings::default)
}
