//! Validator
//!
//! Walks an effective tree and collects every violation. Validation never
//! stops at the first problem; a tree with N independent problems yields N
//! violations.

mod violation;

use tracing::debug;

use ra_metadata::{
    AuthenticationMechanism, ConfigProperty, ConnectionDefinition, ConnectorDefinition,
    Identified, PoolSettings, SpecificationDescriptor,
};

use crate::merge::child_path;
use crate::schema::{Collection, ValidationRules};

pub use violation::{violation_codes, Violation, ViolationKind};

/// Java types a config property may declare.
pub const CONFIG_PROPERTY_TYPES: &[&str] = &[
    "java.lang.Boolean",
    "java.lang.String",
    "java.lang.Integer",
    "java.lang.Double",
    "java.lang.Byte",
    "java.lang.Short",
    "java.lang.Long",
    "java.lang.Float",
    "java.lang.Character",
];

/// Validate an effective tree under `rules`.
pub fn validate(tree: &SpecificationDescriptor, rules: &ValidationRules) -> Vec<Violation> {
    let mut validator = Validator {
        rules,
        violations: Vec::new(),
    };
    validator.descriptor(tree);
    debug!(violations = validator.violations.len(), "validated effective tree");
    validator.violations
}

struct Validator<'a> {
    rules: &'a ValidationRules,
    violations: Vec<Violation>,
}

impl Validator<'_> {
    fn report(&mut self, path: &str, kind: ViolationKind) {
        self.violations.push(Violation::new(path, kind));
    }

    fn required(&mut self, path: &str, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.report(path, ViolationKind::MissingRequiredField(field.to_string()));
        }
    }

    fn descriptor(&mut self, tree: &SpecificationDescriptor) {
        self.duplicates("", Collection::Connectors, &tree.connectors);
        for (i, connector) in tree.connectors.iter().enumerate() {
            self.connector(&child_path("", Collection::Connectors, i), connector);
        }
    }

    fn connector(&mut self, path: &str, connector: &ConnectorDefinition) {
        self.config_properties(path, &connector.config_properties);

        self.duplicates(
            path,
            Collection::ConnectionDefinitions,
            &connector.connection_definitions,
        );
        for (i, definition) in connector.connection_definitions.iter().enumerate() {
            let child = child_path(path, Collection::ConnectionDefinitions, i);
            self.connection_definition(&child, definition);
        }

        self.duplicates(
            path,
            Collection::AuthenticationMechanisms,
            &connector.authentication_mechanisms,
        );
        for (i, mechanism) in connector.authentication_mechanisms.iter().enumerate() {
            let child = child_path(path, Collection::AuthenticationMechanisms, i);
            self.authentication_mechanism(&child, mechanism);
        }
    }

    fn config_properties(&mut self, parent: &str, properties: &[ConfigProperty]) {
        self.duplicates(parent, Collection::ConfigProperties, properties);
        for (i, property) in properties.iter().enumerate() {
            let path = child_path(parent, Collection::ConfigProperties, i);
            self.config_property(&path, property);
        }
    }

    fn config_property(&mut self, path: &str, property: &ConfigProperty) {
        self.required(path, "config-property-name", &property.name);

        if property.property_type.trim().is_empty() {
            self.required(path, "config-property-type", &property.property_type);
            return;
        }
        if !CONFIG_PROPERTY_TYPES.contains(&property.property_type.as_str()) {
            self.report(
                path,
                ViolationKind::UnknownConfigPropertyType(property.property_type.clone()),
            );
            return;
        }
        if let Some(value) = &property.value {
            if !value_matches_type(&property.property_type, value) {
                self.report(
                    path,
                    ViolationKind::InvalidConfigPropertyValue {
                        property_type: property.property_type.clone(),
                        value: value.clone(),
                    },
                );
            }
        }
    }

    fn connection_definition(&mut self, path: &str, definition: &ConnectionDefinition) {
        self.required(
            path,
            "managedconnectionfactory-class",
            &definition.managed_connection_factory_class,
        );
        self.required(
            path,
            "connectionfactory-interface",
            &definition.connection_factory_interface,
        );
        self.required(
            path,
            "connectionfactory-impl-class",
            &definition.connection_factory_impl_class,
        );
        self.required(path, "connection-interface", &definition.connection_interface);
        self.required(path, "connection-impl-class", &definition.connection_impl_class);

        self.config_properties(path, &definition.config_properties);

        if let Some(PoolSettings {
            min_pool_size: Some(min),
            max_pool_size: Some(max),
            ..
        }) = definition.pool
        {
            if min > max {
                self.report(path, ViolationKind::PoolSizeRange { min, max });
            }
        }
    }

    fn authentication_mechanism(&mut self, path: &str, mechanism: &AuthenticationMechanism) {
        if mechanism.mechanism_type.trim().is_empty() {
            self.required(path, "authentication-mechanism-type", &mechanism.mechanism_type);
        } else if !self.rules.is_known_mechanism_type(&mechanism.mechanism_type) {
            self.report(
                path,
                ViolationKind::UnknownMechanismType(mechanism.mechanism_type.clone()),
            );
        }

        match (&mechanism.credential_interface, &mechanism.custom_credential_interface) {
            (Some(kind), Some(custom)) => self.report(
                path,
                ViolationKind::CredentialInterfaceConflict {
                    kind: *kind,
                    custom: custom.clone(),
                },
            ),
            (None, None) => self.report(path, ViolationKind::CredentialInterfaceMissing),
            (None, Some(custom)) if !self.rules.allow_custom_credential_interfaces => self.report(
                path,
                ViolationKind::CustomCredentialNotAllowed(custom.clone()),
            ),
            _ => {}
        }
    }

    /// One violation per element whose key repeats an earlier sibling's.
    fn duplicates<T: Identified>(&mut self, parent: &str, collection: Collection, elements: &[T]) {
        for (i, element) in elements.iter().enumerate() {
            let earlier = &elements[..i];
            let duplicate = element
                .explicit_id()
                .filter(|id| earlier.iter().any(|e| e.explicit_id() == Some(*id)))
                .or_else(|| {
                    element
                        .inferred_id()
                        .filter(|key| earlier.iter().any(|e| e.inferred_id() == Some(*key)))
                });
            if let Some(key) = duplicate {
                let path = child_path(parent, collection, i);
                self.report(&path, ViolationKind::DuplicateIdentifier(key.to_string()));
            }
        }
    }
}

/// Whether `value` parses as the Java type `property_type`.
fn value_matches_type(property_type: &str, value: &str) -> bool {
    let value = value.trim();
    match property_type {
        "java.lang.String" => true,
        "java.lang.Boolean" => value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false"),
        "java.lang.Integer" => value.parse::<i32>().is_ok(),
        "java.lang.Long" => value.parse::<i64>().is_ok(),
        "java.lang.Short" => value.parse::<i16>().is_ok(),
        "java.lang.Byte" => value.parse::<i8>().is_ok(),
        "java.lang.Double" => value.parse::<f64>().is_ok(),
        "java.lang.Float" => value.parse::<f32>().is_ok(),
        "java.lang.Character" => value.chars().count() == 1,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ra_metadata::CredentialInterface;

    fn connector() -> ConnectorDefinition {
        ConnectorDefinition {
            config_properties: vec![ConfigProperty {
                name: "Port".to_string(),
                property_type: "java.lang.Integer".to_string(),
                value: Some("5432".to_string()),
                ..Default::default()
            }],
            authentication_mechanisms: vec![AuthenticationMechanism {
                mechanism_type: "BasicPassword".to_string(),
                credential_interface: Some(CredentialInterface::PasswordCredential),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn tree(connector: ConnectorDefinition) -> SpecificationDescriptor {
        SpecificationDescriptor {
            connectors: vec![connector],
            ..Default::default()
        }
    }

    fn codes(tree: &SpecificationDescriptor, rules: &ValidationRules) -> Vec<String> {
        violation_codes(&validate(tree, rules))
    }

    #[test]
    fn test_valid_tree_has_no_violations() {
        assert!(validate(&tree(connector()), &ValidationRules::default()).is_empty());
    }

    #[test]
    fn test_credential_interface_both_forms() {
        let mut c = connector();
        c.authentication_mechanisms[0].custom_credential_interface =
            Some("com.acme.Token".to_string());
        assert_eq!(
            codes(&tree(c), &ValidationRules::default()),
            vec!["CREDENTIAL_INTERFACE_CONFLICT:password-credential+com.acme.Token"]
        );
    }

    #[test]
    fn test_credential_interface_missing() {
        let mut c = connector();
        c.authentication_mechanisms[0].credential_interface = None;
        let violations = validate(&tree(c), &ValidationRules::default());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "connector[0].authentication-mechanism[0]");
        assert_eq!(violations[0].kind, ViolationKind::CredentialInterfaceMissing);
    }

    #[test]
    fn test_custom_credential_disallowed_by_schema() {
        let mut c = connector();
        c.authentication_mechanisms[0].credential_interface = None;
        c.authentication_mechanisms[0].custom_credential_interface =
            Some("com.acme.Token".to_string());
        assert!(validate(&tree(c.clone()), &ValidationRules::default()).is_empty());

        let rules = ValidationRules {
            allow_custom_credential_interfaces: false,
            ..Default::default()
        };
        assert_eq!(
            codes(&tree(c), &rules),
            vec!["CUSTOM_CREDENTIAL_NOT_ALLOWED:com.acme.Token"]
        );
    }

    #[test]
    fn test_unknown_mechanism_type_respects_extensibility() {
        let mut c = connector();
        c.authentication_mechanisms[0].mechanism_type = "Digest".to_string();
        assert_eq!(
            codes(&tree(c.clone()), &ValidationRules::default()),
            vec!["UNKNOWN_MECHANISM_TYPE:Digest"]
        );

        let rules = ValidationRules {
            extra_mechanism_types: vec!["Digest".to_string()],
            ..Default::default()
        };
        assert!(validate(&tree(c), &rules).is_empty());
    }

    #[test]
    fn test_config_property_types_and_values() {
        let mut c = connector();
        c.config_properties[0].value = Some("not-a-number".to_string());
        c.config_properties.push(ConfigProperty {
            name: "Mode".to_string(),
            property_type: "java.util.List".to_string(),
            ..Default::default()
        });
        assert_eq!(
            codes(&tree(c), &ValidationRules::default()),
            vec![
                "INVALID_CONFIG_PROPERTY_VALUE:java.lang.Integer=not-a-number",
                "UNKNOWN_CONFIG_PROPERTY_TYPE:java.util.List",
            ]
        );
    }

    #[test]
    fn test_duplicate_names_reported_on_later_element() {
        let mut c = connector();
        let duplicate = c.config_properties[0].clone();
        c.config_properties.push(duplicate);
        let violations = validate(&tree(c), &ValidationRules::default());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "connector[0].config-property[1]");
        assert_eq!(violations[0].to_code(), "DUPLICATE_IDENTIFIER:Port");
    }

    #[test]
    fn test_connection_definition_rules() {
        let mut c = connector();
        c.connection_definitions.push(ConnectionDefinition {
            managed_connection_factory_class: "com.acme.Mcf".to_string(),
            connection_factory_interface: "javax.sql.DataSource".to_string(),
            connection_factory_impl_class: "com.acme.Cf".to_string(),
            connection_interface: "java.sql.Connection".to_string(),
            connection_impl_class: String::new(),
            pool: Some(PoolSettings {
                min_pool_size: Some(20),
                max_pool_size: Some(5),
                prefill: None,
            }),
            ..Default::default()
        });
        assert_eq!(
            codes(&tree(c), &ValidationRules::default()),
            vec![
                "MISSING_REQUIRED_FIELD:connection-impl-class",
                "POOL_SIZE_RANGE:20>5",
            ]
        );
    }

    #[test]
    fn test_exhaustive_collection() {
        let mut c = connector();
        c.config_properties[0].value = Some("x".to_string());
        c.authentication_mechanisms[0].mechanism_type = "Digest".to_string();
        c.authentication_mechanisms[0].credential_interface = None;
        c.authentication_mechanisms.push(AuthenticationMechanism::default());
        // Second mechanism: missing type and missing credential interface.
        assert_eq!(validate(&tree(c), &ValidationRules::default()).len(), 5);
    }

    #[test]
    fn test_value_matches_type() {
        assert!(value_matches_type("java.lang.Boolean", "TRUE"));
        assert!(!value_matches_type("java.lang.Boolean", "yes"));
        assert!(value_matches_type("java.lang.Byte", "-128"));
        assert!(!value_matches_type("java.lang.Byte", "128"));
        assert!(value_matches_type("java.lang.Character", "x"));
        assert!(!value_matches_type("java.lang.Character", "xy"));
        assert!(value_matches_type("java.lang.String", ""));
    }
}
