//! Element identity.
//!
//! Mergeable elements expose an explicit identifier (the `id` attribute) and,
//! for some kinds, an identifier inferred from a field that is unique among
//! siblings. Identifiers are lookup keys only.

use crate::spec::{AuthenticationMechanism, ConfigProperty, ConnectionDefinition, ConnectorDefinition};
use crate::vendor::{
    VendorAuthenticationMechanism, VendorConfigProperty, VendorConnectionDefinition,
    VendorConnector,
};

/// Identity of a mergeable descriptor element.
pub trait Identified {
    /// Declared `id` attribute.
    fn explicit_id(&self) -> Option<&str>;

    /// Identifier inferred from the element's content, if its kind has one.
    fn inferred_id(&self) -> Option<&str> {
        None
    }

    /// True when the element carries any identifier.
    fn is_keyed(&self) -> bool {
        self.explicit_id().is_some() || self.inferred_id().is_some()
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

impl Identified for ConnectorDefinition {
    fn explicit_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Identified for VendorConnector {
    fn explicit_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Identified for AuthenticationMechanism {
    fn explicit_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Identified for VendorAuthenticationMechanism {
    fn explicit_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Identified for ConfigProperty {
    fn explicit_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn inferred_id(&self) -> Option<&str> {
        non_empty(&self.name)
    }
}

impl Identified for VendorConfigProperty {
    fn explicit_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn inferred_id(&self) -> Option<&str> {
        self.name.as_deref().and_then(non_empty)
    }
}

impl Identified for ConnectionDefinition {
    fn explicit_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn inferred_id(&self) -> Option<&str> {
        non_empty(&self.connection_factory_interface)
    }
}

impl Identified for VendorConnectionDefinition {
    fn explicit_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn inferred_id(&self) -> Option<&str> {
        self.connection_factory_interface.as_deref().and_then(non_empty)
    }
}
