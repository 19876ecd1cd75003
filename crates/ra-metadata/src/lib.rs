//! Resource Adapter Metadata Types
//!
//! Typed trees for the two descriptor sources of a connector deployment:
//! the portable specification descriptor and the optional vendor override
//! descriptor. Specification-level types carry required fields as plain
//! values; vendor-level types mirror them with every field optional, where
//! absence means "inherit".

pub mod credential;
pub mod extension;
pub mod identity;
pub mod spec;
pub mod text;
pub mod transaction;
pub mod vendor;

pub use credential::CredentialInterface;
pub use extension::ExtensionElement;
pub use identity::Identified;
pub use spec::{
    AuthenticationMechanism, ConfigProperty, ConnectionDefinition, ConnectorDefinition,
    PoolSettings, SpecificationDescriptor,
};
pub use text::{LocalizedText, DEFAULT_LANG};
pub use transaction::TransactionSupport;
pub use vendor::{
    VendorAuthenticationMechanism, VendorConfigProperty, VendorConnectionDefinition,
    VendorConnector, VendorOverrideDescriptor,
};
