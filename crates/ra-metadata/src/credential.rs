//! Credential interface selector.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Enumerated credential interfaces understood without a custom class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialInterface {
    PasswordCredential,
    GenericCredential,
    GssCredential,
}

impl CredentialInterface {
    /// Fully qualified interface class name.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::PasswordCredential => "javax.resource.spi.security.PasswordCredential",
            Self::GenericCredential => "javax.resource.spi.security.GenericCredential",
            Self::GssCredential => "org.ietf.jgss.GSSCredential",
        }
    }

    /// Short token accepted in descriptors.
    pub fn token(&self) -> &'static str {
        match self {
            Self::PasswordCredential => "password-credential",
            Self::GenericCredential => "generic-credential",
            Self::GssCredential => "gss-credential",
        }
    }

    /// Resolve a declared value, accepting either the token or the class name.
    ///
    /// Returns `None` for anything else, which callers record as a custom
    /// interface class.
    pub fn from_declared(value: &str) -> Option<Self> {
        let value = value.trim();
        [
            Self::PasswordCredential,
            Self::GenericCredential,
            Self::GssCredential,
        ]
        .into_iter()
        .find(|kind| kind.token() == value || kind.class_name() == value)
    }
}

impl fmt::Display for CredentialInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
