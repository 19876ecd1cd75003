//! Opaque extension elements.
//!
//! Elements a parser does not recognize are kept verbatim (name, attributes,
//! text, children) on their nearest recognized parent so that merging or
//! re-serializing never loses vendor additions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An unrecognized XML element preserved as data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionElement {
    /// Local element name, namespace prefix stripped.
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    /// Concatenated, trimmed text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ExtensionElement>,
}
