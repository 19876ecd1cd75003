//! Descriptor parser
//!
//! Converts one XML document into a typed tree. Both descriptor kinds share
//! one element grammar: the specification parser additionally enforces the
//! children the specification mandates and leaves vendor-only elements to
//! the extension path, the vendor parser accepts every child as optional.
//!
//! Unrecognized elements never fail a parse. They are preserved as
//! [`ExtensionElement`](ra_metadata::ExtensionElement)s and reported as
//! [`ParseDiagnostic`]s. A child the grammar allows once that appears twice,
//! or element nesting beyond a fixed depth, does fail it.

mod grammar;
mod xml;

pub(crate) use xml::parse_bool;

use serde::{Deserialize, Serialize};
use std::fmt;

use ra_metadata::{SpecificationDescriptor, VendorOverrideDescriptor};

use xml::XmlCursor;

/// Which of the two descriptor sources a document is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Specification,
    Vendor,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Specification => f.write_str("specification descriptor"),
            Self::Vendor => f.write_str("vendor descriptor"),
        }
    }
}

/// A document that could not be turned into a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{document}: {reason} at {path} (byte {position})")]
pub struct ParseError {
    pub document: DocumentKind,
    /// Path of the offending element, e.g. `/connector/resourceadapter`.
    pub path: String,
    /// Byte offset reached by the reader when the error was detected.
    pub position: usize,
    pub reason: String,
}

impl ParseError {
    /// Failure before any XML was read (unreadable or undecodable input).
    pub fn unreadable(document: DocumentKind, reason: impl Into<String>) -> Self {
        Self {
            document,
            path: "/".to_string(),
            position: 0,
            reason: reason.into(),
        }
    }
}

/// Non-fatal findings recorded while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParseDiagnostic {
    /// Element outside the recognized vocabulary, kept as extension data.
    UnknownElement {
        document: DocumentKind,
        path: String,
        name: String,
    },
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownElement {
                document,
                path,
                name,
            } => write!(f, "{}: unrecognized element <{}> at {} preserved", document, name, path),
        }
    }
}

/// A parsed tree together with the diagnostics collected while parsing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Parse a specification descriptor.
pub fn parse_specification(input: &str) -> Result<Parsed<SpecificationDescriptor>, ParseError> {
    let mut cursor = XmlCursor::new(DocumentKind::Specification, input);
    let root = cursor.root()?;
    let vendor_shaped = grammar::document(&mut cursor, root)?;
    let diagnostics = cursor.finish()?;
    tracing::debug!(
        connectors = vendor_shaped.connectors.len(),
        diagnostics = diagnostics.len(),
        "parsed specification descriptor"
    );
    Ok(Parsed {
        // Required children were enforced while parsing.
        value: vendor_shaped.into(),
        diagnostics,
    })
}

/// Parse a vendor override descriptor.
pub fn parse_vendor(input: &str) -> Result<Parsed<VendorOverrideDescriptor>, ParseError> {
    let mut cursor = XmlCursor::new(DocumentKind::Vendor, input);
    let root = cursor.root()?;
    let value = grammar::document(&mut cursor, root)?;
    let diagnostics = cursor.finish()?;
    tracing::debug!(
        connectors = value.connectors.len(),
        diagnostics = diagnostics.len(),
        "parsed vendor descriptor"
    );
    Ok(Parsed { value, diagnostics })
}

/// Decode raw bytes as UTF-8 before parsing.
pub fn decode(document: DocumentKind, bytes: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes)
        .map_err(|err| ParseError::unreadable(document, format!("invalid UTF-8: {}", err)))
}
