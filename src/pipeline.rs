//! Deployment pipeline
//!
//! Raw documents in, one validated [`EffectiveConfiguration`] out:
//! - parse both documents independently
//! - merge the vendor tree into the specification tree
//! - validate the effective tree
//!
//! A deployment fails as a whole at the first failing stage; the error says
//! which stage that was.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::effective::EffectiveConfiguration;
use crate::merge::{merge, MergeConflict};
use crate::parser::{self, DocumentKind, ParseDiagnostic, ParseError};
use crate::schema::MergeSchema;
use crate::validate::Violation;

/// Pipeline stage that rejected a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Parse,
    Merge,
    Validation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Parse => f.write_str("parse"),
            Stage::Merge => f.write_str("merge"),
            Stage::Validation => f.write_str("validation"),
        }
    }
}

/// Deployment errors, one variant per stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeploymentError {
    /// Every document that failed to parse.
    #[error("{} document(s) failed to parse", .0.len())]
    Parse(Vec<ParseError>),

    #[error("merge conflict: {0}")]
    Merge(#[from] MergeConflict),

    /// The complete violation set.
    #[error("{} validation violation(s)", .0.len())]
    Validation(Vec<Violation>),
}

impl DeploymentError {
    pub fn stage(&self) -> Stage {
        match self {
            DeploymentError::Parse(_) => Stage::Parse,
            DeploymentError::Merge(_) => Stage::Merge,
            DeploymentError::Validation(_) => Stage::Validation,
        }
    }

    /// One human-readable line per underlying problem.
    pub fn messages(&self) -> Vec<String> {
        match self {
            DeploymentError::Parse(errors) => errors.iter().map(ToString::to_string).collect(),
            DeploymentError::Merge(conflict) => vec![conflict.to_string()],
            DeploymentError::Validation(violations) => {
                violations.iter().map(ToString::to_string).collect()
            }
        }
    }
}

/// Raw bytes of one descriptor plus their provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    kind: DocumentKind,
    path: Option<PathBuf>,
    bytes: Vec<u8>,
    sha256: String,
}

impl LoadedDocument {
    pub fn from_bytes(kind: DocumentKind, bytes: Vec<u8>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let sha256 = hex::encode(hasher.finalize());
        Self {
            kind,
            path: None,
            bytes,
            sha256,
        }
    }

    pub fn from_str(kind: DocumentKind, text: &str) -> Self {
        Self::from_bytes(kind, text.as_bytes().to_vec())
    }

    /// Read a descriptor file. The file is read once and closed before return.
    pub fn from_path(kind: DocumentKind, path: &Path) -> Result<Self, ParseError> {
        let bytes = fs::read(path).map_err(|e| {
            ParseError::unreadable(kind, format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut document = Self::from_bytes(kind, bytes);
        document.path = Some(path.to_path_buf());
        Ok(document)
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hex SHA-256 digest of the raw bytes.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }
}

/// The documents of one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentInput {
    pub specification: LoadedDocument,
    pub vendor: Option<LoadedDocument>,
}

impl DeploymentInput {
    pub fn new(specification: LoadedDocument) -> Self {
        Self {
            specification,
            vendor: None,
        }
    }

    pub fn with_vendor(mut self, vendor: LoadedDocument) -> Self {
        self.vendor = Some(vendor);
        self
    }

    /// Read both documents from disk, reporting every unreadable file.
    pub fn from_paths(specification: &Path, vendor: Option<&Path>) -> Result<Self, DeploymentError> {
        let specification = LoadedDocument::from_path(DocumentKind::Specification, specification);
        let vendor = vendor.map(|path| LoadedDocument::from_path(DocumentKind::Vendor, path));

        match (specification, vendor.transpose()) {
            (Ok(specification), Ok(vendor)) => Ok(Self {
                specification,
                vendor,
            }),
            (specification, vendor) => Err(DeploymentError::Parse(
                specification.err().into_iter().chain(vendor.err()).collect(),
            )),
        }
    }

    /// All documents in precedence order.
    pub fn documents(&self) -> impl Iterator<Item = &LoadedDocument> {
        std::iter::once(&self.specification).chain(self.vendor.as_ref())
    }
}

/// An accepted deployment.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub configuration: EffectiveConfiguration,
    /// Parse diagnostics of both documents, specification first.
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Run a deployment through parse, merge and validation.
pub fn deploy(input: &DeploymentInput, schema: &MergeSchema) -> Result<Deployment, DeploymentError> {
    let specification = parser::decode(DocumentKind::Specification, input.specification.bytes())
        .and_then(parser::parse_specification);
    let vendor = input
        .vendor
        .as_ref()
        .map(|document| {
            parser::decode(DocumentKind::Vendor, document.bytes()).and_then(parser::parse_vendor)
        })
        .transpose();

    let (specification, vendor) = match (specification, vendor) {
        (Ok(specification), Ok(vendor)) => (specification, vendor),
        (specification, vendor) => {
            let errors: Vec<ParseError> =
                specification.err().into_iter().chain(vendor.err()).collect();
            for error in &errors {
                warn!(document = %error.document, path = %error.path, "{}", error.reason);
            }
            return Err(DeploymentError::Parse(errors));
        }
    };

    let mut diagnostics = specification.diagnostics;
    let vendor = vendor.map(|parsed| {
        diagnostics.extend(parsed.diagnostics);
        parsed.value
    });
    debug!(diagnostics = diagnostics.len(), "parsed deployment documents");

    let configuration = merge(specification.value, vendor, schema)?;

    let violations = configuration.validate();
    if !violations.is_empty() {
        warn!(violations = violations.len(), "effective configuration rejected");
        return Err(DeploymentError::Validation(violations));
    }

    info!(
        connectors = configuration.connectors().len(),
        "deployment accepted"
    );
    Ok(Deployment {
        configuration,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SPEC: &str = r#"<connector version="1.7">
  <resourceadapter>
    <outbound-resourceadapter>
      <authentication-mechanism>
        <authentication-mechanism-type>BasicPassword</authentication-mechanism-type>
        <credential-interface>javax.resource.spi.security.PasswordCredential</credential-interface>
      </authentication-mechanism>
    </outbound-resourceadapter>
  </resourceadapter>
</connector>"#;

    #[test]
    fn test_specification_only() {
        let input = DeploymentInput::new(LoadedDocument::from_str(DocumentKind::Specification, SPEC));
        let deployment = deploy(&input, &MergeSchema::default()).unwrap();
        assert_eq!(deployment.configuration.connectors().len(), 1);
        assert!(deployment.diagnostics.is_empty());
    }

    #[test]
    fn test_both_parse_failures_are_reported() {
        let input = DeploymentInput::new(LoadedDocument::from_str(
            DocumentKind::Specification,
            "<connector><resourceadapter>",
        ))
        .with_vendor(LoadedDocument::from_str(DocumentKind::Vendor, "<bogus/>"));

        let err = deploy(&input, &MergeSchema::default()).unwrap_err();
        assert_eq!(err.stage(), Stage::Parse);
        match err {
            DeploymentError::Parse(errors) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].document, DocumentKind::Specification);
                assert_eq!(errors[1].document, DocumentKind::Vendor);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_merge_stage_is_distinguished() {
        let vendor = r#"<connector><resourceadapter><outbound-resourceadapter>
  <authentication-mechanism>
    <authentication-mechanism-type>Kerbv5</authentication-mechanism-type>
  </authentication-mechanism>
</outbound-resourceadapter></resourceadapter></connector>"#;
        let input = DeploymentInput::new(LoadedDocument::from_str(DocumentKind::Specification, SPEC))
            .with_vendor(LoadedDocument::from_str(DocumentKind::Vendor, vendor));

        let err = deploy(&input, &MergeSchema::default()).unwrap_err();
        assert_eq!(err.stage(), Stage::Merge);
        assert_eq!(err.messages().len(), 1);
    }

    #[test]
    fn test_invalid_utf8_is_a_parse_failure() {
        let input = DeploymentInput::new(LoadedDocument::from_bytes(
            DocumentKind::Specification,
            vec![0xff, 0xfe, 0x00],
        ));
        let err = deploy(&input, &MergeSchema::default()).unwrap_err();
        assert_eq!(err.stage(), Stage::Parse);
    }

    #[test]
    fn test_digest_of_raw_bytes() {
        let document = LoadedDocument::from_str(DocumentKind::Vendor, "");
        assert_eq!(
            document.sha256(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_from_paths() {
        let mut spec = NamedTempFile::new().unwrap();
        spec.write_all(SPEC.as_bytes()).unwrap();

        let input = DeploymentInput::from_paths(spec.path(), None).unwrap();
        assert_eq!(input.specification.path(), Some(spec.path()));
        assert_eq!(input.documents().count(), 1);

        let missing = spec.path().with_extension("missing");
        let err = DeploymentInput::from_paths(&missing, Some(&missing)).unwrap_err();
        assert!(matches!(err, DeploymentError::Parse(ref errors) if errors.len() == 2));
    }
}
