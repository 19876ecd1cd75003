//! Deployment report
//!
//! Machine-readable record of one deployment attempt: which documents went
//! in (with digests), what the parser noticed, and either the effective tree
//! or the stage that rejected it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use ra_metadata::SpecificationDescriptor;

use crate::parser::{DocumentKind, ParseDiagnostic};
use crate::pipeline::{Deployment, DeploymentError, DeploymentInput, Stage};
use crate::validate::Violation;

/// Schema version for deployment reports
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "ra-descriptor/deployment_report@1";

/// Overall outcome of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Accepted,
    Rejected,
}

/// A contributing document with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSource {
    pub kind: DocumentKind,

    /// File path (None for in-memory documents)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentReport {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When this report was produced
    pub created_at: DateTime<Utc>,

    pub status: Status,

    /// Stage that rejected the deployment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<Stage>,

    /// Contributing documents in precedence order
    pub sources: Vec<ReportSource>,

    #[serde(default)]
    pub diagnostics: Vec<ParseDiagnostic>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,

    /// Parse errors and merge conflicts, one line each
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,

    /// The effective tree (accepted deployments only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective: Option<SpecificationDescriptor>,
}

impl DeploymentReport {
    /// Build a report from the outcome of [`crate::pipeline::deploy`].
    pub fn new(input: &DeploymentInput, outcome: &Result<Deployment, DeploymentError>) -> Self {
        let mut report = Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            status: Status::Accepted,
            failed_stage: None,
            sources: input
                .documents()
                .map(|document| ReportSource {
                    kind: document.kind(),
                    path: document.path().map(|p| p.to_string_lossy().to_string()),
                    sha256: document.sha256().to_string(),
                })
                .collect(),
            diagnostics: Vec::new(),
            violations: Vec::new(),
            errors: Vec::new(),
            effective: None,
        };

        match outcome {
            Ok(deployment) => {
                report.diagnostics = deployment.diagnostics.clone();
                report.effective = Some(deployment.configuration.descriptor().clone());
            }
            Err(err) => {
                report.status = Status::Rejected;
                report.failed_stage = Some(err.stage());
                match err {
                    DeploymentError::Validation(violations) => {
                        report.violations = violations.clone();
                    }
                    other => report.errors = other.messages(),
                }
            }
        }
        report
    }

    pub fn is_accepted(&self) -> bool {
        self.status == Status::Accepted
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report to a file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::other)?;
        fs::write(path, json)
    }
}
