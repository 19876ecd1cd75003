//! Descriptor fixtures shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ra_descriptor::{DeploymentInput, DocumentKind, LoadedDocument};

/// Path to a file under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Contents of a fixture file
pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", name, e))
}

/// Full outbound adapter descriptor
pub fn adapter_spec() -> String {
    read_fixture("ra.xml")
}

/// Vendor tuning for [`adapter_spec`]
pub fn adapter_vendor() -> String {
    read_fixture("ironjacamar.xml")
}

/// Single authentication mechanism, no identifiers
pub fn scenario_spec() -> String {
    read_fixture("scenario/ra.xml")
}

pub fn scenario_vendor(name: &str) -> String {
    read_fixture(&format!("scenario/{}.xml", name))
}

/// Deployment input from in-memory documents
pub fn input(spec: &str, vendor: Option<&str>) -> DeploymentInput {
    let input = DeploymentInput::new(LoadedDocument::from_str(DocumentKind::Specification, spec));
    match vendor {
        Some(vendor) => input.with_vendor(LoadedDocument::from_str(DocumentKind::Vendor, vendor)),
        None => input,
    }
}
