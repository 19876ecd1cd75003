//! Parse failure reporting
//!
//! Each document is parsed on its own; a broken vendor descriptor never hides
//! the specification descriptor's own errors.

mod fixtures;

use std::io::Write;

use fixtures::{adapter_spec, input, scenario_spec};
use ra_descriptor::{deploy, DeploymentError, DeploymentInput, DocumentKind, MergeSchema, Stage};
use tempfile::NamedTempFile;

fn parse_errors(err: DeploymentError) -> Vec<ra_descriptor::ParseError> {
    match err {
        DeploymentError::Parse(errors) => errors,
        other => panic!("expected parse failure, got {other}"),
    }
}

#[test]
fn test_both_documents_report_their_own_errors() {
    let spec = r#"<connector>
  <resourceadapter>
    <config-property>
      <config-property-type>java.lang.String</config-property-type>
    </config-property>
  </resourceadapter>
</connector>"#;
    let vendor = r#"<connector><resourceadapter><outbound-resourceadapter>
  <reauthentication-support>sometimes</reauthentication-support>
</outbound-resourceadapter></resourceadapter></connector>"#;

    let errors = parse_errors(deploy(&input(spec, Some(vendor)), &MergeSchema::default()).unwrap_err());
    assert_eq!(errors.len(), 2);

    assert_eq!(errors[0].document, DocumentKind::Specification);
    assert_eq!(errors[0].path, "/connector/resourceadapter/config-property");
    assert!(errors[0].reason.contains("config-property-name"), "{}", errors[0]);

    assert_eq!(errors[1].document, DocumentKind::Vendor);
    assert_eq!(
        errors[1].path,
        "/connector/resourceadapter/outbound-resourceadapter/reauthentication-support"
    );
}

#[test]
fn test_vendor_failure_alone_is_still_a_parse_failure() {
    let err = deploy(
        &input(&adapter_spec(), Some("<connector><resourceadapter>")),
        &MergeSchema::default(),
    )
    .unwrap_err();
    assert_eq!(err.stage(), Stage::Parse);

    let errors = parse_errors(err);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].document, DocumentKind::Vendor);
}

#[test]
fn test_malformed_xml() {
    let errors = parse_errors(
        deploy(&input("<connector><resourceadapter></connector>", None), &MergeSchema::default())
            .unwrap_err(),
    );
    assert_eq!(errors.len(), 1);
    assert!(errors[0].position > 0);
}

#[test]
fn test_missing_resourceadapter() {
    let errors = parse_errors(
        deploy(&input("<connector><display-name>x</display-name></connector>", None), &MergeSchema::default())
            .unwrap_err(),
    );
    assert_eq!(errors[0].path, "/connector");
    assert!(errors[0].reason.contains("resourceadapter"));
}

#[test]
fn test_unknown_transaction_support_token() {
    let spec = scenario_spec().replace(
        "</outbound-resourceadapter>",
        "<transaction-support>TwoPhase</transaction-support></outbound-resourceadapter>",
    );
    let errors = parse_errors(deploy(&input(&spec, None), &MergeSchema::default()).unwrap_err());
    assert_eq!(
        errors[0].path,
        "/connector/resourceadapter/outbound-resourceadapter/transaction-support"
    );
}

#[test]
fn test_unreadable_files_are_reported_together() {
    let dir = tempfile::tempdir().unwrap();
    let spec = dir.path().join("ra.xml");
    let vendor = dir.path().join("ironjacamar.xml");

    let errors = parse_errors(DeploymentInput::from_paths(&spec, Some(&vendor)).unwrap_err());
    assert_eq!(errors.len(), 2);
    assert!(errors[0].reason.contains("ra.xml"));
    assert!(errors[1].reason.contains("ironjacamar.xml"));
}

#[test]
fn test_files_on_disk() {
    let mut spec = NamedTempFile::new().unwrap();
    spec.write_all(scenario_spec().as_bytes()).unwrap();

    let input = DeploymentInput::from_paths(spec.path(), None).unwrap();
    let deployment = deploy(&input, &MergeSchema::default()).unwrap();
    assert_eq!(deployment.configuration.connectors().len(), 1);
    assert_eq!(input.specification.sha256().len(), 64);
}

#[test]
fn test_runaway_extension_nesting_is_rejected() {
    let depth = 10_000;
    let vendor = format!(
        "<connector><resourceadapter>{}{}</resourceadapter></connector>",
        "<acme-extra>".repeat(depth),
        "</acme-extra>".repeat(depth)
    );
    let errors = parse_errors(
        deploy(&input(&adapter_spec(), Some(&vendor)), &MergeSchema::default()).unwrap_err(),
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].document, DocumentKind::Vendor);
    assert!(errors[0].reason.contains("nesting"), "{}", errors[0]);
}
