//! Validation reports every problem at once
//!
//! A merged tree with N independent problems is rejected with exactly N
//! violations, each at the path of the offending element.

mod fixtures;

use pretty_assertions::assert_eq;

use fixtures::{adapter_spec, adapter_vendor, input};
use ra_descriptor::{deploy, DeploymentError, DeploymentReport, MergeSchema, Stage, Violation};

const SPEC: &str = r#"<connector version="1.7">
  <resourceadapter>
    <config-property>
      <config-property-name>ServerName</config-property-name>
      <config-property-type>java.lang.String</config-property-type>
    </config-property>
    <config-property>
      <config-property-name>PortNumber</config-property-name>
      <config-property-type>java.lang.Integer</config-property-type>
      <config-property-value>not-a-port</config-property-value>
    </config-property>
    <config-property>
      <config-property-name>ServerName</config-property-name>
      <config-property-type>java.lang.String</config-property-type>
    </config-property>
    <config-property>
      <config-property-name>Deadline</config-property-name>
      <config-property-type>java.util.Date</config-property-type>
    </config-property>
    <outbound-resourceadapter>
      <connection-definition>
        <managedconnectionfactory-class>com.acme.ra.Mcf</managedconnectionfactory-class>
        <connectionfactory-interface>javax.resource.cci.ConnectionFactory</connectionfactory-interface>
        <connectionfactory-impl-class>com.acme.ra.Cf</connectionfactory-impl-class>
        <connection-interface>javax.resource.cci.Connection</connection-interface>
        <connection-impl-class>com.acme.ra.Conn</connection-impl-class>
      </connection-definition>
      <authentication-mechanism>
        <authentication-mechanism-type>Magic</authentication-mechanism-type>
        <credential-interface>password-credential</credential-interface>
      </authentication-mechanism>
      <authentication-mechanism>
        <authentication-mechanism-type>BasicPassword</authentication-mechanism-type>
        <credential-interface>javax.resource.spi.security.PasswordCredential</credential-interface>
        <custom-credential-interface>com.acme.TokenCredential</custom-credential-interface>
      </authentication-mechanism>
    </outbound-resourceadapter>
  </resourceadapter>
</connector>"#;

const VENDOR: &str = r#"<connector>
  <resourceadapter>
    <outbound-resourceadapter>
      <connection-definition>
        <connectionfactory-interface>javax.resource.cci.ConnectionFactory</connectionfactory-interface>
        <pool>
          <min-pool-size>10</min-pool-size>
          <max-pool-size>2</max-pool-size>
        </pool>
      </connection-definition>
    </outbound-resourceadapter>
  </resourceadapter>
</connector>"#;

fn violations(err: DeploymentError) -> Vec<Violation> {
    match err {
        DeploymentError::Validation(violations) => violations,
        other => panic!("expected validation failure, got {other}"),
    }
}

#[test]
fn test_six_problems_yield_six_violations() {
    let err = deploy(&input(SPEC, Some(VENDOR)), &MergeSchema::default()).unwrap_err();
    assert_eq!(err.stage(), Stage::Validation);

    let found: Vec<(String, String)> = violations(err)
        .iter()
        .map(|v| (v.path.clone(), v.to_code()))
        .collect();
    let expected: Vec<(String, String)> = [
        ("connector[0].config-property[2]", "DUPLICATE_IDENTIFIER:ServerName"),
        (
            "connector[0].config-property[1]",
            "INVALID_CONFIG_PROPERTY_VALUE:java.lang.Integer=not-a-port",
        ),
        (
            "connector[0].config-property[3]",
            "UNKNOWN_CONFIG_PROPERTY_TYPE:java.util.Date",
        ),
        ("connector[0].connection-definition[0]", "POOL_SIZE_RANGE:10>2"),
        ("connector[0].authentication-mechanism[0]", "UNKNOWN_MECHANISM_TYPE:Magic"),
        (
            "connector[0].authentication-mechanism[1]",
            "CREDENTIAL_INTERFACE_CONFLICT:password-credential+com.acme.TokenCredential",
        ),
    ]
    .iter()
    .map(|(p, c)| (p.to_string(), c.to_string()))
    .collect();

    assert_eq!(found, expected);
}

#[test]
fn test_fixing_one_problem_removes_exactly_one_violation() {
    let fixed = SPEC.replace("not-a-port", "5432");
    let err = deploy(&input(&fixed, Some(VENDOR)), &MergeSchema::default()).unwrap_err();
    assert_eq!(violations(err).len(), 5);
}

#[test]
fn test_schema_rules_feed_the_validator() {
    let schema = MergeSchema::from_str(
        r#"
[validation]
extra_mechanism_types = ["Magic"]
"#,
    )
    .unwrap();
    let err = deploy(&input(SPEC, Some(VENDOR)), &schema).unwrap_err();
    let codes: Vec<String> = violations(err).iter().map(Violation::to_code).collect();
    assert_eq!(codes.len(), 5);
    assert!(!codes.iter().any(|c| c.starts_with("UNKNOWN_MECHANISM_TYPE")));
}

#[test]
fn test_custom_credential_forbidden_by_schema() {
    let spec = adapter_spec();
    let schema = MergeSchema::from_str(
        r#"
[validation]
allow_custom_credential_interfaces = false
"#,
    )
    .unwrap();
    let vendor = r#"<connector>
  <resourceadapter>
    <outbound-resourceadapter>
      <authentication-mechanism>
        <custom-credential-interface>com.acme.TokenCredential</custom-credential-interface>
      </authentication-mechanism>
    </outbound-resourceadapter>
  </resourceadapter>
</connector>"#;

    let err = deploy(&input(&spec, Some(vendor)), &schema).unwrap_err();
    let codes: Vec<String> = violations(err).iter().map(Violation::to_code).collect();
    assert_eq!(
        codes,
        vec!["CUSTOM_CREDENTIAL_NOT_ALLOWED:com.acme.TokenCredential".to_string()]
    );
}

#[test]
fn test_rejected_report_lists_every_violation() {
    let input = input(SPEC, Some(VENDOR));
    let outcome = deploy(&input, &MergeSchema::default());
    let report = DeploymentReport::new(&input, &outcome);

    assert!(!report.is_accepted());
    assert_eq!(report.violations.len(), 6);
    assert!(report.effective.is_none());

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["status"], "rejected");
    assert_eq!(json["failed_stage"], "validation");
    assert_eq!(json["violations"][3]["type"], "POOL_SIZE_RANGE");
}

#[test]
fn test_accepted_fixture_has_no_violations() {
    let deployment = deploy(
        &input(&adapter_spec(), Some(&adapter_vendor())),
        &MergeSchema::default(),
    )
    .unwrap();
    assert!(deployment.configuration.validate().is_empty());
}
