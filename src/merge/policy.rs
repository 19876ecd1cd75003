//! Field merge policies
//!
//! Every mergeable field is declared here with one of three policies:
//! - `OverrideIfPresent`: the vendor value wins when set
//! - `Append`: sequences concatenate, vendor entries replacing specification
//!   entries with the same key
//! - `ImmutableFromSpec`: the specification value is kept; a differing vendor
//!   value is a merge conflict

use serde::Serialize;

use ra_metadata::{CredentialInterface, ExtensionElement, LocalizedText, TransactionSupport};

use super::MergeConflict;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldPolicy {
    OverrideIfPresent,
    Append,
    ImmutableFromSpec,
}

/// Policy declaration for one field of one element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldRule {
    pub element: &'static str,
    pub field: &'static str,
    pub policy: FieldPolicy,
}

const fn rule(element: &'static str, field: &'static str, policy: FieldPolicy) -> FieldRule {
    FieldRule {
        element,
        field,
        policy,
    }
}

use FieldPolicy::{Append, ImmutableFromSpec, OverrideIfPresent};

/// The merge schema, field by field.
pub const FIELD_RULES: &[FieldRule] = &[
    rule("descriptor", "extensions", Append),
    rule("connector", "version", ImmutableFromSpec),
    rule("connector", "description", Append),
    rule("connector", "display-name", OverrideIfPresent),
    rule("connector", "vendor-name", OverrideIfPresent),
    rule("connector", "eis-type", OverrideIfPresent),
    rule("connector", "resourceadapter-version", OverrideIfPresent),
    rule("connector", "license-required", OverrideIfPresent),
    rule("connector", "resourceadapter-class", OverrideIfPresent),
    rule("connector", "config-property", Append),
    rule("connector", "connection-definition", Append),
    rule("connector", "transaction-support", OverrideIfPresent),
    rule("connector", "authentication-mechanism", Append),
    rule("connector", "reauthentication-support", OverrideIfPresent),
    rule("connector", "extensions", Append),
    rule("authentication-mechanism", "description", Append),
    rule("authentication-mechanism", "authentication-mechanism-type", ImmutableFromSpec),
    rule("authentication-mechanism", "credential-interface", OverrideIfPresent),
    rule("authentication-mechanism", "extensions", Append),
    rule("config-property", "description", Append),
    rule("config-property", "config-property-name", ImmutableFromSpec),
    rule("config-property", "config-property-type", ImmutableFromSpec),
    rule("config-property", "config-property-value", OverrideIfPresent),
    rule("config-property", "config-property-ignore", OverrideIfPresent),
    rule("config-property", "config-property-supports-dynamic-updates", OverrideIfPresent),
    rule("config-property", "config-property-confidential", OverrideIfPresent),
    rule("config-property", "extensions", Append),
    rule("connection-definition", "managedconnectionfactory-class", OverrideIfPresent),
    rule("connection-definition", "config-property", Append),
    rule("connection-definition", "connectionfactory-interface", ImmutableFromSpec),
    rule("connection-definition", "connectionfactory-impl-class", OverrideIfPresent),
    rule("connection-definition", "connection-interface", OverrideIfPresent),
    rule("connection-definition", "connection-impl-class", OverrideIfPresent),
    rule("connection-definition", "jndi-name", OverrideIfPresent),
    rule("connection-definition", "pool-name", OverrideIfPresent),
    rule("connection-definition", "enabled", OverrideIfPresent),
    rule("connection-definition", "min-pool-size", OverrideIfPresent),
    rule("connection-definition", "max-pool-size", OverrideIfPresent),
    rule("connection-definition", "prefill", OverrideIfPresent),
    rule("connection-definition", "extensions", Append),
];

/// Declared policy of a field.
///
/// Every field the merger touches must have a rule; a missing one panics in
/// debug builds and falls back to [`FieldPolicy::OverrideIfPresent`] in
/// release builds.
pub fn policy_for(element: &str, field: &str) -> FieldPolicy {
    let rule = FIELD_RULES
        .iter()
        .find(|r| r.element == element && r.field == field);
    debug_assert!(rule.is_some(), "no merge rule declared for {}/{}", element, field);
    rule.map(|r| r.policy).unwrap_or(OverrideIfPresent)
}

/// Human-readable rendering of a field value for conflict reports.
pub(crate) trait FieldValue: PartialEq {
    fn render(&self) -> String;
}

impl FieldValue for String {
    fn render(&self) -> String {
        format!("'{}'", self)
    }
}

impl FieldValue for bool {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl FieldValue for u32 {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl FieldValue for TransactionSupport {
    fn render(&self) -> String {
        self.as_str().to_string()
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn render(&self) -> String {
        match self {
            Some(value) => value.render(),
            None => "<absent>".to_string(),
        }
    }
}

/// The credential interface forms merged as one group, so a vendor choosing
/// a custom class also clears an enumerated choice and vice versa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CredentialSelector {
    pub kind: Option<CredentialInterface>,
    pub custom: Option<String>,
}

impl FieldValue for CredentialSelector {
    fn render(&self) -> String {
        match (&self.kind, &self.custom) {
            (Some(kind), Some(custom)) => format!("{} + '{}'", kind, custom),
            (Some(kind), None) => kind.to_string(),
            (None, Some(custom)) => format!("'{}'", custom),
            (None, None) => "<absent>".to_string(),
        }
    }
}

/// Applies declared policies for the fields of one matched element pair.
pub(crate) struct FieldMerger<'a> {
    element: &'static str,
    path: &'a str,
}

impl<'a> FieldMerger<'a> {
    pub fn new(element: &'static str, path: &'a str) -> Self {
        Self { element, path }
    }

    /// Merge a scalar field.
    pub fn value<T: FieldValue>(
        &self,
        field: &'static str,
        spec: T,
        vendor: Option<T>,
    ) -> Result<T, MergeConflict> {
        match policy_for(self.element, field) {
            ImmutableFromSpec => match vendor {
                Some(vendor) if vendor != spec => Err(MergeConflict::ImmutableField {
                    path: self.path.to_string(),
                    field: field.to_string(),
                    spec: spec.render(),
                    vendor: vendor.render(),
                }),
                _ => Ok(spec),
            },
            OverrideIfPresent | Append => Ok(vendor.unwrap_or(spec)),
        }
    }

    /// Merge a field that is optional in the specification tree too.
    pub fn optional<T: FieldValue>(
        &self,
        field: &'static str,
        spec: Option<T>,
        vendor: Option<T>,
    ) -> Result<Option<T>, MergeConflict> {
        self.value(field, spec, vendor.map(Some))
    }

    /// Merge localized descriptions; entries are keyed by language.
    pub fn descriptions(
        &self,
        spec: Vec<LocalizedText>,
        vendor: Vec<LocalizedText>,
    ) -> Vec<LocalizedText> {
        debug_assert_eq!(policy_for(self.element, "description"), Append);
        append_by_key(spec, vendor, |text| text.lang_key().to_string())
    }

    /// Extension elements carry no identity and simply concatenate.
    pub fn extensions(
        &self,
        mut spec: Vec<ExtensionElement>,
        vendor: Vec<ExtensionElement>,
    ) -> Vec<ExtensionElement> {
        debug_assert_eq!(policy_for(self.element, "extensions"), Append);
        spec.extend(vendor);
        spec
    }
}

/// Concatenate, a vendor entry replacing the first entry with the same key
/// in place, whether it came from the specification or an earlier vendor
/// entry.
pub(crate) fn append_by_key<T, K: PartialEq>(
    mut spec: Vec<T>,
    vendor: Vec<T>,
    key: impl Fn(&T) -> K,
) -> Vec<T> {
    for entry in vendor {
        let entry_key = key(&entry);
        match spec.iter().position(|s| key(s) == entry_key) {
            Some(index) => spec[index] = entry,
            None => spec.push(entry),
        }
    }
    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_policies() {
        assert_eq!(
            policy_for("authentication-mechanism", "authentication-mechanism-type"),
            ImmutableFromSpec
        );
        assert_eq!(policy_for("config-property", "config-property-value"), OverrideIfPresent);
        assert_eq!(policy_for("connector", "config-property"), Append);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "no merge rule declared for connector/no-such-field")]
    fn test_undeclared_field_panics_in_debug() {
        policy_for("connector", "no-such-field");
    }

    #[test]
    fn test_every_merged_field_has_a_rule() {
        let merged_fields: &[(&str, &[&str])] = &[
            ("descriptor", &["extensions"]),
            (
                "connector",
                &[
                    "version",
                    "description",
                    "display-name",
                    "vendor-name",
                    "eis-type",
                    "resourceadapter-version",
                    "license-required",
                    "resourceadapter-class",
                    "transaction-support",
                    "reauthentication-support",
                    "extensions",
                ],
            ),
            (
                "authentication-mechanism",
                &[
                    "description",
                    "authentication-mechanism-type",
                    "credential-interface",
                    "extensions",
                ],
            ),
            (
                "config-property",
                &[
                    "description",
                    "config-property-name",
                    "config-property-type",
                    "config-property-value",
                    "config-property-ignore",
                    "config-property-supports-dynamic-updates",
                    "config-property-confidential",
                    "extensions",
                ],
            ),
            (
                "connection-definition",
                &[
                    "managedconnectionfactory-class",
                    "connectionfactory-interface",
                    "connectionfactory-impl-class",
                    "connection-interface",
                    "connection-impl-class",
                    "jndi-name",
                    "pool-name",
                    "enabled",
                    "min-pool-size",
                    "max-pool-size",
                    "prefill",
                    "extensions",
                ],
            ),
        ];
        for (element, fields) in merged_fields {
            for field in *fields {
                assert!(
                    FIELD_RULES.iter().any(|r| r.element == *element && r.field == *field),
                    "missing rule for {}/{}",
                    element,
                    field
                );
            }
        }
    }

    #[test]
    fn test_every_rule_is_declared_once() {
        for (i, a) in FIELD_RULES.iter().enumerate() {
            for b in &FIELD_RULES[i + 1..] {
                assert!(
                    !(a.element == b.element && a.field == b.field),
                    "duplicate rule for {}/{}",
                    a.element,
                    a.field
                );
            }
        }
    }

    #[test]
    fn test_override_if_present() {
        let merger = FieldMerger::new("connector", "connector[0]");
        let kept = merger
            .value("vendor-name", "Acme".to_string(), None)
            .unwrap();
        assert_eq!(kept, "Acme");
        let replaced = merger
            .value("vendor-name", "Acme".to_string(), Some("Globex".to_string()))
            .unwrap();
        assert_eq!(replaced, "Globex");
    }

    #[test]
    fn test_immutable_field_conflict() {
        let merger = FieldMerger::new("authentication-mechanism", "connector[0].authentication-mechanism[0]");
        let err = merger
            .value(
                "authentication-mechanism-type",
                "BasicPassword".to_string(),
                Some("Kerbv5".to_string()),
            )
            .unwrap_err();
        assert_eq!(
            err,
            MergeConflict::ImmutableField {
                path: "connector[0].authentication-mechanism[0]".to_string(),
                field: "authentication-mechanism-type".to_string(),
                spec: "'BasicPassword'".to_string(),
                vendor: "'Kerbv5'".to_string(),
            }
        );
    }

    #[test]
    fn test_immutable_field_accepts_equal_value() {
        let merger = FieldMerger::new("authentication-mechanism", "p");
        let kept = merger
            .value(
                "authentication-mechanism-type",
                "BasicPassword".to_string(),
                Some("BasicPassword".to_string()),
            )
            .unwrap();
        assert_eq!(kept, "BasicPassword");
    }

    #[test]
    fn test_descriptions_replace_by_language() {
        let merger = FieldMerger::new("connector", "connector[0]");
        let merged = merger.descriptions(
            vec![LocalizedText::new("spec"), LocalizedText::with_lang("de", "spez")],
            vec![
                LocalizedText::with_lang("en", "vendor"),
                LocalizedText::with_lang("fr", "fournisseur"),
            ],
        );
        assert_eq!(
            merged,
            vec![
                LocalizedText::with_lang("en", "vendor"),
                LocalizedText::with_lang("de", "spez"),
                LocalizedText::with_lang("fr", "fournisseur"),
            ]
        );
    }

    #[test]
    fn test_append_by_key_never_drops_spec_entries() {
        let merged = append_by_key(vec![1, 2, 3], vec![2, 4, 4], |n| *n);
        assert_eq!(merged, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_append_by_key_collapses_repeated_vendor_keys() {
        let merged = append_by_key(
            vec![LocalizedText::new("spec")],
            vec![
                LocalizedText::with_lang("fr", "a"),
                LocalizedText::with_lang("fr", "b"),
                LocalizedText::with_lang("en", "v1"),
                LocalizedText::with_lang("en", "v2"),
            ],
            |text| text.lang_key().to_string(),
        );
        assert_eq!(
            merged,
            vec![
                LocalizedText::with_lang("en", "v2"),
                LocalizedText::with_lang("fr", "b"),
            ]
        );
    }
}
