//! Effective configuration
//!
//! The merge output. The tree sits behind an `Arc` and is only reachable
//! through shared references, so a configuration can be handed to any number
//! of concurrent consumers. Deployment-time overrides derive a new
//! configuration; the receiver is never modified.

use serde::Serialize;
use std::sync::Arc;

use ra_metadata::{ConnectorDefinition, SpecificationDescriptor};

use crate::overrides::{apply, FieldOverrides, OverrideError};
use crate::schema::ValidationRules;
use crate::validate::{self, Violation};

/// Merged descriptor tree plus the rules it is validated under.
#[derive(Debug, Clone)]
pub struct EffectiveConfiguration {
    tree: Arc<SpecificationDescriptor>,
    rules: Arc<ValidationRules>,
}

impl EffectiveConfiguration {
    pub(crate) fn new(tree: SpecificationDescriptor, rules: Arc<ValidationRules>) -> Self {
        Self {
            tree: Arc::new(tree),
            rules,
        }
    }

    /// Wrap a tree that did not come out of a merge.
    pub fn from_tree(tree: SpecificationDescriptor, rules: ValidationRules) -> Self {
        Self::new(tree, Arc::new(rules))
    }

    pub fn descriptor(&self) -> &SpecificationDescriptor {
        &self.tree
    }

    pub fn connectors(&self) -> &[ConnectorDefinition] {
        &self.tree.connectors
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// All violations in the tree.
    pub fn validate(&self) -> Vec<Violation> {
        validate::validate(&self.tree, &self.rules)
    }

    /// Derive a configuration with `overrides` applied.
    ///
    /// The derived tree is validated as a whole; any violation rejects it.
    pub fn with_overrides(
        &self,
        overrides: &FieldOverrides,
    ) -> Result<EffectiveConfiguration, OverrideError> {
        if overrides.is_empty() {
            return Ok(self.clone());
        }

        let mut tree = SpecificationDescriptor::clone(&self.tree);
        for (path, value) in overrides.iter() {
            apply(&mut tree, path, value)?;
        }

        let violations = validate::validate(&tree, &self.rules);
        if !violations.is_empty() {
            tracing::warn!(
                violations = violations.len(),
                "derived configuration rejected"
            );
            return Err(OverrideError::Invalid(violations));
        }

        tracing::debug!(overrides = overrides.len(), "derived configuration");
        Ok(Self {
            tree: Arc::new(tree),
            rules: Arc::clone(&self.rules),
        })
    }

    /// True when both configurations share the same tree allocation.
    pub fn shares_tree_with(&self, other: &EffectiveConfiguration) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree)
    }
}

impl PartialEq for EffectiveConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree && self.rules == other.rules
    }
}

impl Eq for EffectiveConfiguration {}

impl Serialize for EffectiveConfiguration {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.tree.serialize(serializer)
    }
}
