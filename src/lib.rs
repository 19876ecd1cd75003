//! Resource adapter descriptor engine
//!
//! Parses the specification descriptor (`ra.xml`) and an optional vendor
//! override descriptor, merges them by element identity under declared field
//! policies, and validates the result into an immutable
//! [`EffectiveConfiguration`] ready for a runtime container.

pub mod effective;
pub mod identity;
pub mod merge;
pub mod overrides;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod validate;

pub use effective::EffectiveConfiguration;
pub use merge::{merge, FieldPolicy, MergeConflict};
pub use overrides::{FieldOverrides, FieldPath, OverrideError};
pub use parser::{parse_specification, parse_vendor, DocumentKind, ParseDiagnostic, ParseError, Parsed};
pub use pipeline::{deploy, Deployment, DeploymentError, DeploymentInput, LoadedDocument, Stage};
pub use report::DeploymentReport;
pub use schema::{Collection, CollectionPolicy, MergeSchema, SchemaError, ValidationRules};
pub use validate::{validate, Violation, ViolationKind};

pub use ra_metadata;
