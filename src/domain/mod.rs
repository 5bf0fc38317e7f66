//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no external service
//! dependencies. The feature schema here is the contract every other layer is
//! bound to.

mod report;
mod schema;

pub use report::{Attribution, Explanation, RiskAssessment, RiskLabel, RiskReport};
pub use schema::{
    FeatureRecord, FieldKind, FieldSpec, RecordBuilder, SchemaMismatch, Sex, YesNo, FIELDS,
    FIELD_COUNT, FIELD_NAMES,
};
