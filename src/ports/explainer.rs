//! Attribution port: Trait for the per-feature explanation engine.
//!
//! This trait abstracts the attribution method (Shapley-value decomposition
//! for tree models) from the application logic. The engine is bound at
//! construction to one classifier and one background reference sample; that
//! binding is immutable for the process lifetime.

use crate::domain::FeatureRecord;

use super::InferenceError;

/// Trait for local feature attribution over one record.
pub trait AttributionEngine: Send + Sync {
    /// Expected-value baseline for the positive class.
    ///
    /// The mean model output over the background reference sample; the
    /// starting point every attribution vector is measured against.
    fn expected_value(&self) -> f64;

    /// Per-feature attribution values for the positive class, schema order.
    ///
    /// Additivity guarantee: `expected_value() + sum(attribute(record))`
    /// approximately equals the classifier's raw positive-class score for
    /// `record`, within numerical tolerance.
    ///
    /// # Errors
    /// Returns `InferenceError` if the record's shape does not match the
    /// schema the explainer was bound to.
    fn attribute(&self, record: &FeatureRecord) -> Result<Vec<f64>, InferenceError>;
}
