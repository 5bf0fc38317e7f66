//! Classifier port: Trait for the pre-trained risk model.
//!
//! This trait abstracts the classifier implementation (the tree ensemble
//! artifact) from the application logic. Any model exposing an independent
//! probability output and decision rule over the feature schema satisfies it.

use crate::domain::FeatureRecord;

use super::InferenceError;

/// Trait for binary classification over one feature record.
///
/// Implementations are immutable after construction and safe to share across
/// threads; every method is a pure function of the record.
pub trait Classifier: Send + Sync {
    /// Number of input features the model was trained on.
    fn n_features(&self) -> usize;

    /// Discrete predicted class via the model's own decision rule.
    ///
    /// Independent of [`predict_proba`](Self::predict_proba): callers must
    /// not re-derive one from the other through a fixed threshold.
    ///
    /// # Errors
    /// Returns `InferenceError` if the record's shape does not match the
    /// schema the model was bound to.
    fn predict(&self, record: &FeatureRecord) -> Result<u8, InferenceError>;

    /// Per-class probabilities `[p_negative, p_positive]`.
    ///
    /// # Errors
    /// Returns `InferenceError` if the record's shape does not match the
    /// schema the model was bound to.
    fn predict_proba(&self, record: &FeatureRecord) -> Result<[f64; 2], InferenceError>;

    /// Raw (pre-threshold) positive-class score.
    ///
    /// This is the quantity the attribution explainer decomposes: the sum of
    /// the explainer's base value and all attribution values approximately
    /// equals this score.
    ///
    /// # Errors
    /// Returns `InferenceError` if the record's shape does not match the
    /// schema the model was bound to.
    fn raw_score(&self, record: &FeatureRecord) -> Result<f64, InferenceError>;
}
