//! Per-request inference errors shared by the classifier and explainer ports.

/// A malformed record reached the engine after initialization succeeded.
///
/// Surfaced to the caller; does not affect engine readiness for subsequent
/// requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    #[error("feature count mismatch: got {got}, expected {expected}")]
    ShapeMismatch { got: usize, expected: usize },

    #[error("record field '{got}' does not match bound schema field '{expected}'")]
    FieldMismatch { got: String, expected: String },
}
