//! Risk report types.
//!
//! Represents the output of one prediction-and-attribution pipeline run.

use serde::{Deserialize, Serialize};

use super::schema::{FIELD_COUNT, FIELD_NAMES};

/// Discrete risk label for the model's predicted class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    /// Predicted class 0: no CHD event expected within 10 years
    Low,
    /// Predicted class 1: elevated 10-year CHD risk
    High,
}

impl RiskLabel {
    /// Map the classifier's discrete output to a label.
    ///
    /// This is the model's own decision rule, reported independently of the
    /// probability; it is never derived from a probability threshold here.
    #[must_use]
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            Self::High
        } else {
            Self::Low
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - No CHD event predicted",
            Self::High => "High risk - Clinical follow-up advised",
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW RISK"),
            Self::High => write!(f, "HIGH RISK"),
        }
    }
}

/// Result of the classifier for one record (before explanation).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Positive-class probability (0.0 to 1.0)
    pub probability: f64,

    /// Discrete prediction from the model's decision rule (0 or 1)
    pub predicted_class: u8,
}

impl RiskAssessment {
    #[must_use]
    pub fn new(probability: f64, predicted_class: u8) -> Self {
        Self {
            probability,
            predicted_class,
        }
    }

    #[must_use]
    pub fn label(&self) -> RiskLabel {
        RiskLabel::from_class(self.predicted_class)
    }
}

/// Signed contribution of one feature to one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Attribution {
    /// Canonical schema field name
    pub field: &'static str,
    /// Shapley value: positive pushes toward high risk, negative away
    pub value: f64,
}

/// Per-feature explanation of one prediction.
///
/// Attributions are stored in schema order; `ranked()` yields them by
/// magnitude for display.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    /// The explainer's expected-value baseline for the positive class
    pub base_value: f64,

    /// One entry per schema field, schema order
    pub attributions: Vec<Attribution>,
}

impl Explanation {
    /// Pair a raw attribution vector (schema order) with field names.
    ///
    /// The vector length is the caller's contract; the attribution engine
    /// guarantees one value per schema field.
    #[must_use]
    pub fn from_values(base_value: f64, values: &[f64]) -> Self {
        let attributions = FIELD_NAMES
            .into_iter()
            .zip(values.iter().copied())
            .map(|(field, value)| Attribution { field, value })
            .collect();
        Self {
            base_value,
            attributions,
        }
    }

    /// Attributions sorted by descending magnitude.
    #[must_use]
    pub fn ranked(&self) -> Vec<Attribution> {
        let mut ranked = self.attributions.clone();
        ranked.sort_by(|a, b| {
            b.value
                .abs()
                .partial_cmp(&a.value.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// Sum of all attribution values.
    #[must_use]
    pub fn total_attribution(&self) -> f64 {
        self.attributions.iter().map(|a| a.value).sum()
    }

    /// Largest attribution magnitude (for bar scaling).
    #[must_use]
    pub fn max_magnitude(&self) -> f64 {
        self.attributions
            .iter()
            .map(|a| a.value.abs())
            .fold(0.0, f64::max)
    }
}

/// Complete risk report for one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    /// Unique identifier
    pub id: String,

    /// The classifier output
    pub assessment: RiskAssessment,

    /// The attribution explanation
    pub explanation: Explanation,

    /// Timestamp of the assessment
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl RiskReport {
    #[must_use]
    pub fn new(assessment: RiskAssessment, explanation: Explanation) -> Self {
        Self {
            id: report_id(),
            assessment,
            explanation,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Generate a simple UUID v4 (random) using a CSPRNG.
///
/// Uses ChaCha20Rng seeded from OS entropy so identifiers are unpredictable
/// on all platforms.
fn report_id() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

/// An explanation always carries exactly one entry per schema field.
pub const EXPLANATION_LEN: usize = FIELD_COUNT;
