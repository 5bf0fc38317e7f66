//! Forest adapter: random-forest classification from a serialized artifact.
//!
//! The model artifact is an opaque product of the owning training pipeline,
//! serialized as JSON:
//!
//! ```json
//! {
//!   "version": 1,
//!   "n_classes": 2,
//!   "feature_names": ["male", "age", ...],
//!   "trees": [
//!     {
//!       "nodes": [
//!         {"id":0,"left":1,"right":2,"feature":1,"threshold":52.5,"leaf":null},
//!         {"id":1,"left":-1,"right":-1,"feature":-1,"threshold":0.0,"leaf":[0.9,0.1]},
//!         {"id":2,"left":-1,"right":-1,"feature":-1,"threshold":0.0,"leaf":[0.3,0.7]}
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! The ensemble probability is the mean of per-tree leaf class distributions;
//! the discrete class is the argmax of that mean. Both are exposed
//! independently on the [`Classifier`] port.

mod tree;

pub use tree::{Node, Tree};

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureRecord, FIELD_NAMES};
use crate::ports::{Classifier, InferenceError};

/// Default artifact file name inside a model directory.
pub const MODEL_FILE: &str = "rf_model.json";

/// Initialization-time model failures. Fatal to process readiness.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    #[error("Model artifact not found at {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Model schema incompatible: {0}")]
    IncompatibleSchema(String),
}

/// A pre-trained random-forest binary classifier.
///
/// Loaded once, validated structurally, then immutable and shared read-only
/// by all predictions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForestModel {
    /// Artifact format version (always 1 for now)
    pub version: i32,

    /// Number of output classes (always 2 for this model family)
    pub n_classes: usize,

    /// Column names the forest was trained on, in training order
    pub feature_names: Vec<String>,

    /// Decision trees in the ensemble
    pub trees: Vec<Tree>,
}

impl ForestModel {
    /// Validate artifact structure.
    pub fn validate(&self) -> Result<(), ModelLoadError> {
        if self.version != 1 {
            return Err(ModelLoadError::ValidationFailed(format!(
                "Unsupported model version: {}",
                self.version
            )));
        }

        if self.n_classes != 2 {
            return Err(ModelLoadError::ValidationFailed(format!(
                "Expected binary classifier, got {} classes",
                self.n_classes
            )));
        }

        if self.feature_names.is_empty() {
            return Err(ModelLoadError::ValidationFailed(
                "Model has no feature names".to_string(),
            ));
        }

        if self.trees.is_empty() {
            return Err(ModelLoadError::ValidationFailed(
                "Model has no trees".to_string(),
            ));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_names.len()).map_err(|e| {
                ModelLoadError::ValidationFailed(format!("Tree {} validation failed: {}", i, e))
            })?;
        }

        Ok(())
    }

    /// Load and validate a model from a JSON artifact.
    ///
    /// `path` may be the artifact file itself or a directory containing
    /// [`MODEL_FILE`].
    ///
    /// # Errors
    /// Returns `ModelLoadError` if the artifact is missing, unreadable, or
    /// structurally invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let artifact = if path.is_dir() {
            path.join(MODEL_FILE)
        } else {
            path.to_path_buf()
        };

        if !artifact.exists() {
            return Err(ModelLoadError::NotFound(artifact.display().to_string()));
        }

        let json = fs::read_to_string(&artifact)?;
        let model: ForestModel = serde_json::from_str(&json)?;
        model.validate()?;

        tracing::info!(
            "Loaded forest model from {:?} ({} trees, {} features)",
            artifact,
            model.trees.len(),
            model.feature_names.len()
        );

        Ok(model)
    }

    /// Save the model as a JSON artifact (used by tests and tooling).
    ///
    /// # Errors
    /// Returns `ModelLoadError` if serialization or writing fails.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelLoadError> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Number of input features.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Number of trees in the ensemble.
    #[must_use]
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Ensemble class probabilities for a raw feature slice.
    ///
    /// # Errors
    /// Returns `InferenceError` if the slice length does not match the
    /// model's feature count.
    pub fn proba_slice(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        if features.len() != self.n_features() {
            return Err(InferenceError::ShapeMismatch {
                got: features.len(),
                expected: self.n_features(),
            });
        }

        let mut sum = [0.0f64; 2];
        for tree in &self.trees {
            let dist = tree.evaluate(features);
            sum[0] += dist[0];
            sum[1] += dist[1];
        }

        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}

/// [`Classifier`] implementation binding a [`ForestModel`] to the feature
/// schema.
pub struct ForestClassifier {
    model: Arc<ForestModel>,
}

impl ForestClassifier {
    /// Bind a loaded model to the feature schema.
    ///
    /// # Errors
    /// Returns `ModelLoadError::IncompatibleSchema` if the artifact's feature
    /// names or ordering disagree with the schema records are built against.
    pub fn bind(model: Arc<ForestModel>) -> Result<Self, ModelLoadError> {
        if model.feature_names.len() != FIELD_NAMES.len() {
            return Err(ModelLoadError::IncompatibleSchema(format!(
                "model expects {} features, schema declares {}",
                model.feature_names.len(),
                FIELD_NAMES.len()
            )));
        }
        for (got, expected) in model.feature_names.iter().zip(FIELD_NAMES.iter()) {
            if got != expected {
                return Err(ModelLoadError::IncompatibleSchema(format!(
                    "model feature '{got}' does not match schema field '{expected}'"
                )));
            }
        }
        Ok(Self { model })
    }

    /// The underlying model (shared with the attribution explainer).
    #[must_use]
    pub fn model(&self) -> Arc<ForestModel> {
        Arc::clone(&self.model)
    }
}

impl Classifier for ForestClassifier {
    fn n_features(&self) -> usize {
        self.model.n_features()
    }

    fn predict(&self, record: &FeatureRecord) -> Result<u8, InferenceError> {
        let proba = self.model.proba_slice(&record.to_vec())?;
        // Argmax decision rule; ties resolve to the lower class index.
        Ok(u8::from(proba[1] > proba[0]))
    }

    fn predict_proba(&self, record: &FeatureRecord) -> Result<[f64; 2], InferenceError> {
        self.model.proba_slice(&record.to_vec())
    }

    fn raw_score(&self, record: &FeatureRecord) -> Result<f64, InferenceError> {
        Ok(self.model.proba_slice(&record.to_vec())?[1])
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A small forest over the 15 schema features with known behavior:
    /// splits on age (idx 1), sysBP (idx 10), currentSmoker (idx 3), and
    /// glucose (idx 14).
    pub fn sample_model() -> ForestModel {
        let tree_age = Tree::new(vec![
            Node::internal(0, 1, 52.5, 1, 2),
            Node::leaf(1, [0.85, 0.15]),
            Node::internal(2, 10, 145.0, 3, 4),
            Node::leaf(3, [0.6, 0.4]),
            Node::leaf(4, [0.25, 0.75]),
        ]);

        let tree_smoker = Tree::new(vec![
            Node::internal(0, 3, 0.5, 1, 2),
            Node::leaf(1, [0.8, 0.2]),
            Node::leaf(2, [0.55, 0.45]),
        ]);

        let tree_glucose = Tree::new(vec![
            Node::internal(0, 14, 120.0, 1, 2),
            Node::internal(1, 1, 60.5, 3, 4),
            Node::leaf(2, [0.35, 0.65]),
            Node::leaf(3, [0.9, 0.1]),
            Node::leaf(4, [0.5, 0.5]),
        ]);

        ForestModel {
            version: 1,
            n_classes: 2,
            feature_names: FIELD_NAMES.iter().map(|s| s.to_string()).collect(),
            trees: vec![tree_age, tree_smoker, tree_glucose],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::sample_model;
    use super::*;
    use crate::domain::{RecordBuilder, Sex, YesNo};

    fn scenario_record() -> FeatureRecord {
        RecordBuilder::new()
            .sex(Sex::Male)
            .set("age", 61.0)
            .set("education", 2.0)
            .flag("currentSmoker", YesNo::Yes)
            .set("cigsPerDay", 20.0)
            .flag("BPMeds", YesNo::No)
            .flag("prevalentStroke", YesNo::No)
            .flag("prevalentHyp", YesNo::Yes)
            .flag("diabetes", YesNo::No)
            .set("totChol", 250.0)
            .set("sysBP", 150.0)
            .set("diaBP", 90.0)
            .set("BMI", 29.5)
            .set("heartRate", 80.0)
            .set("glucose", 95.0)
            .build()
            .expect("Should build")
    }

    #[test]
    fn test_model_validation() {
        let model = sample_model();
        assert!(model.validate().is_ok());

        let mut invalid = sample_model();
        invalid.version = 99;
        assert!(invalid.validate().is_err());

        let mut no_trees = sample_model();
        no_trees.trees.clear();
        assert!(no_trees.validate().is_err());

        let mut multiclass = sample_model();
        multiclass.n_classes = 3;
        assert!(multiclass.validate().is_err());
    }

    #[test]
    fn test_proba_is_tree_average() {
        let model = sample_model();
        let record = scenario_record();
        let proba = model.proba_slice(&record.to_vec()).expect("Should score");

        // age=61 > 52.5, sysBP=150 > 145 -> [0.25, 0.75]
        // smoker=1 > 0.5 -> [0.55, 0.45]
        // glucose=95 <= 120, age=61 > 60.5 -> [0.5, 0.5]
        let expected = (0.75 + 0.45 + 0.5) / 3.0;
        assert!((proba[1] - expected).abs() < 1e-12);
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_classifier_predict_and_proba() {
        let classifier =
            ForestClassifier::bind(Arc::new(sample_model())).expect("Should bind");
        let record = scenario_record();

        let proba = classifier.predict_proba(&record).expect("Should score");
        let class = classifier.predict(&record).expect("Should predict");

        assert!(proba[1] >= 0.0 && proba[1] <= 1.0);
        // Decision rule is the model's own argmax.
        assert_eq!(class, u8::from(proba[1] > proba[0]));

        let raw = classifier.raw_score(&record).expect("Should score");
        assert!((raw - proba[1]).abs() < 1e-12);
    }

    #[test]
    fn test_bind_rejects_foreign_schema() {
        let mut model = sample_model();
        model.feature_names[14] = "bloodSugar".to_string();
        assert!(matches!(
            ForestClassifier::bind(Arc::new(model)),
            Err(ModelLoadError::IncompatibleSchema(_))
        ));

        let mut short = sample_model();
        short.feature_names.pop();
        // Tree 3 splits on feature 14, now out of range.
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_artifact_round_trip() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join(MODEL_FILE);

        let model = sample_model();
        model.save_json(&path).expect("Should save");

        // Load by file and by directory.
        let by_file = ForestModel::load(&path).expect("Should load");
        assert_eq!(model, by_file);
        let by_dir = ForestModel::load(dir.path()).expect("Should load");
        assert_eq!(model, by_dir);
    }

    #[test]
    fn test_load_missing_artifact() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        assert!(matches!(
            ForestModel::load(dir.path()),
            Err(ModelLoadError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_rejects_invalid_artifact() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join(MODEL_FILE);
        std::fs::write(&path, "{\"version\": 1}").expect("Should write");
        assert!(matches!(
            ForestModel::load(&path),
            Err(ModelLoadError::Json(_))
        ));
    }
}
