//! Risk engine: Orchestrates prediction and attribution for one record.
//!
//! This service coordinates:
//! - Model artifact loading
//! - Background dataset loading and deterministic sampling
//! - Explainer binding
//! - Per-request prediction + attribution

use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::dataset::{BackgroundData, BACKGROUND_ROWS, BACKGROUND_SEED};
use crate::adapters::forest::{ForestClassifier, ForestModel};
use crate::adapters::shapley::ShapleyExplainer;
use crate::domain::{Explanation, FeatureRecord, RiskAssessment, RiskReport};
use crate::ports::{AttributionEngine, Classifier};
use crate::{CardioError, Result};

/// Filesystem locations of the read-only input artifacts.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Model artifact file, or a directory containing `rf_model.json`.
    pub model_path: PathBuf,
    /// Historical dataset used only for the background reference sample.
    pub data_path: PathBuf,
    /// Background sample size.
    pub background_rows: usize,
    /// Background sampling seed.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models"),
            data_path: PathBuf::from("data/framingham.csv"),
            background_rows: BACKGROUND_ROWS,
            seed: BACKGROUND_SEED,
        }
    }
}

impl EngineConfig {
    /// Resolve artifact paths from the environment (deployment flexibility),
    /// falling back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("CARDIOWISE_MODEL_PATH") {
            config.model_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("CARDIOWISE_DATA_PATH") {
            config.data_path = PathBuf::from(path);
        }
        config
    }
}

/// Read-only facts about a bootstrapped engine, for the dashboard.
#[derive(Debug, Clone)]
pub struct EngineInfo {
    pub num_trees: usize,
    pub n_features: usize,
    pub background_rows: usize,
    pub base_value: f64,
}

/// Service answering "what is the risk, and why" for one feature record.
///
/// Generic over the classifier and attribution ports; the composition root
/// instantiates the concrete adapters via [`RiskEngine::bootstrap`]. A fully
/// constructed engine is Ready: both collaborators are immutable, so
/// `predict_and_explain` is safe to call from any thread. Initialization
/// failures surface from the constructor and leave no half-ready instance
/// behind.
pub struct RiskEngine<C, E>
where
    C: Classifier,
    E: AttributionEngine,
{
    classifier: Arc<C>,
    explainer: E,
    info: EngineInfo,
}

/// The engine as composed for production use.
pub type CardioEngine = RiskEngine<ForestClassifier, ShapleyExplainer>;

impl CardioEngine {
    /// Build the engine from the configured artifacts.
    ///
    /// Initialization steps, each fatal on failure:
    /// 1. Load and validate the pre-trained classifier artifact.
    /// 2. Load the historical dataset, restricted to schema fields, dropping
    ///    incomplete rows.
    /// 3. Draw the deterministic background sample (fewer clean rows than
    ///    requested degrades to all available rows, logged as a warning).
    /// 4. Bind the attribution explainer to the classifier and sample.
    ///
    /// # Errors
    /// Returns `ModelLoad` or `DataLoad` errors; no request is accepted
    /// until every step has succeeded.
    pub fn bootstrap(config: &EngineConfig) -> Result<Self> {
        tracing::info!("Initializing risk engine...");

        let model = Arc::new(ForestModel::load(&config.model_path)?);
        let classifier = ForestClassifier::bind(Arc::clone(&model))?;

        let data = BackgroundData::load(&config.data_path)?;
        let sample = data.sample_or_all(config.background_rows, config.seed);

        let explainer = ShapleyExplainer::new(Arc::clone(&model), sample);

        let info = EngineInfo {
            num_trees: model.num_trees(),
            n_features: model.n_features(),
            background_rows: explainer.background_len(),
            base_value: explainer.expected_value(),
        };

        tracing::info!(
            "Risk engine ready: {} trees, {} features, {} background rows, base value {:.4}",
            info.num_trees,
            info.n_features,
            info.background_rows,
            info.base_value
        );

        Ok(Self {
            classifier: Arc::new(classifier),
            explainer,
            info,
        })
    }
}

impl<C, E> RiskEngine<C, E>
where
    C: Classifier,
    E: AttributionEngine,
{
    /// Assemble an engine from already-constructed collaborators (tests,
    /// alternative composition roots).
    pub fn new(classifier: Arc<C>, explainer: E, info: EngineInfo) -> Self {
        Self {
            classifier,
            explainer,
            info,
        }
    }

    #[must_use]
    pub fn info(&self) -> &EngineInfo {
        &self.info
    }

    /// Run the full pipeline for one record.
    ///
    /// Probability and discrete class are obtained independently from the
    /// classifier (both are displayed; neither is derived from the other),
    /// then the attribution vector is computed against the background
    /// sample. Purely functional given the fixed model + explainer state; a
    /// failure here does not affect readiness for subsequent requests.
    ///
    /// # Errors
    /// Returns `Inference` errors for records whose shape disagrees with the
    /// schema the collaborators were bound to.
    pub fn predict_and_explain(&self, record: &FeatureRecord) -> Result<RiskReport> {
        tracing::debug!("Scoring record...");
        let proba = self.classifier.predict_proba(record)?;
        let class = self.classifier.predict(record)?;

        tracing::debug!("Computing attributions...");
        let values = self.explainer.attribute(record)?;
        let explanation = Explanation::from_values(self.explainer.expected_value(), &values);

        let assessment = RiskAssessment::new(proba[1], class);
        let report = RiskReport::new(assessment, explanation);

        tracing::info!(
            "Assessment complete: probability={:.2}%, class={}, label={}",
            report.assessment.probability * 100.0,
            report.assessment.predicted_class,
            report.assessment.label()
        );

        Ok(report)
    }

    /// Convenience wrapper mapping schema failures before the engine is
    /// touched.
    ///
    /// # Errors
    /// Returns `Schema` if the builder's field set disagrees with the
    /// schema, otherwise behaves like [`predict_and_explain`](Self::predict_and_explain).
    pub fn assess(&self, builder: crate::domain::RecordBuilder) -> Result<RiskReport> {
        let record = builder.build().map_err(CardioError::Schema)?;
        self.predict_and_explain(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::forest::test_support::sample_model;
    use crate::adapters::forest::MODEL_FILE;
    use crate::domain::{RecordBuilder, SchemaMismatch, Sex, YesNo, FIELD_COUNT, FIELD_NAMES};
    use std::io::Write;

    /// Write the sample model and a small dataset to disk, then bootstrap.
    fn create_test_engine() -> (CardioEngine, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("Should create temp dir");

        let model_path = dir.path().join(MODEL_FILE);
        sample_model().save_json(&model_path).expect("Should save");

        let data_path = dir.path().join("framingham.csv");
        let mut file = std::fs::File::create(&data_path).expect("Should create");
        writeln!(
            file,
            "male,age,education,currentSmoker,cigsPerDay,BPMeds,prevalentStroke,\
             prevalentHyp,diabetes,totChol,sysBP,diaBP,BMI,heartRate,glucose,TenYearCHD"
        )
        .expect("write");
        for i in 0..120 {
            let age = 35 + (i % 40);
            let sys = 100 + (i % 80);
            let glucose = 60 + (i % 90);
            writeln!(
                file,
                "{},{age},2,{},10,0,0,0,0,220,{sys},80,25.0,72,{glucose},0",
                i % 2,
                (i / 2) % 2
            )
            .expect("write");
        }

        let config = EngineConfig {
            model_path,
            data_path,
            ..EngineConfig::default()
        };
        let engine = CardioEngine::bootstrap(&config).expect("Should bootstrap");
        (engine, dir)
    }

    fn scenario_builder() -> RecordBuilder {
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
    }

    #[test]
    fn test_bootstrap_populates_info() {
        let (engine, _dir) = create_test_engine();
        let info = engine.info();

        assert_eq!(info.num_trees, 3);
        assert_eq!(info.n_features, FIELD_COUNT);
        assert_eq!(info.background_rows, 100);
        assert!(info.base_value > 0.0 && info.base_value < 1.0);
    }

    #[test]
    fn test_bootstrap_fails_without_model() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let config = EngineConfig {
            model_path: dir.path().join("missing"),
            data_path: dir.path().join("missing.csv"),
            ..EngineConfig::default()
        };
        assert!(matches!(
            CardioEngine::bootstrap(&config),
            Err(CardioError::ModelLoad(_))
        ));
    }

    #[test]
    fn test_bootstrap_fails_without_dataset() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let model_path = dir.path().join(MODEL_FILE);
        sample_model().save_json(&model_path).expect("Should save");

        let config = EngineConfig {
            model_path,
            data_path: dir.path().join("missing.csv"),
            ..EngineConfig::default()
        };
        assert!(matches!(
            CardioEngine::bootstrap(&config),
            Err(CardioError::DataLoad(_))
        ));
    }

    #[test]
    fn test_scenario_pipeline() {
        let (engine, _dir) = create_test_engine();
        let report = engine.assess(scenario_builder()).expect("Should assess");

        assert!(report.assessment.probability >= 0.0);
        assert!(report.assessment.probability <= 1.0);
        assert!(report.assessment.predicted_class <= 1);

        // Exactly 15 attribution entries, names in schema order.
        assert_eq!(report.explanation.attributions.len(), FIELD_COUNT);
        for (attr, name) in report
            .explanation
            .attributions
            .iter()
            .zip(FIELD_NAMES.iter())
        {
            assert_eq!(attr.field, *name);
        }
    }

    #[test]
    fn test_pipeline_additivity() {
        let (engine, _dir) = create_test_engine();
        let report = engine.assess(scenario_builder()).expect("Should assess");

        let reconstructed =
            report.explanation.base_value + report.explanation.total_attribution();
        let relative = (reconstructed - report.assessment.probability).abs()
            / report.assessment.probability.max(1e-12);
        assert!(relative < 1e-3, "relative error {relative}");
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let (engine, _dir) = create_test_engine();
        let a = engine.assess(scenario_builder()).expect("Should assess");
        let b = engine.assess(scenario_builder()).expect("Should assess");

        assert_eq!(a.assessment.probability, b.assessment.probability);
        assert_eq!(a.assessment.predicted_class, b.assessment.predicted_class);
        assert_eq!(a.explanation.attributions, b.explanation.attributions);
    }

    #[test]
    fn test_boundary_record_at_domain_minimums() {
        let (engine, _dir) = create_test_engine();
        let builder = RecordBuilder::new()
            .sex(Sex::Female)
            .set("age", 30.0)
            .set("education", 1.0)
            .flag("currentSmoker", YesNo::No)
            .set("cigsPerDay", 0.0)
            .flag("BPMeds", YesNo::No)
            .flag("prevalentStroke", YesNo::No)
            .flag("prevalentHyp", YesNo::No)
            .flag("diabetes", YesNo::No)
            .set("totChol", 100.0)
            .set("sysBP", 90.0)
            .set("diaBP", 60.0)
            .set("BMI", 15.0)
            .set("heartRate", 40.0)
            .set("glucose", 50.0);

        let report = engine.assess(builder).expect("Should assess");
        assert!(report.assessment.probability >= 0.0);
        assert!(report.assessment.probability <= 1.0);
        assert_eq!(report.explanation.attributions.len(), FIELD_COUNT);
    }

    #[test]
    fn test_missing_field_rejected_before_engine() {
        let (engine, _dir) = create_test_engine();
        let builder = RecordBuilder::new()
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
            .set("heartRate", 80.0);
        // glucose omitted

        match engine.assess(builder) {
            Err(CardioError::Schema(SchemaMismatch::MissingField(field))) => {
                assert_eq!(field, "glucose");
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }
}
