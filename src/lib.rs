//! # CardioWise
//!
//! Interpretable 10-year coronary heart disease (CHD) risk estimation in the
//! terminal.
//!
//! This crate provides:
//! - A fixed 15-field medical feature schema with a strict record builder
//! - Inference against a pre-trained random-forest artifact
//! - Exact per-feature Shapley attribution against a background sample
//! - A terminal UI for single-shot, local-only risk assessment
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (feature schema, risk reports)
//! - `ports`: Trait definitions for the classifier and attribution seams
//! - `adapters`: Concrete implementations (forest artifact, Shapley, CSV)
//! - `application`: The prediction & attribution engine
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{FeatureRecord, RecordBuilder, RiskLabel, RiskReport};

/// Result type for CardioWise operations
pub type Result<T> = std::result::Result<T, CardioError>;

/// Main error type for CardioWise
#[derive(Debug, thiserror::Error)]
pub enum CardioError {
    #[error("Feature record does not match schema: {0}")]
    Schema(#[from] domain::SchemaMismatch),

    #[error("Model artifact could not be loaded: {0}")]
    ModelLoad(#[from] adapters::forest::ModelLoadError),

    #[error("Background dataset could not be loaded: {0}")]
    DataLoad(#[from] adapters::dataset::DataLoadError),

    #[error("Inference failed: {0}")]
    Inference(#[from] ports::InferenceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
