//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement the
//! prediction-and-attribution pipeline.

mod engine;

pub use engine::{CardioEngine, EngineConfig, EngineInfo, RiskEngine};
