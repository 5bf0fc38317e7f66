//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with the delegated
//! algorithms and artifact formats:
//! - `forest`: random-forest inference over the serialized model artifact
//! - `shapley`: exact interventional Shapley attribution for the forest
//! - `dataset`: CSV background data loading and deterministic sampling

pub mod dataset;
pub mod forest;
pub mod shapley;
