//! TUI module: Terminal User Interface using Ratatui.
//!
//! Three screens drive the single-shot assessment flow:
//! dashboard (engine status), form (medical details), and results
//! (probability, risk label, attribution chart).

mod app;
mod styles;
mod ui;
mod worker;

pub use app::App;
pub use styles::CardioTheme;
pub use worker::{AssessmentProgress, AssessmentWorker, AssessmentWorkerHandle};
