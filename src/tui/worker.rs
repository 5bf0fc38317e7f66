//! Background assessment worker.
//!
//! Runs the prediction-and-attribution pipeline off the TUI main loop so the
//! terminal stays responsive. Exactly one assessment is in flight at a time;
//! the engine itself is read-only shared state and needs no locking.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::application::RiskEngine;
use crate::domain::{FeatureRecord, RiskReport};
use crate::ports::{AttributionEngine, Classifier};

/// Progress updates from the assessment worker.
#[derive(Debug, Clone)]
pub enum AssessmentProgress {
    /// Running the classifier
    Scoring,
    /// Computing per-feature attributions
    Explaining,
    /// Pipeline complete with a report
    Complete(RiskReport),
    /// Error occurred during the pipeline
    Error(String),
}

/// Handle to a running assessment worker.
pub struct AssessmentWorkerHandle {
    /// Receiver for progress updates
    pub progress_rx: Receiver<AssessmentProgress>,
    /// Thread handle (for joining)
    _handle: JoinHandle<()>,
}

impl AssessmentWorkerHandle {
    /// Try to receive the next progress update (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<AssessmentProgress> {
        self.progress_rx.try_recv().ok()
    }
}

/// Assessment worker that runs the pipeline in the background.
pub struct AssessmentWorker;

impl AssessmentWorker {
    /// Spawn a background assessment task.
    ///
    /// Returns a handle to receive progress updates.
    pub fn spawn<C, E>(
        engine: Arc<RiskEngine<C, E>>,
        record: FeatureRecord,
    ) -> AssessmentWorkerHandle
    where
        C: Classifier + 'static,
        E: AttributionEngine + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            Self::run_with_progress(&engine, &record, &tx);
        });

        AssessmentWorkerHandle {
            progress_rx: rx,
            _handle: handle,
        }
    }

    fn run_with_progress<C, E>(
        engine: &RiskEngine<C, E>,
        record: &FeatureRecord,
        tx: &Sender<AssessmentProgress>,
    ) where
        C: Classifier,
        E: AttributionEngine,
    {
        let _ = tx.send(AssessmentProgress::Scoring);

        // Attribution dominates the pipeline cost; signal the phase switch
        // before the combined call runs.
        let _ = tx.send(AssessmentProgress::Explaining);

        match engine.predict_and_explain(record) {
            Ok(report) => {
                let _ = tx.send(AssessmentProgress::Complete(report));
            }
            Err(e) => {
                let _ = tx.send(AssessmentProgress::Error(e.to_string()));
            }
        }
    }
}
