//! Shapley adapter: exact per-feature attribution for tree ensembles.
//!
//! Implements the interventional Shapley-value decomposition for threshold
//! trees. For one explained record `x` and one background row `z`, the model
//! is evaluated on hybrids that take a coalition `S` of features from `x` and
//! the rest from `z`; a feature's attribution is its exact Shapley value over
//! those coalitions.
//!
//! For a single tree this is computed in closed form per leaf: walking every
//! root-to-leaf path, each path feature either passes for both `x` and `z`
//! (irrelevant to the coalition), only for `x` (the leaf needs it inside
//! `S`), only for `z` (the leaf needs it outside `S`), or for neither (the
//! leaf is unreachable under any coalition). With `A` the must-be-present set
//! and `B` the must-be-absent set, the leaf value `v` contributes
//!
//! ```text
//! +v * (|A|-1)! |B|! / (|A|+|B|)!  to every feature in A
//! -v * (|B|-1)! |A|! / (|A|+|B|)!  to every feature in B
//! ```
//!
//! Summing leaf contributions reproduces `tree(x) - tree(z)` exactly;
//! averaging over the background sample and the ensemble yields attributions
//! that sum to `forest(x) - expected_value`. That additivity is the
//! correctness property the engine's output contract relies on.

use std::sync::Arc;

use crate::adapters::dataset::BackgroundSample;
use crate::adapters::forest::{ForestModel, Tree};
use crate::domain::FeatureRecord;
use crate::ports::{AttributionEngine, InferenceError};

/// Factorials up to the schema width, precomputed for coalition weights.
///
/// Only path features participate in a leaf's coalition, so arguments never
/// exceed the feature count; f64 factorials are exact well past that range.
fn factorials(n: usize) -> Vec<f64> {
    let mut f = vec![1.0; n + 2];
    for i in 1..f.len() {
        f[i] = f[i - 1] * i as f64;
    }
    f
}

/// Shapley coalition weight `a! * b! / (a + b + 1)!`.
#[inline]
fn coalition_weight(fact: &[f64], a: usize, b: usize) -> f64 {
    fact[a] * fact[b] / fact[a + b + 1]
}

/// Attribution explainer bound to one forest and one background sample.
///
/// The binding is immutable for the process lifetime; `attribute` is a pure
/// function of the record.
pub struct ShapleyExplainer {
    model: Arc<ForestModel>,
    background: BackgroundSample,
    expected_value: f64,
    fact: Vec<f64>,
}

impl ShapleyExplainer {
    /// Bind the explainer to a classifier and background sample.
    ///
    /// The expected-value baseline (mean positive-class probability over the
    /// background) is computed once here.
    #[must_use]
    pub fn new(model: Arc<ForestModel>, background: BackgroundSample) -> Self {
        let expected_value = if background.is_empty() {
            0.0
        } else {
            let sum: f64 = background
                .rows()
                .iter()
                .filter_map(|row| model.proba_slice(row).ok())
                .map(|p| p[1])
                .sum();
            sum / background.len() as f64
        };

        let fact = factorials(model.n_features());

        tracing::debug!(
            "Bound Shapley explainer ({} background rows, base value {:.4})",
            background.len(),
            expected_value
        );

        Self {
            model,
            background,
            expected_value,
            fact,
        }
    }

    #[must_use]
    pub fn background_len(&self) -> usize {
        self.background.len()
    }

    /// Accumulate one tree's Shapley contributions for the pair `(x, z)`.
    ///
    /// `state[f]` carries, per feature, whether `x` and `z` satisfy every
    /// split on `f` along the current path.
    fn tree_shapley(
        &self,
        tree: &Tree,
        node: usize,
        x: &[f64],
        z: &[f64],
        state: &mut [Option<(bool, bool)>],
        phi: &mut [f64],
    ) {
        let n = &tree.nodes[node];

        if let Some(dist) = n.leaf {
            let v = dist[1];
            let n_a = state
                .iter()
                .filter(|s| matches!(s, Some((true, false))))
                .count();
            let n_b = state
                .iter()
                .filter(|s| matches!(s, Some((false, true))))
                .count();

            if n_a > 0 {
                let w = v * coalition_weight(&self.fact, n_a - 1, n_b);
                for (f, s) in state.iter().enumerate() {
                    if matches!(s, Some((true, false))) {
                        phi[f] += w;
                    }
                }
            }
            if n_b > 0 {
                let w = v * coalition_weight(&self.fact, n_b - 1, n_a);
                for (f, s) in state.iter().enumerate() {
                    if matches!(s, Some((false, true))) {
                        phi[f] -= w;
                    }
                }
            }
            return;
        }

        let f = n.feature as usize;
        let x_left = x[f] <= n.threshold;
        let z_left = z[f] <= n.threshold;

        for (child, goes_left) in [(n.left, true), (n.right, false)] {
            let x_pass = x_left == goes_left;
            let z_pass = z_left == goes_left;

            let prev = state[f];
            let combined = match prev {
                None => (x_pass, z_pass),
                Some((xo, zo)) => (xo && x_pass, zo && z_pass),
            };

            // Neither the record nor the baseline can reach this subtree
            // under any coalition.
            if !combined.0 && !combined.1 {
                continue;
            }

            state[f] = Some(combined);
            self.tree_shapley(tree, child as usize, x, z, state, phi);
            state[f] = prev;
        }
    }
}

impl AttributionEngine for ShapleyExplainer {
    fn expected_value(&self) -> f64 {
        self.expected_value
    }

    fn attribute(&self, record: &FeatureRecord) -> Result<Vec<f64>, InferenceError> {
        let n = self.model.n_features();
        let x = record.to_vec();
        if x.len() != n {
            return Err(InferenceError::ShapeMismatch {
                got: x.len(),
                expected: n,
            });
        }

        let mut phi = vec![0.0f64; n];
        let mut state: Vec<Option<(bool, bool)>> = vec![None; n];

        for z in self.background.rows() {
            for tree in &self.model.trees {
                self.tree_shapley(tree, 0, &x, z, &mut state, &mut phi);
            }
        }

        let scale = (self.background.len() * self.model.num_trees()) as f64;
        if scale > 0.0 {
            for value in &mut phi {
                *value /= scale;
            }
        }

        Ok(phi)
    }
}
