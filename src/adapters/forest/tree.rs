//! Decision tree structures for forest inference.
//!
//! Provides threshold-split tree nodes with per-leaf class distributions and
//! deterministic traversal.

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// For internal nodes:
/// - `feature >= 0`: index into the feature vector
/// - `left` and `right` point to child node indices
/// - `leaf` is `None`
///
/// For leaf nodes:
/// - `feature == -1` indicates this is a leaf
/// - `leaf` contains the class probability distribution `[p0, p1]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Node ID (for reference, not used in traversal)
    pub id: i32,

    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Feature index to split on (-1 for leaf nodes)
    pub feature: i32,

    /// Threshold value for the split
    pub threshold: f64,

    /// Class distribution (Some for leaf nodes, None for internal nodes)
    pub leaf: Option<[f64; 2]>,
}

impl Node {
    /// Create a new internal (split) node
    #[must_use]
    pub fn internal(id: i32, feature: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature,
            threshold,
            leaf: None,
        }
    }

    /// Create a new leaf node with a class distribution
    #[must_use]
    pub fn leaf(id: i32, distribution: [f64; 2]) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature: -1,
            threshold: 0.0,
            leaf: Some(distribution),
        }
    }

    /// Check if this node is a leaf
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.feature == -1 || self.leaf.is_some()
    }
}

/// A single decision tree (node 0 is the root).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    #[must_use]
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Evaluate this tree on a feature vector, returning the class
    /// distribution of the reached leaf.
    ///
    /// Split rule: go left if `feature <= threshold` (equal goes left).
    /// Assumes the tree was validated at load; a structurally broken tree
    /// falls back to a neutral distribution rather than panicking.
    #[must_use]
    pub fn evaluate(&self, features: &[f64]) -> [f64; 2] {
        let mut idx = 0usize;

        loop {
            let Some(node) = self.nodes.get(idx) else {
                return [0.5, 0.5];
            };

            if node.is_leaf() {
                return node.leaf.unwrap_or([0.5, 0.5]);
            }

            let Some(&value) = features.get(node.feature as usize) else {
                return [0.5, 0.5];
            };

            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };
            if next < 0 {
                return [0.5, 0.5];
            }
            idx = next as usize;
        }
    }

    /// Validate tree structure against the given feature count.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if !node.is_leaf() {
                // Children must exist and come after their parent so
                // traversal terminates.
                for (side, child) in [("left", node.left), ("right", node.right)] {
                    if child <= i as i32 || child as usize >= self.nodes.len() {
                        return Err(format!(
                            "Node {} has invalid {} child: {}",
                            i, side, child
                        ));
                    }
                }

                if node.feature < 0 || node.feature as usize >= n_features {
                    return Err(format!(
                        "Internal node {} has invalid feature index: {}",
                        i, node.feature
                    ));
                }

                if !node.threshold.is_finite() {
                    return Err(format!("Internal node {} has non-finite threshold", i));
                }
            } else {
                let Some(dist) = node.leaf else {
                    return Err(format!("Leaf node {i} has no class distribution"));
                };
                if dist.iter().any(|p| !p.is_finite() || *p < 0.0) {
                    return Err(format!("Leaf node {i} has invalid class distribution"));
                }
                let total: f64 = dist.iter().sum();
                if (total - 1.0).abs() > 1e-6 {
                    return Err(format!(
                        "Leaf node {i} distribution sums to {total}, expected 1"
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let internal = Node::internal(0, 3, 0.5, 1, 2);
        assert_eq!(internal.feature, 3);
        assert!(!internal.is_leaf());

        let leaf = Node::leaf(1, [0.8, 0.2]);
        assert_eq!(leaf.feature, -1);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.leaf, Some([0.8, 0.2]));
    }

    #[test]
    fn test_tree_evaluation() {
        // if feature[0] <= 50: [0.9, 0.1] else [0.3, 0.7]
        let tree = Tree::new(vec![
            Node::internal(0, 0, 50.0, 1, 2),
            Node::leaf(1, [0.9, 0.1]),
            Node::leaf(2, [0.3, 0.7]),
        ]);

        assert_eq!(tree.evaluate(&[30.0]), [0.9, 0.1]);
        assert_eq!(tree.evaluate(&[50.0]), [0.9, 0.1]); // Equal goes left
        assert_eq!(tree.evaluate(&[60.0]), [0.3, 0.7]);
    }

    #[test]
    fn test_tree_validation() {
        let valid = Tree::new(vec![
            Node::internal(0, 0, 50.0, 1, 2),
            Node::leaf(1, [0.9, 0.1]),
            Node::leaf(2, [0.3, 0.7]),
        ]);
        assert!(valid.validate(1).is_ok());

        // Left child out of bounds
        let bad_child = Tree::new(vec![
            Node::internal(0, 0, 50.0, 5, 2),
            Node::leaf(1, [0.9, 0.1]),
            Node::leaf(2, [0.3, 0.7]),
        ]);
        assert!(bad_child.validate(1).is_err());

        // Feature index outside the schema
        let bad_feature = Tree::new(vec![
            Node::internal(0, 7, 50.0, 1, 2),
            Node::leaf(1, [0.9, 0.1]),
            Node::leaf(2, [0.3, 0.7]),
        ]);
        assert!(bad_feature.validate(1).is_err());

        // Leaf distribution must sum to 1
        let bad_leaf = Tree::new(vec![Node::leaf(0, [0.9, 0.9])]);
        assert!(bad_leaf.validate(1).is_err());
    }

    #[test]
    fn test_deterministic_traversal() {
        let tree = Tree::new(vec![
            Node::internal(0, 0, 50.0, 1, 2),
            Node::leaf(1, [0.9, 0.1]),
            Node::leaf(2, [0.3, 0.7]),
        ]);

        let features = vec![30.0, 40.0, 50.0];
        let r1 = tree.evaluate(&features);
        let r2 = tree.evaluate(&features);
        assert_eq!(r1, r2);
    }
}
