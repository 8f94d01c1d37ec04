use serde::{Deserialize, Serialize};

use super::{check_width, sigmoid, Classifier, ClassifierError};

/// A split sends `row[feature] <= threshold` to `left`, everything else to `right`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Flat node array with the root at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize, aggregation: Aggregation) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {index} splits on feature {feature} of {n_features}"
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {index} has a NaN threshold"));
                    }
                    // Children must come later in the array, which rules out cycles.
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(format!("node {index} points at invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {index} is not finite"));
                    }
                    if aggregation == Aggregation::Mean && !(0.0..=1.0).contains(value) {
                        return Err(format!("leaf {index} holds {value}, not a probability"));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf_value(&self, row: &[f64]) -> Result<f64, ClassifierError> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row.get(*feature).copied().ok_or_else(|| {
                        ClassifierError::Malformed(format!("feature {feature} out of range"))
                    })?;
                    let next = if value <= *threshold { *left } else { *right };
                    if next <= index {
                        return Err(ClassifierError::Malformed(format!(
                            "node {index} points backwards to {next}"
                        )));
                    }
                    index = next;
                }
                None => {
                    return Err(ClassifierError::Malformed(format!(
                        "node {index} does not exist"
                    )))
                }
            }
        }
    }
}

/// How per-tree leaf values are combined into a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Leaves hold class probabilities; the ensemble averages them (random forest).
    Mean,
    /// Leaves hold log-odds contributions summed onto `base_score` (gradient boosting).
    Logistic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_features: usize,
    pub aggregation: Aggregation,
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.trees.is_empty() {
            return Err(ClassifierError::Malformed("ensemble has no trees".to_string()));
        }
        if !self.base_score.is_finite() {
            return Err(ClassifierError::Malformed("base_score must be finite".to_string()));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.aggregation)
                .map_err(|reason| ClassifierError::Malformed(format!("tree {index}: {reason}")))?;
        }
        Ok(())
    }
}

impl Classifier for TreeEnsemble {
    fn positive_probability(&self, row: &[f64]) -> Result<f64, ClassifierError> {
        check_width(self.n_features, row)?;
        if self.trees.is_empty() {
            return Err(ClassifierError::Malformed("ensemble has no trees".to_string()));
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.leaf_value(row)?;
        }

        let probability = match self.aggregation {
            Aggregation::Mean => total / self.trees.len() as f64,
            Aggregation::Logistic => sigmoid(self.base_score + total),
        };
        Ok(probability)
    }

    fn input_width(&self) -> Option<usize> {
        Some(self.n_features)
    }
}
