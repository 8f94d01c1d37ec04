//! Positive-class probability models that can be embedded in a bundle.

mod linear;
mod onnx;
mod trees;

pub use linear::{LogisticRegression, StandardScaler};
pub use onnx::{OnnxClassifier, OnnxModelRef, OnnxOutput};
pub use trees::{Aggregation, DecisionTree, TreeEnsemble, TreeNode};

use serde::{Deserialize, Serialize};

/// Scores one ordered feature row.
///
/// Implementations must be pure: the same row always yields the same probability.
pub trait Classifier: Send + Sync {
    /// Probability of the approved class, expected in `[0, 1]`.
    fn positive_probability(&self, row: &[f64]) -> Result<f64, ClassifierError>;

    /// Number of features the model expects, when it is known up front.
    fn input_width(&self) -> Option<usize> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier expects {expected} features, received {actual}")]
    WidthMismatch { expected: usize, actual: usize },
    #[error("classifier produced an invalid probability: {0}")]
    InvalidProbability(f64),
    #[error("malformed classifier: {0}")]
    Malformed(String),
    #[error("classifier runtime failed: {0}")]
    Backend(String),
}

/// Serialized classifier definitions, tagged by `kind`.
///
/// Inline kinds carry their parameters; `onnx` references a graph file next to
/// the bundle and is instantiated by the bundle loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    LogisticRegression(LogisticRegression),
    TreeEnsemble(TreeEnsemble),
    Onnx(OnnxModelRef),
}

impl ClassifierSpec {
    pub fn validate(&self) -> Result<(), ClassifierError> {
        match self {
            ClassifierSpec::LogisticRegression(model) => model.validate(),
            ClassifierSpec::TreeEnsemble(model) => model.validate(),
            ClassifierSpec::Onnx(reference) => reference.validate(),
        }
    }
}

pub(crate) fn check_width(expected: usize, row: &[f64]) -> Result<(), ClassifierError> {
    if row.len() == expected {
        Ok(())
    } else {
        Err(ClassifierError::WidthMismatch {
            expected,
            actual: row.len(),
        })
    }
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
