use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tract_onnx::prelude::*;

use super::{check_width, sigmoid, Classifier, ClassifierError};

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// How the selected graph output maps onto a positive-class probability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnnxOutput {
    /// Class probabilities; the last element is the approved class.
    #[default]
    Probabilities,
    /// A single log-odds value passed through the sigmoid.
    Logit,
}

/// Bundle entry pointing at an exported ONNX graph.
///
/// `path` is resolved against the bundle's directory. The row width defaults to
/// the bundle's `features` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnnxModelRef {
    pub path: PathBuf,
    #[serde(default)]
    pub output: OnnxOutput,
    /// Graph output to read; the last one when absent (sklearn exporters emit
    /// the label first and the probabilities second).
    #[serde(default)]
    pub output_index: Option<usize>,
    #[serde(default)]
    pub n_features: Option<usize>,
}

impl OnnxModelRef {
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.path.as_os_str().is_empty() {
            return Err(ClassifierError::Malformed("onnx path is empty".to_string()));
        }
        if self.n_features == Some(0) {
            return Err(ClassifierError::Malformed(
                "onnx n_features must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Optimized tract plan over a `[1, n_features]` float input.
pub struct OnnxClassifier {
    plan: OnnxPlan,
    n_features: usize,
    output: OnnxOutput,
    output_index: Option<usize>,
}

impl OnnxClassifier {
    pub fn load(
        path: &Path,
        n_features: usize,
        output: OnnxOutput,
        output_index: Option<usize>,
    ) -> TractResult<Self> {
        let plan = tract_onnx::onnx()
            .model_for_path(path)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, n_features)),
            )?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self {
            plan,
            n_features,
            output,
            output_index,
        })
    }

    fn run(&self, row: &[f64]) -> TractResult<f32> {
        let values: Vec<f32> = row.iter().map(|value| *value as f32).collect();
        let input = Tensor::from_shape(&[1, self.n_features], &values)?;
        let outputs = self.plan.run(tvec!(input.into()))?;

        let index = self
            .output_index
            .unwrap_or_else(|| outputs.len().saturating_sub(1));
        let selected = outputs
            .get(index)
            .ok_or_else(|| {
                TractError::msg(format!("model has {} outputs, wanted {index}", outputs.len()))
            })?;
        let view = selected.to_array_view::<f32>()?;

        let value = match self.output {
            OnnxOutput::Probabilities => view.iter().last(),
            OnnxOutput::Logit => view.iter().next(),
        };
        value
            .copied()
            .ok_or_else(|| TractError::msg(format!("output {index} is empty")))
    }
}

impl Classifier for OnnxClassifier {
    fn positive_probability(&self, row: &[f64]) -> Result<f64, ClassifierError> {
        check_width(self.n_features, row)?;
        let value = f64::from(
            self.run(row)
                .map_err(|err| ClassifierError::Backend(err.to_string()))?,
        );

        Ok(match self.output {
            OnnxOutput::Probabilities => value,
            OnnxOutput::Logit => sigmoid(value),
        })
    }

    fn input_width(&self) -> Option<usize> {
        Some(self.n_features)
    }
}

impl fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("n_features", &self.n_features)
            .field("output", &self.output)
            .field("output_index", &self.output_index)
            .finish_non_exhaustive()
    }
}
