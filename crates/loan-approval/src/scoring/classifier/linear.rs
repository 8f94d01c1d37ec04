use serde::{Deserialize, Serialize};

use super::{check_width, sigmoid, Classifier, ClassifierError};

/// Per-feature standardisation applied before the linear term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Binary logistic regression: `sigmoid(intercept + Σ coefᵢ·xᵢ)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<StandardScaler>,
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.coefficients.is_empty() {
            return Err(ClassifierError::Malformed(
                "logistic regression has no coefficients".to_string(),
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ClassifierError::Malformed(
                "logistic regression weights must be finite".to_string(),
            ));
        }

        if let Some(scaler) = &self.scaler {
            let width = self.coefficients.len();
            if scaler.mean.len() != width || scaler.scale.len() != width {
                return Err(ClassifierError::Malformed(format!(
                    "scaler covers {}/{} features, coefficients cover {width}",
                    scaler.mean.len(),
                    scaler.scale.len()
                )));
            }
            if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err(ClassifierError::Malformed(
                    "scaler scale entries must be finite and non-zero".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn linear_term(&self, row: &[f64]) -> f64 {
        let weighted = match &self.scaler {
            Some(scaler) => self
                .coefficients
                .iter()
                .zip(row)
                .zip(scaler.mean.iter().zip(&scaler.scale))
                .map(|((coef, x), (mean, scale))| coef * ((x - mean) / scale))
                .sum::<f64>(),
            None => self
                .coefficients
                .iter()
                .zip(row)
                .map(|(coef, x)| coef * x)
                .sum::<f64>(),
        };
        self.intercept + weighted
    }
}

impl Classifier for LogisticRegression {
    fn positive_probability(&self, row: &[f64]) -> Result<f64, ClassifierError> {
        check_width(self.coefficients.len(), row)?;
        let z = self.linear_term(row);
        if z.is_nan() {
            return Err(ClassifierError::InvalidProbability(z));
        }
        Ok(sigmoid(z))
    }

    fn input_width(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }
}
