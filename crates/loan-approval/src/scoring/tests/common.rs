use std::sync::Arc;

use axum::response::Response;
use serde_json::{json, Value};

use crate::scoring::classifier::{Classifier, ClassifierError, LogisticRegression};
use crate::scoring::{prediction_router, ModelBundle, PredictionService, SchemaVersion};

pub(super) const V1_FEATURES: [&str; 5] = [
    "Age",
    "Income",
    "Credit_Score",
    "Loan_Amount",
    "Emp_Credit_Stability",
];

pub(super) const V2_FEATURES: [&str; 10] = [
    "Age",
    "Income",
    "Credit_Score",
    "Loan_Amount",
    "Emp_Status_Num",
    "DTI_Ratio",
    "Emp_Credit_Stability",
    "Income_Debt_Ratio",
    "Loan_Eligibility_Factor",
    "Net_Financial_Health",
];

pub(super) fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|name| name.to_string()).collect()
}

/// Classifier double returning a fixed probability and remembering the last row.
#[derive(Default)]
pub(super) struct RecordingClassifier {
    pub(super) probability: f64,
    pub(super) rows: std::sync::Mutex<Vec<Vec<f64>>>,
}

impl RecordingClassifier {
    pub(super) fn returning(probability: f64) -> Arc<Self> {
        Arc::new(Self {
            probability,
            rows: std::sync::Mutex::new(Vec::new()),
        })
    }

    pub(super) fn last_row(&self) -> Option<Vec<f64>> {
        self.rows.lock().expect("rows mutex poisoned").last().cloned()
    }

    pub(super) fn calls(&self) -> usize {
        self.rows.lock().expect("rows mutex poisoned").len()
    }
}

impl Classifier for RecordingClassifier {
    fn positive_probability(&self, row: &[f64]) -> Result<f64, ClassifierError> {
        self.rows
            .lock()
            .expect("rows mutex poisoned")
            .push(row.to_vec());
        Ok(self.probability)
    }
}

pub(super) struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn positive_probability(&self, _row: &[f64]) -> Result<f64, ClassifierError> {
        Err(ClassifierError::Malformed("scoring backend offline".to_string()))
    }
}

pub(super) fn bundle_with(
    schema: SchemaVersion,
    classifier: Arc<dyn Classifier>,
    threshold: Option<f64>,
    features: &[&str],
) -> ModelBundle {
    ModelBundle::new(schema, classifier, threshold, names(features)).expect("valid bundle")
}

pub(super) fn logistic_v2_bundle() -> ModelBundle {
    let model = LogisticRegression {
        coefficients: vec![0.0; V2_FEATURES.len()],
        intercept: 2.0,
        scaler: None,
    };
    bundle_with(SchemaVersion::V2, Arc::new(model), None, &V2_FEATURES)
}

pub(super) fn v1_body() -> Value {
    json!({
        "Age": 30,
        "Income": 50000,
        "Credit_Score": 700,
        "Loan_Amount": 200000
    })
}

pub(super) fn v2_body() -> Value {
    json!({
        "Age": 40,
        "Income": 60000,
        "Credit_Score": 650,
        "Loan_Amount": 150000,
        "Emp_Status_Num": 1,
        "DTI_Ratio": 0.3
    })
}

pub(super) fn router_with(service: PredictionService) -> axum::Router {
    prediction_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    serde_json::from_slice(&bytes).expect("json body")
}
