use std::fmt;

use serde::{Deserialize, Serialize};

/// Generation of the applicant schema and feature formulas a bundle was trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaVersion {
    /// Four raw attributes and a single ratio-based stability feature.
    #[serde(rename = "v1")]
    V1,
    /// Adds employment status and debt-to-income plus four engineered features.
    #[serde(rename = "v2")]
    V2,
}

impl SchemaVersion {
    /// Threshold applied when the bundle does not carry a tuned one.
    pub fn default_threshold(self) -> f64 {
        match self {
            SchemaVersion::V1 => 0.5,
            SchemaVersion::V2 => 0.87,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SchemaVersion::V1 => "v1",
            SchemaVersion::V2 => "v2",
        }
    }

    /// Decode a request body against this generation's field set.
    pub fn decode_input(
        self,
        payload: serde_json::Value,
    ) -> Result<ApplicantInput, serde_json::Error> {
        match self {
            SchemaVersion::V1 => serde_json::from_value(payload).map(ApplicantInput::V1),
            SchemaVersion::V2 => serde_json::from_value(payload).map(ApplicantInput::V2),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// First-generation applicant attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseApplicant {
    #[serde(rename = "Age")]
    pub age: i64,
    #[serde(rename = "Income")]
    pub income: f64,
    #[serde(rename = "Credit_Score")]
    pub credit_score: i64,
    #[serde(rename = "Loan_Amount")]
    pub loan_amount: f64,
}

/// Second-generation applicant attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedApplicant {
    #[serde(rename = "Age")]
    pub age: i64,
    #[serde(rename = "Income")]
    pub income: f64,
    #[serde(rename = "Credit_Score")]
    pub credit_score: i64,
    #[serde(rename = "Loan_Amount")]
    pub loan_amount: f64,
    #[serde(rename = "Emp_Status_Num")]
    pub emp_status_num: i64,
    #[serde(rename = "DTI_Ratio")]
    pub dti_ratio: f64,
}

/// Raw applicant record tagged with the generation it was decoded against.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplicantInput {
    V1(BaseApplicant),
    V2(ExtendedApplicant),
}

impl ApplicantInput {
    pub fn schema_version(&self) -> SchemaVersion {
        match self {
            ApplicantInput::V1(_) => SchemaVersion::V1,
            ApplicantInput::V2(_) => SchemaVersion::V2,
        }
    }
}

/// Binary outcome of thresholding the approval probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        if probability >= threshold {
            Decision::Approved
        } else {
            Decision::Rejected
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Decision::Approved => "Approved",
            Decision::Rejected => "Rejected",
        }
    }
}

/// Response body for a successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub status: &'static str,
    pub decision: Decision,
    pub probability: f64,
    pub threshold: f64,
    /// Echo of the raw request; only first-generation bundles return it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_summary: Option<BaseApplicant>,
}

/// Liveness payload reporting whether a bundle is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub model_loaded: bool,
}

impl HealthStatus {
    pub fn active(model_loaded: bool) -> Self {
        Self {
            status: "Active",
            model_loaded,
        }
    }
}
