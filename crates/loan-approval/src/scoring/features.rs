use serde::Serialize;

use super::domain::{ApplicantInput, BaseApplicant, ExtendedApplicant};

pub const AGE: &str = "Age";
pub const INCOME: &str = "Income";
pub const CREDIT_SCORE: &str = "Credit_Score";
pub const LOAN_AMOUNT: &str = "Loan_Amount";
pub const EMP_STATUS_NUM: &str = "Emp_Status_Num";
pub const DTI_RATIO: &str = "DTI_Ratio";

pub const EMP_CREDIT_STABILITY: &str = "Emp_Credit_Stability";
pub const INCOME_DEBT_RATIO: &str = "Income_Debt_Ratio";
pub const LOAN_ELIGIBILITY_FACTOR: &str = "Loan_Eligibility_Factor";
pub const NET_FINANCIAL_HEALTH: &str = "Net_Financial_Health";

/// Offset added to the debt-to-income ratio before dividing income by it.
pub const DTI_OFFSET: f64 = 0.01;

/// Ordered name/value pairs: raw attributes first, engineered features after.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureVector {
    entries: Vec<(String, f64)>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a feature; a repeated name overwrites the earlier value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| *value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, value)| *value).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut vector = FeatureVector::new();
        for (name, value) in iter {
            vector.insert(name, value);
        }
        vector
    }
}

/// Arithmetic failure while computing an engineered feature.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    #[error("cannot derive {feature}: {divisor} must be non-zero")]
    DivisionByZero {
        feature: &'static str,
        divisor: &'static str,
    },
    #[error("derived feature {feature} is not finite ({value})")]
    NonFinite { feature: &'static str, value: f64 },
}

/// Compute the feature vector for the formula set matching the input's generation.
pub fn derive_features(input: &ApplicantInput) -> Result<FeatureVector, FeatureError> {
    match input {
        ApplicantInput::V1(applicant) => derive_base(applicant),
        ApplicantInput::V2(applicant) => derive_extended(applicant),
    }
}

fn derive_base(applicant: &BaseApplicant) -> Result<FeatureVector, FeatureError> {
    if applicant.loan_amount == 0.0 {
        return Err(FeatureError::DivisionByZero {
            feature: EMP_CREDIT_STABILITY,
            divisor: LOAN_AMOUNT,
        });
    }

    let credit_score = applicant.credit_score as f64;
    let stability = (applicant.income * credit_score) / applicant.loan_amount;

    let mut vector = FeatureVector::new();
    vector.insert(AGE, applicant.age as f64);
    vector.insert(INCOME, applicant.income);
    vector.insert(CREDIT_SCORE, credit_score);
    vector.insert(LOAN_AMOUNT, applicant.loan_amount);
    vector.insert(EMP_CREDIT_STABILITY, finite(EMP_CREDIT_STABILITY, stability)?);
    Ok(vector)
}

fn derive_extended(applicant: &ExtendedApplicant) -> Result<FeatureVector, FeatureError> {
    let credit_score = applicant.credit_score as f64;
    let emp_status = applicant.emp_status_num as f64;

    let stability = emp_status * credit_score;
    let income_debt = applicant.income / (applicant.dti_ratio + DTI_OFFSET);
    let eligibility = applicant.income * credit_score;
    let net_health = (applicant.income * emp_status) - applicant.dti_ratio;

    let mut vector = FeatureVector::new();
    vector.insert(AGE, applicant.age as f64);
    vector.insert(INCOME, applicant.income);
    vector.insert(CREDIT_SCORE, credit_score);
    vector.insert(LOAN_AMOUNT, applicant.loan_amount);
    vector.insert(EMP_STATUS_NUM, emp_status);
    vector.insert(DTI_RATIO, applicant.dti_ratio);
    vector.insert(EMP_CREDIT_STABILITY, finite(EMP_CREDIT_STABILITY, stability)?);
    vector.insert(INCOME_DEBT_RATIO, finite(INCOME_DEBT_RATIO, income_debt)?);
    vector.insert(
        LOAN_ELIGIBILITY_FACTOR,
        finite(LOAN_ELIGIBILITY_FACTOR, eligibility)?,
    );
    vector.insert(NET_FINANCIAL_HEALTH, finite(NET_FINANCIAL_HEALTH, net_health)?);
    Ok(vector)
}

fn finite(feature: &'static str, value: f64) -> Result<f64, FeatureError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FeatureError::NonFinite { feature, value })
    }
}
