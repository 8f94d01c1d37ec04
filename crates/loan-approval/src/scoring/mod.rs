//! Loan approval scoring: feature derivation, schema projection, and thresholded
//! classification behind a small HTTP surface.

pub mod bundle;
pub mod classifier;
pub mod domain;
pub(crate) mod engine;
pub mod features;
pub mod router;
pub(crate) mod schema;
pub mod service;

#[cfg(test)]
mod tests;

pub use bundle::{BundleError, ModelBundle};
pub use classifier::{Classifier, ClassifierError, ClassifierSpec};
pub use domain::{
    ApplicantInput, BaseApplicant, Decision, ExtendedApplicant, HealthStatus, PredictionResult,
    SchemaVersion,
};
pub use engine::{decide, round_probability, ScoredDecision};
pub use features::{derive_features, FeatureError, FeatureVector};
pub use router::prediction_router;
pub use schema::{project, SchemaMismatch};
pub use service::{PredictionError, PredictionService, MODEL_UNAVAILABLE_DETAIL};
