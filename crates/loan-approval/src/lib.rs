//! Loan approval inference: derive engineered features from applicant attributes,
//! project them onto the model's trained schema, and threshold the classifier's
//! approval probability.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
