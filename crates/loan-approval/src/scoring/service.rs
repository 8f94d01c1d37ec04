use std::path::Path;
use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{error, info, warn};

use super::bundle::ModelBundle;
use super::classifier::ClassifierError;
use super::domain::{ApplicantInput, HealthStatus, PredictionResult, SchemaVersion};
use super::engine::decide;
use super::features::{derive_features, FeatureError};
use super::schema::{project, SchemaMismatch};

/// Detail returned whenever no bundle is available.
pub const MODEL_UNAVAILABLE_DETAIL: &str = "Model not loaded on server";

/// Runs derive → project → score against the bundle loaded at startup.
#[derive(Debug, Clone, Default)]
pub struct PredictionService {
    bundle: Option<Arc<ModelBundle>>,
}

impl PredictionService {
    pub fn new(bundle: ModelBundle) -> Self {
        Self {
            bundle: Some(Arc::new(bundle)),
        }
    }

    /// Service without a model; every prediction fails with [`PredictionError::ModelUnavailable`].
    pub fn unavailable() -> Self {
        Self { bundle: None }
    }

    /// Load the bundle at `path`, logging and degrading to [`Self::unavailable`] on failure.
    pub fn from_path(path: &Path) -> Self {
        match ModelBundle::load(path) {
            Ok(bundle) => {
                info!(
                    path = %path.display(),
                    schema = %bundle.schema(),
                    threshold = bundle.threshold(),
                    features = bundle.required_features().len(),
                    "model bundle loaded"
                );
                Self::new(bundle)
            }
            Err(err) => {
                error!(
                    path = %path.display(),
                    error = %err,
                    "model bundle unavailable; /predict disabled"
                );
                Self::unavailable()
            }
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.bundle.is_some()
    }

    pub fn bundle(&self) -> Option<&ModelBundle> {
        self.bundle.as_deref()
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus::active(self.model_loaded())
    }

    /// Decode a raw request body against the loaded generation and predict.
    pub fn predict_json(
        &self,
        payload: serde_json::Value,
    ) -> Result<PredictionResult, PredictionError> {
        let bundle = self.loaded()?;
        let input = bundle
            .schema()
            .decode_input(payload)
            .map_err(|err| PredictionError::MalformedRequest(err.to_string()))?;
        self.predict(&input)
    }

    pub fn predict(&self, input: &ApplicantInput) -> Result<PredictionResult, PredictionError> {
        let bundle = self.loaded()?;
        if input.schema_version() != bundle.schema() {
            return Err(PredictionError::GenerationMismatch {
                bundle: bundle.schema(),
                input: input.schema_version(),
            });
        }

        let features = derive_features(input)?;
        let projected = project(features, bundle.required_features())?;
        let scored = decide(bundle.classifier(), &projected.values(), bundle.threshold())?;

        info!(
            decision = scored.decision.label(),
            probability = scored.probability,
            threshold = scored.threshold,
            "prediction served"
        );

        let input_summary = match input {
            ApplicantInput::V1(applicant) => Some(applicant.clone()),
            ApplicantInput::V2(_) => None,
        };

        Ok(PredictionResult {
            status: "Success",
            decision: scored.decision,
            probability: scored.probability,
            threshold: scored.threshold,
            input_summary,
        })
    }

    fn loaded(&self) -> Result<&ModelBundle, PredictionError> {
        self.bundle.as_deref().ok_or_else(|| {
            warn!("prediction requested without a loaded model");
            PredictionError::ModelUnavailable
        })
    }
}

/// Failure classes of the prediction pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("{}", MODEL_UNAVAILABLE_DETAIL)]
    ModelUnavailable,
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatch),
    #[error(transparent)]
    InvalidInput(#[from] FeatureError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error("{0}")]
    MalformedRequest(String),
    #[error("applicant uses schema {input} but the loaded model expects {bundle}")]
    GenerationMismatch {
        bundle: SchemaVersion,
        input: SchemaVersion,
    },
}

impl PredictionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PredictionError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            PredictionError::MalformedRequest(_) | PredictionError::GenerationMismatch { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PredictionError::SchemaMismatch(_)
            | PredictionError::InvalidInput(_)
            | PredictionError::Classifier(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
