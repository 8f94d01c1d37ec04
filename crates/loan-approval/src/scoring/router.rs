use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{error, warn};

use super::domain::HealthStatus;
use super::service::{PredictionError, PredictionService};

const ALLOWED_METHODS: &str = "DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT";
const PREFLIGHT_MAX_AGE: &str = "600";

/// Router exposing the liveness and prediction endpoints with permissive CORS.
pub fn prediction_router(service: Arc<PredictionService>) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        .route("/predict", post(predict_handler))
        .layer(middleware::from_fn(permissive_cors))
        .with_state(service)
}

pub(crate) async fn health_handler(
    State(service): State<Arc<PredictionService>>,
) -> Json<HealthStatus> {
    Json(service.health())
}

pub(crate) async fn predict_handler(
    State(service): State<Arc<PredictionService>>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
    if !service.model_loaded() {
        return PredictionError::ModelUnavailable.into_response();
    }

    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            return PredictionError::MalformedRequest(rejection.body_text()).into_response();
        }
    };

    match service.predict_json(payload) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => err.into_response(),
    }
}

impl IntoResponse for PredictionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!(error = %self, "prediction failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "prediction rejected");
        }

        let payload = json!({ "detail": self.to_string() });
        (status, Json(payload)).into_response()
    }
}

/// Any-origin CORS: preflights are answered directly, other responses get the allow headers.
pub async fn permissive_cors(request: Request, next: Next) -> Response {
    let is_preflight = request.method() == Method::OPTIONS
        && request
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

    if is_preflight {
        let requested_headers = request
            .headers()
            .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned();

        let mut response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            requested_headers.unwrap_or_else(|| HeaderValue::from_static("*")),
        );
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(PREFLIGHT_MAX_AGE),
        );
        return response;
    }

    let mut response = next.run(request).await;
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}
