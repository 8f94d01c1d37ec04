use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_prediction_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loan_approval::config::AppConfig;
use loan_approval::error::AppError;
use loan_approval::scoring::PredictionService;
use loan_approval::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(model) = args.model.take() {
        config.model.bundle_path = model;
    }

    telemetry::init(&config.telemetry)?;

    // A missing or broken bundle leaves the service up with /predict answering 503.
    let service = Arc::new(PredictionService::from_path(&config.model.bundle_path));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_prediction_routes(service.clone())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    let bundle = service.bundle();
    info!(
        ?config.environment,
        %addr,
        model_loaded = service.model_loaded(),
        schema = bundle.map(|bundle| bundle.schema().label()),
        threshold = bundle.map(|bundle| bundle.threshold()),
        "loan approval engine ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
