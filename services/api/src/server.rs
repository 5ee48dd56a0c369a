use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryMortgageRepository};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use mortgage_rating::config::AppConfig;
use mortgage_rating::error::AppError;
use mortgage_rating::mortgages::MortgageService;
use mortgage_rating::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.data_file.take() {
        config.storage.data_file = Some(path);
    }

    let _telemetry = telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = match &config.storage.data_file {
        Some(path) => {
            let repository = InMemoryMortgageRepository::with_snapshot(path.clone())?;
            info!(path = %path.display(), records = repository.len(), "loaded mortgage snapshot");
            repository
        }
        None => InMemoryMortgageRepository::default(),
    };
    let service = Arc::new(MortgageService::new(Arc::new(repository)));

    let app = with_operational_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "mortgage rating service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
