use crate::cli::ServeArgs;
use crate::infra::{load_roster, AppState, InMemoryComplianceRepository, RosterSources};
use crate::routes::with_qualification_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};
use training_compliance::config::AppConfig;
use training_compliance::error::AppError;
use training_compliance::telemetry;
use training_compliance::workflows::qualification::QualificationService;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(snapshot) = args.snapshot.take() {
        config.data.snapshot_path = Some(snapshot);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    if config.data.snapshot_path.is_none() {
        warn!("no roster snapshot configured; serving an empty roster");
    }
    let roster = load_roster(&RosterSources {
        snapshot: config.data.snapshot_path.clone(),
        ..RosterSources::default()
    })?;
    let repository = Arc::new(InMemoryComplianceRepository::new(roster));
    let qualification_service = Arc::new(QualificationService::new(repository));

    let app = with_qualification_routes(qualification_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "training compliance service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
