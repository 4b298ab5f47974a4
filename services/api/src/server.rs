use crate::cli::ServeArgs;
use crate::infra::{AppState, Dormitory};
use crate::routes::with_dormitory_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use dormkeep::config::AppConfig;
use dormkeep::error::AppError;
use dormkeep::import::RoomRosterImporter;
use dormkeep::telemetry;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(roster) = args.roster_csv.take() {
        config.storage.roster_csv = Some(roster);
    }

    telemetry::init(&config.telemetry)?;

    if let Some(endpoint) = config.storage.database_endpoint() {
        warn!(
            %endpoint,
            user = config.storage.database_user.as_deref().unwrap_or("-"),
            backup_tool = ?config.storage.backup_tool,
            "external database configured; serving from the in-memory store"
        );
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let dormitory = Arc::new(Dormitory::in_memory());
    if let Some(path) = &config.storage.roster_csv {
        seed_rooms(&dormitory, path)?;
    }

    let app = with_dormitory_routes(dormitory)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "dormitory service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) fn seed_rooms(dormitory: &Dormitory, path: &Path) -> Result<(), AppError> {
    let summary = RoomRosterImporter::from_path(path, &dormitory.registry)?;
    info!(
        path = %path.display(),
        created = summary.created.len(),
        skipped = summary.skipped.len(),
        "room roster imported"
    );
    Ok(())
}
