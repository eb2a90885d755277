use crate::cli::ServeArgs;
use crate::infra::{demo_directory, load_roster, AppState};
use crate::routes::with_roster_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Local, Utc};
use daycare::config::AppConfig;
use daycare::error::AppError;
use daycare::ratio::RatioPolicy;
use daycare::roster::RosterService;
use daycare::telemetry;
use std::sync::atomic::Ordering;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = load_roster(&args.roster, Local::now().date_naive(), Utc::now())?;
    let policy = RatioPolicy::from(&config.ratio);
    let roster_service = Arc::new(RosterService::new(repository, policy));

    let directory = demo_directory();
    let mut sessions: Vec<_> = directory.sessions().collect();
    sessions.sort_by_key(|(token, _)| *token);
    for (token, profile) in sessions {
        info!(token, role = profile.role.label(), "demo session available");
    }

    let app = with_roster_routes(roster_service, Arc::new(directory))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "daycare ratio service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
