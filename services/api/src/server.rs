use crate::cli::ServeArgs;
use crate::infra::{build_services, AppState};
use crate::routes::build_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use travel_desk::config::AppConfig;
use travel_desk::error::AppError;
use travel_desk::{storage, telemetry};
use tracing::{info, warn};

const DRAIN_GRACE: Duration = Duration::from_secs(1);

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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let pool = storage::connect(&config.database)?;
    storage::migrate(&pool).await?;

    let services = build_services(&config, pool);
    info!(provider = ?services.notifier.provider(), "mail notifications configured");
    let notifier = services.notifier.clone();

    let app = build_router(
        services.trips,
        services.accounts,
        services.notifier,
        services.tokens,
    )
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "travel desk api ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(readiness_flag))
        .await?;

    // Every send is bounded by the mail timeout, so this wait is too.
    let pending = notifier.drain(config.mail.timeout + DRAIN_GRACE).await;
    if pending > 0 {
        warn!(pending, "stopping with notifications still in flight");
    }
    info!("travel desk api stopped");
    Ok(())
}

async fn shutdown_signal(readiness: Arc<AtomicBool>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    readiness.store(false, Ordering::Release);
    info!("shutdown signal received, draining connections");
}
