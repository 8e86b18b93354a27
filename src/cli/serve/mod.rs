//! Serve command - seeds the store and runs the HTTP server

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use super::bootstrap;
use crate::api::state::AppState;
use crate::api::{cors_layer, create_router_with_body_limit};
use crate::config::AppConfig;
use crate::infrastructure::observability::{PrometheusMetrics, create_metrics_router, init_metrics};

pub async fn run() -> anyhow::Result<()> {
    let config = bootstrap();

    let state = crate::create_app_state_with_config(&config).await?;

    state
        .orchestrator
        .initialize()
        .await
        .inspect_err(|e| error!(error = %e, "Store initialization failed"))?;

    let metrics = init_metrics(&config.metrics);
    let app = create_app_router(state, &config, metrics);

    let addr = build_socket_addr(&config)?;
    info!("Starting simulation gateway on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}

/// API router with CORS and, when enabled, the metrics endpoint
fn create_app_router(state: AppState, config: &AppConfig, metrics: Option<PrometheusMetrics>) -> Router {
    let mut router = create_router_with_body_limit(state, config.server.max_body_bytes);

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m));
    }

    router.layer(cors_layer(&config.cors))
}
