use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use error_boundary::api::handlers::AppStateInner;
use error_boundary::api::routes::create_router;
use error_boundary::config::Config;
use error_boundary::metrics;
use error_boundary::origin::OriginProxy;

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Starting graceful shutdown...");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,error_boundary=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting error boundary v{}", env!("CARGO_PKG_VERSION"));

    metrics::registry::init_metrics();
    info!("Metrics registry initialized");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded successfully");

    let policy = config.boundary.policy();
    if policy.expose_messages {
        warn!("Downstream error messages are included in 500 responses");
    }

    let origin = match &config.downstream.origin {
        Some(origin_config) => {
            let proxy =
                OriginProxy::new(origin_config).context("Failed to initialize origin proxy")?;
            info!("Downstream is origin {}", proxy.base_url());
            Some(proxy)
        }
        None => {
            info!(
                "No origin configured, serving static files from {}",
                config.downstream.static_dir
            );
            None
        }
    };

    let state = Arc::new(AppStateInner {
        origin,
        static_dir: config.downstream.static_dir.clone(),
        policy,
        instance_id: config.server.instance_id.clone(),
    });

    let app = create_router(state);

    let addr = config.server_address();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind server")?;

    info!("Server listening on {}", addr);

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");

    Ok(())
}
