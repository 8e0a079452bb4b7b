//! Server lifecycle: bind, serve, shut down on a signal.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::handlers::create_router;
use crate::state::AppState;

/// Build the application from `config` and serve it until Ctrl+C or TERM
pub async fn serve(config: ServerConfig) -> Result<()> {
    config.validate().context("Invalid server configuration")?;
    let addr = config.socket_addr().context("Invalid listen address")?;

    let state = AppState::from_config(&config).await?;
    let (users, routes, buses, conductors) = state.fleet.counts();
    info!(
        "Serving {} routes, {} buses, {} conductors, {} users (model: {})",
        routes,
        buses,
        conductors,
        users,
        state.generator.classifier_name()
    );

    let app = create_router(state);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Server listening on: http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received TERM signal");
            }
            Err(e) => {
                warn!("Failed to install TERM handler: {}", e);
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
}
