//! Standalone dashboard server configured from `ROUTESAATHI_*` variables.

use anyhow::Result;
use tracing::info;

use server::{init_tracing, serve, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env()?;
    init_tracing(&config.log_level)?;

    info!("Starting RouteSaathi server");
    serve(config).await
}
