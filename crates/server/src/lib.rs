//! HTTP backend for the RouteSaathi coordinator dashboard.
//!
//! Wires the snapshot index, the recommendation generator and the message
//! log into an axum router served under `/api`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod messages;
pub mod server;
pub mod state;

pub use config::{ConfigError, ConfigOverrides, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use handlers::{create_router, API_PREFIX};
pub use messages::{MessageLog, NewMessage};
pub use server::serve;
pub use state::AppState;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_level` when set. Fails if a subscriber is
/// already installed.
pub fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},tower_http=info")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
}
