//! Shared application state, built once at startup.

use std::sync::Arc;

use anyhow::{Context, Result};
use data_loader::FleetIndex;
use ml_client::{connect_or_unavailable, DemandClassifier, UnavailableClassifier};
use pipeline::RecommendationGenerator;
use tracing::info;

use crate::config::ServerConfig;
use crate::messages::MessageLog;

#[derive(Clone)]
pub struct AppState {
    pub fleet: Arc<FleetIndex>,
    pub generator: RecommendationGenerator,
    pub messages: Arc<MessageLog>,
}

impl AppState {
    pub fn new(fleet: Arc<FleetIndex>, classifier: Arc<dyn DemandClassifier>) -> Self {
        let generator = RecommendationGenerator::new(Arc::clone(&fleet), classifier);
        Self {
            fleet,
            generator,
            messages: Arc::new(MessageLog::seeded()),
        }
    }

    /// Load snapshots from `config.data_dir` and connect to the model service
    pub async fn from_config(config: &ServerConfig) -> Result<Self> {
        let data_dir = config.data_dir.clone();
        let index = tokio::task::spawn_blocking(move || FleetIndex::load_from_dir(&data_dir))
            .await
            .context("Snapshot loading task panicked")?
            .with_context(|| format!("Failed to load snapshots from {}", config.data_dir.display()))?;

        let classifier: Arc<dyn DemandClassifier> = if config.classifier_enabled() {
            connect_or_unavailable(config.classifier_addr.clone()).await
        } else {
            info!("No model service configured; using random fallback verdicts");
            Arc::new(UnavailableClassifier)
        };

        Ok(Self::new(Arc::new(index), classifier))
    }
}
