//! Demand classification client for the external model service.
//!
//! The trained classifier lives in a separate process and is reached over
//! gRPC. This crate handles:
//! - Connection management to the model service
//! - Converting [`DemandFeatures`] to protobuf messages
//! - Coercing raw labels into a [`Verdict`]
//! - Degrading to [`Verdict::Unavailable`] when the service is down

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tonic::transport::Channel;
use tracing::{debug, error, info, warn};

pub mod verdict;

pub use verdict::{coerce_label, DemandClass, DemandFeatures, Verdict};

// Include the generated protobuf code
pub mod demand {
    tonic::include_proto!("demand");
}

use demand::{
    demand_classifier_service_client::DemandClassifierServiceClient as GrpcDemandClient,
    ClassifyRequest,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors that can occur when interacting with the model service
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Invalid model service address {addr}: {reason}")]
    InvalidAddress { addr: String, reason: String },

    #[error("Failed to connect to model service: {0}")]
    ConnectionError(String),

    #[error("Failed to classify route: {0}")]
    ClassificationError(String),
}

/// A source of demand verdicts.
///
/// Implementations never fail: a broken or missing model is reported as
/// [`Verdict::Unavailable`] and the caller decides how to degrade.
#[async_trait]
pub trait DemandClassifier: Send + Sync {
    /// Returns the name of this classifier (for logging/debugging)
    fn name(&self) -> &str;

    async fn classify(&self, features: &DemandFeatures) -> Verdict;
}

impl From<&DemandFeatures> for ClassifyRequest {
    fn from(f: &DemandFeatures) -> Self {
        ClassifyRequest {
            trips: f.trips,
            stop_events: f.stop_events,
            shift_morning: f.shift_morning,
            shift_afternoon: f.shift_afternoon,
            shift_other: f.shift_other,
        }
    }
}

/// Client for the model service.
///
/// Wraps the generated gRPC client. Cloning is cheap; every call works on
/// its own clone of the underlying channel.
#[derive(Clone)]
pub struct GrpcDemandClassifier {
    client: GrpcDemandClient<Channel>,
    service_addr: String,
}

impl GrpcDemandClassifier {
    /// Connect to the model service.
    ///
    /// # Arguments
    /// * `addr` - Address of the gRPC service (e.g., "http://localhost:50051")
    pub async fn connect(addr: impl Into<String>) -> Result<Self, ClassifierError> {
        let addr = addr.into();
        info!("Connecting to model service at {}", addr);

        let endpoint = Channel::from_shared(addr.clone()).map_err(|e| {
            ClassifierError::InvalidAddress {
                addr: addr.clone(),
                reason: e.to_string(),
            }
        })?;

        let channel = endpoint
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .connect()
            .await
            .map_err(|e| ClassifierError::ConnectionError(e.to_string()))?;

        Ok(GrpcDemandClassifier {
            client: GrpcDemandClient::new(channel),
            service_addr: addr,
        })
    }

    /// Ask the model for a raw label.
    pub async fn classify_raw(&self, features: &DemandFeatures) -> Result<String, ClassifierError> {
        let request = tonic::Request::new(ClassifyRequest::from(features));

        let mut client = self.client.clone();
        let response = client.classify(request).await.map_err(|e| {
            error!("gRPC error while classifying route: {}", e);
            ClassifierError::ClassificationError(e.to_string())
        })?;

        Ok(response.into_inner().label)
    }

    /// Get the address of the model service this client is connected to.
    pub fn service_address(&self) -> &str {
        &self.service_addr
    }
}

#[async_trait]
impl DemandClassifier for GrpcDemandClassifier {
    fn name(&self) -> &str {
        "GrpcDemandClassifier"
    }

    async fn classify(&self, features: &DemandFeatures) -> Verdict {
        match self.classify_raw(features).await {
            Ok(label) => {
                debug!("Model service returned label {:?}", label);
                Verdict::from_label(&label)
            }
            Err(e) => {
                warn!("Model service call failed, verdict unavailable: {}", e);
                Verdict::Unavailable
            }
        }
    }
}

/// Stand-in used when no model could be loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableClassifier;

#[async_trait]
impl DemandClassifier for UnavailableClassifier {
    fn name(&self) -> &str {
        "UnavailableClassifier"
    }

    async fn classify(&self, _features: &DemandFeatures) -> Verdict {
        Verdict::Unavailable
    }
}

/// Connect to the model service, or fall back to [`UnavailableClassifier`]
/// if it cannot be reached. Startup never fails because of the model.
pub async fn connect_or_unavailable(addr: impl Into<String>) -> Arc<dyn DemandClassifier> {
    match GrpcDemandClassifier::connect(addr).await {
        Ok(client) => {
            info!("Connected to model service at {}", client.service_address());
            Arc::new(client)
        }
        Err(e) => {
            warn!("{}; recommendations will use random fallback verdicts", e);
            Arc::new(UnavailableClassifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use demand::demand_classifier_service_server::{
        DemandClassifierService, DemandClassifierServiceServer,
    };
    use demand::ClassifyResponse;
    use tokio::net::TcpListener;
    use tokio_stream::wrappers::TcpListenerStream;
    use tonic::transport::Server;
    use tonic::{Request, Response, Status};

    fn features(trips: u32) -> DemandFeatures {
        DemandFeatures {
            trips,
            stop_events: 200,
            shift_morning: true,
            shift_afternoon: false,
            shift_other: false,
        }
    }

    // ============================================================================
    // Mock model service
    // ============================================================================

    /// Answers with `trips` as the label, or an error when trips == 99
    #[derive(Default)]
    struct MockModel;

    #[tonic::async_trait]
    impl DemandClassifierService for MockModel {
        async fn classify(
            &self,
            request: Request<ClassifyRequest>,
        ) -> Result<Response<ClassifyResponse>, Status> {
            let req = request.into_inner();
            if req.trips == 99 {
                return Err(Status::internal("model exploded"));
            }
            if !req.shift_morning || req.shift_afternoon || req.shift_other {
                return Err(Status::invalid_argument("unexpected shift flags"));
            }
            Ok(Response::new(ClassifyResponse {
                label: req.trips.to_string(),
            }))
        }
    }

    async fn start_mock_model() -> (String, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock model service");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            Server::builder()
                .add_service(DemandClassifierServiceServer::new(MockModel))
                .serve_with_incoming(TcpListenerStream::new(listener))
                .await
                .expect("Mock model service failed");
        });

        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_request_from_features() {
        let request = ClassifyRequest::from(&features(12));
        assert_eq!(request.trips, 12);
        assert_eq!(request.stop_events, 200);
        assert!(request.shift_morning);
        assert!(!request.shift_other);
    }

    #[tokio::test]
    async fn test_classify_against_mock_service() {
        let (addr, handle) = start_mock_model().await;
        let client = GrpcDemandClassifier::connect(addr.clone())
            .await
            .expect("Failed to connect");
        assert_eq!(client.service_address(), addr);

        assert_eq!(client.classify(&features(0)).await, Verdict::Classified(DemandClass::Low));
        assert_eq!(client.classify(&features(2)).await, Verdict::Classified(DemandClass::High));
        // Out-of-range label is coerced, not rejected
        assert_eq!(client.classify(&features(7)).await, Verdict::Classified(DemandClass::Medium));

        handle.abort();
    }

    #[tokio::test]
    async fn test_service_error_is_unavailable() {
        let (addr, handle) = start_mock_model().await;
        let client = GrpcDemandClassifier::connect(addr).await.expect("Failed to connect");

        assert!(client.classify_raw(&features(99)).await.is_err());
        assert_eq!(client.classify(&features(99)).await, Verdict::Unavailable);

        handle.abort();
    }

    #[tokio::test]
    async fn test_invalid_address() {
        let result = GrpcDemandClassifier::connect("not a uri").await;
        assert!(matches!(result, Err(ClassifierError::InvalidAddress { .. })));
    }

    #[tokio::test]
    async fn test_connect_or_unavailable_falls_back() {
        // Bind then drop a listener so the port is known to be closed
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let classifier = connect_or_unavailable(addr).await;
        assert_eq!(classifier.name(), "UnavailableClassifier");
        assert_eq!(classifier.classify(&features(2)).await, Verdict::Unavailable);
    }
}
