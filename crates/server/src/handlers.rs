//! HTTP routes for the coordinator dashboard.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use data_loader::{Alert, Bus, Conductor, DashboardStats, Message, Role, RouteSummary};
use pipeline::{FilterPipeline, Recommendation};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::messages::{NewMessage, RECENT_LIMIT};
use crate::state::AppState;

/// Prefix for every dashboard endpoint
pub const API_PREFIX: &str = "/api";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_role: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub dashboard_stats: DashboardStats,
    pub alerts: Vec<Alert>,
    pub routes: Vec<RouteSummary>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BusQuery {
    pub route: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub status: &'static str,
    pub message: String,
    pub recommendation: Recommendation,
}

#[derive(Debug, Serialize)]
pub struct MessageSent {
    pub status: &'static str,
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub status: &'static str,
    pub message: &'static str,
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/dashboard/stats", get(dashboard_stats))
        .route("/buses", get(list_buses))
        .route("/ai/recommendations", get(recommendations))
        .route("/ai/apply/{route_id}", post(apply_recommendation))
        .route("/communication/conductors", get(conductors))
        .route("/communication/messages", get(recent_messages))
        .route("/messages", post(send_message))
        .route("/broadcast", post(broadcast));

    Router::new()
        .route("/health", get(health))
        .nest(API_PREFIX, api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .fleet
        .authenticate(&req.username, &req.password, &req.role)
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials or role mismatch"))?;

    info!("User {} logged in as {}", user.username, user.role.as_str());
    Ok(Json(LoginResponse {
        token: format!("mock_token_{}", user.role.as_str()),
        user_role: user.role.as_str().to_string(),
        username: user.username.clone(),
    }))
}

async fn dashboard_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let mut dashboard_stats = state.fleet.stats().clone();
    dashboard_stats.pending_messages = state.messages.pending_for(Role::Coordinator).await;

    Json(StatsResponse {
        dashboard_stats,
        alerts: state.fleet.alerts().to_vec(),
        routes: state.fleet.routes().to_vec(),
    })
}

async fn list_buses(
    State(state): State<AppState>,
    Query(query): Query<BusQuery>,
) -> Json<Vec<Bus>> {
    let pipeline = FilterPipeline::from_query(query.route.as_deref(), query.status.as_deref());
    let buses = pipeline.apply(state.fleet.buses().to_vec());
    debug!("{} buses after {} filters", buses.len(), pipeline.len());
    Json(buses)
}

async fn recommendations(State(state): State<AppState>) -> Json<Vec<Recommendation>> {
    Json(state.generator.generate().await)
}

async fn apply_recommendation(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
) -> ApiResult<Json<ApplyResponse>> {
    let recommendation = state.generator.apply_by_route_id(&route_id).await?;

    info!("Applied recommendation for route {}: {}", route_id, recommendation.change);
    Ok(Json(ApplyResponse {
        status: "success",
        message: format!(
            "Recommendation for Route {} applied: {} buses reallocated.",
            route_id, recommendation.change
        ),
        recommendation,
    }))
}

async fn conductors(State(state): State<AppState>) -> Json<Vec<Conductor>> {
    Json(state.fleet.conductors().to_vec())
}

async fn recent_messages(State(state): State<AppState>) -> Json<Vec<Message>> {
    Json(state.messages.recent(RECENT_LIMIT).await)
}

async fn send_message(
    State(state): State<AppState>,
    Json(new): Json<NewMessage>,
) -> ApiResult<(StatusCode, Json<MessageSent>)> {
    if new.message.trim().is_empty() {
        return Err(ApiError::validation("Message text must not be empty"));
    }

    let id = state.messages.append(new).await;
    Ok((
        StatusCode::CREATED,
        Json(MessageSent {
            status: "Message Sent",
            id,
        }),
    ))
}

async fn broadcast(
    State(state): State<AppState>,
    Json(req): Json<BroadcastRequest>,
) -> ApiResult<(StatusCode, Json<BroadcastResponse>)> {
    if req.message.trim().is_empty() {
        return Err(ApiError::validation("Broadcast text must not be empty"));
    }

    let online = state.fleet.conductors().iter().filter(|c| c.online).count();
    info!("Broadcast queued for {} online conductors", online);
    Ok((
        StatusCode::CREATED,
        Json(BroadcastResponse {
            status: "Broadcast successful",
            message: "Message queued for delivery to all active conductors.",
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use data_loader::parser::{parse_json, FLEET_FILE, STATS_FILE};
    use data_loader::{FleetIndex, FleetSnapshot, StatsSnapshot, User};
    use ml_client::{DemandClass, DemandClassifier, DemandFeatures, Verdict};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const STATS: &str = r#"{
        "dashboard_stats": {"totalBuses": 24, "lowDemandRoutes": 5, "highDemandRoutes": 8,
                            "pendingMessages": 99, "mlSuggestions": 6, "congestionAlerts": 4},
        "alerts": [{"type": "danger", "message": "Route 335E: severe congestion", "time": "15 mins ago"}],
        "routes": [
            {"id": "335E", "name": "Kempegowda BS → Electronic City", "activeBuses": 6},
            {"id": "201", "name": "Shanthinagar → Marathahalli", "activeBuses": 1}
        ]
    }"#;

    const FLEET: &str = r#"{
        "buses": [
            {"number": "KA-01-F-4532", "conductor_id": 1, "conductor": "Ramesh Kumar", "route": "335E",
             "location": "Silk Board Junction", "status": "ontime", "statusText": "On-Time",
             "load": "85%", "loadClass": "badge-warning"},
            {"number": "KA-01-F-7654", "conductor_id": 2, "conductor": "Suresh Reddy", "route": "201",
             "location": "Marathahalli Bridge", "status": "congestion", "statusText": "Congestion",
             "load": "92%", "loadClass": "badge-danger"}
        ],
        "conductors": [
            {"id": 1, "name": "Ramesh Kumar", "busNumber": "KA-01-F-4532", "route": "335E", "online": true, "unread": 2},
            {"id": 2, "name": "Suresh Reddy", "busNumber": "KA-01-F-7654", "route": "201", "online": false, "unread": 0}
        ]
    }"#;

    /// Classifies every route as the same class
    struct FixedModel(DemandClass);

    #[async_trait]
    impl DemandClassifier for FixedModel {
        fn name(&self) -> &str {
            "FixedModel"
        }

        async fn classify(&self, _features: &DemandFeatures) -> Verdict {
            Verdict::Classified(self.0)
        }
    }

    fn test_app(class: DemandClass) -> Router {
        let stats: StatsSnapshot = parse_json(STATS, STATS_FILE).unwrap();
        let fleet: FleetSnapshot = parse_json(FLEET, FLEET_FILE).unwrap();
        let users = vec![User {
            username: "coordinator".to_string(),
            password: "coord123".to_string(),
            role: Role::Coordinator,
        }];
        let index = FleetIndex::from_snapshots(users, stats, fleet);
        create_router(AppState::new(Arc::new(index), Arc::new(FixedModel(class))))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app(DemandClass::Medium).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_login_success() {
        let body = serde_json::json!({"username": "coordinator", "password": "coord123", "role": "coordinator"});
        let response = test_app(DemandClass::Medium)
            .oneshot(post_json("/api/auth/login", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["token"], "mock_token_coordinator");
        assert_eq!(json["userRole"], "coordinator");
        assert_eq!(json["username"], "coordinator");
    }

    #[tokio::test]
    async fn test_login_rejects_role_mismatch() {
        for role in ["conductor", "admin"] {
            let body = serde_json::json!({"username": "coordinator", "password": "coord123", "role": role});
            let response = test_app(DemandClass::Medium)
                .oneshot(post_json("/api/auth/login", body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(json_body(response).await["detail"], "Invalid credentials or role mismatch");
        }
    }

    #[tokio::test]
    async fn test_dashboard_stats_recomputes_pending() {
        let response = test_app(DemandClass::Medium)
            .oneshot(get("/api/dashboard/stats"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["dashboard_stats"]["totalBuses"], 24);
        // Two seeded unread reports, not the 99 from the snapshot
        assert_eq!(json["dashboard_stats"]["pendingMessages"], 2);
        assert_eq!(json["alerts"][0]["type"], "danger");
        assert_eq!(json["routes"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_buses_filtering() {
        let app = test_app(DemandClass::Medium);

        let all = json_body(app.clone().oneshot(get("/api/buses")).await.unwrap()).await;
        assert_eq!(all.as_array().unwrap().len(), 2);

        let blank = json_body(app.clone().oneshot(get("/api/buses?route=&status=")).await.unwrap()).await;
        assert_eq!(blank.as_array().unwrap().len(), 2);

        let by_route = json_body(app.clone().oneshot(get("/api/buses?route=201&status=all")).await.unwrap()).await;
        assert_eq!(by_route.as_array().unwrap().len(), 1);
        assert_eq!(by_route[0]["number"], "KA-01-F-7654");

        let by_status = json_body(app.clone().oneshot(get("/api/buses?status=ontime")).await.unwrap()).await;
        assert_eq!(by_status[0]["route"], "335E");

        let none = json_body(app.oneshot(get("/api/buses?status=parked")).await.unwrap()).await;
        assert!(none.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recommendations() {
        let response = test_app(DemandClass::High)
            .oneshot(get("/api/ai/recommendations"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let recs = json.as_array().unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0]["route"], "Kempegowda BS → Electronic City (335E)");
        assert_eq!(recs[0]["currentBuses"], 6);
        assert_eq!(recs[0]["recommendedBuses"], 8);
        assert_eq!(recs[0]["change"], "+2");
        assert_eq!(recs[0]["priorityClass"], "badge-danger");
    }

    #[tokio::test]
    async fn test_recommendations_clamp_to_one_bus() {
        let json = json_body(
            test_app(DemandClass::Low)
                .oneshot(get("/api/ai/recommendations"))
                .await
                .unwrap(),
        )
        .await;

        assert_eq!(json[1]["route"], "Shanthinagar → Marathahalli (201)");
        assert_eq!(json[1]["recommendedBuses"], 1);
        assert_eq!(json[1]["change"], "-1");
    }

    #[tokio::test]
    async fn test_apply_recommendation() {
        let response = test_app(DemandClass::High)
            .oneshot(post_json("/api/ai/apply/335E", Value::Null))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Recommendation for Route 335E applied: +2 buses reallocated.");
    }

    #[tokio::test]
    async fn test_apply_unknown_route() {
        let response = test_app(DemandClass::High)
            .oneshot(post_json("/api/ai/apply/999", Value::Null))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["detail"], "Recommendation not found");
    }

    #[tokio::test]
    async fn test_conductors() {
        let json = json_body(
            test_app(DemandClass::Medium)
                .oneshot(get("/api/communication/conductors"))
                .await
                .unwrap(),
        )
        .await;

        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["busNumber"], "KA-01-F-4532");
    }

    #[tokio::test]
    async fn test_send_message_then_list() {
        let app = test_app(DemandClass::Medium);
        let body = serde_json::json!({
            "from": "coordinator",
            "to": "conductor",
            "busNumber": "KA-01-F-7654",
            "message": "Divert via Outer Ring Road",
            "timestamp": "2025-12-02T11:00:00Z"
        });

        let response = app.clone().oneshot(post_json("/api/messages", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let sent = json_body(response).await;
        assert_eq!(sent["status"], "Message Sent");
        let id = sent["id"].as_str().unwrap().to_string();

        let list = json_body(app.oneshot(get("/api/communication/messages")).await.unwrap()).await;
        assert_eq!(list.as_array().unwrap().len(), 3);
        assert_eq!(list[0]["id"], id);
        assert_eq!(list[0]["read"], false);
        assert_eq!(list[1]["id"], "1");
    }

    #[tokio::test]
    async fn test_send_empty_message_rejected() {
        let body = serde_json::json!({"from": "conductor", "to": "coordinator", "message": "  "});
        let response = test_app(DemandClass::Medium)
            .oneshot(post_json("/api/messages", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_broadcast() {
        let body = serde_json::json!({"message": "All buses avoid Hebbal flyover"});
        let response = test_app(DemandClass::Medium)
            .oneshot(post_json("/api/broadcast", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_body(response).await;
        assert_eq!(json["status"], "Broadcast successful");
        assert_eq!(json["message"], "Message queued for delivery to all active conductors.");
    }
}
