//! # Recommendation Generator
//!
//! Turns per-route counters plus a classifier verdict into reallocation
//! suggestions:
//! 1. Take the time shift from the wall clock
//! 2. Build each route's feature vector
//! 3. Ask the classifier (random class if it is unavailable)
//! 4. Look up the class template
//! 5. Apply the delta, clamping the fleet size at one bus
//!
//! Output order always matches route order. Nothing here mutates the fleet;
//! applying a recommendation only reports it.

use std::sync::Arc;

use data_loader::{FleetIndex, RouteSummary};
use futures::future::join_all;
use ml_client::{DemandClass, DemandClassifier, Verdict};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::features::{build_features, TimeShift};
use crate::templates::{format_delta, template_for};

/// Smallest fleet a route can be left with
pub const MIN_BUSES: u32 = 1;

/// Change string reported whenever the floor correction fires
const FLOOR_CHANGE: &str = "-1";

/// A reallocation suggestion for one route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub priority: String,
    pub priority_class: String,
    /// Display name followed by the route id in parentheses
    pub route: String,
    pub current_buses: u32,
    pub recommended_buses: u32,
    /// Signed bus-count change, e.g. "+2", "0", "-1"
    pub change: String,
    pub change_class: String,
    pub reason: String,
    pub impact: String,
}

impl Recommendation {
    /// Does this recommendation describe the route with the given id?
    pub fn is_for_route(&self, route_id: &str) -> bool {
        self.route.ends_with(&format!("({route_id})"))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommendationError {
    #[error("Recommendation not found for route {0}")]
    RouteNotFound(String),
}

/// Build the recommendation for one route from its resolved demand class.
///
/// Pure and deterministic; this is where the floor policy lives.
pub fn recommend(route: &RouteSummary, class: DemandClass) -> Recommendation {
    let template = template_for(class);
    let projected = i64::from(route.active_buses) + i64::from(template.delta);

    let (recommended_buses, change, change_class) = if projected < i64::from(MIN_BUSES) {
        // The floor always wins and is reported as a one-bus reduction
        (
            MIN_BUSES,
            FLOOR_CHANGE.to_string(),
            template_for(DemandClass::Low).change_class,
        )
    } else {
        (
            u32::try_from(projected).unwrap_or(u32::MAX),
            format_delta(template.delta),
            template.change_class,
        )
    };

    Recommendation {
        priority: template.priority.to_string(),
        priority_class: template.priority_class.to_string(),
        route: route.label(),
        current_buses: route.active_buses,
        recommended_buses,
        change,
        change_class: change_class.to_string(),
        reason: template.reason.to_string(),
        impact: template.impact.to_string(),
    }
}

/// Resolve a verdict to a class. Only the `Unavailable` branch is random.
pub fn resolve_verdict(verdict: Verdict) -> DemandClass {
    match verdict {
        Verdict::Classified(class) => class,
        Verdict::Unavailable => DemandClass::ALL[rand::random_range(0..DemandClass::ALL.len())],
    }
}

/// Outcome of one generation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRun {
    /// One per route, in route order
    pub recommendations: Vec<Recommendation>,
    /// Routes whose class was picked at random because the classifier was unavailable
    pub fallback_routes: usize,
}

/// Generates recommendations from the route snapshot and a classifier.
///
/// Holds only shared, read-only handles, so one generator can serve any
/// number of concurrent requests.
#[derive(Clone)]
pub struct RecommendationGenerator {
    fleet: Arc<FleetIndex>,
    classifier: Arc<dyn DemandClassifier>,
}

impl RecommendationGenerator {
    pub fn new(fleet: Arc<FleetIndex>, classifier: Arc<dyn DemandClassifier>) -> Self {
        Self { fleet, classifier }
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// One recommendation per route, in route order, for the current hour.
    pub async fn generate(&self) -> Vec<Recommendation> {
        self.generate_for_shift(TimeShift::now()).await
    }

    /// Same as [`generate`](Self::generate) with the hour pinned.
    pub async fn generate_at(&self, hour: u32) -> Vec<Recommendation> {
        self.generate_for_shift(TimeShift::from_hour(hour)).await
    }

    /// Generation pass with the hour pinned, reporting how many routes fell back.
    pub async fn run_at(&self, hour: u32) -> GenerationRun {
        self.run_for_shift(TimeShift::from_hour(hour)).await
    }

    async fn generate_for_shift(&self, shift: TimeShift) -> Vec<Recommendation> {
        self.run_for_shift(shift).await.recommendations
    }

    async fn run_for_shift(&self, shift: TimeShift) -> GenerationRun {
        let routes = self.fleet.routes();
        let results = join_all(
            routes
                .iter()
                .map(|route| self.recommend_route(route, shift)),
        )
        .await;

        let fallback_routes = results.iter().filter(|(_, fell_back)| *fell_back).count();
        let recommendations: Vec<Recommendation> = results.into_iter().map(|(rec, _)| rec).collect();

        if fallback_routes > 0 {
            warn!(
                "Classifier unavailable for {} of {} routes, using random fallback",
                fallback_routes,
                recommendations.len()
            );
        }
        info!(
            "Generated {} recommendations ({:?} shift, classifier: {})",
            recommendations.len(),
            shift,
            self.classifier.name()
        );

        GenerationRun {
            recommendations,
            fallback_routes,
        }
    }

    /// The route's recommendation and whether its class was a random fallback
    async fn recommend_route(&self, route: &RouteSummary, shift: TimeShift) -> (Recommendation, bool) {
        let features = build_features(route, shift);
        let verdict = self.classifier.classify(&features).await;
        let class = resolve_verdict(verdict);

        debug!(
            route = %route.id,
            trips = features.trips,
            stop_events = features.stop_events,
            shift_morning = features.shift_morning,
            shift_afternoon = features.shift_afternoon,
            shift_other = features.shift_other,
            ?verdict,
            ?class,
            "Classified route"
        );

        (recommend(route, class), verdict == Verdict::Unavailable)
    }

    /// Regenerate all recommendations and return the one for `route_id`.
    ///
    /// Nothing is written back to the fleet.
    pub async fn apply_by_route_id(&self, route_id: &str) -> Result<Recommendation, RecommendationError> {
        Self::select(self.generate().await, route_id)
    }

    /// [`apply_by_route_id`](Self::apply_by_route_id) with the hour pinned.
    pub async fn apply_by_route_id_at(
        &self,
        route_id: &str,
        hour: u32,
    ) -> Result<Recommendation, RecommendationError> {
        Self::select(self.generate_at(hour).await, route_id)
    }

    fn select(
        recommendations: Vec<Recommendation>,
        route_id: &str,
    ) -> Result<Recommendation, RecommendationError> {
        recommendations
            .into_iter()
            .find(|r| r.is_for_route(route_id))
            .ok_or_else(|| RecommendationError::RouteNotFound(route_id.to_string()))
    }
}
