//! The FilterPipeline chains bus filters using the builder pattern.

use crate::filters::{RouteFilter, StatusFilter};
use crate::traits::BusFilter;
use data_loader::Bus;
use tracing;

/// Value the dashboard sends for "no filter"
pub const MATCH_ALL: &str = "all";

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(RouteFilter::new("335E"))
///     .add_filter(StatusFilter::new("delay"));
///
/// let buses = pipeline.apply(index.buses().to_vec());
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn BusFilter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Build the pipeline for the tracking page's query parameters.
    ///
    /// A missing or empty parameter, or the value `"all"`, adds no filter.
    pub fn from_query(route: Option<&str>, status: Option<&str>) -> Self {
        let active = |v: Option<&str>| v.filter(|v| !v.is_empty() && *v != MATCH_ALL).map(str::to_string);

        let mut pipeline = Self::new();
        if let Some(route) = active(route) {
            pipeline = pipeline.add_filter(RouteFilter::new(route));
        }
        if let Some(status) = active(status) {
            pipeline = pipeline.add_filter(StatusFilter::new(status));
        }
        pipeline
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl BusFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence.
    pub fn apply(&self, buses: Vec<Bus>) -> Vec<Bus> {
        let mut current = buses;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current);
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        current
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::test_support::bus;
    use data_loader::BusStatus;

    fn fleet() -> Vec<Bus> {
        vec![
            bus("KA-01-F-4532", "335E", BusStatus::OnTime),
            bus("KA-01-F-8934", "G4", BusStatus::Delay),
            bus("KA-01-F-6789", "335E", BusStatus::Delay),
            bus("KA-01-F-1234", "G4", BusStatus::Congestion),
        ]
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        assert_eq!(pipeline.apply(fleet()).len(), 4);
    }

    #[test]
    fn test_from_query_all_is_no_op() {
        let pipeline = FilterPipeline::from_query(Some("all"), Some("all"));
        assert!(pipeline.is_empty());

        let pipeline = FilterPipeline::from_query(None, None);
        assert!(pipeline.is_empty());

        let pipeline = FilterPipeline::from_query(Some(""), Some(""));
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.apply(fleet()).len(), fleet().len());
    }

    #[test]
    fn test_from_query_route_and_status() {
        let pipeline = FilterPipeline::from_query(Some("335E"), Some("delay"));
        assert_eq!(pipeline.len(), 2);

        let buses = pipeline.apply(fleet());
        assert_eq!(buses.len(), 1);
        assert_eq!(buses[0].number, "KA-01-F-6789");
    }

    #[test]
    fn test_from_query_preserves_order() {
        let buses = FilterPipeline::from_query(Some("all"), Some("delay")).apply(fleet());
        let numbers: Vec<_> = buses.iter().map(|b| b.number.as_str()).collect();
        assert_eq!(numbers, vec!["KA-01-F-8934", "KA-01-F-6789"]);
    }

    #[test]
    fn test_unknown_values_match_nothing() {
        assert!(FilterPipeline::from_query(Some("999"), None).apply(fleet()).is_empty());
        assert!(FilterPipeline::from_query(None, Some("parked")).apply(fleet()).is_empty());
    }
}
