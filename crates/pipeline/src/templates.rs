//! Static demand-class to action table.

use ml_client::DemandClass;

/// How a demand class is presented and what fleet change it suggests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationTemplate {
    pub priority: &'static str,
    pub priority_class: &'static str,
    /// Signed change in bus count
    pub delta: i32,
    pub change_class: &'static str,
    pub reason: &'static str,
    pub impact: &'static str,
}

/// Indexed by `DemandClass::index()`
pub const TEMPLATES: [RecommendationTemplate; 3] = [
    RecommendationTemplate {
        priority: "LOW",
        priority_class: "badge-info",
        delta: -1,
        change_class: "badge-danger",
        reason: "Low passenger demand, under-utilised capacity",
        impact: "Save fuel costs, optimize resources",
    },
    RecommendationTemplate {
        priority: "MEDIUM",
        priority_class: "badge-warning",
        delta: 0,
        change_class: "badge-info",
        reason: "Optimal allocation, balanced load",
        impact: "Maintain current efficiency",
    },
    RecommendationTemplate {
        priority: "HIGH",
        priority_class: "badge-danger",
        delta: 2,
        change_class: "badge-success",
        reason: "High passenger footfall, sustained overcrowding",
        impact: "Reduce wait time by 8 mins",
    },
];

pub fn template_for(class: DemandClass) -> &'static RecommendationTemplate {
    &TEMPLATES[class.index()]
}

/// Render a bus-count change the way the dashboard shows it: "+2", "0", "-1"
pub fn format_delta(delta: i32) -> String {
    if delta > 0 {
        format!("+{delta}")
    } else {
        delta.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order() {
        assert_eq!(template_for(DemandClass::Low).priority, "LOW");
        assert_eq!(template_for(DemandClass::Medium).priority, "MEDIUM");
        assert_eq!(template_for(DemandClass::High).priority, "HIGH");
    }

    #[test]
    fn test_deltas() {
        assert_eq!(template_for(DemandClass::Low).delta, -1);
        assert_eq!(template_for(DemandClass::Medium).delta, 0);
        assert_eq!(template_for(DemandClass::High).delta, 2);
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(2), "+2");
        assert_eq!(format_delta(0), "0");
        assert_eq!(format_delta(-1), "-1");
    }
}
