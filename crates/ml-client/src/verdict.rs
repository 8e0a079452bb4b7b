//! Classifier inputs and outputs.
//!
//! The model speaks in integer classes; everything past this module works
//! with [`DemandClass`] so an out-of-range class cannot travel further.

use tracing::warn;

/// Demand level predicted for a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemandClass {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl DemandClass {
    /// All classes, in index order
    pub const ALL: [DemandClass; 3] = [DemandClass::Low, DemandClass::Medium, DemandClass::High];

    /// Map a model class index to a demand level
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(DemandClass::Low),
            1 => Some(DemandClass::Medium),
            2 => Some(DemandClass::High),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Outcome of asking the oracle about one route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Classified(DemandClass),
    /// The oracle is not loaded or the call failed
    Unavailable,
}

impl Verdict {
    /// Build a verdict from a raw model label, coercing anything that is not
    /// one of the three class integers to [`DemandClass::Medium`].
    pub fn from_label(label: &str) -> Self {
        Verdict::Classified(coerce_label(label))
    }
}

/// Coerce a raw label to a class.
///
/// Accepts integer text ("2") and integral float text ("2.0"), which is how
/// numpy-backed models tend to print their predictions.
pub fn coerce_label(label: &str) -> DemandClass {
    let trimmed = label.trim();
    let index = trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    });

    match index.and_then(DemandClass::from_index) {
        Some(class) => class,
        None => {
            warn!("Unrecognised classifier label {:?}, treating as MEDIUM", label);
            DemandClass::Medium
        }
    }
}

/// The five-field feature vector the demand model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemandFeatures {
    pub trips: u32,
    pub stop_events: u32,
    pub shift_morning: bool,
    pub shift_afternoon: bool,
    pub shift_other: bool,
}
