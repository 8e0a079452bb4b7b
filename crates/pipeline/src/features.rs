//! Feature building for demand classification.
//!
//! Each route is described to the model by its two base counters plus a
//! one-hot time-of-day shift taken from the wall clock.

use chrono::{Local, Timelike};
use data_loader::RouteSummary;
use ml_client::DemandFeatures;

/// Time-of-day bucket the model was trained with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeShift {
    /// 06:00 - 11:59
    Morning,
    /// 12:00 - 16:59
    Afternoon,
    /// Everything else
    Other,
}

impl TimeShift {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeShift::Morning,
            12..=16 => TimeShift::Afternoon,
            _ => TimeShift::Other,
        }
    }

    /// Shift for the current local hour. Read fresh on every call.
    pub fn now() -> Self {
        Self::from_hour(Local::now().hour())
    }

    /// (morning, afternoon, other); exactly one is true
    pub fn flags(self) -> (bool, bool, bool) {
        (
            self == TimeShift::Morning,
            self == TimeShift::Afternoon,
            self == TimeShift::Other,
        )
    }
}

/// Build the model input for one route
pub fn build_features(route: &RouteSummary, shift: TimeShift) -> DemandFeatures {
    let (shift_morning, shift_afternoon, shift_other) = shift.flags();
    DemandFeatures {
        trips: route.trips_or_default(),
        stop_events: route.stops_or_default(),
        shift_morning,
        shift_afternoon,
        shift_other,
    }
}
