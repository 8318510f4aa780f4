pub mod calculator;
pub mod summary;
pub mod validate;
pub mod whatif;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_STAFFED_MINUTES: f64 = 540.0;
pub const DEFAULT_PRODUCTIVE_MINUTES: f64 = 408.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StaffingParameters {
    pub staffed_minutes_per_fte: f64,
    pub productive_minutes_per_fte: f64,
}

impl Default for StaffingParameters {
    fn default() -> Self {
        Self {
            staffed_minutes_per_fte: DEFAULT_STAFFED_MINUTES,
            productive_minutes_per_fte: DEFAULT_PRODUCTIVE_MINUTES,
        }
    }
}

/// One planning snapshot. A single AHT applies to every hour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkloadInput {
    pub hour_count: usize,
    pub average_handling_time_minutes: f64,
    pub hourly_volume: Vec<i64>,
    pub tat_target_minutes: u32,
    pub tat_compliance_percent: u32,
    #[serde(default)]
    pub spillover_volume: i64,
}

impl WorkloadInput {
    pub fn new(
        hourly_volume: Vec<i64>,
        average_handling_time_minutes: f64,
        tat_target_minutes: u32,
        tat_compliance_percent: u32,
    ) -> Self {
        Self {
            hour_count: hourly_volume.len(),
            average_handling_time_minutes,
            hourly_volume,
            tat_target_minutes,
            tat_compliance_percent,
            spillover_volume: 0,
        }
    }

    pub fn with_spillover(mut self, spillover_volume: i64) -> Self {
        self.spillover_volume = spillover_volume;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourlyStaffing {
    pub hour_index: usize,
    pub volume: i64,
    pub aht: f64,
    pub workload_minutes: f64,
    pub fte_required: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffingPlan {
    pub hours: Vec<HourlyStaffing>,
    pub tat_window_hours: usize,
    pub tat_compliance_percent: u32,
    pub productive_per_hour: f64,
    pub total_workload_minutes: f64,
    pub spillover_workload_minutes: f64,
    pub spillover_fte: f64,
    pub total_fte: f64,
    pub peak_hourly_fte: f64,
}

impl StaffingPlan {
    pub fn fte_series(&self) -> Vec<f64> {
        self.hours.iter().map(|h| h.fte_required).collect()
    }

    /// First hour reaching the peak FTE figure.
    pub fn peak_hour(&self) -> Option<&HourlyStaffing> {
        self.hours
            .iter()
            .find(|h| h.fte_required >= self.peak_hourly_fte)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlanError {
    #[error("invalid input: {field} {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl PlanError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
