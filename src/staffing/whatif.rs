use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::staffing::calculator::{compute_plan, tat_window_hours};
use crate::staffing::{PlanError, StaffingParameters, StaffingPlan, WorkloadInput};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WhatIfChange {
    AhtMinutes(f64),
    TatTargetMinutes(u32),
    SpilloverVolume(i64),
    ProductiveMinutes(f64),
    StaffedMinutes(f64),
}

impl WhatIfChange {
    pub fn key(&self) -> &'static str {
        match self {
            Self::AhtMinutes(_) => "aht",
            Self::TatTargetMinutes(_) => "tat",
            Self::SpilloverVolume(_) => "spillover",
            Self::ProductiveMinutes(_) => "productive",
            Self::StaffedMinutes(_) => "staffed",
        }
    }

    fn value(&self) -> f64 {
        match self {
            Self::AhtMinutes(v) | Self::ProductiveMinutes(v) | Self::StaffedMinutes(v) => *v,
            Self::TatTargetMinutes(v) => f64::from(*v),
            Self::SpilloverVolume(v) => *v as f64,
        }
    }

    fn current(&self, params: &StaffingParameters, input: &WorkloadInput) -> f64 {
        match self {
            Self::AhtMinutes(_) => input.average_handling_time_minutes,
            Self::TatTargetMinutes(_) => f64::from(input.tat_target_minutes),
            Self::SpilloverVolume(_) => input.spillover_volume as f64,
            Self::ProductiveMinutes(_) => params.productive_minutes_per_fte,
            Self::StaffedMinutes(_) => params.staffed_minutes_per_fte,
        }
    }

    fn apply(&self, params: &mut StaffingParameters, input: &mut WorkloadInput) {
        match *self {
            Self::AhtMinutes(v) => input.average_handling_time_minutes = v,
            Self::TatTargetMinutes(v) => input.tat_target_minutes = v,
            Self::SpilloverVolume(v) => input.spillover_volume = v,
            Self::ProductiveMinutes(v) => params.productive_minutes_per_fte = v,
            Self::StaffedMinutes(v) => params.staffed_minutes_per_fte = v,
        }
    }
}

impl Display for WhatIfChange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key(), self.value())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ChangeParseError {
    #[error("expected key=value, got {0:?}")]
    Malformed(String),
    #[error("unknown what-if field: {0}")]
    UnknownField(String),
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

impl FromStr for WhatIfChange {
    type Err = ChangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((raw_key, raw_value)) = s.split_once('=') else {
            return Err(ChangeParseError::Malformed(s.to_string()));
        };
        let key = raw_key.trim().to_ascii_lowercase().replace('-', "_");
        let value = raw_value.trim();
        let invalid = || ChangeParseError::InvalidValue {
            field: key.clone(),
            value: value.to_string(),
        };
        let change = match key.as_str() {
            "aht" | "aht_minutes" => Self::AhtMinutes(value.parse().map_err(|_| invalid())?),
            "tat" | "tat_target" | "tat_target_minutes" => {
                Self::TatTargetMinutes(value.parse().map_err(|_| invalid())?)
            }
            "spillover" | "spillover_volume" => {
                Self::SpilloverVolume(value.parse().map_err(|_| invalid())?)
            }
            "productive" | "productive_minutes" => {
                Self::ProductiveMinutes(value.parse().map_err(|_| invalid())?)
            }
            "staffed" | "staffed_minutes" => {
                Self::StaffedMinutes(value.parse().map_err(|_| invalid())?)
            }
            _ => return Err(ChangeParseError::UnknownField(raw_key.trim().to_string())),
        };
        Ok(change)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedChange {
    pub field: String,
    pub from: f64,
    pub to: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfResult {
    pub changes_applied: Vec<AppliedChange>,
    pub before: StaffingPlan,
    pub after: StaffingPlan,
    pub hourly_fte_delta: Vec<f64>,
    pub peak_delta: f64,
    pub total_delta: f64,
}

/// Recomputes the plan with `changes` applied in order. Later changes to the
/// same field win.
pub fn simulate_whatif(
    params: &StaffingParameters,
    input: &WorkloadInput,
    changes: &[WhatIfChange],
) -> Result<WhatIfResult, PlanError> {
    let before = compute_plan(params, input)?;

    let mut changed_params = *params;
    let mut changed_input = input.clone();
    let mut changes_applied = Vec::with_capacity(changes.len());
    for change in changes {
        let from = change.current(&changed_params, &changed_input);
        change.apply(&mut changed_params, &mut changed_input);
        changes_applied.push(AppliedChange {
            field: change.key().to_string(),
            from,
            to: change.value(),
        });
    }

    let after = compute_plan(&changed_params, &changed_input)?;
    let hourly_fte_delta = before
        .hours
        .iter()
        .zip(after.hours.iter())
        .map(|(b, a)| a.fte_required - b.fte_required)
        .collect();

    Ok(WhatIfResult {
        changes_applied,
        peak_delta: after.peak_hourly_fte - before.peak_hourly_fte,
        total_delta: after.total_fte - before.total_fte,
        hourly_fte_delta,
        before,
        after,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TatSweepPoint {
    pub tat_target_minutes: u32,
    pub tat_window_hours: usize,
    pub peak_hourly_fte: f64,
    pub total_fte: f64,
}

pub fn sweep_tat_targets(
    params: &StaffingParameters,
    input: &WorkloadInput,
    targets: &[u32],
) -> Result<Vec<TatSweepPoint>, PlanError> {
    if targets.is_empty() {
        return Err(PlanError::invalid(
            "tat_target_minutes",
            "at least one TAT target is required",
        ));
    }
    let mut out = Vec::with_capacity(targets.len());
    for target in targets {
        let mut scenario = input.clone();
        scenario.tat_target_minutes = *target;
        let plan = compute_plan(params, &scenario)?;
        out.push(TatSweepPoint {
            tat_target_minutes: *target,
            tat_window_hours: tat_window_hours(*target),
            peak_hourly_fte: plan.peak_hourly_fte,
            total_fte: plan.total_fte,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> WorkloadInput {
        WorkloadInput::new(vec![10, 20, 30], 5.0, 60, 95)
    }

    #[test]
    fn parses_change_strings() {
        assert_eq!(
            "tat=240".parse::<WhatIfChange>(),
            Ok(WhatIfChange::TatTargetMinutes(240))
        );
        assert_eq!(
            " AHT = 4.5 ".parse::<WhatIfChange>(),
            Ok(WhatIfChange::AhtMinutes(4.5))
        );
        assert_eq!(
            "spillover-volume=12".parse::<WhatIfChange>(),
            Ok(WhatIfChange::SpilloverVolume(12))
        );
        assert!(matches!(
            "tat".parse::<WhatIfChange>(),
            Err(ChangeParseError::Malformed(_))
        ));
        assert!(matches!(
            "shift=3".parse::<WhatIfChange>(),
            Err(ChangeParseError::UnknownField(_))
        ));
        assert!(matches!(
            "tat=two".parse::<WhatIfChange>(),
            Err(ChangeParseError::InvalidValue { .. })
        ));
    }

    #[test]
    fn widening_tat_lowers_peak_but_not_total() {
        let result = simulate_whatif(
            &StaffingParameters::default(),
            &base(),
            &[WhatIfChange::TatTargetMinutes(150)],
        )
        .expect("whatif failed");
        assert_eq!(result.before.fte_series(), vec![1.10, 2.21, 3.31]);
        assert_eq!(result.after.fte_series(), vec![1.10, 1.65, 2.76]);
        assert!(result.peak_delta < 0.0);
        assert!(result.total_delta.abs() < 1e-12);
        assert_eq!(result.changes_applied.len(), 1);
        assert_eq!(result.changes_applied[0].field, "tat");
        assert!((result.changes_applied[0].from - 60.0).abs() < 1e-9);
        assert_eq!(result.hourly_fte_delta.len(), 3);
        assert!(result.hourly_fte_delta[0].abs() < 1e-9);
    }

    #[test]
    fn spillover_change_moves_total_only() {
        let result = simulate_whatif(
            &StaffingParameters::default(),
            &base(),
            &[WhatIfChange::SpilloverVolume(40)],
        )
        .expect("whatif failed");
        assert!((result.total_delta - 200.0 / 408.0).abs() < 1e-9);
        assert!(result.peak_delta.abs() < 1e-12);
    }

    #[test]
    fn invalid_change_is_rejected() {
        let err = simulate_whatif(
            &StaffingParameters::default(),
            &base(),
            &[WhatIfChange::ProductiveMinutes(0.0)],
        )
        .expect_err("zero productive minutes accepted");
        assert!(matches!(err, PlanError::InvalidInput { .. }));
    }

    #[test]
    fn sweep_keeps_total_constant() {
        let points = sweep_tat_targets(&StaffingParameters::default(), &base(), &[60, 150, 240])
            .expect("sweep failed");
        assert_eq!(points.len(), 3);
        assert_eq!(points[1].tat_window_hours, 2);
        assert!(points.iter().all(|p| p.total_fte == points[0].total_fte));
        assert!(points[0].peak_hourly_fte >= points[2].peak_hourly_fte);
    }

    #[test]
    fn sweep_requires_targets() {
        assert!(sweep_tat_targets(&StaffingParameters::default(), &base(), &[]).is_err());
    }
}
