use std::ops::RangeInclusive;

use crate::staffing::{PlanError, StaffingParameters, WorkloadInput};

pub const HOUR_COUNT_RANGE: RangeInclusive<usize> = 1..=24;
pub const TAT_TARGET_RANGE: RangeInclusive<u32> = 15..=480;
pub const COMPLIANCE_RANGE: RangeInclusive<u32> = 50..=100;

pub fn validate_parameters(params: &StaffingParameters) -> Result<(), PlanError> {
    ensure_positive("staffed_minutes_per_fte", params.staffed_minutes_per_fte)?;
    ensure_positive(
        "productive_minutes_per_fte",
        params.productive_minutes_per_fte,
    )?;
    Ok(())
}

pub fn validate_workload(input: &WorkloadInput) -> Result<(), PlanError> {
    if !HOUR_COUNT_RANGE.contains(&input.hour_count) {
        return Err(PlanError::invalid(
            "hour_count",
            format!(
                "must be between {} and {}, got {}",
                HOUR_COUNT_RANGE.start(),
                HOUR_COUNT_RANGE.end(),
                input.hour_count
            ),
        ));
    }
    if input.hourly_volume.len() != input.hour_count {
        return Err(PlanError::invalid(
            "hourly_volume",
            format!(
                "has {} entries but hour_count is {}",
                input.hourly_volume.len(),
                input.hour_count
            ),
        ));
    }
    if let Some((idx, v)) = input
        .hourly_volume
        .iter()
        .enumerate()
        .find(|(_, v)| **v < 0)
    {
        return Err(PlanError::invalid(
            "hourly_volume",
            format!("hour {} is negative ({v})", idx + 1),
        ));
    }
    ensure_positive(
        "average_handling_time_minutes",
        input.average_handling_time_minutes,
    )?;
    if !TAT_TARGET_RANGE.contains(&input.tat_target_minutes) {
        return Err(PlanError::invalid(
            "tat_target_minutes",
            format!(
                "must be between {} and {}, got {}",
                TAT_TARGET_RANGE.start(),
                TAT_TARGET_RANGE.end(),
                input.tat_target_minutes
            ),
        ));
    }
    if !COMPLIANCE_RANGE.contains(&input.tat_compliance_percent) {
        return Err(PlanError::invalid(
            "tat_compliance_percent",
            format!(
                "must be between {} and {}, got {}",
                COMPLIANCE_RANGE.start(),
                COMPLIANCE_RANGE.end(),
                input.tat_compliance_percent
            ),
        ));
    }
    if input.spillover_volume < 0 {
        return Err(PlanError::invalid(
            "spillover_volume",
            format!("must not be negative, got {}", input.spillover_volume),
        ));
    }
    Ok(())
}

fn ensure_positive(field: &'static str, value: f64) -> Result<(), PlanError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PlanError::invalid(
            field,
            format!("must be a positive number, got {value}"),
        ));
    }
    Ok(())
}
