use crate::staffing::validate::{validate_parameters, validate_workload};
use crate::staffing::{HourlyStaffing, PlanError, StaffingParameters, StaffingPlan, WorkloadInput};

pub fn productive_per_hour(params: &StaffingParameters) -> f64 {
    params.productive_minutes_per_fte / (params.staffed_minutes_per_fte / 60.0)
}

/// Hours of trailing workload a TAT target lets each hour absorb. Never below one.
pub fn tat_window_hours(tat_target_minutes: u32) -> usize {
    ((tat_target_minutes / 60) as usize).max(1)
}

pub fn hourly_workloads(volumes: &[i64], aht_minutes: f64) -> Vec<f64> {
    volumes.iter().map(|v| *v as f64 * aht_minutes).collect()
}

/// Rounds to two decimals by the exact binary value, ties to even.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let lo = (value * 100.0).floor();
    // 200 * value == doubled + err exactly
    let doubled = 200.0 * value;
    let err = 200.0_f64.mul_add(value, -doubled);
    let midpoint = 2.0 * lo + 1.0;
    let diff = doubled - midpoint;
    let side = if diff != 0.0 { diff } else { err };
    let cents = if side < 0.0 {
        lo
    } else if side > 0.0 {
        lo + 1.0
    } else if (lo / 2.0).fract() == 0.0 {
        lo
    } else {
        lo + 1.0
    };
    cents / 100.0
}

/// Trailing moving average of workload per hour, converted to FTE.
///
/// The window shrinks at the start of the horizon: hour `i` averages
/// `workloads[max(0, i - window + 1)..=i]` over the hours actually present.
pub fn rolling_fte(workloads: &[f64], window: usize, productive_per_hour: f64) -> Vec<f64> {
    let window = window.max(1);
    (0..workloads.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let window_load: f64 = workloads[start..=i].iter().sum();
            let avg_load = window_load / (i - start + 1) as f64;
            round2(avg_load / productive_per_hour)
        })
        .collect()
}

pub fn compute_plan(
    params: &StaffingParameters,
    input: &WorkloadInput,
) -> Result<StaffingPlan, PlanError> {
    validate_parameters(params)?;
    validate_workload(input)?;

    let per_hour = productive_per_hour(params);
    if !per_hour.is_finite() || per_hour <= 0.0 {
        return Err(PlanError::invalid(
            "productive_per_hour",
            format!("must be a positive number, got {per_hour}"),
        ));
    }

    let aht = input.average_handling_time_minutes;
    let window = tat_window_hours(input.tat_target_minutes);
    let workloads = hourly_workloads(&input.hourly_volume, aht);
    let fte = rolling_fte(&workloads, window, per_hour);

    let hours = input
        .hourly_volume
        .iter()
        .zip(workloads.iter().zip(fte.iter()))
        .enumerate()
        .map(|(hour_index, (volume, (workload, fte)))| HourlyStaffing {
            hour_index,
            volume: *volume,
            aht,
            workload_minutes: *workload,
            fte_required: *fte,
        })
        .collect::<Vec<_>>();

    let total_workload_minutes = workloads.iter().sum::<f64>();
    let spillover_workload_minutes = input.spillover_volume as f64 * aht;
    let spillover_fte = spillover_workload_minutes / params.productive_minutes_per_fte;
    let total_fte =
        (total_workload_minutes + spillover_workload_minutes) / params.productive_minutes_per_fte;
    let peak_hourly_fte = fte.iter().copied().fold(0.0_f64, f64::max);

    Ok(StaffingPlan {
        hours,
        tat_window_hours: window,
        tat_compliance_percent: input.tat_compliance_percent,
        productive_per_hour: per_hour,
        total_workload_minutes,
        spillover_workload_minutes,
        spillover_fte,
        total_fte,
        peak_hourly_fte,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> StaffingParameters {
        StaffingParameters::default()
    }

    fn input(volumes: Vec<i64>, tat: u32) -> WorkloadInput {
        WorkloadInput::new(volumes, 5.0, tat, 95)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn derives_window_and_productive_rate() {
        assert_eq!(tat_window_hours(15), 1);
        assert_eq!(tat_window_hours(59), 1);
        assert_eq!(tat_window_hours(60), 1);
        assert_eq!(tat_window_hours(150), 2);
        assert_eq!(tat_window_hours(480), 8);
        assert!(approx(productive_per_hour(&params()), 408.0 / 9.0));
    }

    #[test]
    fn one_hour_window_matches_raw_hourly_load() {
        let plan = compute_plan(&params(), &input(vec![10, 20, 30], 60)).expect("plan failed");
        let workloads = plan
            .hours
            .iter()
            .map(|h| h.workload_minutes)
            .collect::<Vec<_>>();
        assert_eq!(workloads, vec![50.0, 100.0, 150.0]);
        assert_eq!(plan.fte_series(), vec![1.10, 2.21, 3.31]);
        assert!(approx(plan.total_fte, 300.0 / 408.0));
        assert_eq!(round2(plan.total_fte), 0.74);
        assert_eq!(plan.peak_hourly_fte, 3.31);
    }

    #[test]
    fn two_hour_window_smooths_with_ragged_start() {
        let plan = compute_plan(&params(), &input(vec![10, 20, 30], 150)).expect("plan failed");
        assert_eq!(plan.tat_window_hours, 2);
        assert_eq!(plan.fte_series(), vec![1.10, 1.65, 2.76]);
        assert_eq!(round2(plan.total_fte), 0.74);
        assert_eq!(plan.peak_hourly_fte, 2.76);
    }

    #[test]
    fn spillover_adds_to_total_only() {
        let base = compute_plan(&params(), &input(vec![10, 20, 30], 60)).expect("plan failed");
        let plan = compute_plan(&params(), &input(vec![10, 20, 30], 60).with_spillover(40))
            .expect("plan failed");
        assert!(approx(plan.spillover_workload_minutes, 200.0));
        assert_eq!(round2(plan.spillover_fte), 0.49);
        assert_eq!(round2(plan.total_fte), 1.23);
        assert_eq!(plan.fte_series(), base.fte_series());
    }

    #[test]
    fn short_tat_means_no_smoothing() {
        let volumes = vec![7, 0, 42, 13, 99, 3];
        let plan = compute_plan(&params(), &input(volumes, 45)).expect("plan failed");
        let rate = productive_per_hour(&params());
        for hour in &plan.hours {
            assert_eq!(hour.fte_required, round2(hour.workload_minutes / rate));
        }
    }

    #[test]
    fn steady_state_once_window_is_full() {
        let plan = compute_plan(&params(), &input(vec![25; 12], 240)).expect("plan failed");
        let series = plan.fte_series();
        let steady = series[3];
        assert!(series[3..].iter().all(|f| *f == steady));
        assert!(series[..3].iter().all(|f| *f == steady));
    }

    #[test]
    fn total_is_independent_of_window() {
        let volumes = vec![40, 10, 80, 5, 60, 0, 35, 90, 20];
        let totals = [30, 60, 120, 180, 300, 480]
            .iter()
            .map(|tat| {
                compute_plan(&params(), &input(volumes.clone(), *tat))
                    .expect("plan failed")
                    .total_fte
            })
            .collect::<Vec<_>>();
        assert!(totals.iter().all(|t| *t == totals[0]));
    }

    #[test]
    fn single_hour_horizon() {
        let plan = compute_plan(&params(), &input(vec![30], 60)).expect("plan failed");
        assert_eq!(plan.hours.len(), 1);
        let rate = productive_per_hour(&params());
        assert_eq!(plan.hours[0].fte_required, round2(150.0 / rate));
    }

    #[test]
    fn window_wider_than_horizon_is_not_clamped() {
        let plan = compute_plan(&params(), &input(vec![10, 20], 480)).expect("plan failed");
        assert_eq!(plan.tat_window_hours, 8);
        let rate = productive_per_hour(&params());
        assert_eq!(plan.hours[0].fte_required, round2(50.0 / rate));
        assert_eq!(plan.hours[1].fte_required, round2(75.0 / rate));
    }

    #[test]
    fn single_hour_ignores_tat_window() {
        let rate = productive_per_hour(&params());
        for tat in [30, 120, 300, 480] {
            let plan = compute_plan(&params(), &input(vec![30], tat)).expect("plan failed");
            assert_eq!(plan.hours[0].fte_required, round2(150.0 / rate));
        }
    }

    #[test]
    fn demo_ramp_with_two_hour_window() {
        let volumes = (1..=9).map(|h| 20 * h).collect::<Vec<i64>>();
        let plan = compute_plan(&params(), &input(volumes, 120)).expect("plan failed");
        assert_eq!(plan.tat_window_hours, 2);
        assert_eq!(plan.hours[0].fte_required, 2.21);
        assert_eq!(plan.hours[1].fte_required, 3.31);
        assert_eq!(plan.hours[2].fte_required, 5.51);
        assert_eq!(round2(plan.total_fte), 11.03);
    }

    #[test]
    fn exact_ties_round_to_even() {
        let plan = compute_plan(&params(), &WorkloadInput::new(vec![17], 3.0, 60, 95))
            .expect("plan failed");
        assert_eq!(plan.hours[0].fte_required, 1.12);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(1.125), 1.12);
        assert_eq!(round2(0.615), 0.61);
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(1.1029), 1.10);
        assert_eq!(round2(3.0), 3.0);
    }

    #[test]
    fn every_hour_present_and_non_negative() {
        let volumes = (0..24).map(|h| (h * 7 % 11) as i64).collect::<Vec<_>>();
        let plan = compute_plan(&params(), &input(volumes, 200)).expect("plan failed");
        assert_eq!(plan.hours.len(), 24);
        assert!(plan.hours.iter().all(|h| h.fte_required >= 0.0));
        assert!(plan.hours.iter().enumerate().all(|(i, h)| h.hour_index == i));
    }

    #[test]
    fn identical_inputs_give_identical_plans() {
        let workload = input(vec![12, 48, 33, 71], 120).with_spillover(9);
        let a = compute_plan(&params(), &workload).expect("plan failed");
        let b = compute_plan(&params(), &workload).expect("plan failed");
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_input_yields_no_plan() {
        let bad = StaffingParameters {
            staffed_minutes_per_fte: 540.0,
            productive_minutes_per_fte: 0.0,
        };
        assert!(compute_plan(&bad, &input(vec![10], 60)).is_err());
        assert!(compute_plan(&params(), &input(vec![10, -1], 60)).is_err());
    }
}
