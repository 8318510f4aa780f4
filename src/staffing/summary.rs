use crate::staffing::StaffingPlan;

pub fn summarize_plan(plan: &StaffingPlan) -> String {
    let Some(peak) = plan.peak_hour() else {
        return "No hours in plan.".to_string();
    };

    let mut out = format!(
        "Peak hourly staffing: {:.2} FTE in hour {} (TAT window {}h, {}% compliance target).\n",
        plan.peak_hourly_fte,
        peak.hour_index + 1,
        plan.tat_window_hours,
        plan.tat_compliance_percent
    );
    out.push_str(&format!(
        "Total FTE for the horizon: {:.2} ({:.0} workload minutes",
        plan.total_fte, plan.total_workload_minutes
    ));
    if plan.spillover_workload_minutes > 0.0 {
        out.push_str(&format!(
            " + {:.0} spillover minutes = {:.2} FTE",
            plan.spillover_workload_minutes, plan.spillover_fte
        ));
    }
    out.push_str(").\n");
    out.push_str(
        "Peak covers the busiest smoothed hour; total sizes headcount for all work in the horizon.",
    );
    out
}
