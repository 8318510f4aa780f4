use anyhow::Result;

use crate::output::format_number;
use crate::staffing::whatif::TatSweepPoint;
use crate::staffing::StaffingPlan;

pub const PLAN_HEADER: [&str; 5] = ["Hour", "Volume", "AHT", "Workload (mins)", "FTE Required"];

pub fn plan_to_csv(plan: &StaffingPlan) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(PLAN_HEADER)?;
    for hour in &plan.hours {
        writer.write_record([
            (hour.hour_index + 1).to_string(),
            hour.volume.to_string(),
            format_number(hour.aht),
            format_number(hour.workload_minutes),
            format!("{:.2}", hour.fte_required),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn sweep_to_csv(points: &[TatSweepPoint]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "tat_target_minutes",
        "tat_window_hours",
        "peak_hourly_fte",
        "total_fte",
    ])?;
    for point in points {
        writer.write_record([
            point.tat_target_minutes.to_string(),
            point.tat_window_hours.to_string(),
            format!("{:.2}", point.peak_hourly_fte),
            format!("{:.2}", point.total_fte),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
