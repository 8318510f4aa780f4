use chrono::NaiveTime;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Row, Table};

use crate::output::{format_number, hour_label};
use crate::staffing::whatif::{TatSweepPoint, WhatIfResult};
use crate::staffing::StaffingPlan;

const CHART_WIDTH: usize = 30;

pub fn render_plan_table(
    plan: &StaffingPlan,
    shift_start: Option<NaiveTime>,
    chart: bool,
) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec!["Hour", "Volume", "AHT", "Workload (mins)", "FTE Required"];
    if chart {
        header.push("");
    }
    table.set_header(header);

    for hour in &plan.hours {
        let fte_cell = if hour.fte_required >= plan.peak_hourly_fte && plan.peak_hourly_fte > 0.0 {
            Cell::new(format!("{:.2}", hour.fte_required)).fg(Color::Yellow)
        } else {
            Cell::new(format!("{:.2}", hour.fte_required))
        };
        let mut row = Row::from(vec![
            Cell::new(hour_label(hour.hour_index, shift_start)),
            Cell::new(hour.volume).set_alignment(CellAlignment::Right),
            Cell::new(format_number(hour.aht)).set_alignment(CellAlignment::Right),
            Cell::new(format_number(hour.workload_minutes)).set_alignment(CellAlignment::Right),
            fte_cell.set_alignment(CellAlignment::Right),
        ]);
        if chart {
            row.add_cell(Cell::new(bar(hour.fte_required, plan.peak_hourly_fte)));
        }
        table.add_row(row);
    }

    let mut out = table.to_string();
    out.push_str(&format!(
        "\nPeak hourly FTE: {:.2}\nSpillover FTE: {:.2}\nTotal FTE: {:.2}",
        plan.peak_hourly_fte, plan.spillover_fte, plan.total_fte
    ));
    out
}

pub fn render_whatif_table(result: &WhatIfResult, shift_start: Option<NaiveTime>) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Hour", "Before", "After", "Change"]);

    for ((before, after), delta) in result
        .before
        .hours
        .iter()
        .zip(result.after.hours.iter())
        .zip(result.hourly_fte_delta.iter())
    {
        table.add_row(vec![
            Cell::new(hour_label(before.hour_index, shift_start)),
            Cell::new(format!("{:.2}", before.fte_required)),
            Cell::new(format!("{:.2}", after.fte_required)),
            delta_cell(*delta),
        ]);
    }

    let changes = result
        .changes_applied
        .iter()
        .map(|c| {
            format!(
                "{} {} -> {}",
                c.field,
                format_number(c.from),
                format_number(c.to)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut footer = String::new();
    footer.push_str(&table.to_string());
    footer.push_str(&format!(
        "\nChanges: {changes}\nPeak hourly FTE: {:.2} -> {:.2} ({:+.2})\nTotal FTE: {:.2} -> {:.2} ({:+.2})",
        result.before.peak_hourly_fte,
        result.after.peak_hourly_fte,
        result.peak_delta,
        result.before.total_fte,
        result.after.total_fte,
        result.total_delta
    ));
    footer
}

pub fn render_sweep_table(points: &[TatSweepPoint]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "TAT Target (mins)",
        "Window (h)",
        "Peak Hourly FTE",
        "Total FTE",
    ]);
    for point in points {
        table.add_row(vec![
            point.tat_target_minutes.to_string(),
            point.tat_window_hours.to_string(),
            format!("{:.2}", point.peak_hourly_fte),
            format!("{:.2}", point.total_fte),
        ]);
    }
    table.to_string()
}

fn delta_cell(delta: f64) -> Cell {
    let text = format!("{delta:+.2}");
    if delta > 0.005 {
        Cell::new(text).fg(Color::Red)
    } else if delta < -0.005 {
        Cell::new(text).fg(Color::Green)
    } else {
        Cell::new(text)
    }
}

fn bar(value: f64, peak: f64) -> String {
    if peak <= 0.0 {
        return String::new();
    }
    let len = ((value / peak) * CHART_WIDTH as f64).round() as usize;
    "█".repeat(len.min(CHART_WIDTH))
}
