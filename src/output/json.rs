use anyhow::Result;
use serde::Serialize;

use crate::staffing::summary::summarize_plan;
use crate::staffing::{StaffingParameters, StaffingPlan, WorkloadInput};

/// Plan export that carries the input snapshot it was computed from.
#[derive(Debug, Serialize)]
pub struct PlanDocument<'a> {
    pub input: &'a WorkloadInput,
    pub parameters: &'a StaffingParameters,
    pub plan: &'a StaffingPlan,
    pub summary: String,
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn render_plan_json(
    input: &WorkloadInput,
    parameters: &StaffingParameters,
    plan: &StaffingPlan,
) -> Result<String> {
    render_json(&PlanDocument {
        input,
        parameters,
        plan,
        summary: summarize_plan(plan),
    })
}
