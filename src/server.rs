use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::Result;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::config::Config;
use crate::output::csv::plan_to_csv;
use crate::scenario::PartialWorkload;
use crate::staffing::calculator::compute_plan;
use crate::staffing::summary::summarize_plan;
use crate::staffing::whatif::{
    simulate_whatif, sweep_tat_targets, TatSweepPoint, WhatIfChange, WhatIfResult,
};
use crate::staffing::{PlanError, StaffingParameters, StaffingPlan, WorkloadInput};

#[derive(Clone)]
struct ApiState {
    config: Config,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl From<PlanError> for ApiError {
    fn from(error: PlanError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Clone, Default, Deserialize)]
struct ScenarioRequest {
    #[serde(default)]
    workload: PartialWorkload,
    parameters: Option<StaffingParameters>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WhatIfRequest {
    #[serde(flatten)]
    scenario: ScenarioRequest,
    #[serde(default)]
    changes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SweepRequest {
    #[serde(flatten)]
    scenario: ScenarioRequest,
    #[serde(default)]
    targets: Vec<u32>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct PlanResponse {
    computed_at: DateTime<Utc>,
    input: WorkloadInput,
    parameters: StaffingParameters,
    plan: StaffingPlan,
    summary: String,
}

#[derive(Debug, Serialize)]
struct SweepResponse {
    points: Vec<TatSweepPoint>,
}

pub fn router(config: Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/v1/config", get(show_config))
        .route("/v1/plan", post(plan))
        .route("/v1/plan/csv", post(plan_csv))
        .route("/v1/whatif", post(whatif))
        .route("/v1/sweep", post(sweep))
        .layer(cors)
        .with_state(ApiState { config })
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let app = router(config);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn plan(
    State(state): State<ApiState>,
    Json(request): Json<ScenarioRequest>,
) -> ApiResult<PlanResponse> {
    let (parameters, input) = resolve_scenario(&state, request);
    let plan = compute_plan(&parameters, &input)?;
    debug!(
        hours = plan.hours.len(),
        peak = plan.peak_hourly_fte,
        total = plan.total_fte,
        "computed staffing plan"
    );
    let summary = summarize_plan(&plan);
    Ok(ok(PlanResponse {
        computed_at: Utc::now(),
        input,
        parameters,
        plan,
        summary,
    }))
}

async fn plan_csv(
    State(state): State<ApiState>,
    Json(request): Json<ScenarioRequest>,
) -> std::result::Result<Response, ApiError> {
    let (parameters, input) = resolve_scenario(&state, request);
    let plan = compute_plan(&parameters, &input)?;
    let body = plan_to_csv(&plan).map_err(ApiError::internal)?;
    Ok(([(header::CONTENT_TYPE, "text/csv")], body).into_response())
}

async fn whatif(
    State(state): State<ApiState>,
    Json(request): Json<WhatIfRequest>,
) -> ApiResult<WhatIfResult> {
    let changes = request
        .changes
        .iter()
        .map(|raw| {
            WhatIfChange::from_str(raw).map_err(|error| ApiError::bad_request(error.to_string()))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if changes.is_empty() {
        return Err(ApiError::bad_request("at least one change is required"));
    }
    let (parameters, input) = resolve_scenario(&state, request.scenario);
    let result = simulate_whatif(&parameters, &input, &changes)?;
    Ok(ok(result))
}

async fn sweep(
    State(state): State<ApiState>,
    Json(request): Json<SweepRequest>,
) -> ApiResult<SweepResponse> {
    let mut targets = request.targets;
    targets.sort_unstable();
    targets.dedup();
    let (parameters, input) = resolve_scenario(&state, request.scenario);
    let points = sweep_tat_targets(&parameters, &input, &targets)?;
    Ok(ok(SweepResponse { points }))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn resolve_scenario(
    state: &ApiState,
    request: ScenarioRequest,
) -> (StaffingParameters, WorkloadInput) {
    let parameters = request
        .parameters
        .unwrap_or_else(|| state.config.staffing_parameters());
    let input = request.workload.resolve(&state.config.defaults);
    (parameters, input)
}
