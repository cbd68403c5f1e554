use axum::{
    Json,
    extract::{Query, State},
};

use super::{ApiError, api_error, bad_request};
use crate::{
    AppState,
    models::{
        automation::{AutomationStatus, CycleReport, RunEntryResponse, RunListQuery, RunListResponse},
        niche::{NicheEntry, NicheListQuery, NicheListResponse},
        revenue::DailyRevenueSnapshot,
    },
    services::{automation_log, niche_scorer, revenue_aggregator},
};

const DEFAULT_NICHE_LIMIT: u64 = 20;
const DEFAULT_RUN_LIMIT: u64 = 50;

/// Handler for POST /api/automation/run
///
/// Always answers 200; a failed or rejected cycle has `success: false`.
pub async fn run_cycle(State(state): State<AppState>) -> Json<CycleReport> {
    tracing::info!("Profit cycle requested via API");
    Json(state.cycle.run_cycle().await)
}

/// Handler for GET /api/automation/status
pub async fn get_status(
    State(state): State<AppState>,
) -> Result<Json<AutomationStatus>, ApiError> {
    state.cycle.status().await.map(Json).map_err(api_error)
}

/// Handler for GET /api/revenue/today
/// Recomputes today's snapshot before returning it
pub async fn get_revenue_today(
    State(state): State<AppState>,
) -> Result<Json<DailyRevenueSnapshot>, ApiError> {
    revenue_aggregator::aggregate_today(&state.db)
        .await
        .map(Json)
        .map_err(api_error)
}

/// Handler for GET /api/niches
pub async fn get_niches(
    State(state): State<AppState>,
    Query(query): Query<NicheListQuery>,
) -> Result<Json<NicheListResponse>, ApiError> {
    query.validate().map_err(bad_request)?;

    let limit = query.limit.unwrap_or(DEFAULT_NICHE_LIMIT);
    let niches: Vec<NicheEntry> = niche_scorer::top_niches(&state.db, limit)
        .await
        .map_err(api_error)?
        .into_iter()
        .map(NicheEntry::from)
        .collect();

    Ok(Json(NicheListResponse {
        total: niches.len(),
        niches,
    }))
}

/// Handler for GET /api/automation/runs
pub async fn get_runs(
    State(state): State<AppState>,
    Query(query): Query<RunListQuery>,
) -> Result<Json<RunListResponse>, ApiError> {
    query.validate().map_err(bad_request)?;

    let runs: Vec<RunEntryResponse> = automation_log::recent_runs(
        &state.db,
        query.run_type.as_deref(),
        query.limit.unwrap_or(DEFAULT_RUN_LIMIT),
    )
    .await
    .map_err(api_error)?
    .into_iter()
    .map(RunEntryResponse::from)
    .collect();

    Ok(Json(RunListResponse {
        total: runs.len(),
        runs,
    }))
}
