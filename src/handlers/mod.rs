pub mod automation;
pub mod sales;

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};

use crate::{AppState, error::AutomationError, models::ErrorResponse};

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// All API routes, without the tracing and CORS layers
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/api/automation/run", post(automation::run_cycle))
        .route("/api/automation/status", get(automation::get_status))
        .route("/api/automation/runs", get(automation::get_runs))
        .route("/api/revenue/today", get(automation::get_revenue_today))
        .route("/api/niches", get(automation::get_niches))
        .route("/api/sales", post(sales::record_sale))
        .route("/api/sales/ledger", get(sales::get_ledger))
        .route("/api/team-pool", get(sales::get_team_pool))
        .with_state(state)
}

pub(crate) fn bad_request(error: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// invalid input -> 400, invariant violation -> 422, anything else -> 500
pub(crate) fn api_error(e: AutomationError) -> ApiError {
    let status = match &e {
        AutomationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AutomationError::InvariantViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %e, "Request failed");
    } else {
        tracing::warn!(error = %e, "Request rejected");
    }
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}
