use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use super::{ApiError, api_error, bad_request};
use crate::{
    AppState,
    models::profit::{
        LedgerQuery, LedgerResponse, ProfitSplitRecord, RecordSaleRequest, TeamPoolSummary,
        UserType,
    },
};

/// Handler for POST /api/sales
///
/// Request body:
/// ```json
/// {
///   "productName": "Retro Gaming Hoodie",
///   "salePrice": 49.99,
///   "cost": 21.40,
///   "platform": "etsy",
///   "userType": { "type": "team", "memberId": "alice", "profitSharePercentage": 25 }
/// }
/// ```
pub async fn record_sale(
    State(state): State<AppState>,
    Json(request): Json<RecordSaleRequest>,
) -> Result<(StatusCode, Json<ProfitSplitRecord>), ApiError> {
    let record = state
        .allocator
        .record_sale(&state.db, &request)
        .await
        .map_err(api_error)?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Handler for GET /api/sales/ledger?userType=team&userId=alice
pub async fn get_ledger(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<LedgerResponse>, ApiError> {
    let user_type = UserType::from_str(&query.user_type).ok_or_else(|| {
        bad_request(format!(
            "unknown userType '{}', expected owner, client or team",
            query.user_type
        ))
    })?;
    if query.user_id.trim().is_empty() {
        return Err(bad_request("userId cannot be empty"));
    }

    state
        .allocator
        .ledger(&state.db, user_type, query.user_id.trim())
        .await
        .map(Json)
        .map_err(api_error)
}

/// Handler for GET /api/team-pool
pub async fn get_team_pool(
    State(state): State<AppState>,
) -> Result<Json<TeamPoolSummary>, ApiError> {
    state
        .allocator
        .team_pool_summary(&state.db)
        .await
        .map(Json)
        .map_err(api_error)
}
