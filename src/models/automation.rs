//! Automation cycle report and status models

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::sale::OrderSource;

/// Run types written to the automation_runs log
pub mod run_types {
    pub const TREND_DISCOVERY: &str = "trend_discovery";
    pub const PRODUCT_CREATION: &str = "product_creation";
    pub const ORDER_SYNC: &str = "order_sync";
    pub const REVENUE_AGGREGATION: &str = "revenue_aggregation";
    pub const FULL_CYCLE: &str = "full_cycle";
}

/// Totals from a completed cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummary {
    pub trends_found: usize,
    pub products_created: usize,
    pub orders_processed: usize,
    pub order_source: OrderSource,
    /// Today's revenue after aggregation
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    /// Today's profit after aggregation
    #[serde(with = "rust_decimal::serde::float")]
    pub profit: Decimal,
}

/// Outcome of one orchestrator run.
///
/// A failed run does not roll back stages that already committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<CycleSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stages that committed before the run ended
    pub completed_stages: Vec<String>,
    pub duration_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationState {
    NeverRun,
    Running,
    Healthy,
    Failed,
}

/// Response of GET /api/automation/status. Always well formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationStatus {
    pub state: AutomationState,
    pub last_run: Option<NaiveDateTime>,
    pub last_success: Option<NaiveDateTime>,
    /// None when no scheduler is attached
    pub next_run: Option<NaiveDateTime>,
    pub total_runs: i64,
    /// Percentage of runs that succeeded, 0 when never run
    pub success_rate: f64,
    pub last_error: Option<String>,
    pub last_duration_ms: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunListQuery {
    /// Filter by run type, e.g. `order_sync`
    pub run_type: Option<String>,
    /// Maximum number of results (default: 50, max: 500)
    pub limit: Option<u64>,
}

impl RunListQuery {
    pub fn validate(&self) -> Result<(), String> {
        match self.limit {
            Some(0) => Err("limit must be at least 1".to_string()),
            Some(limit) if limit > 500 => Err("limit cannot exceed 500".to_string()),
            _ => Ok(()),
        }
    }
}

/// One row of the automation run log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunEntryResponse {
    pub run_type: String,
    pub items_processed: i32,
    pub duration_ms: i64,
    pub success: bool,
    pub error: Option<String>,
    pub started_at: NaiveDateTime,
}

impl From<crate::entities::automation_runs::Model> for RunEntryResponse {
    fn from(run: crate::entities::automation_runs::Model) -> Self {
        Self {
            run_type: run.run_type,
            items_processed: run.items_processed,
            duration_ms: run.duration_ms,
            success: run.success,
            error: run.error,
            started_at: run.started_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunListResponse {
    pub runs: Vec<RunEntryResponse>,
    pub total: usize,
}
