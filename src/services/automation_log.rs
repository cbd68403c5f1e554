//! Append-only log of automation stage runs.

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::{automation_runs, prelude::*};
use crate::error::AutomationResult;

/// One finished stage run
#[derive(Debug, Clone)]
pub struct RunEntry<'a> {
    pub run_type: &'a str,
    pub items_processed: usize,
    pub duration_ms: i64,
    pub error: Option<String>,
    pub started_at: NaiveDateTime,
}

pub async fn record_run(
    db: &DatabaseConnection,
    entry: RunEntry<'_>,
) -> AutomationResult<automation_runs::Model> {
    let model = automation_runs::ActiveModel {
        run_type: Set(entry.run_type.to_string()),
        items_processed: Set(i32::try_from(entry.items_processed).unwrap_or(i32::MAX)),
        duration_ms: Set(entry.duration_ms),
        success: Set(entry.error.is_none()),
        error: Set(entry.error),
        started_at: Set(entry.started_at),
        ..Default::default()
    };

    let saved = model.insert(db).await?;

    tracing::debug!(
        run_type = %saved.run_type,
        items = saved.items_processed,
        duration_ms = saved.duration_ms,
        success = saved.success,
        "Recorded automation run"
    );

    Ok(saved)
}

/// Most recent runs, newest first, optionally filtered by run type
pub async fn recent_runs(
    db: &DatabaseConnection,
    run_type: Option<&str>,
    limit: u64,
) -> AutomationResult<Vec<automation_runs::Model>> {
    let mut query = AutomationRuns::find();
    if let Some(run_type) = run_type {
        query = query.filter(automation_runs::Column::RunType.eq(run_type));
    }

    Ok(query
        .order_by_desc(automation_runs::Column::StartedAt)
        .order_by_desc(automation_runs::Column::Id)
        .limit(limit)
        .all(db)
        .await?)
}
