//! Per-job run bookkeeping.
//!
//! Tracks when each scheduled job last attempted and last succeeded, so a
//! restart does not immediately re-run a cycle and the status endpoint can
//! tell "never ran" from "failing" from "healthy".

use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::{prelude::*, sync_status};
use crate::error::AutomationResult;
use crate::models::automation::{AutomationState, AutomationStatus};

/// Job names for tracking sync status
pub mod jobs {
    pub const PROFIT_CYCLE: &str = "profit_cycle";
}

/// Default minimum intervals between runs (in seconds)
pub mod intervals {
    pub const PROFIT_CYCLE: i32 = 86400; // daily
}

/// Outcome of a single job attempt
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Success { duration_ms: i64 },
    Failure { error: String, duration_ms: i64 },
}

pub async fn get(
    db: &DatabaseConnection,
    job_name: &str,
) -> AutomationResult<Option<sync_status::Model>> {
    Ok(SyncStatus::find()
        .filter(sync_status::Column::JobName.eq(job_name))
        .one(db)
        .await?)
}

/// Slack allowed when comparing against the interval, so a tick that fires
/// a few milliseconds before the previous run's start plus the interval
/// still counts as due. A tenth of the interval, at most a minute.
fn schedule_grace(min_interval_secs: i32) -> Duration {
    Duration::milliseconds(i64::from(min_interval_secs.max(0)) * 100).min(Duration::seconds(60))
}

/// True when the job never ran or its last attempt started at least the
/// stored minimum interval ago. A failed attempt also waits a full interval.
pub async fn should_sync(db: &DatabaseConnection, job_name: &str) -> AutomationResult<bool> {
    let Some(record) = get(db, job_name).await? else {
        tracing::info!("[{}] First run detected, will sync", job_name);
        return Ok(true);
    };

    let Some(last_attempt) = record.last_attempt_at.or(record.last_success_at) else {
        tracing::info!("[{}] No previous sync attempt, will sync", job_name);
        return Ok(true);
    };

    let elapsed = Utc::now().naive_utc().signed_duration_since(last_attempt);
    let interval = Duration::seconds(record.min_interval_secs as i64);

    if elapsed + schedule_grace(record.min_interval_secs) >= interval {
        tracing::info!(
            "[{}] Last sync started {}s ago (min: {}s), will sync",
            job_name,
            elapsed.num_seconds(),
            record.min_interval_secs
        );
        Ok(true)
    } else {
        tracing::debug!(
            "[{}] Skipping sync - last sync started {}s ago, next sync in {}s",
            job_name,
            elapsed.num_seconds(),
            (interval - elapsed).num_seconds()
        );
        Ok(false)
    }
}

/// Record an attempt in one upsert; counters only ever increment.
///
/// Attempt and success times are the run's start, so the next run is due
/// one interval after this one started, however long it took.
pub async fn record_outcome(
    db: &DatabaseConnection,
    job_name: &str,
    outcome: &JobOutcome,
    started_at: NaiveDateTime,
    interval_secs: i32,
) -> AutomationResult<()> {
    let (succeeded, error, duration_ms) = match outcome {
        JobOutcome::Success { duration_ms } => (true, None, *duration_ms),
        JobOutcome::Failure { error, duration_ms } => (false, Some(error.clone()), *duration_ms),
    };

    let record = sync_status::ActiveModel {
        job_name: Set(job_name.to_string()),
        last_success_at: Set(succeeded.then_some(started_at)),
        last_attempt_at: Set(Some(started_at)),
        last_error: Set(error.clone()),
        last_duration_ms: Set(Some(duration_ms)),
        success_count: Set(if succeeded { 1 } else { 0 }),
        error_count: Set(if succeeded { 0 } else { 1 }),
        min_interval_secs: Set(interval_secs),
        ..Default::default()
    };

    let counter = if succeeded {
        sync_status::Column::SuccessCount
    } else {
        sync_status::Column::ErrorCount
    };

    let mut on_conflict = OnConflict::column(sync_status::Column::JobName);
    on_conflict
        .update_columns([
            sync_status::Column::LastAttemptAt,
            sync_status::Column::LastError,
            sync_status::Column::LastDurationMs,
            sync_status::Column::MinIntervalSecs,
        ])
        .value(counter, Expr::col((SyncStatus, counter)).add(1));
    if succeeded {
        on_conflict.update_column(sync_status::Column::LastSuccessAt);
    }

    SyncStatus::insert(record)
        .on_conflict(on_conflict.to_owned())
        .exec_without_returning(db)
        .await?;

    match error {
        None => tracing::debug!("[{}] Recorded successful run", job_name),
        Some(e) => tracing::debug!("[{}] Recorded failed run: {}", job_name, e),
    }
    Ok(())
}

/// Build the status object from the stored record.
///
/// `interval_secs` is the scheduler cadence, `None` when nothing schedules
/// the job.
pub fn build_status(
    record: Option<&sync_status::Model>,
    running: bool,
    interval_secs: Option<i64>,
) -> AutomationStatus {
    let Some(record) = record else {
        return AutomationStatus {
            state: if running {
                AutomationState::Running
            } else {
                AutomationState::NeverRun
            },
            last_run: None,
            last_success: None,
            next_run: None,
            total_runs: 0,
            success_rate: 0.0,
            last_error: None,
            last_duration_ms: None,
        };
    };

    let total_runs = record.success_count + record.error_count;
    let success_rate = if total_runs > 0 {
        (record.success_count as f64 / total_runs as f64 * 10000.0).round() / 100.0
    } else {
        0.0
    };

    let last_failed = match (record.last_attempt_at, record.last_success_at) {
        (Some(_), None) => record.last_error.is_some(),
        (Some(attempt), Some(success)) => record.last_error.is_some() && attempt > success,
        (None, _) => false,
    };

    let state = if running {
        AutomationState::Running
    } else if record.last_attempt_at.is_none() {
        AutomationState::NeverRun
    } else if last_failed {
        AutomationState::Failed
    } else {
        AutomationState::Healthy
    };

    let next_run = match (record.last_attempt_at, interval_secs) {
        (Some(last), Some(secs)) => Some(next_after(last, secs)),
        _ => None,
    };

    AutomationStatus {
        state,
        last_run: record.last_attempt_at,
        last_success: record.last_success_at,
        next_run,
        total_runs,
        success_rate,
        last_error: record.last_error.clone(),
        last_duration_ms: record.last_duration_ms,
    }
}

fn next_after(last: NaiveDateTime, secs: i64) -> NaiveDateTime {
    last + Duration::seconds(secs)
}
