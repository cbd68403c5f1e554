use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior, interval};

use crate::services::orchestrator::ProfitCycle;
use crate::services::sync_status::{self, jobs};

/// Longest wait between `should_sync` checks
const MAX_POLL_SECS: u64 = 60;

/// Start the scheduled profit cycle
///
/// Polls `should_sync` on a tick no longer than a minute, so a cycle runs
/// once per interval measured from the previous run's start, and a restart
/// inside the interval does not repeat a cycle that already succeeded.
/// Stops on Ctrl+C.
pub async fn start_profit_cycle_job(
    db: DatabaseConnection,
    cycle: Arc<ProfitCycle>,
    interval_secs: u64,
) -> tokio::task::JoinHandle<()> {
    let poll_secs = interval_secs.clamp(1, MAX_POLL_SECS);

    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(poll_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Stopping profit cycle job");
                    break;
                }
            }

            match sync_status::should_sync(&db, jobs::PROFIT_CYCLE).await {
                Ok(true) => {
                    tracing::info!("Starting scheduled profit cycle");
                    let report = cycle.run_cycle().await;
                    if report.success {
                        tracing::info!(
                            duration_ms = report.duration_ms,
                            "Scheduled profit cycle complete"
                        );
                    } else {
                        tracing::error!(
                            error = report.error.as_deref().unwrap_or("unknown"),
                            completed = ?report.completed_stages,
                            "Scheduled profit cycle failed"
                        );
                    }
                }
                Ok(false) => {
                    tracing::debug!("Skipping profit cycle (not due yet)");
                }
                Err(e) => {
                    tracing::warn!("Failed to check sync status: {}", e);
                }
            }
        }
    })
}
