//! Full-Cycle Orchestrator
//!
//! Runs trend discovery, product creation, order sync and revenue
//! aggregation strictly in sequence. Each stage commits on its own: when a
//! later stage fails, earlier stages' writes stand and the report lists the
//! stages that completed. A rerun starts again from discovery, which is safe
//! because every stage is an upsert or insert-or-ignore.

use chrono::Utc;
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::AutomationConfig;
use crate::error::{AutomationError, AutomationResult, ProviderError};
use crate::models::automation::{AutomationStatus, CycleReport, CycleSummary, run_types};
use crate::services::automation_log::{self, RunEntry};
use crate::services::fulfillment::FulfillmentProvider;
use crate::services::niche_scorer::NicheScorer;
use crate::services::order_sync::{OrderSyncOutcome, OrderSyncService};
use crate::services::product_synthesizer::ProductSynthesizer;
use crate::services::profit_allocator::ProfitAllocator;
use crate::services::revenue_aggregator;
use crate::services::sampling::SharedRng;
use crate::services::sync_status::{self, JobOutcome, intervals, jobs};
use crate::services::trends::TrendProvider;

pub struct ProfitCycle {
    db: DatabaseConnection,
    config: AutomationConfig,
    scorer: NicheScorer,
    synthesizer: ProductSynthesizer,
    fulfillment: Arc<dyn FulfillmentProvider>,
    order_sync: OrderSyncService,
    running: AtomicBool,
}

/// Clears the running flag when the cycle ends, however it ends
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunningGuard(flag))
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ProfitCycle {
    pub fn new(
        db: DatabaseConnection,
        config: AutomationConfig,
        trends: Arc<dyn TrendProvider>,
        fulfillment: Arc<dyn FulfillmentProvider>,
        rng: SharedRng,
    ) -> Self {
        let allocator = ProfitAllocator::new(config.team_profit_share_percentage);

        Self {
            scorer: NicheScorer::new(trends, rng.clone(), config.rate_limit_delay),
            synthesizer: ProductSynthesizer::new(rng.clone()),
            order_sync: OrderSyncService::new(rng, allocator, config.owner_id.clone()),
            fulfillment,
            db,
            config,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run one full cycle. Never panics or returns an error; failures are
    /// reported in the `CycleReport`.
    pub async fn run_cycle(&self) -> CycleReport {
        let Some(_guard) = RunningGuard::acquire(&self.running) else {
            warn!("Profit cycle already running, rejecting concurrent run");
            return CycleReport {
                success: false,
                summary: None,
                error: Some("a profit cycle is already running".to_string()),
                completed_stages: Vec::new(),
                duration_ms: 0,
            };
        };

        info!("Starting profit automation cycle");

        let started_at = Utc::now().naive_utc();
        let start = Instant::now();
        let mut completed_stages = Vec::new();

        let result = self.run_stages(&mut completed_stages).await;
        let duration_ms = elapsed_ms(start);

        let log_entry = RunEntry {
            run_type: run_types::FULL_CYCLE,
            items_processed: result.as_ref().map(|s| s.orders_processed).unwrap_or(0),
            duration_ms,
            error: result.as_ref().err().map(|e| e.to_string()),
            started_at,
        };
        if let Err(e) = automation_log::record_run(&self.db, log_entry).await {
            warn!(error = %e, "Failed to record full cycle run");
        }

        let outcome = match &result {
            Ok(_) => JobOutcome::Success { duration_ms },
            Err(e) => JobOutcome::Failure {
                error: e.to_string(),
                duration_ms,
            },
        };
        let interval = i32::try_from(self.config.cycle_interval_secs)
            .unwrap_or(intervals::PROFIT_CYCLE);
        if let Err(e) = sync_status::record_outcome(
            &self.db,
            jobs::PROFIT_CYCLE,
            &outcome,
            started_at,
            interval,
        )
        .await
        {
            warn!(error = %e, "Failed to record cycle status");
        }

        match result {
            Ok(summary) => {
                info!(
                    trends = summary.trends_found,
                    products = summary.products_created,
                    orders = summary.orders_processed,
                    revenue = %summary.revenue,
                    profit = %summary.profit,
                    duration_ms,
                    "Profit cycle complete"
                );
                CycleReport {
                    success: true,
                    summary: Some(summary),
                    error: None,
                    completed_stages,
                    duration_ms,
                }
            }
            Err(e) => {
                error!(
                    error = %e,
                    completed = ?completed_stages,
                    "Profit cycle failed"
                );
                CycleReport {
                    success: false,
                    summary: None,
                    error: Some(e.to_string()),
                    completed_stages,
                    duration_ms,
                }
            }
        }
    }

    pub async fn status(&self) -> AutomationResult<AutomationStatus> {
        let record = sync_status::get(&self.db, jobs::PROFIT_CYCLE).await?;
        let interval = self
            .config
            .scheduler_enabled
            .then(|| i64::try_from(self.config.cycle_interval_secs).unwrap_or(i64::MAX));

        Ok(sync_status::build_status(
            record.as_ref(),
            self.is_running(),
            interval,
        ))
    }

    async fn run_stages(&self, completed: &mut Vec<String>) -> AutomationResult<CycleSummary> {
        let discovery = self
            .run_stage(
                run_types::TREND_DISCOVERY,
                self.scorer.discover(
                    &self.db,
                    &self.config.trend_categories,
                    &self.config.trend_geo,
                ),
                |o| o.processed,
            )
            .await?;
        completed.push(run_types::TREND_DISCOVERY.to_string());

        let synthesis = self
            .run_stage(
                run_types::PRODUCT_CREATION,
                self.synthesizer
                    .create_products(&self.db, self.config.products_per_cycle),
                |o| o.created.len(),
            )
            .await?;
        completed.push(run_types::PRODUCT_CREATION.to_string());

        let orders = self
            .run_stage(run_types::ORDER_SYNC, self.sync_orders(), |o| o.processed)
            .await?;
        completed.push(run_types::ORDER_SYNC.to_string());

        let snapshot = self
            .run_stage(
                run_types::REVENUE_AGGREGATION,
                revenue_aggregator::aggregate_today(&self.db),
                |s| usize::try_from(s.total_orders).unwrap_or(0),
            )
            .await?;
        completed.push(run_types::REVENUE_AGGREGATION.to_string());

        Ok(CycleSummary {
            trends_found: discovery.processed,
            products_created: synthesis.created.len(),
            orders_processed: orders.processed,
            order_source: orders.source,
            revenue: snapshot.total_sales,
            profit: snapshot.total_profit,
        })
    }

    /// Live orders when the provider answers, synthetic orders otherwise
    async fn sync_orders(&self) -> AutomationResult<OrderSyncOutcome> {
        let fetched = match tokio::time::timeout(
            self.config.provider_timeout,
            self.fulfillment.fetch_orders(),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                provider: "fulfillment",
            }),
        };

        match fetched {
            Ok(orders) => {
                info!(count = orders.len(), "Fetched live fulfillment orders");
                self.order_sync.sync_live(&self.db, &orders).await
            }
            Err(e) if e.is_expected() => {
                info!(reason = %e, "Fulfillment feed not configured, simulating orders");
                self.order_sync.simulate(&self.db).await
            }
            Err(e) => {
                warn!(error = %e, "Fulfillment fetch failed, simulating orders");
                self.order_sync.simulate(&self.db).await
            }
        }
    }

    /// Run a stage under the stage timeout and log it to automation_runs
    async fn run_stage<T, F>(
        &self,
        stage: &'static str,
        work: F,
        items: impl Fn(&T) -> usize,
    ) -> AutomationResult<T>
    where
        F: Future<Output = AutomationResult<T>>,
    {
        let started_at = Utc::now().naive_utc();
        let start = Instant::now();

        let result = match tokio::time::timeout(self.config.stage_timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(AutomationError::StageTimeout {
                stage,
                secs: self.config.stage_timeout.as_secs(),
            }),
        };

        let entry = RunEntry {
            run_type: stage,
            items_processed: result.as_ref().map(&items).unwrap_or(0),
            duration_ms: elapsed_ms(start),
            error: result.as_ref().err().map(|e| e.to_string()),
            started_at,
        };
        if let Err(e) = automation_log::record_run(&self.db, entry).await {
            warn!(stage, error = %e, "Failed to record stage run");
        }

        if let Err(e) = &result {
            error!(stage, error = %e, "Stage failed");
        }

        result
    }
}

fn elapsed_ms(start: Instant) -> i64 {
    i64::try_from(start.elapsed().as_millis()).unwrap_or(i64::MAX)
}
