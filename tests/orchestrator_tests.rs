mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use std::time::Duration;

use profit_automation::entities::{automation_runs, prelude::*, products};
use profit_automation::jobs::profit_cycle_sync::start_profit_cycle_job;
use profit_automation::models::automation::AutomationState;
use profit_automation::models::sale::OrderSource;
use profit_automation::services::sync_status::{self, JobOutcome, jobs};

use crate::common::{
    FakeFulfillmentProvider, FakeTrendProvider, provider_order, seed_product, setup_test_db,
    signal, test_config, test_state,
};

fn trending() -> FakeTrendProvider {
    FakeTrendProvider::new().with_signals(
        "all",
        vec![
            signal("retro gaming", "200,000+"),
            signal("yoga mats", "50,000+"),
            signal("dog bandanas", "20,000+"),
            signal("coffee art", "5,000+"),
        ],
    )
}

#[tokio::test]
async fn test_full_cycle_without_fulfillment_credentials_simulates() {
    let db = setup_test_db().await.unwrap();
    let state = test_state(
        db.clone(),
        test_config(),
        trending(),
        FakeFulfillmentProvider::Unconfigured,
    );

    let report = state.cycle.run_cycle().await;

    assert!(report.success, "cycle failed: {:?}", report.error);
    assert!(report.error.is_none());
    assert_eq!(
        report.completed_stages,
        vec![
            "trend_discovery",
            "product_creation",
            "order_sync",
            "revenue_aggregation"
        ]
    );

    let summary = report.summary.unwrap();
    assert_eq!(summary.trends_found, 4);
    assert_eq!(summary.products_created, 4);
    assert_eq!(summary.order_source, OrderSource::Simulated);
    assert!((5..=15).contains(&summary.orders_processed));
    assert!(summary.revenue > Decimal::ZERO);
    assert!(summary.profit > Decimal::ZERO);

    // One log row per stage plus the cycle itself
    assert_eq!(AutomationRuns::find().count(&db).await.unwrap(), 5);
    let failed = AutomationRuns::find()
        .filter(automation_runs::Column::Success.eq(false))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(failed, 0);
}

#[tokio::test]
async fn test_products_per_cycle_limit_is_honoured() {
    let db = setup_test_db().await.unwrap();
    let mut config = test_config();
    config.products_per_cycle = 2;
    let state = test_state(db.clone(), config, trending(), FakeFulfillmentProvider::Unconfigured);

    let report = state.cycle.run_cycle().await;

    assert_eq!(report.summary.unwrap().products_created, 2);
    assert_eq!(Products::find().count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn test_fulfillment_error_falls_back_to_simulation() {
    let db = setup_test_db().await.unwrap();
    let state = test_state(
        db.clone(),
        test_config(),
        trending(),
        FakeFulfillmentProvider::Failing,
    );

    let report = state.cycle.run_cycle().await;

    assert!(report.success);
    let summary = report.summary.unwrap();
    assert_eq!(summary.order_source, OrderSource::Simulated);
    assert!(summary.orders_processed >= 5);
}

#[tokio::test]
async fn test_live_orders_are_used_when_available() {
    let db = setup_test_db().await.unwrap();
    seed_product(&db, "POD-LIVE-1", dec!(18), dec!(45), "active").await;

    let orders = vec![
        provider_order(9001, "POD-LIVE-1", 1, dec!(45), dec!(18)),
        provider_order(9002, "POD-LIVE-1", 2, dec!(90), dec!(36)),
    ];
    let state = test_state(
        db.clone(),
        test_config(),
        FakeTrendProvider::new(),
        FakeFulfillmentProvider::Orders(orders),
    );

    let report = state.cycle.run_cycle().await;

    assert!(report.success);
    let summary = report.summary.unwrap();
    assert_eq!(summary.order_source, OrderSource::Live);
    assert_eq!(summary.orders_processed, 2);
    assert_eq!(summary.revenue.round_dp(2), dec!(135));

    // A retried sync does not double count
    let rerun = state.cycle.run_cycle().await.summary.unwrap();
    assert_eq!(rerun.orders_processed, 0);
    assert_eq!(rerun.revenue.round_dp(2), dec!(135));
}

#[tokio::test]
async fn test_zero_active_products_cycle_reports_zero_orders() {
    let db = setup_test_db().await.unwrap();
    let state = test_state(
        db.clone(),
        test_config(),
        FakeTrendProvider::new(),
        FakeFulfillmentProvider::Unconfigured,
    );

    let report = state.cycle.run_cycle().await;

    assert!(report.success);
    let summary = report.summary.unwrap();
    assert_eq!(summary.trends_found, 0);
    assert_eq!(summary.products_created, 0);
    assert_eq!(summary.orders_processed, 0);
    assert!(summary.revenue.is_zero());
}

#[tokio::test]
async fn test_stage_timeout_fails_cycle_without_rollback() {
    let db = setup_test_db().await.unwrap();
    seed_product(&db, "POD-KEEP", dec!(18), dec!(45), "active").await;

    let mut config = test_config();
    config.stage_timeout = Duration::from_millis(50);
    let slow = FakeTrendProvider::new().with_delay(Duration::from_secs(2));
    let state = test_state(db.clone(), config, slow, FakeFulfillmentProvider::Unconfigured);

    let report = state.cycle.run_cycle().await;

    assert!(!report.success);
    assert!(report.summary.is_none());
    assert!(report.completed_stages.is_empty());
    assert!(report.error.unwrap().contains("timed out"));

    // Nothing is rolled back or deleted
    let kept = Products::find()
        .filter(products::Column::Sku.eq("POD-KEEP"))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(kept, 1);

    let stage_log = AutomationRuns::find()
        .filter(automation_runs::Column::RunType.eq("trend_discovery"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(!stage_log.success);
    assert!(stage_log.error.is_some());
}

#[tokio::test]
async fn test_status_distinguishes_never_run_healthy_and_failed() {
    let db = setup_test_db().await.unwrap();

    let healthy = test_state(
        db.clone(),
        test_config(),
        trending(),
        FakeFulfillmentProvider::Unconfigured,
    );

    let status = healthy.cycle.status().await.unwrap();
    assert_eq!(status.state, AutomationState::NeverRun);
    assert_eq!(status.total_runs, 0);
    assert!(status.last_run.is_none());

    assert!(healthy.cycle.run_cycle().await.success);

    let status = healthy.cycle.status().await.unwrap();
    assert_eq!(status.state, AutomationState::Healthy);
    assert_eq!(status.total_runs, 1);
    assert_eq!(status.success_rate, 100.0);
    assert!(status.last_run.is_some());
    assert!(status.last_success.is_some());
    assert!(status.next_run.is_none(), "no scheduler in tests");

    let mut config = test_config();
    config.stage_timeout = Duration::from_millis(50);
    let failing = test_state(
        db.clone(),
        config,
        FakeTrendProvider::new().with_delay(Duration::from_secs(2)),
        FakeFulfillmentProvider::Unconfigured,
    );
    assert!(!failing.cycle.run_cycle().await.success);

    let status = failing.cycle.status().await.unwrap();
    assert_eq!(status.state, AutomationState::Failed);
    assert_eq!(status.total_runs, 2);
    assert_eq!(status.success_rate, 50.0);
    assert!(status.last_error.is_some());
}

#[tokio::test]
async fn test_status_reports_next_run_when_scheduled() {
    let db = setup_test_db().await.unwrap();
    let mut config = test_config();
    config.scheduler_enabled = true;
    config.cycle_interval_secs = 3600;
    let state = test_state(db, config, trending(), FakeFulfillmentProvider::Unconfigured);

    state.cycle.run_cycle().await;

    let status = state.cycle.status().await.unwrap();
    let last = status.last_run.unwrap();
    assert_eq!(status.next_run, Some(last + chrono::Duration::seconds(3600)));
}

#[tokio::test]
async fn test_concurrent_cycle_is_rejected() {
    let db = setup_test_db().await.unwrap();
    let mut config = test_config();
    config.stage_timeout = Duration::from_secs(5);
    let slow = FakeTrendProvider::new().with_delay(Duration::from_millis(500));
    let state = test_state(db, config, slow, FakeFulfillmentProvider::Unconfigured);

    let cycle = state.cycle.clone();
    let first = tokio::spawn(async move { cycle.run_cycle().await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(state.cycle.is_running());

    let second = state.cycle.run_cycle().await;
    assert!(!second.success);
    assert!(second.error.unwrap().contains("already running"));

    let first = first.await.unwrap();
    assert!(first.success);
    assert!(!state.cycle.is_running());
}

#[tokio::test]
async fn test_scheduler_runs_once_per_interval() {
    let db = setup_test_db().await.unwrap();
    let mut config = test_config();
    config.scheduler_enabled = true;
    config.cycle_interval_secs = 1;
    let state = test_state(db.clone(), config, trending(), FakeFulfillmentProvider::Unconfigured);

    let handle = start_profit_cycle_job(db.clone(), state.cycle.clone(), 1).await;
    // Due at 0s, 1s, 2s, 3s and 4s
    tokio::time::sleep(Duration::from_millis(4500)).await;
    handle.abort();

    let record = sync_status::get(&db, jobs::PROFIT_CYCLE).await.unwrap().unwrap();
    assert!(
        record.success_count >= 4,
        "expected a run every tick, got {} runs",
        record.success_count
    );
    assert_eq!(record.error_count, 0);
}

#[tokio::test]
async fn test_should_sync_measures_from_last_start_and_follows_interval_changes() {
    let db = setup_test_db().await.unwrap();
    let outcome = JobOutcome::Success { duration_ms: 8000 };
    let now = chrono::Utc::now().naive_utc();

    // Started 9.5s ago on a 10s interval: due within the grace period
    sync_status::record_outcome(
        &db,
        jobs::PROFIT_CYCLE,
        &outcome,
        now - chrono::Duration::milliseconds(9500),
        10,
    )
    .await
    .unwrap();
    assert!(sync_status::should_sync(&db, jobs::PROFIT_CYCLE).await.unwrap());

    // Started 5s ago: not due yet
    sync_status::record_outcome(
        &db,
        jobs::PROFIT_CYCLE,
        &outcome,
        now - chrono::Duration::seconds(5),
        10,
    )
    .await
    .unwrap();
    assert!(!sync_status::should_sync(&db, jobs::PROFIT_CYCLE).await.unwrap());

    // A shorter interval replaces the stored one
    sync_status::record_outcome(
        &db,
        jobs::PROFIT_CYCLE,
        &outcome,
        now - chrono::Duration::seconds(5),
        4,
    )
    .await
    .unwrap();
    let record = sync_status::get(&db, jobs::PROFIT_CYCLE).await.unwrap().unwrap();
    assert_eq!(record.min_interval_secs, 4);
    assert_eq!(record.success_count, 3);
    assert!(sync_status::should_sync(&db, jobs::PROFIT_CYCLE).await.unwrap());
}

#[tokio::test]
async fn test_failed_attempt_waits_a_full_interval() {
    let db = setup_test_db().await.unwrap();
    let failure = JobOutcome::Failure {
        error: "boom".to_string(),
        duration_ms: 10,
    };

    sync_status::record_outcome(
        &db,
        jobs::PROFIT_CYCLE,
        &failure,
        chrono::Utc::now().naive_utc(),
        3600,
    )
    .await
    .unwrap();

    assert!(!sync_status::should_sync(&db, jobs::PROFIT_CYCLE).await.unwrap());
}
