mod common;

use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use std::collections::HashSet;

use profit_automation::entities::{customer_ltv, prelude::*, profit_splits, sales};
use profit_automation::models::sale::{OrderSource, PaymentStatus};
use profit_automation::services::order_sync::OrderSyncService;
use profit_automation::services::profit_allocator::ProfitAllocator;
use profit_automation::services::sampling::shared_rng;

use crate::common::{TEST_SEED, new_sale, now_local, provider_order, seed_product, setup_test_db};

fn service() -> OrderSyncService {
    OrderSyncService::new(
        shared_rng(Some(TEST_SEED)),
        ProfitAllocator::new(dec!(20)),
        "owner-1".to_string(),
    )
}

async fn sale_count(db: &DatabaseConnection) -> u64 {
    Sales::find().count(db).await.unwrap()
}

#[tokio::test]
async fn test_duplicate_order_id_is_recorded_once() {
    let db = setup_test_db().await.unwrap();
    let product = seed_product(&db, "POD-A", dec!(20), dec!(50), "active").await;
    let sale = new_sale(
        "ORDER-1",
        &product,
        1,
        Some("buyer@example.com"),
        PaymentStatus::Paid,
        now_local(),
    );

    let sync = service();
    assert!(sync.record_sale(&db, &sale).await.unwrap());
    assert!(!sync.record_sale(&db, &sale).await.unwrap());

    assert_eq!(sale_count(&db).await, 1);

    // Side effects ran once
    let ltv = CustomerLtv::find()
        .filter(customer_ltv::Column::CustomerEmail.eq("buyer@example.com"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ltv.total_orders, 1);
    assert_eq!(ltv.total_spent.round_dp(2), dec!(50));

    let splits = ProfitSplits::find().all(&db).await.unwrap();
    assert_eq!(splits.len(), 1);
    assert_eq!(splits[0].user_type, "owner");
    assert_eq!(splits[0].user_id, "owner-1");
    assert_eq!(splits[0].order_id.as_deref(), Some("ORDER-1"));
    assert_eq!(splits[0].user_profit.round_dp(2), dec!(30));
    assert_eq!(splits[0].team_share.round_dp(2), dec!(0));
}

#[tokio::test]
async fn test_customer_ltv_accumulates_across_sales() {
    let db = setup_test_db().await.unwrap();
    let product = seed_product(&db, "POD-B", dec!(20), dec!(50), "active").await;
    let sync = service();

    for (order_id, quantity) in [("L-1", 1), ("L-2", 2)] {
        let sale = new_sale(
            order_id,
            &product,
            quantity,
            Some("Repeat@Example.com"),
            PaymentStatus::Paid,
            now_local(),
        );
        sync.record_sale(&db, &sale).await.unwrap();
    }

    let ltv = CustomerLtv::find()
        .filter(customer_ltv::Column::CustomerEmail.eq("repeat@example.com"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(ltv.total_orders, 2);
    assert_eq!(ltv.total_spent.round_dp(2), dec!(150));
    assert_eq!(ltv.avg_order_value.round_dp(2), dec!(75));
    assert_eq!(ltv.ltv_score.round_dp(2), dec!(15));
}

#[tokio::test]
async fn test_sale_without_email_skips_ltv() {
    let db = setup_test_db().await.unwrap();
    let product = seed_product(&db, "POD-C", dec!(20), dec!(50), "active").await;

    let sale = new_sale("ANON-1", &product, 1, None, PaymentStatus::Paid, now_local());
    assert!(service().record_sale(&db, &sale).await.unwrap());

    assert_eq!(sale_count(&db).await, 1);
    assert_eq!(CustomerLtv::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_simulator_generates_sales_from_active_products_only() {
    let db = setup_test_db().await.unwrap();
    let hoodie = seed_product(&db, "POD-HOODIE", dec!(22.5), dec!(58), "active").await;
    let mug = seed_product(&db, "POD-MUG", dec!(15.25), dec!(37), "active").await;
    let paused = seed_product(&db, "POD-PAUSED", dec!(18), dec!(45), "paused").await;

    let outcome = service().simulate(&db).await.unwrap();

    assert_eq!(outcome.source, OrderSource::Simulated);
    assert!(
        (5..=15).contains(&outcome.processed),
        "processed {}",
        outcome.processed
    );
    assert_eq!(outcome.duplicates, 0);

    let rows = Sales::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), outcome.processed);

    let active: HashSet<i32> = [hoodie.id, mug.id].into_iter().collect();
    for sale in &rows {
        assert!(active.contains(&sale.product_id));
        assert_ne!(sale.product_id, paused.id);
        assert!(sale.quantity == 1 || sale.quantity == 2);
        assert_eq!(sale.payment_status, "paid");
        assert!(sale.order_id.starts_with("SIM-"));
        assert!(sale.customer_email.is_some());
    }

    // Every simulated sale also lands in the owner ledger
    let splits = ProfitSplits::find()
        .filter(profit_splits::Column::UserType.eq("owner"))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(splits as usize, rows.len());
}

#[tokio::test]
async fn test_generated_sales_satisfy_money_invariants() {
    let db = setup_test_db().await.unwrap();
    let product = seed_product(&db, "POD-POSTER", dec!(17.31), dec!(42), "active").await;

    let sales = service().generate_synthetic_orders(&db).await.unwrap();
    assert!((5..=15).contains(&sales.len()));

    for sale in &sales {
        let a = sale.amounts;
        assert_eq!(sale.product_id, product.id);
        assert_eq!(a.total_amount, a.unit_price * rust_decimal::Decimal::from(a.quantity));
        assert_eq!(a.commission, a.total_amount * dec!(0.05));
        assert_eq!(a.net_profit, (a.total_amount - a.cost_of_goods) - a.commission);
        assert_eq!(a.cost_of_goods, product.base_price * rust_decimal::Decimal::from(a.quantity));
        assert!(a.verify().is_ok());
    }

    let ids: HashSet<&str> = sales.iter().map(|s| s.order_id.as_str()).collect();
    assert_eq!(ids.len(), sales.len(), "synthetic order ids are unique");
}

#[tokio::test]
async fn test_simulator_with_no_active_products_is_a_no_op() {
    let db = setup_test_db().await.unwrap();
    seed_product(&db, "POD-OLD", dec!(18), dec!(45), "archived").await;

    let outcome = service().simulate(&db).await.unwrap();

    assert_eq!(outcome.processed, 0);
    assert_eq!(sale_count(&db).await, 0);
}

#[tokio::test]
async fn test_live_sync_skips_unknown_skus_and_dedupes_retries() {
    let db = setup_test_db().await.unwrap();
    seed_product(&db, "POD-LIVE", dec!(18), dec!(45), "active").await;

    let orders = vec![
        provider_order(501, "POD-LIVE", 2, dec!(90), dec!(36)),
        provider_order(502, "NOT-OURS", 1, dec!(30), dec!(10)),
    ];

    let sync = service();
    let first = sync.sync_live(&db, &orders).await.unwrap();
    assert_eq!(first.source, OrderSource::Live);
    assert_eq!(first.processed, 1);
    assert_eq!(first.skipped, 1);

    let retry = sync.sync_live(&db, &orders).await.unwrap();
    assert_eq!(retry.processed, 0);
    assert_eq!(retry.duplicates, 1);

    let stored = Sales::find()
        .filter(sales::Column::OrderId.eq("printful-501"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.quantity, 2);
    assert_eq!(stored.unit_price.round_dp(2), dec!(45));
    assert_eq!(stored.total_amount.round_dp(2), dec!(90));
    assert_eq!(stored.net_profit.round_dp(2), dec!(49.5));
    assert_eq!(sale_count(&db).await, 1);
}

#[tokio::test]
async fn test_failing_sale_is_skipped_and_batch_continues() {
    let db = setup_test_db().await.unwrap();
    let product = seed_product(&db, "POD-BATCH", dec!(20), dec!(50), "active").await;

    let first = new_sale("B-1", &product, 1, Some("a@example.com"), PaymentStatus::Paid, now_local());
    // References a product that does not exist, so the insert fails
    let mut orphan = new_sale("B-2", &product, 1, Some("b@example.com"), PaymentStatus::Paid, now_local());
    orphan.product_id = product.id + 1000;
    let last = new_sale("B-3", &product, 2, Some("c@example.com"), PaymentStatus::Paid, now_local());

    let outcome = service()
        .record_batch(&db, OrderSource::Live, &[first, orphan, last])
        .await;

    assert_eq!(outcome.source, OrderSource::Live);
    assert_eq!(outcome.processed, 2);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.duplicates, 0);

    let order_ids: HashSet<String> = Sales::find()
        .all(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.order_id)
        .collect();
    assert_eq!(order_ids, HashSet::from(["B-1".to_string(), "B-3".to_string()]));

    // The failed sale left no side effects behind
    assert_eq!(ProfitSplits::find().count(&db).await.unwrap(), 2);
    let orphan_ltv = CustomerLtv::find()
        .filter(customer_ltv::Column::CustomerEmail.eq("b@example.com"))
        .one(&db)
        .await
        .unwrap();
    assert!(orphan_ltv.is_none());
}
