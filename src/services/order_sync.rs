//! Order Sync / Simulator
//!
//! Live provider orders and synthetic orders are both normalized into
//! `NewSale` and go through the same `record_sale` path: insert-or-ignore by
//! order id, then the customer LTV update and the owner profit split, all in
//! one transaction.

use chrono::{Local, NaiveDateTime, TimeZone};
use rand::Rng;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::entities::{prelude::*, products, sales};
use crate::error::{AutomationError, AutomationResult};
use crate::models::product::ProductStatus;
use crate::models::profit::UserContext;
use crate::models::sale::{NewSale, OrderSource, OrderStatus, PaymentStatus, SaleAmounts};
use crate::services::customer_ltv;
use crate::services::fulfillment::ProviderOrder;
use crate::services::price_utils::round_cents;
use crate::services::profit_allocator::{ProfitAllocator, SaleOrigin};
use crate::services::sampling::{SharedRng, random_token};

/// Synthetic batch size, inclusive
const SYNTHETIC_ORDERS_MIN: usize = 5;
const SYNTHETIC_ORDERS_MAX: usize = 15;

/// Probability of a single-unit synthetic order
const SINGLE_UNIT_PROBABILITY: f64 = 0.7;

const SYNTHETIC_CUSTOMERS: u32 = 200;

const PLATFORMS: &[&str] = &["etsy", "shopify", "amazon", "ebay"];

const FIRST_NAMES: &[&str] = &[
    "Alex", "Jordan", "Taylor", "Morgan", "Casey", "Riley", "Sam", "Jamie",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Garcia", "Chen", "Patel", "Kim", "Nguyen", "Brown", "Silva",
];

/// Result of one sync pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSyncOutcome {
    pub source: OrderSource,
    /// Sales inserted by this pass
    pub processed: usize,
    /// Orders already present by order id
    pub duplicates: usize,
    /// Orders that could not be normalized or were rejected
    pub skipped: usize,
}

impl OrderSyncOutcome {
    fn empty(source: OrderSource) -> Self {
        Self {
            source,
            processed: 0,
            duplicates: 0,
            skipped: 0,
        }
    }
}

/// Map a fulfillment status onto our order and payment status
pub fn map_provider_status(status: &str) -> (OrderStatus, PaymentStatus) {
    match status.to_lowercase().as_str() {
        "canceled" | "cancelled" | "failed" => (OrderStatus::Cancelled, PaymentStatus::Refunded),
        "draft" | "pending" | "inreview" | "onhold" => {
            (OrderStatus::Pending, PaymentStatus::Pending)
        }
        _ => (OrderStatus::Fulfilled, PaymentStatus::Paid),
    }
}

/// Normalize a provider order against the product its first item references.
///
/// Amounts fall back to the product's catalog price and base cost when the
/// provider omits totals.
pub fn normalize_provider_order(order: &ProviderOrder, product: &products::Model) -> NewSale {
    let quantity = order
        .items
        .iter()
        .map(|item| item.quantity.max(0))
        .fold(0i32, i32::saturating_add)
        .max(1);
    let qty = Decimal::from(quantity);

    let retail_total = order
        .retail_costs
        .total
        .unwrap_or(product.selling_price * qty);
    let cost_of_goods = order.costs.total.unwrap_or(product.base_price * qty);
    let unit_price = round_cents(retail_total / qty);
    if unit_price * qty != retail_total {
        debug!(
            order_id = order.id,
            retail_total = %retail_total,
            recorded_total = %(unit_price * qty),
            "Provider total does not split evenly into cents, using rounded unit price"
        );
    }

    let (order_status, payment_status) = map_provider_status(&order.status);

    let order_date = order
        .created
        .and_then(|ts| Local.timestamp_opt(ts, 0).single())
        .map(|dt| dt.naive_local())
        .unwrap_or_else(|| Local::now().naive_local());

    NewSale {
        order_id: format!("printful-{}", order.id),
        product_id: product.id,
        product_title: product.title.clone(),
        platform: "printful".to_string(),
        customer_email: order.recipient.email.clone(),
        customer_name: order.recipient.name.clone(),
        amounts: SaleAmounts::compute(unit_price, quantity, cost_of_goods),
        order_status,
        payment_status,
        order_date,
    }
}

#[derive(Clone)]
pub struct OrderSyncService {
    rng: SharedRng,
    allocator: ProfitAllocator,
    owner_id: String,
}

impl OrderSyncService {
    pub fn new(rng: SharedRng, allocator: ProfitAllocator, owner_id: String) -> Self {
        Self {
            rng,
            allocator,
            owner_id,
        }
    }

    /// Normalize and record a batch of live orders
    pub async fn sync_live(
        &self,
        db: &DatabaseConnection,
        orders: &[ProviderOrder],
    ) -> AutomationResult<OrderSyncOutcome> {
        let skus: Vec<String> = orders
            .iter()
            .filter_map(|o| o.items.first().and_then(|i| i.sku.clone()))
            .collect();
        let catalog: HashMap<String, products::Model> = Products::find()
            .filter(products::Column::Sku.is_in(skus))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.sku.clone(), p))
            .collect();

        let mut unmatched = 0;
        let mut sales = Vec::with_capacity(orders.len());
        for order in orders {
            let product = order
                .items
                .first()
                .and_then(|item| item.sku.as_deref())
                .and_then(|sku| catalog.get(sku));

            let Some(product) = product else {
                warn!(order_id = order.id, "Skipping order with no matching product SKU");
                unmatched += 1;
                continue;
            };

            sales.push(normalize_provider_order(order, product));
        }

        let mut outcome = self.record_batch(db, OrderSource::Live, &sales).await;
        outcome.skipped += unmatched;

        info!(
            processed = outcome.processed,
            duplicates = outcome.duplicates,
            skipped = outcome.skipped,
            "Synced live orders"
        );

        Ok(outcome)
    }

    /// Generate and record a synthetic batch from active products.
    ///
    /// Zero active products is a no-op.
    pub async fn simulate(&self, db: &DatabaseConnection) -> AutomationResult<OrderSyncOutcome> {
        let sales = self.generate_synthetic_orders(db).await?;
        if sales.is_empty() {
            info!("No active products, nothing to simulate");
            return Ok(OrderSyncOutcome::empty(OrderSource::Simulated));
        }

        let outcome = self.record_batch(db, OrderSource::Simulated, &sales).await;

        info!(
            processed = outcome.processed,
            duplicates = outcome.duplicates,
            skipped = outcome.skipped,
            "Simulated orders"
        );

        Ok(outcome)
    }

    /// Sample 5 to 15 paid orders against randomly chosen active products
    pub async fn generate_synthetic_orders(
        &self,
        db: &DatabaseConnection,
    ) -> AutomationResult<Vec<NewSale>> {
        let active = Products::find()
            .filter(products::Column::Status.eq(ProductStatus::Active.as_str()))
            .order_by_asc(products::Column::Id)
            .all(db)
            .await?;

        if active.is_empty() {
            return Ok(Vec::new());
        }

        let now = Local::now().naive_local();
        let millis = now.and_utc().timestamp_millis();

        let mut rng = self.rng.lock();
        let count = rng.gen_range(SYNTHETIC_ORDERS_MIN..=SYNTHETIC_ORDERS_MAX);

        let mut sales = Vec::with_capacity(count);
        for idx in 0..count {
            let Some(product) = active.choose(&mut *rng) else {
                break;
            };
            let quantity = if rng.gen_bool(SINGLE_UNIT_PROBABILITY) { 1 } else { 2 };
            let cost = product.base_price * Decimal::from(quantity);

            let customer = rng.gen_range(1..=SYNTHETIC_CUSTOMERS);
            let first = FIRST_NAMES.choose(&mut *rng).copied().unwrap_or("Alex");
            let last = LAST_NAMES.choose(&mut *rng).copied().unwrap_or("Smith");
            let platform = PLATFORMS.choose(&mut *rng).copied().unwrap_or("etsy");

            sales.push(NewSale {
                order_id: format!("SIM-{}-{}-{}", millis, idx, random_token(&mut *rng, 6)),
                product_id: product.id,
                product_title: product.title.clone(),
                platform: platform.to_string(),
                customer_email: Some(format!("customer{}@example.com", customer)),
                customer_name: Some(format!("{} {}", first, last)),
                amounts: SaleAmounts::compute(product.selling_price, quantity, cost),
                order_status: OrderStatus::Processing,
                payment_status: PaymentStatus::Paid,
                order_date: now,
            });
        }
        drop(rng);

        debug!(count = sales.len(), products = active.len(), "Generated synthetic orders");
        Ok(sales)
    }

    /// Insert a sale once by order id and run its side effects.
    ///
    /// Returns `false` when the order id already exists; nothing else is
    /// written in that case.
    pub async fn record_sale(
        &self,
        db: &DatabaseConnection,
        sale: &NewSale,
    ) -> AutomationResult<bool> {
        sale.amounts.verify()?;

        let txn = db.begin().await?;
        match self.write_sale(&txn, sale).await {
            Ok(true) => {
                txn.commit().await?;
                Ok(true)
            }
            Ok(false) => {
                txn.rollback().await?;
                debug!(order_id = %sale.order_id, "Order already recorded");
                Ok(false)
            }
            Err(e) => {
                txn.rollback().await?;
                Err(e)
            }
        }
    }

    /// Record a batch one sale at a time. A sale that fails is logged and
    /// counted as skipped; the rest of the batch still lands.
    pub async fn record_batch(
        &self,
        db: &DatabaseConnection,
        source: OrderSource,
        sales: &[NewSale],
    ) -> OrderSyncOutcome {
        let mut outcome = OrderSyncOutcome::empty(source);

        for sale in sales {
            match self.record_sale(db, sale).await {
                Ok(true) => outcome.processed += 1,
                Ok(false) => outcome.duplicates += 1,
                Err(AutomationError::InvariantViolation(reason)) => {
                    warn!(order_id = %sale.order_id, %reason, "Rejected sale");
                    outcome.skipped += 1;
                }
                Err(e) => {
                    warn!(order_id = %sale.order_id, error = %e, "Failed to record sale, skipping");
                    outcome.skipped += 1;
                }
            }
        }

        outcome
    }

    /// Sale row, LTV and owner split; `false` when the order id exists
    async fn write_sale(
        &self,
        txn: &DatabaseTransaction,
        sale: &NewSale,
    ) -> AutomationResult<bool> {
        let inserted = Sales::insert(sale_active_model(sale, Local::now().naive_local()))
            .on_conflict(
                OnConflict::column(sales::Column::OrderId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;

        if inserted == 0 {
            return Ok(false);
        }

        customer_ltv::record_purchase(txn, sale).await?;

        let owner = UserContext::Owner {
            user_id: self.owner_id.clone(),
        };
        let split = self.allocator.allocate(
            &owner,
            sale.amounts.total_amount,
            sale.amounts.cost_of_goods,
        )?;
        self.allocator
            .persist(
                txn,
                &split,
                SaleOrigin {
                    product_name: &sale.product_title,
                    platform: &sale.platform,
                    order_id: Some(&sale.order_id),
                },
            )
            .await?;

        Ok(true)
    }
}

fn sale_active_model(sale: &NewSale, created_at: NaiveDateTime) -> sales::ActiveModel {
    let amounts = &sale.amounts;
    sales::ActiveModel {
        order_id: Set(sale.order_id.clone()),
        product_id: Set(sale.product_id),
        platform: Set(sale.platform.clone()),
        customer_email: Set(sale.customer_email.clone()),
        customer_name: Set(sale.customer_name.clone()),
        quantity: Set(amounts.quantity),
        unit_price: Set(amounts.unit_price),
        total_amount: Set(amounts.total_amount),
        cost_of_goods: Set(amounts.cost_of_goods),
        gross_profit: Set(amounts.gross_profit),
        commission: Set(amounts.commission),
        net_profit: Set(amounts.net_profit),
        order_status: Set(sale.order_status.as_str().to_string()),
        payment_status: Set(sale.payment_status.as_str().to_string()),
        order_date: Set(sale.order_date),
        created_at: Set(created_at),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fulfillment::{ProviderCosts, ProviderOrderItem, ProviderRecipient};
    use rust_decimal_macros::dec;

    fn product() -> products::Model {
        products::Model {
            id: 7,
            sku: "POD-1-ABCDEF".to_string(),
            title: "Retro Gaming Hoodie".to_string(),
            category: "gaming".to_string(),
            niche: "retro gaming".to_string(),
            base_price: dec!(18.50),
            selling_price: dec!(47),
            profit_margin: dec!(60.64),
            trend_score: 72,
            status: "active".to_string(),
            created_at: Local::now().naive_local(),
        }
    }

    fn order(quantity: i32, retail: Option<Decimal>, cost: Option<Decimal>) -> ProviderOrder {
        ProviderOrder {
            id: 1001,
            status: "fulfilled".to_string(),
            created: Some(1_700_000_000),
            recipient: ProviderRecipient {
                name: Some("Pat Doe".to_string()),
                email: Some("pat@example.com".to_string()),
            },
            items: vec![ProviderOrderItem {
                sku: Some("POD-1-ABCDEF".to_string()),
                name: None,
                quantity,
            }],
            costs: ProviderCosts { total: cost },
            retail_costs: ProviderCosts { total: retail },
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            map_provider_status("canceled"),
            (OrderStatus::Cancelled, PaymentStatus::Refunded)
        );
        assert_eq!(
            map_provider_status("inreview"),
            (OrderStatus::Pending, PaymentStatus::Pending)
        );
        assert_eq!(
            map_provider_status("fulfilled"),
            (OrderStatus::Fulfilled, PaymentStatus::Paid)
        );
    }

    #[test]
    fn test_normalize_uses_provider_totals() {
        let sale = normalize_provider_order(&order(2, Some(dec!(90)), Some(dec!(36))), &product());

        assert_eq!(sale.order_id, "printful-1001");
        assert_eq!(sale.amounts.quantity, 2);
        assert_eq!(sale.amounts.unit_price, dec!(45));
        assert_eq!(sale.amounts.total_amount, dec!(90));
        assert_eq!(sale.amounts.cost_of_goods, dec!(36));
        assert_eq!(sale.amounts.commission, dec!(4.5));
        assert_eq!(sale.amounts.net_profit, dec!(49.5));
        assert_eq!(sale.customer_email.as_deref(), Some("pat@example.com"));
        assert!(sale.amounts.verify().is_ok());
    }

    #[test]
    fn test_normalize_falls_back_to_catalog_prices() {
        let sale = normalize_provider_order(&order(1, None, None), &product());

        assert_eq!(sale.amounts.unit_price, dec!(47));
        assert_eq!(sale.amounts.cost_of_goods, dec!(18.50));
        assert_eq!(sale.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_normalize_rounds_uneven_unit_price() {
        let sale = normalize_provider_order(&order(3, Some(dec!(100)), Some(dec!(30))), &product());

        assert_eq!(sale.amounts.unit_price, dec!(33.33));
        assert_eq!(sale.amounts.total_amount, dec!(99.99));
        assert!(sale.amounts.verify().is_ok());
    }

    #[test]
    fn test_normalize_saturates_huge_quantities() {
        let mut huge = order(i32::MAX, Some(dec!(100)), Some(dec!(30)));
        huge.items.push(huge.items[0].clone());

        let sale = normalize_provider_order(&huge, &product());

        assert_eq!(sale.amounts.quantity, i32::MAX);
        assert!(sale.amounts.verify().is_ok());
    }
}
