#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, DbErr, Set};
use sea_orm_migration::MigratorTrait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use profit_automation::AppState;
use profit_automation::config::AutomationConfig;
use profit_automation::entities::products;
use profit_automation::error::ProviderError;
use profit_automation::models::niche::TrendSignal;
use profit_automation::models::sale::{NewSale, OrderStatus, PaymentStatus, SaleAmounts};
use profit_automation::services::fulfillment::{
    FulfillmentProvider, ProviderCosts, ProviderOrder, ProviderOrderItem, ProviderRecipient,
};
use profit_automation::services::sampling::shared_rng;
use profit_automation::services::trends::TrendProvider;

pub const TEST_SEED: u64 = 42;

/// Fresh in-memory SQLite database with all migrations applied.
///
/// A single pooled connection keeps every query on the same in-memory
/// database.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Defaults with no delays, one category, a fixed seed and no scheduler
pub fn test_config() -> AutomationConfig {
    AutomationConfig {
        trend_categories: vec!["all".to_string()],
        rate_limit_delay: Duration::ZERO,
        provider_timeout: Duration::from_secs(2),
        stage_timeout: Duration::from_secs(10),
        scheduler_enabled: false,
        rng_seed: Some(TEST_SEED),
        ..AutomationConfig::default()
    }
}

pub fn test_state(
    db: DatabaseConnection,
    config: AutomationConfig,
    trends: FakeTrendProvider,
    fulfillment: FakeFulfillmentProvider,
) -> AppState {
    let rng = shared_rng(config.rng_seed);
    AppState::with_providers(db, config, Arc::new(trends), Arc::new(fulfillment), rng)
}

pub fn signal(keyword: &str, traffic: &str) -> TrendSignal {
    TrendSignal {
        keyword: keyword.to_string(),
        formatted_traffic: traffic.to_string(),
    }
}

/// Trend provider with canned signals per category
#[derive(Default)]
pub struct FakeTrendProvider {
    signals: HashMap<String, Vec<TrendSignal>>,
    failing: Vec<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeTrendProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signals(mut self, category: &str, signals: Vec<TrendSignal>) -> Self {
        self.signals.insert(category.to_string(), signals);
        self
    }

    pub fn failing_for(mut self, category: &str) -> Self {
        self.failing.push(category.to_string());
        self
    }

    /// Sleep before answering, to exercise timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrendProvider for FakeTrendProvider {
    async fn fetch_trends(
        &self,
        category: &str,
        _geo: &str,
    ) -> Result<Vec<TrendSignal>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.iter().any(|c| c == category) {
            return Err(ProviderError::Status {
                provider: "fake_trends",
                status: 503,
                body: "unavailable".to_string(),
            });
        }

        Ok(self.signals.get(category).cloned().unwrap_or_default())
    }
}

pub enum FakeFulfillmentProvider {
    /// No credentials configured
    Unconfigured,
    /// Upstream failure
    Failing,
    Orders(Vec<ProviderOrder>),
}

#[async_trait]
impl FulfillmentProvider for FakeFulfillmentProvider {
    async fn fetch_orders(&self) -> Result<Vec<ProviderOrder>, ProviderError> {
        match self {
            FakeFulfillmentProvider::Unconfigured => {
                Err(ProviderError::MissingCredentials { provider: "fake_fulfillment" })
            }
            FakeFulfillmentProvider::Failing => Err(ProviderError::Status {
                provider: "fake_fulfillment",
                status: 500,
                body: "internal error".to_string(),
            }),
            FakeFulfillmentProvider::Orders(orders) => Ok(orders.clone()),
        }
    }
}

pub fn provider_order(id: i64, sku: &str, quantity: i32, retail: Decimal, cost: Decimal) -> ProviderOrder {
    ProviderOrder {
        id,
        status: "fulfilled".to_string(),
        created: None,
        recipient: ProviderRecipient {
            name: Some("Pat Doe".to_string()),
            email: Some("pat@example.com".to_string()),
        },
        items: vec![ProviderOrderItem {
            sku: Some(sku.to_string()),
            name: None,
            quantity,
        }],
        costs: ProviderCosts { total: Some(cost) },
        retail_costs: ProviderCosts { total: Some(retail) },
    }
}

pub async fn seed_product(
    db: &DatabaseConnection,
    sku: &str,
    base_price: Decimal,
    selling_price: Decimal,
    status: &str,
) -> products::Model {
    products::ActiveModel {
        sku: Set(sku.to_string()),
        title: Set(format!("{} Tee", sku)),
        category: Set("general".to_string()),
        niche: Set(sku.to_lowercase()),
        base_price: Set(base_price),
        selling_price: Set(selling_price),
        profit_margin: Set(Decimal::ZERO),
        trend_score: Set(50),
        status: Set(status.to_string()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed product")
}

pub fn new_sale(
    order_id: &str,
    product: &products::Model,
    quantity: i32,
    email: Option<&str>,
    payment_status: PaymentStatus,
    order_date: NaiveDateTime,
) -> NewSale {
    let cost = product.base_price * Decimal::from(quantity);
    NewSale {
        order_id: order_id.to_string(),
        product_id: product.id,
        product_title: product.title.clone(),
        platform: "etsy".to_string(),
        customer_email: email.map(str::to_string),
        customer_name: email.map(|_| "Test Customer".to_string()),
        amounts: SaleAmounts::compute(product.selling_price, quantity, cost),
        order_status: OrderStatus::Processing,
        payment_status,
        order_date,
    }
}

pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}
