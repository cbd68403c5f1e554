// src/lib.rs

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use config::AutomationConfig;
use services::{
    fulfillment::{FulfillmentProvider, PrintfulService},
    orchestrator::ProfitCycle,
    profit_allocator::ProfitAllocator,
    sampling::{SharedRng, shared_rng},
    trends::{GoogleTrendsService, TrendProvider},
};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub cycle: Arc<ProfitCycle>,
    pub allocator: ProfitAllocator,
    pub config: AutomationConfig,
}

impl AppState {
    /// Wire the live trend and fulfillment providers from configuration
    pub fn from_config(db: DatabaseConnection, config: AutomationConfig) -> Self {
        let trends = Arc::new(GoogleTrendsService::new(
            config.trends_base_url.clone(),
            config.provider_timeout,
        ));
        let fulfillment = Arc::new(PrintfulService::new(
            config.printful_api_key.clone(),
            config.printful_base_url.clone(),
            config.provider_timeout,
        ));
        let rng = shared_rng(config.rng_seed);

        Self::with_providers(db, config, trends, fulfillment, rng)
    }

    pub fn with_providers(
        db: DatabaseConnection,
        config: AutomationConfig,
        trends: Arc<dyn TrendProvider>,
        fulfillment: Arc<dyn FulfillmentProvider>,
        rng: SharedRng,
    ) -> Self {
        let cycle = Arc::new(ProfitCycle::new(
            db.clone(),
            config.clone(),
            trends,
            fulfillment,
            rng,
        ));

        Self {
            allocator: ProfitAllocator::new(config.team_profit_share_percentage),
            db,
            cycle,
            config,
        }
    }
}

pub mod entities {
    pub mod prelude;
    pub mod automation_runs;
    pub mod customer_ltv;
    pub mod daily_revenue;
    pub mod niches;
    pub mod products;
    pub mod profit_splits;
    pub mod sales;
    pub mod sync_status;
    pub mod team_pool;
    pub mod team_pool_contributions;
}

pub mod services {
    pub mod automation_log;
    pub mod customer_ltv;
    pub mod fulfillment;
    pub mod niche_scorer;
    pub mod orchestrator;
    pub mod order_sync;
    pub mod price_utils;
    pub mod product_synthesizer;
    pub mod profit_allocator;
    pub mod revenue_aggregator;
    pub mod sampling;
    pub mod sync_status;
    pub mod trends;
}

pub mod config;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
