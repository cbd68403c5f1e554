pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_niches;
mod m20261001_000002_create_products;
mod m20261002_000001_create_sales;
mod m20261002_000002_create_customer_ltv;
mod m20261003_000001_create_daily_revenue;
mod m20261005_000001_create_profit_ledger;
mod m20261007_000001_create_automation_runs;
mod m20261007_000002_create_sync_status;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_niches::Migration),
            Box::new(m20261001_000002_create_products::Migration),
            Box::new(m20261002_000001_create_sales::Migration),
            Box::new(m20261002_000002_create_customer_ltv::Migration),
            Box::new(m20261003_000001_create_daily_revenue::Migration),
            Box::new(m20261005_000001_create_profit_ledger::Migration),
            Box::new(m20261007_000001_create_automation_runs::Migration),
            Box::new(m20261007_000002_create_sync_status::Migration),
        ]
    }
}
