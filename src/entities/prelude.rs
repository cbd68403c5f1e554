//! `SeaORM` Entity prelude

pub use super::automation_runs::Entity as AutomationRuns;
pub use super::customer_ltv::Entity as CustomerLtv;
pub use super::daily_revenue::Entity as DailyRevenue;
pub use super::niches::Entity as Niches;
pub use super::products::Entity as Products;
pub use super::profit_splits::Entity as ProfitSplits;
pub use super::sales::Entity as Sales;
pub use super::sync_status::Entity as SyncStatus;
pub use super::team_pool::Entity as TeamPool;
pub use super::team_pool_contributions::Entity as TeamPoolContributions;
