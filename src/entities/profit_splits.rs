//! `SeaORM` Entity for profit_splits table
//!
//! Per-user-type sales ledger. Invariant: `user_profit + team_share == gross_profit`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "profit_splits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// owner / client / team
    pub user_type: String,
    pub user_id: String,
    /// Set when the split was produced by order sync
    pub order_id: Option<String>,
    pub product_name: String,
    pub platform: String,
    pub sale_price: Decimal,
    pub cost: Decimal,
    pub gross_profit: Decimal,
    pub team_share: Decimal,
    pub user_profit: Decimal,
    pub profit_share_percentage: Decimal,
    pub retained_percentage: Decimal,
    pub recorded_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::team_pool_contributions::Entity")]
    Contributions,
}

impl Related<super::team_pool_contributions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
