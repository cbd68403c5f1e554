//! `SeaORM` Entity for daily_revenue table
//!
//! Recomputed from paid sales; never a source of truth.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_revenue")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub date: Date,
    pub total_sales: Decimal,
    pub total_orders: i32,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
    pub avg_order_value: Decimal,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
