//! `SeaORM` Entity for customer_ltv table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "customer_ltv")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub customer_email: String,
    pub customer_name: Option<String>,
    pub total_orders: i32,
    pub total_spent: Decimal,
    pub total_profit: Decimal,
    pub avg_order_value: Decimal,
    /// min(100, total_spent / 10)
    pub ltv_score: Decimal,
    pub first_purchase: DateTime,
    pub last_purchase: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
