//! `SeaORM` Entity for sales table
//!
//! One row per order event, unique by `order_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub order_id: String,
    pub product_id: i32,
    pub platform: String,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub cost_of_goods: Decimal,
    pub gross_profit: Decimal,
    pub commission: Decimal,
    pub net_profit: Decimal,
    pub order_status: String,
    pub payment_status: String,
    /// Server-local time of the order
    pub order_date: DateTime,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id"
    )]
    Product,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
