//! `SeaORM` Entity for products table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub sku: String,
    pub title: String,
    pub category: String,
    /// Keyword of the originating niche
    pub niche: String,
    /// Cost to produce
    pub base_price: Decimal,
    pub selling_price: Decimal,
    /// Percentage of selling price
    pub profit_margin: Decimal,
    pub trend_score: i32,
    /// active / paused / archived
    pub status: String,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sales::Entity")]
    Sales,
}

impl Related<super::sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
