//! `SeaORM` Entity for niches table
//!
//! Scored keyword opportunities. Upserted by keyword on every scoring pass.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "niches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub keyword: String,
    pub search_volume: i64,
    /// low / medium / high
    pub competition_level: String,
    pub trend_direction: String,
    /// 0-100
    pub profit_potential: i32,
    pub products_created: i32,
    /// active / saturated / expired
    pub status: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
