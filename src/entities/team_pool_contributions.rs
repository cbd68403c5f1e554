//! `SeaORM` Entity for team_pool_contributions table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "team_pool_contributions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub contributor_id: String,
    pub split_id: i32,
    pub amount: Decimal,
    pub contributed_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profit_splits::Entity",
        from = "Column::SplitId",
        to = "super::profit_splits::Column::Id"
    )]
    Split,
}

impl Related<super::profit_splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Split.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
