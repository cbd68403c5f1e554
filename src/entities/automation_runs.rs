//! `SeaORM` Entity for automation_runs table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "automation_runs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub run_type: String,
    pub items_processed: i32,
    pub duration_ms: i64,
    pub success: bool,
    pub error: Option<String>,
    pub started_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
