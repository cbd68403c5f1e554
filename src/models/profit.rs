//! Profit split models
//!
//! Owners and clients keep 100% of gross profit. Team members deduct a share
//! into the shared team pool.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::{profit_splits, team_pool_contributions};
use crate::services::price_utils::round_cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Owner,
    Client,
    Team,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Owner => "owner",
            UserType::Client => "client",
            UserType::Team => "team",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "owner" => Some(UserType::Owner),
            "client" => Some(UserType::Client),
            "team" => Some(UserType::Team),
            _ => None,
        }
    }
}

/// Who a sale is recorded for. Each variant carries only what it needs.
///
/// ```json
/// { "type": "team", "memberId": "alice", "profitSharePercentage": 25 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum UserContext {
    Owner {
        user_id: String,
    },
    Client {
        user_id: String,
    },
    Team {
        member_id: String,
        /// Falls back to the process-level default when absent
        #[serde(default)]
        profit_share_percentage: Option<Decimal>,
    },
}

impl UserContext {
    pub fn user_type(&self) -> UserType {
        match self {
            UserContext::Owner { .. } => UserType::Owner,
            UserContext::Client { .. } => UserType::Client,
            UserContext::Team { .. } => UserType::Team,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            UserContext::Owner { user_id } | UserContext::Client { user_id } => user_id,
            UserContext::Team { member_id, .. } => member_id,
        }
    }
}

/// Result of splitting one sale's gross profit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfitSplit {
    pub user_type: UserType,
    pub user_id: String,
    pub sale_price: Decimal,
    pub cost: Decimal,
    pub gross_profit: Decimal,
    pub team_share: Decimal,
    pub user_profit: Decimal,
    /// Percentage deducted into the pool (0 for owner/client)
    pub profit_share_percentage: Decimal,
    pub retained_percentage: Decimal,
}

/// Body of POST /api/sales
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSaleRequest {
    pub product_name: String,
    pub sale_price: Decimal,
    pub cost: Decimal,
    pub platform: String,
    pub user_type: UserContext,
}

impl RecordSaleRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.product_name.trim().is_empty() {
            return Err("productName cannot be empty".to_string());
        }
        if self.platform.trim().is_empty() {
            return Err("platform cannot be empty".to_string());
        }
        if self.sale_price < Decimal::ZERO {
            return Err("salePrice cannot be negative".to_string());
        }
        if self.cost < Decimal::ZERO {
            return Err("cost cannot be negative".to_string());
        }
        if self.user_type.user_id().trim().is_empty() {
            return Err("user id cannot be empty".to_string());
        }
        Ok(())
    }
}

/// A persisted split, as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitSplitRecord {
    pub id: i32,
    pub user_type: UserType,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub product_name: String,
    pub platform: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub sale_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gross_profit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub team_share: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub user_profit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub profit_share_percentage: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub profit_percentage_retained_by_user: Decimal,
    pub recorded_at: NaiveDateTime,
}

impl ProfitSplitRecord {
    pub fn from_model(model: profit_splits::Model) -> Option<Self> {
        Some(Self {
            id: model.id,
            user_type: UserType::from_str(&model.user_type)?,
            user_id: model.user_id,
            order_id: model.order_id,
            product_name: model.product_name,
            platform: model.platform,
            sale_price: model.sale_price,
            cost: model.cost,
            gross_profit: model.gross_profit,
            team_share: model.team_share,
            user_profit: model.user_profit,
            profit_share_percentage: model.profit_share_percentage,
            profit_percentage_retained_by_user: model.retained_percentage,
            recorded_at: model.recorded_at,
        })
    }
}

/// Query parameters for GET /api/sales/ledger
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerQuery {
    pub user_type: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerResponse {
    pub user_type: UserType,
    pub user_id: String,
    pub sales: Vec<ProfitSplitRecord>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_user_profit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_team_share: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolContribution {
    pub contributor_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub split_id: i32,
    pub contributed_at: NaiveDateTime,
}

impl From<team_pool_contributions::Model> for PoolContribution {
    fn from(model: team_pool_contributions::Model) -> Self {
        Self {
            contributor_id: model.contributor_id,
            amount: round_cents(model.amount),
            split_id: model.split_id,
            contributed_at: model.contributed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPoolSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub pool_total: Decimal,
    pub contribution_count: i64,
    pub recent_contributions: Vec<PoolContribution>,
}
