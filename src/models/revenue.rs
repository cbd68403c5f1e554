use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::daily_revenue;

/// Totals over one day's paid sales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RevenueTotals {
    pub total_sales: Decimal,
    pub total_orders: i32,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
    pub avg_order_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRevenueSnapshot {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_sales: Decimal,
    pub total_orders: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_profit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_order_value: Decimal,
    pub updated_at: NaiveDateTime,
}

impl From<daily_revenue::Model> for DailyRevenueSnapshot {
    fn from(model: daily_revenue::Model) -> Self {
        Self {
            date: model.date,
            total_sales: model.total_sales,
            total_orders: model.total_orders,
            total_cost: model.total_cost,
            total_profit: model.total_profit,
            avg_order_value: model.avg_order_value,
            updated_at: model.updated_at,
        }
    }
}
