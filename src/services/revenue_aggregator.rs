//! Revenue Aggregator
//!
//! The daily snapshot is recomputed from paid sales and replaced by date.
//! Running it any number of times for a day gives the same row.

use chrono::{Duration, Local, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;

use crate::entities::{daily_revenue, prelude::*, sales};
use crate::error::AutomationResult;
use crate::models::revenue::{DailyRevenueSnapshot, RevenueTotals};
use crate::models::sale::PaymentStatus;
use crate::services::price_utils::round_cents;

/// Fold sales into totals. Callers pass only the sales that should count.
pub fn compute_totals(rows: &[sales::Model]) -> RevenueTotals {
    let mut totals = rows.iter().fold(RevenueTotals::default(), |mut acc, sale| {
        acc.total_sales += sale.total_amount;
        acc.total_orders += 1;
        acc.total_cost += sale.cost_of_goods;
        acc.total_profit += sale.net_profit;
        acc
    });

    if totals.total_orders > 0 {
        totals.avg_order_value =
            round_cents(totals.total_sales / Decimal::from(totals.total_orders));
    }
    totals
}

/// Recompute and replace the snapshot for one server-local date
pub async fn aggregate_for_date(
    db: &DatabaseConnection,
    date: NaiveDate,
) -> AutomationResult<DailyRevenueSnapshot> {
    let start = date.and_time(NaiveTime::MIN);
    let end = start + Duration::days(1);

    let paid = Sales::find()
        .filter(sales::Column::PaymentStatus.eq(PaymentStatus::Paid.as_str()))
        .filter(sales::Column::OrderDate.gte(start))
        .filter(sales::Column::OrderDate.lt(end))
        .all(db)
        .await?;

    let totals = compute_totals(&paid);
    let now = Utc::now().naive_utc();

    let model = daily_revenue::ActiveModel {
        date: Set(date),
        total_sales: Set(totals.total_sales),
        total_orders: Set(totals.total_orders),
        total_cost: Set(totals.total_cost),
        total_profit: Set(totals.total_profit),
        avg_order_value: Set(totals.avg_order_value),
        updated_at: Set(now),
        ..Default::default()
    };

    DailyRevenue::insert(model)
        .on_conflict(
            OnConflict::column(daily_revenue::Column::Date)
                .update_columns([
                    daily_revenue::Column::TotalSales,
                    daily_revenue::Column::TotalOrders,
                    daily_revenue::Column::TotalCost,
                    daily_revenue::Column::TotalProfit,
                    daily_revenue::Column::AvgOrderValue,
                    daily_revenue::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    info!(
        date = %date,
        orders = totals.total_orders,
        sales = %totals.total_sales,
        profit = %totals.total_profit,
        "Aggregated daily revenue"
    );

    Ok(DailyRevenueSnapshot {
        date,
        total_sales: totals.total_sales,
        total_orders: totals.total_orders,
        total_cost: totals.total_cost,
        total_profit: totals.total_profit,
        avg_order_value: totals.avg_order_value,
        updated_at: now,
    })
}

pub async fn aggregate_today(db: &DatabaseConnection) -> AutomationResult<DailyRevenueSnapshot> {
    aggregate_for_date(db, Local::now().date_naive()).await
}

/// Stored snapshot for a date, if one was ever aggregated
pub async fn get_snapshot(
    db: &DatabaseConnection,
    date: NaiveDate,
) -> AutomationResult<Option<DailyRevenueSnapshot>> {
    Ok(DailyRevenue::find()
        .filter(daily_revenue::Column::Date.eq(date))
        .one(db)
        .await?
        .map(DailyRevenueSnapshot::from))
}
