//! Customer lifetime value tracking, keyed by email.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::entities::{customer_ltv, prelude::*};
use crate::error::AutomationResult;
use crate::models::sale::NewSale;
use crate::services::price_utils::round_cents;

const LTV_SCORE_CAP: Decimal = dec!(100);

/// `min(100, total_spent / 10)`
pub fn ltv_score(total_spent: Decimal) -> Decimal {
    round_cents(total_spent / dec!(10)).min(LTV_SCORE_CAP)
}

pub fn avg_order_value(total_spent: Decimal, total_orders: i32) -> Decimal {
    if total_orders <= 0 {
        return Decimal::ZERO;
    }
    round_cents(total_spent / Decimal::from(total_orders))
}

/// Fold one sale into the customer's running totals.
///
/// Totals are incremented with column expressions so concurrent sales for
/// the same customer add up; derived fields are then recomputed from the
/// stored totals. Sales without an email are ignored.
pub async fn record_purchase<C: ConnectionTrait>(
    conn: &C,
    sale: &NewSale,
) -> AutomationResult<Option<customer_ltv::Model>> {
    let Some(email) = sale.customer_email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    else {
        return Ok(None);
    };
    let email = email.to_lowercase();

    seed_customer(conn, &email, sale.customer_name.clone(), sale.order_date).await?;

    CustomerLtv::update_many()
        .col_expr(
            customer_ltv::Column::TotalOrders,
            Expr::col(customer_ltv::Column::TotalOrders).add(1),
        )
        .col_expr(
            customer_ltv::Column::TotalSpent,
            Expr::col(customer_ltv::Column::TotalSpent).add(sale.amounts.total_amount),
        )
        .col_expr(
            customer_ltv::Column::TotalProfit,
            Expr::col(customer_ltv::Column::TotalProfit).add(sale.amounts.net_profit),
        )
        .col_expr(
            customer_ltv::Column::LastPurchase,
            Expr::value(sale.order_date),
        )
        .filter(customer_ltv::Column::CustomerEmail.eq(email.as_str()))
        .exec(conn)
        .await?;

    let Some(current) = CustomerLtv::find()
        .filter(customer_ltv::Column::CustomerEmail.eq(email.as_str()))
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    let avg = avg_order_value(current.total_spent, current.total_orders);
    let score = ltv_score(current.total_spent);

    CustomerLtv::update_many()
        .col_expr(customer_ltv::Column::AvgOrderValue, Expr::value(avg))
        .col_expr(customer_ltv::Column::LtvScore, Expr::value(score))
        .filter(customer_ltv::Column::Id.eq(current.id))
        .exec(conn)
        .await?;

    Ok(Some(customer_ltv::Model {
        avg_order_value: avg,
        ltv_score: score,
        ..current
    }))
}

/// Zero-total row for a first-time customer; no-op when it already exists
async fn seed_customer<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    name: Option<String>,
    first_purchase: NaiveDateTime,
) -> AutomationResult<()> {
    let model = customer_ltv::ActiveModel {
        customer_email: Set(email.to_string()),
        customer_name: Set(name),
        total_orders: Set(0),
        total_spent: Set(Decimal::ZERO),
        total_profit: Set(Decimal::ZERO),
        avg_order_value: Set(Decimal::ZERO),
        ltv_score: Set(Decimal::ZERO),
        first_purchase: Set(first_purchase),
        last_purchase: Set(first_purchase),
        ..Default::default()
    };

    CustomerLtv::insert(model)
        .on_conflict(
            OnConflict::column(customer_ltv::Column::CustomerEmail)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(())
}
