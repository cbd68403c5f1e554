//! Sale records and the money invariants every sale must satisfy.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{AutomationError, AutomationResult};

/// Flat marketplace commission applied to every sale
pub const COMMISSION_RATE: Decimal = dec!(0.05);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Fulfilled,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Fulfilled => "fulfilled",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

/// Where the orders of a sync pass came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSource {
    Live,
    Simulated,
}

/// Money fields of a sale.
///
/// `total_amount = unit_price * quantity`,
/// `gross_profit = total_amount - cost_of_goods`,
/// `commission = COMMISSION_RATE * total_amount`,
/// `net_profit = gross_profit - commission`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleAmounts {
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub cost_of_goods: Decimal,
    pub gross_profit: Decimal,
    pub commission: Decimal,
    pub net_profit: Decimal,
}

impl SaleAmounts {
    pub fn compute(unit_price: Decimal, quantity: i32, cost_of_goods: Decimal) -> Self {
        let total_amount = unit_price * Decimal::from(quantity);
        let gross_profit = total_amount - cost_of_goods;
        let commission = total_amount * COMMISSION_RATE;

        Self {
            quantity,
            unit_price,
            total_amount,
            cost_of_goods,
            gross_profit,
            commission,
            net_profit: gross_profit - commission,
        }
    }

    /// Reject the record if any derived field does not reconcile.
    pub fn verify(&self) -> AutomationResult<()> {
        if self.quantity < 1 {
            return Err(AutomationError::InvariantViolation(format!(
                "quantity must be at least 1, got {}",
                self.quantity
            )));
        }
        if self.total_amount != self.unit_price * Decimal::from(self.quantity) {
            return Err(AutomationError::InvariantViolation(format!(
                "total {} != unit price {} x quantity {}",
                self.total_amount, self.unit_price, self.quantity
            )));
        }
        if self.gross_profit != self.total_amount - self.cost_of_goods {
            return Err(AutomationError::InvariantViolation(format!(
                "gross profit {} != total {} - cost {}",
                self.gross_profit, self.total_amount, self.cost_of_goods
            )));
        }
        if self.commission != self.total_amount * COMMISSION_RATE {
            return Err(AutomationError::InvariantViolation(format!(
                "commission {} != {} of total {}",
                self.commission, COMMISSION_RATE, self.total_amount
            )));
        }
        if self.net_profit != self.gross_profit - self.commission {
            return Err(AutomationError::InvariantViolation(format!(
                "net profit {} != gross {} - commission {}",
                self.net_profit, self.gross_profit, self.commission
            )));
        }
        Ok(())
    }
}

/// A normalized sale from either the live feed or the simulator
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub order_id: String,
    pub product_id: i32,
    /// Product title, carried into the profit ledger
    pub product_title: String,
    pub platform: String,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub amounts: SaleAmounts,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub order_date: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_amounts() {
        let amounts = SaleAmounts::compute(dec!(50), 2, dec!(40));
        assert_eq!(amounts.total_amount, dec!(100));
        assert_eq!(amounts.gross_profit, dec!(60));
        assert_eq!(amounts.commission, dec!(5));
        assert_eq!(amounts.net_profit, dec!(55));
        assert!(amounts.verify().is_ok());
    }

    #[test]
    fn test_commission_is_exact() {
        let amounts = SaleAmounts::compute(dec!(47.99), 1, dec!(18.37));
        assert_eq!(amounts.commission, dec!(2.3995));
        assert_eq!(
            amounts.net_profit,
            (amounts.total_amount - amounts.cost_of_goods) - amounts.commission
        );
        assert!(amounts.verify().is_ok());
    }

    #[test]
    fn test_verify_rejects_drift() {
        let mut amounts = SaleAmounts::compute(dec!(30), 1, dec!(12));
        amounts.net_profit += dec!(0.01);
        assert!(matches!(
            amounts.verify(),
            Err(AutomationError::InvariantViolation(_))
        ));

        let mut amounts = SaleAmounts::compute(dec!(30), 2, dec!(12));
        amounts.total_amount = dec!(61);
        assert!(amounts.verify().is_err());
    }

    #[test]
    fn test_verify_rejects_zero_quantity() {
        let amounts = SaleAmounts::compute(dec!(30), 0, dec!(0));
        assert!(amounts.verify().is_err());
    }
}
