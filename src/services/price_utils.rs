//! Money helpers shared by pricing, sales and profit splitting.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round to currency precision (cents), half away from zero
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `amount * percentage / 100`, unrounded
pub fn percentage_of(amount: Decimal, percentage: Decimal) -> Decimal {
    amount * percentage / Decimal::ONE_HUNDRED
}

/// `(selling - base) / selling * 100`, rounded to cents. Zero when unpriced.
pub fn margin_percentage(selling_price: Decimal, base_price: Decimal) -> Decimal {
    if selling_price.is_zero() {
        return Decimal::ZERO;
    }
    round_cents((selling_price - base_price) / selling_price * Decimal::ONE_HUNDRED)
}

/// Build a decimal from an integer count of cents (or any 2dp unit)
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
