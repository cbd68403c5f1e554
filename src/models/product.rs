use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Paused,
    Archived,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Paused => "paused",
            ProductStatus::Archived => "archived",
        }
    }
}

/// Pricing fixed at product creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductPricing {
    pub base_price: Decimal,
    pub markup: Decimal,
    pub selling_price: Decimal,
    pub profit_margin: Decimal,
}
