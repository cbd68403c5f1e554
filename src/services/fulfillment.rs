//! Fulfillment provider
//!
//! `FulfillmentProvider` returns either the live order list or a
//! `ProviderError`; the orchestrator decides to simulate on the error.
//! `PrintfulService` is the live implementation.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ProviderError;

const PROVIDER: &str = "printful";

#[async_trait]
pub trait FulfillmentProvider: Send + Sync {
    async fn fetch_orders(&self) -> Result<Vec<ProviderOrder>, ProviderError>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecipient {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderOrderItem {
    /// Our product SKU, as sent when the order was placed
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderCosts {
    /// Printful sends totals as strings ("25.00")
    #[serde(default)]
    pub total: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderOrder {
    pub id: i64,
    #[serde(default)]
    pub status: String,
    /// Unix timestamp
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub recipient: ProviderRecipient,
    #[serde(default)]
    pub items: Vec<ProviderOrderItem>,
    #[serde(default)]
    pub costs: ProviderCosts,
    #[serde(default)]
    pub retail_costs: ProviderCosts,
}

#[derive(Debug, Deserialize)]
struct OrdersResponse {
    #[serde(default)]
    result: Vec<ProviderOrder>,
}

#[derive(Clone)]
pub struct PrintfulService {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl PrintfulService {
    pub fn new(api_key: Option<String>, base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl FulfillmentProvider for PrintfulService {
    async fn fetch_orders(&self) -> Result<Vec<ProviderOrder>, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ProviderError::MissingCredentials { provider: PROVIDER });
        };

        tracing::info!("Fetching orders from Printful");

        let url = format!("{}/orders", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .bearer_auth(api_key)
            .query(&[("limit", "100")])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status,
                body,
            });
        }

        let data: OrdersResponse = response.json().await.map_err(|e| ProviderError::Decode {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

        tracing::info!("Fetched {} orders from Printful", data.result.len());

        Ok(data.result)
    }
}
