//! Trend-signal provider
//!
//! The core only needs `{keyword, formattedTraffic}` pairs per category; the
//! `TrendProvider` trait is the seam. `GoogleTrendsService` is the live
//! implementation against the daily-trends endpoint.

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ProviderError;
use crate::models::niche::TrendSignal;

const PROVIDER: &str = "google_trends";

/// Google prefixes JSON responses with this to defeat JSON hijacking
const ANTI_HIJACK_PREFIX: &str = ")]}',";

#[async_trait]
pub trait TrendProvider: Send + Sync {
    /// Fetch trending searches for one category key in one geography
    async fn fetch_trends(&self, category: &str, geo: &str)
        -> Result<Vec<TrendSignal>, ProviderError>;
}

#[derive(Clone)]
pub struct GoogleTrendsService {
    client: Client,
    base_url: String,
    cache: Arc<Cache<String, Vec<TrendSignal>>>,
}

#[derive(Debug, Deserialize)]
struct DailyTrendsResponse {
    default: DailyTrendsDefault,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyTrendsDefault {
    #[serde(default)]
    trending_searches_days: Vec<TrendingDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrendingDay {
    #[serde(default)]
    trending_searches: Vec<TrendingSearch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrendingSearch {
    title: TrendingTitle,
    #[serde(default)]
    formatted_traffic: String,
}

#[derive(Debug, Deserialize)]
struct TrendingTitle {
    query: String,
}

impl GoogleTrendsService {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(64) // One entry per (category, geo)
            .time_to_live(Duration::from_secs(3600)) // 1 hour TTL
            .build();

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url,
            cache: Arc::new(cache),
        }
    }

    /// Parse a daily-trends payload into signals
    fn parse_daily_trends(body: &str) -> Result<Vec<TrendSignal>, ProviderError> {
        let json = body
            .trim_start()
            .strip_prefix(ANTI_HIJACK_PREFIX)
            .unwrap_or(body);

        let data: DailyTrendsResponse =
            serde_json::from_str(json.trim()).map_err(|e| ProviderError::Decode {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        Ok(data
            .default
            .trending_searches_days
            .into_iter()
            .flat_map(|day| day.trending_searches)
            .map(|search| TrendSignal {
                keyword: search.title.query,
                formatted_traffic: search.formatted_traffic,
            })
            .collect())
    }
}

#[async_trait]
impl TrendProvider for GoogleTrendsService {
    async fn fetch_trends(
        &self,
        category: &str,
        geo: &str,
    ) -> Result<Vec<TrendSignal>, ProviderError> {
        let cache_key = format!("{}_{}", category, geo);

        if let Some(cached) = self.cache.get(&cache_key).await {
            tracing::debug!("Cache hit for trends {}", cache_key);
            return Ok(cached);
        }

        tracing::info!(category = %category, geo = %geo, "Fetching daily trends");

        let url = format!("{}/dailytrends", self.base_url);
        let mut query = vec![("hl", "en-US"), ("tz", "0"), ("geo", geo), ("ns", "15")];
        if category != "all" {
            query.push(("cat", category));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
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

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;
        let signals = Self::parse_daily_trends(&body)?;

        self.cache.insert(cache_key, signals.clone()).await;

        tracing::info!(
            category = %category,
            count = signals.len(),
            "Fetched trend signals"
        );

        Ok(signals)
    }
}
