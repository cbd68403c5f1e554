//! Process-level configuration, read from the environment.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_BIND_ADDRESS: &str = "BIND_ADDRESS";
pub const ENV_TREND_CATEGORIES: &str = "TREND_CATEGORIES";
pub const ENV_TREND_GEO: &str = "TREND_GEO";
pub const ENV_TRENDS_BASE_URL: &str = "TRENDS_BASE_URL";
pub const ENV_PRINTFUL_API_KEY: &str = "PRINTFUL_API_KEY";
pub const ENV_PRINTFUL_BASE_URL: &str = "PRINTFUL_BASE_URL";
pub const ENV_PROVIDER_TIMEOUT: &str = "PROVIDER_TIMEOUT_SECS";
pub const ENV_STAGE_TIMEOUT: &str = "STAGE_TIMEOUT_SECS";
pub const ENV_RATE_LIMIT_MS: &str = "PROVIDER_RATE_LIMIT_MS";
pub const ENV_PRODUCTS_PER_CYCLE: &str = "PRODUCTS_PER_CYCLE";
pub const ENV_TEAM_SHARE: &str = "TEAM_PROFIT_SHARE_PERCENTAGE";
pub const ENV_INTERVAL: &str = "AUTOMATION_INTERVAL_SECS";
pub const ENV_SCHEDULER_ENABLED: &str = "AUTOMATION_SCHEDULER_ENABLED";
pub const ENV_RNG_SEED: &str = "AUTOMATION_RNG_SEED";
pub const ENV_OWNER_ID: &str = "SIMULATED_SALES_OWNER_ID";

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_TRENDS_BASE_URL: &str = "https://trends.google.com/trends/api";
pub const DEFAULT_PRINTFUL_BASE_URL: &str = "https://api.printful.com";
pub const DEFAULT_TEAM_SHARE: Decimal = dec!(20);

#[derive(Debug, Clone)]
pub struct AutomationConfig {
    pub bind_address: String,
    pub trend_categories: Vec<String>,
    pub trend_geo: String,
    pub trends_base_url: String,
    pub printful_api_key: Option<String>,
    pub printful_base_url: String,
    /// Per-request timeout for external calls
    pub provider_timeout: Duration,
    /// Upper bound on any single cycle stage
    pub stage_timeout: Duration,
    /// Pause between consecutive provider calls
    pub rate_limit_delay: Duration,
    pub products_per_cycle: u64,
    pub team_profit_share_percentage: Decimal,
    pub cycle_interval_secs: u64,
    pub scheduler_enabled: bool,
    pub rng_seed: Option<u64>,
    pub owner_id: String,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            trend_categories: ["all", "t", "e", "b", "s", "m"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            trend_geo: "US".to_string(),
            trends_base_url: DEFAULT_TRENDS_BASE_URL.to_string(),
            printful_api_key: None,
            printful_base_url: DEFAULT_PRINTFUL_BASE_URL.to_string(),
            provider_timeout: Duration::from_secs(15),
            stage_timeout: Duration::from_secs(120),
            rate_limit_delay: Duration::from_millis(750),
            products_per_cycle: 5,
            team_profit_share_percentage: DEFAULT_TEAM_SHARE,
            cycle_interval_secs: 86400,
            scheduler_enabled: true,
            rng_seed: None,
            owner_id: "owner".to_string(),
        }
    }
}

impl AutomationConfig {
    /// Build configuration from environment variables, falling back to defaults.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let trend_categories = env::var(ENV_TREND_CATEGORIES)
            .ok()
            .map(|raw| parse_list(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.trend_categories);

        let team_profit_share_percentage = match env::var(ENV_TEAM_SHARE) {
            Ok(raw) => match Decimal::from_str(raw.trim()) {
                Ok(pct) if pct >= Decimal::ZERO && pct <= Decimal::ONE_HUNDRED => pct,
                _ => {
                    tracing::warn!(
                        value = %raw,
                        "{} must be between 0 and 100, using default {}",
                        ENV_TEAM_SHARE,
                        DEFAULT_TEAM_SHARE
                    );
                    DEFAULT_TEAM_SHARE
                }
            },
            Err(_) => DEFAULT_TEAM_SHARE,
        };

        Self {
            bind_address: env::var(ENV_BIND_ADDRESS).unwrap_or(defaults.bind_address),
            trend_categories,
            trend_geo: env::var(ENV_TREND_GEO).unwrap_or(defaults.trend_geo),
            trends_base_url: env::var(ENV_TRENDS_BASE_URL).unwrap_or(defaults.trends_base_url),
            printful_api_key: env::var(ENV_PRINTFUL_API_KEY)
                .ok()
                .filter(|key| !key.trim().is_empty()),
            printful_base_url: env::var(ENV_PRINTFUL_BASE_URL)
                .unwrap_or(defaults.printful_base_url),
            provider_timeout: env_u64(ENV_PROVIDER_TIMEOUT)
                .map(Duration::from_secs)
                .unwrap_or(defaults.provider_timeout),
            stage_timeout: env_u64(ENV_STAGE_TIMEOUT)
                .map(Duration::from_secs)
                .unwrap_or(defaults.stage_timeout),
            rate_limit_delay: env_u64(ENV_RATE_LIMIT_MS)
                .map(Duration::from_millis)
                .unwrap_or(defaults.rate_limit_delay),
            products_per_cycle: env_u64(ENV_PRODUCTS_PER_CYCLE)
                .unwrap_or(defaults.products_per_cycle),
            team_profit_share_percentage,
            cycle_interval_secs: env_u64(ENV_INTERVAL).unwrap_or(defaults.cycle_interval_secs),
            scheduler_enabled: env::var(ENV_SCHEDULER_ENABLED)
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(defaults.scheduler_enabled),
            rng_seed: env_u64(ENV_RNG_SEED),
            owner_id: env::var(ENV_OWNER_ID).unwrap_or(defaults.owner_id),
        }
    }
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
