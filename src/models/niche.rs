//! Niche scoring models
//!
//! Competition tiers, trend signals from the trend provider, and the
//! response shape for GET /api/niches.

use serde::{Deserialize, Serialize};

use crate::entities::niches;

/// Search volume above which a niche counts as high competition
pub const HIGH_COMPETITION_VOLUME: i64 = 50_000;

/// Search volume above which a niche counts as medium competition
pub const MEDIUM_COMPETITION_VOLUME: i64 = 10_000;

/// A niche stops feeding the product synthesizer once this many products exist
pub const MAX_PRODUCTS_PER_NICHE: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionLevel {
    Low,
    Medium,
    High,
}

impl CompetitionLevel {
    /// >50000 is high, >10000 is medium, anything else is low
    pub fn from_volume(search_volume: i64) -> Self {
        if search_volume > HIGH_COMPETITION_VOLUME {
            CompetitionLevel::High
        } else if search_volume > MEDIUM_COMPETITION_VOLUME {
            CompetitionLevel::Medium
        } else {
            CompetitionLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitionLevel::Low => "low",
            CompetitionLevel::Medium => "medium",
            CompetitionLevel::High => "high",
        }
    }
}

/// The trend provider only reports rising searches today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Stable,
    Declining,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Rising => "rising",
            TrendDirection::Stable => "stable",
            TrendDirection::Declining => "declining",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NicheStatus {
    Active,
    Saturated,
    Expired,
}

impl NicheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NicheStatus::Active => "active",
            NicheStatus::Saturated => "saturated",
            NicheStatus::Expired => "expired",
        }
    }
}

/// Raw result from the trend provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSignal {
    pub keyword: String,
    /// e.g. "200K+", only the digits are used
    pub formatted_traffic: String,
}

/// A niche scored from a trend signal, ready to upsert
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredNiche {
    pub keyword: String,
    pub search_volume: i64,
    pub competition_level: CompetitionLevel,
    pub trend_direction: TrendDirection,
    pub profit_potential: i32,
}

/// Query parameters for GET /api/niches
#[derive(Debug, Clone, Deserialize)]
pub struct NicheListQuery {
    /// Maximum number of results (default: 20, max: 100)
    pub limit: Option<u64>,
}

impl NicheListQuery {
    pub fn validate(&self) -> Result<(), String> {
        match self.limit {
            Some(0) => Err("limit must be at least 1".to_string()),
            Some(limit) if limit > 100 => Err("limit cannot exceed 100".to_string()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NicheEntry {
    pub keyword: String,
    pub search_volume: i64,
    pub competition_level: String,
    pub trend_direction: String,
    pub profit_potential: i32,
    pub products_created: i32,
    pub status: String,
}

impl From<niches::Model> for NicheEntry {
    fn from(model: niches::Model) -> Self {
        Self {
            keyword: model.keyword,
            search_volume: model.search_volume,
            competition_level: model.competition_level,
            trend_direction: model.trend_direction,
            profit_potential: model.profit_potential,
            products_created: model.products_created,
            status: model.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NicheListResponse {
    pub niches: Vec<NicheEntry>,
    pub total: usize,
}
