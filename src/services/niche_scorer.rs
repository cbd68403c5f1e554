//! Niche Scorer
//!
//! Turns raw trend signals into scored niches and upserts them by keyword.
//! A failing category is logged and skipped; the remaining categories still run.

use chrono::Utc;
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::entities::{niches, prelude::*};
use crate::error::AutomationResult;
use crate::models::niche::{CompetitionLevel, NicheStatus, ScoredNiche, TrendDirection, TrendSignal};
use crate::services::sampling::SharedRng;
use crate::services::trends::TrendProvider;

/// Upper bound (exclusive) of the random bonus added to profit potential
const POTENTIAL_BONUS_MAX: i32 = 20;

lazy_static! {
    static ref NON_DIGITS: Regex = Regex::new(r"[^\d]").unwrap();
}

/// Result of one scoring pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryOutcome {
    /// Niches upserted
    pub processed: usize,
    pub failed_categories: Vec<String>,
    pub failed_keywords: Vec<String>,
}

/// Strip everything but digits: "200K+" -> 200, "1,500,000+" -> 1500000
pub fn parse_traffic(formatted: &str) -> i64 {
    let digits = NON_DIGITS.replace_all(formatted, "");
    if digits.is_empty() {
        return 0;
    }
    digits.parse::<i64>().unwrap_or(i64::MAX)
}

/// `min(100, floor(volume / 1000) + bonus)`
pub fn profit_potential(search_volume: i64, bonus: i32) -> i32 {
    let base = (search_volume.max(0) / 1000).min(100) as i32;
    (base + bonus.max(0)).min(100)
}

pub struct NicheScorer {
    trends: Arc<dyn TrendProvider>,
    rng: SharedRng,
    rate_limit_delay: Duration,
}

impl NicheScorer {
    pub fn new(trends: Arc<dyn TrendProvider>, rng: SharedRng, rate_limit_delay: Duration) -> Self {
        Self {
            trends,
            rng,
            rate_limit_delay,
        }
    }

    /// Score a single signal. Blank keywords yield nothing.
    pub fn score_signal(&self, signal: &TrendSignal) -> Option<ScoredNiche> {
        let keyword = signal.keyword.trim();
        if keyword.is_empty() {
            return None;
        }

        let search_volume = parse_traffic(&signal.formatted_traffic);
        let bonus = self.rng.lock().gen_range(0..POTENTIAL_BONUS_MAX);

        Some(ScoredNiche {
            keyword: keyword.to_string(),
            search_volume,
            competition_level: CompetitionLevel::from_volume(search_volume),
            trend_direction: TrendDirection::Rising,
            profit_potential: profit_potential(search_volume, bonus),
        })
    }

    /// Fetch every category, score each signal, and upsert the niches
    pub async fn discover(
        &self,
        db: &DatabaseConnection,
        categories: &[String],
        geo: &str,
    ) -> AutomationResult<DiscoveryOutcome> {
        let mut outcome = DiscoveryOutcome::default();

        for (i, category) in categories.iter().enumerate() {
            if i > 0 && !self.rate_limit_delay.is_zero() {
                tokio::time::sleep(self.rate_limit_delay).await;
            }

            let signals = match self.trends.fetch_trends(category, geo).await {
                Ok(signals) => signals,
                Err(e) => {
                    warn!(category = %category, error = %e, "Trend fetch failed, skipping category");
                    outcome.failed_categories.push(category.clone());
                    continue;
                }
            };

            debug!(category = %category, count = signals.len(), "Scoring trend signals");

            for signal in &signals {
                let Some(scored) = self.score_signal(signal) else {
                    continue;
                };

                match upsert_niche(db, &scored).await {
                    Ok(()) => outcome.processed += 1,
                    Err(e) => {
                        warn!(keyword = %scored.keyword, error = %e, "Failed to upsert niche, skipping");
                        outcome.failed_keywords.push(scored.keyword);
                    }
                }
            }
        }

        info!(
            processed = outcome.processed,
            failed_categories = outcome.failed_categories.len(),
            "Niche scoring pass complete"
        );

        Ok(outcome)
    }
}

/// Insert or refresh a niche by keyword.
///
/// Re-scoring updates volume, tier and potential; it never touches the
/// product counter or the status.
pub async fn upsert_niche(db: &DatabaseConnection, niche: &ScoredNiche) -> AutomationResult<()> {
    let now = Utc::now().naive_utc();

    let model = niches::ActiveModel {
        keyword: Set(niche.keyword.clone()),
        search_volume: Set(niche.search_volume),
        competition_level: Set(niche.competition_level.as_str().to_string()),
        trend_direction: Set(niche.trend_direction.as_str().to_string()),
        profit_potential: Set(niche.profit_potential),
        products_created: Set(0),
        status: Set(NicheStatus::Active.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Niches::insert(model)
        .on_conflict(
            OnConflict::column(niches::Column::Keyword)
                .update_columns([
                    niches::Column::SearchVolume,
                    niches::Column::CompetitionLevel,
                    niches::Column::TrendDirection,
                    niches::Column::ProfitPotential,
                    niches::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}

/// Active niches, best first
pub async fn top_niches(db: &DatabaseConnection, limit: u64) -> AutomationResult<Vec<niches::Model>> {
    Ok(Niches::find()
        .filter(niches::Column::Status.eq(NicheStatus::Active.as_str()))
        .order_by_desc(niches::Column::ProfitPotential)
        .order_by_desc(niches::Column::SearchVolume)
        .order_by_asc(niches::Column::Id)
        .limit(limit)
        .all(db)
        .await?)
}
