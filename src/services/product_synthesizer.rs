//! Product Synthesizer
//!
//! Turns the best active niches into priced product records. One failed niche
//! is logged and skipped; the rest of the batch still runs.

use chrono::Utc;
use rand::Rng;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info, warn};

use crate::entities::{niches, prelude::*, products};
use crate::error::AutomationResult;
use crate::models::niche::{MAX_PRODUCTS_PER_NICHE, NicheStatus};
use crate::models::product::{ProductPricing, ProductStatus};
use crate::services::price_utils::{from_cents, margin_percentage};
use crate::services::sampling::{SharedRng, random_token};

/// Base cost is sampled in [15.00, 25.00)
const BASE_PRICE_CENTS: std::ops::Range<i64> = 1500..2500;

/// Markup multiplier is sampled in [2.00, 3.00)
const MARKUP_HUNDREDTHS: std::ops::Range<i64> = 200..300;

pub const DEFAULT_CATEGORY: &str = "general";

/// Keyword fragments per category, matched case-insensitively in order
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("tech", &["technology", "tech", "gadget", "software", "computer", "phone", "robot", "crypto"]),
    ("fitness", &["fitness", "gym", "workout", "yoga", "running", "sport"]),
    ("pets", &["dog", "cat", "pet", "puppy", "kitten"]),
    ("gaming", &["game", "gaming", "esports", "console"]),
    ("home", &["home", "kitchen", "decor", "garden", "coffee"]),
    ("fashion", &["fashion", "style", "vintage", "retro"]),
    ("music", &["music", "concert", "band", "album", "song"]),
    ("holiday", &["christmas", "halloween", "valentine", "easter", "holiday"]),
];

const PRODUCT_TYPES: &[&str] = &["T-Shirt", "Hoodie", "Mug", "Poster", "Tote Bag", "Sticker"];

/// First category whose fragment appears in the keyword, else "general"
pub fn categorize(keyword: &str) -> &'static str {
    let lowered = keyword.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, fragments)| fragments.iter().any(|f| lowered.contains(f)))
        .map(|(category, _)| *category)
        .unwrap_or(DEFAULT_CATEGORY)
}

/// `selling = ceil(base * markup)`, `margin = (selling - base) / selling * 100`
pub fn price_product(base_price: Decimal, markup: Decimal) -> ProductPricing {
    let selling_price = (base_price * markup).ceil();
    ProductPricing {
        base_price,
        markup,
        selling_price,
        profit_margin: margin_percentage(selling_price, base_price),
    }
}

/// Sampled attributes for one new product
#[derive(Debug, Clone)]
struct ProductDraft {
    sku: String,
    title: String,
    pricing: ProductPricing,
}

#[derive(Debug, Clone, Default)]
pub struct SynthesisOutcome {
    pub created: Vec<products::Model>,
    pub failed_keywords: Vec<String>,
}

pub struct ProductSynthesizer {
    rng: SharedRng,
}

impl ProductSynthesizer {
    pub fn new(rng: SharedRng) -> Self {
        Self { rng }
    }

    /// Top-N active niches by (potential desc, volume desc) with fewer than
    /// three products
    pub async fn select_niches(
        db: &DatabaseConnection,
        limit: u64,
    ) -> AutomationResult<Vec<niches::Model>> {
        Ok(Niches::find()
            .filter(niches::Column::Status.eq(NicheStatus::Active.as_str()))
            .filter(niches::Column::ProductsCreated.lt(MAX_PRODUCTS_PER_NICHE))
            .order_by_desc(niches::Column::ProfitPotential)
            .order_by_desc(niches::Column::SearchVolume)
            .order_by_asc(niches::Column::Id)
            .limit(limit)
            .all(db)
            .await?)
    }

    pub async fn create_products(
        &self,
        db: &DatabaseConnection,
        limit: u64,
    ) -> AutomationResult<SynthesisOutcome> {
        let selected = Self::select_niches(db, limit).await?;

        if selected.is_empty() {
            info!("No eligible niches for product creation");
            return Ok(SynthesisOutcome::default());
        }

        info!(count = selected.len(), "Creating products from top niches");

        let mut outcome = SynthesisOutcome::default();

        for niche in &selected {
            let draft = self.draft(&niche.keyword);

            match create_from_niche(db, niche, draft).await {
                Ok(product) => {
                    debug!(
                        keyword = %niche.keyword,
                        sku = %product.sku,
                        selling_price = %product.selling_price,
                        "Product created"
                    );
                    outcome.created.push(product);
                }
                Err(e) => {
                    warn!(keyword = %niche.keyword, error = %e, "Failed to create product, skipping niche");
                    outcome.failed_keywords.push(niche.keyword.clone());
                }
            }
        }

        info!(
            created = outcome.created.len(),
            failed = outcome.failed_keywords.len(),
            "Product creation complete"
        );

        Ok(outcome)
    }

    fn draft(&self, keyword: &str) -> ProductDraft {
        let mut rng = self.rng.lock();

        let base_price = from_cents(rng.gen_range(BASE_PRICE_CENTS));
        let markup = from_cents(rng.gen_range(MARKUP_HUNDREDTHS));
        let product_type = PRODUCT_TYPES.choose(&mut *rng).copied().unwrap_or("T-Shirt");
        let sku = format!(
            "POD-{}-{}",
            Utc::now().timestamp_millis(),
            random_token(&mut *rng, 6)
        );

        ProductDraft {
            sku,
            title: format!("{} {}", keyword, product_type),
            pricing: price_product(base_price, markup),
        }
    }
}

/// Persist the product and bump the niche counter in one transaction
async fn create_from_niche(
    db: &DatabaseConnection,
    niche: &niches::Model,
    draft: ProductDraft,
) -> AutomationResult<products::Model> {
    let txn = db.begin().await?;

    let product = products::ActiveModel {
        sku: Set(draft.sku),
        title: Set(draft.title),
        category: Set(categorize(&niche.keyword).to_string()),
        niche: Set(niche.keyword.clone()),
        base_price: Set(draft.pricing.base_price),
        selling_price: Set(draft.pricing.selling_price),
        profit_margin: Set(draft.pricing.profit_margin),
        trend_score: Set(niche.profit_potential),
        status: Set(ProductStatus::Active.as_str().to_string()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    increment_products_created(&txn, &niche.keyword).await?;

    txn.commit().await?;
    Ok(product)
}

/// Atomic `products_created + 1`; marks the niche saturated at the limit
async fn increment_products_created<C: ConnectionTrait>(
    conn: &C,
    keyword: &str,
) -> AutomationResult<()> {
    Niches::update_many()
        .col_expr(
            niches::Column::ProductsCreated,
            Expr::col(niches::Column::ProductsCreated).add(1),
        )
        .col_expr(niches::Column::UpdatedAt, Expr::value(Utc::now().naive_utc()))
        .filter(niches::Column::Keyword.eq(keyword))
        .exec(conn)
        .await?;

    Niches::update_many()
        .col_expr(
            niches::Column::Status,
            Expr::value(NicheStatus::Saturated.as_str()),
        )
        .filter(niches::Column::Keyword.eq(keyword))
        .filter(niches::Column::Status.eq(NicheStatus::Active.as_str()))
        .filter(niches::Column::ProductsCreated.gte(MAX_PRODUCTS_PER_NICHE))
        .exec(conn)
        .await?;

    Ok(())
}
