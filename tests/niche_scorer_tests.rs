mod common;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use std::sync::Arc;
use std::time::Duration;

use profit_automation::entities::{niches, prelude::*};
use profit_automation::services::niche_scorer::{NicheScorer, top_niches};
use profit_automation::services::sampling::shared_rng;

use crate::common::{FakeTrendProvider, TEST_SEED, setup_test_db, signal};

fn scorer(trends: FakeTrendProvider) -> NicheScorer {
    NicheScorer::new(Arc::new(trends), shared_rng(Some(TEST_SEED)), Duration::ZERO)
}

fn categories(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

async fn find(db: &sea_orm::DatabaseConnection, keyword: &str) -> niches::Model {
    Niches::find()
        .filter(niches::Column::Keyword.eq(keyword))
        .one(db)
        .await
        .unwrap()
        .expect("niche should exist")
}

#[tokio::test]
async fn test_high_traffic_signal_scores_high_tier() {
    let db = setup_test_db().await.unwrap();
    let trends = FakeTrendProvider::new().with_signals("all", vec![signal("smart home gadgets", "150000+")]);

    let outcome = scorer(trends)
        .discover(&db, &categories(&["all"]), "US")
        .await
        .unwrap();

    assert_eq!(outcome.processed, 1);

    let niche = find(&db, "smart home gadgets").await;
    assert_eq!(niche.search_volume, 150_000);
    assert_eq!(niche.competition_level, "high");
    assert_eq!(niche.trend_direction, "rising");
    assert_eq!(niche.profit_potential, 100);
    assert_eq!(niche.status, "active");
    assert_eq!(niche.products_created, 0);
}

#[tokio::test]
async fn test_competition_tiers_and_potential_bounds() {
    let db = setup_test_db().await.unwrap();
    let trends = FakeTrendProvider::new().with_signals(
        "all",
        vec![
            signal("yoga mats", "20,000+"),
            signal("pixel art", "2K+"),
        ],
    );

    scorer(trends)
        .discover(&db, &categories(&["all"]), "US")
        .await
        .unwrap();

    let medium = find(&db, "yoga mats").await;
    assert_eq!(medium.competition_level, "medium");
    assert!((20..20 + 20).contains(&medium.profit_potential));

    // "2K+" parses to 2
    let low = find(&db, "pixel art").await;
    assert_eq!(low.search_volume, 2);
    assert_eq!(low.competition_level, "low");
    assert!((0..20).contains(&low.profit_potential));
}

#[tokio::test]
async fn test_rescoring_same_keyword_does_not_duplicate() {
    let db = setup_test_db().await.unwrap();

    let first = FakeTrendProvider::new().with_signals("all", vec![signal("retro gaming", "8000+")]);
    scorer(first)
        .discover(&db, &categories(&["all"]), "US")
        .await
        .unwrap();

    let second = FakeTrendProvider::new().with_signals(
        "all",
        vec![signal("retro gaming", "80000+"), signal("retro gaming", "80000+")],
    );
    scorer(second)
        .discover(&db, &categories(&["all"]), "US")
        .await
        .unwrap();

    let count = Niches::find()
        .filter(niches::Column::Keyword.eq("retro gaming"))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let niche = find(&db, "retro gaming").await;
    assert_eq!(niche.search_volume, 80_000);
    assert_eq!(niche.competition_level, "high");
}

#[tokio::test]
async fn test_failed_category_does_not_abort_others() {
    let db = setup_test_db().await.unwrap();
    let trends = FakeTrendProvider::new()
        .failing_for("all")
        .with_signals("t", vec![signal("ai robots", "60000+")])
        .with_signals("e", vec![signal("concert merch", "12000+")]);

    let outcome = scorer(trends)
        .discover(&db, &categories(&["all", "t", "e"]), "US")
        .await
        .unwrap();

    assert_eq!(outcome.processed, 2);
    assert_eq!(outcome.failed_categories, vec!["all".to_string()]);
    assert_eq!(Niches::find().count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn test_no_signals_is_an_empty_pass() {
    let db = setup_test_db().await.unwrap();

    let outcome = scorer(FakeTrendProvider::new())
        .discover(&db, &categories(&["all", "t"]), "US")
        .await
        .unwrap();

    assert_eq!(outcome.processed, 0);
    assert!(outcome.failed_categories.is_empty());
    assert_eq!(Niches::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_top_niches_ordering() {
    let db = setup_test_db().await.unwrap();
    let trends = FakeTrendProvider::new().with_signals(
        "all",
        vec![
            signal("small niche", "1000+"),
            signal("huge niche", "500000+"),
            signal("bigger niche", "900000+"),
        ],
    );
    scorer(trends)
        .discover(&db, &categories(&["all"]), "US")
        .await
        .unwrap();

    let top = top_niches(&db, 2).await.unwrap();
    let keywords: Vec<&str> = top.iter().map(|n| n.keyword.as_str()).collect();

    // Both capped at potential 100, volume breaks the tie
    assert_eq!(keywords, vec!["bigger niche", "huge niche"]);
}
