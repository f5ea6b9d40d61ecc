//! Price history store tests against an in-memory SQLite database.

use chrono::{TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use pricegrid::history::{self, Appended};
use pricegrid::migrate;
use pricegrid::models::{BaseUnit, PriceRecord};

async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
    let pool = SqlitePoolOptions::new()
        // A single connection keeps every query on the same in-memory db.
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    migrate::apply(&pool).await.unwrap();
    pool
}

fn record(gtin: Option<&str>, sku: &str, store_id: &str, captured_at: i64) -> PriceRecord {
    PriceRecord {
        gtin: gtin.map(str::to_string),
        sku: sku.to_string(),
        name: "Pasta integrale 500g".to_string(),
        brand: Some("Barilla".to_string()),
        package_price: 2.50,
        price_per_unit: 5.00,
        base_unit: BaseUnit::Kg,
        store_id: store_id.to_string(),
        captured_at: Utc.timestamp_opt(captured_at, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_append_then_duplicate() {
    let pool = test_pool().await;
    let r = record(Some("8001234567890"), "sku-1", "2024", 1_700_000_000);

    assert_eq!(history::append(&pool, &r).await.unwrap(), Appended::Inserted);
    assert_eq!(
        history::append(&pool, &r).await.unwrap(),
        Appended::Duplicate
    );

    let rows = history::by_gtin(&pool, "8001234567890").await.unwrap();
    assert_eq!(rows.len(), 1, "duplicate append must not create a row");
}

#[tokio::test]
async fn test_dedup_falls_back_to_sku_without_gtin() {
    let pool = test_pool().await;
    let r = record(None, "flyer-page1#0", "aldi", 1_700_000_000);

    assert_eq!(history::append(&pool, &r).await.unwrap(), Appended::Inserted);
    assert_eq!(
        history::append(&pool, &r).await.unwrap(),
        Appended::Duplicate
    );
}

#[tokio::test]
async fn test_same_key_different_store_or_snapshot_inserts() {
    let pool = test_pool().await;
    let base = record(Some("800"), "sku-1", "2024", 1_700_000_000);

    assert_eq!(
        history::append(&pool, &base).await.unwrap(),
        Appended::Inserted
    );

    let other_store = record(Some("800"), "sku-1", "2158", 1_700_000_000);
    assert_eq!(
        history::append(&pool, &other_store).await.unwrap(),
        Appended::Inserted
    );

    let later_snapshot = record(Some("800"), "sku-1", "2024", 1_700_000_300);
    assert_eq!(
        history::append(&pool, &later_snapshot).await.unwrap(),
        Appended::Inserted
    );

    assert_eq!(history::by_gtin(&pool, "800").await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_by_gtin_sorted_most_recent_first() {
    let pool = test_pool().await;
    for ts in [1_700_000_000, 1_700_000_600, 1_700_000_300] {
        history::append(&pool, &record(Some("800"), "sku-1", "2024", ts))
            .await
            .unwrap();
    }

    let rows = history::by_gtin(&pool, "800").await.unwrap();
    let stamps: Vec<i64> = rows.iter().map(|r| r.captured_at.timestamp()).collect();
    assert_eq!(stamps, [1_700_000_600, 1_700_000_300, 1_700_000_000]);
}

#[tokio::test]
async fn test_by_gtin_excludes_gtinless_records() {
    let pool = test_pool().await;
    history::append(&pool, &record(None, "sku-9", "aldi", 1_700_000_000))
        .await
        .unwrap();

    assert!(history::by_gtin(&pool, "sku-9").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_latest_snapshot_per_store_only() {
    let pool = test_pool().await;
    // Two snapshots in one store, one snapshot in another.
    for (store, ts) in [("2024", 1_700_000_000), ("2024", 1_700_000_600), ("2158", 1_700_000_000)] {
        history::append(&pool, &record(Some("800"), "sku-1", store, ts))
            .await
            .unwrap();
    }

    let rows = history::search_name(&pool, "pasta", 50).await.unwrap();
    assert_eq!(rows.len(), 2, "one record per (product, store) pair");

    let store_2024 = rows.iter().find(|r| r.store_id == "2024").unwrap();
    assert_eq!(
        store_2024.captured_at.timestamp(),
        1_700_000_600,
        "stale snapshot must not surface"
    );
}

#[tokio::test]
async fn test_search_is_case_insensitive_and_includes_gtinless() {
    let pool = test_pool().await;
    history::append(&pool, &record(None, "flyer#0", "aldi", 1_700_000_000))
        .await
        .unwrap();

    let rows = history::search_name(&pool, "PASTA INTEG", 50).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].gtin.is_none());
}

#[tokio::test]
async fn test_concurrent_appends_race_to_one_row() {
    // File-backed database so two pooled connections genuinely contend on
    // the uniqueness index.
    let tmp = tempfile::TempDir::new().unwrap();
    let options =
        SqliteConnectOptions::from_str(&format!("sqlite:{}/race.sqlite", tmp.path().display()))
            .unwrap()
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .unwrap();
    migrate::apply(&pool).await.unwrap();

    let r = record(Some("800"), "sku-1", "2024", 1_700_000_000);
    let (a, b) = tokio::join!(history::append(&pool, &r), history::append(&pool, &r));
    let outcomes = [a.unwrap(), b.unwrap()];

    assert!(outcomes.contains(&Appended::Inserted));
    assert_eq!(history::by_gtin(&pool, "800").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_no_match() {
    let pool = test_pool().await;
    history::append(&pool, &record(Some("800"), "sku-1", "2024", 1_700_000_000))
        .await
        .unwrap();

    assert!(history::search_name(&pool, "tofu", 50).await.unwrap().is_empty());
}
