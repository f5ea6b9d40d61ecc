use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Creates the price history schema. Idempotent.
pub async fn apply(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS prices (
            id TEXT PRIMARY KEY,
            gtin TEXT,
            sku TEXT NOT NULL,
            store_id TEXT NOT NULL,
            name TEXT NOT NULL,
            brand TEXT,
            package_price REAL NOT NULL,
            price_per_unit REAL NOT NULL,
            base_unit TEXT NOT NULL,
            captured_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // The dedup key. Enforced here, in the storage layer, so that two
    // concurrent runs racing the same observation yield exactly one row.
    // COALESCE keeps gtin-less records deduplicable via the retailer sku.
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_prices_dedup
        ON prices (COALESCE(gtin, sku), store_id, captured_at)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_prices_gtin ON prices(gtin)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_prices_captured_at ON prices(captured_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
