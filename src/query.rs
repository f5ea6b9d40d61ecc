//! Read-only query engine over the price history.
//!
//! Thin wrappers around [`crate::history`] reads, shared by the CLI
//! commands and the HTTP placeholder routes. Both operations are
//! side-effect-free.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::models::PriceRecord;

pub const DEFAULT_SEARCH_LIMIT: i64 = 50;

/// Compare-by-identifier: full history for an exact gtin, most recent
/// first, across stores.
pub async fn compare(pool: &SqlitePool, gtin: &str) -> Result<Vec<PriceRecord>> {
    Ok(crate::history::by_gtin(pool, gtin).await?)
}

/// Search-by-name: case-insensitive substring match, one record per
/// (product, store) pair at its most recent snapshot.
///
/// A blank query is rejected rather than matched against everything;
/// the CLI and the HTTP surface share this contract.
pub async fn search(pool: &SqlitePool, query: &str, limit: i64) -> Result<Vec<PriceRecord>> {
    if query.trim().is_empty() {
        anyhow::bail!("search query must not be empty");
    }
    Ok(crate::history::search_name(pool, query, limit).await?)
}

/// CLI wrapper for `pricegrid compare <gtin>`.
pub async fn run_compare(config: &Config, gtin: &str) -> Result<()> {
    let pool = db::connect(config).await?;
    let records = compare(&pool, gtin).await?;
    pool.close().await;

    if records.is_empty() {
        println!("No price history for gtin {}.", gtin);
        return Ok(());
    }
    print_records(&records);
    Ok(())
}

/// CLI wrapper for `pricegrid search <query>`.
pub async fn run_search(config: &Config, query: &str, limit: Option<i64>) -> Result<()> {
    let pool = db::connect(config).await?;
    let records = search(&pool, query, limit.unwrap_or(DEFAULT_SEARCH_LIMIT)).await?;
    pool.close().await;

    if records.is_empty() {
        println!("No results.");
        return Ok(());
    }
    print_records(&records);
    Ok(())
}

fn print_records(records: &[PriceRecord]) {
    for record in records {
        let brand = record.brand.as_deref().unwrap_or("-");
        let gtin = record.gtin.as_deref().unwrap_or("-");
        println!(
            "{} | {} | {} | {:.2} ({:.2}/{}) | {} | {}",
            record.captured_at.format("%Y-%m-%d %H:%M"),
            record.store_id,
            record.name,
            record.package_price,
            record.price_per_unit,
            record.base_unit,
            brand,
            gtin
        );
    }
}
