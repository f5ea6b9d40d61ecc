//! Append-only price history store.
//!
//! One table, `prices`, keyed for deduplication by
//! `(COALESCE(gtin, sku), store_id, captured_at)`. Inserting a duplicate
//! observation is a silent no-op reported as [`Appended::Duplicate`],
//! never an error and never an overwrite. No deletion path exists.

use chrono::{TimeZone, Utc};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::StorageError;
use crate::models::{BaseUnit, PriceRecord};

/// Outcome of a single append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appended {
    Inserted,
    Duplicate,
}

/// Appends one record, deduplicating on the storage-layer unique index.
///
/// Safe under concurrent callers: two runs racing the same dedup key get
/// exactly one `Inserted` and one `Duplicate`.
pub async fn append(pool: &SqlitePool, record: &PriceRecord) -> Result<Appended, StorageError> {
    let result = sqlx::query(
        r#"
        INSERT INTO prices
            (id, gtin, sku, store_id, name, brand, package_price, price_per_unit, base_unit, captured_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&record.gtin)
    .bind(&record.sku)
    .bind(&record.store_id)
    .bind(&record.name)
    .bind(&record.brand)
    .bind(record.package_price)
    .bind(record.price_per_unit)
    .bind(record.base_unit.to_string())
    .bind(record.captured_at.timestamp())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        Ok(Appended::Duplicate)
    } else {
        Ok(Appended::Inserted)
    }
}

/// Full history for one global trade item number, most recent first,
/// across all stores. Backs compare-by-identifier; gtin-less records are
/// unreachable here by construction.
pub async fn by_gtin(pool: &SqlitePool, gtin: &str) -> Result<Vec<PriceRecord>, StorageError> {
    let rows = sqlx::query(
        r#"
        SELECT gtin, sku, store_id, name, brand, package_price, price_per_unit, base_unit, captured_at
        FROM prices
        WHERE gtin = ?
        ORDER BY captured_at DESC, store_id ASC
        "#,
    )
    .bind(gtin)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_record).collect()
}

/// Case-insensitive substring search over `name`, returning only the most
/// recent snapshot per (product, store) pair. Backs search-by-name.
pub async fn search_name(
    pool: &SqlitePool,
    query: &str,
    limit: i64,
) -> Result<Vec<PriceRecord>, StorageError> {
    let rows = sqlx::query(
        r#"
        SELECT gtin, sku, store_id, name, brand, package_price, price_per_unit, base_unit, captured_at
        FROM (
            SELECT *,
                   ROW_NUMBER() OVER (
                       PARTITION BY COALESCE(gtin, sku), store_id
                       ORDER BY captured_at DESC
                   ) AS recency
            FROM prices
            WHERE instr(lower(name), lower(?)) > 0
        )
        WHERE recency = 1
        ORDER BY name ASC, store_id ASC
        LIMIT ?
        "#,
    )
    .bind(query)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_record).collect()
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<PriceRecord, StorageError> {
    let base_unit: String = row.get("base_unit");
    let base_unit = BaseUnit::from_str(&base_unit)
        .map_err(|_| StorageError(sqlx::Error::Decode("invalid base_unit column".into())))?;
    let captured_at: i64 = row.get("captured_at");

    Ok(PriceRecord {
        gtin: row.get("gtin"),
        sku: row.get("sku"),
        store_id: row.get("store_id"),
        name: row.get("name"),
        brand: row.get("brand"),
        package_price: row.get("package_price"),
        price_per_unit: row.get("price_per_unit"),
        base_unit,
        captured_at: Utc
            .timestamp_opt(captured_at, 0)
            .single()
            .unwrap_or_default(),
    })
}
