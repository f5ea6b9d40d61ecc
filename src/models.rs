//! Core data models used throughout Pricegrid.
//!
//! These types represent the raw listings, normalized price records, and
//! run reports that flow through the ingestion and query pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UnitError;

/// Raw listing produced by a source adapter before normalization.
///
/// Retailer-specific and transient: it exists only between fetch and
/// normalization and is never persisted.
#[derive(Debug, Clone)]
pub struct RawListing {
    /// Retailer-assigned product identifier, always present.
    pub sku: String,
    /// Global trade item number (EAN/GTIN) when the source supplies one.
    pub gtin: Option<String>,
    pub name: String,
    pub brand: Option<String>,
    /// Package price as reported by the source.
    pub package_price: f64,
    /// Declared package size, in the source's own unit.
    pub package_size: Option<f64>,
    /// Unit string as reported (e.g. "g", "ml", "kg").
    pub unit: Option<String>,
    /// Pre-computed per-unit price reported by the source. Only consulted
    /// when `package_size` is absent.
    pub reported_unit_price: Option<f64>,
}

/// The base unit every per-unit price is normalized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseUnit {
    Kg,
    L,
    Piece,
}

impl fmt::Display for BaseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kg => write!(f, "kg"),
            Self::L => write!(f, "l"),
            Self::Piece => write!(f, "piece"),
        }
    }
}

impl FromStr for BaseUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, UnitError> {
        match s {
            "kg" => Ok(Self::Kg),
            "l" => Ok(Self::L),
            "piece" => Ok(Self::Piece),
            other => Err(UnitError::Unrecognized(other.to_string())),
        }
    }
}

/// Canonical price observation, immutable once created.
///
/// One row of the append-only price history. The dedup key is
/// `(gtin-or-sku, store_id, captured_at)`.
#[derive(Debug, Clone, Serialize)]
pub struct PriceRecord {
    /// Global trade item number. Records without one are excluded from
    /// compare-by-identifier but still appear in name search.
    pub gtin: Option<String>,
    /// Retailer-assigned product id; dedup fallback when `gtin` is absent.
    pub sku: String,
    pub name: String,
    pub brand: Option<String>,
    pub package_price: f64,
    /// Always derived from `package_price` and the declared package size
    /// when a size is available.
    pub price_per_unit: f64,
    pub base_unit: BaseUnit,
    pub store_id: String,
    pub captured_at: DateTime<Utc>,
}

/// A configured (retailer, location) pair.
#[derive(Debug, Clone)]
pub struct Store {
    pub store_id: String,
    pub label: String,
}

/// Per-store outcome of one orchestration run.
#[derive(Debug, Clone, Serialize)]
pub struct StoreReport {
    pub store_id: String,
    pub fetched: u64,
    pub normalized: u64,
    pub persisted: u64,
    pub duplicates: u64,
    /// Source records the adapter dropped before they became listings,
    /// e.g. ambiguous flyer blocks.
    pub skipped: u64,
    /// Records dropped by a per-record normalization or storage failure.
    pub failed: u64,
}

impl StoreReport {
    pub fn new(store_id: &str) -> Self {
        Self {
            store_id: store_id.to_string(),
            fetched: 0,
            normalized: 0,
            persisted: 0,
            duplicates: 0,
            skipped: 0,
            failed: 0,
        }
    }
}

/// Run-level result: which stores completed and which failed, with the
/// representative error captured for each failure.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub completed: Vec<StoreReport>,
    pub failed: Vec<(String, String)>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }
}
