//! OCR-flyer adapter.
//!
//! Image-to-text extraction is an external collaborator: this adapter
//! consumes its output, one `.txt` file per flyer page under a configured
//! directory, with one product per text block (blocks separated by blank
//! lines). Each block is pattern-extracted into a (name, price, size,
//! unit) listing.
//!
//! OCR output is noisy, so extraction is conservative: a block is used
//! only when it contains exactly one price candidate and exactly one
//! size candidate. Anything else is ambiguous and skipped; skipped
//! blocks are logged and counted into the fetch batch, so the run
//! summary accounts for them, and they are never fatal to the fetch.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::warn;

use crate::adapter::{FetchBatch, SourceAdapter};
use crate::error::SourceError;
use crate::models::RawListing;

pub struct FlyerAdapter {
    dir: PathBuf,
}

impl FlyerAdapter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl SourceAdapter for FlyerAdapter {
    fn kind(&self) -> &'static str {
        "flyer"
    }

    async fn fetch(&self, store_id: &str) -> Result<FetchBatch, SourceError> {
        let mut pages = Vec::new();
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            SourceError::Unavailable(format!(
                "cannot read flyer directory {}: {e}",
                self.dir.display()
            ))
        })?;
        for entry in entries {
            let path = entry
                .map_err(|e| SourceError::Unavailable(e.to_string()))?
                .path();
            if path.extension().is_some_and(|ext| ext == "txt") {
                pages.push(path);
            }
        }
        // Deterministic page order regardless of directory enumeration.
        pages.sort();

        let mut listings = Vec::new();
        let mut skipped = 0u64;
        for path in &pages {
            let text = std::fs::read_to_string(path)
                .map_err(|e| SourceError::Unavailable(format!("{}: {e}", path.display())))?;
            let page = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();

            for (index, block) in blocks(&text).enumerate() {
                match extract_block(block, &page, index) {
                    Ok(listing) => listings.push(listing),
                    Err(err) => {
                        skipped += 1;
                        warn!(store_id, page = %page, index, %err, "skipping flyer block");
                    }
                }
            }
        }

        if skipped > 0 {
            warn!(store_id, skipped, "flyer blocks skipped as ambiguous");
        }
        Ok(FetchBatch { listings, skipped })
    }
}

/// Splits page text into product blocks at blank lines.
fn blocks(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|b| !b.is_empty())
}

/// Extracts one listing from one text block.
///
/// Flyers carry no retailer identifiers, so the sku is synthesized from
/// page and block position ("page stem#index") and the gtin is absent,
/// which keeps these records out of compare-by-identifier but in search.
pub fn extract_block(block: &str, page: &str, index: usize) -> Result<RawListing, SourceError> {
    let mut name: Option<&str> = None;
    let mut prices: Vec<f64> = Vec::new();
    let mut sizes: Vec<(f64, String)> = Vec::new();

    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(price) = parse_price(line) {
            prices.push(price);
        } else if let Some(size) = parse_size(line) {
            sizes.push(size);
        } else if name.is_none() {
            name = Some(line);
        }
        // Further free-text lines (slogans, fine print) are ignored.
    }

    let name = name.ok_or_else(|| {
        SourceError::Ambiguous(format!("{page}#{index}: no product name line"))
    })?;
    if prices.len() != 1 {
        return Err(SourceError::Ambiguous(format!(
            "{page}#{index}: expected 1 price candidate, found {}",
            prices.len()
        )));
    }
    if sizes.len() != 1 {
        return Err(SourceError::Ambiguous(format!(
            "{page}#{index}: expected 1 size candidate, found {}",
            sizes.len()
        )));
    }
    let (size, unit) = sizes.into_iter().next().unwrap_or_default();

    Ok(RawListing {
        sku: format!("{page}#{index}"),
        gtin: None,
        name: name.to_string(),
        brand: None,
        package_price: prices[0],
        package_size: Some(size),
        unit: Some(unit),
        reported_unit_price: None,
    })
}

/// Parses a standalone price line: an amount with a decimal comma or dot,
/// optionally wrapped in a currency marker ("€ 2,49", "2.49€", "2,49").
fn parse_price(line: &str) -> Option<f64> {
    let cleaned = line
        .trim()
        .trim_start_matches('€')
        .trim_end_matches('€')
        .trim()
        .replace(',', ".");
    // A price line must be nothing but the amount; sizes have a unit word.
    if cleaned.is_empty() || !cleaned.contains('.') {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|p| *p > 0.0)
}

/// Parses a size line: "<amount> <unit>" or "<amount><unit>" where the
/// unit is one of the strings the unit normalizer recognizes.
fn parse_size(line: &str) -> Option<(f64, String)> {
    let cleaned = line.trim().replace(',', ".");
    let split_at = cleaned.find(|c: char| c.is_alphabetic())?;
    let (amount, unit) = cleaned.split_at(split_at);
    let amount: f64 = amount.trim().parse().ok()?;
    let unit = unit.trim().to_string();
    crate::unit::parse_unit(&unit).ok()?;
    Some((amount, unit))
}
