//! Record normalization: raw listings into canonical price records.
//!
//! The per-unit price is always recomputed from the declared package size
//! when one is available. A source-reported unit price is only trusted as
//! a fallback when the package size field is absent; those values carry
//! no normalization guard, so recompute-from-size is preferred whenever
//! possible.

use chrono::{DateTime, Utc};

use crate::error::NormalizeError;
use crate::models::{PriceRecord, RawListing};
use crate::unit;

/// Normalizes one raw listing into a [`PriceRecord`].
///
/// `captured_at` is the orchestration run's timestamp for this store: all
/// records of one store within one run share it, forming the snapshot the
/// dedup key buckets on.
///
/// Failures are per-record; the caller skips, counts, and continues.
pub fn normalize_listing(
    listing: &RawListing,
    store_id: &str,
    captured_at: DateTime<Utc>,
) -> Result<PriceRecord, NormalizeError> {
    let (price_per_unit, base_unit) = match (listing.package_size, &listing.unit) {
        (Some(size), Some(unit)) => unit::normalize(listing.package_price, size, unit)?,
        (None, Some(unit)) => match listing.reported_unit_price {
            Some(reported) => {
                let (_, base) = unit::parse_unit(unit)?;
                (reported, base)
            }
            None => {
                return Err(NormalizeError::MissingQuantity {
                    sku: listing.sku.clone(),
                })
            }
        },
        _ => {
            return Err(NormalizeError::MissingQuantity {
                sku: listing.sku.clone(),
            })
        }
    };

    Ok(PriceRecord {
        gtin: listing.gtin.clone(),
        sku: listing.sku.clone(),
        name: listing.name.clone(),
        brand: listing.brand.clone(),
        package_price: listing.package_price,
        price_per_unit,
        base_unit,
        store_id: store_id.to_string(),
        captured_at,
    })
}
