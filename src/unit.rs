//! Per-unit price normalization.
//!
//! Pure conversion from a (package price, package size, unit string)
//! triple to a canonical price per base unit. Referentially transparent;
//! all I/O and error-policy decisions live with the callers.

use crate::error::UnitError;
use crate::models::BaseUnit;

/// Converts a raw package price into a canonical per-base-unit price.
///
/// Unit strings are recognized case-insensitively. Gram and milliliter
/// sizes are scaled to kilograms and liters; kilogram, liter, and piece
/// sizes pass through unchanged.
///
/// Fails with [`UnitError::InvalidQuantity`] when the size is not a
/// positive finite number, and [`UnitError::Unrecognized`] for an unknown
/// unit string. Callers treat both as per-record failures, not fatal to
/// the batch.
pub fn normalize(
    package_price: f64,
    package_size: f64,
    unit: &str,
) -> Result<(f64, BaseUnit), UnitError> {
    if !(package_size > 0.0) || !package_size.is_finite() {
        return Err(UnitError::InvalidQuantity(package_size));
    }

    let (scale, base) = parse_unit(unit)?;
    let normalized_size = package_size * scale;
    Ok((package_price / normalized_size, base))
}

/// Maps a reported unit string to (scale factor to base unit, base unit).
pub fn parse_unit(unit: &str) -> Result<(f64, BaseUnit), UnitError> {
    match unit.trim().to_lowercase().as_str() {
        "g" | "gr" | "gram" | "grams" => Ok((0.001, BaseUnit::Kg)),
        "kg" | "kilogram" | "kilograms" => Ok((1.0, BaseUnit::Kg)),
        "ml" | "milliliter" | "milliliters" => Ok((0.001, BaseUnit::L)),
        "l" | "lt" | "liter" | "liters" => Ok((1.0, BaseUnit::L)),
        "piece" | "pieces" | "pc" | "pz" | "each" => Ok((1.0, BaseUnit::Piece)),
        other => Err(UnitError::Unrecognized(other.to_string())),
    }
}
