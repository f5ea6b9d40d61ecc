//! Error taxonomy for the ingestion pipeline.
//!
//! Three boundaries, three recovery policies:
//!
//! - record-level ([`UnitError`], [`NormalizeError`], non-systemic
//!   [`StorageError`]): skip the record, count it, continue the store
//! - store-level ([`SourceError`], systemic [`StorageError`]): mark the
//!   store failed, continue the run
//! - nothing terminates a run

use thiserror::Error;

/// Unit-conversion failure. Always recoverable by skipping the record.
#[derive(Debug, Error, PartialEq)]
pub enum UnitError {
    #[error("unrecognized unit: {0:?}")]
    Unrecognized(String),

    #[error("package size must be positive, got {0}")]
    InvalidQuantity(f64),
}

/// Per-record normalization failure.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error("listing {sku:?} has neither a package size nor a reported unit price")]
    MissingQuantity { sku: String },
}

/// Adapter-level failure while fetching from a source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport or HTTP failure; the store is marked failed for this run.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// Expired or rejected session on a login-protected source.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The source answered but the payload did not have the expected shape.
    #[error("unexpected response shape: {0}")]
    Schema(String),

    /// A flyer text block could not be confidently parsed. Block-level
    /// only: the adapter skips the block, it never fails the fetch.
    #[error("ambiguous text block: {0}")]
    Ambiguous(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Unavailable(err.to_string())
    }
}

/// Persistence-layer failure.
#[derive(Debug, Error)]
#[error("storage error: {0}")]
pub struct StorageError(#[from] pub sqlx::Error);

impl StorageError {
    /// Whether this failure poisons the connection rather than one row.
    ///
    /// Systemic failures abort the remaining writes for the current store;
    /// anything else is skipped per record.
    pub fn is_systemic(&self) -> bool {
        matches!(
            self.0,
            sqlx::Error::Io(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed
        )
    }
}
