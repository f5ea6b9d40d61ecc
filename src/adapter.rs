//! The source-adapter contract and its static resolution.
//!
//! Every retailer class implements the same capability, fetching the raw
//! listings for one store, so the orchestrator stays adapter-agnostic.
//! Which variant serves which store is decided once, from configuration,
//! at orchestrator setup; it is data, not inheritance.

use anyhow::Result;
use async_trait::async_trait;

use crate::adapter_catalog::CatalogAdapter;
use crate::adapter_flyer::FlyerAdapter;
use crate::adapter_scrape::ScrapeAdapter;
use crate::config::AdapterConfig;
use crate::error::SourceError;
use crate::models::RawListing;

/// One fetch's yield: the extracted listings plus the count of source
/// records the adapter dropped as unextractable.
///
/// The skip count travels with the listings so the orchestrator can fold
/// it into the run report; an adapter-side skip is never invisible to the
/// run summary.
#[derive(Debug, Default)]
pub struct FetchBatch {
    pub listings: Vec<RawListing>,
    /// Source records skipped by the adapter (e.g. ambiguous flyer blocks).
    pub skipped: u64,
}

impl FetchBatch {
    /// A batch from a source that extracts every record or none.
    pub fn complete(listings: Vec<RawListing>) -> Self {
        Self {
            listings,
            skipped: 0,
        }
    }
}

/// A retailer source that produces raw listings for a given store.
///
/// Implementations own their transport state (HTTP client, authenticated
/// session); sessions are never shared across stores. `fetch` is the only
/// operation expected to block on I/O.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Variant identifier (`"catalog"`, `"scrape"`, `"flyer"`).
    fn kind(&self) -> &'static str;

    /// Fetches all raw listings for `store_id`.
    ///
    /// Store-level failures (transport, authentication, schema) surface as
    /// [`SourceError`]; per-record ambiguities inside a fetch are skipped
    /// by the adapter itself, counted in the batch, and never fail the
    /// call.
    async fn fetch(&self, store_id: &str) -> Result<FetchBatch, SourceError>;
}

/// Builds the adapter for one store's configuration.
pub fn resolve(config: &AdapterConfig) -> Result<Box<dyn SourceAdapter>> {
    Ok(match config {
        AdapterConfig::Catalog { endpoint, keyword } => {
            Box::new(CatalogAdapter::new(endpoint, keyword)?)
        }
        AdapterConfig::Scrape {
            base_url,
            username,
            password,
        } => Box::new(ScrapeAdapter::new(base_url, username, password)?),
        AdapterConfig::Flyer { dir } => Box::new(FlyerAdapter::new(dir.clone())),
    })
}
