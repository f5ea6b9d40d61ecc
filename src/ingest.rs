//! Ingestion orchestration.
//!
//! One run walks the configured stores in configuration order, drives each
//! store through fetch → normalize → persist, and isolates failures at two
//! boundaries: a bad record never aborts its store, and a failed store
//! never aborts the run. Between stores the run sleeps for the configured
//! throttle so rate-limited sources are not hammered.
//!
//! Concurrency model: stores are processed sequentially within a run.
//! Runs triggered while a previous run is still in flight are safe because
//! the history store's dedup index, not orchestrator state, is the point
//! of mutual exclusion.

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::adapter::{self, SourceAdapter};
use crate::config::Config;
use crate::history::{self, Appended};
use crate::models::{RunSummary, Store, StoreReport};
use crate::normalize::normalize_listing;

/// A resolved ingest plan: each configured store paired with its adapter,
/// in configuration order.
pub struct Orchestrator {
    targets: Vec<(Store, Box<dyn SourceAdapter>)>,
    throttle: Duration,
    fetch_timeout: Duration,
}

impl Orchestrator {
    /// Resolves every configured store's adapter once, up front.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut targets = Vec::new();
        for (store_id, store_config) in &config.stores {
            let store = Store {
                store_id: store_id.clone(),
                label: store_config.label.clone(),
            };
            targets.push((store, adapter::resolve(&store_config.adapter)?));
        }
        Ok(Self {
            targets,
            throttle: Duration::from_millis(config.ingest.throttle_ms),
            fetch_timeout: Duration::from_secs(config.ingest.fetch_timeout_secs),
        })
    }

    /// Builds an orchestrator from explicit targets. Used by tests to
    /// inject adapters without network-backed configuration.
    pub fn new(
        targets: Vec<(Store, Box<dyn SourceAdapter>)>,
        throttle: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            targets,
            throttle,
            fetch_timeout,
        }
    }

    /// Executes one run over all stores (or the given subset), returning
    /// the per-store completion/failure summary. Never fails as a whole:
    /// store errors land in `summary.failed`.
    pub async fn run(&self, pool: &SqlitePool, store_filter: &[String]) -> RunSummary {
        let mut summary = RunSummary::new();
        let mut first = true;

        for (store, adapter) in &self.targets {
            if !store_filter.is_empty() && !store_filter.contains(&store.store_id) {
                continue;
            }
            if !first {
                tokio::time::sleep(self.throttle).await;
            }
            first = false;

            info!(store_id = %store.store_id, label = %store.label, "fetching");
            match self.run_store(pool, store, adapter.as_ref()).await {
                Ok(report) => {
                    info!(
                        store_id = %store.store_id,
                        persisted = report.persisted,
                        duplicates = report.duplicates,
                        skipped = report.skipped,
                        failed = report.failed,
                        "store completed"
                    );
                    summary.completed.push(report);
                }
                Err(err) => {
                    warn!(store_id = %store.store_id, %err, "store failed");
                    summary.failed.push((store.store_id.clone(), err.to_string()));
                }
            }
        }

        summary
    }

    /// One store's pass: Fetching → Normalizing → Persisting.
    ///
    /// Returns `Err` only for store-level failures (adapter error, fetch
    /// timeout, systemic storage failure); record-level failures are
    /// counted in the report and the batch continues.
    async fn run_store(
        &self,
        pool: &SqlitePool,
        store: &Store,
        adapter: &dyn SourceAdapter,
    ) -> Result<StoreReport> {
        let mut report = StoreReport::new(&store.store_id);

        let batch = tokio::time::timeout(self.fetch_timeout, adapter.fetch(&store.store_id))
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "source unavailable: fetch timed out after {}s",
                    self.fetch_timeout.as_secs()
                )
            })??;
        report.fetched = batch.listings.len() as u64;
        report.skipped = batch.skipped;

        // One capture timestamp per store per run: the snapshot the dedup
        // key buckets on.
        let captured_at = Utc::now();

        for listing in &batch.listings {
            let record = match normalize_listing(listing, &store.store_id, captured_at) {
                Ok(record) => record,
                Err(err) => {
                    report.failed += 1;
                    warn!(store_id = %store.store_id, sku = %listing.sku, %err, "record dropped");
                    continue;
                }
            };
            report.normalized += 1;

            match history::append(pool, &record).await {
                Ok(Appended::Inserted) => report.persisted += 1,
                Ok(Appended::Duplicate) => report.duplicates += 1,
                Err(err) if err.is_systemic() => {
                    // The connection is gone; remaining writes for this
                    // store cannot succeed.
                    return Err(err.into());
                }
                Err(err) => {
                    report.failed += 1;
                    warn!(store_id = %store.store_id, sku = %listing.sku, %err, "append failed");
                }
            }
        }

        Ok(report)
    }
}

/// CLI entry point: resolve adapters, run once, print the summary.
pub async fn run_ingest(config: &Config, store_filter: &[String]) -> Result<RunSummary> {
    let pool = crate::db::connect(config).await?;
    let orchestrator = Orchestrator::from_config(config)?;
    let summary = orchestrator.run(&pool, store_filter).await;
    pool.close().await;

    println!("ingest run");
    for report in &summary.completed {
        println!(
            "  {}: fetched {} / normalized {} / persisted {} / duplicate {} / skipped {} / failed {}",
            report.store_id,
            report.fetched,
            report.normalized,
            report.persisted,
            report.duplicates,
            report.skipped,
            report.failed
        );
    }
    for (store_id, err) in &summary.failed {
        println!("  {}: FAILED ({})", store_id, err);
    }
    println!(
        "completed: {}, failed: {}",
        summary.completed.len(),
        summary.failed.len()
    );

    Ok(summary)
}
