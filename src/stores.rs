use anyhow::Result;

use crate::config::{AdapterConfig, Config};

/// Lists configured stores with their adapter variant and a cheap local
/// health check (remote sources are only probed by an actual ingest).
/// Rendered from configuration alone; no adapter is constructed.
pub fn list_stores(config: &Config) -> Result<()> {
    if config.stores.is_empty() {
        println!("No stores configured.");
        return Ok(());
    }

    println!("{:<12} {:<8} {:<10} SOURCE", "STORE", "ADAPTER", "STATUS");
    for (store_id, store) in &config.stores {
        let status = match &store.adapter {
            AdapterConfig::Flyer { dir } => {
                if dir.is_dir() {
                    "OK"
                } else {
                    "MISSING"
                }
            }
            _ => "OK",
        };
        println!(
            "{:<12} {:<8} {:<10} {}",
            store_id,
            store.adapter.kind(),
            status,
            store.adapter.describe()
        );
        println!("{:<12} {:<8} {:<10} {}", "", "", "", store.label);
    }

    Ok(())
}
