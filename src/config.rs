use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration, loaded once at process start.
///
/// Store tables keep their TOML declaration order (`IndexMap`), which is
/// also the iteration order of an ingest run.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub stores: IndexMap<String, StoreConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Minimum delay between stores, to respect source rate limits.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    /// Upper bound on one store's fetch, so an unresponsive source cannot
    /// stall the whole run.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            throttle_ms: default_throttle_ms(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_throttle_ms() -> u64 {
    2_000
}
fn default_fetch_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// One configured (retailer, location) pair and the adapter that serves it.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub label: String,
    #[serde(flatten)]
    pub adapter: AdapterConfig,
}

/// Adapter variant selection plus its connection parameters, tagged by the
/// `adapter` key in each `[stores.<id>]` table.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "adapter", rename_all = "lowercase")]
pub enum AdapterConfig {
    /// Anonymous GraphQL catalog API.
    Catalog {
        endpoint: String,
        /// Search keyword the catalog query is filtered by.
        keyword: String,
    },
    /// Login-protected storefront driven through an authenticated session.
    Scrape {
        base_url: String,
        username: String,
        password: String,
    },
    /// Pre-extracted OCR text blocks, one `.txt` file per flyer page.
    Flyer { dir: PathBuf },
}

impl AdapterConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Catalog { .. } => "catalog",
            Self::Scrape { .. } => "scrape",
            Self::Flyer { .. } => "flyer",
        }
    }

    /// One-line source description for `pricegrid stores` output. Built
    /// from configuration alone, without constructing the adapter.
    pub fn describe(&self) -> String {
        match self {
            Self::Catalog { endpoint, keyword } => {
                format!("GraphQL catalog at {endpoint} (keyword {keyword:?})")
            }
            Self::Scrape { base_url, .. } => {
                format!("authenticated storefront at {}", base_url.trim_end_matches('/'))
            }
            Self::Flyer { dir } => format!("OCR text blocks under {}", dir.display()),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.ingest.fetch_timeout_secs == 0 {
        anyhow::bail!("ingest.fetch_timeout_secs must be > 0");
    }

    for (store_id, store) in &config.stores {
        if store.label.trim().is_empty() {
            anyhow::bail!("stores.{}.label must not be empty", store_id);
        }
        match &store.adapter {
            AdapterConfig::Catalog { endpoint, keyword } => {
                if endpoint.trim().is_empty() {
                    anyhow::bail!("stores.{}.endpoint must not be empty", store_id);
                }
                if keyword.trim().is_empty() {
                    anyhow::bail!("stores.{}.keyword must not be empty", store_id);
                }
            }
            AdapterConfig::Scrape {
                base_url, username, ..
            } => {
                if base_url.trim().is_empty() {
                    anyhow::bail!("stores.{}.base_url must not be empty", store_id);
                }
                if username.trim().is_empty() {
                    anyhow::bail!("stores.{}.username must not be empty", store_id);
                }
            }
            AdapterConfig::Flyer { .. } => {}
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Config {
        toml::from_str(s).unwrap()
    }

    const BASE: &str = r#"
[db]
path = "data/prices.sqlite"

[server]
bind = "127.0.0.1:7410"
"#;

    #[test]
    fn test_defaults() {
        let cfg = parse(BASE);
        assert_eq!(cfg.ingest.throttle_ms, 2_000);
        assert_eq!(cfg.ingest.fetch_timeout_secs, 60);
        assert!(cfg.stores.is_empty());
    }

    #[test]
    fn test_store_order_preserved() {
        let cfg = parse(&format!(
            r#"{BASE}
[stores.zeta]
label = "Zeta"
adapter = "flyer"
dir = "flyers/zeta"

[stores.alpha]
label = "Alpha"
adapter = "flyer"
dir = "flyers/alpha"
"#
        ));
        let order: Vec<&String> = cfg.stores.keys().collect();
        assert_eq!(order, ["zeta", "alpha"]);
    }

    #[test]
    fn test_adapter_variants() {
        let cfg = parse(&format!(
            r#"{BASE}
[stores."2024"]
label = "Esselunga Monza"
adapter = "catalog"
endpoint = "https://example.com/graphql"
keyword = "integrale"

[stores.eurospin]
label = "Eurospin Villasanta"
adapter = "scrape"
base_url = "https://example.com"
username = "shopper"
password = "secret"
"#
        ));
        assert_eq!(cfg.stores["2024"].adapter.kind(), "catalog");
        assert_eq!(cfg.stores["eurospin"].adapter.kind(), "scrape");
    }

    #[test]
    fn test_describe_from_configuration() {
        let catalog = AdapterConfig::Catalog {
            endpoint: "https://example.com/graphql".to_string(),
            keyword: "integrale".to_string(),
        };
        assert!(catalog.describe().contains("https://example.com/graphql"));

        let scrape = AdapterConfig::Scrape {
            base_url: "https://example.com/".to_string(),
            username: "shopper".to_string(),
            password: "secret".to_string(),
        };
        let described = scrape.describe();
        assert!(described.ends_with("https://example.com"));
        // Credentials never leak into operator-facing output.
        assert!(!described.contains("shopper"));
        assert!(!described.contains("secret"));
    }
}
