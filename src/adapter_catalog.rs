//! Catalog-API adapter: anonymous GraphQL product search.
//!
//! Issues a `productsSearch` query filtered by store and a configured
//! keyword, and maps the response edges to raw listings. The catalog
//! reports package price, package size + unit, a pre-computed unit price,
//! and usually a gtin.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::adapter::{FetchBatch, SourceAdapter};
use crate::error::SourceError;
use crate::models::RawListing;

const PRODUCTS_SEARCH_QUERY: &str = r#"
query ProductsSearch($storeId: ID!, $text: String!) {
  productsSearch(storeId: $storeId, searchText: $text, first: 50) {
    edges {
      node {
        id
        name
        brand
        price {
          price
          unitPrice
          unitSize
          unit
        }
        gtin
      }
    }
  }
}
"#;

pub struct CatalogAdapter {
    endpoint: String,
    keyword: String,
    client: reqwest::Client,
}

impl CatalogAdapter {
    pub fn new(endpoint: &str, keyword: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            keyword: keyword.to_string(),
            client,
        })
    }
}

#[async_trait]
impl SourceAdapter for CatalogAdapter {
    fn kind(&self) -> &'static str {
        "catalog"
    }

    async fn fetch(&self, store_id: &str) -> Result<FetchBatch, SourceError> {
        let body = json!({
            "query": PRODUCTS_SEARCH_QUERY,
            "variables": { "storeId": store_id, "text": self.keyword },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Unavailable(format!(
                "catalog returned HTTP {status}"
            )));
        }

        let payload: CatalogResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Schema(e.to_string()))?;

        let edges = payload
            .data
            .ok_or_else(|| SourceError::Schema("response has no data field".to_string()))?
            .products_search
            .ok_or_else(|| SourceError::Schema("response has no productsSearch field".to_string()))?
            .edges;

        Ok(FetchBatch::complete(
            edges.into_iter().map(|e| e.node.into_listing()).collect(),
        ))
    }
}

// ============ Response schema ============

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    data: Option<CatalogData>,
}

#[derive(Debug, Deserialize)]
struct CatalogData {
    #[serde(rename = "productsSearch")]
    products_search: Option<ProductsSearch>,
}

#[derive(Debug, Deserialize)]
struct ProductsSearch {
    #[serde(default)]
    edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
struct Edge {
    node: ProductNode,
}

#[derive(Debug, Deserialize)]
struct ProductNode {
    id: String,
    name: String,
    brand: Option<String>,
    price: ProductPrice,
    gtin: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProductPrice {
    price: f64,
    #[serde(rename = "unitPrice")]
    unit_price: Option<f64>,
    #[serde(rename = "unitSize")]
    unit_size: Option<f64>,
    unit: Option<String>,
}

impl ProductNode {
    fn into_listing(self) -> RawListing {
        RawListing {
            sku: self.id,
            gtin: self.gtin,
            name: self.name,
            brand: self.brand,
            package_price: self.price.price,
            package_size: self.price.unit_size,
            unit: self.price.unit,
            reported_unit_price: self.price.unit_price,
        }
    }
}
