//! Authenticated-scrape adapter for login-protected storefronts.
//!
//! Drives a cookie session: POST the login form, then pull the store's
//! product listing from the JSON endpoint the storefront's own frontend
//! uses. The session is owned by this adapter instance and never shared
//! across stores.
//!
//! Authentication failures (rejected login, expired session on the data
//! request) are reported distinctly from transport failures.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use crate::adapter::{FetchBatch, SourceAdapter};
use crate::error::SourceError;
use crate::models::RawListing;

pub struct ScrapeAdapter {
    base_url: String,
    username: String,
    password: String,
    client: reqwest::Client,
}

impl ScrapeAdapter {
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            client,
        })
    }

    async fn login(&self) -> Result<(), SourceError> {
        let response = self
            .client
            .post(format!("{}/login", self.base_url))
            .form(&[("username", &self.username), ("password", &self.password)])
            .send()
            .await?;

        check_login_status(response.status())
    }
}

/// Classifies the login response status. A redirect counts as success
/// because storefronts bounce a fresh session to the landing page.
fn check_login_status(status: StatusCode) -> Result<(), SourceError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(SourceError::Authentication(format!(
            "login rejected with HTTP {status}"
        )));
    }
    if !status.is_success() && !status.is_redirection() {
        return Err(SourceError::Unavailable(format!(
            "login endpoint returned HTTP {status}"
        )));
    }
    Ok(())
}

/// Classifies the data request status. A 401/403 here means the session
/// died between login and the listing pull.
fn check_listing_status(status: StatusCode) -> Result<(), SourceError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(SourceError::Authentication(format!(
            "session expired: data request rejected with HTTP {status}"
        )));
    }
    if !status.is_success() {
        return Err(SourceError::Unavailable(format!(
            "storefront returned HTTP {status}"
        )));
    }
    Ok(())
}

#[async_trait]
impl SourceAdapter for ScrapeAdapter {
    fn kind(&self) -> &'static str {
        "scrape"
    }

    async fn fetch(&self, store_id: &str) -> Result<FetchBatch, SourceError> {
        self.login().await?;

        let response = self
            .client
            .get(format!(
                "{}/api/stores/{}/products",
                self.base_url, store_id
            ))
            .send()
            .await?;

        check_listing_status(response.status())?;

        let page: ListingPage = response
            .json()
            .await
            .map_err(|e| SourceError::Schema(e.to_string()))?;

        Ok(FetchBatch::complete(
            page.products
                .into_iter()
                .map(ScrapedProduct::into_listing)
                .collect(),
        ))
    }
}

// ============ Storefront payload ============

#[derive(Debug, Deserialize)]
struct ListingPage {
    products: Vec<ScrapedProduct>,
}

#[derive(Debug, Deserialize)]
struct ScrapedProduct {
    sku: String,
    ean: Option<String>,
    name: String,
    brand: Option<String>,
    price: f64,
    quantity: Option<f64>,
    unit: Option<String>,
}

impl ScrapedProduct {
    fn into_listing(self) -> RawListing {
        RawListing {
            sku: self.sku,
            gtin: self.ean,
            name: self.name,
            brand: self.brand,
            package_price: self.price,
            package_size: self.quantity,
            unit: self.unit,
            // The storefront never exposes a pre-computed unit price.
            reported_unit_price: None,
        }
    }
}
