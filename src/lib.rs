//! # Pricegrid
//!
//! A multi-retailer grocery price ingestion and comparison pipeline.
//!
//! Pricegrid pulls product pricing from heterogeneous retailer sources
//! (GraphQL catalog APIs, login-protected storefronts, OCR-parsed
//! flyers), normalizes every listing to a canonical per-unit price,
//! appends it to a deduplicating price history in SQLite, and answers
//! compare-by-gtin and search-by-name queries over the accumulated
//! history via a CLI and a small HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌───────────┐
//! │   Adapters   │──▶│  Normalizer   │──▶│  SQLite    │
//! │ catalog/     │   │ per-unit      │   │ append-only│
//! │ scrape/flyer │   │ price         │   │ + dedup    │
//! └──────────────┘   └───────────────┘   └────┬──────┘
//!        ▲                                    │
//!   ┌────┴─────┐                ┌─────────────┤
//!   │Orchestra-│                ▼             ▼
//!   │tor (run) │          ┌──────────┐  ┌──────────┐
//!   └──────────┘          │   CLI    │  │   HTTP   │
//!                         └──────────┘  └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! pricegrid init                  # create database
//! pricegrid ingest                # run one fetch over all stores
//! pricegrid compare 8001234567890 # history for one gtin
//! pricegrid search "integrale"    # latest snapshot per store
//! pricegrid serve                 # start HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`unit`] | Per-unit price normalization |
//! | [`adapter`] | Source-adapter contract and resolution |
//! | [`adapter_catalog`] | GraphQL catalog adapter |
//! | [`adapter_scrape`] | Authenticated storefront adapter |
//! | [`adapter_flyer`] | OCR flyer-text adapter |
//! | [`normalize`] | Raw listing → canonical record |
//! | [`history`] | Append-only, deduplicating price store |
//! | [`ingest`] | Per-store orchestration with failure isolation |
//! | [`query`] | Compare and search |
//! | [`server`] | Placeholder HTTP API |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod adapter;
pub mod adapter_catalog;
pub mod adapter_flyer;
pub mod adapter_scrape;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod normalize;
pub mod query;
pub mod server;
pub mod stores;
pub mod unit;
