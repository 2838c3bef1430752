//! pricewatch-core - Core library for pricewatch
//!
//! This crate contains the product models, price parsing, history
//! reconciliation, derived price metrics, key/value persistence, the AI
//! resolver client, and the refresh orchestration shared by every pricewatch
//! interface.

pub mod affiliate;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod history;
pub mod metrics;
pub mod models;
pub mod price;
pub mod resolver;
pub mod search;
pub mod services;
pub mod util;

pub use error::{Error, Result};
pub use models::{PriceHistoryEntry, Product, ProductId, StoreId, StoreOffer};
