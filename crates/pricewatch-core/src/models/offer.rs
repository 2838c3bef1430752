//! Store offer and price history models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Literal marker the resolver uses for "no price/URL found".
pub const NOT_AVAILABLE: &str = "N/A";

/// One of the two marketplaces tracked per product.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StoreId {
    Amazon,
    MercadoLivre,
}

impl StoreId {
    /// Every supported store, in display order.
    pub const ALL: [Self; 2] = [Self::Amazon, Self::MercadoLivre];

    /// Stable machine key (matches the serialized form).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Amazon => "amazon",
            Self::MercadoLivre => "mercado_livre",
        }
    }

    /// Human readable store name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Amazon => "Amazon",
            Self::MercadoLivre => "Mercado Livre",
        }
    }

    /// Query parameter carrying the affiliate identifier for this store.
    #[must_use]
    pub const fn affiliate_param(self) -> &'static str {
        match self {
            Self::Amazon => "tag",
            Self::MercadoLivre => "matt_tool",
        }
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for StoreId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_ascii_lowercase()
            .replace([' ', '-'], "_");
        match normalized.as_str() {
            "amazon" => Ok(Self::Amazon),
            "mercado_livre" | "mercadolivre" => Ok(Self::MercadoLivre),
            _ => Err(format!("unknown store '{}'", s.trim())),
        }
    }
}

/// Collapse the resolver's "not available" marker (and blanks) into `None`.
#[must_use]
pub fn normalize_sentinel(value: Option<String>) -> Option<String> {
    let value = crate::util::normalize_text_option(value)?;
    if value.eq_ignore_ascii_case(NOT_AVAILABLE) {
        None
    } else {
        Some(value)
    }
}

/// A single observed price. `price == None` records "not found".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    /// Observation time (Unix ms)
    pub timestamp: i64,
    /// Formatted price exactly as resolved
    pub price: Option<String>,
}

impl PriceHistoryEntry {
    #[must_use]
    pub fn new(timestamp: i64, price: Option<String>) -> Self {
        Self { timestamp, price }
    }
}

/// A product's listing on one store, with its append-only price log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOffer {
    pub store_id: StoreId,
    pub current_price: Option<String>,
    pub listing_url: Option<String>,
    #[serde(default)]
    pub history: Vec<PriceHistoryEntry>,
}

impl StoreOffer {
    /// Whether this offer has both a price and a listing to link to.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.current_price.is_some() && self.listing_url.is_some()
    }

    /// The most recent history entry, if any.
    #[must_use]
    pub fn last_entry(&self) -> Option<&PriceHistoryEntry> {
        self.history.last()
    }
}
