//! Product model

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{StoreId, StoreOffer};

/// A unique identifier for a tracked product, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Create a new unique product ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A tracked product and its offers on each store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Name as reported by the resolver
    pub display_name: String,
    /// Product image, when one was found
    pub image_url: Option<String>,
    /// URL the user asked to track
    pub source_url: String,
    /// At most one offer per store, in resolver order
    pub stores: Vec<StoreOffer>,
    /// Per-product affiliate identifiers overriding the global defaults
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub affiliate_overrides: BTreeMap<StoreId, String>,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
}

impl Product {
    /// Offer for the given store, if the product has one.
    #[must_use]
    pub fn offer(&self, store_id: StoreId) -> Option<&StoreOffer> {
        self.stores.iter().find(|offer| offer.store_id == store_id)
    }

    /// Affiliate identifier override for one store.
    #[must_use]
    pub fn affiliate_override(&self, store_id: StoreId) -> Option<&str> {
        self.affiliate_overrides.get(&store_id).map(String::as_str)
    }

    /// Set the affiliate override for one store; a blank value removes it.
    pub fn set_affiliate_override(&mut self, store_id: StoreId, value: Option<String>) {
        match crate::util::normalize_text_option(value) {
            Some(value) => {
                self.affiliate_overrides.insert(store_id, value);
            }
            None => {
                self.affiliate_overrides.remove(&store_id);
            }
        }
    }

    /// Name truncated to `max_len` characters for list displays.
    #[must_use]
    pub fn title_preview(&self, max_len: usize) -> String {
        let collapsed = self
            .display_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if collapsed.chars().count() <= max_len {
            collapsed
        } else {
            let mut truncated = collapsed
                .chars()
                .take(max_len.saturating_sub(3))
                .collect::<String>();
            truncated.push_str("...");
            truncated
        }
    }
}
