//! Product resolution through a generative-AI search call.
//!
//! The resolver takes the URL the user pasted and answers with the product's
//! name, image, and one offer per supported store. [`ProductResolver`] is the
//! seam the refresh orchestration depends on; [`GeminiResolver`] is the
//! production implementation.

mod gemini;
mod payload;

pub use gemini::{build_prompt, GeminiResolver};
pub use payload::extract_payload;

use crate::error::Result;
use crate::models::StoreId;

/// One store's listing as reported by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOffer {
    pub store_id: StoreId,
    /// Formatted price, `None` when the store has no price
    pub price: Option<String>,
    /// Listing URL, `None` when the store has no listing
    pub listing_url: Option<String>,
}

/// Validated resolver answer for one reference URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProduct {
    pub display_name: String,
    pub image_url: Option<String>,
    /// Exactly one offer per supported store, in [`StoreId::ALL`] order
    pub offers: Vec<ResolvedOffer>,
}

impl ResolvedProduct {
    #[must_use]
    pub fn offer(&self, store_id: StoreId) -> Option<&ResolvedOffer> {
        self.offers.iter().find(|offer| offer.store_id == store_id)
    }
}

/// Anything that can turn a product URL into per-store offers.
#[allow(async_fn_in_trait)]
pub trait ProductResolver {
    /// Resolve the product behind `reference_url`.
    async fn resolve(&self, reference_url: &str) -> Result<ResolvedProduct>;
}
