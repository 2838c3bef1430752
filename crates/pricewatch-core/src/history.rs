//! Price history reconciliation.
//!
//! A store's history is an append-only, change-triggered log: a fresh
//! observation is appended only when its raw price text differs from the last
//! recorded one. Comparison is on the formatted string, not the parsed
//! amount, so two unavailable observations are "unchanged" even though both
//! parse to infinity.

use crate::models::{PriceHistoryEntry, StoreOffer};
use crate::resolver::ResolvedOffer;

/// Merge a freshly fetched price into an existing history.
///
/// Returns `existing` extended by at most one entry. The new entry's
/// timestamp is never earlier than the previous entry's, so the log stays
/// chronologically ordered even if the clock steps backwards.
#[must_use]
pub fn reconcile(
    existing: &[PriceHistoryEntry],
    new_price: Option<&str>,
    now: i64,
) -> Vec<PriceHistoryEntry> {
    let mut history = existing.to_vec();
    match existing.last() {
        Some(last) if last.price.as_deref() == new_price => {}
        Some(last) => {
            history.push(PriceHistoryEntry::new(
                now.max(last.timestamp),
                new_price.map(str::to_string),
            ));
        }
        None => history.push(PriceHistoryEntry::new(now, new_price.map(str::to_string))),
    }
    history
}

impl StoreOffer {
    /// First observation of a store: a one-entry history, whatever the price.
    #[must_use]
    pub fn seeded(fresh: &ResolvedOffer, now: i64) -> Self {
        Self {
            store_id: fresh.store_id,
            current_price: fresh.price.clone(),
            listing_url: fresh.listing_url.clone(),
            history: reconcile(&[], fresh.price.as_deref(), now),
        }
    }

    /// Apply a fresh observation to this offer.
    ///
    /// The listing URL is replaced by the fresh one and the current price
    /// always mirrors the last history entry afterwards.
    #[must_use]
    pub fn reconciled(&self, fresh: &ResolvedOffer, now: i64) -> Self {
        let history = reconcile(&self.history, fresh.price.as_deref(), now);
        if history.len() > self.history.len() {
            tracing::debug!(
                "{} price changed: {:?} -> {:?}",
                self.store_id,
                self.current_price,
                fresh.price
            );
        }
        Self {
            store_id: self.store_id,
            current_price: history.last().and_then(|entry| entry.price.clone()),
            listing_url: fresh.listing_url.clone(),
            history,
        }
    }
}
