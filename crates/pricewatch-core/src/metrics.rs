//! Derived price metrics: best offer, recent drops, last-change delta.

use crate::models::{PriceHistoryEntry, Product, StoreOffer};
use crate::price::parse_price;

/// Default window for "recent" price changes (24h, in ms).
pub const DEFAULT_DROP_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Cheapest offer that has both a price and a listing URL.
///
/// A price that does not parse ranks last. Ties go to the store that comes
/// first in the product's store list.
#[must_use]
pub fn best_offer(product: &Product) -> Option<&StoreOffer> {
    product
        .stores
        .iter()
        .filter(|offer| offer.is_available())
        .map(|offer| (offer, parse_price(offer.current_price.as_deref())))
        .fold(None, |best: Option<(&StoreOffer, f64)>, (offer, price)| {
            match best {
                Some((_, best_price)) if best_price <= price => best,
                _ => Some((offer, price)),
            }
        })
        .map(|(offer, _)| offer)
}

/// Lowest comparable price of a product; `f64::INFINITY` when nothing qualifies.
#[must_use]
pub fn lowest_price(product: &Product) -> f64 {
    best_offer(product).map_or(f64::INFINITY, |offer| {
        parse_price(offer.current_price.as_deref())
    })
}

fn within_window(entry: &PriceHistoryEntry, now: i64, window_ms: i64) -> bool {
    now.saturating_sub(entry.timestamp) <= window_ms
}

fn last_two(history: &[PriceHistoryEntry]) -> Option<(&PriceHistoryEntry, &PriceHistoryEntry)> {
    match history {
        [.., previous, last] => Some((previous, last)),
        _ => None,
    }
}

/// Whether the store's latest change, inside `window_ms` of `now`, was a drop.
#[must_use]
pub fn offer_has_recent_drop(offer: &StoreOffer, now: i64, window_ms: i64) -> bool {
    let Some((previous, last)) = last_two(&offer.history) else {
        return false;
    };
    let previous_price = parse_price(previous.price.as_deref());
    let last_price = parse_price(last.price.as_deref());
    within_window(last, now, window_ms) && previous_price.is_finite() && last_price < previous_price
}

/// Whether any store of `product` dropped its price within `window_ms` of `now`.
///
/// A change into or out of availability is never a drop.
#[must_use]
pub fn has_recent_price_drop(product: &Product, now: i64, window_ms: i64) -> bool {
    product
        .stores
        .iter()
        .any(|offer| offer_has_recent_drop(offer, now, window_ms))
}

/// Signed difference between the last two prices of a history.
///
/// Only produced when the last entry is inside the window and both prices
/// are real amounts.
#[must_use]
pub fn price_change_delta(history: &[PriceHistoryEntry], now: i64, window_ms: i64) -> Option<f64> {
    let (previous, last) = last_two(history)?;
    if !within_window(last, now, window_ms) {
        return None;
    }
    let last_price = parse_price(last.price.as_deref());
    let previous_price = parse_price(previous.price.as_deref());
    if last_price.is_finite() && previous_price.is_finite() {
        Some(last_price - previous_price)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::{ProductId, StoreId};

    const HOUR: i64 = 60 * 60 * 1000;

    fn offer(store_id: StoreId, history: &[(i64, Option<&str>)], url: Option<&str>) -> StoreOffer {
        let history = history
            .iter()
            .map(|(timestamp, price)| PriceHistoryEntry::new(*timestamp, price.map(str::to_string)))
            .collect::<Vec<_>>();
        StoreOffer {
            store_id,
            current_price: history.last().and_then(|entry| entry.price.clone()),
            listing_url: url.map(str::to_string),
            history,
        }
    }

    fn product(stores: Vec<StoreOffer>) -> Product {
        Product {
            id: ProductId::new(),
            display_name: "Cafeteira".to_string(),
            image_url: None,
            source_url: "https://example.com/cafeteira".to_string(),
            stores,
            affiliate_overrides: BTreeMap::new(),
            created_at: 0,
        }
    }

    const AMZ: Option<&str> = Some("https://www.amazon.com.br/dp/B0");
    const ML: Option<&str> = Some("https://produto.mercadolivre.com.br/MLB-1");

    #[test]
    fn best_offer_picks_lowest_price() {
        let product = product(vec![
            offer(StoreId::Amazon, &[(0, Some("R$ 120,00"))], AMZ),
            offer(StoreId::MercadoLivre, &[(0, Some("R$ 99,90"))], ML),
        ]);
        assert_eq!(best_offer(&product).unwrap().store_id, StoreId::MercadoLivre);
        assert!((lowest_price(&product) - 99.9).abs() < 1e-9);
    }

    #[test]
    fn best_offer_ties_go_to_first_store() {
        let product = product(vec![
            offer(StoreId::Amazon, &[(0, Some("R$ 50,00"))], AMZ),
            offer(StoreId::MercadoLivre, &[(0, Some("R$50,00"))], ML),
        ]);
        assert_eq!(best_offer(&product).unwrap().store_id, StoreId::Amazon);
    }

    #[test]
    fn best_offer_skips_missing_price_or_url() {
        let product = product(vec![
            offer(StoreId::Amazon, &[(0, Some("R$ 10,00"))], None),
            offer(StoreId::MercadoLivre, &[(0, Some("R$ 20,00"))], ML),
        ]);
        assert_eq!(best_offer(&product).unwrap().store_id, StoreId::MercadoLivre);
    }

    #[test]
    fn unparseable_price_still_qualifies_but_ranks_last() {
        let alone = product(vec![offer(StoreId::Amazon, &[(0, Some("consulte"))], AMZ)]);
        assert_eq!(best_offer(&alone).unwrap().store_id, StoreId::Amazon);
        assert_eq!(lowest_price(&alone), f64::INFINITY);

        let priced = product(vec![
            offer(StoreId::Amazon, &[(0, Some("consulte"))], AMZ),
            offer(StoreId::MercadoLivre, &[(0, Some("R$ 20,00"))], ML),
        ]);
        assert_eq!(best_offer(&priced).unwrap().store_id, StoreId::MercadoLivre);
    }

    #[test]
    fn all_unavailable_has_no_best_offer() {
        let product = product(vec![
            offer(StoreId::Amazon, &[(0, None)], AMZ),
            offer(StoreId::MercadoLivre, &[(0, None)], None),
        ]);
        assert!(best_offer(&product).is_none());
        assert_eq!(lowest_price(&product), f64::INFINITY);
    }

    #[test]
    fn recent_drop_detected_within_window() {
        let now = 30 * HOUR;
        let product = product(vec![offer(
            StoreId::Amazon,
            &[(0, Some("R$100,00")), (now - HOUR, Some("R$80,00"))],
            AMZ,
        )]);
        assert!(has_recent_price_drop(&product, now, DEFAULT_DROP_WINDOW_MS));
        assert!(!has_recent_price_drop(
            &product,
            now + 48 * HOUR,
            DEFAULT_DROP_WINDOW_MS
        ));
    }

    #[test]
    fn single_entry_histories_never_drop() {
        let product = product(vec![
            offer(StoreId::Amazon, &[(0, Some("R$100,00"))], AMZ),
            offer(StoreId::MercadoLivre, &[(0, Some("R$90,00"))], ML),
        ]);
        assert!(!has_recent_price_drop(&product, 0, DEFAULT_DROP_WINDOW_MS));
    }

    #[test]
    fn availability_transitions_are_not_drops() {
        let appeared = product(vec![offer(
            StoreId::Amazon,
            &[(0, None), (10, Some("R$80,00"))],
            AMZ,
        )]);
        assert!(!has_recent_price_drop(&appeared, 10, DEFAULT_DROP_WINDOW_MS));

        let vanished = product(vec![offer(
            StoreId::Amazon,
            &[(0, Some("R$80,00")), (10, None)],
            AMZ,
        )]);
        assert!(!has_recent_price_drop(&vanished, 10, DEFAULT_DROP_WINDOW_MS));

        let restocked_cheaper = product(vec![offer(
            StoreId::Amazon,
            &[(0, Some("R$100,00")), (5, None), (10, Some("R$80,00"))],
            AMZ,
        )]);
        assert!(!has_recent_price_drop(&restocked_cheaper, 10, DEFAULT_DROP_WINDOW_MS));
    }

    #[test]
    fn any_store_can_signal_a_drop() {
        let product = product(vec![
            offer(StoreId::Amazon, &[(0, Some("R$10,00")), (5, Some("R$12,00"))], AMZ),
            offer(StoreId::MercadoLivre, &[(0, Some("R$10,00")), (5, Some("R$9,00"))], ML),
        ]);
        assert!(has_recent_price_drop(&product, 5, DEFAULT_DROP_WINDOW_MS));
    }

    #[test]
    fn delta_is_signed_difference_of_last_two() {
        let offer = offer(
            StoreId::Amazon,
            &[(0, Some("R$100,00")), (10, Some("R$80,00"))],
            AMZ,
        );
        let delta = price_change_delta(&offer.history, 10, DEFAULT_DROP_WINDOW_MS).unwrap();
        assert!((delta + 20.0).abs() < 1e-9);
    }

    #[test]
    fn delta_requires_window_and_finite_prices() {
        let stale = offer(
            StoreId::Amazon,
            &[(0, Some("R$100,00")), (10, Some("R$80,00"))],
            AMZ,
        );
        assert_eq!(
            price_change_delta(&stale.history, 10 + 25 * HOUR, DEFAULT_DROP_WINDOW_MS),
            None
        );

        let vanished = offer(StoreId::Amazon, &[(0, Some("R$100,00")), (10, None)], AMZ);
        assert_eq!(
            price_change_delta(&vanished.history, 10, DEFAULT_DROP_WINDOW_MS),
            None
        );

        let single = offer(StoreId::Amazon, &[(0, Some("R$100,00"))], AMZ);
        assert_eq!(
            price_change_delta(&single.history, 0, DEFAULT_DROP_WINDOW_MS),
            None
        );
    }
}
