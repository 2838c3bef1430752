//! Strict extraction of the resolver's JSON answer from model output.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::{ResolvedOffer, ResolvedProduct};
use crate::error::{Error, Result};
use crate::models::{normalize_sentinel, StoreId};
use crate::price::is_priced;
use crate::util::{compact_text, is_http_url};

#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    stores: Option<Vec<RawOffer>>,
}

#[derive(Debug, Deserialize)]
struct RawOffer {
    store: String,
    price: String,
    url: String,
}

fn json_region(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Pull the single JSON object out of free-form model text and validate it.
///
/// Text before the first `{` and after the last `}` is ignored. The payload
/// must carry a non-empty `name` and exactly one `stores` entry per
/// supported store, each with `store`, `price`, and `url` strings (`"N/A"`
/// when not found). A non-empty `error` field is returned as a resolution
/// failure carrying that message. Prices that are not recognizable amounts
/// are recorded as unavailable; listing URLs must be `http(s)` or `"N/A"`.
pub fn extract_payload(text: &str) -> Result<ResolvedProduct> {
    let region = json_region(text).ok_or_else(|| {
        Error::Resolution(format!(
            "response did not contain a JSON object: {}",
            compact_text(text)
        ))
    })?;

    let raw: RawPayload = serde_json::from_str(region)
        .map_err(|error| Error::Resolution(format!("malformed resolver payload: {error}")))?;

    if let Some(message) = crate::util::normalize_text_option(raw.error) {
        return Err(Error::Resolution(message));
    }

    let display_name = crate::util::normalize_text_option(raw.name)
        .ok_or_else(|| Error::Resolution("resolver payload is missing 'name'".to_string()))?;

    let image_url = normalize_sentinel(raw.image_url).filter(|url| is_http_url(url));

    let raw_offers = raw
        .stores
        .ok_or_else(|| Error::Resolution("resolver payload is missing 'stores'".to_string()))?;

    let mut offers = BTreeMap::new();
    for raw_offer in raw_offers {
        let offer = validate_offer(raw_offer)?;
        if offers.insert(offer.store_id, offer).is_some() {
            return Err(Error::Resolution(
                "resolver payload lists a store more than once".to_string(),
            ));
        }
    }

    let offers = StoreId::ALL
        .iter()
        .map(|store_id| {
            offers.remove(store_id).ok_or_else(|| {
                Error::Resolution(format!("resolver payload is missing an offer for {store_id}"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ResolvedProduct {
        display_name,
        image_url,
        offers,
    })
}

fn validate_offer(raw: RawOffer) -> Result<ResolvedOffer> {
    let store_id = raw
        .store
        .parse::<StoreId>()
        .map_err(|error| Error::Resolution(format!("resolver payload: {error}")))?;

    let price = normalize_sentinel(Some(raw.price)).and_then(|price| {
        if is_priced(Some(&price)) {
            Some(price)
        } else {
            tracing::warn!("{store_id}: unrecognized price '{price}', recording as unavailable");
            None
        }
    });

    let listing_url = normalize_sentinel(Some(raw.url));
    if let Some(url) = listing_url.as_deref() {
        if !is_http_url(url) {
            return Err(Error::Resolution(format!(
                "resolver payload has an invalid {store_id} URL: {}",
                compact_text(url)
            )));
        }
    }

    Ok(ResolvedOffer {
        store_id,
        price,
        listing_url,
    })
}
