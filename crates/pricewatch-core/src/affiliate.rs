//! Affiliate link decoration for store listings.

use std::collections::BTreeMap;

use url::Url;

use crate::models::{normalize_sentinel, Product, StoreId};

/// Pick the affiliate identifier for a product's store listing.
///
/// The product's own override wins over the global default.
#[must_use]
pub fn resolve_affiliate_id<'a>(
    product: &'a Product,
    store_id: StoreId,
    defaults: &'a BTreeMap<StoreId, String>,
) -> Option<&'a str> {
    product
        .affiliate_override(store_id)
        .or_else(|| defaults.get(&store_id).map(String::as_str))
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

/// Set the store's affiliate query parameter on a listing URL.
///
/// Returns `None` when there is no listing (missing or `"N/A"`). A listing
/// is returned untouched when no affiliate id is given or the URL does not
/// parse. An existing value of the parameter is replaced, other query
/// parameters are kept in order.
#[must_use]
pub fn affiliate_link(
    listing_url: Option<&str>,
    store_id: StoreId,
    affiliate_id: Option<&str>,
) -> Option<String> {
    let listing_url = normalize_sentinel(listing_url.map(str::to_string))?;
    let Some(affiliate_id) = affiliate_id.map(str::trim).filter(|id| !id.is_empty()) else {
        return Some(listing_url);
    };

    let mut parsed = match Url::parse(&listing_url) {
        Ok(parsed) => parsed,
        Err(error) => {
            tracing::debug!("Leaving unparsable listing URL as-is ({error}): {listing_url}");
            return Some(listing_url);
        }
    };

    let param = store_id.affiliate_param();
    let retained = parsed
        .query_pairs()
        .filter(|(key, _)| key != param)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect::<Vec<_>>();

    parsed
        .query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair(param, affiliate_id);

    Some(parsed.into())
}

/// Affiliate-decorated listing for one store of a product.
#[must_use]
pub fn product_store_link(
    product: &Product,
    store_id: StoreId,
    defaults: &BTreeMap<StoreId, String>,
) -> Option<String> {
    let offer = product.offer(store_id)?;
    affiliate_link(
        offer.listing_url.as_deref(),
        store_id,
        resolve_affiliate_id(product, store_id, defaults),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductId, StoreOffer};

    #[test]
    fn appends_store_specific_parameter() {
        assert_eq!(
            affiliate_link(
                Some("https://www.amazon.com.br/dp/B0TEST"),
                StoreId::Amazon,
                Some("meutag-20")
            )
            .as_deref(),
            Some("https://www.amazon.com.br/dp/B0TEST?tag=meutag-20")
        );
        assert_eq!(
            affiliate_link(
                Some("https://produto.mercadolivre.com.br/MLB-1?x=1"),
                StoreId::MercadoLivre,
                Some("123")
            )
            .as_deref(),
            Some("https://produto.mercadolivre.com.br/MLB-1?x=1&matt_tool=123")
        );
    }

    #[test]
    fn replaces_existing_parameter() {
        assert_eq!(
            affiliate_link(
                Some("https://www.amazon.com.br/dp/B0?tag=old-20&th=1"),
                StoreId::Amazon,
                Some("new-20")
            )
            .as_deref(),
            Some("https://www.amazon.com.br/dp/B0?th=1&tag=new-20")
        );
    }

    #[test]
    fn leaves_url_alone_without_id_or_when_unparsable() {
        assert_eq!(
            affiliate_link(Some("https://a.example/p"), StoreId::Amazon, None).as_deref(),
            Some("https://a.example/p")
        );
        assert_eq!(
            affiliate_link(Some("https://a.example/p"), StoreId::Amazon, Some("  ")).as_deref(),
            Some("https://a.example/p")
        );
        assert_eq!(
            affiliate_link(Some("not a url"), StoreId::Amazon, Some("t-20")).as_deref(),
            Some("not a url")
        );
    }

    #[test]
    fn missing_listing_yields_nothing() {
        assert_eq!(affiliate_link(None, StoreId::Amazon, Some("t-20")), None);
        assert_eq!(affiliate_link(Some("N/A"), StoreId::Amazon, Some("t-20")), None);
    }

    #[test]
    fn product_override_wins_over_default() {
        let mut product = Product {
            id: ProductId::new(),
            display_name: "Kindle".to_string(),
            image_url: None,
            source_url: "https://www.amazon.com.br/dp/B0".to_string(),
            stores: vec![StoreOffer {
                store_id: StoreId::Amazon,
                current_price: Some("R$ 499,00".to_string()),
                listing_url: Some("https://www.amazon.com.br/dp/B0".to_string()),
                history: Vec::new(),
            }],
            affiliate_overrides: BTreeMap::new(),
            created_at: 0,
        };
        let defaults = BTreeMap::from([(StoreId::Amazon, "global-20".to_string())]);

        assert_eq!(
            resolve_affiliate_id(&product, StoreId::Amazon, &defaults),
            Some("global-20")
        );
        assert_eq!(
            resolve_affiliate_id(&product, StoreId::MercadoLivre, &defaults),
            None
        );

        product
            .affiliate_overrides
            .insert(StoreId::Amazon, "product-20".to_string());
        assert_eq!(
            product_store_link(&product, StoreId::Amazon, &defaults).as_deref(),
            Some("https://www.amazon.com.br/dp/B0?tag=product-20")
        );
    }
}
