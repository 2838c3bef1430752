//! Resolve and refresh orchestration.
//!
//! Every product is re-resolved independently; results are joined only once
//! every request has settled, so one failing product never cancels or taints
//! the others. No retry or timeout policy lives here beyond the resolver's
//! own HTTP timeout.

use std::collections::BTreeMap;

use futures::future::join_all;

use crate::error::{Error, Result};
use crate::models::{Product, ProductId, StoreOffer};
use crate::resolver::{ProductResolver, ResolvedProduct};

/// Build a brand new product from a resolution, seeding one entry per store.
#[must_use]
pub fn new_product(source_url: &str, resolved: &ResolvedProduct, now: i64) -> Product {
    Product {
        id: ProductId::new(),
        display_name: resolved.display_name.clone(),
        image_url: resolved.image_url.clone(),
        source_url: source_url.trim().to_string(),
        stores: resolved
            .offers
            .iter()
            .map(|offer| StoreOffer::seeded(offer, now))
            .collect(),
        affiliate_overrides: BTreeMap::new(),
        created_at: now,
    }
}

/// Merge a fresh resolution into an existing product.
///
/// Each store's history is reconciled; stores the product did not have yet
/// are seeded and appended. Identity, source URL, and affiliate overrides
/// carry over unchanged.
#[must_use]
pub fn apply_resolution(product: &Product, resolved: &ResolvedProduct, now: i64) -> Product {
    let mut stores = product
        .stores
        .iter()
        .map(|offer| {
            resolved
                .offer(offer.store_id)
                .map_or_else(|| offer.clone(), |fresh| offer.reconciled(fresh, now))
        })
        .collect::<Vec<_>>();

    for fresh in &resolved.offers {
        if product.offer(fresh.store_id).is_none() {
            stores.push(StoreOffer::seeded(fresh, now));
        }
    }

    Product {
        id: product.id,
        display_name: resolved.display_name.clone(),
        image_url: resolved.image_url.clone(),
        source_url: product.source_url.clone(),
        stores,
        affiliate_overrides: product.affiliate_overrides.clone(),
        created_at: product.created_at,
    }
}

/// Point an existing product at a different listing.
///
/// History starts over because prices of a different listing are not
/// comparable; identity and affiliate overrides are kept.
#[must_use]
pub fn repointed(
    product: &Product,
    new_source_url: &str,
    resolved: &ResolvedProduct,
    now: i64,
) -> Product {
    Product {
        id: product.id,
        affiliate_overrides: product.affiliate_overrides.clone(),
        created_at: product.created_at,
        ..new_product(new_source_url, resolved, now)
    }
}

fn validated_url(source_url: &str) -> Result<&str> {
    let source_url = source_url.trim();
    if crate::util::is_http_url(source_url) {
        Ok(source_url)
    } else {
        Err(Error::InvalidInput(format!(
            "product URL must start with http:// or https://: {source_url}"
        )))
    }
}

/// Resolve a URL the user wants to start tracking.
pub async fn resolve_new<R: ProductResolver>(
    resolver: &R,
    source_url: &str,
    now: i64,
) -> Result<Product> {
    let source_url = validated_url(source_url)?;
    let resolved = resolver.resolve(source_url).await?;
    Ok(new_product(source_url, &resolved, now))
}

/// Re-resolve one product and reconcile its histories.
pub async fn refresh_product<R: ProductResolver>(
    resolver: &R,
    product: &Product,
    now: i64,
) -> Result<Product> {
    let resolved = resolver.resolve(&product.source_url).await?;
    Ok(apply_resolution(product, &resolved, now))
}

/// Edit a product's source URL.
///
/// The same URL behaves like a refresh; a different URL replaces history.
pub async fn repoint<R: ProductResolver>(
    resolver: &R,
    product: &Product,
    new_source_url: &str,
    now: i64,
) -> Result<Product> {
    let new_source_url = validated_url(new_source_url)?;
    if new_source_url == product.source_url {
        return refresh_product(resolver, product, now).await;
    }
    let resolved = resolver.resolve(new_source_url).await?;
    Ok(repointed(product, new_source_url, &resolved, now))
}

/// Re-resolve every product concurrently, one result per input, in order.
pub async fn refresh_each<R: ProductResolver>(
    resolver: &R,
    products: &[Product],
    now: i64,
) -> Vec<Result<Product>> {
    join_all(
        products
            .iter()
            .map(|product| refresh_product(resolver, product, now)),
    )
    .await
}

/// Re-resolve every product; failed products are returned unchanged.
pub async fn refresh_all<R: ProductResolver>(
    resolver: &R,
    products: &[Product],
    now: i64,
) -> Vec<Product> {
    let results = refresh_each(resolver, products, now).await;
    let mut failures = 0usize;

    let refreshed = products
        .iter()
        .zip(results)
        .map(|(original, result)| {
            result.unwrap_or_else(|error| {
                failures += 1;
                tracing::warn!("Keeping previous data for '{}': {error}", original.display_name);
                original.clone()
            })
        })
        .collect::<Vec<_>>();

    tracing::info!(
        "Refreshed {} of {} products",
        products.len() - failures,
        products.len()
    );
    refreshed
}
