use std::path::Path;

use pricewatch_core::resolver::ProductResolver;
use pricewatch_core::services::repoint;
use pricewatch_core::{ProductId, StoreId};

use crate::commands::common::{
    build_resolver, normalize_product_identifier, normalize_url, now_ms, open_store,
    resolve_product_index,
};
use crate::error::CliError;

/// Requested changes to a tracked product.
#[derive(Debug, Default)]
pub struct ProductEdits<'a> {
    pub url: Option<&'a str>,
    pub amazon_affiliate: Option<String>,
    pub mercado_livre_affiliate: Option<String>,
}

impl ProductEdits<'_> {
    const fn is_empty(&self) -> bool {
        self.url.is_none()
            && self.amazon_affiliate.is_none()
            && self.mercado_livre_affiliate.is_none()
    }
}

pub async fn run_edit(id: &str, edits: ProductEdits<'_>, db_path: &Path) -> Result<(), CliError> {
    if edits.is_empty() {
        return Err(CliError::NothingToEdit);
    }

    let resolver = edits.url.map(|_| build_resolver()).transpose()?;
    let id = edit_product(resolver.as_ref(), id, edits, db_path, now_ms()).await?;
    println!("{id}");
    Ok(())
}

/// Apply `edits` to the product matching `id`.
///
/// A new URL goes through `resolver`; affiliate changes alone never resolve.
pub async fn edit_product<R: ProductResolver>(
    resolver: Option<&R>,
    id: &str,
    edits: ProductEdits<'_>,
    db_path: &Path,
    now: i64,
) -> Result<ProductId, CliError> {
    if edits.is_empty() {
        return Err(CliError::NothingToEdit);
    }

    let normalized_id = normalize_product_identifier(id)?;
    let mut store = open_store(db_path)?;
    let index = resolve_product_index(&normalized_id, store.all())?;
    let mut product = store.all()[index].clone();

    if let Some(url) = edits.url {
        let url = normalize_url(url)?;
        let resolver = resolver.ok_or(CliError::ResolverNotConfigured)?;
        product = repoint(resolver, &product, &url, now).await?;
    }

    for (store_id, value) in [
        (StoreId::Amazon, edits.amazon_affiliate),
        (StoreId::MercadoLivre, edits.mercado_livre_affiliate),
    ] {
        if value.is_some() {
            product.set_affiliate_override(store_id, value);
        }
    }

    let id = product.id;
    if product != store.all()[index] {
        store.replace_at(index, product)?;
    }
    Ok(id)
}
