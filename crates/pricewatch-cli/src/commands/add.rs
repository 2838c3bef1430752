use std::path::Path;

use pricewatch_core::resolver::ProductResolver;
use pricewatch_core::services::resolve_new;
use pricewatch_core::ProductId;

use crate::commands::common::{build_resolver, normalize_url, now_ms, open_store};
use crate::error::CliError;

pub async fn run_add(url: &str, db_path: &Path) -> Result<(), CliError> {
    let url = normalize_url(url)?;
    let resolver = build_resolver()?;
    let id = add_product(&resolver, &url, db_path, now_ms()).await?;
    println!("{id}");
    Ok(())
}

/// Resolve `url` and append the new product to the store at `db_path`.
pub async fn add_product<R: ProductResolver>(
    resolver: &R,
    url: &str,
    db_path: &Path,
    now: i64,
) -> Result<ProductId, CliError> {
    // Nothing is stored when the lookup fails
    let product = resolve_new(resolver, url, now).await?;

    let mut store = open_store(db_path)?;
    let id = product.id;
    store.add(product);
    Ok(id)
}
