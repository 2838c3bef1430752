use std::path::Path;

use pricewatch_core::db::Database;
use pricewatch_core::resolver::ProductResolver;
use pricewatch_core::services::{refresh_each, refresh_product, ProductStore};

use crate::cli_config::CliConfig;
use crate::commands::common::{
    build_resolver, format_product_lines, normalize_product_identifier, now_ms, open_store,
    resolve_product_index, RenderContext,
};
use crate::error::CliError;

pub async fn run_refresh(id: Option<&str>, db_path: &Path) -> Result<(), CliError> {
    let config = CliConfig::load().map_err(CliError::Config)?;
    let resolver = build_resolver()?;
    let mut store = open_store(db_path)?;
    let now = now_ms();

    let refreshed_indices = refresh_stored(&resolver, &mut store, id, now).await?;

    let view = refreshed_indices
        .iter()
        .filter_map(|index| store.get(*index).map(|product| (*index, product)))
        .collect::<Vec<_>>();
    let context = RenderContext {
        now_ms: now,
        window_ms: config.drop_window_ms(),
        default_affiliate_ids: &config.default_affiliate_ids,
    };
    for line in format_product_lines(&view, context) {
        println!("{line}");
    }

    Ok(())
}

/// Refresh one product (by id or prefix) or all of them, writing successes back.
///
/// Returns the positions of the products that were refreshed. When refreshing
/// everything, a failed product keeps its stored value and is reported on stderr.
pub async fn refresh_stored<R: ProductResolver>(
    resolver: &R,
    store: &mut ProductStore<Database>,
    id: Option<&str>,
    now: i64,
) -> Result<Vec<usize>, CliError> {
    if let Some(id) = id {
        let normalized_id = normalize_product_identifier(id)?;
        let index = resolve_product_index(&normalized_id, store.all())?;
        let product = store.all()[index].clone();
        let refreshed = refresh_product(resolver, &product, now).await?;
        store.replace_at(index, refreshed)?;
        return Ok(vec![index]);
    }

    let snapshot = store.all().to_vec();
    let results = refresh_each(resolver, &snapshot, now).await;

    let mut refreshed_indices = Vec::with_capacity(results.len());
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(product) => {
                store.replace_at(index, product)?;
                refreshed_indices.push(index);
            }
            Err(error) => {
                eprintln!("Failed to refresh '{}': {error}", snapshot[index].display_name);
            }
        }
    }
    eprintln!(
        "Refreshed {} of {} products",
        refreshed_indices.len(),
        snapshot.len()
    );
    Ok(refreshed_indices)
}
