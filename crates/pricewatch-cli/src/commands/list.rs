use std::path::Path;

use pricewatch_core::search::{catalog_view, CatalogQuery};

use crate::cli::SortArg;
use crate::cli_config::CliConfig;
use crate::commands::common::{
    format_product_lines, now_ms, open_store, product_to_list_item, ProductListItem,
    RenderContext,
};
use crate::error::CliError;

pub fn run_list(
    query: Option<&str>,
    sort: SortArg,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let config = CliConfig::load().map_err(CliError::Config)?;
    let store = open_store(db_path)?;
    let view = catalog_view(
        store.all(),
        &CatalogQuery::new(query.unwrap_or_default(), sort.into()),
    );
    let context = RenderContext {
        now_ms: now_ms(),
        window_ms: config.drop_window_ms(),
        default_affiliate_ids: &config.default_affiliate_ids,
    };

    if as_json {
        let json_items = view
            .iter()
            .map(|(_, product)| product_to_list_item(product, context))
            .collect::<Vec<ProductListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_product_lines(&view, context) {
            println!("{line}");
        }
    }

    Ok(())
}
