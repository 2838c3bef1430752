use std::path::Path;

use crate::cli_config::CliConfig;
use crate::commands::common::{
    format_product_detail, normalize_product_identifier, now_ms, open_store,
    product_to_list_item, resolve_product_index, RenderContext,
};
use crate::error::CliError;

pub fn run_show(id: &str, as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let normalized_id = normalize_product_identifier(id)?;
    let config = CliConfig::load().map_err(CliError::Config)?;
    let store = open_store(db_path)?;
    let index = resolve_product_index(&normalized_id, store.all())?;
    let product = &store.all()[index];
    let context = RenderContext {
        now_ms: now_ms(),
        window_ms: config.drop_window_ms(),
        default_affiliate_ids: &config.default_affiliate_ids,
    };

    if as_json {
        let mut value = serde_json::to_value(product_to_list_item(product, context))?;
        if let Some(object) = value.as_object_mut() {
            object.insert("history".to_string(), serde_json::to_value(&product.stores)?);
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        for line in format_product_detail(product, context) {
            println!("{line}");
        }
    }

    Ok(())
}
