use std::collections::BTreeMap;
use std::env;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::Utc;
use pricewatch_core::affiliate::product_store_link;
use pricewatch_core::config::ResolverConfig;
use pricewatch_core::db::Database;
use pricewatch_core::metrics::{
    best_offer, has_recent_price_drop, offer_has_recent_drop, price_change_delta,
};
use pricewatch_core::price::format_price;
use pricewatch_core::resolver::GeminiResolver;
use pricewatch_core::services::ProductStore;
use pricewatch_core::{Product, ProductId, StoreId, StoreOffer};
use serde::Serialize;

use crate::error::CliError;

pub const ENV_DB_PATH: &str = "PRICEWATCH_DB_PATH";
const NOT_AVAILABLE_LABEL: &str = "N/A";

/// Affiliate defaults and drop window applied when rendering products.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub now_ms: i64,
    pub window_ms: i64,
    pub default_affiliate_ids: &'a BTreeMap<StoreId, String>,
}

#[derive(Debug, Serialize)]
pub struct StoreListItem {
    pub store: String,
    pub price: String,
    pub link: Option<String>,
    pub recent_change: Option<String>,
    pub recent_drop: bool,
}

#[derive(Debug, Serialize)]
pub struct ProductListItem {
    pub id: String,
    pub name: String,
    pub source_url: String,
    pub image_url: Option<String>,
    pub best_store: Option<String>,
    pub best_price: Option<String>,
    pub recent_drop: bool,
    pub created_at: i64,
    pub stores: Vec<StoreListItem>,
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("pricewatch").join("pricewatch.db"))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI data directory".to_string()))
}

pub fn resolve_db_path(explicit: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Some(path) = env::var_os(ENV_DB_PATH).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    default_db_path()
}

pub fn open_database(path: &Path) -> Result<Database, CliError> {
    Ok(Database::open(path)?)
}

pub fn open_store(path: &Path) -> Result<ProductStore<Database>, CliError> {
    Ok(ProductStore::load(open_database(path)?))
}

pub fn build_resolver() -> Result<GeminiResolver, CliError> {
    let config = ResolverConfig::from_env()?.ok_or(CliError::ResolverNotConfigured)?;
    let resolver = GeminiResolver::new(config)?;
    tracing::debug!("Resolving with model {}", resolver.model());
    Ok(resolver)
}

pub fn normalize_url(url: &str) -> Result<String, CliError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyUrl)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_product_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyProductId)
    } else {
        Ok(trimmed.to_ascii_lowercase())
    }
}

/// Position of the product matching a full id or a unique id prefix.
pub fn resolve_product_index(product_query: &str, products: &[Product]) -> Result<usize, CliError> {
    if let Ok(product_id) = product_query.parse::<ProductId>() {
        if let Some(index) = products.iter().position(|product| product.id == product_id) {
            return Ok(index);
        }
    }

    let matching = products
        .iter()
        .enumerate()
        .filter(|(_, product)| product.id.as_str().starts_with(product_query))
        .map(|(index, _)| index)
        .collect::<Vec<_>>();

    match matching.as_slice() {
        [] => Err(CliError::ProductNotFound(product_query.to_string())),
        [index] => Ok(*index),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(|index| short_id(&products[*index]))
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousProductId(format!(
                "ID prefix '{product_query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn short_id(product: &Product) -> String {
    product.id.as_str().chars().take(13).collect()
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn price_label(offer: &StoreOffer) -> String {
    offer
        .current_price
        .clone()
        .unwrap_or_else(|| NOT_AVAILABLE_LABEL.to_string())
}

pub fn format_delta(delta: f64) -> String {
    if delta > 0.0 {
        format!("+{}", format_price(delta))
    } else {
        format_price(delta)
    }
}

pub fn product_to_list_item(product: &Product, context: RenderContext<'_>) -> ProductListItem {
    let best = best_offer(product);

    ProductListItem {
        id: product.id.to_string(),
        name: product.display_name.clone(),
        source_url: product.source_url.clone(),
        image_url: product.image_url.clone(),
        best_store: best.map(|offer| offer.store_id.display_name().to_string()),
        best_price: best.and_then(|offer| offer.current_price.clone()),
        recent_drop: has_recent_price_drop(product, context.now_ms, context.window_ms),
        created_at: product.created_at,
        stores: product
            .stores
            .iter()
            .map(|offer| StoreListItem {
                store: offer.store_id.display_name().to_string(),
                price: price_label(offer),
                link: product_store_link(product, offer.store_id, context.default_affiliate_ids),
                recent_change: price_change_delta(&offer.history, context.now_ms, context.window_ms)
                    .map(format_delta),
                recent_drop: offer_has_recent_drop(offer, context.now_ms, context.window_ms),
            })
            .collect(),
    }
}

/// One line per product: short id, name, best price and store, drop marker.
pub fn format_product_lines(
    view: &[(usize, &Product)],
    context: RenderContext<'_>,
) -> Vec<String> {
    view.iter()
        .map(|(_, product)| {
            let item = product_to_list_item(product, context);
            let name = product.title_preview(40);
            let best = match (&item.best_price, &item.best_store) {
                (Some(price), Some(store)) => format!("{price} @ {store}"),
                _ => NOT_AVAILABLE_LABEL.to_string(),
            };
            let short = short_id(product);

            if item.recent_drop {
                format!("{short:<13}  {name:<40}  {best:<28}  price drop")
            } else {
                format!("{short:<13}  {name:<40}  {best}")
            }
        })
        .collect()
}

/// Multi-line detail view with per-store links and history.
pub fn format_product_detail(product: &Product, context: RenderContext<'_>) -> Vec<String> {
    let item = product_to_list_item(product, context);
    let mut lines = vec![
        item.name.clone(),
        format!("id:      {}", item.id),
        format!("source:  {}", item.source_url),
        format!("added:   {}", format_timestamp(item.created_at)),
    ];
    if let Some(image_url) = &item.image_url {
        lines.push(format!("image:   {image_url}"));
    }
    match (&item.best_store, &item.best_price) {
        (Some(store), Some(price)) => lines.push(format!("best:    {price} @ {store}")),
        _ => lines.push(format!("best:    {NOT_AVAILABLE_LABEL}")),
    }

    for (offer, store_item) in product.stores.iter().zip(&item.stores) {
        lines.push(String::new());
        let mut heading = format!("{}: {}", store_item.store, store_item.price);
        if let Some(change) = &store_item.recent_change {
            let changed_at = offer
                .last_entry()
                .map_or(context.now_ms, |entry| entry.timestamp);
            let when = format_relative_time(changed_at, context.now_ms);
            let _ = write!(heading, " ({change} {when})");
        }
        lines.push(heading);
        if let Some(link) = &store_item.link {
            lines.push(format!("  {link}"));
        }
        for entry in offer.history.iter().rev() {
            lines.push(format!(
                "  {}  {}",
                format_timestamp(entry.timestamp),
                entry.price.as_deref().unwrap_or(NOT_AVAILABLE_LABEL)
            ));
        }
    }

    lines
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}
