//! Collection export helpers shared by pricewatch clients.

use std::fmt::Write as _;

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::best_offer;
use crate::models::{PriceHistoryEntry, Product, NOT_AVAILABLE};

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Markdown,
}

/// Per-store export record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOffer {
    pub store: String,
    pub current_price: String,
    pub listing_url: Option<String>,
    pub history: Vec<PriceHistoryEntry>,
}

/// Serializable product representation used in JSON and Markdown exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportProduct {
    pub id: String,
    pub name: String,
    pub source_url: String,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub best_store: Option<String>,
    pub stores: Vec<ExportOffer>,
}

fn price_label(price: Option<&str>) -> String {
    price.unwrap_or(NOT_AVAILABLE).to_string()
}

/// Convert a product into an export record.
#[must_use]
pub fn product_to_export_item(product: &Product) -> ExportProduct {
    ExportProduct {
        id: product.id.to_string(),
        name: product.display_name.clone(),
        source_url: product.source_url.clone(),
        image_url: product.image_url.clone(),
        created_at: product.created_at,
        best_store: best_offer(product).map(|offer| offer.store_id.display_name().to_string()),
        stores: product
            .stores
            .iter()
            .map(|offer| ExportOffer {
                store: offer.store_id.display_name().to_string(),
                current_price: price_label(offer.current_price.as_deref()),
                listing_url: offer.listing_url.clone(),
                history: offer.history.clone(),
            })
            .collect(),
    }
}

/// Render products as pretty-printed JSON.
pub fn render_json_export(products: &[Product]) -> serde_json::Result<String> {
    let items = products
        .iter()
        .map(product_to_export_item)
        .collect::<Vec<ExportProduct>>();
    serde_json::to_string_pretty(&items)
}

fn format_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map_or_else(|| timestamp_ms.to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string())
}

/// Render products in Markdown, one section per product with a history table per store.
#[must_use]
pub fn render_markdown_export(products: &[Product]) -> String {
    let mut output = String::new();

    for (index, product) in products.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }

        let item = product_to_export_item(product);
        let _ = writeln!(output, "## {}", item.name);
        let _ = writeln!(output);
        let _ = writeln!(output, "- id: {}", item.id);
        let _ = writeln!(output, "- source: {}", item.source_url);
        let _ = writeln!(
            output,
            "- best offer: {}",
            item.best_store.as_deref().unwrap_or(NOT_AVAILABLE)
        );

        for offer in item.stores {
            let _ = writeln!(output);
            let _ = writeln!(output, "### {} ({})", offer.store, offer.current_price);
            if let Some(url) = &offer.listing_url {
                let _ = writeln!(output, "{url}");
            }
            let _ = writeln!(output);
            let _ = writeln!(output, "| when (UTC) | price |");
            let _ = writeln!(output, "| --- | --- |");
            for entry in &offer.history {
                let _ = writeln!(
                    output,
                    "| {} | {} |",
                    format_timestamp(entry.timestamp),
                    price_label(entry.price.as_deref())
                );
            }
        }
    }

    output
}

/// Render products based on selected export format.
pub fn render_products_export(
    products: &[Product],
    format: ExportFormat,
) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(products),
        ExportFormat::Markdown => Ok(render_markdown_export(products)),
    }
}
