//! Catalogue filtering and sorting.
//!
//! Views are computed over a borrowed collection and carry each product's
//! position in the store, so callers can act on a result without searching
//! again.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::metrics::lowest_price;
use crate::models::Product;

/// Catalogue ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Insertion order
    #[default]
    Added,
    PriceAsc,
    PriceDesc,
    Name,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "added" => Ok(Self::Added),
            "price-asc" | "price" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            "name" => Ok(Self::Name),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Filter and ordering applied to the catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub text: String,
    pub sort: SortOrder,
}

impl CatalogQuery {
    #[must_use]
    pub fn new(text: impl Into<String>, sort: SortOrder) -> Self {
        Self {
            text: text.into(),
            sort,
        }
    }
}

fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn product_matches_query(product: &Product, query: &str) -> bool {
    query.is_empty() || product.display_name.to_lowercase().contains(query)
}

/// Unavailable (infinite) prices go last regardless of direction.
fn compare_prices(left: f64, right: f64, descending: bool) -> Ordering {
    match (left.is_finite(), right.is_finite()) {
        (true, true) if descending => right.total_cmp(&left),
        (true, true) => left.total_cmp(&right),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}

/// Filter and sort `products`, pairing each match with its store position.
///
/// Sorting is stable, so equal keys keep insertion order.
#[must_use]
pub fn catalog_view<'a>(products: &'a [Product], query: &CatalogQuery) -> Vec<(usize, &'a Product)> {
    let text = normalize_query(&query.text);
    let mut view = products
        .iter()
        .enumerate()
        .filter(|(_, product)| product_matches_query(product, &text))
        .collect::<Vec<_>>();

    match query.sort {
        SortOrder::Added => {}
        SortOrder::PriceAsc | SortOrder::PriceDesc => {
            let descending = query.sort == SortOrder::PriceDesc;
            view.sort_by(|(_, left), (_, right)| {
                compare_prices(lowest_price(left), lowest_price(right), descending)
            });
        }
        SortOrder::Name => {
            view.sort_by_cached_key(|(_, product)| product.display_name.to_lowercase());
        }
    }

    view
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{PriceHistoryEntry, ProductId, StoreId, StoreOffer};

    fn product(name: &str, prices: [Option<&str>; 2]) -> Product {
        Product {
            id: ProductId::new(),
            display_name: name.to_string(),
            image_url: None,
            source_url: format!("https://example.com/{name}"),
            stores: StoreId::ALL
                .iter()
                .zip(prices)
                .map(|(store_id, price)| StoreOffer {
                    store_id: *store_id,
                    current_price: price.map(str::to_string),
                    listing_url: Some(format!("https://{}.example/{name}", store_id.key())),
                    history: vec![PriceHistoryEntry::new(0, price.map(str::to_string))],
                })
                .collect(),
            affiliate_overrides: BTreeMap::new(),
            created_at: 0,
        }
    }

    fn catalogue() -> Vec<Product> {
        vec![
            product("Sem estoque", [None, Some("N/A")]),
            product("Fone Bluetooth", [Some("R$ 199,90"), Some("R$ 189,00")]),
            product("air fryer", [Some("R$ 399,00"), None]),
            product("Cafeteira", [Some("R$ 1.250,00"), Some("R$ 1.199,00")]),
        ]
    }

    fn names(view: &[(usize, &Product)]) -> Vec<String> {
        view.iter()
            .map(|(_, product)| product.display_name.clone())
            .collect()
    }

    #[test]
    fn added_order_keeps_positions() {
        let products = catalogue();
        let view = catalog_view(&products, &CatalogQuery::default());
        assert_eq!(
            view.iter().map(|(index, _)| *index).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn price_ascending_puts_unavailable_last() {
        let products = catalogue();
        let view = catalog_view(&products, &CatalogQuery::new("", SortOrder::PriceAsc));
        assert_eq!(
            names(&view),
            vec!["Fone Bluetooth", "air fryer", "Cafeteira", "Sem estoque"]
        );
    }

    #[test]
    fn price_descending_still_puts_unavailable_last() {
        let products = catalogue();
        let view = catalog_view(&products, &CatalogQuery::new("", SortOrder::PriceDesc));
        assert_eq!(
            names(&view),
            vec!["Cafeteira", "air fryer", "Fone Bluetooth", "Sem estoque"]
        );
    }

    #[test]
    fn name_sort_ignores_case() {
        let products = catalogue();
        let view = catalog_view(&products, &CatalogQuery::new("", SortOrder::Name));
        assert_eq!(
            names(&view),
            vec!["air fryer", "Cafeteira", "Fone Bluetooth", "Sem estoque"]
        );
    }

    #[test]
    fn filter_matches_name_substring_case_insensitively() {
        let products = catalogue();
        let view = catalog_view(&products, &CatalogQuery::new("  FONE ", SortOrder::Added));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].0, 1);
    }

    #[test]
    fn parses_sort_order_names() {
        assert_eq!("price-desc".parse::<SortOrder>(), Ok(SortOrder::PriceDesc));
        assert_eq!("Price".parse::<SortOrder>(), Ok(SortOrder::PriceAsc));
        assert!("cheapest".parse::<SortOrder>().is_err());
    }
}
