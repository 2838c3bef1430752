//! Authoritative product collection with write-through persistence.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::db::KeyValueStore;
use crate::error::{Error, Result};
use crate::models::{
    normalize_sentinel, PriceHistoryEntry, Product, ProductId, StoreId, StoreOffer,
};
use crate::util::unix_millis_now;

/// Key holding the serialized product collection
pub const PRODUCTS_KEY: &str = "products";

/// Owns the ordered product list and persists it after every mutation.
///
/// Persistence is best-effort: read failures start from an empty collection,
/// write failures are logged and the in-memory state stays authoritative.
pub struct ProductStore<S: KeyValueStore> {
    products: Vec<Product>,
    storage: S,
}

impl<S: KeyValueStore> ProductStore<S> {
    /// Load the collection from `storage`, migrating older layouts.
    pub fn load(storage: S) -> Self {
        Self::load_at(storage, unix_millis_now())
    }

    /// Like [`ProductStore::load`], with an explicit clock for migrated entries.
    pub fn load_at(storage: S, now: i64) -> Self {
        let (products, migrated) = match storage.get(PRODUCTS_KEY) {
            Ok(Some(raw)) => decode_collection(&raw, now).unwrap_or_else(|error| {
                tracing::warn!("Stored products are unreadable, starting empty: {error}");
                (Vec::new(), false)
            }),
            Ok(None) => (Vec::new(), false),
            Err(error) => {
                tracing::warn!("Failed to load products, starting empty: {error}");
                (Vec::new(), false)
            }
        };

        let store = Self { products, storage };
        if migrated {
            tracing::info!("Migrated {} stored products", store.products.len());
            store.persist();
        }
        store
    }

    /// Read-only view of the collection in insertion order
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Product> {
        self.products.get(index)
    }

    /// Position of a product by id
    pub fn position(&self, id: &ProductId) -> Option<usize> {
        self.products.iter().position(|product| product.id == *id)
    }

    /// Append a product to the end of the collection
    pub fn add(&mut self, product: Product) {
        tracing::info!("Tracking '{}'", product.display_name);
        self.products.push(product);
        self.persist();
    }

    /// Replace the product at `index`, keeping its position
    pub fn replace_at(&mut self, index: usize, product: Product) -> Result<()> {
        let slot = self
            .products
            .get_mut(index)
            .ok_or_else(|| Error::NotFound(format!("no product at position {index}")))?;
        *slot = product;
        self.persist();
        Ok(())
    }

    /// Remove and return the product at `index`
    pub fn remove_at(&mut self, index: usize) -> Result<Product> {
        if index >= self.products.len() {
            return Err(Error::NotFound(format!("no product at position {index}")));
        }
        let removed = self.products.remove(index);
        tracing::info!("Stopped tracking '{}'", removed.display_name);
        self.persist();
        Ok(removed)
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.products)
            .map_err(Error::from)
            .and_then(|serialized| self.storage.set(PRODUCTS_KEY, &serialized));
        if let Err(error) = result {
            tracing::warn!("Failed to persist products: {error}");
        }
    }
}

#[derive(Debug, Deserialize)]
struct StoredProduct {
    #[serde(default)]
    id: Option<ProductId>,
    #[serde(alias = "name")]
    display_name: String,
    #[serde(default)]
    image_url: Option<String>,
    source_url: String,
    #[serde(default)]
    stores: Vec<StoredOffer>,
    #[serde(default)]
    affiliate_overrides: BTreeMap<StoreId, String>,
    #[serde(default)]
    created_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StoredOffer {
    store_id: StoreId,
    #[serde(default)]
    current_price: Option<String>,
    #[serde(default)]
    listing_url: Option<String>,
    #[serde(default)]
    history: Option<Vec<PriceHistoryEntry>>,
}

/// Decode a stored collection, upgrading older layouts.
///
/// Returns the products and whether anything had to be migrated. An offer
/// stored without a `history` gets one entry synthesized from its current
/// price at `now` (none when it never had a price). Duplicate offers for the
/// same store keep the first.
fn decode_collection(raw: &str, now: i64) -> Result<(Vec<Product>, bool)> {
    let stored: Vec<StoredProduct> = serde_json::from_str(raw)?;
    let mut migrated = false;

    let products = stored
        .into_iter()
        .map(|product| {
            migrated |= product.id.is_none() || product.created_at.is_none();

            let mut stores: Vec<StoreOffer> = Vec::with_capacity(product.stores.len());
            for offer in product.stores {
                if stores.iter().any(|kept| kept.store_id == offer.store_id) {
                    tracing::warn!(
                        "Dropping duplicate {} offer for '{}'",
                        offer.store_id,
                        product.display_name
                    );
                    migrated = true;
                    continue;
                }
                let (offer, changed) = migrate_offer(offer, now);
                migrated |= changed;
                stores.push(offer);
            }

            Product {
                id: product.id.unwrap_or_default(),
                display_name: product.display_name,
                image_url: normalize_sentinel(product.image_url),
                source_url: product.source_url,
                stores,
                affiliate_overrides: product.affiliate_overrides,
                created_at: product.created_at.unwrap_or(now),
            }
        })
        .collect();

    Ok((products, migrated))
}

fn migrate_offer(offer: StoredOffer, now: i64) -> (StoreOffer, bool) {
    let had_sentinel = offer
        .current_price
        .as_deref()
        .is_some_and(|price| normalize_sentinel(Some(price.to_string())).is_none())
        || offer
            .listing_url
            .as_deref()
            .is_some_and(|url| normalize_sentinel(Some(url.to_string())).is_none());

    let current_price = normalize_sentinel(offer.current_price.clone());
    let (history, synthesized) = match offer.history {
        Some(history) => (
            history
                .into_iter()
                .map(|entry| PriceHistoryEntry::new(entry.timestamp, normalize_sentinel(entry.price)))
                .collect(),
            false,
        ),
        None if offer.current_price.is_some() => {
            (vec![PriceHistoryEntry::new(now, current_price.clone())], true)
        }
        None => (Vec::new(), true),
    };

    (
        StoreOffer {
            store_id: offer.store_id,
            current_price,
            listing_url: normalize_sentinel(offer.listing_url),
            history,
        },
        synthesized || had_sentinel,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::{Database, MemoryKeyValueStore};

    fn product(name: &str) -> Product {
        Product {
            id: ProductId::new(),
            display_name: name.to_string(),
            image_url: None,
            source_url: format!("https://example.com/{name}"),
            stores: vec![StoreOffer {
                store_id: StoreId::Amazon,
                current_price: Some("R$ 10,00".to_string()),
                listing_url: Some("https://www.amazon.com.br/dp/B0".to_string()),
                history: vec![PriceHistoryEntry::new(0, Some("R$ 10,00".to_string()))],
            }],
            affiliate_overrides: BTreeMap::new(),
            created_at: 0,
        }
    }

    fn stored_products(storage: &impl KeyValueStore) -> Vec<Product> {
        serde_json::from_str(&storage.get(PRODUCTS_KEY).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn empty_storage_loads_empty_collection() {
        let store = ProductStore::load(MemoryKeyValueStore::new());
        assert!(store.is_empty());
    }

    #[test]
    fn every_mutation_is_persisted() {
        let storage = MemoryKeyValueStore::new();
        let mut store = ProductStore::load(&storage);

        store.add(product("a"));
        store.add(product("b"));
        assert_eq!(stored_products(&storage).len(), 2);

        let replacement = product("c");
        store.replace_at(0, replacement.clone()).unwrap();
        assert_eq!(stored_products(&storage)[0], replacement);

        let removed = store.remove_at(1).unwrap();
        assert_eq!(removed.display_name, "b");
        assert_eq!(stored_products(&storage), vec![replacement]);
    }

    #[test]
    fn out_of_range_mutations_fail_without_writing() {
        let storage = MemoryKeyValueStore::new();
        let mut store = ProductStore::load(&storage);

        assert!(matches!(
            store.replace_at(0, product("a")),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(store.remove_at(3), Err(Error::NotFound(_))));
        assert!(storage.is_empty());
    }

    #[test]
    fn collection_survives_reload_in_order() {
        let db = Database::open_in_memory().unwrap();
        let first = product("first");
        let second = product("second");
        {
            let mut store = ProductStore::load(&db);
            store.add(first.clone());
            store.add(second.clone());
        }

        let reloaded = ProductStore::load(&db);
        assert_eq!(reloaded.all(), &[first, second]);
        assert_eq!(reloaded.position(&reloaded.all()[1].id), Some(1));
    }

    #[test]
    fn unreadable_payload_starts_empty() {
        let storage = MemoryKeyValueStore::new();
        storage.set(PRODUCTS_KEY, "{not json").unwrap();

        let store = ProductStore::load(&storage);
        assert!(store.is_empty());
    }

    #[test]
    fn legacy_entries_get_history_synthesized() {
        let storage = MemoryKeyValueStore::new();
        storage
            .set(
                PRODUCTS_KEY,
                r#"[{
                    "name": "Air Fryer",
                    "image_url": "N/A",
                    "source_url": "https://example.com/air-fryer",
                    "stores": [
                        {"store_id": "amazon", "current_price": "R$ 399,00", "listing_url": "https://www.amazon.com.br/dp/B1"},
                        {"store_id": "mercado_livre", "current_price": "N/A", "listing_url": "N/A"}
                    ]
                }, {
                    "name": "Sem preço",
                    "source_url": "https://example.com/sem-preco",
                    "stores": [{"store_id": "amazon", "current_price": null, "listing_url": null}]
                }]"#,
            )
            .unwrap();

        let store = ProductStore::load_at(&storage, 42);
        let air_fryer = &store.all()[0];
        assert_eq!(air_fryer.display_name, "Air Fryer");
        assert_eq!(air_fryer.image_url, None);
        assert_eq!(air_fryer.created_at, 42);
        assert_eq!(
            air_fryer.offer(StoreId::Amazon).unwrap().history,
            vec![PriceHistoryEntry::new(42, Some("R$ 399,00".to_string()))]
        );
        let mercado = air_fryer.offer(StoreId::MercadoLivre).unwrap();
        assert_eq!(mercado.current_price, None);
        assert_eq!(mercado.listing_url, None);
        assert_eq!(mercado.history, vec![PriceHistoryEntry::new(42, None)]);

        let no_price = &store.all()[1];
        assert!(no_price.stores[0].history.is_empty());

        // Migration is written back once, with stable ids
        let persisted = stored_products(&storage);
        assert_eq!(persisted, store.all());
        let reloaded = ProductStore::load_at(&storage, 99);
        assert_eq!(reloaded.all(), store.all());
    }

    #[test]
    fn current_layout_is_not_rewritten() {
        let storage = MemoryKeyValueStore::new();
        let serialized = serde_json::to_string(&vec![product("a")]).unwrap();
        storage.set(PRODUCTS_KEY, &serialized).unwrap();

        let store = ProductStore::load(&storage);
        assert_eq!(store.len(), 1);
        assert_eq!(storage.get(PRODUCTS_KEY).unwrap().unwrap(), serialized);
    }
}
