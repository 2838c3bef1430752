//! Data models for pricewatch

mod offer;
mod product;
mod settings;

pub use offer::{normalize_sentinel, PriceHistoryEntry, StoreId, StoreOffer, NOT_AVAILABLE};
pub use product::{Product, ProductId};
pub use settings::{Settings, ThemeMode};
