//! Database layer for pricewatch

mod connection;
mod kv_repository;
mod migrations;
mod settings_repository;

pub use connection::Database;
pub use kv_repository::{KeyValueStore, MemoryKeyValueStore};
pub use settings_repository::{KvSettingsRepository, SettingsRepository, THEME_KEY};
