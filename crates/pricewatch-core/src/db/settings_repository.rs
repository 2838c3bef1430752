//! Settings repository implementation

use super::KeyValueStore;
use crate::error::Result;
use crate::models::{Settings, ThemeMode};

/// Key holding the theme preference
pub const THEME_KEY: &str = "theme";

/// Trait for settings storage operations
pub trait SettingsRepository {
    /// Load settings, falling back to defaults for anything unreadable
    fn load(&self) -> Settings;

    /// Save settings
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// `KeyValueStore` implementation of `SettingsRepository`
pub struct KvSettingsRepository<'a, S: KeyValueStore> {
    store: &'a S,
}

impl<'a, S: KeyValueStore> KvSettingsRepository<'a, S> {
    /// Create a new repository over the given store
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> SettingsRepository for KvSettingsRepository<'_, S> {
    fn load(&self) -> Settings {
        let mut settings = Settings::default();

        match self.store.get(THEME_KEY) {
            Ok(Some(value)) => match value.parse::<ThemeMode>() {
                Ok(theme) => settings.theme = theme,
                Err(error) => tracing::warn!("Ignoring stored theme: {error}"),
            },
            Ok(None) => {}
            Err(error) => tracing::warn!("Failed to read theme preference: {error}"),
        }

        settings
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        self.store.set(THEME_KEY, settings.theme.as_str())
    }
}
