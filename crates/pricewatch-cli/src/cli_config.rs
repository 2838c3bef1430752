//! Persistent CLI configuration: default affiliate ids and drop window.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pricewatch_core::metrics::DEFAULT_DROP_WINDOW_MS;
use pricewatch_core::util::normalize_text_option;
use pricewatch_core::StoreId;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const MS_PER_HOUR: i64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    /// Affiliate id per store, used when a product has no override
    #[serde(default)]
    pub default_affiliate_ids: BTreeMap<StoreId, String>,
    #[serde(default = "default_drop_window_hours")]
    pub drop_window_hours: u32,
}

const fn default_config_version() -> u32 {
    1
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn default_drop_window_hours() -> u32 {
    (DEFAULT_DROP_WINDOW_MS / MS_PER_HOUR) as u32
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            default_affiliate_ids: BTreeMap::new(),
            drop_window_hours: default_drop_window_hours(),
        }
    }
}

pub fn default_config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join("pricewatch").join(CONFIG_FILE_NAME))
        .ok_or_else(|| "Failed to resolve CLI config directory".to_string())
}

impl CliConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    /// Set or clear (blank value) the default affiliate id for a store.
    pub fn set_default_affiliate(&mut self, store_id: StoreId, value: String) {
        match normalize_text_option(Some(value)) {
            Some(value) => {
                self.default_affiliate_ids.insert(store_id, value);
            }
            None => {
                self.default_affiliate_ids.remove(&store_id);
            }
        }
    }

    /// Recent-change window in milliseconds.
    pub fn drop_window_ms(&self) -> i64 {
        i64::from(self.drop_window_hours) * MS_PER_HOUR
    }

    fn normalize(&mut self) {
        self.default_affiliate_ids = std::mem::take(&mut self.default_affiliate_ids)
            .into_iter()
            .filter_map(|(store_id, value)| {
                normalize_text_option(Some(value)).map(|value| (store_id, value))
            })
            .collect();
        if self.drop_window_hours == 0 {
            self.drop_window_hours = default_drop_window_hours();
        }
    }
}
