//! Menu bar configuration for the Menubar CLI/TUI.
//!
//! A small JSON file records the overflow toggle label, whether the overflow
//! feature is enabled, and the items the demo slots into the bar. The file
//! lives in the standard configuration directory
//! (`~/.config/menubar/menubar.json` on most platforms) and can be relocated
//! with `MENUBAR_CONFIG_PATH`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::config_dir;
use menubar_types::{MenuItem, SlotChild};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "MENUBAR_CONFIG_PATH";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "menubar.json";

/// Label used for the overflow toggle when none is configured.
pub const DEFAULT_OVERFLOW_LABEL: &str = "More";

/// Error surfaced when reading or writing configuration fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One configured menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemConfig {
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
}

/// Attributes of a menu bar instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuBarConfig {
    /// Text of the dropdown toggle.
    pub overflow_label: String,
    /// When false no measurement runs and every item renders inline.
    pub overflow_enabled: bool,
    /// Blank cells on each side of an item label.
    pub item_padding: u16,
    /// Items slotted by the demo runtime.
    pub items: Vec<MenuItemConfig>,
}

impl Default for MenuBarConfig {
    fn default() -> Self {
        Self {
            overflow_label: DEFAULT_OVERFLOW_LABEL.to_string(),
            overflow_enabled: true,
            item_padding: 1,
            items: Vec::new(),
        }
    }
}

impl MenuBarConfig {
    /// Load from the default location (honoring `MENUBAR_CONFIG_PATH`).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    /// Load from an explicit path. A missing file yields defaults; a malformed
    /// file is logged and also yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str::<MenuBarConfig>(&data) {
                Ok(config) => Ok(config.normalized()),
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "Failed to parse menubar config; using defaults"
                    );
                    Ok(Self::default())
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(ConfigError::Io(error)),
        }
    }

    /// Persist to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Converts configured items into slot children with sequential ids.
    pub fn slot_children(&self) -> Vec<SlotChild> {
        self.items
            .iter()
            .zip(0u32..)
            .map(|(item, id)| SlotChild::Item(MenuItem::new(id, item.label.clone()).with_disabled(item.disabled)))
            .collect()
    }

    fn normalized(mut self) -> Self {
        if self.overflow_label.trim().is_empty() {
            self.overflow_label = DEFAULT_OVERFLOW_LABEL.to_string();
        }
        self
    }
}

/// Resolves the config path, preferring `MENUBAR_CONFIG_PATH`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("menubar")
        .join(CONFIG_FILE_NAME)
}
