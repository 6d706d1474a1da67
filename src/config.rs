use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::{COMBAT, NARRATIVE};
use crate::store::DEFAULT_ORDERS_FILE;
use crate::ui::theme::{parse_hex_color, Theme};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the order catalog is stored (tilde-expanded)
    pub orders_file: String,
    pub appearance: AppearanceConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Theme preset: "ink", "catppuccin-mocha", "catppuccin-latte", "nord", "gruvbox"
    pub theme: String,
    /// Optional accent override, "#rrggbb"
    pub accent: Option<String>,
    /// Heading of the drawn order card
    pub card_title: String,
    /// Hint shown at the bottom of the card
    pub acknowledge_label: String,
    /// Prefix of the new-order input line
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Categories offered when adding and drawing
    pub categories: Vec<String>,
    /// Ask before deleting an order
    pub confirm_delete: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            orders_file: DEFAULT_ORDERS_FILE.to_string(),
            appearance: AppearanceConfig::default(),
            behavior: BehaviorConfig::default(),
        }
    }
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            theme: "ink".to_string(),
            accent: None,
            card_title: "【 ORDER ARRIVED 】".to_string(),
            acknowledge_label: "Acknowledge".to_string(),
            prompt: "❯ ".to_string(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            categories: vec![COMBAT.to_string(), NARRATIVE.to_string()],
            confirm_delete: false,
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("index-orders")
            .join("config.toml")
    }

    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let path = Path::new(expanded.as_ref());

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            Self::from_toml(&content)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            tracing::info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        if config.behavior.categories.is_empty() {
            config.behavior.categories = BehaviorConfig::default().categories;
        }
        Ok(config)
    }

    /// Resolved path of the orders file
    pub fn orders_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.orders_file).as_ref())
    }

    /// Build the theme from the preset name and optional accent override
    pub fn resolve_theme(&self) -> Theme {
        let mut theme = Theme::from_preset(&self.appearance.theme).unwrap_or_else(|| {
            tracing::warn!("Unknown theme '{}', using default", self.appearance.theme);
            Theme::default()
        });

        if let Some(ref accent) = self.appearance.accent {
            match parse_hex_color(accent) {
                Ok(color) => theme.accent = color,
                Err(e) => tracing::warn!("Ignoring accent '{}': {}", accent, e),
            }
        }
        theme
    }
}
