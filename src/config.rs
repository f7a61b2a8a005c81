//! Categorier configuration
//!
//! Loaded from TOML at startup, falls back to defaults if no config file exists.

use categorier_graph::FlatMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorierConfig {
    /// YAML snapshot the CLI reads and writes.
    pub data_path: PathBuf,
    /// Tracing filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Normalization applied to `add --parent` when no flag is given.
    pub flat_mode: FlatMode,
}

impl Default for CategorierConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            log_filter: "categorier=info".into(),
            flat_mode: FlatMode::None,
        }
    }
}

/// `<data dir>/categorier/data.yml`, or `./resources/data.yml` when the
/// platform has no data directory.
pub fn default_data_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("categorier").join("data.yml"))
        .unwrap_or_else(|| PathBuf::from("resources").join("data.yml"))
}

/// `<config dir>/categorier/config.toml`, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("categorier").join("config.toml"))
}

impl CategorierConfig {
    /// Read settings from `path`. A missing or unparsable file yields the defaults.
    pub fn load(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            tracing::info!(
                "No categorier config at {}, data file defaults to {}",
                path.display(),
                default_data_path().display()
            );
            return Self::default();
        };
        match toml::from_str::<Self>(&content) {
            Ok(config) => {
                tracing::info!(
                    "Using categorier config {} (data file {})",
                    path.display(),
                    config.data_path.display()
                );
                config
            }
            Err(e) => {
                tracing::warn!("Ignoring categorier config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Effective settings as TOML, as printed by `categorier config`.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}
