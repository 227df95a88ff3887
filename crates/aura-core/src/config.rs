//! Application configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use aura_tabs::SelectionMode;

use crate::color::Color;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Selection policy of the main workspace tab container
    pub selection_mode: SelectionMode,
    /// Active color at startup
    pub default_color: Color,
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Config {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load from `path`, falling back to defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        Self::data_dir().join("settings.json")
    }

    pub fn data_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("Aura"))
            .unwrap_or_else(|| PathBuf::from(".aura"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selection_mode: SelectionMode::AlwaysSelected,
            default_color: Color::BLACK,
            log_filter: "info".to_string(),
        }
    }
}

// Per-platform config directory
mod dirs {
    use std::path::PathBuf;

    pub fn config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_CONFIG_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".config"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
