//! Configuration settings for Sok.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub warehouse: WarehouseSettings,
    pub search: SearchSettings,
    pub summary: SummarySettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.sok".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Warehouse settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseSettings {
    /// Warehouse provider (sqlite).
    pub provider: String,
    /// Path to the SQLite database.
    pub sqlite_path: String,
}

impl Default for WarehouseSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.sok/catalog.db".to_string(),
        }
    }
}

/// Search index provider type.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    /// In-process index built from the warehouse table (default).
    #[default]
    Local,
    /// Hosted semantic search service reached over HTTP.
    Remote,
}

impl std::str::FromStr for SearchProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "memory" => Ok(SearchProvider::Local),
            "remote" => Ok(SearchProvider::Remote),
            _ => Err(format!("Unknown search provider: {}", s)),
        }
    }
}

impl std::fmt::Display for SearchProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchProvider::Local => write!(f, "local"),
            SearchProvider::Remote => write!(f, "remote"),
        }
    }
}

/// Semantic search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Search provider (local, remote).
    pub provider: SearchProvider,
    /// Endpoint URL of the hosted search service (for remote provider).
    pub endpoint: Option<String>,
    /// Environment variable holding the search service API key.
    pub api_key_env: String,
    /// Columns the index searches and returns.
    pub columns: Vec<String>,
    /// Number of results per page.
    pub page_size: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            provider: SearchProvider::Local,
            endpoint: None,
            api_key_env: "SOK_SEARCH_API_KEY".to_string(),
            columns: vec![
                "VIDEO_TITLE".to_string(),
                "VIDEO_DESCRIPTION".to_string(),
                "THUMBNAIL".to_string(),
                "VIDEO_YEAR".to_string(),
            ],
            page_size: 50,
        }
    }
}

/// Result summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// LLM model for summary generation.
    pub model: String,
    /// Maximum number of top results to summarize (capped at 3).
    pub max_rows: usize,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_rows: 3,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SokError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sok")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.warehouse.sqlite_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.search.page_size, 50);
        assert_eq!(settings.search.provider, SearchProvider::Local);
        assert_eq!(settings.summary.max_rows, 3);
        assert!(settings.search.columns.contains(&"VIDEO_TITLE".to_string()));
    }

    #[test]
    fn test_search_provider_from_str() {
        assert_eq!("remote".parse::<SearchProvider>().unwrap(), SearchProvider::Remote);
        assert_eq!("memory".parse::<SearchProvider>().unwrap(), SearchProvider::Local);
        assert!("cloud".parse::<SearchProvider>().is_err());
    }

    #[test]
    fn test_settings_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.search.page_size = 25;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.search.page_size, 25);
    }
}
