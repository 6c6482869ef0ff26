//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::search::{SearchSettings, VisibilityScope};

/// fedsearch configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub database: DatabaseSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Whether the status index is deployed
    pub index_enabled: bool,
    /// One of classic, discoverable, public, public_or_unlisted
    pub visibility_scope: String,
    pub max_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Defaults to `<config dir>/fedsearch.db`
    pub path: Option<PathBuf>,
    pub max_connections: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let settings = SearchSettings::default();
        Self {
            index_enabled: settings.index_enabled,
            visibility_scope: settings.visibility_scope,
            max_limit: settings.max_limit,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 5,
        }
    }
}

impl SearchConfig {
    /// Settings injected into `SearchService`
    pub fn settings(&self) -> SearchSettings {
        SearchSettings {
            index_enabled: self.index_enabled,
            visibility_scope: self.visibility_scope.clone(),
            max_limit: self.max_limit,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        VisibilityScope::parse(&self.visibility_scope)?;
        if self.max_limit == 0 {
            return Err(anyhow!("search.max_limit must be at least 1"));
        }
        Ok(())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("FEDSEARCH_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("fedsearch")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default path
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, or defaults if it doesn't exist
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.search.validate()?;
        if self.database.max_connections == 0 {
            return Err(anyhow!("database.max_connections must be at least 1"));
        }
        Ok(())
    }

    /// Database file path, defaulting into the config directory
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        match &self.database.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("fedsearch.db")),
        }
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "search.index_enabled" => Ok(self.search.index_enabled.to_string()),
            "search.visibility_scope" => Ok(self.search.visibility_scope.clone()),
            "search.max_limit" => Ok(self.search.max_limit.to_string()),
            "database.path" => Ok(self
                .database
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(default)".to_string())),
            "database.max_connections" => Ok(self.database.max_connections.to_string()),
            _ => Err(anyhow!("Unknown configuration key: {}", key)),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "search.index_enabled" => {
                self.search.index_enabled = value
                    .parse()
                    .with_context(|| format!("Invalid index_enabled value: {}", value))?;
            }
            "search.visibility_scope" => {
                VisibilityScope::parse(value)?;
                self.search.visibility_scope = value.to_string();
            }
            "search.max_limit" => {
                let limit: u32 = value
                    .parse()
                    .with_context(|| format!("Invalid max_limit value: {}", value))?;
                if limit == 0 {
                    return Err(anyhow!("search.max_limit must be at least 1"));
                }
                self.search.max_limit = limit;
            }
            "database.path" => {
                self.database.path = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "database.max_connections" => {
                let max: u32 = value
                    .parse()
                    .with_context(|| format!("Invalid max_connections value: {}", value))?;
                if max == 0 {
                    return Err(anyhow!("database.max_connections must be at least 1"));
                }
                self.database.max_connections = max;
            }
            _ => return Err(anyhow!("Unknown configuration key: {}", key)),
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = [
            "search.index_enabled",
            "search.visibility_scope",
            "search.max_limit",
            "database.path",
            "database.max_connections",
        ];

        keys.into_iter()
            .map(|key| Ok((key.to_string(), self.get(key)?)))
            .collect()
    }
}
