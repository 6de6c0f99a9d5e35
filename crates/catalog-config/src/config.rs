use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

/// Environment variable that takes precedence over `omdb.api_key`.
pub const API_KEY_ENV: &str = "OMDB_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmdbConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Term searched when the input is empty or whitespace
    #[serde(default = "default_term")]
    pub default_term: String,
    /// Quiet period before a changed input triggers a search
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// A page with at least this many (filtered) hits is assumed to have a successor
    #[serde(default = "default_has_more_threshold")]
    pub has_more_threshold: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides the platform data directory for favorites and reviews
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_term() -> String {
    "action".to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_has_more_threshold() -> usize {
    10
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_term: default_term(),
            debounce_ms: default_debounce_ms(),
            has_more_threshold: default_has_more_threshold(),
        }
    }
}

impl OmdbConfig {
    /// API key with the environment override applied.
    pub fn resolved_api_key(&self) -> String {
        resolve_api_key(&self.api_key, std::env::var(API_KEY_ENV).ok())
    }
}

fn resolve_api_key(configured: &str, from_env: Option<String>) -> String {
    match from_env {
        Some(key) if !key.trim().is_empty() => key.trim().to_string(),
        _ => configured.trim().to_string(),
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Like `load_from_file`, but a missing file yields the defaults.
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.omdb.resolved_api_key().is_empty() {
            return Err(anyhow::anyhow!(
                "omdb.api_key is not configured (set it in config.toml or {})",
                API_KEY_ENV
            ));
        }

        let base_url = self.omdb.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(anyhow::anyhow!("omdb.base_url must be an http(s) URL: {}", base_url));
        }

        if self.omdb.timeout_secs == 0 {
            return Err(anyhow::anyhow!("omdb.timeout_secs must be greater than zero"));
        }

        if self.search.default_term.trim().is_empty() {
            return Err(anyhow::anyhow!("search.default_term cannot be empty"));
        }

        if self.search.has_more_threshold == 0 {
            return Err(anyhow::anyhow!("search.has_more_threshold must be greater than zero"));
        }

        Ok(())
    }
}
