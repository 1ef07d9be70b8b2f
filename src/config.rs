use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str =
    "https://knowbiols-backend-d8gcc2beabaafnc7.canadacentral-01.azurewebsites.net";
pub const DEFAULT_SUMMARIZER_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub graph: GraphConfig,
}

fn default_page_size() -> usize {
    10
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_summarizer_url() -> String {
    DEFAULT_SUMMARIZER_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_summarizer_timeout_secs() -> u64 {
    120
}

fn default_width() -> f64 {
    960.0
}

fn default_height() -> f64 {
    600.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default = "default_summarizer_url")]
    pub base_url: String,
    /// Summaries come from a language model and can take a while
    #[serde(default = "default_summarizer_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: default_summarizer_url(),
            timeout_secs: default_summarizer_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            api: ApiConfig::default(),
            summarizer: SummarizerConfig::default(),
            graph: GraphConfig::default(),
        }
    }
}

impl Config {
    /// Get the configuration directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("knowbiols");
        Ok(config_dir)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, falling back to built-in defaults when
    /// no file has been written yet.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file at {}", config_path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.expand_env_vars();
        if config.page_size == 0 {
            anyhow::bail!("page_size must be greater than zero");
        }
        Ok(config)
    }

    /// Apply command-line / environment overrides on top of the file values
    pub fn with_overrides(mut self, api_url: Option<String>, summarizer_url: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api.base_url = url;
        }
        if let Some(url) = summarizer_url {
            self.summarizer.base_url = url;
        }
        self
    }

    fn expand_env_vars(&mut self) {
        self.api.base_url = expand_env_var(&self.api.base_url);
        self.summarizer.base_url = expand_env_var(&self.summarizer.base_url);
    }
}

/// Expand environment variable references like ${VAR_NAME}
fn expand_env_var(value: &str) -> String {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).unwrap_or_default()
    } else if let Some(var_name) = value.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_default()
    } else {
        value.to_string()
    }
}
