//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Category/search listing URL the traversal starts from
    #[serde(default = "default_category_url")]
    pub category_url: String,

    /// Site root used to resolve relative links
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Destination CSV for product records
    #[serde(default = "default_output_products")]
    pub output_products: PathBuf,

    /// Destination CSV for review records
    #[serde(default = "default_output_reviews")]
    pub output_reviews: PathBuf,

    /// Truncate each page's extraction to its first element (smoke test)
    #[serde(default)]
    pub quiet: bool,

    /// Seconds to wait for the ready selector on each page
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Base delay between page fetches in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to the delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// What to do when a product traversal fails
    #[serde(default)]
    pub on_error: FailurePolicy,
}

fn default_category_url() -> String {
    "https://www.amazon.fr/s?k=camera+surveillance".to_string()
}

fn default_base_url() -> String {
    "https://www.amazon.fr".to_string()
}

fn default_output_products() -> PathBuf {
    PathBuf::from("products.csv")
}

fn default_output_reviews() -> PathBuf {
    PathBuf::from("reviews.csv")
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_delay_jitter_ms() -> u64 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            category_url: default_category_url(),
            base_url: default_base_url(),
            output_products: default_output_products(),
            output_reviews: default_output_reviews(),
            quiet: false,
            timeout_secs: default_timeout_secs(),
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            on_error: FailurePolicy::Abort,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("avis-crawler").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var("AVIS_BASE_URL") {
            self.base_url = base_url;
        }

        if let Ok(delay) = std::env::var("AVIS_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(timeout) = std::env::var("AVIS_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }

        self
    }
}

/// What the category loop does when one product traversal fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Propagate the first error and lose in-progress accumulation
    #[default]
    Abort,
    /// Log the failure and continue with the next product
    Skip,
    /// Retry the product with backoff, then propagate
    Retry,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "skip" => Ok(FailurePolicy::Skip),
            "retry" => Ok(FailurePolicy::Retry),
            _ => Err(format!("Unknown failure policy: {}. Use: abort, skip, retry", s)),
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::Abort => write!(f, "abort"),
            FailurePolicy::Skip => write!(f, "skip"),
            FailurePolicy::Retry => write!(f, "retry"),
        }
    }
}
