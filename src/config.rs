//! Service configuration
//!
//! Values are layered with the `config` crate: serde defaults, then an optional
//! TOML file, then `PRODUCT_LENS__<SECTION>__<KEY>` environment variables.
//! Upstream credentials are not part of the configuration. Only the name of the
//! environment variable holding each key is configured; the value itself is read
//! when a request is made.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "PRODUCT_LENS_CONFIG";

/// Config file used when `PRODUCT_LENS_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "product-lens.toml";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "PRODUCT_LENS";

/// Largest data URI accepted by the image store (8 MiB)
pub const MAX_DATA_URI_BYTES: usize = 8 * 1024 * 1024;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub vision: VisionConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from an optional TOML file plus environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));

        let config: Config = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Load using the path in `PRODUCT_LENS_CONFIG`, if set
    pub fn from_env() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).ok();
        Self::load(path.as_deref().map(Path::new))
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.store.max_data_uri_bytes == 0 {
            return Err(AppError::InvalidConfig(
                "store.max_data_uri_bytes must be positive".to_string(),
            ));
        }
        if self.server.max_body_bytes <= self.store.max_data_uri_bytes {
            return Err(AppError::InvalidConfig(format!(
                "server.max_body_bytes ({}) must exceed store.max_data_uri_bytes ({})",
                self.server.max_body_bytes, self.store.max_data_uri_bytes
            )));
        }
        if self.vision.api_key_env.trim().is_empty() || self.search.api_key_env.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "api_key_env must name an environment variable".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Limit on the raw request body, JSON envelope included
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5000 }
fn default_max_body_bytes() -> usize { 16 * 1024 * 1024 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Image slot settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_max_data_uri_bytes")]
    pub max_data_uri_bytes: usize,
}

fn default_max_data_uri_bytes() -> usize { MAX_DATA_URI_BYTES }

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_data_uri_bytes: default_max_data_uri_bytes(),
        }
    }
}

/// Vision-capable chat completion provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// OpenAI-compatible API root (without `/chat/completions`)
    #[serde(default = "default_vision_base_url")]
    pub base_url: String,

    #[serde(default = "default_vision_model")]
    pub model: String,

    /// Instruction sent alongside the image
    #[serde(default = "default_vision_prompt")]
    pub prompt: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_vision_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_upstream_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_vision_base_url() -> String { "https://router.huggingface.co/v1".to_string() }
fn default_vision_model() -> String { "meta-llama/Llama-4-Scout-17B-16E-Instruct:groq".to_string() }
fn default_vision_prompt() -> String {
    "Describe the product shown in this image in just 10 words or less".to_string()
}
fn default_vision_key_env() -> String { "HG_KEY".to_string() }
fn default_upstream_timeout_ms() -> u64 { 30_000 }

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            base_url: default_vision_base_url(),
            model: default_vision_model(),
            prompt: default_vision_prompt(),
            api_key_env: default_vision_key_env(),
            timeout_ms: default_upstream_timeout_ms(),
        }
    }
}

impl VisionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Shopping search provider (SerpAPI)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    #[serde(default = "default_engine")]
    pub engine: String,

    /// Market the results are localized for
    #[serde(default = "default_location")]
    pub location: String,

    /// Interface language
    #[serde(default = "default_hl")]
    pub hl: String,

    /// Country
    #[serde(default = "default_gl")]
    pub gl: String,

    #[serde(default = "default_google_domain")]
    pub google_domain: String,

    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_upstream_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_search_base_url() -> String { "https://serpapi.com".to_string() }
fn default_engine() -> String { "google".to_string() }
fn default_location() -> String { "Menlo Park, California, United States".to_string() }
fn default_hl() -> String { "en".to_string() }
fn default_gl() -> String { "us".to_string() }
fn default_google_domain() -> String { "google.com".to_string() }
fn default_search_key_env() -> String { "SERP_KEY".to_string() }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base_url(),
            engine: default_engine(),
            location: default_location(),
            hl: default_hl(),
            gl: default_gl(),
            google_domain: default_google_domain(),
            api_key_env: default_search_key_env(),
            timeout_ms: default_upstream_timeout_ms(),
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
