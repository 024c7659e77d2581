use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::core::normalizer::{DEFAULT_CHAT_K, DEFAULT_K};
use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub recommend: RecommendSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub images: ImageSettings,
    #[serde(default)]
    pub nlu: NluSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 5000 }

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

fn default_catalog_path() -> String { "data/bikes.json".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendSettings {
    #[serde(default = "default_k")]
    pub default_k: u8,
    #[serde(default = "default_chat_k")]
    pub chat_default_k: u8,
    #[serde(default)]
    pub top_up: bool,
}

impl Default for RecommendSettings {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            chat_default_k: default_chat_k(),
            top_up: false,
        }
    }
}

fn default_k() -> u8 { DEFAULT_K }
fn default_chat_k() -> u8 { DEFAULT_CHAT_K }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_seat_fit_weight")]
    pub seat_fit: f64,
    #[serde(default = "default_weight_weight")]
    pub weight: f64,
    #[serde(default = "default_abs_weight")]
    pub abs: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            seat_fit: default_seat_fit_weight(),
            weight: default_weight_weight(),
            abs: default_abs_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            seat_fit: config.seat_fit,
            weight: config.weight,
            abs: config.abs,
        }
    }
}

fn default_seat_fit_weight() -> f64 { 0.6 }
fn default_weight_weight() -> f64 { 0.25 }
fn default_abs_weight() -> f64 { 0.05 }

#[derive(Debug, Clone, Deserialize)]
pub struct ImageSettings {
    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,
    #[serde(default = "default_static_prefix")]
    pub static_prefix: String,
    #[serde(default = "default_fallback_image")]
    pub fallback_image: String,
    #[serde(default = "default_search_endpoint")]
    pub search_endpoint: String,
    pub google_cse_key: Option<String>,
    pub google_cse_cx: Option<String>,
    #[serde(default = "default_image_cache_size")]
    pub cache_size: u64,
    #[serde(default = "default_image_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            manifest_path: default_manifest_path(),
            static_prefix: default_static_prefix(),
            fallback_image: default_fallback_image(),
            search_endpoint: default_search_endpoint(),
            google_cse_key: None,
            google_cse_cx: None,
            cache_size: default_image_cache_size(),
            cache_ttl_secs: default_image_cache_ttl(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ImageSettings {
    /// Key and engine id, when both are configured
    pub fn search_credentials(&self) -> Option<(&str, &str)> {
        let key = self.google_cse_key.as_deref().filter(|k| !k.is_empty())?;
        let cx = self.google_cse_cx.as_deref().filter(|c| !c.is_empty())?;
        Some((key, cx))
    }
}

fn default_manifest_path() -> String { "static/images.json".to_string() }
fn default_static_prefix() -> String { "/static/stock_images".to_string() }
fn default_fallback_image() -> String { "motorcycle_ride.jpg".to_string() }
fn default_search_endpoint() -> String { "https://www.googleapis.com/customsearch/v1".to_string() }
fn default_image_cache_size() -> u64 { 1000 }
fn default_image_cache_ttl() -> u64 { 3600 }
fn default_timeout_secs() -> u64 { 6 }

#[derive(Debug, Clone, Deserialize)]
pub struct NluSettings {
    #[serde(default)]
    pub enabled: bool,
    pub api_key: Option<String>,
    #[serde(default = "default_nlu_model")]
    pub model: String,
    #[serde(default = "default_nlu_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_nlu_timeout")]
    pub timeout_secs: u64,
}

impl Default for NluSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            model: default_nlu_model(),
            endpoint: default_nlu_endpoint(),
            timeout_secs: default_nlu_timeout(),
        }
    }
}

impl NluSettings {
    /// API key when the chat model is enabled and keyed
    pub fn active_key(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }
}

fn default_nlu_model() -> String { "gpt-4o-mini".to_string() }
fn default_nlu_endpoint() -> String { "https://api.openai.com/v1".to_string() }
fn default_nlu_timeout() -> u64 { 15 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingSettings {
    /// Settings with `LOG_LEVEL` / `LOG_FORMAT` applied on top
    pub fn with_env_overrides<F>(&self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            level: non_empty("LOG_LEVEL").unwrap_or_else(|| self.level.clone()),
            format: non_empty("LOG_FORMAT").unwrap_or_else(|| self.format.clone()),
        }
    }

    pub fn is_pretty(&self) -> bool {
        self.format.eq_ignore_ascii_case("pretty")
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local configuration file (config/local.toml)
    /// 4. Environment variables (prefixed with RIDEREADY__)
    /// 5. Well-known provider variables (GOOGLE_CSE_KEY, OPENAI_API_KEY, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., RIDEREADY__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("RIDEREADY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = substitute_env_vars(settings, |name| std::env::var(name).ok())?;

        settings.try_deserialize()
    }
}

/// Override config values from the provider variables the service has
/// always honored; the first variable present in each list wins.
fn substitute_env_vars<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let first = |names: &[&str]| names.iter().find_map(|name| lookup(name).filter(|v| !v.is_empty()));

    let overrides = [
        ("images.google_cse_key", first(&["GOOGLE_CSE_KEY", "GOOGLE_API_KEY"])),
        (
            "images.google_cse_cx",
            first(&["GOOGLE_CSE_CX", "GOOGLE_CSE_ID", "GOOGLE_CSE_ENGINE"]),
        ),
        ("nlu.api_key", first(&["OPENAI_API_KEY"])),
        ("nlu.enabled", first(&["RR_OPENAI_ENABLED"]).map(|v| v.to_lowercase())),
        ("nlu.model", first(&["RR_OPENAI_MODEL"])),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (key, value) in overrides {
        if let Some(value) = value {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
