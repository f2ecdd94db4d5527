use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

/// Top-level application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Provider used for normalization when not overridden
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// sqlx connection string for the recipe table
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Request timeout in seconds, applied to every HTTP client
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub transcript: TranscriptConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: HashMap::new(),
            database_url: default_database_url(),
            timeout: default_timeout(),
            ocr: OcrConfig::default(),
            transcript: TranscriptConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

/// Configuration for a specific AI provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    pub enabled: bool,
    /// Model identifier (e.g., "gpt-4o-mini", "claude-3-5-sonnet-20241022")
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// An enabled provider config with default sampling parameters
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            enabled: true,
            model: model.into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
        }
    }
}

/// Which OCR engine reads recipe photos
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OcrEngineKind {
    /// Local `tesseract` binary
    #[default]
    Tesseract,
    /// Google Cloud Vision API
    GoogleVision,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OcrConfig {
    #[serde(default)]
    pub engine: OcrEngineKind,
    /// Path or name of the tesseract executable
    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: String,
    /// Tesseract language pack, e.g. "eng" or "eng+deu"
    #[serde(default = "default_ocr_language")]
    pub language: String,
    /// Google Vision API key (falls back to GOOGLE_API_KEY)
    pub api_key: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngineKind::default(),
            tesseract_path: default_tesseract_path(),
            language: default_ocr_language(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TranscriptConfig {
    /// Base URL of the transcript service
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Tavily API key (falls back to TAVILY_API_KEY)
    pub api_key: Option<String>,
    #[serde(default = "default_search_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_search_base_url(),
            max_results: default_max_results(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_database_url() -> String {
    "sqlite:chef.db".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_tesseract_path() -> String {
    "tesseract".to_string()
}

fn default_ocr_language() -> String {
    "eng".to_string()
}

fn default_search_base_url() -> String {
    "https://api.tavily.com".to_string()
}

fn default_max_results() -> u32 {
    5
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with CHEF__ prefix
    /// 2. chef.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: CHEF__PROVIDERS__OPENAI__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from `chef.toml` and `CHEF__*` environment variables
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        .add_source(File::with_name("chef").required(false))
        // Use double underscore for nested: CHEF__SEARCH__API_KEY
        .add_source(
            Environment::with_prefix("CHEF")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
