use log::{debug, warn};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, OcrEngineKind, ProviderConfig};
use crate::discovery::{DiscoveryAgent, PageFetcher, RequestFetcher, TavilySearch, WebSearch};
use crate::error::{ChefError, Result};
use crate::extract::{
    GoogleVisionOcr, HttpTranscriptService, OcrEngine, TesseractOcr, TextExtractor,
    TranscriptService,
};
use crate::normalizer::RecipeNormalizer;
use crate::pipelines::Chef;
use crate::providers::{http_client, LlmProvider, ProviderFactory};
use crate::store::{RecipeRepository, SqliteRecipeStore};

/// Hosted language models available for normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAI,
    Anthropic,
    Google,
    Ollama,
}

impl ProviderKind {
    /// Convert to provider name string used by the factory
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Google => "google",
            ProviderKind::Ollama => "ollama",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ChefError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAI),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "google" => Ok(ProviderKind::Google),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(ChefError::Builder(format!("Unknown provider: {other}"))),
        }
    }
}

/// Builder for assembling a [`Chef`]
///
/// Anything not set explicitly comes from [`AppConfig`]; any collaborator can
/// be injected directly instead.
#[derive(Default)]
pub struct ChefBuilder {
    config: Option<AppConfig>,
    provider: Option<ProviderKind>,
    api_key: Option<String>,
    model: Option<String>,
    timeout: Option<Duration>,
    database_url: Option<String>,
    llm: Option<Arc<dyn LlmProvider>>,
    store: Option<Arc<dyn RecipeRepository>>,
    ocr: Option<Arc<dyn OcrEngine>>,
    transcripts: Option<Arc<dyn TranscriptService>>,
    search: Option<Arc<dyn WebSearch>>,
    fetcher: Option<Arc<dyn PageFetcher>>,
}

impl ChefBuilder {
    /// Use this configuration instead of loading `chef.toml` and `CHEF__*`
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the LLM provider used for normalization
    ///
    /// # Example
    /// ```
    /// use chef_digital::{Chef, ProviderKind};
    ///
    /// let builder = Chef::builder().provider(ProviderKind::Anthropic);
    /// ```
    pub fn provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the API key for the LLM provider
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model name for the LLM provider
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set a timeout for every outgoing HTTP request
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set the sqlx connection string, e.g. `sqlite:recipes.db`
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn RecipeRepository>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_ocr(mut self, ocr: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    pub fn with_transcripts(mut self, transcripts: Arc<dyn TranscriptService>) -> Self {
        self.transcripts = Some(transcripts);
        self
    }

    pub fn with_search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Assemble the [`Chef`], opening the database if no store was injected
    ///
    /// # Errors
    /// Returns `ChefError` if:
    /// - The configuration cannot be loaded
    /// - The LLM provider is unknown, disabled or has no API key
    /// - The database cannot be opened or migrated
    pub async fn build(self) -> Result<Chef> {
        let config = match self.config {
            Some(config) => config,
            None => AppConfig::load()?,
        };
        let timeout = self
            .timeout
            .unwrap_or_else(|| Duration::from_secs(config.timeout));

        let llm = match self.llm {
            Some(llm) => llm,
            None => {
                let name = self
                    .provider
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_else(|| config.default_provider.clone());
                let provider_config =
                    resolve_provider_config(&config, &name, self.api_key, self.model)?;
                Arc::from(ProviderFactory::create(&name, &provider_config, timeout)?)
            }
        };
        debug!("Normalizing with {}", llm.provider_name());
        let normalizer = RecipeNormalizer::new(llm);

        let store: Arc<dyn RecipeRepository> = match self.store {
            Some(store) => store,
            None => {
                let url = self
                    .database_url
                    .unwrap_or_else(|| config.database_url.clone());
                Arc::new(SqliteRecipeStore::connect(&url).await?)
            }
        };

        let client = http_client(timeout)?;

        let ocr = self.ocr.or_else(|| ocr_from_config(&config, &client));
        let transcripts = self.transcripts.or_else(|| {
            config.transcript.endpoint.as_ref().map(|endpoint| {
                Arc::new(HttpTranscriptService::new(
                    client.clone(),
                    endpoint.clone(),
                    config.transcript.api_key.clone(),
                )) as Arc<dyn TranscriptService>
            })
        });
        let extractor = TextExtractor::new(ocr, transcripts);

        let search = self.search.or_else(|| {
            config
                .search
                .api_key
                .clone()
                .or_else(|| std::env::var("TAVILY_API_KEY").ok())
                .map(|key| {
                    Arc::new(
                        TavilySearch::with_base_url(client.clone(), key, &config.search.base_url)
                            .max_results(config.search.max_results),
                    ) as Arc<dyn WebSearch>
                })
        });
        let discovery = match search {
            Some(search) => {
                let fetcher = match self.fetcher {
                    Some(fetcher) => fetcher,
                    None => Arc::new(RequestFetcher::new(Some(timeout))?),
                };
                Some(DiscoveryAgent::new(search, fetcher, normalizer.clone()))
            }
            None => {
                warn!("No web search configured; discovery is disabled");
                None
            }
        };

        Ok(Chef::new(extractor, normalizer, store, discovery))
    }
}

/// Provider settings from config, falling back to a bare config with the
/// provider's default model, then applying builder overrides
fn resolve_provider_config(
    config: &AppConfig,
    name: &str,
    api_key: Option<String>,
    model: Option<String>,
) -> Result<ProviderConfig> {
    let mut provider_config = match config.providers.get(name) {
        Some(provider_config) => provider_config.clone(),
        None => {
            let default_model = model
                .clone()
                .or_else(|| ProviderFactory::default_model(name).map(str::to_string))
                .ok_or_else(|| ChefError::Builder(format!("Unknown provider: {name}")))?;
            ProviderConfig::for_model(default_model)
        }
    };

    if let Some(key) = api_key {
        provider_config.api_key = Some(key);
    }
    if let Some(model) = model {
        provider_config.model = model;
    }
    Ok(provider_config)
}

fn ocr_from_config(config: &AppConfig, client: &Client) -> Option<Arc<dyn OcrEngine>> {
    match config.ocr.engine {
        OcrEngineKind::Tesseract => Some(Arc::new(TesseractOcr::new(
            config.ocr.tesseract_path.clone(),
            config.ocr.language.clone(),
        ))),
        OcrEngineKind::GoogleVision => {
            match config
                .ocr
                .api_key
                .clone()
                .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            {
                Some(key) => Some(Arc::new(GoogleVisionOcr::new(client.clone(), key))),
                None => {
                    warn!("Google Vision OCR selected but no API key found; image input is disabled");
                    None
                }
            }
        }
    }
}
