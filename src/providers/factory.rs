use crate::config::{AppConfig, ProviderConfig};
use crate::error::{ChefError, Result};
use crate::providers::{
    AnthropicProvider, GoogleProvider, LlmProvider, OllamaProvider, OpenAIProvider,
};
use std::time::Duration;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Box<dyn LlmProvider>> {
        if !config.enabled {
            return Err(ChefError::Builder(format!(
                "Provider '{}' is not enabled in configuration",
                provider_name
            )));
        }

        match provider_name {
            "openai" => Ok(Box::new(OpenAIProvider::new(config, timeout)?)),
            "anthropic" => Ok(Box::new(AnthropicProvider::new(config, timeout)?)),
            "google" => Ok(Box::new(GoogleProvider::new(config, timeout)?)),
            "ollama" => Ok(Box::new(OllamaProvider::new(config, timeout)?)),
            _ => Err(ChefError::Builder(format!(
                "Unknown provider: {}",
                provider_name
            ))),
        }
    }

    /// Get the default provider from configuration
    pub fn get_default_provider(config: &AppConfig) -> Result<Box<dyn LlmProvider>> {
        let provider_name = &config.default_provider;
        let provider_config = config.providers.get(provider_name).ok_or_else(|| {
            ChefError::Builder(format!(
                "Default provider '{}' not found in configuration",
                provider_name
            ))
        })?;

        Self::create(
            provider_name,
            provider_config,
            Duration::from_secs(config.timeout),
        )
    }

    /// Model used when a provider is requested without any configuration
    pub fn default_model(provider_name: &str) -> Option<&'static str> {
        match provider_name {
            "openai" => Some("gpt-4o-mini"),
            "anthropic" => Some("claude-3-5-haiku-20241022"),
            "google" => Some("gemini-2.0-flash"),
            "ollama" => Some("llama3.2"),
            _ => None,
        }
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["openai", "anthropic", "google", "ollama"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn create_test_provider_config() -> ProviderConfig {
        ProviderConfig {
            api_key: Some("test-key".to_string()),
            ..ProviderConfig::for_model("test-model")
        }
    }

    fn timeout() -> Duration {
        Duration::from_secs(5)
    }

    #[test]
    fn test_create_each_provider() {
        let config = create_test_provider_config();
        for name in ProviderFactory::available_providers() {
            let provider = ProviderFactory::create(name, &config, timeout()).unwrap();
            assert_eq!(provider.provider_name(), name);
        }
    }

    #[test]
    fn test_create_unknown_provider() {
        let config = create_test_provider_config();
        let result = ProviderFactory::create("unknown", &config, timeout());
        match result {
            Err(e) => assert!(e.to_string().contains("Unknown provider")),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_create_disabled_provider() {
        let mut config = create_test_provider_config();
        config.enabled = false;

        let result = ProviderFactory::create("openai", &config, timeout());
        match result {
            Err(e) => assert!(e.to_string().contains("not enabled in configuration")),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_get_default_provider() {
        let mut providers = HashMap::new();
        providers.insert("anthropic".to_string(), create_test_provider_config());

        let app_config = AppConfig {
            default_provider: "anthropic".to_string(),
            providers,
            ..AppConfig::default()
        };

        let provider = ProviderFactory::get_default_provider(&app_config).unwrap();
        assert_eq!(provider.provider_name(), "anthropic");
    }

    #[test]
    fn test_get_default_provider_not_found() {
        let app_config = AppConfig::default();

        match ProviderFactory::get_default_provider(&app_config) {
            Err(e) => assert!(e.to_string().contains("not found")),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_default_models() {
        for name in ProviderFactory::available_providers() {
            assert!(ProviderFactory::default_model(name).is_some());
        }
        assert!(ProviderFactory::default_model("unknown").is_none());
    }
}
