mod anthropic;
mod factory;
mod google;
mod ollama;
mod open_ai;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use google::GoogleProvider;
pub use ollama::OllamaProvider;
pub use open_ai::OpenAIProvider;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

use crate::error::{ChefError, Result};

/// Unified trait for all LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn provider_name(&self) -> &str;

    /// Send one prompt and return the model's reply text.
    ///
    /// Single request, no conversation state.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// HTTP client with `timeout` on every request, shared by all outgoing calls
pub(crate) fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ChefError::Builder(format!("Failed to create HTTP client: {e}")))
}

/// Read a JSON body, turning HTTP failures into provider errors
pub(crate) async fn read_json(provider: &str, response: Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ChefError::Provider(format!(
            "{provider} returned {status}: {body}"
        )));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| ChefError::Provider(format!("{provider} sent invalid JSON: {e}")))?;
    debug!("{provider} response: {:?}", body);
    Ok(body)
}

pub(crate) fn send_error(provider: &str, err: reqwest::Error) -> ChefError {
    ChefError::Provider(format!("{provider} request failed: {err}"))
}

pub(crate) fn missing_content(provider: &str) -> ChefError {
    ChefError::Provider(format!("Failed to extract content from {provider} response"))
}
