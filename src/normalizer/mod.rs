mod parser;
mod prompt;

pub use parser::{parse_reply, DEFAULT_CATEGORY};
pub use prompt::{build_normalizer_prompt, NORMALIZER_PROMPT};

use log::{debug, info};
use std::sync::Arc;

use crate::error::{ChefError, Result};
use crate::model::NewRecipe;
use crate::providers::LlmProvider;

/// Turns free recipe text into a structured, unpersisted recipe by way of a
/// language model.
#[derive(Clone)]
pub struct RecipeNormalizer {
    provider: Arc<dyn LlmProvider>,
}

impl RecipeNormalizer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Normalize `text` with one model request.
    ///
    /// A `source_url` supplied by the caller always wins over whatever the
    /// model echoes back on its `Source:` line.
    pub async fn normalize(&self, text: &str, source_url: Option<&str>) -> Result<NewRecipe> {
        if text.trim().is_empty() {
            return Err(ChefError::EmptyInput);
        }

        let prompt = build_normalizer_prompt(text, source_url);
        info!(
            "Normalizing {} characters of recipe text with {}",
            text.len(),
            self.provider.provider_name()
        );

        let reply = self.provider.complete(&prompt).await?;
        debug!("Model reply: {reply}");

        let mut recipe = parse_reply(&reply)?;
        if let Some(url) = source_url.map(str::trim).filter(|u| !u.is_empty()) {
            recipe.source_url = Some(url.to_string());
        }

        recipe.validate().map_err(|e| match e {
            ChefError::Validation(msg) => ChefError::MalformedResponse(msg),
            other => other,
        })
    }
}
