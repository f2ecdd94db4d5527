mod discover;
mod ingest;

pub use ingest::UpdateInput;

use std::sync::Arc;

use crate::builder::ChefBuilder;
use crate::discovery::DiscoveryAgent;
use crate::error::{ChefError, Result};
use crate::extract::TextExtractor;
use crate::model::Recipe;
use crate::normalizer::RecipeNormalizer;
use crate::store::{tiered_search, RecipeRepository, SearchTier};

/// The recipe manager's boundary: add, update, search and discover.
///
/// Every call is independent; `Chef` only holds shared collaborators and can
/// be cloned freely across request handlers.
#[derive(Clone)]
pub struct Chef {
    extractor: TextExtractor,
    normalizer: RecipeNormalizer,
    store: Arc<dyn RecipeRepository>,
    discovery: Option<DiscoveryAgent>,
}

impl Chef {
    pub fn new(
        extractor: TextExtractor,
        normalizer: RecipeNormalizer,
        store: Arc<dyn RecipeRepository>,
        discovery: Option<DiscoveryAgent>,
    ) -> Self {
        Self {
            extractor,
            normalizer,
            store,
            discovery,
        }
    }

    /// Creates a new builder for assembling a `Chef` from configuration
    pub fn builder() -> ChefBuilder {
        ChefBuilder::default()
    }

    pub fn store(&self) -> &Arc<dyn RecipeRepository> {
        &self.store
    }

    /// Find recipes for `query`: exact title, then ingredient text, then all
    pub async fn search(&self, query: &str) -> Result<Vec<Recipe>> {
        self.search_with_tier(query).await.map(|(_, recipes)| recipes)
    }

    /// Like [`Chef::search`], also reporting which tier matched
    pub async fn search_with_tier(&self, query: &str) -> Result<(SearchTier, Vec<Recipe>)> {
        tiered_search(self.store.as_ref(), query).await
    }

    pub async fn get(&self, id: &str) -> Result<Recipe> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ChefError::NotFound(id.to_string()))
    }

    pub async fn list(&self) -> Result<Vec<Recipe>> {
        self.store.list_all().await
    }
}
