use log::info;

use super::Chef;
use crate::error::{ChefError, Result};
use crate::model::{Recipe, StagedRecipe};

impl Chef {
    /// Find and normalize a recipe from the web. Nothing is stored.
    pub async fn discover(&self, query: &str) -> Result<StagedRecipe> {
        let agent = self.discovery.as_ref().ok_or_else(|| {
            ChefError::Builder("discovery requires a web search provider".to_string())
        })?;
        agent.discover(query).await
    }

    /// Store a recipe previously returned by [`Chef::discover`]
    pub async fn confirm(&self, staged: StagedRecipe) -> Result<Recipe> {
        let created = self.store.create(staged.recipe).await?;
        info!(
            "Confirmed discovered recipe {} from {}",
            created.id, staged.page_url
        );
        Ok(created)
    }
}
