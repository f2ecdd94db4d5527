use log::info;

use super::Chef;
use crate::error::{ChefError, Result};
use crate::extract::ExtractInput;
use crate::model::{Recipe, RecipeUpdate};

/// How an existing recipe is being changed
#[derive(Debug, Clone)]
pub enum UpdateInput {
    /// Edited fields, applied as-is without calling the model
    Fields(RecipeUpdate),
    /// New raw input that replaces the whole recipe after normalization
    Resubmit(ExtractInput),
}

impl Chef {
    /// Extract, normalize and store a new recipe.
    ///
    /// Any failing stage aborts the flow before anything is written.
    pub async fn ingest_add(&self, input: ExtractInput) -> Result<Recipe> {
        let extracted = self.extractor.extract(input).await?;
        let recipe = self
            .normalizer
            .normalize(&extracted.text, extracted.source_url.as_deref())
            .await?;

        let created = self.store.create(recipe).await?;
        info!("Added recipe {} '{}'", created.id, created.title);
        Ok(created)
    }

    /// Change an existing recipe.
    ///
    /// Field edits go straight to the store; resubmitted input runs the full
    /// extract and normalize flow first and then replaces every field.
    pub async fn ingest_update(&self, id: &str, input: UpdateInput) -> Result<Recipe> {
        let update = match input {
            UpdateInput::Fields(update) => update,
            UpdateInput::Resubmit(raw) => {
                // Fail fast before spending an OCR or model call on a missing recipe
                if self.store.get(id).await?.is_none() {
                    return Err(ChefError::NotFound(id.to_string()));
                }

                let extracted = self.extractor.extract(raw).await?;
                let recipe = self
                    .normalizer
                    .normalize(&extracted.text, extracted.source_url.as_deref())
                    .await?;
                RecipeUpdate::from(recipe)
            }
        };

        let updated = self.store.update(id, update).await?;
        info!("Updated recipe {} '{}'", updated.id, updated.title);
        Ok(updated)
    }
}
