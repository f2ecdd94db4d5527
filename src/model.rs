use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChefError, Result};

/// A named group of ingredients, e.g. "Sauce" or "Dough"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientCategory {
    pub name: String,
    pub items: Vec<String>,
}

impl IngredientCategory {
    pub fn new(name: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }
}

/// A persisted recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub source_url: Option<String>,
    pub ingredients: Vec<IngredientCategory>,
    pub instructions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A normalized recipe that has not been written to the store yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub title: String,
    pub source_url: Option<String>,
    pub ingredients: Vec<IngredientCategory>,
    pub instructions: Vec<String>,
}

impl NewRecipe {
    /// Check the invariants every stored recipe must hold.
    ///
    /// Returns a copy with the title and source trimmed; a blank source
    /// becomes `None`.
    pub fn validate(self) -> Result<NewRecipe> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ChefError::Validation("title cannot be empty".to_string()));
        }

        if self.ingredients.is_empty() {
            return Err(ChefError::Validation(
                "a recipe needs at least one ingredient category".to_string(),
            ));
        }
        for category in &self.ingredients {
            if category.name.trim().is_empty() {
                return Err(ChefError::Validation(
                    "ingredient category names cannot be empty".to_string(),
                ));
            }
            if category.items.is_empty() || category.items.iter().any(|i| i.trim().is_empty()) {
                return Err(ChefError::Validation(format!(
                    "ingredient category '{}' has no ingredients or a blank ingredient",
                    category.name
                )));
            }
        }

        if self.instructions.is_empty() {
            return Err(ChefError::Validation(
                "a recipe needs at least one instruction step".to_string(),
            ));
        }
        if self.instructions.iter().any(|s| s.trim().is_empty()) {
            return Err(ChefError::Validation(
                "instruction steps cannot be blank".to_string(),
            ));
        }

        let source_url = self
            .source_url
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(NewRecipe {
            title,
            source_url,
            ingredients: self.ingredients,
            instructions: self.instructions,
        })
    }

    /// All ingredient lines flattened into one searchable string
    pub fn ingredient_text(&self) -> String {
        flatten_ingredients(&self.ingredients)
    }
}

impl From<Recipe> for NewRecipe {
    fn from(recipe: Recipe) -> Self {
        NewRecipe {
            title: recipe.title,
            source_url: recipe.source_url,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
        }
    }
}

/// Field-level edits to an existing recipe. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeUpdate {
    pub title: Option<String>,
    /// `Some(None)` clears the source
    pub source_url: Option<Option<String>>,
    pub ingredients: Option<Vec<IngredientCategory>>,
    pub instructions: Option<Vec<String>>,
}

impl RecipeUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.source_url.is_none()
            && self.ingredients.is_none()
            && self.instructions.is_none()
    }

    /// Apply these edits over `current`. The result is not validated.
    pub fn apply_to(self, current: NewRecipe) -> NewRecipe {
        NewRecipe {
            title: self.title.unwrap_or(current.title),
            source_url: self.source_url.unwrap_or(current.source_url),
            ingredients: self.ingredients.unwrap_or(current.ingredients),
            instructions: self.instructions.unwrap_or(current.instructions),
        }
    }
}

impl From<NewRecipe> for RecipeUpdate {
    /// A full replacement of every field
    fn from(recipe: NewRecipe) -> Self {
        RecipeUpdate {
            title: Some(recipe.title),
            source_url: Some(recipe.source_url),
            ingredients: Some(recipe.ingredients),
            instructions: Some(recipe.instructions),
        }
    }
}

/// A discovered recipe awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedRecipe {
    pub query: String,
    pub page_url: String,
    pub recipe: NewRecipe,
}

pub(crate) fn flatten_ingredients(categories: &[IngredientCategory]) -> String {
    categories
        .iter()
        .flat_map(|c| c.items.iter())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}
