//! A personal recipe manager.
//!
//! Recipes come in as typed text, photos or video links, are normalized by a
//! language model into a fixed layout, and are kept in a SQLite table with
//! case-insensitive unique titles. Recipes can also be discovered on the web
//! and staged for confirmation.
//!
//! # Example
//! ```no_run
//! use chef_digital::{Chef, ExtractInput};
//!
//! # async fn run() -> chef_digital::Result<()> {
//! let chef = Chef::builder().build().await?;
//! let recipe = chef
//!     .ingest_add(ExtractInput::text("Pancakes: 2 eggs, 1 cup flour. Mix and fry."))
//!     .await?;
//! println!("{}", recipe.title);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod model;
pub mod normalizer;
pub mod pipelines;
pub mod providers;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use builder::{ChefBuilder, ProviderKind};
pub use crate::config::AppConfig;
pub use error::{ChefError, Result};
pub use extract::ExtractInput;
pub use model::{IngredientCategory, NewRecipe, Recipe, RecipeUpdate, StagedRecipe};
pub use pipelines::{Chef, UpdateInput};
pub use store::SearchTier;

/// Add a recipe from plain text using configuration from `chef.toml` and the environment
pub async fn add_text(text: &str) -> Result<Recipe> {
    let chef = Chef::builder().build().await?;
    chef.ingest_add(ExtractInput::text(text)).await
}

/// Search stored recipes using configuration from `chef.toml` and the environment
pub async fn search(query: &str) -> Result<Vec<Recipe>> {
    let chef = Chef::builder().build().await?;
    chef.search(query).await
}
