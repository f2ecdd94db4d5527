mod sqlite;

pub use sqlite::SqliteRecipeStore;

use async_trait::async_trait;
use log::{debug, info};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Result;
use crate::model::{NewRecipe, Recipe, RecipeUpdate};

pub type DbPool = Pool<Sqlite>;

/// Persistent storage for normalized recipes.
///
/// Title uniqueness is case-insensitive and must be enforced by the storage
/// layer itself, not by a lookup before insert.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Insert a recipe. Fails with `DuplicateTitle` if the title is taken.
    async fn create(&self, recipe: NewRecipe) -> Result<Recipe>;

    /// Merge `update` over the stored recipe and re-validate it.
    /// Fails with `NotFound` if `id` does not exist.
    async fn update(&self, id: &str, update: RecipeUpdate) -> Result<Recipe>;

    async fn get(&self, id: &str) -> Result<Option<Recipe>>;

    async fn find_by_title(&self, title: &str) -> Result<Option<Recipe>>;

    /// Recipes whose ingredient text contains `term`, case-insensitively
    async fn search_by_ingredient(&self, term: &str) -> Result<Vec<Recipe>>;

    async fn list_all(&self) -> Result<Vec<Recipe>>;
}

/// Which tier of [`tiered_search`] produced the results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchTier {
    Title,
    Ingredient,
    All,
}

/// Exact title first, then ingredient text, then every recipe.
///
/// Each tier only runs when the previous one found nothing.
pub async fn tiered_search(
    store: &dyn RecipeRepository,
    query: &str,
) -> Result<(SearchTier, Vec<Recipe>)> {
    let query = query.trim();
    if !query.is_empty() {
        if let Some(recipe) = store.find_by_title(query).await? {
            debug!("Search '{query}' matched a title");
            return Ok((SearchTier::Title, vec![recipe]));
        }

        let by_ingredient = store.search_by_ingredient(query).await?;
        if !by_ingredient.is_empty() {
            debug!(
                "Search '{query}' matched {} recipes by ingredient",
                by_ingredient.len()
            );
            return Ok((SearchTier::Ingredient, by_ingredient));
        }
    }

    Ok((SearchTier::All, store.list_all().await?))
}

/// Open a SQLite pool and apply the embedded migrations.
///
/// In-memory databases get a single long-lived connection, since every new
/// connection to `sqlite::memory:` would see an empty database.
pub async fn init_pool(database_url: &str) -> Result<DbPool> {
    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

    if !in_memory {
        if let Some(path) = database_url
            .strip_prefix("sqlite://")
            .or_else(|| database_url.strip_prefix("sqlite:"))
        {
            let path = path.split('?').next().unwrap_or(path);
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        sqlx::Error::Configuration(
                            format!("cannot create {}: {e}", parent.display()).into(),
                        )
                    })?;
                }
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
    };

    let pool = pool_options.connect_with(options).await?;
    run_migrations(&pool).await?;
    info!("Opened recipe database {}", database_url);
    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
