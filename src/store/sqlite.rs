use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use sqlx::{FromRow, SqliteConnection};
use uuid::Uuid;

use crate::error::{ChefError, Result};
use crate::model::{IngredientCategory, NewRecipe, Recipe, RecipeUpdate};
use crate::store::{DbPool, RecipeRepository};

#[derive(Debug, FromRow)]
struct RecipeRow {
    id: String,
    title: String,
    source_url: Option<String>,
    ingredients: String,
    instructions: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = ChefError;

    fn try_from(row: RecipeRow) -> Result<Self> {
        let ingredients: Vec<IngredientCategory> =
            serde_json::from_str(&row.ingredients).map_err(decode_error)?;
        let instructions: Vec<String> =
            serde_json::from_str(&row.instructions).map_err(decode_error)?;

        Ok(Recipe {
            id: row.id,
            title: row.title,
            source_url: row.source_url,
            ingredients,
            instructions,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn decode_error(err: serde_json::Error) -> ChefError {
    ChefError::Database(sqlx::Error::Decode(Box::new(err)))
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| ChefError::Database(sqlx::Error::Encode(Box::new(e))))
}

/// Map a unique-constraint violation on insert/update to `DuplicateTitle`
fn map_write_error(err: sqlx::Error, title: &str) -> ChefError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ChefError::DuplicateTitle(title.to_string())
        }
        _ => ChefError::Database(err),
    }
}

/// Escape LIKE wildcards so the term matches literally
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn rows_to_recipes(rows: Vec<RecipeRow>) -> Result<Vec<Recipe>> {
    rows.into_iter().map(Recipe::try_from).collect()
}

const SELECT_COLUMNS: &str =
    "SELECT id, title, source_url, ingredients, instructions, created_at, updated_at FROM recipes";

/// The recipe table in SQLite
#[derive(Clone)]
pub struct SqliteRecipeStore {
    pool: DbPool,
}

impl SqliteRecipeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open `database_url` and apply migrations
    pub async fn connect(database_url: &str) -> Result<Self> {
        Ok(Self::new(super::init_pool(database_url).await?))
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn get_with(conn: &mut SqliteConnection, id: &str) -> Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(conn)
            .await?;
        row.map(Recipe::try_from).transpose()
    }

    /// Merge `update` into the stored recipe; runs inside the caller's transaction
    async fn update_with(
        conn: &mut SqliteConnection,
        id: &str,
        update: RecipeUpdate,
    ) -> Result<Recipe> {
        let current = Self::get_with(conn, id)
            .await?
            .ok_or_else(|| ChefError::NotFound(id.to_string()))?;
        let merged = update.apply_to(current.into()).validate()?;

        let row = sqlx::query_as::<_, RecipeRow>(
            r#"
            UPDATE recipes
            SET title = ?, source_url = ?, ingredients = ?, ingredient_text = ?,
                instructions = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, title, source_url, ingredients, instructions, created_at, updated_at
            "#,
        )
        .bind(&merged.title)
        .bind(&merged.source_url)
        .bind(encode(&merged.ingredients)?)
        .bind(merged.ingredient_text())
        .bind(encode(&merged.instructions)?)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(|e| map_write_error(e, &merged.title))?
        .ok_or_else(|| ChefError::NotFound(id.to_string()))?;

        row.try_into()
    }
}

#[async_trait]
impl RecipeRepository for SqliteRecipeStore {
    async fn create(&self, recipe: NewRecipe) -> Result<Recipe> {
        let recipe = recipe.validate()?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let row = sqlx::query_as::<_, RecipeRow>(
            r#"
            INSERT INTO recipes (
                id, title, source_url, ingredients, ingredient_text,
                instructions, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, source_url, ingredients, instructions, created_at, updated_at
            "#,
        )
        .bind(&id)
        .bind(&recipe.title)
        .bind(&recipe.source_url)
        .bind(encode(&recipe.ingredients)?)
        .bind(recipe.ingredient_text())
        .bind(encode(&recipe.instructions)?)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &recipe.title))?;

        info!("Created recipe {} '{}'", id, recipe.title);
        row.try_into()
    }

    async fn update(&self, id: &str, update: RecipeUpdate) -> Result<Recipe> {
        let mut conn = self.pool.acquire().await?;

        // Take the write lock before reading so a concurrent writer waits on
        // busy_timeout instead of failing the upgrade with SQLITE_BUSY.
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
        let result = Self::update_with(&mut conn, id, update).await;
        let end = if result.is_ok() { "COMMIT" } else { "ROLLBACK" };
        sqlx::query(end).execute(&mut *conn).await?;

        let recipe = result?;
        info!("Updated recipe {} '{}'", id, recipe.title);
        Ok(recipe)
    }

    async fn get(&self, id: &str) -> Result<Option<Recipe>> {
        let mut conn = self.pool.acquire().await?;
        Self::get_with(&mut conn, id).await
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Recipe>> {
        // The column is declared COLLATE NOCASE, so `=` ignores ASCII case
        let row = sqlx::query_as::<_, RecipeRow>(&format!("{SELECT_COLUMNS} WHERE title = ?"))
            .bind(title.trim())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Recipe::try_from).transpose()
    }

    async fn search_by_ingredient(&self, term: &str) -> Result<Vec<Recipe>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "{SELECT_COLUMNS} WHERE ingredient_text LIKE ? ESCAPE '\\' ORDER BY title, id"
        ))
        .bind(like_pattern(term))
        .fetch_all(&self.pool)
        .await?;
        rows_to_recipes(rows)
    }

    async fn list_all(&self) -> Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!("{SELECT_COLUMNS} ORDER BY title, id"))
            .fetch_all(&self.pool)
            .await?;
        rows_to_recipes(rows)
    }
}
