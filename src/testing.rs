//! In-memory stand-ins for every external collaborator.
//!
//! Each double records how it was called so tests can assert that a stage
//! was, or was not, reached.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::discovery::{PageFetcher, SearchHit, WebSearch};
use crate::error::{ChefError, Result};
use crate::extract::{OcrEngine, TranscriptService, VideoRef};
use crate::model::{NewRecipe, Recipe, RecipeUpdate};
use crate::providers::LlmProvider;
use crate::store::RecipeRepository;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// An LLM that always gives the same canned reply
pub struct StaticProvider {
    reply: std::result::Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl StaticProvider {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A provider whose every request fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt received so far
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl LlmProvider for StaticProvider {
    fn provider_name(&self) -> &str {
        "static"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        lock(&self.prompts).push(prompt.to_string());
        self.reply.clone().map_err(ChefError::Provider)
    }
}

/// OCR that "recognizes" a fixed text in any image
pub struct StaticOcr {
    text: String,
    calls: AtomicUsize,
}

impl StaticOcr {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for StaticOcr {
    fn engine_name(&self) -> &str {
        "static"
    }

    async fn recognize(&self, _image: &[u8]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

/// Transcript service with one fixed answer for every video
pub struct StaticTranscripts {
    transcript: Option<String>,
    calls: AtomicUsize,
}

impl StaticTranscripts {
    pub fn new(transcript: Option<&str>) -> Self {
        Self {
            transcript: transcript.map(str::to_string),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptService for StaticTranscripts {
    async fn transcript(&self, _video: &VideoRef) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.transcript.clone())
    }
}

/// Web search returning a fixed, ordered hit list
pub struct StaticSearch {
    hits: Vec<SearchHit>,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl WebSearch for StaticSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        lock(&self.queries).push(query.to_string());
        Ok(self.hits.clone())
    }
}

/// Page fetcher serving the same HTML for every URL, or failing every time
pub struct StaticFetcher {
    html: Option<String>,
    urls: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            html: None,
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        lock(&self.urls).clone()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        lock(&self.urls).push(url.to_string());
        self.html
            .clone()
            .ok_or_else(|| ChefError::fetch(url, "connection refused"))
    }
}

/// A recipe store held in memory.
///
/// Uniqueness is checked under the same lock as the insert, so it is as
/// atomic as the database constraint it stands in for.
#[derive(Default)]
pub struct MemoryRecipeStore {
    recipes: Mutex<Vec<Recipe>>,
    creates: AtomicUsize,
}

impl MemoryRecipeStore {
    /// Number of times `create` was called, successful or not
    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        lock(&self.recipes).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn sorted(mut recipes: Vec<Recipe>) -> Vec<Recipe> {
    recipes.sort_by(|a, b| {
        a.title
            .to_ascii_lowercase()
            .cmp(&b.title.to_ascii_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    recipes
}

#[async_trait]
impl RecipeRepository for MemoryRecipeStore {
    async fn create(&self, recipe: NewRecipe) -> Result<Recipe> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let recipe = recipe.validate()?;

        let mut recipes = lock(&self.recipes);
        if recipes
            .iter()
            .any(|r| r.title.eq_ignore_ascii_case(&recipe.title))
        {
            return Err(ChefError::DuplicateTitle(recipe.title));
        }

        let now = Utc::now();
        let stored = Recipe {
            id: Uuid::new_v4().to_string(),
            title: recipe.title,
            source_url: recipe.source_url,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            created_at: now,
            updated_at: now,
        };
        recipes.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: &str, update: RecipeUpdate) -> Result<Recipe> {
        let mut recipes = lock(&self.recipes);
        let index = recipes
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| ChefError::NotFound(id.to_string()))?;

        let merged = update
            .apply_to(recipes[index].clone().into())
            .validate()?;
        if recipes
            .iter()
            .any(|r| r.id != id && r.title.eq_ignore_ascii_case(&merged.title))
        {
            return Err(ChefError::DuplicateTitle(merged.title));
        }

        let current = &mut recipes[index];
        current.title = merged.title;
        current.source_url = merged.source_url;
        current.ingredients = merged.ingredients;
        current.instructions = merged.instructions;
        current.updated_at = Utc::now();
        Ok(current.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Recipe>> {
        Ok(lock(&self.recipes).iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Recipe>> {
        let title = title.trim();
        Ok(lock(&self.recipes)
            .iter()
            .find(|r| r.title.eq_ignore_ascii_case(title))
            .cloned())
    }

    async fn search_by_ingredient(&self, term: &str) -> Result<Vec<Recipe>> {
        let term = term.trim().to_ascii_lowercase();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let found = lock(&self.recipes)
            .iter()
            .filter(|r| {
                r.ingredients
                    .iter()
                    .flat_map(|c| c.items.iter())
                    .any(|i| i.to_ascii_lowercase().contains(&term))
            })
            .cloned()
            .collect();
        Ok(sorted(found))
    }

    async fn list_all(&self) -> Result<Vec<Recipe>> {
        Ok(sorted(lock(&self.recipes).clone()))
    }
}
