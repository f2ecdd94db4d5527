mod fetcher;
mod readable;
mod search;

pub use fetcher::{PageFetcher, RequestFetcher};
pub use readable::readable_text;
pub use search::{SearchHit, TavilySearch, WebSearch};

use log::info;
use std::sync::Arc;

use crate::error::{ChefError, Result};
use crate::model::StagedRecipe;
use crate::normalizer::RecipeNormalizer;

/// Finds a recipe on the web and normalizes it without storing it.
#[derive(Clone)]
pub struct DiscoveryAgent {
    search: Arc<dyn WebSearch>,
    fetcher: Arc<dyn PageFetcher>,
    normalizer: RecipeNormalizer,
}

impl DiscoveryAgent {
    pub fn new(
        search: Arc<dyn WebSearch>,
        fetcher: Arc<dyn PageFetcher>,
        normalizer: RecipeNormalizer,
    ) -> Self {
        Self {
            search,
            fetcher,
            normalizer,
        }
    }

    /// Search, fetch the top hit, and normalize its readable text.
    ///
    /// Only the provider's first result is used. The recipe's source is the
    /// page URL.
    pub async fn discover(&self, query: &str) -> Result<StagedRecipe> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ChefError::EmptyInput);
        }

        let hits = self.search.search(query).await?;
        let top = hits
            .into_iter()
            .next()
            .ok_or_else(|| ChefError::NoResults(query.to_string()))?;
        info!("Discovery for '{}' picked {}", query, top.url);

        let html = self.fetcher.fetch(&top.url).await?;
        let text = readable_text(&html);
        if text.is_empty() {
            return Err(ChefError::fetch(&top.url, "page has no readable text"));
        }

        let recipe = self.normalizer.normalize(&text, Some(top.url.as_str())).await?;
        Ok(StagedRecipe {
            query: query.to_string(),
            page_url: top.url,
            recipe,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StaticFetcher, StaticProvider, StaticSearch};

    const REPLY: &str = "Title: Shakshuka
Source: None
Ingredients:
- Base:
  - 6 eggs
  - 1 can tomatoes
Instructions:
1. Simmer tomatoes.
2. Poach eggs in the sauce.
";

    fn hit(url: &str) -> SearchHit {
        SearchHit {
            url: url.to_string(),
            title: String::new(),
            snippet: String::new(),
        }
    }

    #[tokio::test]
    async fn test_discover_uses_top_hit() {
        let search = Arc::new(StaticSearch::new(vec![
            hit("https://first.example/shakshuka"),
            hit("https://second.example/shakshuka"),
        ]));
        let fetcher = Arc::new(StaticFetcher::new(
            "<html><body><h1>Shakshuka</h1><p>6 eggs</p></body></html>",
        ));
        let provider = Arc::new(StaticProvider::new(REPLY));
        let agent = DiscoveryAgent::new(
            search.clone(),
            fetcher.clone(),
            RecipeNormalizer::new(provider.clone()),
        );

        let staged = agent.discover("  shakshuka ").await.unwrap();

        assert_eq!(staged.query, "shakshuka");
        assert_eq!(staged.page_url, "https://first.example/shakshuka");
        assert_eq!(
            staged.recipe.source_url.as_deref(),
            Some("https://first.example/shakshuka")
        );
        assert_eq!(staged.recipe.title, "Shakshuka");
        assert_eq!(search.queries(), vec!["shakshuka"]);
        assert_eq!(fetcher.urls(), vec!["https://first.example/shakshuka"]);
        assert!(provider.prompts()[0].contains("Shakshuka\n6 eggs"));
    }

    #[tokio::test]
    async fn test_no_results_skips_fetch_and_normalize() {
        let search = Arc::new(StaticSearch::new(vec![]));
        let fetcher = Arc::new(StaticFetcher::new("<p>unused</p>"));
        let provider = Arc::new(StaticProvider::new(REPLY));
        let agent = DiscoveryAgent::new(
            search,
            fetcher.clone(),
            RecipeNormalizer::new(provider.clone()),
        );

        let err = agent.discover("zzz").await.unwrap_err();

        assert!(matches!(err, ChefError::NoResults(_)));
        assert!(fetcher.urls().is_empty());
        assert!(provider.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let search = Arc::new(StaticSearch::new(vec![hit("https://down.example")]));
        let fetcher = Arc::new(StaticFetcher::failing());
        let provider = Arc::new(StaticProvider::new(REPLY));
        let agent = DiscoveryAgent::new(search, fetcher, RecipeNormalizer::new(provider.clone()));

        let err = agent.discover("soup").await.unwrap_err();
        assert!(matches!(err, ChefError::Fetch { .. }));
        assert!(provider.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_page_without_text_is_fetch_error() {
        let search = Arc::new(StaticSearch::new(vec![hit("https://empty.example")]));
        let fetcher = Arc::new(StaticFetcher::new("<html><script>app()</script></html>"));
        let provider = Arc::new(StaticProvider::new(REPLY));
        let agent = DiscoveryAgent::new(search, fetcher, RecipeNormalizer::new(provider));

        let err = agent.discover("soup").await.unwrap_err();
        assert!(matches!(err, ChefError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_malformed_reply_propagates_unchanged() {
        let search = Arc::new(StaticSearch::new(vec![hit("https://blog.example")]));
        let fetcher = Arc::new(StaticFetcher::new("<p>My trip to Rome</p>"));
        let provider = Arc::new(StaticProvider::new("This page is not a recipe."));
        let agent = DiscoveryAgent::new(search, fetcher, RecipeNormalizer::new(provider));

        let err = agent.discover("rome").await.unwrap_err();
        assert!(matches!(err, ChefError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_blank_query() {
        let search = Arc::new(StaticSearch::new(vec![]));
        let agent = DiscoveryAgent::new(
            search.clone(),
            Arc::new(StaticFetcher::new("")),
            RecipeNormalizer::new(Arc::new(StaticProvider::new(REPLY))),
        );

        assert!(matches!(
            agent.discover("   ").await,
            Err(ChefError::EmptyInput)
        ));
        assert!(search.queries().is_empty());
    }
}
