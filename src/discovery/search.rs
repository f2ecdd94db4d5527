use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ChefError, Result};

/// One candidate page returned by a web search, in provider rank order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "content")]
    pub snippet: String,
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Results in the provider's own ranking, best first
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: u32,
    search_depth: &'static str,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Web search through the Tavily search API
pub struct TavilySearch {
    client: Client,
    api_key: String,
    base_url: String,
    max_results: u32,
}

impl TavilySearch {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, "https://api.tavily.com")
    }

    pub fn with_base_url(
        client: Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_results: 5,
        }
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.max(1);
        self
    }
}

#[async_trait]
impl WebSearch for TavilySearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let endpoint = format!("{}/search", self.base_url);
        debug!("Searching Tavily for '{query}'");

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&TavilyRequest {
                query,
                max_results: self.max_results,
                search_depth: "basic",
            })
            .send()
            .await
            .map_err(|e| ChefError::fetch(&endpoint, e))?;

        if !response.status().is_success() {
            return Err(ChefError::fetch(
                &endpoint,
                format!("search returned {}", response.status()),
            ));
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| ChefError::fetch(&endpoint, e))?;
        debug!("Tavily returned {} results", body.results.len());
        Ok(body.results)
    }
}
