use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

use crate::error::{ChefError, Result};

/// Retrieves the HTML of a page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (compatible; ChefDigitalBot/1.0)")
            .build()
            .map_err(|e| ChefError::Builder(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for RequestFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ChefError::fetch(url, e))?;

        if !response.status().is_success() {
            return Err(ChefError::fetch(url, format!("status {}", response.status())));
        }

        let html = response.text().await.map_err(|e| ChefError::fetch(url, e))?;
        debug!("Fetched {} bytes from {}", html.len(), url);
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_fetch_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/recipe")
            .match_header(
                "user-agent",
                "Mozilla/5.0 (compatible; ChefDigitalBot/1.0)",
            )
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body><p>Soup</p></body></html>")
            .create_async()
            .await;

        let fetcher = RequestFetcher::new(None).unwrap();
        let html = fetcher
            .fetch(&format!("{}/recipe", server.url()))
            .await
            .unwrap();

        assert!(html.contains("Soup"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = RequestFetcher::new(Some(Duration::from_secs(5))).unwrap();
        let url = format!("{}/gone", server.url());
        match fetcher.fetch(&url).await {
            Err(ChefError::Fetch { url: failed, reason }) => {
                assert_eq!(failed, url);
                assert!(reason.contains("404"));
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
    }
}
