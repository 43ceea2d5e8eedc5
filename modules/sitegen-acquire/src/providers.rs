// Seams between the pipeline and the outside world. Production impls wrap the
// Firecrawl/Serper clients and a plain reqwest client; tests swap in fakes.

use std::time::Duration;

use async_trait::async_trait;
use firecrawl_client::{FirecrawlClient, ScrapeRequest, ScrapeResponse};
use serper_client::{SearchQuery, SerperClient, SerperResponse};
use tracing::debug;

use crate::error::{AcquireError, Result};

/// Browser-like agent so the fallback fetch is served normal markup.
const FALLBACK_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Primary scraping provider (content and screenshots).
#[async_trait]
pub trait PageScraper: Send + Sync {
    async fn scrape(&self, request: &ScrapeRequest) -> firecrawl_client::Result<ScrapeResponse>;
}

#[async_trait]
impl PageScraper for FirecrawlClient {
    async fn scrape(&self, request: &ScrapeRequest) -> firecrawl_client::Result<ScrapeResponse> {
        FirecrawlClient::scrape(self, request).await
    }
}

/// Primary search provider.
#[async_trait]
pub trait WebSearcher: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> serper_client::Result<SerperResponse>;
}

#[async_trait]
impl WebSearcher for SerperClient {
    async fn search(&self, query: &SearchQuery) -> serper_client::Result<SerperResponse> {
        SerperClient::search(self, query).await
    }
}

/// Unauthenticated raw-HTML retrieval used by the content fallback.
#[async_trait]
pub trait PageRetriever: Send + Sync {
    async fn retrieve(&self, url: &str) -> Result<String>;
}

pub struct NativeRetriever {
    client: reqwest::Client,
}

impl NativeRetriever {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(FALLBACK_USER_AGENT)
            .build()
            .map_err(|e| AcquireError::Configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageRetriever for NativeRetriever {
    async fn retrieve(&self, url: &str) -> Result<String> {
        debug!(url, "Native fetch");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AcquireError::Fetch(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AcquireError::Fetch(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )));
        }

        resp.text()
            .await
            .map_err(|e| AcquireError::Fetch(e.to_string()))
    }
}
