// Page content for generation context: Firecrawl first, native fetch + regex
// extraction when Firecrawl runs out of time.

use std::sync::Arc;
use std::time::Duration;

use firecrawl_client::{FirecrawlClient, Format, ScrapeRequest, ScrapeResponse};
use tracing::info;

use crate::deadline::{race_primary, Deadline, Primary, TimeoutCause};
use crate::error::{AcquireError, Result};
use crate::extract::{extract_page, truncate_chars, MAX_FALLBACK_CHARS};
use crate::providers::{NativeRetriever, PageRetriever, PageScraper};
use crate::types::{validate_url, FetchResult, NormalizedContent, ProvenanceMetadata, Source};

/// Ceiling for the whole primary attempt.
pub const CONTENT_DEADLINE: Duration = Duration::from_secs(45);
/// Ceiling for the fallback retrieval.
pub const FALLBACK_TIMEOUT: Duration = Duration::from_secs(15);

pub struct ContentFetcher {
    scraper: Arc<dyn PageScraper>,
    retriever: Arc<dyn PageRetriever>,
    deadline: Duration,
    fallback_timeout: Duration,
}

impl ContentFetcher {
    pub fn new(scraper: Arc<dyn PageScraper>, retriever: Arc<dyn PageRetriever>) -> Self {
        Self {
            scraper,
            retriever,
            deadline: CONTENT_DEADLINE,
            fallback_timeout: FALLBACK_TIMEOUT,
        }
    }

    /// Production wiring: Firecrawl as primary, a native reqwest fetch as fallback.
    pub fn firecrawl(api_key: &str) -> Result<Self> {
        let client = FirecrawlClient::new(api_key)
            .map_err(|e| AcquireError::Configuration(format!("Failed to build Firecrawl client: {e}")))?;
        let retriever = NativeRetriever::new(FALLBACK_TIMEOUT)?;
        Ok(Self::new(Arc::new(client), Arc::new(retriever)))
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_fallback_timeout(mut self, timeout: Duration) -> Self {
        self.fallback_timeout = timeout;
        self
    }

    /// Fetch normalized content for `url`.
    ///
    /// Makes one primary attempt and at most one fallback attempt, so the
    /// call returns within `deadline + fallback_timeout`.
    pub async fn fetch(&self, url: &str) -> Result<FetchResult> {
        let url = validate_url(url)?;
        info!(url = %url, "Scraping with Firecrawl");

        let request = ScrapeRequest::new(&url, vec![Format::Markdown, Format::Html]);
        let deadline = Deadline::after(self.deadline);

        match race_primary(deadline, &url, self.scraper.scrape(&request)).await? {
            Primary::Delivered(response) => from_primary(url, response),
            Primary::TimedOut(cause) => self.fallback(url, cause).await,
        }
    }

    async fn fallback(&self, url: String, cause: TimeoutCause) -> Result<FetchResult> {
        info!(url = %url, ?cause, "Using fallback scraper");

        let html = Deadline::after(self.fallback_timeout)
            .run(self.retriever.retrieve(&url))
            .await
            .map_err(|expired| AcquireError::Fetch(format!("{url}: {expired}")))??;

        let page = extract_page(&html);
        let mut content = NormalizedContent::new(url, &page.title, &page.description, &page.text);
        // Sanitizing can lengthen the text ("…" becomes "..."), so cap it again.
        content.raw_text = truncate_chars(&content.raw_text, MAX_FALLBACK_CHARS);

        let warning = match cause {
            TimeoutCause::Provider => "Using fallback scraper (Firecrawl timeout)",
            TimeoutCause::Deadline => "Using fallback scraper (request timeout exceeded)",
        };
        let metadata = ProvenanceMetadata::fallback(Source::FallbackNative, warning);

        info!(url = %content.url, chars = content.raw_text.chars().count(), "Fallback scrape complete");
        Ok(FetchResult::content(content, metadata)
            .with_message("URL scraped successfully with fallback scraper"))
    }
}

fn from_primary(url: String, response: ScrapeResponse) -> Result<FetchResult> {
    let data = match response.data {
        Some(data) if response.success => data,
        _ => {
            return Err(AcquireError::Provider {
                message: "Failed to scrape content".to_string(),
                body: response.error,
            })
        }
    };

    let title = data.metadata_str("title").unwrap_or_default();
    let description = data.metadata_str("description").unwrap_or_default();
    let markdown = data.markdown.as_deref().unwrap_or_default();
    let content = NormalizedContent::new(url, title, description, markdown);

    let metadata = ProvenanceMetadata::primary()
        .with_cached(data.cached.unwrap_or(false))
        .with_provider_metadata(data.metadata.clone().unwrap_or_default());

    info!(url = %content.url, chars = content.raw_text.chars().count(), "Firecrawl scrape complete");
    Ok(FetchResult::content(content, metadata).with_message("URL scraped successfully with Firecrawl"))
}
