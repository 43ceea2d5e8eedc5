pub mod error;
pub mod types;

pub use error::{is_scrape_timeout_body, FirecrawlError, Result, SCRAPE_TIMEOUT_CODE};
pub use types::{Action, Format, ScrapeData, ScrapeRequest, ScrapeResponse};

use std::time::Duration;

const BASE_URL: &str = "https://api.firecrawl.dev/v1";

/// Client-side ceiling. Callers race scrapes against their own, shorter deadline.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

pub struct FirecrawlClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FirecrawlClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Scrape a single URL via `POST /scrape`.
    ///
    /// Non-2xx responses become [`FirecrawlError::ScrapeTimeout`] when the body
    /// carries the `SCRAPE_TIMEOUT` code and [`FirecrawlError::Api`] otherwise.
    pub async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse> {
        let endpoint = format!("{}/scrape", self.base_url);
        tracing::debug!(url = %request.url, formats = ?request.formats, "Firecrawl scrape");

        let resp = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FirecrawlError::from_status(status.as_u16(), body));
        }

        let body = resp.text().await?;
        let scraped: ScrapeResponse = serde_json::from_str(&body)?;
        Ok(scraped)
    }
}
