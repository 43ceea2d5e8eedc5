use std::sync::Arc;
use std::time::Duration;

use firecrawl_client::{FirecrawlClient, Format, ScrapeRequest, ScrapeResponse};
use tracing::{info, warn};

use crate::deadline::{race_primary, Deadline, Primary, TimeoutCause};
use crate::error::{AcquireError, Result};
use crate::providers::PageScraper;
use crate::types::{validate_url, FetchResult, ImagePayload, ProvenanceMetadata, Source};

/// Ceiling for the screenshot attempt.
pub const SCREENSHOT_DEADLINE: Duration = Duration::from_secs(45);

/// Captures page screenshots. A placeholder image stands in only when the
/// provider runs out of time; real provider failures still surface.
pub struct ScreenshotFetcher {
    scraper: Arc<dyn PageScraper>,
    deadline: Duration,
}

impl ScreenshotFetcher {
    pub fn new(scraper: Arc<dyn PageScraper>) -> Self {
        Self {
            scraper,
            deadline: SCREENSHOT_DEADLINE,
        }
    }

    pub fn firecrawl(api_key: &str) -> Result<Self> {
        let client = FirecrawlClient::new(api_key)
            .map_err(|e| AcquireError::Configuration(format!("Failed to build Firecrawl client: {e}")))?;
        Ok(Self::new(Arc::new(client)))
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn capture(&self, url: &str) -> Result<FetchResult> {
        let url = validate_url(url)?;
        info!(url = %url, "Attempting to capture screenshot");

        let request = ScrapeRequest::new(&url, vec![Format::Screenshot]);
        let deadline = Deadline::after(self.deadline);

        match race_primary(deadline, &url, self.scraper.scrape(&request)).await? {
            Primary::Delivered(response) => from_primary(url, response),
            Primary::TimedOut(cause) => Ok(placeholder(url, cause)),
        }
    }
}

fn from_primary(url: String, response: ScrapeResponse) -> Result<FetchResult> {
    let data = match response.data {
        Some(data) if response.success => data,
        _ => {
            return Err(AcquireError::Provider {
                message: "Failed to capture screenshot".to_string(),
                body: response.error,
            })
        }
    };
    let Some(screenshot) = data.screenshot.filter(|s| !s.is_empty()) else {
        return Err(AcquireError::provider("Failed to capture screenshot"));
    };

    let metadata = ProvenanceMetadata::primary()
        .with_provider_metadata(data.metadata.unwrap_or_default());

    info!(url = %url, "Screenshot captured");
    Ok(FetchResult::screenshot(url, ImagePayload::new(screenshot), metadata))
}

fn placeholder(url: String, cause: TimeoutCause) -> FetchResult {
    let warning = match cause {
        TimeoutCause::Provider => "Using placeholder screenshot due to Firecrawl timeout",
        TimeoutCause::Deadline => "Using placeholder screenshot due to timeout",
    };
    warn!(url = %url, ?cause, "Using fallback placeholder screenshot");

    let metadata = ProvenanceMetadata::fallback(Source::FallbackPlaceholder, warning);
    FetchResult::screenshot(url, ImagePayload::placeholder(), metadata)
}
