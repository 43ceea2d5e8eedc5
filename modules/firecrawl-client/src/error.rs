use thiserror::Error;

pub type Result<T> = std::result::Result<T, FirecrawlError>;

/// Error code Firecrawl reports when a scrape exceeds its own time budget.
pub const SCRAPE_TIMEOUT_CODE: &str = "SCRAPE_TIMEOUT";

#[derive(Debug, Error)]
pub enum FirecrawlError {
    #[error("Network error: {0}")]
    Network(String),

    /// The HTTP request to Firecrawl itself timed out client-side.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Firecrawl answered with a `SCRAPE_TIMEOUT` error code.
    #[error("Scrape timed out: {message}")]
    ScrapeTimeout { message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl FirecrawlError {
    /// Build the error for a non-2xx response, classifying timeout bodies.
    pub fn from_status(status: u16, body: String) -> Self {
        if is_scrape_timeout_body(&body) {
            FirecrawlError::ScrapeTimeout { message: body }
        } else {
            FirecrawlError::Api {
                status,
                message: body,
            }
        }
    }

    /// True for errors that mean "the provider ran out of time", as opposed
    /// to errors that mean the provider is broken.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            FirecrawlError::Timeout(_) | FirecrawlError::ScrapeTimeout { .. }
        )
    }

    /// Raw provider response body, when the provider sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            FirecrawlError::Api { message, .. } | FirecrawlError::ScrapeTimeout { message } => {
                Some(message)
            }
            _ => None,
        }
    }
}

/// Firecrawl puts the code either at the top level (`{"code": ...}`) or
/// nested under `error` (`{"error": {"code": ...}}`). Non-JSON bodies never match.
pub fn is_scrape_timeout_body(body: &str) -> bool {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return false;
    };
    let top_level = value.get("code").and_then(|c| c.as_str());
    let nested = value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_str());
    top_level == Some(SCRAPE_TIMEOUT_CODE) || nested == Some(SCRAPE_TIMEOUT_CODE)
}

impl From<reqwest::Error> for FirecrawlError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FirecrawlError::Timeout(err.to_string())
        } else if err.is_decode() {
            FirecrawlError::Parse(err.to_string())
        } else {
            FirecrawlError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FirecrawlError {
    fn from(err: serde_json::Error) -> Self {
        FirecrawlError::Parse(err.to_string())
    }
}
