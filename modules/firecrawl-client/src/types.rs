use serde::{Deserialize, Serialize};

/// Output formats a scrape can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Format {
    Markdown,
    Html,
    Screenshot,
}

/// Browser actions performed before capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    Wait { milliseconds: u64 },
}

/// Body of `POST /v1/scrape`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub url: String,
    pub formats: Vec<Format>,
    /// Milliseconds to wait for dynamic content before capture.
    pub wait_for: u64,
    /// Provider-side budget in milliseconds.
    pub timeout: u64,
    pub block_ads: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

impl ScrapeRequest {
    /// A request with the defaults used for generation context: 2s pre-wait,
    /// 20s provider budget, ads blocked, one extra 1s settle wait.
    pub fn new(url: impl Into<String>, formats: Vec<Format>) -> Self {
        Self {
            url: url.into(),
            formats,
            wait_for: 2_000,
            timeout: 20_000,
            block_ads: true,
            actions: vec![Action::Wait {
                milliseconds: 1_000,
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<ScrapeData>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeData {
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    /// Screenshot URL or data URI, present when `Format::Screenshot` was requested.
    #[serde(default)]
    pub screenshot: Option<String>,
    /// Whether Firecrawl served this from its own cache.
    #[serde(default)]
    pub cached: Option<bool>,
}

impl ScrapeData {
    /// A string field from the page metadata (`title`, `description`, ...).
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key)?.as_str()
    }
}
