use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AcquireError, Result};
use crate::sanitize::sanitize_quotes;

/// 1×1 transparent PNG returned when no real screenshot can be produced in time.
const PLACEHOLDER_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

// --- Requests ---

/// Body of a content or screenshot fetch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchRequest {
    #[serde(default)]
    pub url: Option<String>,
}

impl FetchRequest {
    /// The requested URL, validated as an absolute http(s) URL.
    pub fn require_url(&self) -> Result<String> {
        validate_url(self.url.as_deref().unwrap_or_default())
    }
}

/// Check that `raw` is a non-empty, absolute `http`/`https` URL.
pub fn validate_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AcquireError::InvalidInput("URL is required".to_string()));
    }
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| AcquireError::InvalidInput(format!("Invalid URL {trimmed:?}: {e}")))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(AcquireError::InvalidInput(format!(
            "Only http/https URLs allowed, got: {}",
            parsed.scheme()
        )));
    }
    Ok(trimmed.to_string())
}

// --- Provenance ---

/// Which code path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Primary,
    FallbackPlaceholder,
    FallbackNative,
}

/// Keys this pipeline owns; provider metadata may not overwrite them.
const RESERVED_METADATA_KEYS: [&str; 5] =
    ["source", "timestamp", "warning", "cached", "contentLength"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceMetadata {
    pub source: Source,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    /// Length of `formatted` in UTF-16 code units, as browsers count string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<usize>,
    /// Page metadata reported by the primary provider (title, status code, ...).
    #[serde(flatten)]
    pub provider: serde_json::Map<String, serde_json::Value>,
}

impl ProvenanceMetadata {
    pub fn primary() -> Self {
        Self::new(Source::Primary, None)
    }

    pub fn fallback(source: Source, warning: impl Into<String>) -> Self {
        Self::new(source, Some(warning.into()))
    }

    fn new(source: Source, warning: Option<String>) -> Self {
        Self {
            source,
            timestamp: Utc::now(),
            warning,
            cached: None,
            content_length: None,
            provider: serde_json::Map::new(),
        }
    }

    pub fn with_cached(mut self, cached: bool) -> Self {
        self.cached = Some(cached);
        self
    }

    pub fn with_content_length(mut self, len: usize) -> Self {
        self.content_length = Some(len);
        self
    }

    /// Merge provider metadata, dropping keys that would shadow provenance.
    pub fn with_provider_metadata(
        mut self,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        self.provider.extend(
            metadata
                .into_iter()
                .filter(|(k, _)| !RESERVED_METADATA_KEYS.contains(&k.as_str())),
        );
        self
    }
}

// --- Payloads ---

/// Page content with every text field normalized to ASCII punctuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedContent {
    pub title: String,
    pub description: String,
    pub raw_text: String,
    pub url: String,
}

impl NormalizedContent {
    pub fn new(url: impl Into<String>, title: &str, description: &str, raw_text: &str) -> Self {
        Self {
            title: sanitize_quotes(title),
            description: sanitize_quotes(description),
            raw_text: sanitize_quotes(raw_text),
            url: url.into(),
        }
    }

    /// The block handed to the generator as page context.
    pub fn formatted(&self) -> String {
        format!(
            "Title: {}\nDescription: {}\nURL: {}\n\nMain Content:\n{}",
            self.title, self.description, self.url, self.raw_text
        )
        .trim()
        .to_string()
    }
}

/// A screenshot: either a provider-hosted image URL or an image data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImagePayload(String);

impl ImagePayload {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn placeholder() -> Self {
        Self(format!("{PNG_DATA_URI_PREFIX}{PLACEHOLDER_PNG_BASE64}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:image/")
    }

    /// Decoded bytes of a base64 image data URI; `None` for anything else.
    pub fn decode_data_uri(&self) -> Option<Vec<u8>> {
        let rest = self.0.strip_prefix("data:image/")?;
        let (_, encoded) = rest.split_once(";base64,")?;
        base64::engine::general_purpose::STANDARD.decode(encoded).ok()
    }
}

// --- Results ---

/// Response envelope shared by the content and screenshot fetchers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub content: Option<NormalizedContent>,
    pub screenshot: Option<ImagePayload>,
    /// Content rendered as generator context; content fetches only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    pub metadata: Option<ProvenanceMetadata>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FetchResult {
    pub fn content(content: NormalizedContent, metadata: ProvenanceMetadata) -> Self {
        let formatted = content.formatted();
        let metadata = metadata.with_content_length(formatted.encode_utf16().count());
        Self {
            success: true,
            url: Some(content.url.clone()),
            content: Some(content),
            screenshot: None,
            formatted: Some(formatted),
            metadata: Some(metadata),
            error: None,
            message: None,
        }
    }

    pub fn screenshot(
        url: impl Into<String>,
        screenshot: ImagePayload,
        metadata: ProvenanceMetadata,
    ) -> Self {
        Self {
            success: true,
            url: Some(url.into()),
            content: None,
            screenshot: Some(screenshot),
            formatted: None,
            metadata: Some(metadata),
            error: None,
            message: None,
        }
    }

    pub fn failure(err: &AcquireError) -> Self {
        Self {
            success: false,
            url: None,
            content: None,
            screenshot: None,
            formatted: None,
            metadata: None,
            error: Some(err.to_string()),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn source(&self) -> Option<Source> {
        self.metadata.as_ref().map(|m| m.source)
    }
}

// --- Search ---

pub const DEFAULT_REGION: &str = "in";
pub const DEFAULT_LANGUAGE: &str = "en";

/// Body of a candidate search: either `q` or `queries` (which wins when non-empty).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub queries: Vec<String>,
    #[serde(default)]
    pub include_keywords: Vec<String>,
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
    #[serde(default)]
    pub gl: Option<String>,
    #[serde(default)]
    pub hl: Option<String>,
}

/// Validated search input. Always holds at least one non-blank query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub queries: Vec<String>,
    pub include_keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
    pub region: String,
    pub language: String,
}

fn non_blank(s: &str) -> bool {
    !s.trim().is_empty()
}

impl SearchParams {
    pub fn new<I, S>(queries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queries: Vec<String> = queries
            .into_iter()
            .map(Into::into)
            .filter(|q: &String| non_blank(q))
            .collect();
        if queries.is_empty() {
            return Err(AcquireError::InvalidInput(
                "q or queries is required".to_string(),
            ));
        }
        Ok(Self {
            queries,
            include_keywords: Vec::new(),
            exclude_keywords: Vec::new(),
            region: DEFAULT_REGION.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        })
    }

    /// Require `keyword` (case-insensitive substring of the URL). Blank keywords are ignored.
    pub fn include(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        if non_blank(&keyword) {
            self.include_keywords.push(keyword);
        }
        self
    }

    /// Reject URLs containing `keyword`. Blank keywords are ignored.
    pub fn exclude(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        if non_blank(&keyword) {
            self.exclude_keywords.push(keyword);
        }
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl TryFrom<SearchRequest> for SearchParams {
    type Error = AcquireError;

    fn try_from(req: SearchRequest) -> Result<Self> {
        let queries = if req.queries.iter().any(|q| non_blank(q)) {
            req.queries
        } else {
            req.q.into_iter().collect()
        };

        let mut params = SearchParams::new(queries)?;
        for keyword in req.include_keywords {
            params = params.include(keyword);
        }
        for keyword in req.exclude_keywords {
            params = params.exclude(keyword);
        }
        if let Some(gl) = req.gl.filter(|s| !s.is_empty()) {
            params = params.with_region(gl);
        }
        if let Some(hl) = req.hl.filter(|s| !s.is_empty()) {
            params = params.with_language(hl);
        }
        Ok(params)
    }
}

/// One URL surfaced by the search provider, tagged with the query that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub url: String,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSelection {
    pub url: Option<String>,
    pub tried: usize,
    pub candidates: Vec<SearchCandidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_url_rejects_missing_and_relative() {
        assert!(matches!(validate_url(""), Err(AcquireError::InvalidInput(_))));
        assert!(matches!(validate_url("   "), Err(AcquireError::InvalidInput(_))));
        assert!(matches!(
            validate_url("/relative/path"),
            Err(AcquireError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_url("ftp://example.com/file"),
            Err(AcquireError::InvalidInput(_))
        ));
        assert_eq!(
            validate_url(" https://example.com/a ").unwrap(),
            "https://example.com/a"
        );
    }

    #[test]
    fn fetch_request_without_url_is_invalid() {
        let req: FetchRequest = serde_json::from_str("{}").unwrap();
        let err = req.require_url().unwrap_err();
        assert_eq!(err.to_string(), "URL is required");
    }

    #[test]
    fn source_serializes_kebab_case() {
        assert_eq!(serde_json::to_value(Source::Primary).unwrap(), "primary");
        assert_eq!(
            serde_json::to_value(Source::FallbackPlaceholder).unwrap(),
            "fallback-placeholder"
        );
        assert_eq!(
            serde_json::to_value(Source::FallbackNative).unwrap(),
            "fallback-native"
        );
    }

    #[test]
    fn provider_metadata_cannot_shadow_provenance() {
        let provider = serde_json::json!({
            "title": "Example",
            "source": "firecrawl",
            "timestamp": "1999-01-01T00:00:00Z",
            "statusCode": 200
        });
        let serde_json::Value::Object(provider) = provider else {
            unreachable!()
        };

        let meta = ProvenanceMetadata::primary()
            .with_cached(true)
            .with_provider_metadata(provider);
        let json = serde_json::to_value(&meta).unwrap();

        assert_eq!(json["source"], "primary");
        assert_ne!(json["timestamp"], "1999-01-01T00:00:00Z");
        assert_eq!(json["title"], "Example");
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["cached"], true);
        assert!(json.get("warning").is_none());
    }

    #[test]
    fn normalized_content_sanitizes_every_text_field() {
        let content = NormalizedContent::new(
            "https://example.com",
            "\u{201C}Title\u{201D}",
            "It\u{2019}s \u{2014} fine",
            "Wait\u{2026}\u{00A0}go",
        );
        assert_eq!(content.title, "\"Title\"");
        assert_eq!(content.description, "It's - fine");
        assert_eq!(content.raw_text, "Wait... go");
    }

    #[test]
    fn formatted_block_layout() {
        let content = NormalizedContent::new("https://a.com", "A", "B", "Body");
        assert_eq!(
            content.formatted(),
            "Title: A\nDescription: B\nURL: https://a.com\n\nMain Content:\nBody"
        );
    }

    #[test]
    fn content_result_records_formatted_length() {
        let content = NormalizedContent::new("https://a.com", "A", "B", "Body");
        let result = FetchResult::content(content, ProvenanceMetadata::primary());
        let len = result.formatted.as_ref().unwrap().encode_utf16().count();
        assert_eq!(result.metadata.unwrap().content_length, Some(len));
    }

    #[test]
    fn content_length_counts_utf16_units() {
        let content = NormalizedContent::new("https://a.com", "A", "B", "\u{1F600}");
        let result = FetchResult::content(content, ProvenanceMetadata::primary());
        let formatted = result.formatted.as_ref().unwrap();

        assert_eq!(
            result.metadata.as_ref().unwrap().content_length,
            Some(formatted.chars().count() + 1)
        );
    }

    #[test]
    fn failure_result_has_no_payload() {
        let result = FetchResult::failure(&AcquireError::Fetch("HTTP 404: Not Found".into()));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["content"].is_null());
        assert!(json["screenshot"].is_null());
        assert_eq!(json["error"], "Fallback fetch failed: HTTP 404: Not Found");
    }

    #[test]
    fn placeholder_is_a_decodable_png() {
        let payload = ImagePayload::placeholder();
        assert!(payload.is_data_uri());
        assert!(payload.as_str().starts_with("data:image/png;base64,"));
        let bytes = payload.decode_data_uri().unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn hosted_screenshot_is_not_a_data_uri() {
        let payload = ImagePayload::new("https://cdn.firecrawl.dev/shot.png");
        assert!(!payload.is_data_uri());
        assert!(payload.decode_data_uri().is_none());
    }

    #[test]
    fn search_params_require_a_non_blank_query() {
        let empty: Vec<String> = Vec::new();
        assert!(matches!(
            SearchParams::new(empty),
            Err(AcquireError::InvalidInput(_))
        ));
        assert!(matches!(
            SearchParams::new(["", "   "]),
            Err(AcquireError::InvalidInput(_))
        ));
    }

    #[test]
    fn search_request_prefers_queries_over_q() {
        let req: SearchRequest = serde_json::from_str(
            r#"{"q": "single", "queries": ["first", " ", "second"], "includeKeywords": ["Shop", ""], "excludeKeywords": ["ads"]}"#,
        )
        .unwrap();
        let params = SearchParams::try_from(req).unwrap();
        assert_eq!(params.queries, vec!["first", "second"]);
        assert_eq!(params.include_keywords, vec!["Shop"]);
        assert_eq!(params.exclude_keywords, vec!["ads"]);
        assert_eq!(params.region, "in");
        assert_eq!(params.language, "en");
    }

    #[test]
    fn search_request_falls_back_to_q() {
        let req: SearchRequest =
            serde_json::from_str(r#"{"q": "only", "queries": [], "gl": "us", "hl": ""}"#).unwrap();
        let params = SearchParams::try_from(req).unwrap();
        assert_eq!(params.queries, vec!["only"]);
        assert_eq!(params.region, "us");
        assert_eq!(params.language, "en");
    }

    #[test]
    fn search_request_without_queries_is_invalid() {
        let req: SearchRequest = serde_json::from_str("{}").unwrap();
        let err = SearchParams::try_from(req).unwrap_err();
        assert_eq!(err.to_string(), "q or queries is required");
    }
}
