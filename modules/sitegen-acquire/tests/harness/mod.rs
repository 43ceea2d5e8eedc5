//! Fake providers for integration tests.
//!
//! Each fake counts its calls so tests can assert which path ran, and can be
//! told to hang forever so deadlines fire (pair with `start_paused = true`).

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use firecrawl_client::{FirecrawlError, ScrapeRequest, ScrapeResponse};
use serper_client::{SearchQuery, SerperError, SerperResponse};
use sitegen_acquire::{AcquireError, PageRetriever, PageScraper, WebSearcher};

// ---------------------------------------------------------------------------
// Scraper
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum ScrapeBehavior {
    Respond(ScrapeResponse),
    ScrapeTimeout,
    ApiError { status: u16, body: String },
    Hang,
}

pub struct FakeScraper {
    behavior: ScrapeBehavior,
    calls: AtomicUsize,
    requests: Mutex<Vec<ScrapeRequest>>,
}

impl FakeScraper {
    pub fn new(behavior: ScrapeBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ScrapeRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PageScraper for FakeScraper {
    async fn scrape(&self, request: &ScrapeRequest) -> firecrawl_client::Result<ScrapeResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        match &self.behavior {
            ScrapeBehavior::Respond(resp) => Ok(resp.clone()),
            ScrapeBehavior::ScrapeTimeout => Err(FirecrawlError::from_status(
                408,
                r#"{"success":false,"error":{"code":"SCRAPE_TIMEOUT","message":"Scrape timed out"}}"#
                    .to_string(),
            )),
            ScrapeBehavior::ApiError { status, body } => {
                Err(FirecrawlError::from_status(*status, body.clone()))
            }
            ScrapeBehavior::Hang => std::future::pending().await,
        }
    }
}

/// A successful Firecrawl response carrying markdown and page metadata.
pub fn scrape_ok(markdown: &str, metadata: serde_json::Value) -> ScrapeResponse {
    serde_json::from_value(serde_json::json!({
        "success": true,
        "data": { "markdown": markdown, "html": "<p>ignored</p>", "metadata": metadata }
    }))
    .unwrap()
}

/// A successful Firecrawl response carrying a screenshot.
pub fn screenshot_ok(screenshot: &str, metadata: serde_json::Value) -> ScrapeResponse {
    serde_json::from_value(serde_json::json!({
        "success": true,
        "data": { "screenshot": screenshot, "metadata": metadata }
    }))
    .unwrap()
}

// ---------------------------------------------------------------------------
// Fallback retriever
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum RetrieveBehavior {
    Html(String),
    Fail(String),
    Hang,
}

pub struct FakeRetriever {
    behavior: RetrieveBehavior,
    calls: AtomicUsize,
}

impl FakeRetriever {
    pub fn new(behavior: RetrieveBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn html(html: &str) -> Self {
        Self::new(RetrieveBehavior::Html(html.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageRetriever for FakeRetriever {
    async fn retrieve(&self, _url: &str) -> sitegen_acquire::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            RetrieveBehavior::Html(html) => Ok(html.clone()),
            RetrieveBehavior::Fail(msg) => Err(AcquireError::Fetch(msg.clone())),
            RetrieveBehavior::Hang => std::future::pending().await,
        }
    }
}

// ---------------------------------------------------------------------------
// Searcher
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum SearchBehavior {
    Respond(SerperResponse),
    Fail,
    Hang,
}

/// Answers per query string; queries without a scripted answer get an empty response.
pub struct FakeSearcher {
    answers: HashMap<String, SearchBehavior>,
    issued: Mutex<Vec<SearchQuery>>,
}

impl FakeSearcher {
    pub fn new() -> Self {
        Self {
            answers: HashMap::new(),
            issued: Mutex::new(Vec::new()),
        }
    }

    pub fn on(mut self, query: &str, behavior: SearchBehavior) -> Self {
        self.answers.insert(query.to_string(), behavior);
        self
    }

    pub fn issued(&self) -> Vec<SearchQuery> {
        self.issued.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearcher for FakeSearcher {
    async fn search(&self, query: &SearchQuery) -> serper_client::Result<SerperResponse> {
        self.issued.lock().unwrap().push(query.clone());
        match self.answers.get(&query.q) {
            Some(SearchBehavior::Respond(resp)) => Ok(resp.clone()),
            Some(SearchBehavior::Fail) => Err(SerperError::Api {
                status: 403,
                message: "Unauthorized".to_string(),
            }),
            Some(SearchBehavior::Hang) => std::future::pending().await,
            None => Ok(SerperResponse::default()),
        }
    }
}

/// Build a Serper response from organic, news and answer-box links.
pub fn serper(organic: &[&str], news: &[&str], answer_box: Option<&str>) -> SearchBehavior {
    let organic: Vec<_> = organic.iter().map(|l| serde_json::json!({ "link": l })).collect();
    let news: Vec<_> = news.iter().map(|l| serde_json::json!({ "link": l })).collect();
    let mut body = serde_json::json!({ "organic": organic, "news": news });
    if let Some(link) = answer_box {
        body["answerBox"] = serde_json::json!({ "link": link });
    }
    SearchBehavior::Respond(serde_json::from_value(body).unwrap())
}
