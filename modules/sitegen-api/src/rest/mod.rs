use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tracing::warn;

use sitegen_acquire::config::{FIRECRAWL_API_KEY, SERPER_API_KEY};
use sitegen_acquire::{
    AcquireError, CandidateSearcher, ContentFetcher, FetchRequest, FetchResult, ScreenshotFetcher,
    SearchParams, SearchRequest, SearchSelection,
};

/// Fetchers are `None` when their provider credential is missing.
pub struct AppState {
    pub content: Option<ContentFetcher>,
    pub screenshot: Option<ScreenshotFetcher>,
    pub search: Option<CandidateSearcher>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        .route("/api/scrape-url-enhanced", post(api_scrape_url))
        .route("/api/scrape-screenshot", post(api_scrape_screenshot))
        .route("/api/serper-search", post(api_serper_search))
        .with_state(state)
}

// --- Errors ---

/// A failed request rendered as `{success: false, error}` with a status code.
pub struct ApiError {
    status: StatusCode,
    body: serde_json::Value,
}

impl ApiError {
    /// Content and screenshot routes: only bad input is the caller's fault.
    fn fetch(err: AcquireError) -> Self {
        let status = match err {
            AcquireError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::to_value(FetchResult::failure(&err))
            .unwrap_or_else(|_| serde_json::json!({ "success": false, "error": err.to_string() }));
        Self { status, body }
    }

    /// Search route: a missing credential is also reported as 400.
    fn search(err: AcquireError) -> Self {
        let status = match err {
            AcquireError::InvalidInput(_) | AcquireError::Configuration(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            body: serde_json::json!({ "success": false, "error": err.to_string() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn malformed(rejection: JsonRejection) -> AcquireError {
    AcquireError::InvalidInput(format!("Invalid request body: {}", rejection.body_text()))
}

// --- Handlers ---

pub async fn api_scrape_url(
    State(state): State<Arc<AppState>>,
    body: Result<Json<FetchRequest>, JsonRejection>,
) -> Result<Json<FetchResult>, ApiError> {
    let Json(req) = body.map_err(|r| ApiError::fetch(malformed(r)))?;
    let url = req.require_url().map_err(ApiError::fetch)?;
    let fetcher = state
        .content
        .as_ref()
        .ok_or_else(|| ApiError::fetch(AcquireError::missing_credential(FIRECRAWL_API_KEY)))?;

    match fetcher.fetch(&url).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            warn!(url = %url, error = %e, "Failed to scrape URL");
            Err(ApiError::fetch(e))
        }
    }
}

pub async fn api_scrape_screenshot(
    State(state): State<Arc<AppState>>,
    body: Result<Json<FetchRequest>, JsonRejection>,
) -> Result<Json<FetchResult>, ApiError> {
    let Json(req) = body.map_err(|r| ApiError::fetch(malformed(r)))?;
    let url = req.require_url().map_err(ApiError::fetch)?;
    let fetcher = state
        .screenshot
        .as_ref()
        .ok_or_else(|| ApiError::fetch(AcquireError::missing_credential(FIRECRAWL_API_KEY)))?;

    match fetcher.capture(&url).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            warn!(url = %url, error = %e, "Failed to capture screenshot");
            Err(ApiError::fetch(e))
        }
    }
}

#[derive(Serialize)]
pub struct SearchResponse {
    success: bool,
    #[serde(flatten)]
    selection: SearchSelection,
}

pub async fn api_serper_search(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(req) = body.map_err(|r| ApiError::search(malformed(r)))?;
    let params = SearchParams::try_from(req).map_err(ApiError::search)?;
    let searcher = state
        .search
        .as_ref()
        .ok_or_else(|| ApiError::search(AcquireError::missing_credential(SERPER_API_KEY)))?;

    let selection = searcher.search(&params).await;
    Ok(Json(SearchResponse {
        success: true,
        selection,
    }))
}
