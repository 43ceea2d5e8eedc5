use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sitegen_acquire::{CandidateSearcher, Config, ContentFetcher, ScreenshotFetcher};

mod rest;

use rest::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sitegen=info".parse()?))
        .init();

    let config = Config::from_env()?;

    let content = config
        .firecrawl_api_key
        .as_deref()
        .map(ContentFetcher::firecrawl)
        .transpose()?;
    let screenshot = config
        .firecrawl_api_key
        .as_deref()
        .map(ScreenshotFetcher::firecrawl)
        .transpose()?;
    let search = config
        .serper_api_key
        .as_deref()
        .map(CandidateSearcher::serper)
        .transpose()?;

    if content.is_none() {
        warn!("FIRECRAWL_API_KEY not set, scrape routes will answer with a configuration error");
    }
    if search.is_none() {
        warn!("SERPER_API_KEY not set, search route will answer with a configuration error");
    }

    let state = Arc::new(AppState {
        content,
        screenshot,
        search,
    });

    let app = rest::router(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Logging layer: method + path + status + latency only
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }),
        );

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("Sitegen acquisition API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
