pub mod error;
pub mod types;

pub use error::{Result, SerperError};
pub use types::{SearchQuery, SerperResponse, SerperResult};

use std::time::Duration;

const BASE_URL: &str = "https://google.serper.dev";

pub struct SerperClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SerperClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

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

    /// Run one Google search through Serper.
    pub async fn search(&self, query: &SearchQuery) -> Result<SerperResponse> {
        tracing::info!(query = %query.q, num = query.num, gl = %query.gl, hl = %query.hl, "Serper search");

        let resp = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("X-API-KEY", &self.api_key)
            .json(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SerperError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let data: SerperResponse = resp.json().await?;
        tracing::info!(
            query = %query.q,
            organic = data.organic.len(),
            news = data.news.len(),
            "Serper search complete"
        );
        Ok(data)
    }
}
