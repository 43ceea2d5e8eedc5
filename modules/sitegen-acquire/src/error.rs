use firecrawl_client::FirecrawlError;

/// Result type alias for acquisition operations.
pub type Result<T> = std::result::Result<T, AcquireError>;

/// Failures surfaced to callers. Provider timeouts never appear here: they are
/// recovered by substituting a fallback result.
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    /// Bad or missing request fields.
    #[error("{0}")]
    InvalidInput(String),

    /// A provider credential is not configured.
    #[error("{0}")]
    Configuration(String),

    /// The primary provider failed for a reason other than running out of time.
    #[error("{message}")]
    Provider {
        message: String,
        body: Option<String>,
    },

    /// The fallback retrieval itself failed. Terminal.
    #[error("Fallback fetch failed: {0}")]
    Fetch(String),
}

impl AcquireError {
    pub fn missing_credential(var: &str) -> Self {
        AcquireError::Configuration(format!("{var} environment variable is not set"))
    }

    pub fn provider(message: impl Into<String>) -> Self {
        AcquireError::Provider {
            message: message.into(),
            body: None,
        }
    }

    /// Raw provider error body, when one was returned.
    pub fn provider_body(&self) -> Option<&str> {
        match self {
            AcquireError::Provider { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}

impl From<FirecrawlError> for AcquireError {
    fn from(err: FirecrawlError) -> Self {
        let body = err.body().map(str::to_string);
        let message = match &body {
            Some(raw) => format!("Firecrawl API error: {raw}"),
            None => format!("Firecrawl API error: {err}"),
        };
        AcquireError::Provider { message, body }
    }
}
