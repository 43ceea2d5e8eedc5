use std::env;

use crate::error::{AcquireError, Result};

pub const FIRECRAWL_API_KEY: &str = "FIRECRAWL_API_KEY";
pub const SERPER_API_KEY: &str = "SERPER_API_KEY";

/// Process configuration loaded from environment variables.
///
/// Provider keys are optional at boot: a missing key disables the matching
/// operation, which then answers with a configuration error per request.
#[derive(Debug, Clone)]
pub struct Config {
    pub firecrawl_api_key: Option<String>,
    pub serper_api_key: Option<String>,
    pub api_host: String,
    pub api_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_port = match optional("API_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| AcquireError::Configuration(format!("API_PORT must be a number, got {raw:?}")))?,
            None => 3000,
        };

        Ok(Self {
            firecrawl_api_key: optional(FIRECRAWL_API_KEY),
            serper_api_key: optional(SERPER_API_KEY),
            api_host: optional("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            api_port,
        })
    }
}
