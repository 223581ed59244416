// HTTP Client Setup

use codeintel_core::error::{AppError, Result};
use std::time::Duration;

/// Default Elasticsearch endpoint
pub const DEFAULT_SEARCH_URL: &str = "http://localhost:9200";

/// Connection settings for the search cluster
#[derive(Debug, Clone)]
pub struct SearchClientConfig {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub request_timeout: Duration,
}

impl Default for SearchClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SEARCH_URL.to_string(),
            username: None,
            password: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Create the shared HTTP client used for every search request
pub fn create_http_client(config: &SearchClientConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .connect_timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))
}
