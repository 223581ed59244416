// Codeintel Infrastructure - Search Index Adapter
// Implements: SearchIndexClient over the Elasticsearch REST API

mod connection;
mod search_client;

pub use connection::{create_http_client, SearchClientConfig, DEFAULT_SEARCH_URL};
pub use search_client::ElasticsearchClient;

// Note: reqwest::Error conversion is handled by helper functions in
// search_client (orphan rules forbid From<reqwest::Error> for AppError here)
