// Elasticsearch SearchIndexClient Implementation

use crate::connection::{create_http_client, SearchClientConfig};
use async_trait::async_trait;
use codeintel_core::error::{AppError, Result};
use codeintel_core::port::SearchIndexClient;
use reqwest::{Method, StatusCode, Url};
use tracing::{debug, warn};

// Helper to convert reqwest::Error to AppError
fn map_reqwest_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::SearchIndex(format!("Search request timed out: {}", err))
    } else if err.is_connect() {
        AppError::SearchIndex(format!("Search cluster unreachable: {}", err))
    } else {
        AppError::SearchIndex(format!("Search request failed: {}", err))
    }
}

/// How a response status should be treated
#[derive(Debug, PartialEq, Eq)]
enum StatusClass {
    Ok,
    Missing,
    Failed,
}

fn classify(status: StatusCode) -> StatusClass {
    if status.is_success() {
        StatusClass::Ok
    } else if status == StatusCode::NOT_FOUND {
        StatusClass::Missing
    } else {
        StatusClass::Failed
    }
}

/// Search index client talking to Elasticsearch over HTTP
pub struct ElasticsearchClient {
    http: reqwest::Client,
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
}

impl ElasticsearchClient {
    pub fn new(config: &SearchClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::Config(format!("Invalid search url '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "Invalid search url '{}'",
                config.base_url
            )));
        }

        Ok(Self {
            http: create_http_client(config)?,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Build `<base>/<seg>/<seg>...`, percent-encoding each segment
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request and return the status with the body text
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<(StatusCode, String)> {
        debug!(method = %method, url = %url, "Search request");

        let mut request = self.http.request(method, url);
        if let Some(user) = &self.username {
            request = request.basic_auth(user, self.password.as_ref());
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;
        Ok((status, text))
    }

    /// Write requests must succeed
    async fn write(&self, method: Method, url: Url, body: serde_json::Value) -> Result<()> {
        let what = url.path().to_string();
        let (status, text) = self.send(method, url, Some(body)).await?;
        match classify(status) {
            StatusClass::Ok => Ok(()),
            _ => Err(AppError::SearchIndex(format!(
                "{} returned {}: {}",
                what, status, text
            ))),
        }
    }

    /// Delete requests succeed when the target is already gone
    async fn delete(&self, url: Url) -> Result<()> {
        let what = url.path().to_string();
        let (status, text) = self.send(Method::DELETE, url, None).await?;
        match classify(status) {
            StatusClass::Ok => Ok(()),
            StatusClass::Missing => {
                debug!(target = %what, "Delete target already absent");
                Ok(())
            }
            StatusClass::Failed => {
                warn!(target = %what, status = %status, "Delete request rejected");
                Err(AppError::SearchIndex(format!(
                    "{} returned {}: {}",
                    what, status, text
                )))
            }
        }
    }
}

#[async_trait]
impl SearchIndexClient for ElasticsearchClient {
    async fn index_document(&self, index: &str, id: &str, body: serde_json::Value) -> Result<()> {
        let mut url = self.url(&[index, "_doc", id]);
        url.query_pairs_mut().append_pair("refresh", "true");
        self.write(Method::PUT, url, body).await
    }

    async fn update_document(&self, index: &str, id: &str, body: serde_json::Value) -> Result<()> {
        let mut url = self.url(&[index, "_update", id]);
        url.query_pairs_mut().append_pair("refresh", "true");
        self.write(Method::POST, url, serde_json::json!({ "doc": body }))
            .await
    }

    async fn delete_document(&self, index: &str, id: &str) -> Result<()> {
        self.delete(self.url(&[index, "_doc", id])).await
    }

    async fn delete_index(&self, name: &str) -> Result<()> {
        let mut url = self.url(&[name]);
        url.query_pairs_mut()
            .append_pair("ignore_unavailable", "true")
            .append_pair("allow_no_indices", "true");
        self.delete(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio_test::{assert_err, assert_ok};

    /// Read headers plus a content-length body so the socket closes cleanly
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            data.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&data).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .filter_map(|l| l.split_once(':'))
                    .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).to_string()
    }

    /// Serve one canned status per connection, recording request lines
    async fn fake_cluster(status_line: &'static str) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_srv = Arc::clone(&seen);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let request = read_request(&mut socket).await;
                if let Some(line) = request.lines().next() {
                    seen_srv.lock().unwrap().push(line.to_string());
                }
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{{}}",
                    status_line
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), seen)
    }

    fn client(base_url: String) -> ElasticsearchClient {
        ElasticsearchClient::new(&SearchClientConfig {
            base_url,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_url() {
        let result = ElasticsearchClient::new(&SearchClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_url_encodes_document_id() {
        let es = client("http://localhost:9200/".to_string());
        let url = es.url(&[
            ".code-document-github.com-elastic-kibana-0123abcd",
            "_doc",
            "repository_delete_status:github.com/elastic/kibana",
        ]);

        assert_eq!(
            url.path(),
            "/.code-document-github.com-elastic-kibana-0123abcd/_doc/repository_delete_status:github.com%2Felastic%2Fkibana"
        );
    }

    #[test]
    fn test_url_keeps_base_path() {
        let es = client("http://proxy.local/es".to_string());
        assert_eq!(es.url(&[".code-symbol-x*"]).path(), "/es/.code-symbol-x*");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(StatusCode::OK), StatusClass::Ok);
        assert_eq!(classify(StatusCode::CREATED), StatusClass::Ok);
        assert_eq!(classify(StatusCode::NOT_FOUND), StatusClass::Missing);
        assert_eq!(classify(StatusCode::FORBIDDEN), StatusClass::Failed);
    }

    #[tokio::test]
    async fn test_delete_missing_index_is_ok() {
        let (url, seen) = fake_cluster("404 Not Found").await;
        let es = client(url);

        assert_ok!(es.delete_index(".code-symbol-github.com-elastic-kibana-0123abcd*").await);

        let lines = seen.lock().unwrap().clone();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("DELETE /.code-symbol-github.com-elastic-kibana-0123abcd*?"));
    }

    #[tokio::test]
    async fn test_delete_index_server_error_fails() {
        let (url, _seen) = fake_cluster("503 Service Unavailable").await;
        let es = client(url);

        let err = assert_err!(es.delete_index(".code-symbol-x*").await);
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_index_document_puts_with_refresh() {
        let (url, seen) = fake_cluster("201 Created").await;
        let es = client(url);

        assert_ok!(
            es.index_document(".code-document-x", "status:a/b", serde_json::json!({"a": 1}))
                .await
        );

        let lines = seen.lock().unwrap().clone();
        assert!(lines[0].starts_with("PUT /.code-document-x/_doc/status:a%2Fb?refresh=true"));
    }

    #[tokio::test]
    async fn test_index_document_missing_index_fails() {
        let (url, _seen) = fake_cluster("404 Not Found").await;
        let es = client(url);

        assert_err!(
            es.index_document(".code-document-x", "id", serde_json::json!({}))
                .await
        );
    }

    #[tokio::test]
    async fn test_update_document_posts_partial_doc() {
        let (url, seen) = fake_cluster("200 OK").await;
        let es = client(url);

        assert_ok!(
            es.update_document(".code-document-x", "repo", serde_json::json!({"a": 1}))
                .await
        );

        let lines = seen.lock().unwrap().clone();
        assert!(lines[0].starts_with("POST /.code-document-x/_update/repo?refresh=true"));
    }

    #[tokio::test]
    async fn test_delete_missing_document_is_ok() {
        let (url, seen) = fake_cluster("404 Not Found").await;
        let es = client(url);

        assert_ok!(es.delete_document(".code-document-x", "repo").await);
        assert!(seen.lock().unwrap()[0].starts_with("DELETE /.code-document-x/_doc/repo "));
    }

    #[tokio::test]
    async fn test_unreachable_cluster() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let es = client(format!("http://{}", addr));
        let err = assert_err!(es.delete_index(".code-symbol-x*").await);
        assert!(matches!(err, AppError::SearchIndex(_)));
    }
}
