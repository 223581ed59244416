//! Daemon configuration, read from `CODEINTEL_*` environment variables

use anyhow::{Context, Result};
use codeintel_api_rpc::server::DEFAULT_RPC_PORT;
use codeintel_core::application::worker::constants::DEFAULT_RETRY_BASE_DELAY_MS;
use codeintel_core::domain::job::DEFAULT_MAX_ATTEMPTS;
use codeintel_core::domain::repository::DEFAULT_INDEX_PREFIX;
use codeintel_infra_search::DEFAULT_SEARCH_URL;
use std::path::PathBuf;

const DEFAULT_WORKSPACE_PATH: &str = "~/.codeintel/workspace";
const DEFAULT_REPOS_PATH: &str = "~/.codeintel/repos";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub es_url: String,
    pub es_username: Option<String>,
    pub es_password: Option<String>,
    pub index_prefix: String,
    pub workspace_path: PathBuf,
    /// Clones live under this root; deletes never leave it
    pub repos_root: PathBuf,
    pub rpc_port: u16,
    pub max_attempts: u32,
    pub retry_base_delay_ms: i64,
    pub log_format: LogFormat,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests pass a map)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let rpc_port = match get("CODEINTEL_RPC_PORT") {
            Some(v) => v.parse().context("CODEINTEL_RPC_PORT must be a port number")?,
            None => DEFAULT_RPC_PORT,
        };
        let max_attempts = match get("CODEINTEL_MAX_ATTEMPTS") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .context("CODEINTEL_MAX_ATTEMPTS must be a positive integer")?,
            None => DEFAULT_MAX_ATTEMPTS as u32,
        };
        let retry_base_delay_ms = match get("CODEINTEL_RETRY_BASE_DELAY_MS") {
            Some(v) => v
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 0)
                .context("CODEINTEL_RETRY_BASE_DELAY_MS must be a non-negative integer")?,
            None => DEFAULT_RETRY_BASE_DELAY_MS,
        };
        let log_format = match get("CODEINTEL_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            es_url: get("CODEINTEL_ES_URL").unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            es_username: get("CODEINTEL_ES_USERNAME"),
            es_password: get("CODEINTEL_ES_PASSWORD"),
            index_prefix: get("CODEINTEL_INDEX_PREFIX")
                .unwrap_or_else(|| DEFAULT_INDEX_PREFIX.to_string()),
            workspace_path: expand(
                &get("CODEINTEL_WORKSPACE_PATH").unwrap_or_else(|| DEFAULT_WORKSPACE_PATH.to_string()),
            ),
            repos_root: expand(
                &get("CODEINTEL_REPOS_PATH").unwrap_or_else(|| DEFAULT_REPOS_PATH.to_string()),
            ),
            rpc_port,
            max_attempts,
            retry_base_delay_ms,
            log_format,
        })
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<DaemonConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DaemonConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.es_url, "http://localhost:9200");
        assert_eq!(cfg.index_prefix, ".code-");
        assert_eq!(cfg.rpc_port, 9528);
        assert_eq!(cfg.max_attempts, 3);
        assert_eq!(cfg.retry_base_delay_ms, 1000);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(cfg.workspace_path.ends_with(".codeintel/workspace"));
        assert!(!cfg.workspace_path.starts_with("~"));
        assert!(cfg.repos_root.ends_with(".codeintel/repos"));
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("CODEINTEL_ES_URL", "http://es:9200"),
            ("CODEINTEL_INDEX_PREFIX", ".test-code-"),
            ("CODEINTEL_WORKSPACE_PATH", "/srv/ws"),
            ("CODEINTEL_RPC_PORT", "7000"),
            ("CODEINTEL_MAX_ATTEMPTS", "1"),
            ("CODEINTEL_LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(cfg.es_url, "http://es:9200");
        assert_eq!(cfg.index_prefix, ".test-code-");
        assert_eq!(cfg.workspace_path, PathBuf::from("/srv/ws"));
        assert_eq!(cfg.rpc_port, 7000);
        assert_eq!(cfg.max_attempts, 1);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn test_rejects_bad_numbers() {
        assert!(config(&[("CODEINTEL_RPC_PORT", "port")]).is_err());
        assert!(config(&[("CODEINTEL_MAX_ATTEMPTS", "0")]).is_err());
        assert!(config(&[("CODEINTEL_RETRY_BASE_DELAY_MS", "-5")]).is_err());
    }
}
