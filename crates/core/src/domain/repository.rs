// Repository identity and derived index names

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Maximum accepted length of a repository uri (bytes)
pub const MAX_URI_LEN: usize = 255;

/// Default prefix shared by every index derived from a repository
pub const DEFAULT_INDEX_PREFIX: &str = ".code-";

/// Field name of the delete status record inside the document index
pub const DELETE_STATUS_FIELD: &str = "repository_delete_status";

/// Repository identifier such as `github.com/elastic/kibana`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryUri(String);

impl RepositoryUri {
    /// Parse and validate a repository uri
    ///
    /// Accepts `host/org/name` style identifiers. Rejects anything that could
    /// escape a directory when joined onto a workspace root.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let uri = raw.into();
        let invalid = |reason: &str| DomainError::InvalidRepositoryUri {
            uri: uri.clone(),
            reason: reason.to_string(),
        };

        if uri.is_empty() {
            return Err(invalid("uri cannot be empty"));
        }
        if uri.len() > MAX_URI_LEN {
            return Err(invalid("uri too long"));
        }
        if uri.starts_with('/') || uri.ends_with('/') {
            return Err(invalid("uri cannot start or end with '/'"));
        }
        if uri.chars().any(|c| c.is_whitespace() || c == '\\') {
            return Err(invalid("uri cannot contain whitespace or '\\'"));
        }

        let segments: Vec<&str> = uri.split('/').collect();
        if segments.len() < 2 {
            return Err(invalid("uri needs at least two segments"));
        }
        if segments
            .iter()
            .any(|s| s.is_empty() || *s == "." || *s == "..")
        {
            return Err(invalid("uri contains an empty or relative segment"));
        }

        Ok(Self(uri))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RepositoryUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a clone location before it is handed to the storage service
pub fn validate_data_path(data_path: &str) -> Result<()> {
    let trimmed = data_path.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidDataPath(data_path.to_string()));
    }
    // Refuse filesystem roots: `/`, `C:\` and friends have no parent
    if Path::new(trimmed).parent().is_none() {
        return Err(DomainError::InvalidDataPath(data_path.to_string()));
    }
    Ok(())
}

/// Turn a repository uri into a lowercase index-safe name
///
/// `github.com/Elastic/Kibana` -> `github.com-elastic-kibana-<8 hex of sha256>`.
/// The hash keeps uris that only differ by case distinct.
pub fn normalize_repo_uri(uri: &str) -> String {
    let digest = Sha256::digest(uri.as_bytes());
    let hash = hex::encode(digest);
    let mut segs: Vec<&str> = uri.split('/').collect();
    segs.push(&hash[..8]);
    segs.join("-").to_lowercase()
}

/// Names of the search indices that hold data derived from one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryIndexNames {
    prefix: String,
    normalized: String,
}

impl RepositoryIndexNames {
    pub fn new(prefix: impl Into<String>, uri: &str) -> Self {
        Self {
            prefix: prefix.into(),
            normalized: normalize_repo_uri(uri),
        }
    }

    /// Document index: file contents plus the repository and status records
    pub fn document(&self) -> String {
        format!("{}document-{}", self.prefix, self.normalized)
    }

    pub fn symbol(&self) -> String {
        format!("{}symbol-{}", self.prefix, self.normalized)
    }

    pub fn reference(&self) -> String {
        format!("{}reference-{}", self.prefix, self.normalized)
    }

    /// Index patterns removed when a repository is deleted, in deletion order
    ///
    /// The wildcard also catches versioned indices behind each alias. The
    /// document index goes last since it holds the delete status record.
    pub fn deletion_patterns(&self) -> [String; 3] {
        [
            format!("{}*", self.symbol()),
            format!("{}*", self.reference()),
            format!("{}*", self.document()),
        ]
    }
}

/// Id of the delete status record for a repository
pub fn delete_status_id(uri: &str) -> String {
    format!("{}:{}", DELETE_STATUS_FIELD, uri)
}
