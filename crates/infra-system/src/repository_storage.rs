// Local filesystem RepositoryStorage implementation

use crate::fs_util::remove_path_if_exists;
use async_trait::async_trait;
use codeintel_core::error::{AppError, Result};
use codeintel_core::port::{RepositoryStorage, RepositoryStorageFactory};
use std::path::{Component, Path, PathBuf};
use tracing::info;

/// Storage service for one clone living at `data_path`
pub struct LocalRepositoryStorage {
    uri: String,
    data_path: PathBuf,
    /// When set, removal is refused for anything outside this directory
    confined_to: Option<PathBuf>,
}

impl LocalRepositoryStorage {
    pub fn new(uri: impl Into<String>, data_path: impl Into<PathBuf>) -> Self {
        Self {
            uri: uri.into(),
            data_path: data_path.into(),
            confined_to: None,
        }
    }

    /// Storage whose removal must stay strictly inside `root`
    pub fn confined(
        uri: impl Into<String>,
        data_path: impl Into<PathBuf>,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            confined_to: Some(root.into()),
            ..Self::new(uri, data_path)
        }
    }

    fn refuse(&self, reason: &str) -> AppError {
        AppError::Storage(format!(
            "refusing to remove '{}' for {}: {}",
            self.data_path.display(),
            self.uri,
            reason
        ))
    }

    fn check_removable(&self) -> Result<()> {
        if self.data_path.as_os_str().is_empty() || self.data_path.parent().is_none() {
            return Err(self.refuse("filesystem root or empty path"));
        }
        if let Some(root) = &self.confined_to {
            if self
                .data_path
                .components()
                .any(|c| matches!(c, Component::ParentDir))
            {
                return Err(self.refuse("path contains '..'"));
            }
            if !is_strictly_inside(&self.data_path, root) {
                return Err(self.refuse("path is outside the repository root"));
            }
        }
        Ok(())
    }
}

fn is_strictly_inside(path: &Path, root: &Path) -> bool {
    path.starts_with(root) && path != root
}

#[async_trait]
impl RepositoryStorage for LocalRepositoryStorage {
    async fn remove(&self) -> Result<()> {
        self.check_removable()?;

        let removed = remove_path_if_exists(&self.data_path).await.map_err(|e| {
            AppError::Storage(format!(
                "failed to remove {} at {}: {}",
                self.uri,
                self.data_path.display(),
                e
            ))
        })?;

        if removed {
            info!(uri = %self.uri, data_path = %self.data_path.display(), "Removed repository clone");
        } else {
            info!(uri = %self.uri, data_path = %self.data_path.display(), "Repository clone already absent");
        }
        Ok(())
    }
}

/// Factory for local clone storage
///
/// With a `repos_root`, relative data paths are resolved against it and
/// removal is refused for `..` segments or anything that ends up outside it.
#[derive(Default)]
pub struct LocalRepositoryStorageFactory {
    repos_root: Option<PathBuf>,
}

impl LocalRepositoryStorageFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repos_root(repos_root: impl Into<PathBuf>) -> Self {
        Self {
            repos_root: Some(repos_root.into()),
        }
    }

}

impl RepositoryStorageFactory for LocalRepositoryStorageFactory {
    fn new_instance(&self, uri: &str, data_path: &str) -> Box<dyn RepositoryStorage> {
        let path = PathBuf::from(data_path);
        match &self.repos_root {
            // An absolute path replaces the root on join and then fails the
            // containment check in `remove`
            Some(root) => Box::new(LocalRepositoryStorage::confined(uri, root.join(path), root)),
            None => Box::new(LocalRepositoryStorage::new(uri, path)),
        }
    }
}
