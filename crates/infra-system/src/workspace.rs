// Local language-analysis workspace teardown

use crate::fs_util::remove_path_if_exists;
use async_trait::async_trait;
use codeintel_core::domain::RepositoryUri;
use codeintel_core::error::{AppError, Result};
use codeintel_core::port::LanguageService;
use std::path::{Path, PathBuf};
use tracing::info;

/// Language service whose workspaces live under `<workspace_root>/<uri>`
pub struct LocalWorkspaceService {
    workspace_root: PathBuf,
}

impl LocalWorkspaceService {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Directory holding every revision checkout of a repository
    pub fn workspace_dir(&self, uri: &str) -> Result<PathBuf> {
        // Validated uris have no relative segments, so the join stays under the root
        let uri = RepositoryUri::parse(uri)?;
        Ok(self.workspace_root.join(uri.as_str()))
    }
}

#[async_trait]
impl LanguageService for LocalWorkspaceService {
    async fn delete_workspace(&self, uri: &str) -> Result<()> {
        let dir = self.workspace_dir(uri)?;
        let removed = remove_path_if_exists(&dir).await.map_err(|e| {
            AppError::Workspace(format!(
                "failed to delete workspace {}: {}",
                dir.display(),
                e
            ))
        })?;

        info!(uri = %uri, workspace = %dir.display(), removed = removed, "Workspace deleted");
        Ok(())
    }
}
