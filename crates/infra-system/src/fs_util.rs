// Filesystem helpers shared by the local adapters

use std::io::ErrorKind;
use std::path::Path;

/// Remove a directory tree (or a stray file) if present
///
/// Returns `false` when nothing was there.
pub(crate) async fn remove_path_if_exists(path: &Path) -> std::io::Result<bool> {
    let meta = match tokio::fs::symlink_metadata(path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    let removed = if meta.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };

    match removed {
        Ok(()) => Ok(true),
        // Raced with another remover
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
