//! Path and directory management.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fs::naming::sanitize_path_component;

/// Names that together locate one album on disk.
#[derive(Debug, Clone, Copy)]
pub struct AlbumLocation<'a> {
    pub user_name: &'a str,
    pub dependent_name: &'a str,
    pub section_title: &'a str,
    pub album_title: &'a str,
}

/// Directory an album is materialized into:
/// `<root>/<user>/<dependent>/<section>/<album>`.
pub fn album_dir(root: &Path, location: &AlbumLocation<'_>) -> PathBuf {
    root.join(sanitize_path_component(location.user_name))
        .join(sanitize_path_component(location.dependent_name))
        .join(sanitize_path_component(location.section_title))
        .join(sanitize_path_component(location.album_title))
}

/// Ensure a directory and its ancestors exist. Existing directories are
/// reused as-is.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}
