//! Materialization of one album into local files.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::api::{AlbumSummary, CourseSection, FileAttachment, ResourceClient};
use crate::error::{Error, Result};
use crate::fs::{album_dir, check_attachment_filename, ensure_dir, AlbumLocation};
use crate::output::create_file_bar;
use crate::state::{AlbumRecord, SyncState};
use crate::sync::walker::{Dependent, Principal};

/// An album selected for download, with everything needed to place it.
#[derive(Debug, Clone, Copy)]
pub struct AlbumJob<'a> {
    pub principal: &'a Principal,
    pub dependent: &'a Dependent,
    pub section: &'a CourseSection,
    pub album: &'a AlbumSummary,
}

impl AlbumJob<'_> {
    fn location(&self) -> AlbumLocation<'_> {
        AlbumLocation {
            user_name: &self.principal.name,
            dependent_name: &self.dependent.name,
            section_title: &self.section.title,
            album_title: &self.album.title,
        }
    }
}

/// What happened while materializing one album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumOutcome {
    pub dir: PathBuf,
    pub files_downloaded: u64,
    pub files_failed: u64,
}

/// Downloads album files and latches finished albums in the sync state.
///
/// The album is latched once every file has been requested. Nothing is
/// recorded before that, so an interrupted album is fetched again in full on
/// the next run.
pub struct AlbumMaterializer<'a, R: ResourceClient + ?Sized> {
    client: &'a R,
    photos_root: &'a Path,
    show_progress: bool,
}

impl<'a, R: ResourceClient + ?Sized> AlbumMaterializer<'a, R> {
    pub fn new(client: &'a R, photos_root: &'a Path, show_progress: bool) -> Self {
        Self {
            client,
            photos_root,
            show_progress,
        }
    }

    /// Download every image/video file of the album and latch it under the
    /// dependent.
    ///
    /// Files rejected by the server are logged and counted but do not stop the
    /// album. Network and authentication errors propagate unchanged and leave
    /// the state untouched.
    pub async fn materialize(
        &self,
        state: &mut SyncState,
        job: &AlbumJob<'_>,
    ) -> Result<AlbumOutcome> {
        let dir = album_dir(self.photos_root, &job.location());
        ensure_dir(&dir).await?;

        let content = self
            .client
            .album_content(&job.section.id, &job.album.id)
            .await?;

        let files: Vec<&FileAttachment> = content
            .iter()
            .filter(|item| item.kind.is_media())
            .flat_map(|item| item.attachments.iter())
            .collect();

        tracing::info!(
            "Downloading album {} ({} files) to {}",
            job.album.title,
            files.len(),
            dir.display()
        );

        let mut outcome = AlbumOutcome {
            dir,
            files_downloaded: 0,
            files_failed: 0,
        };

        let progress = create_file_bar(
            files.len() as u64,
            &job.album.title,
            self.show_progress && !files.is_empty(),
        );

        for file in files {
            match self.download_file(file, &outcome.dir).await {
                Ok(path) => {
                    tracing::debug!("Downloaded: {}", path.display());
                    outcome.files_downloaded += 1;
                }
                Err(e @ (Error::Download(_) | Error::InvalidFilename(_))) => {
                    tracing::warn!("Failed to download {}: {}", file.filename, e);
                    outcome.files_failed += 1;
                }
                Err(e) => {
                    progress.abandon();
                    return Err(e);
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        state.record_downloaded(
            &job.dependent.id,
            AlbumRecord {
                id: job.album.id.clone(),
                course_id: job.section.id.clone(),
                title: job.album.title.clone(),
                downloaded_at: Utc::now(),
            },
        )?;

        Ok(outcome)
    }

    /// Fetch one file and write it under `dir`, replacing any existing file of
    /// the same name.
    async fn download_file(&self, file: &FileAttachment, dir: &Path) -> Result<PathBuf> {
        let filename = check_attachment_filename(&file.filename)?;
        let path = dir.join(filename);

        tracing::debug!("Downloading {} to {}", file.url, path.display());
        let bytes = self.client.download_bytes(&file.url).await?;
        tokio::fs::write(&path, bytes).await?;

        Ok(path)
    }
}
