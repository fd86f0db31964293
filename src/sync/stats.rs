//! Per-run statistics.

use crate::sync::materializer::AlbumOutcome;

/// Counters collected over one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub dependents: u64,
    pub sections: u64,
    pub empty_sections: u64,
    pub albums_skipped: u64,
    pub albums_downloaded: u64,
    pub files_downloaded: u64,
    pub files_failed: u64,
}

impl RunStats {
    /// Add the outcome of one materialized album.
    pub fn add_album(&mut self, outcome: &AlbumOutcome) {
        self.albums_downloaded += 1;
        self.files_downloaded += outcome.files_downloaded;
        self.files_failed += outcome.files_failed;
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub user_id: String,
    pub user_name: String,
    pub stats: RunStats,
}
