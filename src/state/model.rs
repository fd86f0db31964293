//! Persisted sync state model.
//!
//! The JSON layout is:
//!
//! ```text
//! { "users": [ { "id", "name",
//!                "downloaded_albums": [ { "id", "course_id", "title", "downloaded_at" } ],
//!                "children": [ { "id", "name", "courses": [ { "id", "title" } ] } ],
//!                "last_updated" } ] }
//! ```
//!
//! Timestamps are Unix seconds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::CourseSection;
use crate::error::{Error, Result};

/// An album that has been fully materialized for a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub id: String,
    /// Section the album was found in.
    pub course_id: String,
    pub title: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub downloaded_at: DateTime<Utc>,
}

/// A course a dependent was enrolled in during the last run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: String,
    pub title: String,
}

impl From<&CourseSection> for CourseSummary {
    fn from(section: &CourseSection) -> Self {
        Self {
            id: section.id.clone(),
            title: section.title.clone(),
        }
    }
}

/// Per-dependent course snapshot, rebuilt on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub courses: Vec<CourseSummary>,
}

/// A tracked principal: the authenticated user or one of their dependents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub downloaded_albums: Vec<AlbumRecord>,
    #[serde(default)]
    pub children: Vec<ChildSummary>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<DateTime<Utc>>,
}

impl PrincipalRecord {
    /// A fresh record with nothing downloaded.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            downloaded_albums: Vec::new(),
            children: Vec::new(),
            last_updated: None,
        }
    }

    pub fn has_album(&self, album_id: &str) -> bool {
        self.downloaded_albums.iter().any(|a| a.id == album_id)
    }
}

/// Everything persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    #[serde(default)]
    pub users: Vec<PrincipalRecord>,
}

impl SyncState {
    /// Look up a principal by remote id.
    pub fn principal(&self, id: &str) -> Option<&PrincipalRecord> {
        self.users.iter().find(|u| u.id == id)
    }

    fn principal_mut(&mut self, id: &str) -> Option<&mut PrincipalRecord> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    /// True iff the album is latched under that principal.
    pub fn is_downloaded(&self, principal_id: &str, album_id: &str) -> bool {
        self.principal(principal_id)
            .is_some_and(|p| p.has_album(album_id))
    }

    /// Latch an album under a principal.
    ///
    /// Fails with [`Error::DuplicateAlbum`] if the album is already latched;
    /// the walker never offers such an album, so hitting this is a bug.
    pub fn record_downloaded(&mut self, principal_id: &str, record: AlbumRecord) -> Result<()> {
        let principal = self
            .principal_mut(principal_id)
            .ok_or_else(|| Error::State(format!("Unknown principal {}", principal_id)))?;

        if principal.has_album(&record.id) {
            return Err(Error::DuplicateAlbum {
                principal_id: principal_id.to_string(),
                album_id: record.id,
            });
        }

        principal.downloaded_albums.push(record);
        Ok(())
    }

    /// Insert a principal if no record with its id exists yet.
    ///
    /// Returns true when a new record was inserted.
    pub fn ensure_principal(&mut self, id: &str, name: &str) -> bool {
        if self.principal(id).is_some() {
            return false;
        }
        self.users.push(PrincipalRecord::new(id, name));
        true
    }

    /// Insert a principal, or refresh `children`/`last_updated` of an existing
    /// one while keeping its downloaded albums.
    pub fn upsert_principal(&mut self, principal: PrincipalRecord) {
        match self.principal_mut(&principal.id) {
            Some(existing) => {
                existing.children = principal.children;
                existing.last_updated = principal.last_updated;
            }
            None => self.users.push(principal),
        }
    }

    /// Total number of latched albums across all principals.
    pub fn album_count(&self) -> usize {
        self.users.iter().map(|u| u.downloaded_albums.len()).sum()
    }
}
