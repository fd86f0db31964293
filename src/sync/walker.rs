//! Traversal of the remote hierarchy: user → dependents → sections → albums.

use crate::api::{AlbumSummary, CourseSection, ResourceClient};
use crate::error::Result;
use crate::state::SyncState;
use crate::sync::stats::RunStats;

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub name: String,
}

/// A dependent and the course sections it is enrolled in, in remote order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependent {
    pub id: String,
    pub name: String,
    pub sections: Vec<CourseSection>,
}

/// Walks the remote hierarchy and decides which albums still need
/// downloading. Remote ordering is preserved at every level.
pub struct HierarchyWalker<'a, R: ResourceClient + ?Sized> {
    client: &'a R,
}

impl<'a, R: ResourceClient + ?Sized> HierarchyWalker<'a, R> {
    pub fn new(client: &'a R) -> Self {
        Self { client }
    }

    /// Resolve the authenticated user and make sure it is tracked.
    ///
    /// Identity is the remote id; a tracked user keeps its stored record.
    pub async fn resolve_principal(&self, state: &mut SyncState) -> Result<Principal> {
        let id = self.client.current_user_id().await?;
        let name = self.client.display_name(&id).await?;
        tracing::info!("User name: {}", name);

        if state.ensure_principal(&id, &name) {
            tracing::info!("Tracking new user {} ({})", name, id);
        }

        Ok(Principal { id, name })
    }

    pub async fn dependent_ids(&self, principal: &Principal) -> Result<Vec<String>> {
        let ids = self.client.dependent_ids(&principal.id).await?;
        tracing::debug!("{} has {} dependent(s)", principal.name, ids.len());
        Ok(ids)
    }

    /// Fetch a dependent's name and sections, tracking it if new.
    pub async fn visit_dependent(
        &self,
        state: &mut SyncState,
        dependent_id: &str,
    ) -> Result<Dependent> {
        let name = self.client.display_name(dependent_id).await?;
        tracing::info!("Child name: {}", name);

        state.ensure_principal(dependent_id, &name);

        let sections = self.client.course_sections(dependent_id).await?;
        tracing::debug!("{} is enrolled in {} section(s)", name, sections.len());

        Ok(Dependent {
            id: dependent_id.to_string(),
            name,
            sections,
        })
    }

    /// Albums of `section` not yet downloaded for `dependent`.
    ///
    /// Albums latched under the authenticated user (where earlier versions
    /// recorded them) also count as downloaded.
    pub async fn pending_albums(
        &self,
        state: &SyncState,
        principal: &Principal,
        dependent: &Dependent,
        section: &CourseSection,
        stats: &mut RunStats,
    ) -> Result<Vec<AlbumSummary>> {
        let albums = self.client.albums(&section.id).await?;

        if albums.is_empty() {
            tracing::warn!(
                "No albums found for child: {} in section {}",
                dependent.name,
                section.title
            );
            stats.empty_sections += 1;
            return Ok(Vec::new());
        }

        let mut pending = Vec::with_capacity(albums.len());
        for album in albums {
            if state.is_downloaded(&dependent.id, &album.id)
                || state.is_downloaded(&principal.id, &album.id)
            {
                tracing::info!("Album {} already downloaded, skipping", album.title);
                stats.albums_skipped += 1;
                continue;
            }
            pending.push(album);
        }

        Ok(pending)
    }
}
