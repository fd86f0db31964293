//! Run orchestration.

use std::path::PathBuf;

use chrono::Utc;

use crate::api::ResourceClient;
use crate::error::Result;
use crate::state::{ChildSummary, CourseSummary, PrincipalRecord, StateStore};
use crate::sync::materializer::{AlbumJob, AlbumMaterializer};
use crate::sync::stats::{RunReport, RunStats};
use crate::sync::walker::HierarchyWalker;

/// Engine settings.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Root of the local photo tree.
    pub photos_root: PathBuf,
    /// Show per-album progress bars.
    pub show_progress: bool,
}

/// Runs one full synchronization.
///
/// State is loaded once, mutated in memory, and saved once after the whole
/// hierarchy has been processed. Any error returns before the save, so a
/// failed run leaves the persisted state as it was (files already written
/// stay on disk and are fetched again next time).
pub struct SyncEngine<'a, R: ResourceClient + ?Sized, S: StateStore + ?Sized> {
    client: &'a R,
    store: &'a S,
    options: EngineOptions,
}

impl<'a, R: ResourceClient + ?Sized, S: StateStore + ?Sized> SyncEngine<'a, R, S> {
    pub fn new(client: &'a R, store: &'a S, options: EngineOptions) -> Self {
        Self {
            client,
            store,
            options,
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let mut state = self.store.load().await?;
        let walker = HierarchyWalker::new(self.client);
        let materializer =
            AlbumMaterializer::new(self.client, &self.options.photos_root, self.options.show_progress);
        let mut stats = RunStats::default();

        let principal = walker.resolve_principal(&mut state).await?;
        let dependent_ids = walker.dependent_ids(&principal).await?;
        if dependent_ids.is_empty() {
            tracing::info!("No dependents found for {}", principal.name);
        }

        let mut children = Vec::with_capacity(dependent_ids.len());
        let mut visited = Vec::with_capacity(dependent_ids.len());

        for dependent_id in &dependent_ids {
            let dependent = walker.visit_dependent(&mut state, dependent_id).await?;
            stats.dependents += 1;

            let mut summary = ChildSummary {
                id: dependent.id.clone(),
                name: dependent.name.clone(),
                courses: Vec::with_capacity(dependent.sections.len()),
            };

            for section in &dependent.sections {
                stats.sections += 1;
                summary.courses.push(CourseSummary::from(section));

                let pending = walker
                    .pending_albums(&state, &principal, &dependent, section, &mut stats)
                    .await?;

                for album in &pending {
                    // A listing can repeat an album; the first copy latches it.
                    if state.is_downloaded(&dependent.id, &album.id) {
                        tracing::info!("Album {} already downloaded, skipping", album.title);
                        stats.albums_skipped += 1;
                        continue;
                    }

                    let job = AlbumJob {
                        principal: &principal,
                        dependent: &dependent,
                        section,
                        album,
                    };
                    let outcome = materializer.materialize(&mut state, &job).await?;
                    stats.add_album(&outcome);
                }
            }

            children.push(summary);
            visited.push(PrincipalRecord::new(dependent.id, dependent.name));
        }

        let now = Utc::now();
        for mut record in visited {
            record.last_updated = Some(now);
            state.upsert_principal(record);
        }

        let mut owner = PrincipalRecord::new(principal.id.clone(), principal.name.clone());
        owner.children = children;
        owner.last_updated = Some(now);
        state.upsert_principal(owner);

        self.store.save(&state).await?;

        Ok(RunReport {
            user_id: principal.id,
            user_name: principal.name,
            stats,
        })
    }
}
