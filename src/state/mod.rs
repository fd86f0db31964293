//! Sync state module.
//!
//! Tracks, per principal, which albums have already been downloaded so that
//! re-runs only fetch new albums.

pub mod model;
pub mod store;

pub use model::{AlbumRecord, ChildSummary, CourseSummary, PrincipalRecord, SyncState};
pub use store::{JsonFileStore, MemoryStore, StateStore};
