//! Incremental album synchronization.
//!
//! This module provides:
//! - Hierarchy traversal that skips already-downloaded albums
//! - Album materialization into the local photo tree
//! - Run orchestration with a single state save per run

pub mod engine;
pub mod materializer;
pub mod stats;
pub mod walker;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{EngineOptions, SyncEngine};
pub use materializer::{AlbumJob, AlbumMaterializer, AlbumOutcome};
pub use stats::{RunReport, RunStats};
pub use walker::{Dependent, HierarchyWalker, Principal};
