//! Schoology Photos - mirror Schoology section albums to local disk
//!
//! This library walks the albums of every course section of each child linked
//! to a Schoology parent account and downloads their photos and videos.
//!
//! # Features
//!
//! - One-way, resumable sync: albums are remembered once downloaded
//! - Deterministic `photos/<user>/<child>/<course>/<album>/` layout
//! - Whole-run bookkeeping with an atomically replaced JSON state file
//! - Advisory locking so two runs never share a state file
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use schoology_photos::{
//!     Credentials, EngineOptions, JsonFileStore, SchoologyApi, SyncEngine, API_BASE,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = SchoologyApi::new(
//!         Credentials::new("consumer-key", "consumer-secret"),
//!         API_BASE,
//!         Duration::from_secs(5),
//!     )?;
//!     let store = JsonFileStore::open(".config.json")?;
//!     let options = EngineOptions {
//!         photos_root: "photos".into(),
//!         show_progress: true,
//!     };
//!
//!     let report = SyncEngine::new(&api, &store, options).run().await?;
//!     println!("{} new albums", report.stats.albums_downloaded);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod output;
pub mod state;
pub mod sync;

// Re-exports for convenience
pub use api::{Credentials, ResourceClient, SchoologyApi, API_BASE};
pub use config::Config;
pub use error::{Error, Result};
pub use state::{JsonFileStore, MemoryStore, StateStore, SyncState};
pub use sync::{EngineOptions, RunReport, RunStats, SyncEngine};
