//! Schoology API module.
//!
//! This module provides:
//! - The [`ResourceClient`] capability the sync engine consumes
//! - HTTP client for the Schoology REST API
//! - OAuth PLAINTEXT request signing
//! - API response types

pub mod auth;
pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use auth::Credentials;
pub use client::{SchoologyApi, API_BASE, DEFAULT_TIMEOUT_SECS};
pub use types::{AlbumSummary, ContentItem, ContentKind, CourseSection, FileAttachment};

/// Read-only access to the remote resource hierarchy.
///
/// Every call is a single request/response with no state kept between calls.
/// Implementations report bad credentials as
/// [`Error::Authentication`](crate::Error::Authentication) and transport
/// failures as [`Error::Network`](crate::Error::Network).
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Id of the user the credentials belong to.
    async fn current_user_id(&self) -> Result<String>;

    async fn display_name(&self, user_id: &str) -> Result<String>;

    /// Ids of the user's dependents, in remote order.
    async fn dependent_ids(&self, user_id: &str) -> Result<Vec<String>>;

    async fn course_sections(&self, user_id: &str) -> Result<Vec<CourseSection>>;

    async fn albums(&self, section_id: &str) -> Result<Vec<AlbumSummary>>;

    async fn album_content(&self, section_id: &str, album_id: &str) -> Result<Vec<ContentItem>>;

    /// Fetch a file's bytes. A non-success HTTP status is reported as
    /// [`Error::Download`](crate::Error::Download).
    async fn download_bytes(&self, url: &str) -> Result<Vec<u8>>;
}
