//! In-memory [`ResourceClient`] for engine tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{AlbumSummary, ContentItem, ContentKind, CourseSection, FileAttachment, ResourceClient};
use crate::error::{Error, Result};

/// Failure to inject into a call.
#[derive(Debug, Clone, Copy)]
pub enum FailWith {
    Network,
    Auth,
}

impl FailWith {
    fn error(self) -> Error {
        match self {
            FailWith::Network => Error::Network("connection reset by peer".into()),
            FailWith::Auth => Error::Authentication("HTTP 401 Unauthorized".into()),
        }
    }
}

#[derive(Default)]
struct FakeUser {
    name: String,
    children: Vec<String>,
    sections: Vec<CourseSection>,
}

/// Scriptable remote hierarchy that records every call it receives.
#[derive(Default)]
pub struct FakeRemote {
    user_id: String,
    users: HashMap<String, FakeUser>,
    albums: HashMap<String, Vec<AlbumSummary>>,
    content: HashMap<(String, String), Vec<ContentItem>>,
    files: HashMap<String, Vec<u8>>,
    content_failures: HashMap<String, FailWith>,
    download_failures: HashMap<String, FailWith>,
    auth_failure: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeRemote {
    pub fn new(user_id: &str, user_name: &str) -> Self {
        let mut remote = Self {
            user_id: user_id.to_string(),
            ..Default::default()
        };
        remote.users.insert(
            user_id.to_string(),
            FakeUser {
                name: user_name.to_string(),
                ..Default::default()
            },
        );
        remote
    }

    /// User `U1` with dependent `C1` enrolled in `S1` "Algebra", holding album
    /// `A1` "Midterm" with a single image `1.jpg`.
    pub fn scenario() -> Self {
        Self::new("U1", "U1")
            .dependent("C1", "C1")
            .section("C1", "S1", "Algebra")
            .album("S1", "A1", "Midterm")
            .content("S1", "A1", ContentKind::Image, &[("http://x/1.jpg", "1.jpg")])
            .file("http://x/1.jpg", b"jpeg-bytes")
    }

    pub fn dependent(mut self, id: &str, name: &str) -> Self {
        let user_id = self.user_id.clone();
        self.users
            .entry(user_id)
            .or_default()
            .children
            .push(id.to_string());
        self.users.insert(
            id.to_string(),
            FakeUser {
                name: name.to_string(),
                ..Default::default()
            },
        );
        self
    }

    pub fn section(mut self, user_id: &str, section_id: &str, title: &str) -> Self {
        self.users
            .entry(user_id.to_string())
            .or_default()
            .sections
            .push(CourseSection {
                id: section_id.to_string(),
                title: title.to_string(),
            });
        self
    }

    pub fn album(mut self, section_id: &str, album_id: &str, title: &str) -> Self {
        self.albums
            .entry(section_id.to_string())
            .or_default()
            .push(AlbumSummary {
                id: album_id.to_string(),
                title: title.to_string(),
            });
        self
    }

    pub fn content(
        mut self,
        section_id: &str,
        album_id: &str,
        kind: ContentKind,
        files: &[(&str, &str)],
    ) -> Self {
        self.content
            .entry((section_id.to_string(), album_id.to_string()))
            .or_default()
            .push(ContentItem {
                kind,
                attachments: files
                    .iter()
                    .map(|(url, filename)| FileAttachment {
                        url: url.to_string(),
                        filename: filename.to_string(),
                    })
                    .collect(),
            });
        self
    }

    pub fn file(mut self, url: &str, bytes: &[u8]) -> Self {
        self.files.insert(url.to_string(), bytes.to_vec());
        self
    }

    pub fn fail_content(mut self, album_id: &str, failure: FailWith) -> Self {
        self.content_failures.insert(album_id.to_string(), failure);
        self
    }

    pub fn fail_download(mut self, url: &str, failure: FailWith) -> Self {
        self.download_failures.insert(url.to_string(), failure);
        self
    }

    pub fn fail_auth(mut self) -> Self {
        self.auth_failure = true;
        self
    }

    /// Every call received so far, as `operation:argument` strings.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls whose operation is `op`.
    pub fn count(&self, op: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(':').next() == Some(op))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn log(&self, op: &str, arg: &str) {
        self.calls.lock().unwrap().push(format!("{}:{}", op, arg));
    }

    fn user(&self, id: &str) -> Result<&FakeUser> {
        self.users
            .get(id)
            .ok_or_else(|| Error::Api(format!("Failed to get user: HTTP 404 - {}", id)))
    }
}

#[async_trait]
impl ResourceClient for FakeRemote {
    async fn current_user_id(&self) -> Result<String> {
        self.log("me", "");
        if self.auth_failure {
            return Err(FailWith::Auth.error());
        }
        Ok(self.user_id.clone())
    }

    async fn display_name(&self, user_id: &str) -> Result<String> {
        self.log("name", user_id);
        Ok(self.user(user_id)?.name.clone())
    }

    async fn dependent_ids(&self, user_id: &str) -> Result<Vec<String>> {
        self.log("children", user_id);
        Ok(self.user(user_id)?.children.clone())
    }

    async fn course_sections(&self, user_id: &str) -> Result<Vec<CourseSection>> {
        self.log("sections", user_id);
        Ok(self.user(user_id)?.sections.clone())
    }

    async fn albums(&self, section_id: &str) -> Result<Vec<AlbumSummary>> {
        self.log("albums", section_id);
        Ok(self.albums.get(section_id).cloned().unwrap_or_default())
    }

    async fn album_content(&self, section_id: &str, album_id: &str) -> Result<Vec<ContentItem>> {
        self.log("content", &format!("{}/{}", section_id, album_id));
        if let Some(failure) = self.content_failures.get(album_id) {
            return Err(failure.error());
        }
        Ok(self
            .content
            .get(&(section_id.to_string(), album_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn download_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.log("download", url);
        if let Some(failure) = self.download_failures.get(url) {
            return Err(failure.error());
        }
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Download("Failed to download file: HTTP 404 Not Found".into()))
    }
}
