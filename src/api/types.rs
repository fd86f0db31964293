//! API response type definitions.
//!
//! The `*Response`/`*Entry` types mirror Schoology's JSON. The remaining types
//! are what the [`ResourceClient`](crate::api::ResourceClient) hands to the sync
//! engine.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Schoology ids arrive as strings on some endpoints and numbers on others.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Str(String),
    Num(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Str(s) => s,
            RawId::Num(n) => n.to_string(),
        }
    }
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn deserialize_opt_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

/// Decode a nested object, treating any other shape (`[]`, `null`, ...) as absent.
fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// ── Wire types ──

/// `/app-user-info` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AppUserInfo {
    #[serde(deserialize_with = "deserialize_id")]
    pub api_uid: String,
}

/// `/users/{id}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    #[serde(default)]
    pub name_display: String,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub child_uids: Option<String>,
}

impl UserResponse {
    /// Dependent ids in the order the API listed them.
    pub fn child_ids(&self) -> Vec<String> {
        self.child_uids
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Pagination links attached to list responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    pub next: Option<String>,
}

/// A list response that may continue on another page.
pub trait Paged {
    type Item;

    fn into_page(self) -> (Vec<Self::Item>, Option<String>);
}

/// `/users/{id}/sections` response.
#[derive(Debug, Deserialize)]
pub struct SectionsResponse {
    #[serde(default)]
    pub section: Vec<SectionEntry>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub links: Option<Links>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionEntry {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub course_title: String,
}

impl Paged for SectionsResponse {
    type Item = SectionEntry;

    fn into_page(self) -> (Vec<SectionEntry>, Option<String>) {
        (self.section, self.links.and_then(|l| l.next))
    }
}

/// `/sections/{id}/albums` response.
#[derive(Debug, Deserialize)]
pub struct AlbumsResponse {
    #[serde(default)]
    pub album: Vec<AlbumEntry>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub links: Option<Links>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumEntry {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
}

impl Paged for AlbumsResponse {
    type Item = AlbumEntry;

    fn into_page(self) -> (Vec<AlbumEntry>, Option<String>) {
        (self.album, self.links.and_then(|l| l.next))
    }
}

/// `/sections/{sid}/albums/{aid}?withcontent=1` response.
#[derive(Debug, Deserialize)]
pub struct AlbumDetailResponse {
    #[serde(default)]
    pub content: Vec<ContentEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ContentEntry {
    #[serde(rename = "type", default)]
    pub kind: ContentKind,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub attachments: Option<AttachmentsEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AttachmentsEntry {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub files: Option<FileListEntry>,
}

#[derive(Debug, Deserialize)]
pub struct FileListEntry {
    #[serde(default)]
    pub file: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
pub struct FileEntry {
    pub download_path: String,
    pub filename: String,
}

// ── Engine-facing types ──

/// A course section a principal is enrolled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSection {
    pub id: String,
    pub title: String,
}

impl From<SectionEntry> for CourseSection {
    fn from(entry: SectionEntry) -> Self {
        Self {
            id: entry.id,
            title: entry.course_title,
        }
    }
}

/// An album as listed under a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumSummary {
    pub id: String,
    pub title: String,
}

impl From<AlbumEntry> for AlbumSummary {
    fn from(entry: AlbumEntry) -> Self {
        Self {
            id: entry.id,
            title: entry.title,
        }
    }
}

/// Type of an album content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Image,
    Video,
    #[default]
    #[serde(other)]
    Other,
}

impl ContentKind {
    /// Whether items of this kind carry files worth downloading.
    pub fn is_media(&self) -> bool {
        matches!(self, ContentKind::Image | ContentKind::Video)
    }
}

/// A downloadable file attached to a content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub url: String,
    pub filename: String,
}

/// One item of an album's content listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub kind: ContentKind,
    pub attachments: Vec<FileAttachment>,
}

impl From<ContentEntry> for ContentItem {
    fn from(entry: ContentEntry) -> Self {
        let attachments = entry
            .attachments
            .and_then(|a| a.files)
            .map(|files| {
                files
                    .file
                    .into_iter()
                    .map(|f| FileAttachment {
                        url: f.download_path,
                        filename: f.filename,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            kind: entry.kind,
            attachments,
        }
    }
}
