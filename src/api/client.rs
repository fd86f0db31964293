//! Schoology API HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, ClientBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::auth::{fresh_authorization_header, Credentials};
use crate::api::types::*;
use crate::api::ResourceClient;
use crate::error::{Error, Result};

/// Schoology API base URL.
pub const API_BASE: &str = "https://api.schoology.com/v1";

/// Connect and read-idle timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Upper bound on pages followed for a single listing.
const MAX_PAGES: usize = 1000;

/// Schoology API client. Credentials are supplied by the caller and every
/// request is signed with a fresh nonce and timestamp.
pub struct SchoologyApi {
    client: Client,
    credentials: Credentials,
    base: Url,
}

impl SchoologyApi {
    /// Create a new API client.
    ///
    /// `timeout` bounds connecting and each wait for data, not the whole
    /// transfer, so a large file keeps downloading while bytes arrive.
    pub fn new(credentials: Credentials, api_base: &str, timeout: Duration) -> Result<Self> {
        Self::with_builder(credentials, api_base, client_builder(timeout))
    }

    fn with_builder(
        credentials: Credentials,
        api_base: &str,
        builder: ClientBuilder,
    ) -> Result<Self> {
        let client = builder
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials,
            base: normalize_base(api_base)?,
        })
    }

    /// Resolve an API path (or an absolute `links.next` URL) against the base.
    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    /// Make an authenticated GET request.
    async fn get(&self, url: Url) -> Result<Response> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(
                header::AUTHORIZATION,
                fresh_authorization_header(&self.credentials),
            )
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Auth error response: {}", body);
            return Err(Error::Authentication(format!(
                "HTTP {}: {}",
                status,
                if body.is_empty() {
                    "Authentication failed"
                } else {
                    &body
                }
            )));
        }

        Ok(response)
    }

    /// GET a JSON document and decode it.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        let response = self.get(url).await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!("{} response: {}", what, text);

        if !status.is_success() {
            return Err(Error::Api(format!(
                "Failed to get {}: HTTP {} - {}",
                what, status, text
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse {}: {} - Response: {}",
                what,
                e,
                text.chars().take(500).collect::<String>()
            ))
        })
    }

    /// GET a paginated listing, following `links.next` until exhausted.
    async fn get_all<P>(&self, path: &str, what: &str) -> Result<Vec<P::Item>>
    where
        P: Paged + DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut url = self.endpoint(path)?;

        for _ in 0..MAX_PAGES {
            let page: P = self.get_json(url, what).await?;
            let (mut page_items, next) = page.into_page();
            let last_page = page_items.is_empty();
            items.append(&mut page_items);

            match next {
                Some(next) if !last_page => url = self.endpoint(&next)?,
                _ => return Ok(items),
            }
        }

        tracing::warn!("Stopped following {} pages after {}", what, MAX_PAGES);
        Ok(items)
    }

    async fn get_user(&self, user_id: &str) -> Result<UserResponse> {
        let url = self.endpoint(&format!("users/{}", user_id))?;
        self.get_json(url, "user").await
    }
}

#[async_trait]
impl ResourceClient for SchoologyApi {
    async fn current_user_id(&self) -> Result<String> {
        let url = self.endpoint("app-user-info")?;
        let info: AppUserInfo = self.get_json(url, "app user info").await?;
        Ok(info.api_uid)
    }

    async fn display_name(&self, user_id: &str) -> Result<String> {
        Ok(self.get_user(user_id).await?.name_display)
    }

    async fn dependent_ids(&self, user_id: &str) -> Result<Vec<String>> {
        Ok(self.get_user(user_id).await?.child_ids())
    }

    async fn course_sections(&self, user_id: &str) -> Result<Vec<CourseSection>> {
        let sections = self
            .get_all::<SectionsResponse>(&format!("users/{}/sections", user_id), "sections")
            .await?;
        Ok(sections.into_iter().map(CourseSection::from).collect())
    }

    async fn albums(&self, section_id: &str) -> Result<Vec<AlbumSummary>> {
        let albums = self
            .get_all::<AlbumsResponse>(&format!("sections/{}/albums", section_id), "albums")
            .await?;
        Ok(albums.into_iter().map(AlbumSummary::from).collect())
    }

    async fn album_content(&self, section_id: &str, album_id: &str) -> Result<Vec<ContentItem>> {
        let url = self.endpoint(&format!(
            "sections/{}/albums/{}?withcontent=1",
            section_id, album_id
        ))?;
        let detail: AlbumDetailResponse = self.get_json(url, "album contents").await?;
        Ok(detail.content.into_iter().map(ContentItem::from).collect())
    }

    async fn download_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(Url::parse(url)?).await?;

        if !response.status().is_success() {
            return Err(Error::Download(format!(
                "Failed to download file: HTTP {}",
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

fn client_builder(timeout: Duration) -> ClientBuilder {
    Client::builder()
        .connect_timeout(timeout)
        .read_timeout(timeout)
}

/// Parse the base URL, making sure it ends in `/` so relative joins append.
fn normalize_base(api_base: &str) -> Result<Url> {
    let trimmed = api_base.trim_end_matches('/');
    Ok(Url::parse(&format!("{}/", trimmed))?)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio_test::assert_ok;

    use super::*;

    /// A canned reply from [`TestServer`].
    struct Reply {
        status: u16,
        body: Vec<u8>,
        /// Pause before each body byte; `None` sends the body at once.
        drip: Option<Duration>,
    }

    impl Reply {
        fn json(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.as_bytes().to_vec(),
                drip: None,
            }
        }

        fn dripping(body: &[u8], pause: Duration) -> Self {
            Self {
                status: 200,
                body: body.to_vec(),
                drip: Some(pause),
            }
        }
    }

    /// Request target and `Authorization` header of one received request.
    type Seen = Arc<Mutex<Vec<(String, Option<String>)>>>;

    /// Local HTTP/1.1 server answering canned replies by request target.
    /// Unknown targets get a 404.
    struct TestServer {
        listener: TcpListener,
        origin: String,
    }

    impl TestServer {
        async fn bind() -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let origin = format!("http://{}", listener.local_addr().unwrap());
            Self { listener, origin }
        }

        /// API base under this server.
        fn base(&self) -> String {
            format!("{}/v1", self.origin)
        }

        fn serve(self, routes: Vec<(String, Reply)>) -> Seen {
            let routes: Arc<HashMap<String, Reply>> = Arc::new(routes.into_iter().collect());
            let seen: Seen = Arc::default();
            let log = seen.clone();

            tokio::spawn(async move {
                while let Ok((mut socket, _)) = self.listener.accept().await {
                    let routes = routes.clone();
                    let log = log.clone();
                    tokio::spawn(async move {
                        let mut head = Vec::new();
                        let mut chunk = [0u8; 1024];
                        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => head.extend_from_slice(&chunk[..n]),
                            }
                        }
                        let head = String::from_utf8_lossy(&head).to_string();
                        let target = head.split_whitespace().nth(1).unwrap_or("").to_string();
                        let auth = head.lines().find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("authorization")
                                .then(|| value.trim().to_string())
                        });
                        log.lock().unwrap().push((target.clone(), auth));

                        let not_found = Reply::json(404, "not found");
                        let reply = routes.get(&target).unwrap_or(&not_found);
                        let status_line = format!(
                            "HTTP/1.1 {} Test\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            reply.status,
                            reply.body.len()
                        );
                        if socket.write_all(status_line.as_bytes()).await.is_err() {
                            return;
                        }
                        match reply.drip {
                            None => {
                                let _ = socket.write_all(&reply.body).await;
                            }
                            Some(pause) => {
                                for byte in &reply.body {
                                    tokio::time::sleep(pause).await;
                                    if socket.write_all(&[*byte]).await.is_err() {
                                        return;
                                    }
                                }
                            }
                        }
                        let _ = socket.shutdown().await;
                    });
                }
            });

            seen
        }
    }

    /// Client for a local server. Proxies from the environment are ignored.
    fn local_api(base: &str, timeout: Duration) -> SchoologyApi {
        SchoologyApi::with_builder(
            Credentials::new("key123", "secret456"),
            base,
            client_builder(timeout).no_proxy(),
        )
        .unwrap()
    }

    fn targets(seen: &Seen) -> Vec<String> {
        seen.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }

    fn test_api(base: &str) -> SchoologyApi {
        SchoologyApi::new(
            Credentials::new("key", "secret"),
            base,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_base_adds_slash() {
        assert_eq!(
            normalize_base("https://api.schoology.com/v1").unwrap().as_str(),
            "https://api.schoology.com/v1/"
        );
        assert_eq!(
            normalize_base("https://api.schoology.com/v1//").unwrap().as_str(),
            "https://api.schoology.com/v1/"
        );
    }

    #[test]
    fn test_normalize_base_rejects_garbage() {
        assert!(matches!(
            normalize_base("not a url"),
            Err(Error::UrlParse(_))
        ));
    }

    #[test]
    fn test_endpoint_paths() {
        let api = test_api(API_BASE);
        assert_eq!(
            api.endpoint("users/42/sections").unwrap().as_str(),
            "https://api.schoology.com/v1/users/42/sections"
        );
        assert_eq!(
            api.endpoint("sections/7/albums/9?withcontent=1")
                .unwrap()
                .as_str(),
            "https://api.schoology.com/v1/sections/7/albums/9?withcontent=1"
        );
    }

    #[test]
    fn test_endpoint_follows_absolute_next_link() {
        let api = test_api(API_BASE);
        let next = "https://api.schoology.com/v1/sections/7/albums?start=20&limit=20";
        assert_eq!(api.endpoint(next).unwrap().as_str(), next);
    }

    #[tokio::test]
    async fn test_unauthorized_is_authentication_error() {
        let server = TestServer::bind().await;
        let base = server.base();
        server.serve(vec![
            ("/v1/app-user-info".into(), Reply::json(401, "invalid consumer key")),
            ("/v1/users/7".into(), Reply::json(403, "")),
        ]);
        let api = local_api(&base, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        match api.current_user_id().await {
            Err(Error::Authentication(msg)) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("invalid consumer key"));
            }
            other => panic!("expected authentication error, got {:?}", other),
        }
        assert!(matches!(
            api.display_name("7").await,
            Err(Error::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_other_metadata_failures_are_api_errors() {
        let server = TestServer::bind().await;
        let base = server.base();
        server.serve(vec![
            ("/v1/users/7".into(), Reply::json(500, "boom")),
            ("/v1/users/8".into(), Reply::json(200, "<html>maintenance</html>")),
        ]);
        let api = local_api(&base, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        assert!(matches!(api.display_name("7").await, Err(Error::Api(_))));
        assert!(matches!(api.display_name("8").await, Err(Error::Api(_))));
        assert!(matches!(api.albums("missing").await, Err(Error::Api(_))));
    }

    #[tokio::test]
    async fn test_file_status_failure_is_download_error() {
        let server = TestServer::bind().await;
        let base = server.base();
        let origin = server.origin.clone();
        server.serve(vec![
            ("/files/1.jpg".into(), Reply::json(200, "jpeg-bytes")),
            ("/files/gone.jpg".into(), Reply::json(410, "gone")),
        ]);
        let api = local_api(&base, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let bytes = assert_ok!(api.download_bytes(&format!("{}/files/1.jpg", origin)).await);
        assert_eq!(bytes, b"jpeg-bytes");
        assert!(matches!(
            api.download_bytes(&format!("{}/files/gone.jpg", origin)).await,
            Err(Error::Download(_))
        ));
        assert!(matches!(
            api.download_bytes(&format!("{}/files/unknown.jpg", origin)).await,
            Err(Error::Download(_))
        ));
    }

    #[tokio::test]
    async fn test_pagination_follows_next_links_in_order() {
        let server = TestServer::bind().await;
        let base = server.base();
        let page = |items: &str, next: &str| {
            Reply::json(
                200,
                &format!(
                    r#"{{"album":[{}],"links":{{"next":"{}/sections/S1/albums?start={}"}}}}"#,
                    items, base, next
                ),
            )
        };
        let seen = server.serve(vec![
            (
                "/v1/sections/S1/albums".into(),
                page(r#"{"id":3,"title":"Three"},{"id":"1","title":"One"}"#, "2"),
            ),
            (
                "/v1/sections/S1/albums?start=2".into(),
                page(r#"{"id":"2","title":"Two"}"#, "3"),
            ),
            ("/v1/sections/S1/albums?start=3".into(), page("", "4")),
        ]);
        let api = local_api(&base, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let albums = api.albums("S1").await.unwrap();

        let ids: Vec<_> = albums.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
        assert_eq!(albums[0].title, "Three");
        // The empty page ends the listing even though it links onward.
        assert_eq!(
            targets(&seen),
            vec![
                "/v1/sections/S1/albums",
                "/v1/sections/S1/albums?start=2",
                "/v1/sections/S1/albums?start=3",
            ]
        );
    }

    #[tokio::test]
    async fn test_listing_without_next_link_is_one_page() {
        let server = TestServer::bind().await;
        let base = server.base();
        let seen = server.serve(vec![(
            "/v1/users/C1/sections".into(),
            Reply::json(
                200,
                r#"{"section":[{"id":"S1","course_title":"Algebra"}],"links":[]}"#,
            ),
        )]);
        let api = local_api(&base, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let sections = api.course_sections("C1").await.unwrap();

        assert_eq!(
            sections,
            vec![CourseSection {
                id: "S1".into(),
                title: "Algebra".into(),
            }]
        );
        assert_eq!(targets(&seen).len(), 1);
    }

    #[tokio::test]
    async fn test_every_request_is_signed_with_fresh_nonce() {
        let server = TestServer::bind().await;
        let base = server.base();
        let seen = server.serve(vec![(
            "/v1/users/U1".into(),
            Reply::json(200, r#"{"name_display":"Pat","child_uids":"C1, C2"}"#),
        )]);
        let api = local_api(&base, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        assert_eq!(api.display_name("U1").await.unwrap(), "Pat");
        assert_eq!(api.dependent_ids("U1").await.unwrap(), vec!["C1", "C2"]);

        let headers: Vec<String> = seen
            .lock()
            .unwrap()
            .iter()
            .map(|(_, auth)| auth.clone().unwrap_or_default())
            .collect();
        assert_eq!(headers.len(), 2);
        for h in &headers {
            assert!(h.starts_with(r#"OAuth realm="Schoology%20API""#));
            assert!(h.contains(r#"oauth_consumer_key="key123""#));
            assert!(h.contains(r#"oauth_signature="secret456&""#));
        }
        assert_ne!(headers[0], headers[1]);
    }

    #[tokio::test]
    async fn test_album_content_request() {
        let server = TestServer::bind().await;
        let base = server.base();
        let seen = server.serve(vec![(
            "/v1/sections/S1/albums/A1?withcontent=1".into(),
            Reply::json(
                200,
                r#"{"content":[{"type":"image","attachments":{"files":{"file":[
                    {"download_path":"https://files/1.jpg","filename":"1.jpg"}]}}}]}"#,
            ),
        )]);
        let api = local_api(&base, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let content = api.album_content("S1", "A1").await.unwrap();

        assert_eq!(content.len(), 1);
        assert_eq!(content[0].kind, ContentKind::Image);
        assert_eq!(content[0].attachments[0].filename, "1.jpg");
        assert_eq!(targets(&seen), vec!["/v1/sections/S1/albums/A1?withcontent=1"]);
    }

    #[tokio::test]
    async fn test_slow_download_completes_while_bytes_arrive() {
        let server = TestServer::bind().await;
        let base = server.base();
        let origin = server.origin.clone();
        server.serve(vec![(
            "/files/clip.mp4".into(),
            Reply::dripping(b"abcdef", Duration::from_millis(300)),
        )]);
        // The transfer takes well over a second in total.
        let api = local_api(&base, Duration::from_secs(1));

        let bytes = api
            .download_bytes(&format!("{}/files/clip.mp4", origin))
            .await
            .unwrap();
        assert_eq!(bytes, b"abcdef");
    }

    #[tokio::test]
    async fn test_stalled_download_times_out() {
        let server = TestServer::bind().await;
        let base = server.base();
        let origin = server.origin.clone();
        server.serve(vec![(
            "/files/stuck.mp4".into(),
            Reply::dripping(b"ab", Duration::from_secs(3)),
        )]);
        let api = local_api(&base, Duration::from_millis(200));

        assert!(matches!(
            api.download_bytes(&format!("{}/files/stuck.mp4", origin)).await,
            Err(Error::Network(_))
        ));
    }
}
