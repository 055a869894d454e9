//! Authenticated access to the shared-directory API.
//!
//! [`DirectoryFetcher`] builds requests for the listing and download
//! endpoints and hands them to an [`HttpTransport`]. It attaches the bearer
//! token read from its [`CredentialProvider`] at call time but never asks
//! the user for one; callers run [`acquire_token`](crate::acquire_token)
//! first.

use std::rc::Rc;

use async_trait::async_trait;

use crate::credential::CredentialProvider;
use crate::error::FetchError;
use crate::models::{ListingPayload, SharedEntry};

/// Listing endpoint path.
pub const SHARED_DIR_ENDPOINT: &str = "/api/shared-dir";

/// Download endpoint path.
pub const DOWNLOAD_ENDPOINT: &str = "/api/download";

/// Fallback MIME type for downloaded payloads.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Where the API lives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiConfig {
    /// Prefix for endpoint paths; empty for same-origin requests
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// One outgoing GET request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
    /// Full URL including the query string
    pub url: String,
    /// Value of the `Authorization` header
    pub authorization: String,
    /// Whether the transport should apply its listing timeout
    pub timeout: bool,
}

/// A completed response with its body fully read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Header pairs as received (names compared case-insensitively)
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parsed `content-length` header.
    pub fn content_length(&self) -> Option<u64> {
        self.header("content-length")?.trim().parse().ok()
    }

    /// `content-type` header, or `application/octet-stream`.
    pub fn content_type(&self) -> &str {
        self.header("content-type").unwrap_or(OCTET_STREAM)
    }

    /// Body decoded as text (lossy), for error messages.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs one GET request.
///
/// Implementations report network-level failures as [`FetchError`] and
/// return every HTTP status, successful or not, as an [`HttpResponse`].
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn get(&self, request: ApiRequest) -> Result<HttpResponse, FetchError>;
}

#[async_trait(?Send)]
impl<T: HttpTransport + ?Sized> HttpTransport for Rc<T> {
    async fn get(&self, request: ApiRequest) -> Result<HttpResponse, FetchError> {
        (**self).get(request).await
    }
}

/// Issues listing and download requests against the API.
#[derive(Clone)]
pub struct DirectoryFetcher<T, C> {
    transport: T,
    credential: C,
    config: ApiConfig,
}

impl<T, C> DirectoryFetcher<T, C>
where
    T: HttpTransport,
    C: CredentialProvider,
{
    pub fn new(transport: T, credential: C, config: ApiConfig) -> Self {
        Self {
            transport,
            credential,
            config,
        }
    }

    pub fn credential(&self) -> &C {
        &self.credential
    }

    /// Listing URL. `path` is omitted entirely when empty.
    pub fn listing_url(&self, path: &str, root_dir_hash: &str) -> String {
        let mut url = format!(
            "{}{}?root-dir-hash={}",
            self.config.base_url,
            SHARED_DIR_ENDPOINT,
            urlencoding::encode(root_dir_hash)
        );
        if !path.is_empty() {
            url.push_str("&path=");
            url.push_str(&urlencoding::encode(path));
        }
        url
    }

    /// Download URL for the entry at `(path, root_dir_hash)`.
    pub fn download_url(&self, path: &str, root_dir_hash: &str) -> String {
        format!(
            "{}{}?path={}&root-dir-hash={}",
            self.config.base_url,
            DOWNLOAD_ENDPOINT,
            urlencoding::encode(path),
            urlencoding::encode(root_dir_hash)
        )
    }

    fn request(&self, url: String, timeout: bool) -> ApiRequest {
        ApiRequest {
            url,
            authorization: format!("Bearer {}", self.credential.token()),
            timeout,
        }
    }

    /// Top-level shared directories.
    pub async fn list_forest_roots(&self) -> Result<Vec<SharedEntry>, FetchError> {
        let root = self.list_children("", "").await?;
        Ok(root.children.unwrap_or_default())
    }

    /// Descriptor of the directory at `(path, root_dir_hash)`; its
    /// `children` field holds the listing.
    pub async fn list_children(
        &self,
        path: &str,
        root_dir_hash: &str,
    ) -> Result<SharedEntry, FetchError> {
        let request = self.request(self.listing_url(path, root_dir_hash), true);
        log::debug!("GET {}", request.url);

        let response = self.transport.get(request).await?;
        if !response.is_success() {
            let err = FetchError::Http {
                status: response.status,
                body: response.text(),
            };
            if err.is_auth_rejection() {
                log::warn!("Session token rejected while listing '{}'", path);
            }
            return Err(err);
        }

        let payload = serde_json::from_slice::<ListingPayload>(&response.body)
            .map_err(|e| FetchError::JsonParse(e.to_string()))?;
        payload.into_addressed(path, root_dir_hash)
    }

    /// Raw response for the entry's content. The status is not checked;
    /// the caller decides what counts as failure.
    pub async fn fetch_binary(
        &self,
        path: &str,
        root_dir_hash: &str,
    ) -> Result<HttpResponse, FetchError> {
        let request = self.request(self.download_url(path, root_dir_hash), false);
        log::debug!("GET {}", request.url);
        self.transport.get(request).await
    }
}
