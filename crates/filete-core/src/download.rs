//! Turning a download response into a file the user can save.

use std::rc::Rc;

use crate::api::{DirectoryFetcher, HttpTransport};
use crate::credential::{CredentialProvider, TokenPrompt, acquire_token};
use crate::error::{DownloadError, SaveError};
use crate::models::{EntryKind, EntryRef};

/// Platform side of a save: object URLs plus the save trigger.
pub trait ObjectUrlHost {
    /// Wrap `bytes` in an object URL of type `mime`.
    fn create_object_url(&self, bytes: &[u8], mime: &str) -> Result<String, SaveError>;

    /// Offer the object at `url` to the user as `filename`.
    fn trigger_save(&self, url: &str, filename: &str) -> Result<(), SaveError>;

    /// Release an object URL. Must tolerate being called once per URL.
    fn revoke_object_url(&self, url: &str);
}

impl<H: ObjectUrlHost + ?Sized> ObjectUrlHost for Rc<H> {
    fn create_object_url(&self, bytes: &[u8], mime: &str) -> Result<String, SaveError> {
        (**self).create_object_url(bytes, mime)
    }

    fn trigger_save(&self, url: &str, filename: &str) -> Result<(), SaveError> {
        (**self).trigger_save(url, filename)
    }

    fn revoke_object_url(&self, url: &str) {
        (**self).revoke_object_url(url)
    }
}

/// An object URL that is revoked when dropped.
pub struct ObjectUrl<'a, H: ObjectUrlHost + ?Sized> {
    host: &'a H,
    url: String,
}

impl<'a, H: ObjectUrlHost + ?Sized> ObjectUrl<'a, H> {
    pub fn create(host: &'a H, bytes: &[u8], mime: &str) -> Result<Self, SaveError> {
        let url = host.create_object_url(bytes, mime)?;
        Ok(Self { host, url })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl<H: ObjectUrlHost + ?Sized> Drop for ObjectUrl<'_, H> {
    fn drop(&mut self) {
        self.host.revoke_object_url(&self.url);
    }
}

/// A completed save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadReport {
    pub filename: String,
    pub bytes: usize,
}

/// Fetches entries and hands them to the user.
#[derive(Clone)]
pub struct DownloadController<T, C, P, H> {
    fetcher: DirectoryFetcher<T, C>,
    prompt: P,
    host: H,
}

impl<T, C, P, H> DownloadController<T, C, P, H>
where
    T: HttpTransport,
    C: CredentialProvider,
    P: TokenPrompt,
    H: ObjectUrlHost,
{
    pub fn new(fetcher: DirectoryFetcher<T, C>, prompt: P, host: H) -> Self {
        Self {
            fetcher,
            prompt,
            host,
        }
    }

    /// Save a file under its own name.
    pub async fn download(&self, entry: &EntryRef) -> Result<DownloadReport, DownloadError> {
        if entry.kind != EntryKind::File {
            return Err(DownloadError::NotAFile(entry.path.clone()));
        }
        self.fetch_and_save(entry, entry.name.clone()).await
    }

    /// Save a directory as `<name>.zip`.
    pub async fn download_archive(
        &self,
        entry: &EntryRef,
    ) -> Result<DownloadReport, DownloadError> {
        if entry.kind != EntryKind::Directory {
            return Err(DownloadError::NotADirectory(entry.path.clone()));
        }
        self.fetch_and_save(entry, archive_name(&entry.name)).await
    }

    async fn fetch_and_save(
        &self,
        entry: &EntryRef,
        filename: String,
    ) -> Result<DownloadReport, DownloadError> {
        acquire_token(self.fetcher.credential(), &self.prompt).await?;

        let response = self
            .fetcher
            .fetch_binary(&entry.path, &entry.root_dir_hash)
            .await
            .inspect_err(|e| log::error!("Download of '{}' failed: {}", entry.path, e))?;

        if !response.is_success() {
            let body = response.text();
            log::error!(
                "Download of '{}' rejected with status {}: {}",
                entry.path,
                response.status,
                body
            );
            return Err(DownloadError::Rejected {
                status: response.status,
                body,
            });
        }

        match response.content_length() {
            Some(len) => log::info!(
                "Downloading '{}' ({} bytes, {})",
                filename,
                len,
                response.content_type()
            ),
            None => log::info!("Downloading '{}' ({})", filename, response.content_type()),
        }

        let url = ObjectUrl::create(&self.host, &response.body, response.content_type())?;
        self.host
            .trigger_save(url.as_str(), &filename)
            .inspect_err(|e| log::error!("Saving '{}' failed: {}", filename, e))?;

        Ok(DownloadReport {
            filename,
            bytes: response.body.len(),
        })
    }
}

fn archive_name(name: &str) -> String {
    if name.is_empty() {
        "download.zip".to_string()
    } else {
        format!("{name}.zip")
    }
}
