use std::path::PathBuf;

use {
    async_trait::async_trait,
    crossrelay_common::MediaKind,
    serde::Serialize,
};

use crate::Result;

/// Where a media reference can be read from once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchLocation {
    Url(String),
    Path(PathBuf),
}

/// A file re-uploaded to a destination, ready to be attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub kind: MediaKind,
    /// Destination-specific handle (file id, attachment URL...).
    pub handle: String,
    pub file_name: Option<String>,
}

impl Attachment {
    #[must_use]
    pub fn new(kind: MediaKind, handle: impl Into<String>) -> Self {
        Self {
            kind,
            handle: handle.into(),
            file_name: None,
        }
    }
}

/// Media capability a destination network client provides.
///
/// Errors are classified by the resolver (see [`crate::Error::is_too_large`]);
/// implementations should return [`crate::Error::TooLarge`] when they know a
/// size limit was hit.
#[async_trait]
pub trait MediaSink: Send + Sync {
    /// Turn an opaque locator into something the upload calls can read.
    async fn fetch_location(&self, locator: &str) -> Result<FetchLocation>;

    async fn upload_image(&self, location: &FetchLocation) -> Result<Attachment>;
    async fn upload_video(&self, location: &FetchLocation) -> Result<Attachment>;
    async fn upload_audio(&self, location: &FetchLocation) -> Result<Attachment>;
    async fn upload_file(&self, location: &FetchLocation) -> Result<Attachment>;

    /// Upload through the operation matching `kind`.
    async fn upload(&self, kind: MediaKind, location: &FetchLocation) -> Result<Attachment> {
        match kind {
            MediaKind::Image => self.upload_image(location).await,
            MediaKind::Video => self.upload_video(location).await,
            MediaKind::Audio => self.upload_audio(location).await,
            MediaKind::File => self.upload_file(location).await,
        }
    }
}
