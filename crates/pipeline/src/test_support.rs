//! Recording fakes for the network client traits.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use {
    async_trait::async_trait,
    crossrelay_channels::{ChannelOutbound, ChannelRegistry, DeliveryReceipt},
    crossrelay_common::{MediaKind, Network},
    crossrelay_media::{Attachment, FetchLocation, MediaSink},
    crossrelay_routing::Target,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Sent {
    pub target: Target,
    pub text: String,
    /// Attachment handles.
    pub attachments: Vec<String>,
}

/// One fake network client. Locators containing `too-large` fail with a
/// size error and `gone` with an availability error; sends to targets in
/// `failing` are rejected.
pub(crate) struct FakeClient {
    network: Network,
    sent: Mutex<Vec<Sent>>,
    failing: Mutex<Vec<Target>>,
    uploads: AtomicUsize,
}

impl FakeClient {
    pub(crate) fn new(network: Network) -> Arc<Self> {
        Arc::new(Self {
            network,
            sent: Mutex::new(Vec::new()),
            failing: Mutex::new(Vec::new()),
            uploads: AtomicUsize::new(0),
        })
    }

    pub(crate) fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn fail_for(&self, target: Target) {
        self.failing.lock().unwrap().push(target);
    }

    /// Successful uploads so far.
    pub(crate) fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    fn attachment(&self, kind: MediaKind, location: &FetchLocation) -> Attachment {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        let handle = match location {
            FetchLocation::Url(url) => format!("{}:{url}", self.network),
            FetchLocation::Path(path) => format!("{}:{}", self.network, path.display()),
        };
        Attachment::new(kind, handle)
    }
}

#[async_trait]
impl ChannelOutbound for FakeClient {
    fn network(&self) -> Network {
        self.network
    }

    async fn send_message(
        &self,
        target: &Target,
        text: &str,
        attachments: &[Attachment],
    ) -> crossrelay_channels::Result<DeliveryReceipt> {
        if self.failing.lock().unwrap().contains(target) {
            return Err(crossrelay_channels::Error::unavailable("chat not found"));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(Sent {
            target: target.clone(),
            text: text.to_string(),
            attachments: attachments.iter().map(|a| a.handle.clone()).collect(),
        });
        Ok(DeliveryReceipt::single(format!("m{}", sent.len())))
    }
}

#[async_trait]
impl MediaSink for FakeClient {
    async fn fetch_location(&self, locator: &str) -> crossrelay_media::Result<FetchLocation> {
        if locator.contains("too-large") {
            return Err(crossrelay_media::Error::too_large(locator));
        }
        if locator.contains("gone") {
            return Err(crossrelay_media::Error::unavailable(locator));
        }
        Ok(FetchLocation::Url(locator.to_string()))
    }

    async fn upload_image(&self, location: &FetchLocation) -> crossrelay_media::Result<Attachment> {
        Ok(self.attachment(MediaKind::Image, location))
    }

    async fn upload_video(&self, location: &FetchLocation) -> crossrelay_media::Result<Attachment> {
        Ok(self.attachment(MediaKind::Video, location))
    }

    async fn upload_audio(&self, location: &FetchLocation) -> crossrelay_media::Result<Attachment> {
        Ok(self.attachment(MediaKind::Audio, location))
    }

    async fn upload_file(&self, location: &FetchLocation) -> crossrelay_media::Result<Attachment> {
        Ok(self.attachment(MediaKind::File, location))
    }
}

pub(crate) fn registry(clients: &[&Arc<FakeClient>]) -> ChannelRegistry {
    let mut registry = ChannelRegistry::new();
    for client in clients {
        let client: Arc<FakeClient> = Arc::clone(client);
        registry.register(client.clone(), client);
    }
    registry
}
