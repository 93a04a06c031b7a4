use std::{collections::HashMap, sync::Arc};

use {crossrelay_common::Network, crossrelay_media::MediaSink, tracing::debug};

use {
    super::plugin::ChannelOutbound,
    crate::error::{Error, Result},
};

/// The send and upload halves of one network client.
#[derive(Clone)]
pub struct NetworkClient {
    pub outbound: Arc<dyn ChannelOutbound>,
    pub media: Arc<dyn MediaSink>,
}

/// Registry of the network clients available as destinations.
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    clients: HashMap<Network, NetworkClient>,
}

impl ChannelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the client for `outbound.network()`.
    pub fn register(&mut self, outbound: Arc<dyn ChannelOutbound>, media: Arc<dyn MediaSink>) {
        let network = outbound.network();
        debug!(%network, "channel client registered");
        self.clients.insert(network, NetworkClient { outbound, media });
    }

    pub fn get(&self, network: Network) -> Result<&NetworkClient> {
        self.clients
            .get(&network)
            .ok_or_else(|| Error::unknown_network(network))
    }

    #[must_use]
    pub fn contains(&self, network: Network) -> bool {
        self.clients.contains_key(&network)
    }

    #[must_use]
    pub fn list(&self) -> Vec<Network> {
        let mut networks: Vec<_> = self.clients.keys().copied().collect();
        networks.sort_by_key(|n| n.as_str());
        networks
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crate::plugin::DeliveryReceipt,
        async_trait::async_trait,
        crossrelay_common::MediaKind,
        crossrelay_media::{Attachment, FetchLocation},
        crossrelay_routing::Target,
    };

    struct Noop(Network);

    #[async_trait]
    impl ChannelOutbound for Noop {
        fn network(&self) -> Network {
            self.0
        }

        async fn send_message(
            &self,
            _target: &Target,
            text: &str,
            _attachments: &[Attachment],
        ) -> Result<DeliveryReceipt> {
            Ok(DeliveryReceipt::single(text))
        }
    }

    #[async_trait]
    impl MediaSink for Noop {
        async fn fetch_location(&self, locator: &str) -> crossrelay_media::Result<FetchLocation> {
            Ok(FetchLocation::Url(locator.to_string()))
        }

        async fn upload_image(&self, _: &FetchLocation) -> crossrelay_media::Result<Attachment> {
            Ok(Attachment::new(MediaKind::Image, "img"))
        }

        async fn upload_video(&self, _: &FetchLocation) -> crossrelay_media::Result<Attachment> {
            Ok(Attachment::new(MediaKind::Video, "vid"))
        }

        async fn upload_audio(&self, _: &FetchLocation) -> crossrelay_media::Result<Attachment> {
            Ok(Attachment::new(MediaKind::Audio, "aud"))
        }

        async fn upload_file(&self, _: &FetchLocation) -> crossrelay_media::Result<Attachment> {
            Ok(Attachment::new(MediaKind::File, "doc"))
        }
    }

    fn register(registry: &mut ChannelRegistry, network: Network) {
        let client = Arc::new(Noop(network));
        registry.register(client.clone(), client);
    }

    #[tokio::test]
    async fn lookup_by_network() {
        let mut registry = ChannelRegistry::new();
        register(&mut registry, Network::Discord);

        let client = registry.get(Network::Discord).unwrap();
        let receipt = client
            .outbound
            .send_message(&Target::Chat(1), "hi", &[])
            .await
            .unwrap();
        assert_eq!(receipt.message_ids, ["hi"]);
        assert!(matches!(
            registry.get(Network::Telegram),
            Err(Error::UnknownNetwork {
                network: Network::Telegram
            })
        ));
    }

    #[test]
    fn list_is_sorted() {
        let mut registry = ChannelRegistry::new();
        register(&mut registry, Network::Telegram);
        register(&mut registry, Network::Discord);
        assert_eq!(registry.list(), [Network::Discord, Network::Telegram]);
        assert!(registry.contains(Network::Telegram));
    }
}
