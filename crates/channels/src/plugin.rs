use {
    async_trait::async_trait,
    crossrelay_common::{InboundEvent, Network},
    crossrelay_media::Attachment,
    crossrelay_routing::Target,
    serde::Serialize,
};

use crate::Result;

/// Receives normalized inbound events from a network client. The relay's
/// dispatcher is the production implementation.
#[async_trait]
pub trait ChannelEventSink: Send + Sync {
    async fn dispatch(&self, event: InboundEvent);
}

/// What the destination reported after a successful send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReceipt {
    /// Identifiers of the messages created, in send order.
    pub message_ids: Vec<String>,
}

impl DeliveryReceipt {
    #[must_use]
    pub fn single(message_id: impl Into<String>) -> Self {
        Self {
            message_ids: vec![message_id.into()],
        }
    }

    pub fn merge(&mut self, other: Self) {
        self.message_ids.extend(other.message_ids);
    }
}

/// Send messages to one network.
#[async_trait]
pub trait ChannelOutbound: Send + Sync {
    fn network(&self) -> Network;

    /// Send `text` (already rendered in the network's markup dialect) with
    /// `attachments` previously uploaded through the same network's sink.
    async fn send_message(
        &self,
        target: &Target,
        text: &str,
        attachments: &[Attachment],
    ) -> Result<DeliveryReceipt>;
}
