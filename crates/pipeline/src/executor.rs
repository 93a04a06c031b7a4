use std::collections::HashMap;

use {
    async_trait::async_trait,
    crossrelay_channels::{ChannelRegistry, DeliveryReceipt},
    crossrelay_common::Network,
    crossrelay_markup::dialect_for,
    crossrelay_media::{BatchResolution, resolve_all},
    crossrelay_queue::{Deliver, WorkItem},
    crossrelay_routing::Destination,
    tracing::{debug, info, warn},
};

use crate::{
    compose::compose,
    error::{Error, Result},
};

/// Renders, resolves and sends released work items.
///
/// Every destination of the item's route is attempted even when an earlier
/// one fails; the failures are reported together. Attachments are uploaded
/// once per destination network and reused for every target on it.
pub struct DeliveryExecutor {
    registry: ChannelRegistry,
}

impl DeliveryExecutor {
    #[must_use]
    pub fn new(registry: ChannelRegistry) -> Self {
        Self { registry }
    }

    pub async fn deliver_item(&self, item: &WorkItem) -> Result<DeliveryReceipt> {
        let destinations = &item.route.destinations;
        let mut receipt = DeliveryReceipt::default();
        let mut details = Vec::new();
        let mut resolved = HashMap::new();

        for destination in destinations {
            match self.deliver_to(item, destination, &mut resolved).await {
                Ok(sent) => {
                    info!(
                        route_id = %item.route.id,
                        item = %item.label(),
                        destination = %destination,
                        messages = sent.message_ids.len(),
                        "relayed"
                    );
                    receipt.merge(sent);
                },
                Err(e) => {
                    warn!(
                        route_id = %item.route.id,
                        item = %item.label(),
                        destination = %destination,
                        error = %e,
                        "destination send failed"
                    );
                    details.push(format!("{destination}: {e}"));
                },
            }
        }

        if details.is_empty() {
            Ok(receipt)
        } else {
            Err(Error::Delivery {
                failed: details.len(),
                total: destinations.len(),
                details,
            })
        }
    }

    async fn deliver_to(
        &self,
        item: &WorkItem,
        destination: &Destination,
        resolved: &mut HashMap<Network, BatchResolution>,
    ) -> Result<DeliveryReceipt> {
        let client = self.registry.get(destination.network)?;
        let resolution = match resolved.get(&destination.network) {
            Some(resolution) => resolution.clone(),
            None => {
                let resolution = resolve_all(item.events(), client.media.as_ref()).await;
                resolved.insert(destination.network, resolution.clone());
                resolution
            },
        };
        let message = compose(item, dialect_for(destination.network), resolution);
        if message.is_empty() {
            debug!(
                route_id = %item.route.id,
                item = %item.label(),
                "nothing to send"
            );
            return Ok(DeliveryReceipt::default());
        }

        let target = &destination.target;
        if message.chunks.is_empty() {
            return Ok(client
                .outbound
                .send_message(target, "", &message.attachments)
                .await?);
        }

        let mut receipt = DeliveryReceipt::default();
        let last = message.chunks.len() - 1;
        for (idx, chunk) in message.chunks.iter().enumerate() {
            let attachments = if idx == last {
                message.attachments.as_slice()
            } else {
                &[]
            };
            receipt.merge(
                client
                    .outbound
                    .send_message(target, chunk, attachments)
                    .await?,
            );
        }
        Ok(receipt)
    }
}

#[async_trait]
impl Deliver for DeliveryExecutor {
    async fn deliver(&self, item: &WorkItem) -> anyhow::Result<()> {
        self.deliver_item(item).await?;
        Ok(())
    }
}
