use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    crossrelay_channels::ChannelEventSink,
    crossrelay_common::InboundEvent,
    crossrelay_queue::QueueHandle,
    crossrelay_routing::{LogThrottle, RouteTable},
    tracing::{debug, error, info},
};

#[cfg(feature = "metrics")]
use crossrelay_metrics::{counter, dispatch as dispatch_metrics, labels};

use crate::error::Result;

/// Fans inbound events out to the queue, one work item per matching route.
pub struct Dispatcher {
    table: Arc<RouteTable>,
    queue: QueueHandle,
    unmatched: LogThrottle,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        table: Arc<RouteTable>,
        queue: QueueHandle,
        unmatched_log_cooldown: Duration,
    ) -> Self {
        Self {
            table,
            queue,
            unmatched: LogThrottle::new(unmatched_log_cooldown),
        }
    }

    /// Route `event` and return how many routes took it.
    ///
    /// Album parts go to the batch buffer of each route; everything else is
    /// scheduled directly.
    pub async fn dispatch_event(&self, event: InboundEvent) -> Result<usize> {
        #[cfg(feature = "metrics")]
        counter!(
            dispatch_metrics::EVENTS_RECEIVED_TOTAL,
            labels::NETWORK => event.network.as_str()
        )
        .increment(1);

        let routes = self.table.match_event(&event);
        if routes.is_empty() {
            #[cfg(feature = "metrics")]
            counter!(dispatch_metrics::EVENTS_UNMATCHED_TOTAL).increment(1);
            let source = format!("{}:{}", event.network, event.chat_id);
            if self.unmatched.allow(&source) {
                info!(
                    source = %source,
                    handle = event.chat_handle.as_deref().unwrap_or("-"),
                    "no route for source, dropping its events"
                );
            }
            return Ok(0);
        }

        let matched = routes.len();
        for route in routes {
            #[cfg(feature = "metrics")]
            counter!(dispatch_metrics::ROUTE_MATCHES_TOTAL, labels::ROUTE => route.id.clone())
                .increment(1);
            debug!(
                route_id = %route.id,
                message_id = %event.message_id,
                album = event.album_id.is_some(),
                "route matched"
            );
            if event.album_id.is_some() {
                self.queue.collect(route, event.clone()).await?;
            } else {
                self.queue.enqueue_single(route, event.clone()).await?;
            }
        }
        Ok(matched)
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.table
    }

    #[must_use]
    pub fn queue(&self) -> &QueueHandle {
        &self.queue
    }
}

#[async_trait]
impl ChannelEventSink for Dispatcher {
    async fn dispatch(&self, event: InboundEvent) {
        let message_id = event.message_id.clone();
        if let Err(e) = self.dispatch_event(event).await {
            error!(message_id = %message_id, error = %e, "failed to dispatch inbound event");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crossrelay_common::Network,
        crossrelay_queue::{Deliver, QueueStats, WorkItem, spawn_queue},
        crossrelay_routing::{Destination, Route, RouteOptions, SourceMatcher, Target},
    };

    struct Discard;

    #[async_trait]
    impl Deliver for Discard {
        async fn deliver(&self, _item: &WorkItem) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn route(id: &str, chat_id: i64, enabled: bool) -> Route {
        Route {
            id: id.to_string(),
            enabled,
            source: SourceMatcher {
                network: Network::Telegram,
                chat_id: Some(chat_id),
                handle: None,
            },
            destinations: vec![Destination {
                network: Network::Discord,
                target: Target::Chat(1),
            }],
            options: RouteOptions {
                delay: Duration::from_secs(3_600),
                ..RouteOptions::default()
            },
        }
    }

    fn dispatcher() -> Dispatcher {
        let table = RouteTable::from_routes([
            route("a", -100, true),
            route("b", -100, true),
            route("off", -100, false),
            route("other", -200, true),
        ]);
        let (queue, _worker) = spawn_queue(Arc::new(Discard), 16);
        Dispatcher::new(Arc::new(table), queue, Duration::from_secs(60))
    }

    #[tokio::test(start_paused = true)]
    async fn single_event_fans_out_to_enabled_routes() {
        let dispatcher = dispatcher();
        let event = InboundEvent::new(Network::Telegram, -100, 1);

        assert_eq!(dispatcher.dispatch_event(event).await.unwrap(), 2);
        assert_eq!(dispatcher.queue().stats().await.unwrap(), QueueStats {
            pending: 2,
            collecting: 0
        });
    }

    #[tokio::test(start_paused = true)]
    async fn album_parts_go_to_the_collector() {
        let dispatcher = dispatcher();
        for sequence in 1..=2 {
            let mut event = InboundEvent::new(Network::Telegram, -100, sequence);
            event.album_id = Some("g1".into());
            dispatcher.dispatch_event(event).await.unwrap();
        }

        assert_eq!(dispatcher.queue().stats().await.unwrap(), QueueStats {
            pending: 0,
            collecting: 2
        });
    }

    #[tokio::test(start_paused = true)]
    async fn unmatched_event_is_dropped() {
        let dispatcher = dispatcher();
        let event = InboundEvent::new(Network::Discord, -100, 1);

        assert_eq!(dispatcher.dispatch_event(event).await.unwrap(), 0);
        assert_eq!(
            dispatcher.queue().stats().await.unwrap(),
            QueueStats::default()
        );
    }
}
