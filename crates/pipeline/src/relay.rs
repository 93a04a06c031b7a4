use std::{sync::Arc, time::Duration};

use {
    crossrelay_channels::{ChannelEventSink, ChannelRegistry},
    crossrelay_config::{DispatchConfig, RelayConfig},
    crossrelay_queue::{QueueStats, spawn_queue},
    crossrelay_routing::RouteTable,
    tokio::task::JoinHandle,
    tracing::info,
};

use crate::{
    dispatcher::Dispatcher,
    error::{Error, Result},
    executor::DeliveryExecutor,
};

/// A running relay: route table, dispatcher and queue worker.
///
/// Dropping the relay (or calling [`Relay::shutdown`]) stops the worker and
/// discards pending items.
pub struct Relay {
    dispatcher: Arc<Dispatcher>,
    worker: JoinHandle<()>,
}

impl Relay {
    /// Build the route table from `config` and start the queue worker.
    ///
    /// Fails when the config is invalid or when an enabled route delivers to
    /// a network with no registered client.
    pub fn start(config: &RelayConfig, registry: ChannelRegistry) -> Result<Self> {
        let table = RouteTable::from_config(config)?;
        Self::with_table(table, registry, &config.dispatch)
    }

    pub fn with_table(
        table: RouteTable,
        registry: ChannelRegistry,
        dispatch: &DispatchConfig,
    ) -> Result<Self> {
        for route in table.iter().filter(|r| r.enabled) {
            if let Some(dest) = route
                .destinations
                .iter()
                .find(|d| !registry.contains(d.network))
            {
                return Err(Error::MissingClient {
                    route: route.id.clone(),
                    network: dest.network,
                });
            }
        }

        let table = Arc::new(table);
        let executor = Arc::new(DeliveryExecutor::new(registry));
        let (queue, worker) = spawn_queue(executor, dispatch.queue_capacity);
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&table),
            queue,
            Duration::from_secs(dispatch.unmatched_log_cooldown_secs),
        ));

        info!(
            routes = table.len(),
            enabled = table.iter().filter(|r| r.enabled).count(),
            "relay started"
        );
        Ok(Self { dispatcher, worker })
    }

    /// The entry point network clients feed events into.
    #[must_use]
    pub fn sink(&self) -> Arc<dyn ChannelEventSink> {
        self.dispatcher.clone()
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub async fn stats(&self) -> Result<QueueStats> {
        Ok(self.dispatcher.queue().stats().await?)
    }

    /// Stop the queue worker. Pending and collecting items are dropped.
    pub fn shutdown(self) {
        self.worker.abort();
        info!("relay stopped");
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        self.worker.abort();
    }
}
