//! Queue actor: the only owner of [`Scheduler`] state.
//!
//! Callers hold a cloneable [`QueueHandle`]. The actor sleeps until the
//! earliest deadline or the next command, whichever comes first, and delivers
//! due items inline, one at a time. A slow delivery therefore holds back every
//! other due item.

use std::{panic::AssertUnwindSafe, sync::Arc};

use {
    async_trait::async_trait,
    crossrelay_common::InboundEvent,
    futures::FutureExt,
    crossrelay_routing::Route,
    tokio::{
        sync::{mpsc, oneshot},
        task::JoinHandle,
        time::Instant,
    },
    tracing::{debug, error, info, warn},
};

#[cfg(feature = "metrics")]
use crossrelay_metrics::{counter, gauge, histogram, labels, queue as queue_metrics};

use crate::{
    error::Result,
    item::WorkItem,
    scheduler::{QueueStats, Scheduler},
};

/// Consumes released work items.
#[async_trait]
pub trait Deliver: Send + Sync {
    /// An error drops the item. It is logged and never retried.
    async fn deliver(&self, item: &WorkItem) -> anyhow::Result<()>;
}

enum Command {
    Single {
        route: Arc<Route>,
        event: Box<InboundEvent>,
        at: Instant,
    },
    Collect {
        route: Arc<Route>,
        event: Box<InboundEvent>,
        at: Instant,
    },
    Stats(oneshot::Sender<QueueStats>),
}

/// Front end of a running queue. The actor stops once every clone is
/// dropped, discarding whatever is still pending.
#[derive(Clone)]
pub struct QueueHandle {
    tx: mpsc::Sender<Command>,
}

impl QueueHandle {
    /// Schedule `event` for `now + route.options.delay`.
    pub async fn enqueue_single(&self, route: Arc<Route>, event: InboundEvent) -> Result<()> {
        self.tx
            .send(Command::Single {
                route,
                event: Box::new(event),
                at: Instant::now(),
            })
            .await?;
        Ok(())
    }

    /// Add `event` to its album buffer for `route`.
    pub async fn collect(&self, route: Arc<Route>, event: InboundEvent) -> Result<()> {
        self.tx
            .send(Command::Collect {
                route,
                event: Box::new(event),
                at: Instant::now(),
            })
            .await?;
        Ok(())
    }

    pub async fn stats(&self) -> Result<QueueStats> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Command::Stats(reply)).await?;
        Ok(rx.await?)
    }
}

/// Start the queue actor on the current runtime.
///
/// `capacity` bounds the command channel; senders wait when it is full.
pub fn spawn_queue(deliver: Arc<dyn Deliver>, capacity: usize) -> (QueueHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let worker = Worker {
        scheduler: Scheduler::new(),
        deliver,
        rx,
    };
    let task = tokio::spawn(worker.run());
    (QueueHandle { tx }, task)
}

struct Worker {
    scheduler: Scheduler,
    deliver: Arc<dyn Deliver>,
    rx: mpsc::Receiver<Command>,
}

impl Worker {
    async fn run(mut self) {
        debug!("queue worker started");
        loop {
            // Apply everything already sent so an item enqueued while the
            // previous delivery ran is ordered against what is due now.
            while let Ok(cmd) = self.rx.try_recv() {
                self.apply(cmd);
            }

            let now = Instant::now();
            self.scheduler.flush_expired(now);
            if let Some(item) = self.scheduler.pop_due(now) {
                self.deliver_one(item).await;
                continue;
            }
            self.report_depth();

            let deadline = self.scheduler.next_deadline();
            tokio::select! {
                cmd = self.rx.recv() => match cmd {
                    Some(cmd) => self.apply(cmd),
                    None => break,
                },
                () = sleep_until(deadline) => {},
            }
        }

        let stats = self.scheduler.stats();
        if stats.pending > 0 || stats.collecting > 0 {
            info!(
                pending = stats.pending,
                collecting = stats.collecting,
                "queue worker stopped; undelivered items dropped"
            );
        } else {
            debug!("queue worker stopped");
        }
    }

    fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::Single { route, event, at } => {
                #[cfg(feature = "metrics")]
                counter!(queue_metrics::ENQUEUED_TOTAL, labels::KIND => "single").increment(1);
                self.scheduler.enqueue_single(route, *event, at);
            },
            Command::Collect { route, event, at } => {
                #[cfg(feature = "metrics")]
                counter!(queue_metrics::ENQUEUED_TOTAL, labels::KIND => "album_part").increment(1);
                self.scheduler.collect(route, *event, at);
            },
            Command::Stats(reply) => {
                let _ = reply.send(self.scheduler.stats());
            },
        }
    }

    async fn deliver_one(&self, item: WorkItem) {
        let route_id = item.route.id.clone();
        let label = item.label();
        let kind = item.kind();
        debug!(route_id = %route_id, item = %label, kind = %kind, "delivering");

        // A panicking client must not take the worker down with it.
        let outcome = AssertUnwindSafe(self.deliver.deliver(&item))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(())) => {
                #[cfg(feature = "metrics")]
                {
                    counter!(queue_metrics::DELIVERED_TOTAL, labels::ROUTE => route_id.clone())
                        .increment(1);
                    histogram!(queue_metrics::DELIVERY_LAG_SECONDS)
                        .record(item.scheduled_at.elapsed().as_secs_f64());
                }
                debug!(route_id = %route_id, item = %label, "delivered");
            },
            Ok(Err(e)) => {
                #[cfg(feature = "metrics")]
                counter!(queue_metrics::FAILED_TOTAL, labels::ROUTE => route_id.clone())
                    .increment(1);
                warn!(
                    route_id = %route_id,
                    item = %label,
                    kind = %kind,
                    error = %e,
                    "delivery failed; item dropped"
                );
            },
            Err(_) => {
                #[cfg(feature = "metrics")]
                counter!(queue_metrics::FAILED_TOTAL, labels::ROUTE => route_id.clone())
                    .increment(1);
                error!(
                    route_id = %route_id,
                    item = %label,
                    kind = %kind,
                    "delivery panicked; item dropped"
                );
            },
        }
    }

    fn report_depth(&self) {
        #[cfg(feature = "metrics")]
        {
            let stats = self.scheduler.stats();
            gauge!(queue_metrics::PENDING).set(stats.pending as f64);
            gauge!(queue_metrics::COLLECTING).set(stats.collecting as f64);
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
