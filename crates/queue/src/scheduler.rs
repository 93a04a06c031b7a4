use std::{
    cmp::{Ordering, Reverse},
    collections::{BinaryHeap, HashMap},
    sync::Arc,
};

use {
    crossrelay_common::InboundEvent,
    crossrelay_routing::Route,
    tokio::time::Instant,
    tracing::{debug, trace},
};

use crate::item::{WorkItem, WorkPayload};

/// Identity of an album being collected for one route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchKey {
    pub route_id: String,
    pub chat_id: i64,
    pub album_id: String,
}

impl BatchKey {
    /// Events without an album id get a key of their own, so they form a
    /// batch of one.
    fn for_event(route: &Route, event: &InboundEvent) -> Self {
        Self {
            route_id: route.id.clone(),
            chat_id: event.chat_id,
            album_id: event
                .album_id
                .clone()
                .unwrap_or_else(|| event.message_id.clone()),
        }
    }
}

#[derive(Debug)]
struct BatchBuffer {
    route: Arc<Route>,
    events: Vec<InboundEvent>,
    deadline: Instant,
}

#[derive(Debug)]
struct Pending {
    seq: u64,
    item: WorkItem,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.item
            .scheduled_at
            .cmp(&other.item.scheduled_at)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Result of [`Scheduler::collect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectOutcome {
    /// First part of a new album; a buffer was opened.
    Opened,
    Appended,
    /// Same `message_id` already buffered. The window was still reset.
    Duplicate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Items waiting for their scheduled time.
    pub pending: usize,
    /// Albums still inside their collection window.
    pub collecting: usize,
}

/// Pending heap plus batch buffers. Every mutation takes the current instant
/// explicitly; nothing here reads a clock.
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: BinaryHeap<Reverse<Pending>>,
    batches: HashMap<BatchKey, BatchBuffer>,
    next_seq: u64,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` for `now + route.options.delay`.
    pub fn enqueue_single(
        &mut self,
        route: Arc<Route>,
        event: InboundEvent,
        now: Instant,
    ) -> Instant {
        let scheduled_at = now + route.options.delay;
        self.push(WorkItem {
            route,
            payload: WorkPayload::Single(Box::new(event)),
            scheduled_at,
        });
        scheduled_at
    }

    /// Add `event` to its album buffer and restart the buffer's window.
    pub fn collect(
        &mut self,
        route: Arc<Route>,
        event: InboundEvent,
        now: Instant,
    ) -> CollectOutcome {
        let key = BatchKey::for_event(&route, &event);
        let deadline = now + route.options.batch_window;

        if let Some(buffer) = self.batches.get_mut(&key) {
            buffer.deadline = deadline;
            if buffer
                .events
                .iter()
                .any(|e| e.message_id == event.message_id)
            {
                trace!(
                    route_id = %key.route_id,
                    message_id = %event.message_id,
                    "duplicate album part ignored"
                );
                return CollectOutcome::Duplicate;
            }
            buffer.events.push(event);
            return CollectOutcome::Appended;
        }

        debug!(
            route_id = %key.route_id,
            chat_id = key.chat_id,
            album_id = %key.album_id,
            "album collection started"
        );
        self.batches.insert(key, BatchBuffer {
            route,
            events: vec![event],
            deadline,
        });
        CollectOutcome::Opened
    }

    /// Turn every buffer whose window has elapsed into a pending batch item
    /// scheduled at `deadline + delay`. Returns how many were flushed.
    pub fn flush_expired(&mut self, now: Instant) -> usize {
        let mut expired: Vec<BatchKey> = self
            .batches
            .iter()
            .filter(|(_, buffer)| buffer.deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        // HashMap order is arbitrary; flush oldest windows first.
        expired.sort_by_key(|key| self.batches.get(key).map(|b| b.deadline));

        let flushed = expired.len();
        for key in expired {
            let Some(BatchBuffer {
                route,
                mut events,
                deadline,
            }) = self.batches.remove(&key)
            else {
                continue;
            };
            events.sort_by_key(|e| e.sequence);
            debug!(
                route_id = %key.route_id,
                album_id = %key.album_id,
                parts = events.len(),
                "album window closed"
            );
            let scheduled_at = deadline + route.options.delay;
            self.push(WorkItem {
                route,
                payload: WorkPayload::Batch(events),
                scheduled_at,
            });
        }
        flushed
    }

    /// Remove and return the earliest item if it is due.
    pub fn pop_due(&mut self, now: Instant) -> Option<WorkItem> {
        if self.pending.peek()?.0.item.scheduled_at > now {
            return None;
        }
        self.pending.pop().map(|Reverse(p)| p.item)
    }

    /// Earliest instant anything needs attention: the next pending item or
    /// the next batch window to close.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        let next_item = self.pending.peek().map(|Reverse(p)| p.item.scheduled_at);
        let next_batch = self.batches.values().map(|b| b.deadline).min();
        match (next_item, next_batch) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    #[must_use]
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            pending: self.pending.len(),
            collecting: self.batches.len(),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.batches.is_empty()
    }

    fn push(&mut self, item: WorkItem) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Reverse(Pending { seq, item }));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crate::item::WorkKind,
        crossrelay_common::Network,
        crossrelay_routing::{Destination, RouteOptions, SourceMatcher, Target},
        std::time::Duration,
    };

    fn route(id: &str, delay_ms: u64, window_ms: u64) -> Arc<Route> {
        Arc::new(Route {
            id: id.to_string(),
            enabled: true,
            source: SourceMatcher {
                network: Network::Telegram,
                chat_id: Some(-100),
                handle: None,
            },
            destinations: vec![Destination {
                network: Network::Discord,
                target: Target::Chat(1),
            }],
            options: RouteOptions {
                delay: Duration::from_millis(delay_ms),
                batch_window: Duration::from_millis(window_ms),
                include_source_footer: false,
            },
        })
    }

    fn album_part(sequence: i64) -> InboundEvent {
        let mut event = InboundEvent::new(Network::Telegram, -100, sequence);
        event.album_id = Some("album-1".into());
        event
    }

    fn ids(item: &WorkItem) -> Vec<i64> {
        item.events().iter().map(|e| e.sequence).collect()
    }

    #[test]
    fn pops_in_scheduled_order() {
        let mut scheduler = Scheduler::new();
        let t0 = Instant::now();
        scheduler.enqueue_single(route("slow", 5_000, 0), album_part(1), t0);
        scheduler.enqueue_single(route("fast", 100, 0), album_part(2), t0);

        assert!(scheduler.pop_due(t0).is_none());
        assert_eq!(
            scheduler.next_deadline(),
            Some(t0 + Duration::from_millis(100))
        );

        let first = scheduler.pop_due(t0 + Duration::from_secs(10)).unwrap();
        let second = scheduler.pop_due(t0 + Duration::from_secs(10)).unwrap();
        assert_eq!(first.route.id, "fast");
        assert_eq!(second.route.id, "slow");
        assert!(scheduler.is_idle());
    }

    #[test]
    fn equal_times_keep_enqueue_order() {
        let mut scheduler = Scheduler::new();
        let t0 = Instant::now();
        for seq in 1..=3 {
            let event = InboundEvent::new(Network::Discord, 1, seq);
            scheduler.enqueue_single(route("r", 0, 0), event, t0);
        }
        let order: Vec<i64> = std::iter::from_fn(|| scheduler.pop_due(t0))
            .map(|item| item.events()[0].sequence)
            .collect();
        assert_eq!(order, [1, 2, 3]);
    }

    #[test]
    fn album_parts_coalesce_sorted_and_deduplicated() {
        let mut scheduler = Scheduler::new();
        let route = route("r", 0, 1_000);
        let t0 = Instant::now();

        let mut collect = |sequence, at| scheduler.collect(Arc::clone(&route), album_part(sequence), at);
        let t1 = t0 + Duration::from_millis(400);
        let t2 = t0 + Duration::from_millis(800);
        assert_eq!(collect(3, t0), CollectOutcome::Opened);
        assert_eq!(collect(1, t1), CollectOutcome::Appended);
        assert_eq!(collect(3, t1), CollectOutcome::Duplicate);
        assert_eq!(collect(2, t2), CollectOutcome::Appended);

        // Window restarts on every part.
        assert_eq!(scheduler.flush_expired(t0 + Duration::from_millis(1_500)), 0);
        assert_eq!(scheduler.stats(), QueueStats {
            pending: 0,
            collecting: 1
        });

        let closes = t2 + Duration::from_millis(1_000);
        assert_eq!(scheduler.next_deadline(), Some(closes));
        assert_eq!(scheduler.flush_expired(closes), 1);

        let item = scheduler.pop_due(closes).unwrap();
        assert_eq!(item.kind(), WorkKind::Batch);
        assert_eq!(item.scheduled_at, closes);
        assert_eq!(ids(&item), [1, 2, 3]);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn batch_delay_starts_when_window_closes() {
        let mut scheduler = Scheduler::new();
        let t0 = Instant::now();
        scheduler.collect(route("r", 2_000, 500), album_part(1), t0);
        scheduler.flush_expired(t0 + Duration::from_millis(500));

        assert_eq!(scheduler.stats(), QueueStats {
            pending: 1,
            collecting: 0
        });
        assert_eq!(
            scheduler.next_deadline(),
            Some(t0 + Duration::from_millis(2_500))
        );
        assert!(scheduler.pop_due(t0 + Duration::from_millis(2_499)).is_none());
        assert!(scheduler.pop_due(t0 + Duration::from_millis(2_500)).is_some());
    }

    #[test]
    fn albums_are_keyed_per_route_and_chat() {
        let mut scheduler = Scheduler::new();
        let t0 = Instant::now();
        scheduler.collect(route("a", 0, 100), album_part(1), t0);
        scheduler.collect(route("b", 0, 100), album_part(1), t0);
        let mut other_chat = album_part(1);
        other_chat.chat_id = -200;
        scheduler.collect(route("a", 0, 100), other_chat, t0);

        assert_eq!(scheduler.stats().collecting, 3);
        assert_eq!(scheduler.flush_expired(t0 + Duration::from_millis(100)), 3);
        assert_eq!(scheduler.stats().pending, 3);
    }

    #[test]
    fn zero_window_closes_immediately() {
        let mut scheduler = Scheduler::new();
        let t0 = Instant::now();
        scheduler.collect(route("r", 0, 0), album_part(1), t0);
        assert_eq!(scheduler.flush_expired(t0), 1);
        assert_eq!(ids(&scheduler.pop_due(t0).unwrap()), [1]);
    }
}
