use std::{fmt, sync::Arc};

use {crossrelay_common::InboundEvent, crossrelay_routing::Route, tokio::time::Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkKind {
    Single,
    Batch,
}

impl fmt::Display for WorkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Single => "single",
            Self::Batch => "batch",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkPayload {
    Single(Box<InboundEvent>),
    /// Album parts sorted by `sequence`, unique by `message_id`.
    Batch(Vec<InboundEvent>),
}

/// One scheduled unit of outbound delivery.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub route: Arc<Route>,
    pub payload: WorkPayload,
    pub scheduled_at: Instant,
}

impl WorkItem {
    #[must_use]
    pub fn kind(&self) -> WorkKind {
        match self.payload {
            WorkPayload::Single(_) => WorkKind::Single,
            WorkPayload::Batch(_) => WorkKind::Batch,
        }
    }

    /// The events carried, in delivery order.
    #[must_use]
    pub fn events(&self) -> &[InboundEvent] {
        match &self.payload {
            WorkPayload::Single(event) => std::slice::from_ref(event.as_ref()),
            WorkPayload::Batch(events) => events,
        }
    }

    /// Identifier used in logs: the first event's id, plus a part count for
    /// batches.
    #[must_use]
    pub fn label(&self) -> String {
        let events = self.events();
        let first = events.first().map_or("-", |e| e.message_id.as_str());
        match self.kind() {
            WorkKind::Single => first.to_string(),
            WorkKind::Batch => format!("{first} (+{} parts)", events.len().saturating_sub(1)),
        }
    }
}
