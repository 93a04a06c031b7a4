//! Metric name and label definitions.

/// Dispatch engine metrics
pub mod dispatch {
    /// Inbound events handed to the dispatcher
    pub const EVENTS_RECEIVED_TOTAL: &str = "crossrelay_events_received_total";
    /// Inbound events that matched no enabled route
    pub const EVENTS_UNMATCHED_TOTAL: &str = "crossrelay_events_unmatched_total";
    /// Route matches (one event can produce several)
    pub const ROUTE_MATCHES_TOTAL: &str = "crossrelay_route_matches_total";
}

/// Delay/batch queue metrics
pub mod queue {
    /// Work items enqueued, by kind
    pub const ENQUEUED_TOTAL: &str = "crossrelay_queue_enqueued_total";
    /// Work items delivered successfully
    pub const DELIVERED_TOTAL: &str = "crossrelay_queue_delivered_total";
    /// Work items dropped after a delivery failure
    pub const FAILED_TOTAL: &str = "crossrelay_queue_failed_total";
    /// Items waiting for their scheduled time
    pub const PENDING: &str = "crossrelay_queue_pending";
    /// Albums still inside their collection window
    pub const COLLECTING: &str = "crossrelay_queue_collecting";
    /// Time between scheduled release and delivery completion
    pub const DELIVERY_LAG_SECONDS: &str = "crossrelay_queue_delivery_lag_seconds";
}

/// Attachment resolver metrics
pub mod media {
    /// Attachments uploaded to a destination
    pub const UPLOADS_TOTAL: &str = "crossrelay_media_uploads_total";
    /// Candidate attempts that failed
    pub const CANDIDATE_FAILURES_TOTAL: &str = "crossrelay_media_candidate_failures_total";
    /// Events whose every candidate failed
    pub const UNRESOLVED_TOTAL: &str = "crossrelay_media_unresolved_total";
}

/// Common label keys
pub mod labels {
    pub const ROUTE: &str = "route";
    pub const NETWORK: &str = "network";
    pub const KIND: &str = "kind";
    pub const REASON: &str = "reason";
}
