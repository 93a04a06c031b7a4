//! The attachment cascade: try candidates in order, stop at the first upload
//! that succeeds, and turn total failure into a user-facing warning.

use std::panic::AssertUnwindSafe;

use {
    crossrelay_common::InboundEvent,
    futures::FutureExt,
    tracing::{debug, error, info, warn},
};

#[cfg(feature = "metrics")]
use crossrelay_metrics::{counter, labels, media as media_metrics};

use crate::{
    Result,
    candidate::{MediaCandidate, collect_candidates},
    sink::{Attachment, MediaSink},
};

pub const WARNING_TOO_LARGE: &str = "Attachment not relayed: file is too large for the fetch API";
pub const WARNING_UNAVAILABLE: &str = "Attachment not relayed: file unavailable or failed to fetch";
pub const WARNING_INTERNAL: &str = "Attachment not relayed: internal error";

/// Outcome for a single event: at most one attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub attachments: Vec<Attachment>,
    pub warning: Option<String>,
}

impl Resolution {
    fn attached(attachment: Attachment) -> Self {
        Self {
            attachments: vec![attachment],
            warning: None,
        }
    }

    fn warned(warning: &str) -> Self {
        Self {
            attachments: Vec::new(),
            warning: Some(warning.to_string()),
        }
    }
}

/// Combined outcome for the events of an album.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResolution {
    pub attachments: Vec<Attachment>,
    /// Distinct warnings, in first-seen order.
    pub warnings: Vec<String>,
}

/// Resolve the attachment for `event` through `sink`.
///
/// Never fails: fetch and upload errors become a warning, and internal
/// errors or panics inside the sink become a generic warning.
pub async fn resolve(event: &InboundEvent, sink: &dyn MediaSink) -> Resolution {
    match AssertUnwindSafe(cascade(event, sink)).catch_unwind().await {
        Ok(Ok(resolution)) => resolution,
        Ok(Err(e)) => {
            error!(message_id = %event.message_id, error = %e, "attachment resolution failed");
            Resolution::warned(WARNING_INTERNAL)
        },
        Err(_) => {
            error!(message_id = %event.message_id, "attachment resolution panicked");
            Resolution::warned(WARNING_INTERNAL)
        },
    }
}

/// Resolve every event of an album independently and merge the results.
pub async fn resolve_all(events: &[InboundEvent], sink: &dyn MediaSink) -> BatchResolution {
    let mut merged = BatchResolution::default();
    for event in events {
        let resolution = resolve(event, sink).await;
        merged.attachments.extend(resolution.attachments);
        if let Some(warning) = resolution.warning
            && !merged.warnings.contains(&warning)
        {
            merged.warnings.push(warning);
        }
    }
    merged
}

/// Returns `Err` only for internal errors; everything else is a `Resolution`.
async fn cascade(event: &InboundEvent, sink: &dyn MediaSink) -> Result<Resolution> {
    let candidates = collect_candidates(event);
    if candidates.is_empty() {
        if event.has_media() {
            debug!(
                message_id = %event.message_id,
                "message has media but no fetchable reference"
            );
        }
        return Ok(Resolution::default());
    }

    let mut saw_too_large = false;
    for (attempt, candidate) in candidates.iter().enumerate() {
        match try_candidate(candidate, sink).await {
            Ok(attachment) => {
                info!(
                    message_id = %event.message_id,
                    source = ?candidate.source,
                    kind = %candidate.kind,
                    attempt,
                    "attachment uploaded"
                );
                #[cfg(feature = "metrics")]
                counter!(media_metrics::UPLOADS_TOTAL, labels::KIND => candidate.kind.to_string())
                    .increment(1);
                return Ok(Resolution::attached(attachment));
            },
            Err(e) if e.is_internal() => return Err(e),
            Err(e) => {
                let too_large = e.is_too_large();
                saw_too_large |= too_large;
                warn!(
                    message_id = %event.message_id,
                    source = ?candidate.source,
                    kind = %candidate.kind,
                    attempt,
                    too_large,
                    error = %e,
                    "attachment candidate failed"
                );
                #[cfg(feature = "metrics")]
                counter!(
                    media_metrics::CANDIDATE_FAILURES_TOTAL,
                    labels::REASON => if too_large { "too_large" } else { "unavailable" }
                )
                .increment(1);
            },
        }
    }

    #[cfg(feature = "metrics")]
    counter!(media_metrics::UNRESOLVED_TOTAL).increment(1);

    Ok(Resolution::warned(if saw_too_large {
        WARNING_TOO_LARGE
    } else {
        WARNING_UNAVAILABLE
    }))
}

async fn try_candidate(candidate: &MediaCandidate, sink: &dyn MediaSink) -> Result<Attachment> {
    let location = sink.fetch_location(&candidate.locator).await?;
    let mut attachment = sink.upload(candidate.kind, &location).await?;
    if attachment.file_name.is_none() {
        attachment.file_name = candidate.file_name.clone();
    }
    Ok(attachment)
}
