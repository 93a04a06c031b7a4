//! Building the outbound text of a work item for one destination dialect.

use {
    crossrelay_common::InboundEvent,
    crossrelay_markup::{Dialect, chunk_message, message_len, render_chunks},
    crossrelay_media::{Attachment, BatchResolution},
    crossrelay_queue::WorkItem,
};

/// Everything sent to one destination for one work item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Rendered text split to the dialect's size limit. Attachments go with
    /// the last chunk.
    pub chunks: Vec<String>,
    pub attachments: Vec<Attachment>,
}

impl OutboundMessage {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty() && self.attachments.is_empty()
    }
}

/// Render `item` in `dialect`, then append the source footer (when the route
/// asks for it) and one line per attachment warning.
///
/// A batch takes its text from the first part with a caption; albums carry
/// the caption on a single part. The body is chunked before the footer and
/// warnings are added; those go on the last chunk when they fit there and
/// into a chunk of their own otherwise.
#[must_use]
pub fn compose(
    item: &WorkItem,
    dialect: &dyn Dialect,
    resolution: BatchResolution,
) -> OutboundMessage {
    let max_len = dialect.max_message_len();
    let events = item.events();
    let mut chunks = events
        .iter()
        .find(|e| !e.text.is_empty())
        .map(|e| render_chunks(&e.text.body, &e.text.spans, dialect, max_len))
        .unwrap_or_default();

    let mut tail = Tail::default();
    if item.route.options.include_source_footer
        && let Some(first) = events.first()
    {
        tail.push(
            &dialect.footer(&source_title(first), first.permalink.as_deref()),
            "\n\n",
        );
    }
    for warning in &resolution.warnings {
        tail.push(&dialect.warning(warning), "\n");
    }

    if !tail.text.is_empty() {
        match chunks.last_mut() {
            Some(last)
                if message_len(last) + message_len(tail.separator) + message_len(&tail.text)
                    <= max_len =>
            {
                last.push_str(tail.separator);
                last.push_str(&tail.text);
            },
            _ => chunks.extend(chunk_message(&tail.text, max_len)),
        }
    }

    OutboundMessage {
        chunks,
        attachments: resolution.attachments,
    }
}

/// Footer and warning lines, kept apart from the body until chunking is done.
#[derive(Default)]
struct Tail {
    text: String,
    /// Goes between the body and `text`.
    separator: &'static str,
}

impl Tail {
    fn push(&mut self, section: &str, separator: &'static str) {
        if self.text.is_empty() {
            self.separator = separator;
        } else {
            self.text.push_str(separator);
        }
        self.text.push_str(section);
    }
}

fn source_title(event: &InboundEvent) -> String {
    if let Some(title) = event.chat_title.as_deref().filter(|t| !t.trim().is_empty()) {
        return title.to_string();
    }
    match event.chat_handle.as_deref() {
        Some(handle) => {
            let sigil = event.network.sigil();
            format!("{sigil}{}", handle.trim_start_matches(sigil))
        },
        None => event.source_label(),
    }
}
