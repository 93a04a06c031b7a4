//! Ordering of media references across a message and its reply chain.

use std::cmp::Ordering;

use crossrelay_common::{InboundEvent, MediaKind, MediaRef};

/// Which message-like object a candidate was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceLabel {
    OwnMessage,
    Reply,
    Quoted,
}

/// A fetchable media reference, in the order it should be tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCandidate {
    pub source: SourceLabel,
    pub kind: MediaKind,
    pub locator: String,
    pub file_name: Option<String>,
}

/// List every fetchable candidate on `event`, best first.
///
/// Within one message: images (largest first), then video, audio, files.
/// Across messages: the event itself, then its reply target, then the quote.
/// References without a locator are skipped.
#[must_use]
pub fn collect_candidates(event: &InboundEvent) -> Vec<MediaCandidate> {
    let mut out = Vec::new();
    push_ordered(&mut out, SourceLabel::OwnMessage, &event.media);
    if let Some(reply) = &event.reply {
        push_ordered(&mut out, SourceLabel::Reply, &reply.media);
    }
    if let Some(quoted) = &event.quoted {
        push_ordered(&mut out, SourceLabel::Quoted, &quoted.media);
    }
    out
}

fn push_ordered(out: &mut Vec<MediaCandidate>, source: SourceLabel, media: &[MediaRef]) {
    let mut refs: Vec<(&MediaRef, &str)> = media
        .iter()
        .filter_map(|m| m.locator.as_deref().map(|locator| (m, locator)))
        .collect();
    refs.sort_by(|(a, _), (b, _)| {
        a.kind.priority().cmp(&b.kind.priority()).then_with(|| {
            if a.kind == MediaKind::Image {
                b.size_hint.unwrap_or(0).cmp(&a.size_hint.unwrap_or(0))
            } else {
                Ordering::Equal
            }
        })
    });
    out.extend(refs.into_iter().map(|(media, locator)| MediaCandidate {
        source,
        kind: media.kind,
        locator: locator.to_string(),
        file_name: media.file_name.clone(),
    }));
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crossrelay_common::{LinkedMessage, Network},
    };

    fn locators(candidates: &[MediaCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.locator.as_str()).collect()
    }

    #[test]
    fn kind_priority_within_a_message() {
        let mut event = InboundEvent::new(Network::Telegram, 1, 1);
        event.media = vec![
            MediaRef::new(MediaKind::File, "doc"),
            MediaRef::new(MediaKind::Audio, "song"),
            MediaRef::new(MediaKind::Image, "photo"),
            MediaRef::new(MediaKind::Video, "clip"),
        ];
        assert_eq!(
            locators(&collect_candidates(&event)),
            vec!["photo", "clip", "song", "doc"]
        );
    }

    #[test]
    fn image_sizes_largest_first() {
        let mut event = InboundEvent::new(Network::Telegram, 1, 1);
        event.media = vec![
            MediaRef::new(MediaKind::Image, "s").with_size(90 * 90),
            MediaRef::new(MediaKind::Image, "l").with_size(1280 * 720),
            MediaRef::new(MediaKind::Image, "m").with_size(320 * 240),
        ];
        assert_eq!(locators(&collect_candidates(&event)), vec!["l", "m", "s"]);
    }

    #[test]
    fn own_then_reply_then_quote() {
        let mut event = InboundEvent::new(Network::Telegram, 1, 1);
        event.quoted = Some(Box::new(LinkedMessage {
            message_id: "q".into(),
            media: vec![MediaRef::new(MediaKind::Image, "quoted")],
        }));
        event.reply = Some(Box::new(LinkedMessage {
            message_id: "r".into(),
            media: vec![MediaRef::new(MediaKind::Image, "reply")],
        }));
        event.media = vec![MediaRef::new(MediaKind::File, "own")];
        let candidates = collect_candidates(&event);
        assert_eq!(locators(&candidates), vec!["own", "reply", "quoted"]);
        assert_eq!(candidates[1].source, SourceLabel::Reply);
    }

    #[test]
    fn references_without_locator_are_skipped() {
        let mut event = InboundEvent::new(Network::Discord, 1, 1);
        let mut missing = MediaRef::new(MediaKind::Image, "x");
        missing.locator = None;
        event.media = vec![missing];
        assert!(collect_candidates(&event).is_empty());
        assert!(event.has_media());
    }
}
