//! Normalized message model shared by ingestion, rendering, and delivery.
//!
//! Each network client converts its native message shape into an
//! [`InboundEvent`] at the ingestion boundary; nothing downstream ever sees a
//! network SDK type.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A chat network the relay can read from or write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Telegram,
    Discord,
}

impl Network {
    /// Prefix users conventionally put in front of a chat handle.
    #[must_use]
    pub fn sigil(self) -> char {
        match self {
            Self::Telegram => '@',
            Self::Discord => '#',
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Telegram => "telegram",
            Self::Discord => "discord",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "telegram" | "tg" => Ok(Self::Telegram),
            "discord" => Ok(Self::Discord),
            other => Err(Error::message(format!("unknown network: {other}"))),
        }
    }
}

/// Style carried by a [`Span`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    /// Inline monospace.
    Code,
    /// Preformatted block, optionally tagged with a language.
    Pre,
    /// Text whose link target lives in [`Span::url`].
    TextLink,
    /// Mention of a user without a public handle; target in [`Span::url`].
    TextMention,
    /// Bare URL; the covered text is the link target.
    Url,
    Blockquote,
    /// Mentions, hashtags, emails and the like. Rendered as plain text.
    #[serde(other)]
    Other,
}

impl SpanKind {
    /// Kinds whose content is emitted verbatim rather than as nested markup.
    #[must_use]
    pub fn is_code(self) -> bool {
        matches!(self, Self::Code | Self::Pre)
    }

    #[must_use]
    pub fn is_link(self) -> bool {
        matches!(self, Self::TextLink | Self::TextMention | Self::Url)
    }
}

/// A styling annotation over `[start, end)` of a body, in codepoint offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub kind: SpanKind,
    pub start: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Span {
    #[must_use]
    pub fn new(kind: SpanKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            start,
            end,
            url: None,
            language: None,
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Length in codepoints; zero for inverted ranges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a span from a UTF-16 `(offset, length)` pair as reported by
    /// Telegram's entity list.
    ///
    /// Returns `None` when either endpoint falls inside a surrogate pair or
    /// past the end of `body`, or when the range is empty.
    #[must_use]
    pub fn from_utf16(body: &str, kind: SpanKind, offset: usize, length: usize) -> Option<Self> {
        if length == 0 {
            return None;
        }
        let start = utf16_to_char_index(body, offset)?;
        let end = utf16_to_char_index(body, offset.checked_add(length)?)?;
        Some(Self::new(kind, start, end))
    }

    /// Fail unless `0 <= start < end <= body_len`.
    pub fn check_bounds(&self, body_len: usize) -> crate::Result<()> {
        if self.start < self.end && self.end <= body_len {
            Ok(())
        } else {
            Err(Error::SpanOutOfBounds {
                start: self.start,
                end: self.end,
                len: body_len,
            })
        }
    }
}

/// Map a UTF-16 code unit offset to a codepoint index.
fn utf16_to_char_index(body: &str, utf16_offset: usize) -> Option<usize> {
    let mut units = 0usize;
    let mut count = 0usize;
    for ch in body.chars() {
        if units == utf16_offset {
            return Some(count);
        }
        units += ch.len_utf16();
        if units > utf16_offset {
            return None;
        }
        count += 1;
    }
    (units == utf16_offset).then_some(count)
}

/// Text plus the flat list of styling spans that annotate it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledText {
    pub body: String,
    #[serde(default)]
    pub spans: Vec<Span>,
}

impl StyledText {
    #[must_use]
    pub fn plain(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            spans: Vec::new(),
        }
    }

    #[must_use]
    pub fn new(body: impl Into<String>, spans: Vec<Span>) -> Self {
        Self {
            body: body.into(),
            spans,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Body length in codepoints, the unit [`Span`] offsets are expressed in.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.body.chars().count()
    }
}

/// Broad media class, which also decides the upload operation used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    File,
}

impl MediaKind {
    /// Lower values are tried first.
    #[must_use]
    pub fn priority(self) -> u8 {
        match self {
            Self::Image => 0,
            Self::Video => 1,
            Self::Audio => 2,
            Self::File => 3,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::File => "file",
        })
    }
}

/// A raw media reference found on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    /// Opaque network-specific reference (file id, CDN URL...). `None` when the
    /// message advertised media but the client could not extract a reference.
    #[serde(default)]
    pub locator: Option<String>,
    /// Pixel area for images, byte size otherwise. Used to order size variants.
    #[serde(default)]
    pub size_hint: Option<u64>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl MediaRef {
    #[must_use]
    pub fn new(kind: MediaKind, locator: impl Into<String>) -> Self {
        Self {
            kind,
            locator: Some(locator.into()),
            size_hint: None,
            file_name: None,
            mime_type: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size_hint: u64) -> Self {
        self.size_hint = Some(size_hint);
        self
    }
}

/// A message referenced by an inbound event (its reply target or quote).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedMessage {
    pub message_id: String,
    #[serde(default)]
    pub media: Vec<MediaRef>,
}

/// A message observed on a source network, normalized for the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub network: Network,
    pub chat_id: i64,
    #[serde(default)]
    pub chat_handle: Option<String>,
    #[serde(default)]
    pub chat_title: Option<String>,
    /// Unique identifier, used to deduplicate album parts.
    pub message_id: String,
    /// Network-native ordering id (Telegram message id, Discord snowflake).
    pub sequence: i64,
    /// Shared by every part of a multi-media album.
    #[serde(default)]
    pub album_id: Option<String>,
    #[serde(default)]
    pub text: StyledText,
    #[serde(default)]
    pub media: Vec<MediaRef>,
    #[serde(default)]
    pub reply: Option<Box<LinkedMessage>>,
    #[serde(default)]
    pub quoted: Option<Box<LinkedMessage>>,
    #[serde(default)]
    pub permalink: Option<String>,
}

impl InboundEvent {
    #[must_use]
    pub fn new(network: Network, chat_id: i64, sequence: i64) -> Self {
        Self {
            network,
            chat_id,
            chat_handle: None,
            chat_title: None,
            message_id: format!("{network}:{chat_id}:{sequence}"),
            sequence,
            album_id: None,
            text: StyledText::default(),
            media: Vec::new(),
            reply: None,
            quoted: None,
            permalink: None,
        }
    }

    /// Whether any part of the event or its reply chain mentions media.
    #[must_use]
    pub fn has_media(&self) -> bool {
        !self.media.is_empty()
            || self.reply.as_ref().is_some_and(|r| !r.media.is_empty())
            || self.quoted.as_ref().is_some_and(|q| !q.media.is_empty())
    }

    /// Short human label for logs: handle if known, else the numeric id.
    #[must_use]
    pub fn source_label(&self) -> String {
        match &self.chat_handle {
            Some(handle) => format!("{}:{handle}", self.network),
            None => format!("{}:{}", self.network, self.chat_id),
        }
    }
}
