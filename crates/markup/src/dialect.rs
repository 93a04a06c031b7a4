//! Destination markup dialects.

use crossrelay_common::{Network, Span, SpanKind};

use crate::link::{bare_url_target, has_scheme, normalize_url};

/// Discord message size limit.
pub const DISCORD_MAX_MESSAGE_LEN: usize = 2000;

/// Telegram message size limit.
pub const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;

/// How a destination network spells escaped text and styled spans.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Escape literal text so the destination parser shows it verbatim.
    fn escape(&self, text: &str) -> String;

    /// Escape the raw content of a code span. Only the code delimiter is
    /// touched; everything else inside code is kept as-is.
    fn escape_code(&self, text: &str) -> String;

    /// Wrap already-rendered `inner` markup for `span`. `raw` is the
    /// unescaped source text the span covers.
    fn wrap(&self, span: &Span, inner: &str, raw: &str) -> String;

    /// "via <chat>" attribution line appended when a route asks for it.
    fn footer(&self, title: &str, permalink: Option<&str>) -> String;

    /// User-visible notice about an attachment that could not be relayed.
    fn warning(&self, text: &str) -> String;

    fn max_message_len(&self) -> usize;
}

/// Dialect used when relaying *to* `network`.
#[must_use]
pub fn dialect_for(network: Network) -> &'static dyn Dialect {
    match network {
        Network::Discord => &DiscordMarkdown,
        Network::Telegram => &TelegramHtml,
    }
}

// ── Discord Markdown ─────────────────────────────────────────────────────

/// Discord-flavoured Markdown, escaped with backslashes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscordMarkdown;

const MARKDOWN_SPECIAL: &[char] = &[
    '\\', '*', '_', '~', '`', '|', '>', '#', '-', '[', ']', '(', ')',
];

impl Dialect for DiscordMarkdown {
    fn name(&self) -> &'static str {
        "discord-markdown"
    }

    fn escape(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + text.len() / 8);
        for ch in text.chars() {
            if MARKDOWN_SPECIAL.contains(&ch) {
                out.push('\\');
            }
            out.push(ch);
        }
        out
    }

    fn escape_code(&self, text: &str) -> String {
        text.replace('`', "\\`")
    }

    fn wrap(&self, span: &Span, inner: &str, raw: &str) -> String {
        match span.kind {
            SpanKind::Bold => format!("**{inner}**"),
            SpanKind::Italic => format!("*{inner}*"),
            SpanKind::Underline => format!("__{inner}__"),
            SpanKind::Strikethrough => format!("~~{inner}~~"),
            SpanKind::Spoiler => format!("||{inner}||"),
            SpanKind::Code => format!("`{inner}`"),
            SpanKind::Pre => {
                let lang = span.language.as_deref().unwrap_or("");
                format!("```{lang}\n{inner}\n```")
            },
            SpanKind::TextLink | SpanKind::TextMention => match span.url.as_deref() {
                Some(url) => format!("[{inner}]({})", markdown_link_target(url)),
                None => inner.to_string(),
            },
            // Discord links absolute URLs itself; escaping would break them.
            SpanKind::Url if has_scheme(raw) => raw.to_string(),
            SpanKind::Url => inner.to_string(),
            SpanKind::Blockquote => inner
                .split('\n')
                .map(|line| format!("> {line}"))
                .collect::<Vec<_>>()
                .join("\n"),
            SpanKind::Other => inner.to_string(),
        }
    }

    fn footer(&self, title: &str, permalink: Option<&str>) -> String {
        match permalink {
            Some(url) => format!(
                "-# via [{}]({})",
                self.escape(title),
                markdown_link_target(url)
            ),
            None => format!("-# via {}", self.escape(title)),
        }
    }

    fn warning(&self, text: &str) -> String {
        format!("⚠️ *{}*", self.escape(text))
    }

    fn max_message_len(&self) -> usize {
        DISCORD_MAX_MESSAGE_LEN
    }
}

/// A `)` would terminate the Markdown link early.
fn markdown_link_target(url: &str) -> String {
    normalize_url(url).replace(')', "%29")
}

// ── Telegram HTML ────────────────────────────────────────────────────────

/// The HTML subset Telegram's `parse_mode=HTML` accepts.
///
/// Supported tags: `<b>`, `<i>`, `<u>`, `<s>`, `<tg-spoiler>`, `<code>`,
/// `<pre>`, `<a href="">`, `<blockquote>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelegramHtml;

impl Dialect for TelegramHtml {
    fn name(&self) -> &'static str {
        "telegram-html"
    }

    fn escape(&self, text: &str) -> String {
        escape_html(text)
    }

    fn escape_code(&self, text: &str) -> String {
        escape_html(text)
    }

    fn wrap(&self, span: &Span, inner: &str, raw: &str) -> String {
        match span.kind {
            SpanKind::Bold => format!("<b>{inner}</b>"),
            SpanKind::Italic => format!("<i>{inner}</i>"),
            SpanKind::Underline => format!("<u>{inner}</u>"),
            SpanKind::Strikethrough => format!("<s>{inner}</s>"),
            SpanKind::Spoiler => format!("<tg-spoiler>{inner}</tg-spoiler>"),
            SpanKind::Code => format!("<code>{inner}</code>"),
            SpanKind::Pre => match span.language.as_deref() {
                Some(lang) if !lang.is_empty() => format!(
                    "<pre><code class=\"language-{}\">{inner}</code></pre>",
                    escape_attr(lang)
                ),
                _ => format!("<pre>{inner}</pre>"),
            },
            SpanKind::TextLink | SpanKind::TextMention => match span.url.as_deref() {
                Some(url) => format!("<a href=\"{}\">{inner}</a>", html_link_target(url)),
                None => inner.to_string(),
            },
            SpanKind::Url => match bare_url_target(raw) {
                Some(href) => format!("<a href=\"{}\">{inner}</a>", escape_attr(&href)),
                None => inner.to_string(),
            },
            SpanKind::Blockquote => format!("<blockquote>{inner}</blockquote>"),
            SpanKind::Other => inner.to_string(),
        }
    }

    fn footer(&self, title: &str, permalink: Option<&str>) -> String {
        match permalink {
            Some(url) => format!(
                "<i>via <a href=\"{}\">{}</a></i>",
                html_link_target(url),
                escape_html(title)
            ),
            None => format!("<i>via {}</i>", escape_html(title)),
        }
    }

    fn warning(&self, text: &str) -> String {
        format!("⚠️ <i>{}</i>", escape_html(text))
    }

    fn max_message_len(&self) -> usize {
        TELEGRAM_MAX_MESSAGE_LEN
    }
}

/// Escape HTML special characters.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_html(text).replace('"', "&quot;")
}

fn html_link_target(url: &str) -> String {
    escape_attr(&normalize_url(url))
}
