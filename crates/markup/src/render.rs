use crossrelay_common::Span;

use crate::{
    chunk::{message_len, skip_separator, split_point},
    dialect::Dialect,
    tree::EntityTree,
};

/// Render `body` annotated with `spans` as `dialect` markup.
///
/// Text outside any span is escaped. Spans that cannot be placed in the
/// containment tree are ignored, so their text still shows, unstyled.
#[must_use]
pub fn render(body: &str, spans: &[Span], dialect: &dyn Dialect) -> String {
    if body.is_empty() {
        return String::new();
    }
    if spans.is_empty() {
        return dialect.escape(body);
    }
    let tree = EntityTree::build(body, spans);
    render_contents(&tree, 0, dialect)
}

/// Render like [`render`], split into pieces of at most `max_len` units
/// (see [`message_len`]).
///
/// The body is cut before rendering and each span is clipped to the piece it
/// falls in, so every piece is complete markup on its own: a bold run across
/// a cut is closed at the end of one piece and reopened in the next.
#[must_use]
pub fn render_chunks(
    body: &str,
    spans: &[Span],
    dialect: &dyn Dialect,
    max_len: usize,
) -> Vec<String> {
    if body.is_empty() || max_len == 0 {
        return Vec::new();
    }
    let whole = render(body, spans, dialect);
    if message_len(&whole) <= max_len {
        return vec![whole];
    }

    let body_len = body.chars().count();
    let spans: Vec<&Span> = spans
        .iter()
        .filter(|s| s.start < s.end && s.end <= body_len)
        .collect();

    let mut chunks = Vec::new();
    let mut rest = body;
    let mut offset = 0;
    while !rest.is_empty() {
        let mut budget = max_len;
        loop {
            let cut = split_point(rest, budget);
            let piece = &rest[..cut];
            let piece_len = piece.chars().count();
            let clipped = clip_spans(&spans, offset, offset + piece_len);
            let rendered = render(piece, &clipped, dialect);
            let rendered_len = message_len(&rendered);

            if rendered_len <= max_len || piece_len <= 1 {
                chunks.push(rendered);
                let next = skip_separator(&rest[cut..]);
                // Separators are ASCII, so skipped bytes are skipped chars.
                offset += piece_len + (rest.len() - cut - next.len());
                rest = next;
                break;
            }
            // Escapes and tags pushed the piece over; cut less source text.
            budget = (piece_len * max_len / rendered_len).clamp(1, piece_len - 1);
        }
    }
    chunks
}

/// Spans overlapping `from..to`, cut to that range and shifted to start at 0.
fn clip_spans(spans: &[&Span], from: usize, to: usize) -> Vec<Span> {
    spans
        .iter()
        .filter(|s| s.start < to && s.end > from)
        .map(|s| {
            let mut clipped = (*s).clone();
            clipped.start = s.start.max(from) - from;
            clipped.end = s.end.min(to) - from;
            clipped
        })
        .collect()
}

/// Render everything inside node `idx`: escaped gaps interleaved with
/// wrapped children.
fn render_contents(tree: &EntityTree<'_>, idx: usize, dialect: &dyn Dialect) -> String {
    let node = tree.node(idx);
    let mut out = String::new();
    let mut cursor = node.start;
    for &child_idx in &node.children {
        let child = tree.node(child_idx);
        if child.start > cursor {
            out.push_str(&dialect.escape(tree.text(cursor, child.start)));
        }
        out.push_str(&render_span(tree, child_idx, dialect));
        cursor = child.end;
    }
    if cursor < node.end {
        out.push_str(&dialect.escape(tree.text(cursor, node.end)));
    }
    out
}

fn render_span(tree: &EntityTree<'_>, idx: usize, dialect: &dyn Dialect) -> String {
    let node = tree.node(idx);
    let raw = tree.text(node.start, node.end);
    let Some(span) = node.span else {
        return dialect.escape(raw);
    };
    let inner = if span.kind.is_code() {
        dialect.escape_code(raw)
    } else {
        render_contents(tree, idx, dialect)
    };
    dialect.wrap(span, &inner, raw)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            chunk::message_len,
            dialect::{DiscordMarkdown, TelegramHtml},
        },
        crossrelay_common::SpanKind,
        rstest::rstest,
    };

    #[test]
    fn empty_body_renders_empty() {
        let spans = vec![Span::new(SpanKind::Bold, 0, 3)];
        assert_eq!(render("", &spans, &DiscordMarkdown), "");
    }

    #[rstest]
    #[case("")]
    #[case("plain")]
    #[case("*not bold* _nor italic_ [x](y) `z`")]
    #[case("<b>html</b> & co")]
    fn no_spans_is_full_escape(#[case] body: &str) {
        assert_eq!(render(body, &[], &DiscordMarkdown), DiscordMarkdown.escape(body));
        assert_eq!(render(body, &[], &TelegramHtml), TelegramHtml.escape(body));
    }

    #[test]
    fn wraps_a_single_span() {
        let spans = vec![Span::new(SpanKind::Bold, 6, 11)];
        let expected = format!(
            "{}**{}**",
            DiscordMarkdown.escape("Hello "),
            DiscordMarkdown.escape("world")
        );
        assert_eq!(render("Hello world", &spans, &DiscordMarkdown), expected);
        assert_eq!(
            render("Hello world", &spans, &TelegramHtml),
            "Hello <b>world</b>"
        );
    }

    #[test]
    fn nested_spans_render_nested() {
        let spans = vec![
            Span::new(SpanKind::Bold, 6, 11),
            Span::new(SpanKind::Italic, 0, 11),
        ];
        assert_eq!(
            render("Hello world", &spans, &DiscordMarkdown),
            "*Hello **world***"
        );
        assert_eq!(
            render("Hello world", &spans, &TelegramHtml),
            "<i>Hello <b>world</b></i>"
        );
    }

    #[test]
    fn escapes_text_inside_and_between_spans() {
        let spans = vec![Span::new(SpanKind::Bold, 0, 3)];
        assert_eq!(render("a*b c_d", &spans, &DiscordMarkdown), "**a\\*b** c\\_d");
    }

    #[test]
    fn code_content_is_verbatim_except_backticks() {
        let body = "run `x` *now*";
        let spans = vec![
            Span::new(SpanKind::Code, 0, 13),
            Span::new(SpanKind::Bold, 8, 13),
        ];
        assert_eq!(
            render(body, &spans, &DiscordMarkdown),
            "`run \\`x\\` *now*`"
        );
    }

    #[test]
    fn html_code_still_escapes_entities() {
        let spans = vec![Span::new(SpanKind::Code, 0, 5)];
        assert_eq!(render("a<b>c", &spans, &TelegramHtml), "<code>a&lt;b&gt;c</code>");
    }

    #[test]
    fn text_link_uses_normalized_url() {
        let spans = vec![Span::new(SpanKind::TextLink, 0, 4).with_url("https://Example.com")];
        assert_eq!(
            render("docs!", &spans, &DiscordMarkdown),
            "[docs](https://example.com/)!"
        );
    }

    #[test]
    fn bare_url_span_becomes_link_target() {
        let body = "see https://e.com/a_b";
        let spans = vec![Span::new(SpanKind::Url, 4, 21)];
        assert_eq!(
            render(body, &spans, &DiscordMarkdown),
            "see https://e.com/a_b"
        );
        assert_eq!(
            render(body, &spans, &TelegramHtml),
            "see <a href=\"https://e.com/a_b\">https://e.com/a_b</a>"
        );
    }

    #[test]
    fn unknown_kind_passes_through() {
        let spans = vec![Span::new(SpanKind::Other, 0, 5)];
        assert_eq!(render("#tag!", &spans, &DiscordMarkdown), "\\#tag!");
    }

    #[test]
    fn crossing_span_leaves_text_unstyled() {
        let spans = vec![
            Span::new(SpanKind::Bold, 0, 5),
            Span::new(SpanKind::Italic, 3, 8),
        ];
        assert_eq!(render("abcdefgh", &spans, &TelegramHtml), "<b>abcde</b>fgh");
    }

    #[test]
    fn multibyte_offsets_are_codepoints() {
        let spans = vec![Span::new(SpanKind::Bold, 0, 4)];
        assert_eq!(render("żółw ok", &spans, &TelegramHtml), "<b>żółw</b> ok");
    }

    #[test]
    fn schemeless_url_keeps_its_text() {
        let body = "see www.example.com/path";
        let spans = vec![Span::new(SpanKind::Url, 4, 24)];
        assert_eq!(
            render(body, &spans, &DiscordMarkdown),
            "see www.example.com/path"
        );
        assert_eq!(
            render(body, &spans, &TelegramHtml),
            "see <a href=\"https://www.example.com/path\">www.example.com/path</a>"
        );
    }

    #[test]
    fn long_bold_body_chunks_into_balanced_html() {
        let body = "жжжжжжжжж ".repeat(600);
        let body = body.trim_end();
        let spans = vec![Span::new(SpanKind::Bold, 0, body.chars().count())];

        let chunks = render_chunks(body, &spans, &TelegramHtml, 4_096);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(message_len(chunk) <= 4_096);
            assert!(chunk.starts_with("<b>") && chunk.ends_with("</b>"));
            assert_eq!(chunk.matches("<b>").count(), 1);
            assert_eq!(chunk.matches("</b>").count(), 1);
        }
        let rejoined: Vec<&str> = chunks
            .iter()
            .map(|c| c.trim_start_matches("<b>").trim_end_matches("</b>"))
            .collect();
        assert_eq!(rejoined.join(" "), body);
    }

    #[test]
    fn chunks_shrink_when_escaping_grows_the_text() {
        let body = "*".repeat(30);
        let chunks = render_chunks(&body, &[], &DiscordMarkdown, 20);
        assert_eq!(chunks, vec!["\\*".repeat(10); 3]);
    }

    #[test]
    fn nested_spans_reopen_after_a_cut() {
        let body = "aaaa bbbb cccc";
        let spans = vec![
            Span::new(SpanKind::Italic, 0, 14),
            Span::new(SpanKind::Bold, 5, 9),
        ];
        let chunks = render_chunks(body, &spans, &TelegramHtml, 20);
        assert_eq!(chunks, [
            "<i>aaaa</i>",
            "<i><b>bbbb</b></i>",
            "<i>cccc</i>"
        ]);
    }

    #[test]
    fn short_body_is_a_single_chunk() {
        let spans = vec![Span::new(SpanKind::Bold, 6, 11)];
        assert_eq!(render_chunks("Hello world", &spans, &TelegramHtml, 4_096), [
            "Hello <b>world</b>"
        ]);
        assert!(render_chunks("", &spans, &TelegramHtml, 4_096).is_empty());
    }
}
