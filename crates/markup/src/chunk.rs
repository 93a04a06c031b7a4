//! Splitting text to fit destination size limits.
//!
//! Lengths are counted in UTF-16 code units, which is how Telegram counts its
//! limit. For Discord, which counts characters, the figure is never lower
//! than the real one.

/// Length of `text` as destination size limits count it.
#[must_use]
pub fn message_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Split text into chunks of at most `max_len` units (see [`message_len`]).
///
/// Prefers to split at a newline, then at a space, and only then inside a
/// word. Never splits inside a character. Works on plain text only: cutting
/// rendered markup this way can leave a tag open, so styled bodies go through
/// [`crate::render_chunks`] instead.
#[must_use]
pub fn chunk_message(text: &str, max_len: usize) -> Vec<String> {
    if max_len == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let split_at = split_point(remaining, max_len);
        chunks.push(remaining[..split_at].to_string());
        remaining = skip_separator(&remaining[split_at..]);
    }
    chunks
}

/// Byte offset at which to cut `text` so the head fits in `max_len` units.
///
/// `text.len()` when everything fits. Otherwise the last newline in the
/// window, else the last space, else the last character that fits. The head
/// always holds at least one character.
pub(crate) fn split_point(text: &str, max_len: usize) -> usize {
    let mut window_end = fit_prefix(text, max_len);
    if window_end == text.len() {
        return window_end;
    }
    if window_end == 0 {
        window_end = text.chars().next().map_or(text.len(), char::len_utf8);
    }

    let window = &text[..window_end];
    match window.rfind('\n').or_else(|| window.rfind(' ')) {
        Some(0) | None => window_end,
        Some(pos) => pos,
    }
}

/// Drop the separator a split left at the start of the remainder.
pub(crate) fn skip_separator(rest: &str) -> &str {
    let rest = rest.trim_start_matches('\n');
    rest.strip_prefix(' ').unwrap_or(rest)
}

fn fit_prefix(text: &str, max_len: usize) -> usize {
    let mut used = 0;
    for (idx, ch) in text.char_indices() {
        used += ch.len_utf16();
        if used > max_len {
            return idx;
        }
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_is_one_chunk() {
        assert_eq!(chunk_message("hello", 100), vec!["hello"]);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_message("", 100).is_empty());
    }

    #[test]
    fn splits_at_newline() {
        let chunks = chunk_message("line1\nline2\nline3", 10);
        assert_eq!(chunks, vec!["line1", "line2", "line3"]);
    }

    #[test]
    fn splits_at_space() {
        let chunks = chunk_message("hello world foo bar", 10);
        assert_eq!(chunks, vec!["hello", "world foo", "bar"]);
    }

    #[test]
    fn hard_splits_long_words() {
        let chunks = chunk_message("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn zero_limit_yields_nothing() {
        assert!(chunk_message("abc", 0).is_empty());
    }

    #[test]
    fn non_latin_text_counts_characters_not_bytes() {
        let text = "ж".repeat(4_000);
        assert_eq!(message_len(&text), 4_000);
        assert_eq!(chunk_message(&text, 4_096).len(), 1);
    }

    #[test]
    fn astral_characters_count_twice() {
        assert_eq!(message_len("a😀"), 3);
        assert_eq!(chunk_message("😀😀😀", 4), vec!["😀😀", "😀"]);
    }

    #[test]
    fn chunk_respects_char_boundary() {
        let text = format!("{}лz", "a".repeat(1999));
        let chunks = chunk_message(&text, 2000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(message_len(&chunks[0]), 2000);
        assert!(chunks[0].ends_with('л'));
        assert_eq!(chunks[1], "z");
    }
}
