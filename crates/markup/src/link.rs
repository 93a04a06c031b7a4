use url::Url;

/// Canonicalize a link target before it is embedded in markup.
///
/// Parseable absolute URLs are reserialized (which percent-encodes spaces,
/// quotes and non-ASCII). Anything else is percent-encoded wholesale so it
/// cannot break out of the surrounding markup.
#[must_use]
pub fn normalize_url(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(url) => url.to_string(),
        Err(_) => urlencoding::encode(raw).into_owned(),
    }
}

/// Link target for a bare URL as it was typed. Messages often carry URLs
/// without a scheme (`www.example.com/a`); `https` is assumed for those.
/// `None` when the text is not a URL even then.
#[must_use]
pub fn bare_url_target(raw: &str) -> Option<String> {
    let raw = raw.trim();
    Url::parse(raw)
        .or_else(|_| Url::parse(&format!("https://{raw}")))
        .ok()
        .map(|url| url.to_string())
}

/// Whether `raw` is an absolute URL, scheme included.
#[must_use]
pub fn has_scheme(raw: &str) -> bool {
    Url::parse(raw.trim()).is_ok()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("https://example.com", "https://example.com/")]
    #[case(" https://example.com/a b ", "https://example.com/a%20b")]
    #[case("HTTPS://Example.COM/Path", "https://example.com/Path")]
    #[case("tg://user?id=42", "tg://user?id=42")]
    #[case("not a url", "not%20a%20url")]
    #[case("example.com/x", "example.com%2Fx")]
    fn normalizes(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_url(raw), expected);
    }

    #[rstest]
    #[case("https://e.com/a", Some("https://e.com/a"))]
    #[case("www.example.com/path", Some("https://www.example.com/path"))]
    #[case("example.org", Some("https://example.org/"))]
    #[case("not a url", None)]
    fn bare_urls_get_a_scheme(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(bare_url_target(raw).as_deref(), expected);
    }
}
