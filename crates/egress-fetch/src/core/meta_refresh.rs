use scraper::{Html, Selector};

/// Target of the first `<meta http-equiv="refresh">` that names a URL.
///
/// Parsing is tolerant: malformed markup simply yields no target.
///
/// ```
/// use egress_fetch::core::find_refresh_target;
///
/// let html = r#"<html><head><meta http-equiv="refresh" content="0; url=https://example.com/next"></head></html>"#;
/// assert_eq!(find_refresh_target(html).as_deref(), Some("https://example.com/next"));
/// assert_eq!(find_refresh_target("<p>no refresh</p>"), None);
/// ```
pub fn find_refresh_target(html: &str) -> Option<String> {
    let selector = Selector::parse("meta[content]").ok()?;
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter(|meta| {
            meta.value()
                .attr("http-equiv")
                .is_some_and(|equiv| equiv.trim().eq_ignore_ascii_case("refresh"))
        })
        .find_map(|meta| meta.value().attr("content").and_then(refresh_url))
}

/// URL named by a refresh `content` value such as `5; URL='/next'`.
///
/// The first `;`-separated piece starting with `url=` (any case) wins. The
/// target is trimmed of whitespace and quotes; an empty target is `None`.
pub fn refresh_url(content: &str) -> Option<String> {
    content
        .split(';')
        .map(str::trim_start)
        .find_map(|piece| {
            let prefix = piece.get(..4)?;
            prefix.eq_ignore_ascii_case("url=").then(|| &piece[4..])
        })
        .map(|target| target.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|target| !target.is_empty())
        .map(str::to_string)
}
