use std::borrow::Cow;
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except the RFC 3986 unreserved characters.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Borrowed view of the top-level pieces of a URL string.
///
/// Splitting is textual so that reassembly reproduces the input exactly;
/// `url::Url` would canonicalize host case, default ports and empty paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UrlParts<'a> {
    /// Scheme, `://` and authority. Empty for scheme-less input.
    pub prefix:   &'a str,
    pub path:     &'a str,
    pub query:    Option<&'a str>,
    pub fragment: Option<&'a str>,
}

impl<'a> UrlParts<'a> {
    pub fn split(url: &'a str) -> Self {
        let (rest, fragment) = match url.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (url, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query)),
            None => (rest, None),
        };
        let path_start = match rest.find("://") {
            Some(at) => {
                let authority = at + 3;
                rest[authority..].find('/').map_or(rest.len(), |slash| authority + slash)
            }
            None => 0,
        };
        let (prefix, path) = rest.split_at(path_start);

        Self {
            prefix,
            path,
            query,
            fragment,
        }
    }
}

impl fmt::Display for UrlParts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix)?;
        f.write_str(self.path)?;
        if let Some(query) = self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

/// Percent-encode every path segment that contains non-ASCII characters.
///
/// Segments that are already ASCII are left untouched, so the function is a
/// no-op on ASCII paths. Input that does not parse as an absolute URL, or
/// has no `//` authority (`mailto:`, `data:`), is returned unchanged.
///
/// # Examples
///
/// ```
/// use egress_policy::normalize;
///
/// assert_eq!(
///     normalize("https://example.com/wiki/Zürich?lang=de"),
///     "https://example.com/wiki/Z%C3%BCrich?lang=de"
/// );
/// assert_eq!(normalize("https://example.com/a/b"), "https://example.com/a/b");
/// assert_eq!(normalize("not a url"), "not a url");
/// ```
pub fn normalize(url: &str) -> String {
    if url::Url::parse(url).is_err() {
        return url.to_string();
    }

    let parts = UrlParts::split(url);
    if parts.prefix.is_empty() || parts.path.is_ascii() {
        return url.to_string();
    }

    let path = parts
        .path
        .split('/')
        .map(|segment| {
            if segment.is_ascii() {
                Cow::Borrowed(segment)
            } else {
                Cow::Owned(utf8_percent_encode(segment, SEGMENT).to_string())
            }
        })
        .collect::<Vec<_>>()
        .join("/");

    UrlParts { path: &path, ..parts }.to_string()
}
