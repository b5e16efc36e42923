/// URLs longer than this (in characters) are refused without a request.
pub const MAX_URL_LENGTH: usize = 1000;

/// Characters of an over-long URL kept in the error result.
pub const TRUNCATED_URL_LENGTH: usize = 200;

/// Returns `true` if the HTTP status code indicates a redirect.
///
/// # Recognized Redirect Codes
///
/// - 301: Moved Permanently
/// - 302: Found
/// - 303: See Other
/// - 307: Temporary Redirect
/// - 308: Permanent Redirect
///
/// # Examples
///
/// ```
/// use egress_fetch::core::is_redirect;
///
/// assert!(is_redirect(301));
/// assert!(is_redirect(308));
/// assert!(!is_redirect(200));
/// assert!(!is_redirect(304));
/// ```
pub fn is_redirect(status: u16) -> bool { matches!(status, 301 | 302 | 303 | 307 | 308) }

/// Redirect codes the final-URL resolver follows: 301 and 302 only.
pub fn is_followed_redirect(status: u16) -> bool { matches!(status, 301 | 302) }

pub fn url_too_long(url: &str) -> bool { url.chars().nth(MAX_URL_LENGTH).is_some() }

pub fn truncate_url(url: &str) -> String { url.chars().take(TRUNCATED_URL_LENGTH).collect() }

/// Case-insensitive check for `html` anywhere in a content type.
pub fn is_html(content_type: &str) -> bool { content_type.to_ascii_lowercase().contains("html") }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_redirect_all_codes() {
        for status in [301, 302, 303, 307, 308] {
            assert!(is_redirect(status), "{status}");
        }
        for status in [200, 204, 300, 304, 305, 404, 500] {
            assert!(!is_redirect(status), "{status}");
        }
    }

    #[test]
    fn test_followed_redirects_are_a_subset() {
        assert!(is_followed_redirect(301));
        assert!(is_followed_redirect(302));
        assert!(!is_followed_redirect(303));
        assert!(!is_followed_redirect(307));
        assert!(!is_followed_redirect(308));
    }

    #[test]
    fn test_url_length_boundary() {
        let base = "https://example.com/";
        let exact = format!("{base}{}", "a".repeat(MAX_URL_LENGTH - base.len()));
        assert_eq!(exact.len(), MAX_URL_LENGTH);
        assert!(!url_too_long(&exact));
        assert!(url_too_long(&format!("{exact}a")));
    }

    #[test]
    fn test_length_counts_characters() {
        let url = format!("https://example.com/{}", "ü".repeat(900));
        assert!(url.len() > MAX_URL_LENGTH);
        assert!(!url_too_long(&url));
    }

    #[test]
    fn test_truncate_url() {
        let long = "x".repeat(5000);
        assert_eq!(truncate_url(&long).len(), TRUNCATED_URL_LENGTH);
        assert_eq!(truncate_url("short"), "short");
        assert_eq!(truncate_url(&"é".repeat(300)).chars().count(), TRUNCATED_URL_LENGTH);
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("text/html"));
        assert!(is_html("TEXT/HTML; charset=UTF-8"));
        assert!(is_html("application/xhtml+xml"));
        assert!(!is_html("application/json"));
        assert!(!is_html("image/png"));
    }
}
