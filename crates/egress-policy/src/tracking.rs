use percent_encoding::percent_decode_str;

use crate::normalize::UrlParts;

/// Query parameters removed by [`Policy::default`](crate::Policy::default).
pub const DEFAULT_TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_term",
    "utm_content",
    "utm_campaign",
    "mtm_source",
    "mtm_medium",
    "mtm_term",
    "mtm_content",
    "mtm_campaign",
    "wt_mc",
    "pk_campaign",
    "pk_kwd",
    "mc_cid",
    "mc_eid",
    "fb_action_ids",
    "fb_action_types",
    "fb_ref",
    "awesm",
    "wtrid",
    "woo_campaign",
    "woo_source",
    "woo_medium",
    "woo_content",
    "woo_term",
    "gclid",
    "fbclid",
];

fn is_tracking(pair: &str, names: &[String]) -> bool {
    let key = pair.split_once('=').map_or(pair, |(key, _)| key);
    let key = percent_decode_str(key).decode_utf8_lossy();
    names.iter().any(|name| name.eq_ignore_ascii_case(&key))
}

/// Remove every query pair whose key is in `names`.
///
/// The URL is returned byte-for-byte unchanged when nothing matches. When
/// something is removed, empty pairs are dropped too and a query left empty
/// loses its `?`. Both rules keep the operation idempotent.
pub(crate) fn strip(url: &str, names: &[String]) -> String {
    let parts = UrlParts::split(url);
    let Some(query) = parts.query else {
        return url.to_string();
    };
    if !query.split('&').any(|pair| is_tracking(pair, names)) {
        return url.to_string();
    }

    let kept = query
        .split('&')
        .filter(|pair| !pair.is_empty() && !is_tracking(pair, names))
        .collect::<Vec<_>>()
        .join("&");

    UrlParts {
        query: (!kept.is_empty()).then_some(kept.as_str()),
        ..parts
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> { DEFAULT_TRACKING_PARAMS.iter().map(|s| s.to_string()).collect() }

    #[test]
    fn strips_tracking_and_keeps_order() {
        assert_eq!(
            strip("https://example.com/a?b=2&utm_source=feed&a=1&fbclid=x", &defaults()),
            "https://example.com/a?b=2&a=1"
        );
    }

    #[test]
    fn drops_question_mark_when_query_empties() {
        assert_eq!(
            strip("https://example.com/a?utm_source=x&utm_medium=y", &defaults()),
            "https://example.com/a"
        );
    }

    #[test]
    fn keeps_fragment() {
        assert_eq!(
            strip("https://example.com/?utm_campaign=spring&id=7#comments", &defaults()),
            "https://example.com/?id=7#comments"
        );
    }

    #[test]
    fn matches_encoded_and_uppercase_keys() {
        assert_eq!(
            strip("https://example.com/?UTM_Source=x&utm%5Fmedium=y&q=1", &defaults()),
            "https://example.com/?q=1"
        );
    }

    #[test]
    fn key_without_value_is_stripped() {
        assert_eq!(strip("https://example.com/?gclid&q=1", &defaults()), "https://example.com/?q=1");
    }

    #[test]
    fn untouched_url_is_returned_verbatim() {
        for url in [
            "https://example.com/",
            "https://example.com/?",
            "https://example.com/?a=1&&b=2",
            "https://example.com/?utm=not-a-tracker",
            "https://example.com/#?utm_source=in-fragment",
        ] {
            assert_eq!(strip(url, &defaults()), url);
        }
    }

    #[test]
    fn only_exact_names_match() {
        assert_eq!(
            strip("https://example.com/?utm_sourcex=1&xutm_source=2", &defaults()),
            "https://example.com/?utm_sourcex=1&xutm_source=2"
        );
    }

    #[test]
    fn custom_names() {
        let names = vec!["ref".to_string()];
        assert_eq!(
            strip("https://example.com/?ref=hn&utm_source=x", &names),
            "https://example.com/?utm_source=x"
        );
    }

    #[test]
    fn idempotent_on_messy_query() {
        let once = strip("https://example.com/?&utm_source=a&&b=1&", &defaults());
        assert_eq!(once, "https://example.com/?b=1");
        assert_eq!(strip(&once, &defaults()), once);
    }
}
