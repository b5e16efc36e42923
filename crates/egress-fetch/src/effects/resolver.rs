use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use egress_policy::{Policy, normalize};
use http::HeaderValue;
use http::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use tracing::{debug, info};

use super::profiler::{NETWORK, Profiler, Recording};
use super::transport::HttpTransport;
use crate::core::{RedirectState, find_refresh_target, is_followed_redirect, is_html, resolve_target, trim_quotes};
use crate::data::transfer::{content_length, header_str, redirect_url};
use crate::data::{Method, TransportRequest, TransportResponse, accept};
use crate::error::{ResponseHead, TransportError};

/// Connect allowance of one probe, applied by the transport's direct pool.
pub const PROBE_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Allowance between two reads of one probe, applied like the connect one.
pub const PROBE_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest body a probe reads when scanning for a meta refresh.
pub const PROBE_BODY_LIMIT: u64 = 1_000_000;

enum Step {
    Next(RedirectState),
    Done(String),
}

/// Follows HTTP and meta-refresh redirects to the final URL.
///
/// Resolution never fails: every way out, including network errors, blocked
/// hosts and the depth ceiling, yields the best URL known at that point.
///
/// Each hop runs the policy checks, strips tracking parameters and then
/// probes the URL with redirects disabled: first header-only, then, if the
/// headers named no redirect, once more reading at most
/// [`PROBE_BODY_LIMIT`] bytes of HTML to look for a
/// `<meta http-equiv="refresh">`.
pub struct RedirectResolver<T> {
    transport: Arc<T>,
    policy:    Arc<Policy>,
    profiler:  Arc<dyn Profiler>,
}

impl<T: HttpTransport> RedirectResolver<T> {
    pub fn new(transport: Arc<T>, policy: Arc<Policy>, profiler: Arc<dyn Profiler>) -> Self {
        Self {
            transport,
            policy,
            profiler,
        }
    }

    pub fn policy(&self) -> &Policy { &self.policy }

    /// Resolve `url` to the last URL reachable by redirects.
    pub async fn resolve(&self, url: &str) -> String {
        let mut state = RedirectState::new(url);
        loop {
            match self.step(state).await {
                Step::Next(next) => state = next,
                Step::Done(url) => return url,
            }
        }
    }

    async fn step(&self, mut state: RedirectState) -> Step {
        if self.policy.is_local_link(&state.url) {
            info!(url = %state.url, "resolving local link");
        }
        if self.refused(&state.url) {
            return Step::Done(state.url);
        }

        state.url = self.policy.strip_tracking_params(&state.url);
        if state.exhausted() {
            debug!(url = %state.url, depth = state.depth, "redirect depth exhausted");
            return Step::Done(state.url);
        }

        // A quoted URL does not parse, so the checks above saw no host.
        let trimmed = trim_quotes(&state.url);
        if trimmed.len() != state.url.len() {
            state.url = trimmed.to_string();
            if self.refused(&state.url) {
                return Step::Done(state.url);
            }
        }

        let (head, body) = match self.probe(&state).await {
            Ok(response) => {
                let head = response.head();
                (head, Some(response.body))
            }
            // Oversized responses may still carry a redirect in their headers.
            Err(TransportError::TooLarge { head: Some(head), .. }) => (head, None),
            Err(error) => {
                debug!(url = %state.url, depth = state.depth, %error, "probe failed");
                return Step::Done(state.url);
            }
        };
        debug!(
            url = %state.url,
            depth = state.depth,
            status = head.status,
            body = state.have_fetched_body,
            "probed"
        );
        if head.status == 0 {
            return Step::Done(state.url);
        }

        if is_followed_redirect(head.status) {
            if let Some(target) = redirect_target(&head) {
                return Step::Next(state.follow(target));
            }
        }
        if !state.have_fetched_body {
            return Step::Next(state.fetch_body());
        }

        let Some(body) = body else {
            debug!(url = %state.url, "response too large to scan");
            return Step::Done(state.url);
        };
        match scan_page(&head, &body) {
            Some(target) => {
                let target = resolve_target(&state.url, &target);
                Step::Next(state.refresh(target))
            }
            None => Step::Done(state.url),
        }
    }

    fn refused(&self, url: &str) -> bool {
        if self.policy.is_blocked(url) {
            info!(url, "domain is blocked");
            return true;
        }
        if self.policy.is_redirect_blocked(url) {
            info!(url, "domain is blocked for redirects");
            return true;
        }
        false
    }

    async fn probe(&self, state: &RedirectState) -> Result<TransportResponse, TransportError> {
        let method = if state.have_fetched_body { Method::Get } else { Method::Head };
        let mut request = TransportRequest::new(method, normalize(&state.url));
        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static(accept::DEFAULT));
        // Connect and read allowances belong to the transport's direct pool.
        request.timeout = None;
        request.follow_redirects = false;
        if state.have_fetched_body {
            request.max_content_length = Some(PROBE_BODY_LIMIT);
        }

        let _recording = Recording::start(self.profiler.as_ref(), NETWORK);
        self.transport.send(request).await
    }
}

/// `Location` resolved against the response URL, else the raw value.
fn redirect_target(head: &ResponseHead) -> Option<String> {
    redirect_url(&head.url, &head.headers).or_else(|| {
        header_str(&head.headers, LOCATION.as_str())
            .map(str::trim)
            .filter(|location| !location.is_empty())
            .map(str::to_string)
    })
}

/// Meta-refresh target of an HTML page that is small enough to read.
fn scan_page(head: &ResponseHead, body: &Bytes) -> Option<String> {
    if content_length(&head.headers).is_some_and(|declared| declared > PROBE_BODY_LIMIT) {
        return None;
    }
    if let Some(content_type) = header_str(&head.headers, CONTENT_TYPE.as_str()) {
        if !is_html(content_type) {
            return None;
        }
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    find_refresh_target(&String::from_utf8_lossy(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{MockTransport, TracingProfiler};

    fn resolver(transport: MockTransport) -> RedirectResolver<MockTransport> {
        RedirectResolver::new(Arc::new(transport), Arc::new(Policy::default()), Arc::new(TracingProfiler))
    }

    fn html(url: &str, body: &str) -> TransportResponse {
        TransportResponse::new(url, 200)
            .with_header("Content-Type", "text/html")
            .with_body(body.to_string())
    }

    #[tokio::test]
    async fn plain_page_resolves_to_itself() {
        let resolver = resolver(MockTransport::new().route(
            Method::Get,
            "https://a.test/",
            html("https://a.test/", "<p>hello</p>"),
        ));

        assert_eq!(resolver.resolve("https://a.test/").await, "https://a.test/");
        let methods: Vec<_> = resolver.transport.calls().iter().map(|c| c.method).collect();
        assert_eq!(methods, [Method::Head, Method::Get]);
    }

    #[tokio::test]
    async fn probes_never_follow_redirects_themselves() {
        let resolver = resolver(MockTransport::new().route(
            Method::Get,
            "https://a.test/",
            html("https://a.test/", ""),
        ));
        resolver.resolve("https://a.test/").await;

        for call in resolver.transport.calls() {
            assert!(!call.follow_redirects);
            assert_eq!(call.timeout, None);
        }
        assert_eq!(resolver.transport.calls()[1].max_content_length, Some(PROBE_BODY_LIMIT));
    }

    #[test]
    fn raw_location_is_used_when_unresolvable() {
        let head = TransportResponse::new("not-a-url", 302)
            .with_header("Location", "https://b.test/")
            .head();
        assert_eq!(redirect_target(&head).as_deref(), Some("https://b.test/"));

        let head = TransportResponse::new("not-a-url", 302)
            .with_header("Location", "relative")
            .head();
        assert_eq!(redirect_target(&head).as_deref(), Some("relative"));
    }

    #[test]
    fn scan_page_rules() {
        let head = html("https://a.test/", "").head();
        let refresh = Bytes::from_static(br#"<meta http-equiv="refresh" content="0;url=/x">"#);

        assert_eq!(scan_page(&head, &refresh).as_deref(), Some("/x"));
        assert_eq!(scan_page(&head, &Bytes::from_static(b"  \n\t ")), None);

        let json = TransportResponse::new("https://a.test/", 200)
            .with_header("Content-Type", "application/json")
            .head();
        assert_eq!(scan_page(&json, &refresh), None);

        let untyped = TransportResponse::new("https://a.test/", 200).head();
        assert_eq!(scan_page(&untyped, &refresh).as_deref(), Some("/x"));

        let huge = TransportResponse::new("https://a.test/", 200)
            .with_header("Content-Length", "1000001")
            .head();
        assert_eq!(scan_page(&huge, &refresh), None);
    }
}
