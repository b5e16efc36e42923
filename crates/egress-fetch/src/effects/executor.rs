use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use egress_policy::{Policy, normalize};
use http::HeaderValue;
use http::header::{ACCEPT, COOKIE};
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use super::cookies::FileCookieJar;
use super::profiler::{NETWORK, Profiler, Recording};
use super::transport::HttpTransport;
use crate::core::{MAX_URL_LENGTH, effective_headers, truncate_url, url_too_long};
use crate::data::{FailureKind, FetchResult, Method, RequestOptions, TransportRequest, TransportResponse, accept};
use crate::error::TransportError;

/// Timeout applied when neither the options nor the configuration name one.
pub(crate) const FALLBACK_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs single requests through the safety checks and the transport.
///
/// Every outcome, including refusals and network failures, is returned as a
/// [`FetchResult`]; nothing is retried.
pub struct RequestExecutor<T> {
    transport:       Arc<T>,
    policy:          Arc<Policy>,
    profiler:        Arc<dyn Profiler>,
    default_headers: Arc<[(String, String)]>,
    default_timeout: Duration,
}

impl<T: HttpTransport> RequestExecutor<T> {
    pub fn new(transport: Arc<T>, policy: Arc<Policy>, profiler: Arc<dyn Profiler>) -> Self {
        Self {
            transport,
            policy,
            profiler,
            default_headers: Arc::from([]),
            default_timeout: FALLBACK_TIMEOUT,
        }
    }

    /// Headers sent with every request unless the caller overrides them.
    #[must_use]
    pub fn with_default_headers(mut self, headers: Arc<[(String, String)]>) -> Self {
        self.default_headers = headers;
        self
    }

    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn policy(&self) -> &Policy { &self.policy }

    pub fn transport(&self) -> &T { &self.transport }

    pub async fn get(&self, url: &str, options: RequestOptions) -> FetchResult {
        self.request(Method::Get, url, options).await
    }

    pub async fn head(&self, url: &str, options: RequestOptions) -> FetchResult {
        self.request(Method::Head, url, options).await
    }

    /// POST `payload` serialized as JSON.
    ///
    /// `Content-Type: application/json` is added unless the options already
    /// carry a content type. Any `body` in `options` is replaced.
    pub async fn post<P>(&self, url: &str, payload: &P, options: RequestOptions) -> FetchResult
    where
        P: Serialize + ?Sized,
    {
        let body = match serde_json::to_vec(payload) {
            Ok(body) => body,
            Err(e) => {
                return FetchResult::rejected(
                    truncate_url(url),
                    FailureKind::Other,
                    format!("failed to serialize payload: {e}"),
                );
            }
        };

        let has_content_type = options
            .headers
            .iter()
            .any(|(name, _)| name.trim().eq_ignore_ascii_case("content-type"));
        let options = if has_content_type {
            options
        } else {
            options.header("Content-Type", "application/json")
        };

        self.request(Method::Post, url, options.body(body)).await
    }

    /// Send one request.
    ///
    /// URLs over the length limit and blocked hosts are refused without any
    /// network activity. A request body is only sent with POST.
    pub async fn request(&self, method: Method, url: &str, options: RequestOptions) -> FetchResult {
        let _recording = Recording::start(self.profiler.as_ref(), NETWORK);

        if self.policy.is_local_link(url) {
            info!(%url, %method, "request to local link");
        }

        if url_too_long(url) {
            let url = truncate_url(url);
            debug!(%url, %method, "refusing over-long URL");
            return FetchResult::rejected(
                url,
                FailureKind::UrlTooLong,
                format!("URL exceeds {MAX_URL_LENGTH} characters"),
            );
        }

        let url = normalize(url);
        if self.policy.is_blocked(&url) {
            info!(%url, %method, "domain is blocked");
            return FetchResult::rejected(url, FailureKind::Blocked, "domain is blocked");
        }

        let mut headers = match effective_headers(&self.default_headers, &options) {
            Ok(headers) => headers,
            Err(error) => return FetchResult::from_transport_error(url, &error),
        };
        if method != Method::Post && !headers.contains_key(ACCEPT) {
            info!(%url, %method, "no Accept header given, using */*");
            headers.insert(ACCEPT, HeaderValue::from_static(accept::DEFAULT));
        }

        let mut jar = match &options.cookie_jar {
            Some(path) => open_jar(path).await,
            None => None,
        };
        if let Some(jar) = &jar {
            let cookie = Url::parse(&url).ok().and_then(|parsed| jar.request_header(&parsed));
            if let Some(value) = cookie.and_then(|c| HeaderValue::try_from(c).ok()) {
                headers.append(COOKIE, value);
            }
        }

        let request = TransportRequest {
            method,
            url: url.clone(),
            headers,
            body: if method == Method::Post { options.body } else { None },
            timeout: Some(options.timeout.unwrap_or(self.default_timeout)),
            follow_redirects: true,
            max_content_length: options.max_content_length,
        };

        debug!(%url, %method, "sending request");
        let outcome = self.transport.send(request).await;

        if let Some(jar) = jar.as_mut() {
            store_cookies(jar, &url, &outcome).await;
        }

        match outcome {
            Ok(response) => {
                debug!(url = %response.url, %method, status = response.status, "request finished");
                FetchResult::from(response)
            }
            Err(error) => {
                debug!(%url, %method, %error, "request failed");
                FetchResult::from_transport_error(url, &error)
            }
        }
    }
}

async fn open_jar(path: &Path) -> Option<FileCookieJar> {
    match FileCookieJar::open(path).await {
        Ok(jar) => Some(jar),
        Err(error) => {
            warn!(path = %path.display(), %error, "cannot read cookie jar");
            None
        }
    }
}

async fn store_cookies(
    jar: &mut FileCookieJar,
    request_url: &str,
    outcome: &Result<TransportResponse, TransportError>,
) {
    let (origin, headers) = match outcome {
        Ok(response) => (response.url.as_str(), &response.headers),
        Err(error) => match error.head() {
            Some(head) => (head.url.as_str(), &head.headers),
            None => return,
        },
    };
    let Ok(origin) = Url::parse(origin).or_else(|_| Url::parse(request_url)) else {
        return;
    };

    if jar.store_response_cookies(&origin, headers) > 0 {
        if let Err(error) = jar.save().await {
            warn!(path = %jar.path().display(), %error, "cannot write cookie jar");
        }
    }
}
