use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

/// HTTP methods the executor can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => http::Method::GET,
            Method::Head => http::Method::HEAD,
            Method::Post => http::Method::POST,
        }
    }
}

/// Per-request options.
///
/// Options never touch the client's default headers; the effective header
/// set is computed for each request.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use egress_fetch::{RequestOptions, accept};
///
/// let options = RequestOptions::default()
///     .accept_content(accept::JSON)
///     .header("X-Request-Id", "42")
///     .timeout(Duration::from_secs(5))
///     .max_content_length(1 << 20);
///
/// assert_eq!(options.headers.len(), 1);
/// assert_eq!(options.max_content_length, Some(1 << 20));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// JSON cookie jar read before and rewritten after the request.
    pub cookie_jar: Option<PathBuf>,

    /// Value of the `Accept` header. Overrides any `Accept` in `headers`.
    pub accept_content: Option<String>,

    /// Extra request headers. Win over client defaults with the same name.
    pub headers: Arc<[(String, String)]>,

    /// Total request timeout. Falls back to the client default.
    pub timeout: Option<Duration>,

    /// Abort when the response announces or delivers more bytes than this.
    pub max_content_length: Option<u64>,

    /// Request payload, sent with POST.
    pub body: Option<Bytes>,
}

impl RequestOptions {
    #[must_use]
    pub fn cookie_jar(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_jar = Some(path.into());
        self
    }

    #[must_use]
    pub fn accept_content(mut self, accept: impl Into<String>) -> Self {
        self.accept_content = Some(accept.into());
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers = self.headers.to_vec();
        headers.push((name.into(), value.into()));
        self.headers = headers.into();
        self
    }

    #[must_use]
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut merged = self.headers.to_vec();
        merged.extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self.headers = merged.into();
        self
    }

    /// A zero duration means "use the client default".
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// A zero limit means "unbounded".
    #[must_use]
    pub fn max_content_length(mut self, limit: u64) -> Self {
        self.max_content_length = (limit > 0).then_some(limit);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}
