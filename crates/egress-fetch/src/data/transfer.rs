//! Raw exchange types passed between the executor, the resolver and a transport.

use std::time::Duration;

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use http::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use super::options::Method;
use crate::error::ResponseHead;

/// One request as handed to an [`HttpTransport`](crate::HttpTransport).
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method:             Method,
    pub url:                String,
    pub headers:            HeaderMap,
    pub body:               Option<Bytes>,
    pub timeout:            Option<Duration>,
    /// Whether the transport may follow 3xx responses on its own.
    pub follow_redirects:   bool,
    /// Byte ceiling for the body, checked against `Content-Length` and while streaming.
    pub max_content_length: Option<u64>,
}

impl TransportRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
            follow_redirects: true,
            max_content_length: None,
        }
    }
}

/// A fully received response.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// URL that produced the response, after any transport-level redirects.
    pub url:     String,
    pub status:  u16,
    pub headers: HeaderMap,
    pub body:    Bytes,
}

impl TransportResponse {
    pub fn new(url: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn from_head(head: ResponseHead, body: Bytes) -> Self {
        Self {
            url: head.url,
            status: head.status,
            headers: head.headers,
            body,
        }
    }

    /// Append a header. Names or values that are not valid HTTP are skipped.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            self.headers.append(name, value);
        }
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn head(&self) -> ResponseHead {
        ResponseHead {
            url:     self.url.clone(),
            status:  self.status,
            headers: self.headers.clone(),
        }
    }

    pub fn content_length(&self) -> Option<u64> { content_length(&self.headers) }

    pub fn content_type(&self) -> Option<&str> { header_str(&self.headers, CONTENT_TYPE.as_str()) }

    pub fn location(&self) -> Option<&str> { header_str(&self.headers, LOCATION.as_str()) }

    /// `Location` resolved against the response URL.
    pub fn redirect_url(&self) -> Option<String> { redirect_url(&self.url, &self.headers) }
}

/// First value of `name` that is valid visible ASCII.
pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

pub(crate) fn content_length(headers: &HeaderMap) -> Option<u64> {
    header_str(headers, CONTENT_LENGTH.as_str()).and_then(|value| value.trim().parse().ok())
}

pub(crate) fn redirect_url(base: &str, headers: &HeaderMap) -> Option<String> {
    let location = header_str(headers, LOCATION.as_str())?.trim();
    if location.is_empty() {
        return None;
    }
    let base = Url::parse(base).ok()?;
    base.join(location).ok().map(String::from)
}
