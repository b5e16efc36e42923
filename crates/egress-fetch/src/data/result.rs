use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;
use http::HeaderMap;
use http::header::CONTENT_TYPE;

use super::transfer::{TransportResponse, header_str, redirect_url};
use crate::core::is_redirect;
use crate::error::TransportError;

/// Why a request produced no complete response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Rejected before dispatch: the URL was too long.
    UrlTooLong,
    /// Rejected before dispatch: the host is on the denylist.
    Blocked,
    Timeout,
    Connect,
    /// The response was larger than the configured limit.
    TooLarge,
    /// The connection broke after the status line arrived.
    Interrupted,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::UrlTooLong => "url too long",
            FailureKind::Blocked => "blocked",
            FailureKind::Timeout => "timeout",
            FailureKind::Connect => "connect",
            FailureKind::TooLarge => "too large",
            FailureKind::Interrupted => "interrupted",
            FailureKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Outcome of one HTTP exchange.
///
/// `Success` means a complete response was received; its status may still be
/// an HTTP error. `Failure` covers everything else, with status `0` when the
/// server was never reached and an empty body in every case. Both shapes are
/// read through the same accessors.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Success {
        url:     String,
        status:  u16,
        headers: HeaderMap,
        body:    Bytes,
    },
    Failure {
        url:     String,
        status:  u16,
        headers: HeaderMap,
        kind:    FailureKind,
        message: String,
    },
}

impl FetchResult {
    /// Failure for a request that was refused before any network activity.
    pub fn rejected(url: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        FetchResult::Failure {
            url: url.into(),
            status: 0,
            headers: HeaderMap::new(),
            kind,
            message: message.into(),
        }
    }

    /// Failure for a transport error, keeping the partial status and headers when present.
    pub fn from_transport_error(url: impl Into<String>, error: &TransportError) -> Self {
        let (url, status, headers) = match error.head() {
            Some(head) => (head.url.clone(), head.status, head.headers.clone()),
            None => (url.into(), 0, HeaderMap::new()),
        };
        FetchResult::Failure {
            url,
            status,
            headers,
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FetchResult::Success { url, .. } | FetchResult::Failure { url, .. } => url.as_str(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            FetchResult::Success { status, .. } | FetchResult::Failure { status, .. } => *status,
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        match self {
            FetchResult::Success { headers, .. } | FetchResult::Failure { headers, .. } => headers,
        }
    }

    /// First value of the header `name`, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> { header_str(self.headers(), name) }

    /// All values of the header `name` in the order received.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers()
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect()
    }

    pub fn in_header(&self, name: &str) -> bool { self.headers().contains_key(name) }

    pub fn content_type(&self) -> Option<&str> { self.header(CONTENT_TYPE.as_str()) }

    pub fn body(&self) -> &[u8] {
        match self {
            FetchResult::Success { body, .. } => &body[..],
            FetchResult::Failure { .. } => &[],
        }
    }

    pub fn body_string(&self) -> Cow<'_, str> { String::from_utf8_lossy(self.body()) }

    pub fn into_body(self) -> Bytes {
        match self {
            FetchResult::Success { body, .. } => body,
            FetchResult::Failure { .. } => Bytes::new(),
        }
    }

    /// `true` for failures and for statuses outside `200..=399`.
    pub fn is_error(&self) -> bool {
        match self {
            FetchResult::Success { status, .. } => !(200..=399).contains(status),
            FetchResult::Failure { .. } => true,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success { status, .. } if (200..=299).contains(status))
    }

    /// Redirect status with a usable `Location`.
    pub fn is_redirect(&self) -> bool { is_redirect(self.status_code()) && self.redirect_url().is_some() }

    /// `Location` resolved against [`url`](Self::url).
    pub fn redirect_url(&self) -> Option<String> { redirect_url(self.url(), self.headers()) }

    pub fn is_timeout(&self) -> bool { self.failure_kind() == Some(FailureKind::Timeout) }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            FetchResult::Success { .. } => None,
            FetchResult::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FetchResult::Success { .. } => None,
            FetchResult::Failure { message, .. } => Some(message.as_str()),
        }
    }
}

impl From<TransportResponse> for FetchResult {
    fn from(response: TransportResponse) -> Self {
        FetchResult::Success {
            url:     response.url,
            status:  response.status,
            headers: response.headers,
            body:    response.body,
        }
    }
}
