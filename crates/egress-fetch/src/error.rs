//! Error types for egress-fetch.

use std::io;

use http::HeaderMap;
use thiserror::Error;

use crate::data::FailureKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while setting up a client or touching a cookie jar.
///
/// Requests themselves never fail with this type; see [`FetchResult`](crate::FetchResult).
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to load configuration: {0}")]
    Config(#[from] figment::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("cookie jar I/O error: {0}")]
    CookieIo(#[from] io::Error),

    #[error("malformed cookie jar: {0}")]
    CookieFormat(#[from] serde_json::Error),
}

/// Status line and headers of a response whose body was not (fully) read.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseHead {
    /// URL that produced the response, after any transport-level redirects.
    pub url:     String,
    pub status:  u16,
    pub headers: HeaderMap,
}

/// Typed failure of a single transport exchange.
///
/// Variants that can happen after the status line arrived carry the partial
/// [`ResponseHead`] so callers can still report status and headers.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout { head: Option<ResponseHead> },

    #[error("response exceeds the {limit} byte limit")]
    TooLarge { limit: u64, head: Option<ResponseHead> },

    #[error("transfer interrupted: {message}")]
    Interrupted {
        message: String,
        head:    Option<ResponseHead>,
    },

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Partial response received before the failure, if any.
    pub fn head(&self) -> Option<&ResponseHead> {
        match self {
            Self::Timeout { head } | Self::TooLarge { head, .. } | Self::Interrupted { head, .. } => {
                head.as_ref()
            }
            Self::InvalidRequest(_) | Self::Connect(_) | Self::Other(_) => None,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Connect(_) => FailureKind::Connect,
            Self::TooLarge { .. } => FailureKind::TooLarge,
            Self::Interrupted { .. } => FailureKind::Interrupted,
            Self::InvalidRequest(_) | Self::Other(_) => FailureKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head() -> ResponseHead {
        ResponseHead {
            url:     "https://example.com/".to_string(),
            status:  200,
            headers: HeaderMap::new(),
        }
    }

    #[test]
    fn head_is_exposed_for_partial_failures() {
        let err = TransportError::TooLarge {
            limit: 10,
            head:  Some(head()),
        };
        assert_eq!(err.head().map(|h| h.status), Some(200));
        assert_eq!(err.kind(), FailureKind::TooLarge);

        assert!(TransportError::Connect("refused".into()).head().is_none());
    }

    #[test]
    fn display_messages() {
        assert_eq!(TransportError::Timeout { head: None }.to_string(), "request timed out");
        assert_eq!(
            TransportError::TooLarge { limit: 5, head: None }.to_string(),
            "response exceeds the 5 byte limit"
        );
    }
}
