use std::future::Future;

use crate::data::{TransportRequest, TransportResponse};
use crate::data::transfer::content_length;
use crate::error::{ResponseHead, TransportError};

/// Asynchronous HTTP transport abstraction.
///
/// This trait is the only network seam of the crate. Implementations issue
/// exactly one exchange per call and map every failure to a
/// [`TransportError`]. The request URL is never checked against the
/// blocklist here; redirects a transport follows on its own are.
///
/// # Implementations
///
/// - [`ReqwestTransport`]: Production implementation using `reqwest`
/// - [`MockTransport`](crate::MockTransport): Scripted responses for tests
pub trait HttpTransport: Send + Sync {
    /// Send `request` and return the complete response.
    ///
    /// # Errors
    ///
    /// - [`TransportError::TooLarge`] when `max_content_length` is exceeded,
    ///   either by the declared `Content-Length` or by the bytes received.
    /// - [`TransportError::Timeout`] / [`TransportError::Connect`] for network
    ///   failures, carrying the partial head when one was received.
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// Abort at header time when the declared `Content-Length` exceeds `limit`.
pub fn intercept_headers(head: &ResponseHead, limit: Option<u64>) -> Result<(), TransportError> {
    match (limit, content_length(&head.headers)) {
        (Some(limit), Some(declared)) if declared > limit => Err(TransportError::TooLarge {
            limit,
            head: Some(head.clone()),
        }),
        _ => Ok(()),
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use bytes::BytesMut;
    use reqwest::redirect;
    use tracing::info;

    use super::*;
    use crate::data::{FetchConfig, Method};
    use crate::effects::{PROBE_CONNECT_TIMEOUT, PROBE_READ_TIMEOUT};
    use crate::error::{Error, Result};

    /// Production transport implementation using reqwest.
    ///
    /// Holds two connection pools. The following pool obeys the configured
    /// connect timeout and redirect limit and stops in front of blocked
    /// hosts. The direct pool returns 3xx responses untouched and uses the
    /// fixed probe timeouts of final-URL resolution.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        following: reqwest::Client,
        direct:    reqwest::Client,
    }

    impl ReqwestTransport {
        /// Build the clients with the configured user agent.
        pub fn new(config: &FetchConfig) -> Result<Self> {
            let builder = || reqwest::Client::builder().user_agent(config.user_agent.as_str());
            let client_error = |e: reqwest::Error| Error::Client(Box::new(e));

            let following = builder()
                .connect_timeout(config.connect_timeout())
                .redirect(guarded_redirects(config))
                .build()
                .map_err(client_error)?;
            let direct = builder()
                .connect_timeout(PROBE_CONNECT_TIMEOUT)
                .read_timeout(PROBE_READ_TIMEOUT)
                .redirect(redirect::Policy::none())
                .build()
                .map_err(client_error)?;

            Ok(Self { following, direct })
        }
    }

    /// Follow up to `max_redirects` hops, handing back the 3xx response
    /// instead of entering a blocked domain.
    fn guarded_redirects(config: &FetchConfig) -> redirect::Policy {
        let policy = config.policy.clone();
        let max_redirects = config.max_redirects;
        redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                attempt.error("too many redirects")
            } else if policy.is_blocked(attempt.url().as_str()) {
                info!(url = %attempt.url(), "redirect into blocked domain not followed");
                attempt.stop()
            } else {
                attempt.follow()
            }
        })
    }

    fn map_error(error: reqwest::Error, head: Option<ResponseHead>) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout { head }
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else if error.is_builder() {
            TransportError::InvalidRequest(error.to_string())
        } else if head.is_some() || error.is_body() || error.is_decode() {
            TransportError::Interrupted {
                message: error.to_string(),
                head,
            }
        } else {
            TransportError::Other(error.to_string())
        }
    }

    impl HttpTransport for ReqwestTransport {
        async fn send(&self, request: TransportRequest) -> std::result::Result<TransportResponse, TransportError> {
            let client = if request.follow_redirects { &self.following } else { &self.direct };

            let mut builder = client
                .request(request.method.into(), request.url.as_str())
                .headers(request.headers);
            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let mut response = builder.send().await.map_err(|e| map_error(e, None))?;
            let head = ResponseHead {
                url:     response.url().to_string(),
                status:  response.status().as_u16(),
                headers: response.headers().clone(),
            };
            intercept_headers(&head, request.max_content_length)?;

            if request.method == Method::Head {
                return Ok(TransportResponse::from_head(head, Default::default()));
            }

            let mut body = BytesMut::new();
            loop {
                match response.chunk().await {
                    Ok(Some(chunk)) => {
                        if let Some(limit) = request.max_content_length {
                            if (body.len() + chunk.len()) as u64 > limit {
                                return Err(TransportError::TooLarge {
                                    limit,
                                    head: Some(head),
                                });
                            }
                        }
                        body.extend_from_slice(&chunk);
                    }
                    Ok(None) => break,
                    Err(e) => return Err(map_error(e, Some(head))),
                }
            }

            Ok(TransportResponse::from_head(head, body.freeze()))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestTransport;
