use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;

use super::transport::{HttpTransport, intercept_headers};
use crate::data::{Method, TransportRequest, TransportResponse};
use crate::error::TransportError;

type Reply = Result<TransportResponse, TransportError>;
type Fallback = Arc<dyn Fn(&TransportRequest) -> Reply + Send + Sync>;

/// Scripted transport for tests.
///
/// Replies are looked up by method and exact URL. A `HEAD` without its own
/// route is answered from the `GET` route with the body removed. Unrouted
/// requests go to the fallback, or fail with [`TransportError::Connect`].
///
/// Like a real transport it honours `max_content_length`, both against the
/// declared `Content-Length` and against the scripted body. Every request is
/// recorded, including the ones that fail.
///
/// ```
/// use egress_fetch::{Method, MockTransport, TransportResponse};
///
/// let transport = MockTransport::new().route(
///     Method::Get,
///     "https://example.com/",
///     TransportResponse::new("https://example.com/", 200).with_body("hello"),
/// );
/// assert_eq!(transport.call_count(), 0);
/// ```
#[derive(Default)]
pub struct MockTransport {
    routes:   HashMap<(Method, String), Reply>,
    fallback: Option<Fallback>,
    calls:    Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn route(mut self, method: Method, url: impl Into<String>, response: TransportResponse) -> Self {
        self.routes.insert((method, url.into()), Ok(response));
        self
    }

    #[must_use]
    pub fn route_error(mut self, method: Method, url: impl Into<String>, error: TransportError) -> Self {
        self.routes.insert((method, url.into()), Err(error));
        self
    }

    /// Answer requests that match no route.
    #[must_use]
    pub fn fallback<F>(mut self, reply: F) -> Self
    where
        F: Fn(&TransportRequest) -> Reply + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(reply));
        self
    }

    /// Requests received so far, in order.
    pub fn calls(&self) -> Vec<TransportRequest> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize { self.calls.lock().unwrap_or_else(PoisonError::into_inner).len() }

    fn reply(&self, request: &TransportRequest) -> Reply {
        let key = (request.method, request.url.clone());
        if let Some(reply) = self.routes.get(&key) {
            return reply.clone();
        }
        if request.method == Method::Head {
            if let Some(reply) = self.routes.get(&(Method::Get, request.url.clone())) {
                return reply.clone();
            }
        }
        match &self.fallback {
            Some(fallback) => fallback(request),
            None => Err(TransportError::Connect(format!("no route for {} {}", request.method, request.url))),
        }
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("routes", &self.routes.len())
            .field("fallback", &self.fallback.is_some())
            .field("calls", &self.call_count())
            .finish()
    }
}

impl HttpTransport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let reply = self.reply(&request);
        let method = request.method;
        let limit = request.max_content_length;
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(request);

        let mut response = reply?;
        intercept_headers(&response.head(), limit)?;
        if method == Method::Head {
            response.body = Bytes::new();
        }
        if let Some(limit) = limit {
            if response.body.len() as u64 > limit {
                return Err(TransportError::TooLarge {
                    limit,
                    head: Some(response.head()),
                });
            }
        }
        Ok(response)
    }
}
