use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use egress_policy::Policy;
use serde::Serialize;

use super::executor::RequestExecutor;
use super::profiler::{Profiler, TracingProfiler};
use super::resolver::RedirectResolver;
use super::transport::HttpTransport;
use crate::data::{FetchConfig, FetchResult, RequestOptions};

/// Single handle for every outbound operation of a process.
///
/// Wraps a [`RequestExecutor`] and a [`RedirectResolver`] that share one
/// transport, one [`Policy`] and one profiler.
pub struct HttpClient<T> {
    executor: RequestExecutor<T>,
    resolver: RedirectResolver<T>,
}

impl<T: HttpTransport> HttpClient<T> {
    /// Build a client that reports timings through `tracing`.
    pub fn new(transport: T, config: &FetchConfig) -> Self {
        Self::with_profiler(transport, config, Arc::new(TracingProfiler))
    }

    pub fn with_profiler(transport: T, config: &FetchConfig, profiler: Arc<dyn Profiler>) -> Self {
        let transport = Arc::new(transport);
        let policy = Arc::new(config.policy.clone());

        let executor = RequestExecutor::new(transport.clone(), policy.clone(), profiler.clone())
            .with_default_headers(config.default_headers())
            .with_default_timeout(config.default_timeout());
        let resolver = RedirectResolver::new(transport, policy, profiler);

        Self { executor, resolver }
    }

    pub fn executor(&self) -> &RequestExecutor<T> { &self.executor }

    pub fn resolver(&self) -> &RedirectResolver<T> { &self.resolver }

    pub fn transport(&self) -> &T { self.executor.transport() }

    pub fn policy(&self) -> &Policy { self.executor.policy() }

    /// Body of [`fetch_full`](Self::fetch_full); empty on any failure.
    pub async fn fetch(
        &self,
        url: &str,
        timeout: Option<Duration>,
        accept_content: Option<&str>,
        cookie_jar: Option<&Path>,
    ) -> Bytes {
        self.fetch_full(url, timeout, accept_content, cookie_jar)
            .await
            .into_body()
    }

    /// GET `url` with options built from the arguments.
    pub async fn fetch_full(
        &self,
        url: &str,
        timeout: Option<Duration>,
        accept_content: Option<&str>,
        cookie_jar: Option<&Path>,
    ) -> FetchResult {
        let mut options = RequestOptions::default();
        if let Some(timeout) = timeout {
            options = options.timeout(timeout);
        }
        if let Some(accept) = accept_content {
            options = options.accept_content(accept);
        }
        if let Some(path) = cookie_jar {
            options = options.cookie_jar(path);
        }
        self.executor.get(url, options).await
    }

    pub async fn get(&self, url: &str, options: RequestOptions) -> FetchResult { self.executor.get(url, options).await }

    pub async fn head(&self, url: &str, options: RequestOptions) -> FetchResult {
        self.executor.head(url, options).await
    }

    pub async fn post<P>(&self, url: &str, payload: &P, options: RequestOptions) -> FetchResult
    where
        P: Serialize + ?Sized,
    {
        self.executor.post(url, payload, options).await
    }

    /// Follow header and meta-refresh redirects; see [`RedirectResolver`].
    pub async fn final_url(&self, url: &str) -> String { self.resolver.resolve(url).await }
}

#[cfg(feature = "reqwest")]
impl HttpClient<super::transport::ReqwestTransport> {
    /// Build a client on top of [`ReqwestTransport`](crate::ReqwestTransport).
    pub fn from_config(config: &FetchConfig) -> crate::Result<Self> {
        Ok(Self::new(super::transport::ReqwestTransport::new(config)?, config))
    }
}
