//! I/O operations behind trait seams.
//!
//! The transport, the timing sink and the cookie jar are the only places that
//! touch the network, the clock or the filesystem.

mod client;
mod cookies;
mod executor;
mod mock;
mod profiler;
mod resolver;
mod transport;

pub use client::HttpClient;
pub use cookies::{FileCookieJar, StoredCookie};
pub use executor::RequestExecutor;
pub use transport::{HttpTransport, intercept_headers};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use mock::MockTransport;
pub use profiler::{NETWORK, Profiler, Recording, TracingProfiler};
pub use resolver::{PROBE_BODY_LIMIT, PROBE_CONNECT_TIMEOUT, PROBE_READ_TIMEOUT, RedirectResolver};
