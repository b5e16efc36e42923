//! Outbound HTTP fetching with safety checks and final-URL resolution.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable options, results and configuration
//! - [`core`] - Pure redirect, meta-refresh and header logic
//! - [`effects`] - Transport abstraction, executor, resolver and the [`HttpClient`] facade
//!
//! Every request passes the [`Policy`] checks from `egress-policy` before a
//! socket is opened. Failures never surface as `Err`: they are carried by the
//! returned [`FetchResult`], and resolution always yields the best-known URL.
//!
//! ```no_run
//! use egress_fetch::{FetchConfig, HttpClient, RequestOptions, accept};
//!
//! # async fn run() -> egress_fetch::Result<()> {
//! let config = FetchConfig::load("egress.toml")?;
//! let client = HttpClient::from_config(&config)?;
//!
//! let page = client
//!     .get("https://example.com/", RequestOptions::default().accept_content(accept::HTML))
//!     .await;
//! if !page.is_error() {
//!     println!("{}", page.body_string());
//! }
//!
//! let target = client.final_url("https://short.example/abc").await;
//! println!("{target}");
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use self::core::{MAX_REDIRECT_DEPTH, RedirectState, is_redirect};
pub use self::data::{FailureKind, FetchConfig, FetchResult, Method, RequestOptions, accept};
pub use self::data::{TransportRequest, TransportResponse};
pub use self::effects::{
    FileCookieJar, HttpClient, HttpTransport, MockTransport, Profiler, RedirectResolver,
    RequestExecutor, StoredCookie, TracingProfiler,
};
#[cfg(feature = "reqwest")]
pub use self::effects::ReqwestTransport;
pub use self::error::{Error, ResponseHead, Result, TransportError};

pub use egress_policy::{Policy, normalize};
