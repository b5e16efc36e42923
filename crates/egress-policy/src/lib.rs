//! Pre-flight safety decisions and URL normalization for outbound requests.
//!
//! Everything in this crate is pure: no sockets, no DNS, no file system.
//! Decisions are taken from the URL text and an immutable [`Policy`].
//!
//! # Checks
//!
//! - **Local links**: loopback, link-local and private-range IP literals,
//!   `localhost`, and the host names configured as "this server"
//! - **Blocked hosts**: administrator denylist, exact or suffix match
//! - **Redirect-blocked hosts**: hosts that must never be followed through a
//!   redirect
//! - **Tracking parameters**: analytics query parameters that are removed
//!   before a URL is fetched or logged

pub use self::normalize::normalize;
pub use self::policy::Policy;
pub use self::tracking::DEFAULT_TRACKING_PARAMS;

mod host;
mod normalize;
mod policy;
mod tracking;
