//! Immutable data types for outbound requests.
//!
//! Options describe one request, results describe one exchange and the
//! configuration is loaded once per process. None of these types perform I/O
//! except [`FetchConfig::load`].

pub mod accept;
pub mod config;
pub mod options;
pub mod result;
pub mod transfer;

pub use config::FetchConfig;
pub use options::{Method, RequestOptions};
pub use result::{FailureKind, FetchResult};
pub use transfer::{TransportRequest, TransportResponse};
