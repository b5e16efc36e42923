//! Pure transformations behind the executor and the resolver.
//!
//! Nothing here performs I/O, logs or reads the clock.

mod headers;
mod meta_refresh;
mod redirect;
mod validation;

pub use headers::effective_headers;
pub use meta_refresh::{find_refresh_target, refresh_url};
pub use redirect::{MAX_REDIRECT_DEPTH, RedirectState, resolve_target, trim_quotes};
pub use validation::{
    MAX_URL_LENGTH, TRUNCATED_URL_LENGTH, is_followed_redirect, is_html, is_redirect, truncate_url,
    url_too_long,
};
