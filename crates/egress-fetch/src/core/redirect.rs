use url::Url;

/// Hops after which resolution stops and returns the current URL.
pub const MAX_REDIRECT_DEPTH: u32 = 10;

/// Cursor of one final-URL resolution.
///
/// Each transition consumes the state and returns the next one, so a hop can
/// only move forward.
///
/// ```
/// use egress_fetch::RedirectState;
///
/// let state = RedirectState::new("https://a.test/")
///     .follow("https://b.test/".to_string())
///     .fetch_body();
/// assert_eq!(state.url, "https://b.test/");
/// assert_eq!(state.depth, 3);
/// assert!(state.have_fetched_body);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectState {
    pub url:               String,
    /// Starts at 1 and grows by one per hop.
    pub depth:             u32,
    /// Whether the next probe should read the body.
    pub have_fetched_body: bool,
}

impl RedirectState {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url:               url.into(),
            depth:             1,
            have_fetched_body: false,
        }
    }

    pub fn exhausted(&self) -> bool { self.depth > MAX_REDIRECT_DEPTH }

    /// Move to a header redirect target.
    #[must_use]
    pub fn follow(self, target: String) -> Self {
        Self {
            url:               target,
            depth:             self.depth + 1,
            have_fetched_body: self.have_fetched_body,
        }
    }

    /// Probe the same URL again, this time reading the body.
    #[must_use]
    pub fn fetch_body(self) -> Self {
        Self {
            depth: self.depth + 1,
            have_fetched_body: true,
            ..self
        }
    }

    /// Move to a meta-refresh target, starting again with a header-only probe.
    #[must_use]
    pub fn refresh(self, target: String) -> Self {
        Self {
            url:               target,
            depth:             self.depth + 1,
            have_fetched_body: false,
        }
    }
}

/// Strip leading and trailing `'` and `"` characters.
pub fn trim_quotes(url: &str) -> &str { url.trim_matches(|c| c == '\'' || c == '"') }

/// Absolute targets are kept verbatim; relative ones are joined onto `base`.
pub fn resolve_target(base: &str, target: &str) -> String {
    let target = target.trim();
    if Url::parse(target).is_ok() {
        return target.to_string();
    }
    Url::parse(base)
        .and_then(|base| base.join(target))
        .map(String::from)
        .unwrap_or_else(|_| target.to_string())
}
