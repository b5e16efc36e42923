use serde::{Deserialize, Serialize};

use crate::host::{canonical_host, host_name, host_of, is_internal, matches_domain};
use crate::tracking::{self, DEFAULT_TRACKING_PARAMS};

/// Administrator-controlled safety settings for outbound requests.
///
/// A policy is loaded once and shared read-only; every check is a pure
/// function of the URL text and these lists.
///
/// # Examples
///
/// ```
/// use egress_policy::Policy;
///
/// let policy = Policy::default()
///     .block_domain("evil.test")
///     .block_redirects_to("shortener.test");
///
/// assert!(policy.is_blocked("https://cdn.evil.test/x.js"));
/// assert!(!policy.is_blocked("https://shortener.test/abc"));
/// assert!(policy.is_redirect_blocked("https://shortener.test/abc"));
/// assert_eq!(
///     policy.strip_tracking_params("https://example.com/?id=1&utm_source=feed"),
///     "https://example.com/?id=1"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Hosts that are never contacted, directly or through a redirect.
    ///
    /// Entries match the domain itself and every subdomain.
    pub blocked_domains: Vec<String>,

    /// Hosts that may be fetched directly but are never followed as a
    /// redirect hop.
    pub redirect_blocked_domains: Vec<String>,

    /// Query parameter names removed before a URL is resolved.
    ///
    /// Compared ASCII case-insensitively after percent-decoding.
    pub tracking_params: Vec<String>,

    /// Host names under which this server itself is reachable.
    pub local_hosts: Vec<String>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            blocked_domains:          Vec::new(),
            redirect_blocked_domains: Vec::new(),
            tracking_params:          DEFAULT_TRACKING_PARAMS.iter().map(|s| s.to_string()).collect(),
            local_hosts:              Vec::new(),
        }
    }
}

impl Policy {
    /// Add a domain to the denylist.
    #[must_use]
    pub fn block_domain(mut self, domain: impl Into<String>) -> Self {
        self.blocked_domains.push(domain.into());
        self
    }

    /// Add a domain that must not be followed through a redirect.
    #[must_use]
    pub fn block_redirects_to(mut self, domain: impl Into<String>) -> Self {
        self.redirect_blocked_domains.push(domain.into());
        self
    }

    /// Replace the tracking parameter names.
    #[must_use]
    pub fn tracking_params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tracking_params = names.into_iter().map(Into::into).collect();
        self
    }

    /// Add a host name under which this server is reachable.
    #[must_use]
    pub fn local_host(mut self, host: impl Into<String>) -> Self {
        self.local_hosts.push(host.into());
        self
    }

    /// Returns `true` if `url` points at this machine or a private network.
    ///
    /// Only IP literals are classified; no name resolution takes place.
    /// Callers use this as a logging signal, not as a refusal.
    pub fn is_local_link(&self, url: &str) -> bool {
        let Some(host) = host_of(url) else {
            return false;
        };
        if is_internal(&host) {
            return true;
        }
        let name = host_name(&host);
        self.local_hosts
            .iter()
            .any(|local| canonical_host(local) == name)
    }

    /// Returns `true` if the host of `url` is on the denylist.
    ///
    /// A URL without a host is never blocked.
    pub fn is_blocked(&self, url: &str) -> bool { self.host_matches(url, &self.blocked_domains) }

    /// Returns `true` if the host of `url` must not be followed through a redirect.
    pub fn is_redirect_blocked(&self, url: &str) -> bool {
        self.host_matches(url, &self.redirect_blocked_domains)
    }

    /// Remove tracking parameters from the query of `url`.
    ///
    /// Idempotent; the order of the remaining parameters is preserved.
    pub fn strip_tracking_params(&self, url: &str) -> String {
        tracking::strip(url, &self.tracking_params)
    }

    fn host_matches(&self, url: &str, domains: &[String]) -> bool {
        if domains.is_empty() {
            return false;
        }
        let Some(host) = host_of(url) else {
            return false;
        };
        let name = host_name(&host);
        domains.iter().any(|domain| matches_domain(&name, domain))
    }
}
