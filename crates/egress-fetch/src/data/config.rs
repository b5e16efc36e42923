use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use egress_policy::Policy;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// User agent sent when the configuration names none.
pub const DEFAULT_USER_AGENT: &str = concat!("egress-fetch/", env!("CARGO_PKG_VERSION"));

/// Process-wide settings shared by every request.
///
/// ```toml
/// user_agent = "social-node/1.0 (+https://node.example.org)"
/// default_timeout = 30
///
/// [headers]
/// Accept-Language = "en"
///
/// [policy]
/// blocked_domains = ["ads.example"]
/// redirect_blocked_domains = ["tracker.example"]
/// local_hosts = ["node.example.org"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent:      String,
    /// Total request timeout in seconds.
    pub default_timeout: u64,
    /// Connection establishment timeout in seconds.
    pub connect_timeout: u64,
    /// Redirects the transport follows on its own for ordinary requests.
    pub max_redirects:   usize,
    /// Headers sent with every request unless a caller overrides them.
    pub headers:         BTreeMap<String, String>,
    pub policy:          Policy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent:      DEFAULT_USER_AGENT.to_string(),
            default_timeout: 60,
            connect_timeout: 10,
            max_redirects:   10,
            headers:         BTreeMap::new(),
            policy:          Policy::default(),
        }
    }
}

impl FetchConfig {
    /// Environment variable prefix; nested keys are separated by `__`.
    pub const ENV_PREFIX: &str = "EGRESS_";

    /// Load defaults, then `path` (a missing file is skipped), then `EGRESS_*`
    /// environment variables, later sources winning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
            .extract()?;
        Ok(config)
    }

    pub fn default_timeout(&self) -> Duration { Duration::from_secs(self.default_timeout) }

    pub fn connect_timeout(&self) -> Duration { Duration::from_secs(self.connect_timeout) }

    pub fn default_headers(&self) -> Arc<[(String, String)]> {
        self.headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.default_timeout(), Duration::from_secs(60));
        assert_eq!(config.max_redirects, 10);
        assert!(config.user_agent.starts_with("egress-fetch/"));
        assert!(config.default_headers().is_empty());
    }

    #[test]
    fn load_merges_file_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
user_agent = "node/2.0"
default_timeout = 15

[headers]
Accept-Language = "de"

[policy]
blocked_domains = ["evil.test"]
"#
        )
        .unwrap();

        let config = FetchConfig::load(file.path()).unwrap();
        assert_eq!(config.user_agent, "node/2.0");
        assert_eq!(config.default_timeout(), Duration::from_secs(15));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.default_headers().as_ref(), [("Accept-Language".to_string(), "de".to_string())]);
        assert!(config.policy.is_blocked("https://www.evil.test/"));
        assert_eq!(config.policy.tracking_params, Policy::default().tracking_params);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FetchConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_timeout, FetchConfig::default().default_timeout);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "default_timeout = \"soon\"").unwrap();
        assert!(matches!(FetchConfig::load(file.path()), Err(crate::Error::Config(_))));
    }
}
