//! File-backed cookie storage scoped to one request.
//!
//! The jar is a JSON array of [`StoredCookie`] records. It is read before a
//! request, consulted for the `Cookie` header, updated from `Set-Cookie`
//! response headers and written back afterwards.
//!
//! Parsing covers the attributes that decide where a cookie is sent:
//! `Domain`, `Path`, `Secure` and `Max-Age` (a non-positive value deletes the
//! cookie). `Expires`, `SameSite` and `HttpOnly` are accepted and ignored.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use http::HeaderMap;
use http::header::SET_COOKIE;
use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::error::Result;

/// One persisted cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name:      String,
    pub value:     String,
    /// Host or parent domain the cookie is sent to, without a leading dot.
    pub domain:    String,
    pub path:      String,
    #[serde(default)]
    pub secure:    bool,
    /// Set when the response named no `Domain`; the cookie then goes to
    /// that exact host only.
    #[serde(default)]
    pub host_only: bool,
}

impl StoredCookie {
    fn matches(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let domain_ok = if self.host_only {
            host.eq_ignore_ascii_case(&self.domain)
        } else {
            domain_matches(host, &self.domain)
        };
        domain_ok
            && path_matches(url.path(), &self.path)
            && (!self.secure || url.scheme() == "https")
    }
}

fn domain_matches(host: &str, domain: &str) -> bool {
    host.eq_ignore_ascii_case(domain)
        || (host.len() > domain.len()
            && host.is_char_boundary(host.len() - domain.len() - 1)
            && host[host.len() - domain.len()..].eq_ignore_ascii_case(domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
}

fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    request_path == cookie_path
        || (request_path.starts_with(cookie_path)
            && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/')))
}

/// Directory of the request path, used when `Set-Cookie` names no `Path`.
fn default_path(url: &Url) -> String {
    match url.path().rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => dir.to_string(),
        _ => "/".to_string(),
    }
}

enum Parsed {
    Store(StoredCookie),
    Delete { name: String, domain: String, path: String },
}

fn parse_set_cookie(url: &Url, header: &str) -> Option<Parsed> {
    let host = url.host_str()?.to_ascii_lowercase();
    let ip_host = !matches!(url.host(), Some(Host::Domain(_)));
    let mut parts = header.split(';');
    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut cookie = StoredCookie {
        name:      name.to_string(),
        value:     value.trim().trim_matches('"').to_string(),
        domain:    host.clone(),
        path:      default_path(url),
        secure:    false,
        host_only: true,
    };
    let mut expired = false;

    for attribute in parts {
        let (key, value) = match attribute.split_once('=') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (attribute.trim(), ""),
        };
        match key.to_ascii_lowercase().as_str() {
            "domain" if !value.is_empty() => {
                let domain = value.trim_start_matches('.').to_ascii_lowercase();
                if domain == host {
                    // Naming its own host widens the cookie to subdomains,
                    // which IP literals and single labels do not have.
                    cookie.host_only = ip_host || !domain.contains('.');
                    continue;
                }
                // A response may only set cookies for a parent domain of a
                // named host, and never for a bare top-level label.
                if ip_host || !domain.contains('.') || !domain_matches(&host, &domain) {
                    return None;
                }
                cookie.domain = domain;
                cookie.host_only = false;
            }
            "path" if value.starts_with('/') => cookie.path = value.to_string(),
            "secure" => cookie.secure = true,
            "max-age" => expired = value.parse::<i64>().is_ok_and(|age| age <= 0),
            _ => {}
        }
    }

    Some(if expired {
        Parsed::Delete {
            name:   cookie.name,
            domain: cookie.domain,
            path:   cookie.path,
        }
    } else {
        Parsed::Store(cookie)
    })
}

/// Cookie jar backed by a JSON file.
#[derive(Debug)]
pub struct FileCookieJar {
    path:    PathBuf,
    cookies: Vec<StoredCookie>,
}

impl FileCookieJar {
    /// Read the jar at `path`. A missing or empty file is an empty jar.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cookies = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, cookies })
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn cookies(&self) -> &[StoredCookie] { &self.cookies }

    /// `Cookie` header value for a request to `url`, if any cookie applies.
    pub fn request_header(&self, url: &Url) -> Option<String> {
        let header = self
            .cookies
            .iter()
            .filter(|cookie| cookie.matches(url))
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ");
        (!header.is_empty()).then_some(header)
    }

    /// Apply every `Set-Cookie` header of a response from `url`.
    ///
    /// Returns the number of headers that changed the jar. A cookie with the
    /// same name, domain and path replaces the stored one.
    pub fn store_response_cookies(&mut self, url: &Url, headers: &HeaderMap) -> usize {
        let mut changed = 0;
        for header in headers.get_all(SET_COOKIE) {
            let Some(parsed) = header.to_str().ok().and_then(|h| parse_set_cookie(url, h)) else {
                continue;
            };
            match parsed {
                Parsed::Store(cookie) => {
                    match self.cookies.iter_mut().find(|c| {
                        c.name == cookie.name && c.domain == cookie.domain && c.path == cookie.path
                    }) {
                        Some(existing) => *existing = cookie,
                        None => self.cookies.push(cookie),
                    }
                }
                Parsed::Delete { name, domain, path } => {
                    self.cookies
                        .retain(|c| !(c.name == name && c.domain == domain && c.path == path));
                }
            }
            changed += 1;
        }
        changed
    }

    /// Write the jar back to its file.
    pub async fn save(&self) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.cookies)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url { Url::parse(s).unwrap() }

    fn set_cookies(values: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(SET_COOKIE, value.parse().unwrap());
        }
        headers
    }

    fn jar() -> FileCookieJar {
        FileCookieJar {
            path:    PathBuf::from("unused.json"),
            cookies: Vec::new(),
        }
    }

    #[test]
    fn stores_and_sends_host_cookie() {
        let mut jar = jar();
        let origin = url("https://example.com/account/login");
        assert_eq!(jar.store_response_cookies(&origin, &set_cookies(&["sid=abc; Path=/; HttpOnly"])), 1);

        assert_eq!(jar.request_header(&url("https://example.com/feed")).as_deref(), Some("sid=abc"));
        assert_eq!(jar.request_header(&url("https://www.example.com/")), None);
        assert_eq!(jar.request_header(&url("https://other.test/")), None);
    }

    #[test]
    fn domain_attribute_covers_subdomains() {
        let mut jar = jar();
        jar.store_response_cookies(&url("https://www.example.com/"), &set_cookies(&["a=1; Domain=.example.com"]));

        assert_eq!(jar.cookies()[0].domain, "example.com");
        assert!(jar.request_header(&url("https://api.example.com/")).is_some());
        assert!(jar.request_header(&url("https://notexample.com/")).is_none());
    }

    #[test]
    fn foreign_domain_is_rejected() {
        let mut jar = jar();
        let changed = jar.store_response_cookies(&url("https://example.com/"), &set_cookies(&["a=1; Domain=evil.test"]));
        assert_eq!(changed, 0);
        assert!(jar.cookies().is_empty());
    }

    #[test]
    fn host_only_flag_follows_domain_attribute() {
        let mut jar = jar();
        let origin = url("https://example.com/");
        jar.store_response_cookies(&origin, &set_cookies(&["a=1; Path=/", "b=2; Path=/; Domain=example.com"]));

        assert!(jar.cookies()[0].host_only);
        assert!(!jar.cookies()[1].host_only);
        assert_eq!(jar.request_header(&url("https://www.example.com/")).as_deref(), Some("b=2"));
        assert_eq!(jar.request_header(&origin).as_deref(), Some("a=1; b=2"));
    }

    #[test]
    fn top_level_domain_attribute_is_rejected() {
        let mut jar = jar();
        let origin = url("https://www.example.com/");
        let changed = jar.store_response_cookies(&origin, &set_cookies(&["a=1; Domain=com", "b=2; Domain=.com"]));

        assert_eq!(changed, 0);
        assert!(jar.cookies().is_empty());
    }

    #[test]
    fn ip_hosts_never_share_cookies() {
        let mut jar = jar();
        let changed = jar.store_response_cookies(&url("http://10.1.2.3/"), &set_cookies(&["a=1; Domain=2.3"]));
        assert_eq!(changed, 0);

        jar.store_response_cookies(&url("http://10.1.2.3/"), &set_cookies(&["b=2; Path=/; Domain=10.1.2.3"]));
        assert!(jar.cookies()[0].host_only);
        assert_eq!(jar.request_header(&url("http://10.1.2.3/x")).as_deref(), Some("b=2"));
    }

    #[test]
    fn jar_files_without_host_only_still_load() {
        let json = r#"[{"name":"a","value":"1","domain":"example.com","path":"/"}]"#;
        let cookies: Vec<StoredCookie> = serde_json::from_str(json).unwrap();
        assert!(!cookies[0].host_only);
        assert!(!cookies[0].secure);
    }

    #[test]
    fn default_path_and_path_matching() {
        let mut jar = jar();
        jar.store_response_cookies(&url("https://example.com/docs/page"), &set_cookies(&["d=1"]));

        assert_eq!(jar.cookies()[0].path, "/docs");
        assert!(jar.request_header(&url("https://example.com/docs")).is_some());
        assert!(jar.request_header(&url("https://example.com/docs/other")).is_some());
        assert!(jar.request_header(&url("https://example.com/docsearch")).is_none());
        assert!(jar.request_header(&url("https://example.com/")).is_none());
    }

    #[test]
    fn secure_cookie_only_over_https() {
        let mut jar = jar();
        jar.store_response_cookies(&url("https://example.com/"), &set_cookies(&["s=1; Secure; Path=/"]));

        assert!(jar.request_header(&url("https://example.com/")).is_some());
        assert!(jar.request_header(&url("http://example.com/")).is_none());
    }

    #[test]
    fn last_write_wins_and_max_age_deletes() {
        let mut jar = jar();
        let origin = url("https://example.com/");
        jar.store_response_cookies(&origin, &set_cookies(&["a=1; Path=/", "b=2; Path=/"]));
        jar.store_response_cookies(&origin, &set_cookies(&["a=3; Path=/"]));
        assert_eq!(jar.request_header(&origin).as_deref(), Some("a=3; b=2"));

        jar.store_response_cookies(&origin, &set_cookies(&["b=gone; Path=/; Max-Age=0"]));
        assert_eq!(jar.request_header(&origin).as_deref(), Some("a=3"));
    }

    #[test]
    fn malformed_headers_are_skipped() {
        let mut jar = jar();
        let changed = jar.store_response_cookies(&url("https://example.com/"), &set_cookies(&["novalue", "=x"]));
        assert_eq!(changed, 0);
    }

    #[tokio::test]
    async fn open_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jar.json");

        let mut jar = FileCookieJar::open(&path).await.unwrap();
        assert!(jar.cookies().is_empty());
        jar.store_response_cookies(&url("https://example.com/"), &set_cookies(&["sid=1; Path=/"]));
        jar.save().await.unwrap();

        let reopened = FileCookieJar::open(&path).await.unwrap();
        assert_eq!(reopened.cookies(), jar.cookies());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jar.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        assert!(matches!(FileCookieJar::open(&path).await, Err(crate::Error::CookieFormat(_))));
    }
}
