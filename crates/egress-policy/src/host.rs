use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use url::{Host, Url};

/// Host component of `url`, if the URL parses and has one.
pub(crate) fn host_of(url: &str) -> Option<Host<String>> {
    Url::parse(url.trim()).ok()?.host().map(|host| host.to_owned())
}

/// Host name as used for list matching: lowercase, IPv6 without brackets.
pub(crate) fn host_name(host: &Host<String>) -> String {
    match host {
        Host::Domain(domain) => domain.trim_end_matches('.').to_ascii_lowercase(),
        Host::Ipv4(ip) => ip.to_string(),
        Host::Ipv6(ip) => ip.to_string(),
    }
}

/// Configured host name in the form [`host_of`] produces.
///
/// Internationalized names become punycode and IP literals their canonical
/// text. Entries that do not parse as a host are only lowercased.
pub(crate) fn canonical_host(entry: &str) -> String {
    let entry = entry.trim().trim_end_matches('.');
    Host::parse(entry).map_or_else(|_| entry.to_ascii_lowercase(), |host| host_name(&host))
}

/// Returns `true` when `host` equals `domain` or is one of its subdomains.
///
/// `domain` may be written `example.com`, `.example.com` or `*.example.com`,
/// in Unicode or punycode.
pub(crate) fn matches_domain(host: &str, domain: &str) -> bool {
    let domain = domain.trim();
    let domain = domain
        .strip_prefix("*.")
        .or_else(|| domain.strip_prefix('.'))
        .unwrap_or(domain);
    if domain.is_empty() {
        return false;
    }
    let domain = canonical_host(domain);
    let domain = domain.as_str();

    if host.eq_ignore_ascii_case(domain) {
        return true;
    }
    host.len() > domain.len()
        && host.is_char_boundary(host.len() - domain.len())
        && host[host.len() - domain.len()..].eq_ignore_ascii_case(domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}

/// Returns `true` for hosts that only make sense inside this machine or its network.
pub(crate) fn is_internal(host: &Host<String>) -> bool {
    match host {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.');
            domain.eq_ignore_ascii_case("localhost")
                || matches_domain(domain, "localhost")
                || domain
                    .parse::<IpAddr>()
                    .is_ok_and(|ip| is_internal_ip(&ip))
        }
        Host::Ipv4(ip) => is_internal_v4(ip),
        Host::Ipv6(ip) => is_internal_v6(ip),
    }
}

fn is_internal_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_internal_v4(v4),
        IpAddr::V6(v6) => is_internal_v6(v6),
    }
}

fn is_internal_v4(v4: &Ipv4Addr) -> bool {
    v4.is_loopback()         // 127.0.0.0/8
        || v4.is_private()   // 10/8, 172.16/12, 192.168/16
        || v4.is_link_local() // 169.254.0.0/16
        || v4.is_unspecified() // 0.0.0.0
}

fn is_internal_v6(v6: &Ipv6Addr) -> bool {
    let first = v6.segments()[0];
    v6.is_loopback()
        || v6.is_unspecified()
        || (first & 0xfe00) == 0xfc00 // unique local, fc00::/7
        || (first & 0xffc0) == 0xfe80 // link local, fe80::/10
        || v6.to_ipv4_mapped().is_some_and(|v4| is_internal_v4(&v4))
}
