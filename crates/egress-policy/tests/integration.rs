use egress_policy::{DEFAULT_TRACKING_PARAMS, Policy, normalize};

fn admin_policy() -> Policy {
    Policy::default()
        .block_domain("*.ads.test")
        .block_domain("malware.test")
        .block_redirects_to(".tracker.test")
        .local_host("node.example.org")
}

#[test]
fn blocked_and_redirect_blocked_lists() {
    let policy = admin_policy();

    assert!(policy.is_blocked("https://ads.test/banner.png"));
    assert!(policy.is_blocked("https://eu.ads.test/banner.png"));
    assert!(policy.is_blocked("http://MALWARE.test:81/"));
    assert!(!policy.is_blocked("https://tracker.test/r?u=1"));

    assert!(policy.is_redirect_blocked("https://go.tracker.test/r?u=1"));
    assert!(!policy.is_redirect_blocked("https://malware.test/"));
}

#[test]
fn local_link_detection() {
    let policy = admin_policy();

    assert!(policy.is_local_link("https://node.example.org/display/1"));
    assert!(policy.is_local_link("http://192.168.0.10/"));
    assert!(policy.is_local_link("http://[::1]:9000/"));
    assert!(!policy.is_local_link("https://example.org/"));
    assert!(!policy.is_local_link("/relative/path"));
}

#[test]
fn strip_then_normalize_pipeline() {
    let policy = admin_policy();
    let url = "https://example.org/Straße/über?utm_source=x&page=2&utm_medium=y#c1";

    let stripped = policy.strip_tracking_params(url);
    assert_eq!(stripped, "https://example.org/Straße/über?page=2#c1");
    assert_eq!(
        normalize(&stripped),
        "https://example.org/Stra%C3%9Fe/%C3%BCber?page=2#c1"
    );
}

#[test]
fn default_tracking_list_is_complete() {
    let policy = Policy::default();
    for name in DEFAULT_TRACKING_PARAMS {
        let url = format!("https://example.org/?{name}=1&keep=1");
        assert_eq!(policy.strip_tracking_params(&url), "https://example.org/?keep=1", "{name}");
    }
}

#[test]
fn policy_deserializes_with_defaults() {
    let policy: Policy = serde_json::from_str(r#"{ "blocked_domains": ["evil.test"] }"#).unwrap();

    assert_eq!(policy.blocked_domains, vec!["evil.test".to_string()]);
    assert!(policy.redirect_blocked_domains.is_empty());
    assert_eq!(policy.tracking_params, Policy::default().tracking_params);
}
