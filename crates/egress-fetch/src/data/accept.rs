//! Ready-made `Accept` header values for [`RequestOptions::accept_content`](super::RequestOptions::accept_content).

pub const DEFAULT: &str = "*/*";
pub const HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
pub const JSON: &str = "application/json,*/*;q=0.9";
pub const ACTIVITY_JSON: &str = "application/activity+json,application/ld+json;profile=\"https://www.w3.org/ns/activitystreams\",application/json;q=0.9,*/*;q=0.8";
pub const ATOM_XML: &str = "application/atom+xml,text/xml;q=0.9,*/*;q=0.8";
pub const RSS_XML: &str = "application/rss+xml,text/xml;q=0.9,*/*;q=0.8";
pub const FEED_XML: &str = "application/atom+xml,application/rss+xml;q=0.9,application/rdf+xml;q=0.9,text/xml;q=0.8,*/*;q=0.7";
pub const XML: &str = "application/xml,text/xml;q=0.9,*/*;q=0.8";
pub const IMAGE: &str = "image/png,image/jpeg,image/gif,image/*;q=0.9,*/*;q=0.8";
pub const TEXT: &str = "text/plain,text/*;q=0.9,*/*;q=0.8";
pub const JRD_JSON: &str = "application/jrd+json,application/json;q=0.9";
pub const XRD_XML: &str = "application/xrd+xml,text/xml;q=0.9,*/*;q=0.8";
pub const OCTET: &str = "application/octet-stream,*/*;q=0.8";
