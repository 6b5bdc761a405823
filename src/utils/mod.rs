// src/utils/mod.rs

//! Utility functions and helpers.

pub mod http;

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Extract the numeric status id from a post permalink.
pub fn extract_status_id(link: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"/status/(\d+)").expect("status id pattern")
    });
    pattern
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Strip characters that are not allowed in filenames.
pub fn sanitize_filename(name: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r#"[<>:"/\\|?*]"#).expect("filename pattern")
    });
    pattern.replace_all(name, "").trim().to_string()
}

/// Last path segment of a URL with query parameters stripped; the usual
/// source of a media filename.
pub fn remote_file_name(url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or(url);
    without_query
        .rsplit('/')
        .next()
        .unwrap_or(without_query)
        .to_string()
}
