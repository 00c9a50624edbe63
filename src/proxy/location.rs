//! Redirect target rewriting.
//!
//! An upstream that issues a redirect to itself must not leak its own
//! hostname to the client; the `Location` value is mapped back into the
//! gateway's address space instead.

use axum::http::HeaderValue;

/// Rewrite an absolute `Location` value that points at the upstream base.
///
/// `base` is the upstream base URL without a trailing slash, `mount` the
/// path prefix the upstream is served under (`/{name}`, or empty in
/// passthrough mode). Returns `None` when the value should pass through
/// unchanged: relative targets, absolute targets outside the upstream,
/// and malformed values.
pub fn rewrite_location(value: &HeaderValue, base: &str, mount: &str) -> Option<HeaderValue> {
    let location = value.to_str().ok()?;

    let remainder = location.strip_prefix(base)?;

    // Guard against prefix matches inside a longer hostname
    // (base "http://svc" must not capture "http://svc-other/..").
    if !(remainder.is_empty() || remainder.starts_with('/') || remainder.starts_with('?')) {
        return None;
    }

    let rewritten = if mount.is_empty() && remainder.is_empty() {
        "/".to_string()
    } else {
        format!("{mount}{remainder}")
    };

    HeaderValue::from_str(&rewritten).ok()
}
