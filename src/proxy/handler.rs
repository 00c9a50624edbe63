//! Catch-all proxy handler.
//!
//! # Responsibilities
//! - Resolve the inbound path to an upstream (named or passthrough mode)
//! - Build the outbound request through the header policy
//! - Map transport failures to 502 without leaking internals
//! - Stream the upstream response back, with Location rewritten

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::{headers, location, PublicOrigin};
use crate::registry::UpstreamRegistry;

/// Where a resolved request is going.
struct Target {
    /// Absolute outbound URL.
    url: String,
    /// Upstream base URL, for Location rewriting.
    base: String,
    /// Mount prefix the upstream is served under ("" in passthrough mode).
    mount: String,
    /// Label for logs and metrics.
    label: String,
}

/// Main proxy handler. Mounted as the router's catch-all, so everything the
/// explicit documentation/health routes did not claim lands here.
pub async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(|q| q.to_string());

    let target = match resolve_target(&state, &path, query.as_deref()) {
        Ok(t) => t,
        Err(response) => {
            metrics::record_request(&method, StatusCode::NOT_FOUND.as_u16(), "none", start_time);
            return response;
        }
    };

    tracing::debug!(
        method = %method,
        path = %path,
        target = %target.url,
        upstream = %target.label,
        "Relaying request"
    );

    let uri: Uri = match target.url.parse() {
        Ok(uri) => uri,
        Err(error) => {
            tracing::error!(target = %target.url, error = %error, "Outbound URL did not parse");
            metrics::record_request(&method, 502, &target.label, start_time);
            return (StatusCode::BAD_GATEWAY, "Invalid upstream target").into_response();
        }
    };

    let origin = PublicOrigin::for_request(
        state.config.server.public_url.as_deref(),
        request.headers(),
    );

    let (parts, body) = request.into_parts();
    let mut outbound = Request::new(body);
    *outbound.method_mut() = parts.method;
    *outbound.uri_mut() = uri;
    *outbound.headers_mut() = headers::outbound_headers(&parts.headers, &origin, addr.ip());

    match state.forwarder.send(outbound).await {
        Ok(upstream_response) => {
            let status = upstream_response.status();
            metrics::record_request(&method, status.as_u16(), &target.label, start_time);

            let (response_parts, incoming) = upstream_response.into_parts();
            let mut filtered = headers::response_headers(&response_parts.headers);

            if let Some(value) = filtered.get(header::LOCATION) {
                if let Some(rewritten) =
                    location::rewrite_location(value, &target.base, &target.mount)
                {
                    filtered.insert(header::LOCATION, rewritten);
                }
            }

            let mut response = Response::new(Body::new(incoming));
            *response.status_mut() = status;
            *response.headers_mut() = filtered;
            response
        }
        Err(error) => {
            tracing::error!(
                upstream = %target.label,
                target = %target.url,
                category = error.category(),
                error = %error,
                "Upstream request failed"
            );
            metrics::record_request(&method, 502, &target.label, start_time);
            (StatusCode::BAD_GATEWAY, error.to_string()).into_response()
        }
    }
}

/// Resolve the inbound path to an outbound target, or a 404 response.
fn resolve_target(state: &AppState, path: &str, query: Option<&str>) -> Result<Target, Response> {
    let query_suffix = query.map(|q| format!("?{q}")).unwrap_or_default();

    let first_segment = path
        .strip_prefix('/')
        .map(|rest| rest.split('/').next().unwrap_or(""))
        .unwrap_or("");

    // The gateway's own endpoints are routed explicitly; anything that still
    // arrives here under a reserved segment must not be relayed.
    if UpstreamRegistry::is_reserved(first_segment) {
        return Err(StatusCode::NOT_FOUND.into_response());
    }

    let passthrough = &state.config.passthrough;
    if passthrough.enabled
        && (path == passthrough.prefix || path.starts_with(&format!("{}/", passthrough.prefix)))
    {
        let base = passthrough.target_base_url.trim_end_matches('/').to_string();
        return Ok(Target {
            url: format!("{base}{path}{query_suffix}"),
            base,
            mount: String::new(),
            label: "passthrough".to_string(),
        });
    }

    if first_segment.is_empty() {
        return Err((StatusCode::NOT_FOUND, "No matching route found").into_response());
    }

    match state.registry.resolve(first_segment) {
        Some(entry) => {
            // Strip exactly the mount segment; an empty remainder proxies to
            // the upstream root.
            let remainder = &path[1 + first_segment.len()..];
            Ok(Target {
                url: format!("{}{}{}", entry.base(), remainder, query_suffix),
                base: entry.base().to_string(),
                mount: entry.mount(),
                label: entry.name.clone(),
            })
        }
        None => {
            tracing::warn!(name = %first_segment, "Unknown upstream name");
            Err((
                StatusCode::NOT_FOUND,
                format!("Unknown upstream: {first_segment}"),
            )
                .into_response())
        }
    }
}
