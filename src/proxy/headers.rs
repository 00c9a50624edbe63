//! Header policy for both proxy legs.
//!
//! # Responsibilities
//! - Classify hop-by-hop vs end-to-end headers (RFC 7230)
//! - Drop Host on the outbound leg; the client recomputes it
//! - Compute X-Forwarded-For/-Host/-Proto metadata
//!
//! # Design Decisions
//! - End-to-end headers pass through unchanged, duplicates and order kept
//! - X-Forwarded-For appends to any pre-existing value

use std::net::IpAddr;

use axum::http::{header, HeaderMap, HeaderValue};

use crate::proxy::PublicOrigin;

/// Headers meaningful only for a single connection leg (RFC 7230 §6.1).
pub const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Whether a header must be dropped when crossing the proxy.
pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Build the outbound header set from the inbound request.
///
/// Drops hop-by-hop headers and `Host`, then overwrites the forwarding
/// metadata trio.
pub fn outbound_headers(
    inbound: &HeaderMap,
    origin: &PublicOrigin,
    client_addr: IpAddr,
) -> HeaderMap {
    let mut outbound = HeaderMap::with_capacity(inbound.len() + 3);

    for (name, value) in inbound {
        if is_hop_by_hop(name.as_str()) || name == header::HOST {
            continue;
        }
        outbound.append(name.clone(), value.clone());
    }

    // Repeated X-Forwarded-For headers fold into one comma-separated chain.
    let mut chain: Vec<String> = inbound
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect();
    chain.push(client_addr.to_string());
    let forwarded_for = chain.join(", ");

    if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
        outbound.insert("x-forwarded-for", value);
    }
    if let Ok(value) = HeaderValue::from_str(&origin.host_port()) {
        outbound.insert("x-forwarded-host", value);
    }
    if let Ok(value) = HeaderValue::from_str(&origin.scheme) {
        outbound.insert("x-forwarded-proto", value);
    }

    outbound
}

/// Filter the upstream response header set for the client leg.
///
/// Only hop-by-hop headers are dropped; everything else passes through in
/// the order the upstream sent it, duplicates included.
pub fn response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        filtered.append(name.clone(), value.clone());
    }
    filtered
}
