//! Proxying subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, query, headers, body stream)
//!     → handler.rs (resolve upstream, build target URL)
//!     → headers.rs (drop hop-by-hop, add X-Forwarded-*)
//!     → forward (shared client, timeouts)
//!     → headers.rs (drop hop-by-hop on the response leg)
//!     → location.rs (keep redirects inside the gateway)
//!     → Stream response to client
//! ```
//!
//! # Design Decisions
//! - Two addressing modes: first path segment names the upstream, or a
//!   fixed configured prefix forwards everything to one target
//! - Bodies are opaque byte streams on both legs, never buffered
//! - Transport failures become 502 with the failure text as body

pub mod handler;
pub mod headers;
pub mod location;

pub use handler::proxy_handler;

use axum::http::HeaderMap;
use url::Url;

/// The public origin this gateway is reachable at, as seen by one request.
///
/// Derived from the `Host` header unless the configuration pins a public
/// URL. Ports 80 and 443 are treated as default and omitted from rendered
/// forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicOrigin {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
}

impl PublicOrigin {
    /// Derive the origin for one request.
    pub fn for_request(public_url: Option<&str>, headers: &HeaderMap) -> Self {
        if let Some(configured) = public_url.and_then(|u| Url::parse(u).ok()) {
            return Self {
                scheme: configured.scheme().to_string(),
                host: configured.host_str().unwrap_or("localhost").to_string(),
                port: configured.port(),
            };
        }

        let host_header = headers
            .get(axum::http::header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("localhost");

        let (host, port) = match host_header.rsplit_once(':') {
            Some((h, p)) => match p.parse::<u16>() {
                Ok(port) => (h.to_string(), Some(port)),
                Err(_) => (host_header.to_string(), None),
            },
            None => (host_header.to_string(), None),
        };

        Self {
            scheme: "http".to_string(),
            host,
            port,
        }
    }

    fn is_default_port(&self) -> bool {
        matches!(self.port, None | Some(80) | Some(443))
    }

    /// `host[:port]`, omitting default ports.
    pub fn host_port(&self) -> String {
        if self.is_default_port() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port.unwrap_or(80))
        }
    }

    /// `scheme://host[:port]`, omitting default ports.
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host_port())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn derives_origin_from_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("gw.example.com:8080"));

        let origin = PublicOrigin::for_request(None, &headers);
        assert_eq!(origin.origin(), "http://gw.example.com:8080");
        assert_eq!(origin.host_port(), "gw.example.com:8080");
    }

    #[test]
    fn default_ports_are_omitted() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("gw.example.com:80"));

        let origin = PublicOrigin::for_request(None, &headers);
        assert_eq!(origin.origin(), "http://gw.example.com");
    }

    #[test]
    fn configured_public_url_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("internal:8080"));

        let origin = PublicOrigin::for_request(Some("https://api.example.com"), &headers);
        assert_eq!(origin.origin(), "https://api.example.com");
        assert_eq!(origin.scheme, "https");
    }
}
