//! Upstream registry.
//!
//! # Responsibilities
//! - Hold the immutable set of registered upstreams
//! - Resolve a mount-segment name to its entry (case-insensitive)
//! - Keep the gateway's own endpoints out of name resolution
//!
//! # Design Decisions
//! - Built once from validated config, immutable at runtime
//! - Lookup map keyed by lowercase name; config order preserved for listing
//! - Reserved segments rejected before any map lookup

use std::collections::HashMap;

use url::Url;

use crate::config::UpstreamConfig;

/// Top-level path segments owned by the gateway itself. A request whose
/// first segment matches one of these is never treated as an upstream name.
pub const RESERVED_SEGMENTS: &[&str] = &[
    "docs",
    "swagger-ui",
    "swagger-config",
    "external-specs",
    "v3",
    "health",
];

/// A registered upstream, resolved and parsed at startup.
#[derive(Debug, Clone)]
pub struct UpstreamEntry {
    /// Mount-segment name as configured (original casing kept for display).
    pub name: String,
    /// Optional documentation group.
    pub group: Option<String>,
    /// Base URL proxied requests are forwarded to.
    pub base_url: Url,
    /// URL of the upstream's API description document.
    pub spec_url: Url,
}

impl UpstreamEntry {
    /// The mount prefix this upstream occupies, e.g. `/orders`.
    pub fn mount(&self) -> String {
        format!("/{}", self.name)
    }

    /// Base URL as a string without any trailing slash.
    pub fn base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }
}

/// Immutable name → upstream map, shared read-only across requests.
#[derive(Debug)]
pub struct UpstreamRegistry {
    entries: Vec<UpstreamEntry>,
    by_name: HashMap<String, usize>,
}

impl UpstreamRegistry {
    /// Build the registry from validated configuration.
    ///
    /// URLs are re-parsed here; validation has already guaranteed they are
    /// well-formed http(s) URLs, so a parse failure means the entry was
    /// never validated and is skipped with a warning.
    pub fn from_config(upstreams: &[UpstreamConfig]) -> Self {
        let mut entries = Vec::with_capacity(upstreams.len());
        let mut by_name = HashMap::with_capacity(upstreams.len());

        for upstream in upstreams {
            let (base_url, spec_url) =
                match (Url::parse(&upstream.base_url), Url::parse(&upstream.spec_url)) {
                    (Ok(b), Ok(s)) => (b, s),
                    _ => {
                        tracing::warn!(
                            name = %upstream.name,
                            base_url = %upstream.base_url,
                            "Skipping upstream with unparseable URL"
                        );
                        continue;
                    }
                };

            let index = entries.len();
            entries.push(UpstreamEntry {
                name: upstream.name.clone(),
                group: upstream.group.clone(),
                base_url,
                spec_url,
            });
            by_name.insert(upstream.name.to_lowercase(), index);
        }

        Self { entries, by_name }
    }

    /// Resolve a mount-segment name, case-insensitively.
    ///
    /// Reserved segments resolve to `None` even if an upstream was somehow
    /// registered under that name.
    pub fn resolve(&self, name: &str) -> Option<&UpstreamEntry> {
        let lower = name.to_lowercase();
        if RESERVED_SEGMENTS.contains(&lower.as_str()) {
            return None;
        }
        self.by_name.get(&lower).map(|&i| &self.entries[i])
    }

    /// All entries in configuration order.
    pub fn entries(&self) -> &[UpstreamEntry] {
        &self.entries
    }

    /// Entries belonging to a group, case-insensitively, config order kept.
    pub fn group(&self, group: &str) -> Vec<&UpstreamEntry> {
        self.entries
            .iter()
            .filter(|e| {
                e.group
                    .as_deref()
                    .map(|g| g.eq_ignore_ascii_case(group))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Whether a top-level segment is reserved for the gateway itself.
    pub fn is_reserved(segment: &str) -> bool {
        RESERVED_SEGMENTS.contains(&segment.to_lowercase().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> UpstreamRegistry {
        UpstreamRegistry::from_config(&[
            UpstreamConfig {
                name: "Orders".to_string(),
                group: Some("commerce".to_string()),
                base_url: "https://svc-orders.internal".to_string(),
                spec_url: "https://svc-orders.internal/v3/api-docs".to_string(),
            },
            UpstreamConfig {
                name: "billing".to_string(),
                group: Some("commerce".to_string()),
                base_url: "http://10.0.0.2:8080/".to_string(),
                spec_url: "http://10.0.0.2:8080/swagger.json".to_string(),
            },
        ])
    }

    #[test]
    fn resolves_case_insensitively() {
        let registry = registry();
        assert!(registry.resolve("orders").is_some());
        assert!(registry.resolve("ORDERS").is_some());
        assert_eq!(registry.resolve("orders").unwrap().name, "Orders");
        assert!(registry.resolve("payments").is_none());
    }

    #[test]
    fn reserved_segments_never_resolve() {
        let registry = UpstreamRegistry::from_config(&[UpstreamConfig {
            name: "docs".to_string(),
            group: None,
            base_url: "http://127.0.0.1:9000".to_string(),
            spec_url: "http://127.0.0.1:9000/spec".to_string(),
        }]);
        assert!(registry.resolve("docs").is_none());
        assert!(UpstreamRegistry::is_reserved("Swagger-UI"));
    }

    #[test]
    fn base_strips_trailing_slash() {
        let registry = registry();
        assert_eq!(registry.resolve("billing").unwrap().base(), "http://10.0.0.2:8080");
    }

    #[test]
    fn groups_preserve_config_order() {
        let registry = registry();
        let group = registry.group("Commerce");
        assert_eq!(group.len(), 2);
        assert_eq!(group[0].name, "Orders");
        assert_eq!(group[1].name, "billing");
    }
}
