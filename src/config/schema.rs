//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address, connection cap).
    pub listener: ListenerConfig,

    /// Public server identity (origin override, document info).
    pub server: ServerConfig,

    /// Registered upstream APIs, in display order.
    pub upstreams: Vec<UpstreamConfig>,

    /// Fixed-prefix passthrough mode (single-upstream deployments).
    pub passthrough: PassthroughConfig,

    /// Outbound HTTP client settings (pool, timeouts).
    pub client: ClientConfig,

    /// OpenAPI merge policy knobs.
    pub merge: MergeConfig,

    /// Timeout configuration for inbound requests.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Public identity of this gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Public origin override (e.g., "https://api.example.com").
    /// When unset, the origin is derived from each request's Host header.
    pub public_url: Option<String>,

    /// Title of the served aggregate document.
    pub title: String,

    /// Version string of the served aggregate document.
    pub version: String,

    /// Description of the served aggregate document.
    pub description: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            public_url: None,
            title: "Relay Gateway API".to_string(),
            version: "v1".to_string(),
            description: "Aggregated API documentation served through the relay".to_string(),
        }
    }
}

/// One registered upstream API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Unique upstream name (case-insensitive), used as the mount segment.
    pub name: String,

    /// Optional group for the documentation viewer.
    #[serde(default)]
    pub group: Option<String>,

    /// Base URL requests are forwarded to (no trailing slash).
    pub base_url: String,

    /// URL of the upstream's OpenAPI/Swagger document.
    pub spec_url: String,
}

/// Fixed-prefix passthrough mode: everything under `prefix` is forwarded
/// unconditionally to `target_base_url`, path kept verbatim.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PassthroughConfig {
    /// Enable passthrough routing.
    pub enabled: bool,

    /// Path prefix captured by passthrough mode (e.g., "/api").
    pub prefix: String,

    /// Target base URL (no trailing slash).
    pub target_base_url: String,
}

impl Default for PassthroughConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            prefix: "/api".to_string(),
            target_base_url: String::new(),
        }
    }
}

/// Outbound HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Time allowed for the upstream to start responding, in seconds.
    pub read_timeout_secs: u64,

    /// Maximum idle pooled connections kept per upstream host.
    pub pool_max_idle_per_host: usize,

    /// How long an idle pooled connection is kept, in seconds.
    pub pool_idle_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            read_timeout_secs: 60,
            pool_max_idle_per_host: 50,
            pool_idle_timeout_secs: 90,
        }
    }
}

/// Collision granularity when a merged path already exists locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PathCollision {
    /// The whole external path item is dropped (local wins).
    #[default]
    Path,
    /// Only HTTP methods missing from the local path item are copied over.
    Operation,
}

/// OpenAPI merge policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Prefix prepended to external tag names.
    pub tag_prefix: String,

    /// Prefix prepended to external path keys.
    pub path_prefix: String,

    /// Keep the local entry on path collision.
    pub prefer_local: bool,

    /// Collision granularity for colliding paths.
    pub collision: PathCollision,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            tag_prefix: "[B] ".to_string(),
            path_prefix: String::new(),
            prefer_local: true,
            collision: PathCollision::Path,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
