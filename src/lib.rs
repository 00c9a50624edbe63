//! OpenAPI Relay Gateway Library
//!
//! A reverse proxy that fronts one or more upstream HTTP APIs under a single
//! public host and serves their OpenAPI/Swagger documents rewritten (and
//! optionally merged) so that everything resolves through the gateway.

pub mod config;
pub mod docs;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod openapi;
pub mod proxy;
pub mod registry;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
