//! Outbound HTTP forwarding.
//!
//! # Responsibilities
//! - Own the single shared upstream client and its connection pool
//! - Apply connect/read timeouts to every outbound exchange
//! - Categorize transport failures for logging and 502 bodies
//!
//! # Design Decisions
//! - One client for the whole process, injected into proxying and
//!   description fetching alike
//! - Request and response bodies are streamed, never buffered here
//! - Dropping the response body releases the pooled connection

use std::error::Error as _;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::time;

use crate::config::ClientConfig;

/// Transport-level failure talking to an upstream.
///
/// The display form is what ends up in 502 response bodies, so it keeps the
/// underlying OS-level message ("Connection refused", "Connection reset by
/// peer") when one is available.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("Upstream timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Transport(String),
}

impl ForwardError {
    /// Short category string for structured logs.
    pub fn category(&self) -> &'static str {
        match self {
            ForwardError::Timeout(_) => "timeout",
            ForwardError::Transport(_) => "transport",
        }
    }
}

/// Shared upstream HTTP client with a bounded connection pool.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    read_timeout: Duration,
}

impl Forwarder {
    /// Build the forwarder from client configuration. Called once at startup.
    pub fn new(config: &ClientConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));

        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .build(connector);

        Self {
            client,
            read_timeout: Duration::from_secs(config.read_timeout_secs),
        }
    }

    /// Send one request to an upstream.
    ///
    /// The read timeout covers connection establishment and response head;
    /// body streaming afterwards is bounded by the outer request timeout.
    pub async fn send(&self, request: Request<Body>) -> Result<Response<Incoming>, ForwardError> {
        match time::timeout(self.read_timeout, self.client.request(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(error)) => Err(ForwardError::Transport(describe(&error))),
            Err(_) => Err(ForwardError::Timeout(self.read_timeout)),
        }
    }
}

/// Pull the most specific message out of a client error chain.
///
/// The legacy client wraps IO errors several layers deep; the innermost
/// `io::Error` carries the OS message we want clients to see.
fn describe(error: &hyper_util::client::legacy::Error) -> String {
    let mut source: Option<&(dyn std::error::Error + 'static)> = error.source();
    let mut deepest_io: Option<String> = None;

    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            deepest_io = Some(io.to_string());
        }
        source = inner.source();
    }

    deepest_io.unwrap_or_else(|| error.to_string())
}
