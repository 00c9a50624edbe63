//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use openapi_relay::config::{RelayConfig, UpstreamConfig};
use openapi_relay::{HttpServer, Shutdown};
use tokio::net::TcpListener;

/// A running gateway instance. Dropping the handle shuts the server down.
pub struct Gateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(config: RelayConfig) -> Gateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let server = HttpServer::new(config);

    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    // Give the acceptor a moment to come up.
    tokio::time::sleep(Duration::from_millis(50)).await;

    Gateway { addr, shutdown }
}

/// Bind an ephemeral port for a mock upstream, so its address is known
/// before the router that needs it is built.
pub async fn bind_upstream() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Serve a mock upstream router on a previously bound listener.
pub fn serve_upstream(listener: TcpListener, router: axum::Router) {
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
}

/// Bind and serve a mock upstream in one step.
#[allow(dead_code)]
pub async fn start_upstream(router: axum::Router) -> SocketAddr {
    let (listener, addr) = bind_upstream().await;
    serve_upstream(listener, router);
    addr
}

/// Upstream config entry pointing at a mock backend.
pub fn upstream_entry(name: &str, addr: SocketAddr) -> UpstreamConfig {
    UpstreamConfig {
        name: name.to_string(),
        group: None,
        base_url: format!("http://{addr}"),
        spec_url: format!("http://{addr}/spec"),
    }
}

/// An address nothing is listening on (bound and immediately released).
#[allow(dead_code)]
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
