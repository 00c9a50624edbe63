//! End-to-end proxying behavior.

mod common;

use axum::{
    extract::{Query, Request},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    routing::{any, get, post},
    Json, Router,
};
use openapi_relay::config::RelayConfig;
use serde_json::{json, Value};
use std::collections::HashMap;

use common::{
    bind_upstream, dead_address, serve_upstream, start_gateway, start_upstream, upstream_entry,
};

/// Upstream handler that reflects what it received back as JSON.
async fn echo(request: Request) -> Json<Value> {
    let headers: HashMap<String, String> = request
        .headers()
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
        .collect();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(|q| q.to_string());
    let body = axum::body::to_bytes(request.into_body(), 1024 * 1024)
        .await
        .unwrap();

    Json(json!({
        "method": method,
        "path": path,
        "query": query,
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

#[tokio::test]
async fn forwards_method_path_query_and_body() {
    let upstream = start_upstream(Router::new().route("/v1/items", post(echo))).await;

    let mut config = RelayConfig::default();
    config.upstreams.push(upstream_entry("orders", upstream));
    let gateway = start_gateway(config).await;

    let response = reqwest::Client::new()
        .post(gateway.url("/orders/v1/items?limit=5"))
        .header("content-type", "application/json")
        .body(r#"{"sku":"a-1"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let echoed: Value = response.json().await.unwrap();
    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["path"], "/v1/items");
    assert_eq!(echoed["query"], "limit=5");
    assert_eq!(echoed["body"], r#"{"sku":"a-1"}"#);
    assert_eq!(echoed["headers"]["content-type"], "application/json");
}

#[tokio::test]
async fn unknown_upstream_is_a_404() {
    let gateway = start_gateway(RelayConfig::default()).await;

    let response = reqwest::get(gateway.url("/payments/v1/x")).await.unwrap();
    assert_eq!(response.status(), 404);
    assert!(response.text().await.unwrap().contains("Unknown upstream: payments"));
}

#[tokio::test]
async fn unreachable_upstream_is_a_502_naming_the_failure() {
    let mut config = RelayConfig::default();
    config.upstreams.push(upstream_entry("orders", dead_address().await));
    let gateway = start_gateway(config).await;

    let response = reqwest::get(gateway.url("/orders/v1/items")).await.unwrap();
    assert_eq!(response.status(), 502);
    assert!(response.text().await.unwrap().contains("Connection refused"));
}

#[tokio::test]
async fn upstream_status_passes_through() {
    let upstream = start_upstream(Router::new().route(
        "/teapot",
        get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }),
    ))
    .await;

    let mut config = RelayConfig::default();
    config.upstreams.push(upstream_entry("orders", upstream));
    let gateway = start_gateway(config).await;

    let response = reqwest::get(gateway.url("/orders/teapot")).await.unwrap();
    assert_eq!(response.status(), 418);
    assert_eq!(response.text().await.unwrap(), "short and stout");
}

#[tokio::test]
async fn hop_by_hop_headers_are_dropped_and_forwarding_metadata_added() {
    let upstream = start_upstream(Router::new().route("/check", get(echo))).await;

    let mut config = RelayConfig::default();
    config.upstreams.push(upstream_entry("orders", upstream));
    let gateway = start_gateway(config).await;

    let response = reqwest::Client::new()
        .get(gateway.url("/orders/check"))
        .header("te", "trailers")
        .header("x-custom", "kept")
        .send()
        .await
        .unwrap();

    let echoed: Value = response.json().await.unwrap();
    let headers = echoed["headers"].as_object().unwrap();

    assert!(!headers.contains_key("te"));
    assert_eq!(headers["x-custom"], "kept");
    assert_eq!(headers["x-forwarded-proto"], "http");
    assert_eq!(
        headers["x-forwarded-host"].as_str().unwrap(),
        format!("{}", gateway.addr)
    );
    assert_eq!(headers["x-forwarded-for"], "127.0.0.1");
}

#[tokio::test]
async fn response_hop_by_hop_headers_are_dropped() {
    let upstream = start_upstream(Router::new().route(
        "/h",
        get(|| async {
            let mut headers = HeaderMap::new();
            headers.insert("upgrade", "h2c".parse().unwrap());
            headers.insert("x-upstream", "yes".parse().unwrap());
            (headers, "body")
        }),
    ))
    .await;

    let mut config = RelayConfig::default();
    config.upstreams.push(upstream_entry("orders", upstream));
    let gateway = start_gateway(config).await;

    let response = reqwest::get(gateway.url("/orders/h")).await.unwrap();
    assert!(response.headers().get("upgrade").is_none());
    assert_eq!(response.headers().get("x-upstream").unwrap(), "yes");
}

#[tokio::test]
async fn absolute_location_into_the_upstream_is_rewritten() {
    let (listener, addr) = bind_upstream().await;
    let target = format!("http://{addr}/foo");
    serve_upstream(
        listener,
        Router::new().route(
            "/redirect",
            get(move || async move {
                let mut response = Response::new(axum::body::Body::empty());
                *response.status_mut() = StatusCode::FOUND;
                response
                    .headers_mut()
                    .insert(header::LOCATION, target.parse().unwrap());
                response
            }),
        ),
    );

    let mut config = RelayConfig::default();
    config.upstreams.push(upstream_entry("orders", addr));
    let gateway = start_gateway(config).await;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let response = client.get(gateway.url("/orders/redirect")).send().await.unwrap();

    assert_eq!(response.status(), 302);
    assert_eq!(response.headers().get("location").unwrap(), "/orders/foo");
}

#[tokio::test]
async fn relative_location_passes_through() {
    let upstream = start_upstream(Router::new().route(
        "/redirect",
        get(|| async {
            let mut response = Response::new(axum::body::Body::empty());
            *response.status_mut() = StatusCode::FOUND;
            response
                .headers_mut()
                .insert(header::LOCATION, "/foo".parse().unwrap());
            response
        }),
    ))
    .await;

    let mut config = RelayConfig::default();
    config.upstreams.push(upstream_entry("orders", upstream));
    let gateway = start_gateway(config).await;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let response = client.get(gateway.url("/orders/redirect")).send().await.unwrap();
    assert_eq!(response.headers().get("location").unwrap(), "/foo");
}

#[tokio::test]
async fn passthrough_mode_forwards_the_full_path() {
    let upstream = start_upstream(Router::new().route("/api/v1/abc", get(echo))).await;

    let mut config = RelayConfig::default();
    config.passthrough.enabled = true;
    config.passthrough.prefix = "/api".to_string();
    config.passthrough.target_base_url = format!("http://{upstream}");
    let gateway = start_gateway(config).await;

    let response = reqwest::get(gateway.url("/api/v1/abc?x=1")).await.unwrap();
    assert_eq!(response.status(), 200);
    let echoed: Value = response.json().await.unwrap();
    assert_eq!(echoed["path"], "/api/v1/abc");
    assert_eq!(echoed["query"], "x=1");
}

#[tokio::test]
async fn empty_remainder_hits_the_upstream_root() {
    let upstream = start_upstream(Router::new().route(
        "/",
        any(|Query(params): Query<HashMap<String, String>>| async move {
            Json(json!({ "root": true, "q": params.get("a") }))
        }),
    ))
    .await;

    let mut config = RelayConfig::default();
    config.upstreams.push(upstream_entry("orders", upstream));
    let gateway = start_gateway(config).await;

    let response = reqwest::get(gateway.url("/orders?a=b")).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["root"], true);
    assert_eq!(body["q"], "b");
}
