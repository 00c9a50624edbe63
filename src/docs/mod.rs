//! Documentation surface.
//!
//! # Responsibilities
//! - Serve the rewritten description document for one named upstream
//! - Serve the aggregate document (local baseline + all upstreams merged)
//! - Assemble Swagger-UI configuration JSON for single/group views
//! - Redirect viewer entry points at the computed configuration URL
//!
//! Documents are recomputed on every request; there is no cache, so the
//! served description always reflects the upstream's current document.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

use crate::http::server::AppState;
use crate::openapi::{merge, rewrite, DescriptionDocument, SpecError, SpecFetcher};
use crate::proxy::PublicOrigin;
use crate::registry::UpstreamEntry;

/// `GET /external-specs/{name}` — one upstream's document, rewritten so all
/// of its paths resolve through the gateway.
pub async fn rewritten_spec(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(entry) = state.registry.resolve(&name) else {
        return (
            StatusCode::NOT_FOUND,
            format!("Unknown API name: {name}"),
        )
            .into_response();
    };

    let origin = PublicOrigin::for_request(state.config.server.public_url.as_deref(), &headers);
    let fetcher = SpecFetcher::new(state.forwarder.clone());

    match fetch_and_rewrite(&fetcher, entry, &origin).await {
        Ok(document) => match document.to_bytes() {
            Ok(body) => json_response(body),
            Err(error) => spec_failure(entry, &error),
        },
        Err(error) => spec_failure(entry, &error),
    }
}

/// `GET /v3/api-docs` — the local baseline document with every registered
/// upstream's rewritten document merged in. Upstreams that cannot be
/// fetched or parsed are skipped; the rest of the document is still served.
///
/// Only the OpenAPI 3 family participates: a rewritten Swagger 2 document
/// carries its mount in `basePath`, which the merge does not read, so its
/// bare path keys would not resolve through the gateway.
pub async fn aggregate_document(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let origin = PublicOrigin::for_request(state.config.server.public_url.as_deref(), &headers);
    let fetcher = SpecFetcher::new(state.forwarder.clone());

    let mut combined = baseline_document(&state);

    for entry in state.registry.entries() {
        match fetch_and_rewrite(&fetcher, entry, &origin).await {
            Ok(DescriptionDocument::OpenApi3(tree)) => {
                let before = path_count(&combined);
                combined = merge::merge(combined, &tree, &state.config.merge);
                tracing::info!(
                    upstream = %entry.name,
                    paths_before = before,
                    paths_after = path_count(&combined),
                    "Merged upstream document"
                );
            }
            Ok(DescriptionDocument::Swagger2(_)) => {
                tracing::warn!(
                    upstream = %entry.name,
                    "Swagger 2.0 document cannot join the OpenAPI 3 aggregate; skipping"
                );
            }
            Err(error) => {
                tracing::warn!(
                    upstream = %entry.name,
                    spec_url = %entry.spec_url,
                    error = %error,
                    "Skipping upstream document in aggregate"
                );
            }
        }
    }

    // The viewer must call back through the gateway, never an origin.
    combined.insert("servers".to_string(), json!([{ "url": "/" }]));

    Json(Value::Object(combined)).into_response()
}

/// `GET /swagger-config/single/{name}` — viewer configuration for one
/// upstream's document.
pub async fn config_single(Path(name): Path<String>) -> Json<Value> {
    let display = name.to_uppercase();
    Json(json!({
        "urls": [{ "name": display, "url": format!("/external-specs/{name}") }],
        "urlsPrimaryName": display,
        "layout": "StandaloneLayout",
        "deepLinking": true,
        "docExpansion": "none",
    }))
}

/// `GET /swagger-config/group/{group}` — viewer configuration listing every
/// upstream in the group.
pub async fn config_group(State(state): State<AppState>, Path(group): Path<String>) -> Json<Value> {
    let members = state.registry.group(&group);

    let urls: Vec<Value> = members
        .iter()
        .map(|e| json!({ "name": e.name, "url": format!("/external-specs/{}", e.name) }))
        .collect();

    let mut config = json!({
        "urls": urls,
        "layout": "StandaloneLayout",
        "deepLinking": true,
        "docExpansion": "none",
    });
    if let Some(first) = members.first() {
        config["urlsPrimaryName"] = json!(first.name);
    }
    Json(config)
}

/// `GET /docs/{name}` — point the viewer at the single-upstream config.
pub async fn open_single(Path(name): Path<String>) -> Response {
    viewer_redirect(&format!("/swagger-config/single/{name}"))
}

/// `GET /docs/group/{group}` — point the viewer at the group config.
pub async fn open_group(Path(group): Path<String>) -> Response {
    viewer_redirect(&format!("/swagger-config/group/{group}"))
}

async fn fetch_and_rewrite(
    fetcher: &SpecFetcher,
    entry: &UpstreamEntry,
    origin: &PublicOrigin,
) -> Result<DescriptionDocument, SpecError> {
    let raw = fetcher.fetch(&entry.spec_url).await?;
    let document = DescriptionDocument::parse(&raw)?;
    Ok(rewrite::rewrite(document, origin, &entry.name))
}

/// Local baseline document built from configuration. This is the
/// authoritative side of every merge. It carries no `servers` entry: the
/// aggregate always forces the root-relative server after merging.
fn baseline_document(state: &AppState) -> Map<String, Value> {
    let server = &state.config.server;
    let baseline = json!({
        "openapi": "3.0.3",
        "info": {
            "title": server.title,
            "version": server.version,
            "description": server.description,
        },
        "paths": {},
    });
    baseline.as_object().cloned().unwrap_or_default()
}

fn path_count(tree: &Map<String, Value>) -> usize {
    tree.get("paths")
        .and_then(Value::as_object)
        .map(|p| p.len())
        .unwrap_or(0)
}

fn spec_failure(entry: &UpstreamEntry, error: &SpecError) -> Response {
    tracing::warn!(
        upstream = %entry.name,
        spec_url = %entry.spec_url,
        error = %error,
        "Failed to serve rewritten document"
    );
    (StatusCode::BAD_GATEWAY, error.to_string()).into_response()
}

fn json_response(body: Vec<u8>) -> Response {
    let mut response = Response::new(Body::from(body));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// 302 at the viewer entry point, matching what interactive documentation
/// viewers expect from a browser navigation.
fn viewer_redirect(config_url: &str) -> Response {
    let location = format!("/swagger-ui/index.html?configUrl={config_url}");
    match HeaderValue::from_str(&location) {
        Ok(value) => {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::FOUND;
            response.headers_mut().insert(header::LOCATION, value);
            response
        }
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}
