//! Description rewriting for serving through the gateway.
//!
//! Rewrites an upstream document so that every operation in it resolves
//! back through the proxy: the OpenAPI 3 family gets a single public
//! server entry and `/{name}`-prefixed path keys; the Swagger 2 family
//! encodes the prefix via `host`/`basePath` instead and keeps its path
//! keys untouched. Running the rewrite twice is a fixed point.

use serde_json::{json, Map, Value};

use crate::openapi::DescriptionDocument;
use crate::proxy::PublicOrigin;

/// Rewrite a parsed document for the given mount name and public origin.
pub fn rewrite(
    document: DescriptionDocument,
    origin: &PublicOrigin,
    name: &str,
) -> DescriptionDocument {
    match document {
        DescriptionDocument::OpenApi3(tree) => {
            DescriptionDocument::OpenApi3(rewrite_openapi3(tree, origin, name))
        }
        DescriptionDocument::Swagger2(tree) => {
            DescriptionDocument::Swagger2(rewrite_swagger2(tree, origin, name))
        }
    }
}

fn rewrite_openapi3(mut tree: Map<String, Value>, origin: &PublicOrigin, name: &str) -> Map<String, Value> {
    let mount = format!("/{name}");

    // Older viewers cannot render 3.1.x documents.
    if let Some(version) = tree.get("openapi").and_then(Value::as_str) {
        if version.starts_with("3.1") {
            tree.insert("openapi".to_string(), json!("3.0.3"));
        }
    }

    tree.insert("servers".to_string(), json!([{ "url": origin.origin() }]));

    if let Some(Value::Object(paths)) = tree.remove("paths") {
        let mut prefixed = Map::with_capacity(paths.len());
        for (path, item) in paths {
            let key = if path.starts_with(&mount) {
                path
            } else if path.starts_with('/') {
                format!("{mount}{path}")
            } else {
                format!("{mount}/{path}")
            };
            prefixed.insert(key, item);
        }
        tree.insert("paths".to_string(), Value::Object(prefixed));
    }

    tree
}

fn rewrite_swagger2(mut tree: Map<String, Value>, origin: &PublicOrigin, name: &str) -> Map<String, Value> {
    tree.insert("swagger".to_string(), json!("2.0"));
    tree.insert("host".to_string(), json!(origin.host_port()));
    // basePath carries the mount, so path keys stay as the upstream wrote them.
    tree.insert("basePath".to_string(), json!(format!("/{name}")));
    tree.insert("schemes".to_string(), json!([origin.scheme]));
    tree
}
