//! Aggregation of an external document into the local baseline.
//!
//! Three independent passes (tags, paths, component schemas), each total on
//! valid inputs. The local document is authoritative: path collisions keep
//! the local entry under the default policy, while tag and schema
//! collisions rename the incoming entry instead of dropping it.

use std::collections::HashSet;

use serde_json::{json, Map, Value};

use crate::config::{MergeConfig, PathCollision};

const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Merge one external (already rewritten) document tree into the local one,
/// returning the combined tree. The served server list is forced to the
/// root-relative entry so the viewer calls back through the gateway.
pub fn merge(
    mut local: Map<String, Value>,
    external: &Map<String, Value>,
    options: &MergeConfig,
) -> Map<String, Value> {
    merge_tags(&mut local, external, options);
    merge_paths(&mut local, external, options);
    merge_components(&mut local, external);
    local.insert("servers".to_string(), json!([{ "url": "/" }]));
    local
}

fn merge_tags(local: &mut Map<String, Value>, external: &Map<String, Value>, options: &MergeConfig) {
    let Some(Value::Array(external_tags)) = external.get("tags") else {
        return;
    };

    let tags = local
        .entry("tags".to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    let Value::Array(tags) = tags else { return };

    let mut names: HashSet<String> = tags
        .iter()
        .filter_map(|t| t.get("name").and_then(Value::as_str))
        .map(String::from)
        .collect();

    for tag in external_tags {
        let Some(name) = tag.get("name").and_then(Value::as_str) else {
            continue;
        };
        let renamed = format!("{}{}", options.tag_prefix, name);
        if names.insert(renamed.clone()) {
            let mut entry = Map::new();
            entry.insert("name".to_string(), json!(renamed));
            if let Some(description) = tag.get("description") {
                entry.insert("description".to_string(), description.clone());
            }
            tags.push(Value::Object(entry));
        }
    }
}

fn merge_paths(local: &mut Map<String, Value>, external: &Map<String, Value>, options: &MergeConfig) {
    let Some(Value::Object(external_paths)) = external.get("paths") else {
        return;
    };

    if !matches!(local.get("paths"), Some(Value::Object(_))) {
        local.insert("paths".to_string(), json!({}));
    }
    let Some(Value::Object(local_paths)) = local.get_mut("paths") else {
        return;
    };

    for (raw, item) in external_paths {
        let key = collapse_slashes(&format!("{}{}", options.path_prefix, raw));

        if local_paths.contains_key(&key) && options.prefer_local {
            match options.collision {
                PathCollision::Path => continue,
                PathCollision::Operation => {
                    copy_missing_operations(local_paths, &key, item, &options.tag_prefix);
                    continue;
                }
            }
        }

        let mut item = item.clone();
        if let Some(operations) = item.as_object_mut() {
            for method in HTTP_METHODS {
                if let Some(operation) = operations.get_mut(method) {
                    prefix_operation_tags(operation, &options.tag_prefix);
                }
            }
        }
        local_paths.insert(key, item);
    }
}

/// Operation-granularity collision handling: copy only the HTTP methods the
/// local path item does not define itself.
fn copy_missing_operations(
    local_paths: &mut Map<String, Value>,
    key: &str,
    external_item: &Value,
    tag_prefix: &str,
) {
    let Some(Value::Object(local_item)) = local_paths.get_mut(key) else {
        return;
    };
    let Some(external_item) = external_item.as_object() else {
        return;
    };

    for method in HTTP_METHODS {
        if local_item.contains_key(method) {
            continue;
        }
        if let Some(operation) = external_item.get(method) {
            let mut operation = operation.clone();
            prefix_operation_tags(&mut operation, tag_prefix);
            local_item.insert(method.to_string(), operation);
        }
    }
}

fn prefix_operation_tags(operation: &mut Value, prefix: &str) {
    let Some(Value::Array(tags)) = operation.get_mut("tags") else {
        return;
    };
    for tag in tags.iter_mut() {
        if let Value::String(name) = tag {
            *name = format!("{prefix}{name}");
        }
    }
}

fn merge_components(local: &mut Map<String, Value>, external: &Map<String, Value>) {
    let Some(Value::Object(external_components)) = external.get("components") else {
        return;
    };

    if !matches!(local.get("components"), Some(Value::Object(_))) {
        local.insert("components".to_string(), json!({}));
    }
    let Some(Value::Object(local_components)) = local.get_mut("components") else {
        return;
    };

    // Schemas: colliding names stay addressable under a disambiguated name.
    if let Some(Value::Object(external_schemas)) = external_components.get("schemas") {
        if !matches!(local_components.get("schemas"), Some(Value::Object(_))) {
            local_components.insert("schemas".to_string(), json!({}));
        }
        if let Some(Value::Object(local_schemas)) = local_components.get_mut("schemas") {
            for (name, schema) in external_schemas {
                let target = if local_schemas.contains_key(name) {
                    format!("B_{name}")
                } else {
                    name.clone()
                };
                local_schemas
                    .entry(target)
                    .or_insert_with(|| schema.clone());
            }
        }
    }

    // Other component kinds merge presence-based: add when absent.
    for kind in ["responses", "parameters", "requestBodies", "securitySchemes"] {
        let Some(Value::Object(external_kind)) = external_components.get(kind) else {
            continue;
        };
        if !matches!(local_components.get(kind), Some(Value::Object(_))) {
            local_components.insert(kind.to_string(), json!({}));
        }
        if let Some(Value::Object(local_kind)) = local_components.get_mut(kind) {
            for (name, value) in external_kind {
                local_kind
                    .entry(name.clone())
                    .or_insert_with(|| value.clone());
            }
        }
    }
}

fn collapse_slashes(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !previous_slash {
                collapsed.push(c);
            }
            previous_slash = true;
        } else {
            collapsed.push(c);
            previous_slash = false;
        }
    }
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(raw: &str) -> Map<String, Value> {
        serde_json::from_str::<Value>(raw)
            .unwrap()
            .as_object()
            .unwrap()
            .clone()
    }

    #[test]
    fn colliding_schemas_are_renamed_not_dropped() {
        let local = tree(r#"{"components":{"schemas":{"User":{"type":"object"}}}}"#);
        let external = tree(r#"{"components":{"schemas":{"User":{"type":"string"},"Order":{}}}}"#);

        let merged = merge(local, &external, &MergeConfig::default());
        let schemas = merged["components"]["schemas"].as_object().unwrap();

        assert_eq!(schemas["User"], json!({"type":"object"}));
        assert_eq!(schemas["B_User"], json!({"type":"string"}));
        assert!(schemas.contains_key("Order"));
    }

    #[test]
    fn local_wins_on_path_collision() {
        let local = tree(r#"{"paths":{"/ping":{"get":{"tags":["local"]}}}}"#);
        let external = tree(r#"{"paths":{"/ping":{"get":{"tags":["ext"]},"post":{}},"/pong":{"get":{"tags":["ext"]}}}}"#);

        let merged = merge(local, &external, &MergeConfig::default());
        let paths = merged["paths"].as_object().unwrap();

        assert_eq!(paths["/ping"], json!({"get":{"tags":["local"]}}));
        // Kept external paths still get their tags prefixed.
        assert_eq!(paths["/pong"]["get"]["tags"], json!(["[B] ext"]));
    }

    #[test]
    fn operation_granularity_fills_missing_methods() {
        let local = tree(r#"{"paths":{"/ping":{"get":{"tags":["local"]}}}}"#);
        let external = tree(r#"{"paths":{"/ping":{"get":{"tags":["ext"]},"post":{"tags":["ext"]}}}}"#);

        let options = MergeConfig {
            collision: PathCollision::Operation,
            ..MergeConfig::default()
        };
        let merged = merge(local, &external, &options);
        let ping = merged["paths"]["/ping"].as_object().unwrap();

        assert_eq!(ping["get"]["tags"], json!(["local"]));
        assert_eq!(ping["post"]["tags"], json!(["[B] ext"]));
    }

    #[test]
    fn tags_are_prefixed_and_deduplicated() {
        let local = tree(r#"{"tags":[{"name":"[B] orders"}]}"#);
        let external = tree(r#"{"tags":[{"name":"orders","description":"d"},{"name":"billing"}]}"#);

        let merged = merge(local, &external, &MergeConfig::default());
        let names: Vec<&str> = merged["tags"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();

        assert_eq!(names, vec!["[B] orders", "[B] billing"]);
    }

    #[test]
    fn path_prefix_is_slash_normalized() {
        let local = tree(r#"{}"#);
        let external = tree(r#"{"paths":{"/items":{}}}"#);

        let options = MergeConfig {
            path_prefix: "/ext/".to_string(),
            ..MergeConfig::default()
        };
        let merged = merge(local, &external, &options);
        assert!(merged["paths"].as_object().unwrap().contains_key("/ext/items"));
    }

    #[test]
    fn servers_are_forced_to_root() {
        let local = tree(r#"{"servers":[{"url":"https://local"}]}"#);
        let merged = merge(local, &tree("{}"), &MergeConfig::default());
        assert_eq!(merged["servers"], json!([{"url":"/"}]));
    }
}
