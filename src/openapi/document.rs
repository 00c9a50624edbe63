//! Parsed description documents, tagged by schema family.

use serde_json::{Map, Value};

use crate::openapi::SpecError;

/// An upstream's API description, with the schema family decided once at
/// parse time. The two families carry the same JSON tree type but obey
/// different rewrite rules.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptionDocument {
    /// OpenAPI 3.x (`openapi` field starting with `3.`).
    OpenApi3(Map<String, Value>),
    /// Swagger 2.0 (`swagger` field present).
    Swagger2(Map<String, Value>),
}

impl DescriptionDocument {
    /// Structurally parse a raw document body and detect its family.
    pub fn parse(raw: &[u8]) -> Result<Self, SpecError> {
        let root: Value = serde_json::from_slice(raw)?;
        let Value::Object(map) = root else {
            return Err(SpecError::UnknownFamily);
        };

        let is_openapi3 = map
            .get("openapi")
            .and_then(Value::as_str)
            .map(|v| v.starts_with("3."))
            .unwrap_or(false);

        if is_openapi3 {
            Ok(Self::OpenApi3(map))
        } else if map.contains_key("swagger") {
            Ok(Self::Swagger2(map))
        } else {
            Err(SpecError::UnknownFamily)
        }
    }

    /// The document's declared version string.
    pub fn version(&self) -> Option<&str> {
        match self {
            Self::OpenApi3(map) => map.get("openapi").and_then(Value::as_str),
            Self::Swagger2(map) => map.get("swagger").and_then(Value::as_str),
        }
    }

    /// Borrow the underlying JSON tree.
    pub fn tree(&self) -> &Map<String, Value> {
        match self {
            Self::OpenApi3(map) | Self::Swagger2(map) => map,
        }
    }

    /// Consume into the underlying JSON tree.
    pub fn into_tree(self) -> Map<String, Value> {
        match self {
            Self::OpenApi3(map) | Self::Swagger2(map) => map,
        }
    }

    /// Serialize back to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SpecError> {
        Ok(serde_json::to_vec(&Value::Object(self.tree().clone()))?)
    }
}
