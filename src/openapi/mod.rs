//! OpenAPI / Swagger document handling.
//!
//! # Data Flow
//! ```text
//! fetch.rs   (GET the upstream's raw document through the shared client)
//!     → document.rs (structural parse, schema family decided once)
//!     → rewrite.rs  (version normalize, origin rewrite, path prefixing)
//!     → merge.rs    (optional aggregation into the local baseline)
//!     → served as JSON, recomputed per request
//! ```
//!
//! # Design Decisions
//! - Schema family is a tagged enum decided at parse time; later stages
//!   dispatch on the tag instead of re-probing fields
//! - Every stage is value-in/value-out and idempotent
//! - No caching: a fetch of a documentation endpoint always reflects the
//!   upstream's current document

pub mod document;
pub mod fetch;
pub mod merge;
pub mod rewrite;

pub use document::DescriptionDocument;
pub use fetch::SpecFetcher;

use thiserror::Error;

use crate::forward::ForwardError;

/// Failure anywhere along the description pipeline.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("Failed to fetch upstream spec: {0}")]
    Fetch(#[from] ForwardError),

    #[error("Upstream spec endpoint returned status {0}")]
    UpstreamStatus(u16),

    #[error("Failed to read upstream spec body: {0}")]
    Read(String),

    #[error("Failed to process upstream spec: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Upstream is not a valid OpenAPI/Swagger document")]
    UnknownFamily,

    #[error("Spec URL '{0}' is not a valid request target")]
    BadSpecUrl(String),
}
