//! Fetching raw description documents from upstreams.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, Request, Uri};
use url::Url;

use crate::forward::Forwarder;
use crate::openapi::SpecError;

/// Upper bound on a fetched document body. Description documents are text;
/// anything larger than this is not one.
const MAX_SPEC_BYTES: usize = 16 * 1024 * 1024;

/// Retrieves raw upstream description documents through the shared client.
#[derive(Clone)]
pub struct SpecFetcher {
    forwarder: Forwarder,
}

impl SpecFetcher {
    pub fn new(forwarder: Forwarder) -> Self {
        Self { forwarder }
    }

    /// GET the document at `spec_url` and buffer it for parsing.
    pub async fn fetch(&self, spec_url: &Url) -> Result<Bytes, SpecError> {
        let uri: Uri = spec_url
            .as_str()
            .parse()
            .map_err(|_| SpecError::BadSpecUrl(spec_url.to_string()))?;

        let mut request = Request::new(Body::empty());
        *request.uri_mut() = uri;
        request.headers_mut().insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, */*"),
        );

        let response = self.forwarder.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SpecError::UpstreamStatus(status.as_u16()));
        }

        axum::body::to_bytes(Body::new(response.into_body()), MAX_SPEC_BYTES)
            .await
            .map_err(|e| SpecError::Read(e.to_string()))
    }
}
