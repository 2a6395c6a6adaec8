//! Request and response bodies for the HTTP surface

use crate::pipeline::{PipelineError, ProductRecord, StoreError};
use crate::providers::UpstreamError;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATUS_OK: &str = "ok";
pub const STATUS_FAILED: &str = "failed";

/// Field carrying the image in `POST /search/`
pub const DATA_URI_FIELD: &str = "data_uri";

/// `POST /search/` success body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub status: String,
    pub stored_length: usize,
}

impl IngestResponse {
    pub fn new(stored_length: usize) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            stored_length,
        }
    }
}

/// `GET /search/` success body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub status: String,
    pub items: Vec<ProductRecord>,
}

impl SearchResponse {
    pub fn new(items: Vec<ProductRecord>) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            items,
        }
    }
}

/// Error body; `status` is only present on some errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: Some(STATUS_FAILED.to_string()),
        }
    }
}

/// Pull `data_uri` out of a raw request body
///
/// A body that is missing, not JSON, or not an object counts as "no data_uri".
pub fn parse_data_uri(body: &[u8]) -> Result<String, StoreError> {
    let mut value: Value = serde_json::from_slice(body).map_err(|_| StoreError::Missing)?;

    let field = value
        .as_object_mut()
        .and_then(|object| object.remove(DATA_URI_FIELD))
        .ok_or(StoreError::Missing)?;

    match field {
        Value::String(data_uri) if !data_uri.is_empty() => Ok(data_uri),
        _ => Err(StoreError::InvalidInput),
    }
}

/// Map a pipeline failure to its HTTP status and body
pub fn error_response(err: &PipelineError) -> (StatusCode, ApiError) {
    match err {
        PipelineError::Store(StoreError::Missing) => {
            (StatusCode::BAD_REQUEST, ApiError::failed(err.to_string()))
        }
        PipelineError::Store(StoreError::InvalidInput) => {
            (StatusCode::BAD_REQUEST, ApiError::new(err.to_string()))
        }
        PipelineError::Store(StoreError::TooLarge { .. }) => (
            StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::new("data_uri too large"),
        ),
        PipelineError::Store(StoreError::Empty) => {
            (StatusCode::BAD_REQUEST, ApiError::failed(err.to_string()))
        }
        PipelineError::NotFound => (StatusCode::NOT_FOUND, ApiError::failed(err.to_string())),
        PipelineError::Describe(UpstreamError::Timeout(_))
        | PipelineError::Search(UpstreamError::Timeout(_)) => {
            (StatusCode::GATEWAY_TIMEOUT, ApiError::failed(err.to_string()))
        }
        PipelineError::Describe(_) | PipelineError::Search(_) => {
            (StatusCode::BAD_GATEWAY, ApiError::failed(err.to_string()))
        }
    }
}
