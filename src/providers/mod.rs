//! External providers the pipeline depends on
//!
//! - [`DescriptionGenerator`]: image in, short product description out
//! - [`ProductSearcher`]: description in, raw shopping listings out
//!
//! Transport failures are translated into [`UpstreamError`] at this boundary;
//! no `reqwest` error leaves a provider module.

pub mod serpapi_client;
pub mod vision_client;

use crate::pipeline::models::{RawProductEntry, SearchQuery, StoredImage};
use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

pub use serpapi_client::SerpApiSearcher;
pub use vision_client::VisionDescriber;

/// Upstream provider failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Could not reach the provider or authenticate with it
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response arrived but could not be used
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("Upstream timed out: {0}")]
    Timeout(String),
}

impl UpstreamError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Translate a non-success response; rejected credentials count as unavailable
    pub(crate) fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let body = truncate_body(body);
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::Unavailable(format!("authentication rejected ({}): {}", status.as_u16(), body))
            }
            _ => Self::Status {
                status: status.as_u16(),
                body,
            },
        }
    }

    /// Translate a transport error, dropping the request URL (it may carry a key)
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Unavailable(err.to_string())
        }
    }
}

/// Search failures: an upstream problem, or a clean response without listings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("No products found")]
    NotFound,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Turns an image into a short product description
#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    async fn describe(&self, image: &StoredImage) -> Result<String, UpstreamError>;
}

/// Runs a shopping search for a description
#[async_trait]
pub trait ProductSearcher: Send + Sync {
    /// Non-empty list of raw listings in provider order
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawProductEntry>, SearchError>;
}

/// Read a provider key from the environment at call time
pub(crate) fn read_credential(env_var: &str) -> Result<SecretString, UpstreamError> {
    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Ok(SecretString::new(value.trim().to_string())),
        _ => Err(UpstreamError::Unavailable(format!(
            "credential {} is not set",
            env_var
        ))),
    }
}

/// Trim an upstream error body so it stays readable in logs and responses
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX_CHARS: usize = 512;
    if body.chars().count() <= MAX_CHARS {
        body.to_string()
    } else {
        let mut short: String = body.chars().take(MAX_CHARS).collect();
        short.push_str("...");
        short
    }
}
