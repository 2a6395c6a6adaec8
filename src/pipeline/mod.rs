//! Ingest / describe / search / normalize pipeline
//!
//! An ingest only touches the [`ImageStore`]. A query loads the stored image,
//! asks the vision provider for a description, searches for it and normalizes
//! the listings. The first failing stage ends the run and its error is returned
//! as is. Nothing is cached between queries.

pub mod models;
pub mod normalizer;
pub mod orchestrator;
pub mod store;

use crate::providers::{SearchError, UpstreamError};
use thiserror::Error;

pub use models::{ProductRecord, RawProductEntry, SearchLocale, SearchQuery, StoredImage};
pub use normalizer::normalize;
pub use orchestrator::{Orchestrator, PipelineState};
pub use store::{ImageStore, StoreError};

/// Pipeline stage, used to tag failures and log lines
///
/// `Normalizing` never fails; it only appears in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingest,
    Load,
    Describing,
    Searching,
    Normalizing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ingest => "ingest",
            Self::Load => "load",
            Self::Describing => "describing",
            Self::Searching => "searching",
            Self::Normalizing => "normalizing",
        }
    }
}

/// Failure categories exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, invalid or oversized image payload
    Input,
    /// Query issued with no stored image
    State,
    /// A provider failed or returned something unusable
    Upstream,
    Timeout,
    /// Search succeeded with zero listings
    NotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::State => "state",
            Self::Upstream => "upstream",
            Self::Timeout => "timeout",
            Self::NotFound => "not_found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Description failed: {0}")]
    Describe(UpstreamError),

    #[error("Search failed: {0}")]
    Search(UpstreamError),

    #[error("No products found")]
    NotFound,
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Store(StoreError::Empty) => Stage::Load,
            Self::Store(_) => Stage::Ingest,
            Self::Describe(_) => Stage::Describing,
            Self::Search(_) | Self::NotFound => Stage::Searching,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(StoreError::Empty) => ErrorKind::State,
            Self::Store(_) => ErrorKind::Input,
            Self::Describe(e) | Self::Search(e) if e.is_timeout() => ErrorKind::Timeout,
            Self::Describe(_) | Self::Search(_) => ErrorKind::Upstream,
            Self::NotFound => ErrorKind::NotFound,
        }
    }
}

impl From<SearchError> for PipelineError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::NotFound => Self::NotFound,
            SearchError::Upstream(e) => Self::Search(e),
        }
    }
}
