//! Single-slot image store
//!
//! Holds at most one data URI. Every successful ingest replaces the slot.
//! Readers get an `Arc` snapshot, so a query keeps working against the image it
//! loaded even if a newer ingest lands while it is waiting on upstream calls.

use super::models::StoredImage;
use crate::config::MAX_DATA_URI_BYTES;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Image store failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No candidate was supplied at all
    #[error("No data_uri provided")]
    Missing,

    /// Candidate was not a string, or was empty
    #[error("data_uri must be a non-empty string")]
    InvalidInput,

    #[error("data_uri too large ({length} > {max} bytes)")]
    TooLarge { length: usize, max: usize },

    /// Nothing has been ingested yet
    #[error("No data_uri is available")]
    Empty,
}

/// Owned single-slot store
#[derive(Debug)]
pub struct ImageStore {
    slot: RwLock<Option<Arc<StoredImage>>>,
    max_length: usize,
}

impl Default for ImageStore {
    fn default() -> Self {
        Self::new(MAX_DATA_URI_BYTES)
    }
}

impl ImageStore {
    /// Create an empty store accepting data URIs up to `max_length` bytes
    pub fn new(max_length: usize) -> Self {
        Self {
            slot: RwLock::new(None),
            max_length,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Validate `candidate` and replace the slot with it
    ///
    /// Returns the accepted length. On error the slot is left untouched.
    pub async fn ingest(&self, candidate: String) -> Result<usize, StoreError> {
        if candidate.is_empty() {
            return Err(StoreError::InvalidInput);
        }
        if candidate.len() > self.max_length {
            return Err(StoreError::TooLarge {
                length: candidate.len(),
                max: self.max_length,
            });
        }

        let image = Arc::new(StoredImage::new(candidate));
        let length = image.length;

        let previous = self.slot.write().await.replace(image);
        debug!(length, replaced = previous.is_some(), "Stored image replaced");

        Ok(length)
    }

    /// Snapshot of the stored image
    pub async fn current(&self) -> Result<Arc<StoredImage>, StoreError> {
        self.slot.read().await.clone().ok_or(StoreError::Empty)
    }

    pub async fn is_empty(&self) -> bool {
        self.slot.read().await.is_none()
    }
}
