//! Pipeline orchestration
//!
//! `Empty -> Stored` on the first successful ingest; a query runs
//! `Load -> Describing -> Searching -> Normalizing` and the slot stays `Stored`
//! afterwards, so the same image can be queried again. Normalizing cannot
//! fail, so a failed query always reports one of the earlier stages.
//!
//! The query works on a snapshot taken when it starts. If another caller
//! ingests while a query is waiting on a provider, the running query still
//! finishes against the image it loaded, but the caller cannot tell which of
//! two interleaved uploads its results belong to. That is accepted for the
//! single-user deployment this service targets.

use super::models::{ProductRecord, SearchLocale, SearchQuery};
use super::normalizer::normalize;
use super::store::ImageStore;
use super::{PipelineError, Stage};
use crate::providers::{DescriptionGenerator, ProductSearcher};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Observable slot state between requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Empty,
    Stored,
}

pub struct Orchestrator {
    store: ImageStore,
    describer: Arc<dyn DescriptionGenerator>,
    searcher: Arc<dyn ProductSearcher>,
    locale: SearchLocale,
}

impl Orchestrator {
    pub fn new(
        store: ImageStore,
        describer: Arc<dyn DescriptionGenerator>,
        searcher: Arc<dyn ProductSearcher>,
        locale: SearchLocale,
    ) -> Self {
        Self {
            store,
            describer,
            searcher,
            locale,
        }
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    pub fn locale(&self) -> &SearchLocale {
        &self.locale
    }

    pub async fn state(&self) -> PipelineState {
        if self.store.is_empty().await {
            PipelineState::Empty
        } else {
            PipelineState::Stored
        }
    }

    /// Replace the stored image; returns the accepted length
    pub async fn ingest(&self, candidate: String) -> Result<usize, PipelineError> {
        match self.store.ingest(candidate).await {
            Ok(length) => {
                info!(length, "Image stored");
                Ok(length)
            }
            Err(e) => {
                warn!(error = %e, stage = Stage::Ingest.as_str(), "Image rejected");
                Err(e.into())
            }
        }
    }

    /// Describe the stored image, search for it and normalize the results
    pub async fn query(&self) -> Result<Vec<ProductRecord>, PipelineError> {
        let result = self.run_query().await;
        if let Err(e) = &result {
            warn!(
                error = %e,
                stage = e.stage().as_str(),
                kind = e.kind().as_str(),
                "Query failed"
            );
        }
        result
    }

    async fn run_query(&self) -> Result<Vec<ProductRecord>, PipelineError> {
        let image = self.store.current().await?;
        debug!(length = image.length, stage = Stage::Load.as_str(), "Loaded stored image");

        let description = self
            .describer
            .describe(&image)
            .await
            .map_err(PipelineError::Describe)?;
        info!(
            description = %description,
            words = description.split_whitespace().count(),
            "Image described"
        );

        let query = SearchQuery {
            text: description,
            locale: self.locale.clone(),
        };
        let entries = self.searcher.search(&query).await?;
        debug!(count = entries.len(), stage = Stage::Searching.as_str(), "Search returned listings");

        let records = normalize(entries);
        info!(count = records.len(), stage = Stage::Normalizing.as_str(), "Query completed");
        Ok(records)
    }
}
