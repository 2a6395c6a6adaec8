//! SerpAPI shopping search client

use super::{read_credential, ProductSearcher, SearchError, UpstreamError};
use crate::config::SearchConfig;
use crate::metrics::{provider, METRICS};
use crate::pipeline::models::{RawProductEntry, SearchQuery};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, error};

/// Response field holding shoppable listings
pub const IMMERSIVE_PRODUCTS_FIELD: &str = "immersive_products";

/// Queries `GET {base_url}/search.json`
pub struct SerpApiSearcher {
    http: Client,
    endpoint: String,
    config: SearchConfig,
}

impl SerpApiSearcher {
    pub fn new(config: SearchConfig) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        let endpoint = format!("{}/search.json", config.base_url.trim_end_matches('/'));

        Ok(Self {
            http,
            endpoint,
            config,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call_search(&self, query: &SearchQuery) -> Result<Value, UpstreamError> {
        let api_key = read_credential(&self.config.api_key_env)?;

        let params = [
            ("engine", self.config.engine.as_str()),
            ("q", query.text.as_str()),
            ("location", query.locale.location.as_str()),
            ("hl", query.locale.language.as_str()),
            ("gl", query.locale.country.as_str()),
            ("google_domain", query.locale.domain.as_str()),
            ("api_key", api_key.expose_secret().as_str()),
        ];

        let response = self
            .http
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(UpstreamError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(UpstreamError::from_status(status, &error_text));
        }

        let body: Value = response
            .json()
            .await
            .map_err(UpstreamError::from_transport)?;

        if !body.is_object() {
            return Err(UpstreamError::InvalidResponse(
                "search response is not a JSON object".to_string(),
            ));
        }
        Ok(body)
    }
}

/// Pull the listings out of a search response
///
/// Absent, null, non-array and empty fields all mean "nothing found".
pub fn extract_products(mut body: Value) -> Result<Vec<RawProductEntry>, SearchError> {
    match body.get_mut(IMMERSIVE_PRODUCTS_FIELD).map(Value::take) {
        Some(Value::Array(items)) if !items.is_empty() => {
            Ok(items.into_iter().map(RawProductEntry::from_json).collect())
        }
        _ => Err(SearchError::NotFound),
    }
}

#[async_trait]
impl ProductSearcher for SerpApiSearcher {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawProductEntry>, SearchError> {
        let start = Instant::now();
        debug!(query = %query.text, gl = %query.locale.country, "Running shopping search");

        let result = self.call_search(query).await;
        METRICS.record_upstream(provider::SEARCH, result.is_ok(), start.elapsed().as_secs_f64());

        match result {
            Ok(body) => extract_products(body),
            Err(e) => {
                error!(error = %e, "Search provider call failed");
                Err(SearchError::Upstream(e))
            }
        }
    }
}
