use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::models::{error_response, parse_data_uri, ApiError, IngestResponse, SearchResponse};
use crate::metrics::METRICS;
use crate::pipeline::{ErrorKind, Orchestrator, PipelineError};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn reject(err: &PipelineError) -> (StatusCode, Json<ApiError>) {
    let (status, body) = error_response(err);
    (status, Json(body))
}

/// Store an image for later queries
///
/// POST /search/
pub async fn ingest_image(State(state): State<AppState>, body: Bytes) -> ApiResult<IngestResponse> {
    info!(body_bytes = body.len(), "Ingest request");

    let stored = match parse_data_uri(&body) {
        Ok(data_uri) => state.orchestrator.ingest(data_uri).await,
        Err(e) => Err(e.into()),
    };

    match stored {
        Ok(length) => {
            METRICS.record_ingest(true);
            Ok(Json(IngestResponse::new(length)))
        }
        Err(e) => {
            METRICS.record_ingest(false);
            Err(reject(&e))
        }
    }
}

/// Run the describe/search pipeline on the stored image
///
/// GET /search/
pub async fn search_products(State(state): State<AppState>) -> ApiResult<SearchResponse> {
    info!("Product search request");

    match state.orchestrator.query().await {
        Ok(items) => {
            METRICS.record_query("ok");
            Ok(Json(SearchResponse::new(items)))
        }
        Err(e) => {
            let outcome = match e.kind() {
                ErrorKind::State => "no_image",
                other => other.as_str(),
            };
            METRICS.record_query(outcome);
            Err(reject(&e))
        }
    }
}

/// Give body-limit rejections the same JSON body as an oversized data URI
pub async fn json_payload_too_large(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if response.status() != StatusCode::PAYLOAD_TOO_LARGE || is_json {
        return response;
    }

    METRICS.record_ingest(false);
    (
        StatusCode::PAYLOAD_TOO_LARGE,
        Json(ApiError::new("data_uri too large")),
    )
        .into_response()
}

/// Prometheus exposition
///
/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.export_prometheus(),
    )
}
