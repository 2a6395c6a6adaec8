//! Route configuration

use axum::{
    extract::DefaultBodyLimit,
    middleware::map_response,
    routing::get,
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{self, AppState};

/// Build the service router
///
/// axum's default 2 MB extractor limit is replaced by an explicit
/// `max_body_bytes` limit so full-size data URIs reach the handler.
/// Requests over that limit get the JSON 413 body.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let search = get(handlers::search_products).post(handlers::ingest_image);

    Router::new()
        .route("/search/", search.clone())
        .route("/search", search)
        .route("/metrics", get(handlers::metrics))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(map_response(handlers::json_payload_too_large))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
