//! Wiring from configuration to a ready router

use axum::Router;
use std::sync::Arc;
use tracing::info;

use crate::{
    api::{handlers::AppState, routes::build_router},
    config::Config,
    error::{AppError, Result},
    pipeline::{ImageStore, Orchestrator, SearchLocale},
    providers::{SerpApiSearcher, VisionDescriber},
};

/// Build the orchestrator and its provider clients from configuration
pub fn init_app_state(config: &Config) -> Result<AppState> {
    let describer = VisionDescriber::new(config.vision.clone())
        .map_err(|e| AppError::init("vision client", e.to_string()))?;
    let searcher = SerpApiSearcher::new(config.search.clone())
        .map_err(|e| AppError::init("search client", e.to_string()))?;

    info!(
        vision_endpoint = describer.endpoint(),
        search_endpoint = searcher.endpoint(),
        max_data_uri_bytes = config.store.max_data_uri_bytes,
        "Providers initialized"
    );

    let orchestrator = Orchestrator::new(
        ImageStore::new(config.store.max_data_uri_bytes),
        Arc::new(describer),
        Arc::new(searcher),
        SearchLocale::from(&config.search),
    );

    Ok(AppState::new(orchestrator))
}

/// Build the complete router for a configuration
pub fn build_app(config: &Config) -> Result<Router> {
    let state = init_app_state(config)?;
    Ok(build_router(state, config.server.max_body_bytes))
}
