//! HTTP surface
//!
//! - `POST /search/` - store an image (`{"data_uri": "..."}`)
//! - `GET /search/` - describe the stored image and return matching products
//! - `GET /metrics` - Prometheus metrics
//!
//! `/search` without the trailing slash is served by the same handlers.

pub mod handlers;
pub mod integration;
pub mod models;
pub mod routes;

pub use handlers::AppState;
pub use integration::{build_app, init_app_state};
pub use routes::build_router;
