//! Product Lens
//!
//! Upload a product photo as a data URI, then ask for matching shopping
//! listings. The stored image is described by a vision-capable chat model and
//! the description is used as a shopping search query.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod providers;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, Result};
pub use pipeline::{Orchestrator, PipelineError, ProductRecord};
