//! Service-level errors (startup, configuration, wiring)
//!
//! Request-path failures live in [`crate::pipeline::PipelineError`]; this type
//! only covers what can go wrong before the server starts answering.

use thiserror::Error;

/// Result alias for service setup
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to initialize {component}: {message}")]
    Init {
        component: &'static str,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn init(component: &'static str, message: impl Into<String>) -> Self {
        Self::Init {
            component,
            message: message.into(),
        }
    }
}
