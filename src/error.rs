//! Error types for the crypto agent orchestrator

use thiserror::Error;

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {

    // =============================
    // Core Pipeline Errors
    // =============================

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Unroutable decision: {0}")]
    InvalidRoute(String),

    #[error("Graph error: {0}")]
    GraphError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
