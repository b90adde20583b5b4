//! External Service Error Types

use thiserror::Error;

/// Failure of a call to the hosted generative model.
///
/// This is the only failure class callers see; they log it and keep
/// whatever they were displaying before.
#[derive(Debug, Clone, Error)]
pub enum ExternalServiceError {
    /// No API key configured for the HTTP client
    #[error("Generative model API key is not configured")]
    MissingApiKey,

    /// Connection, TLS, or body read failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status from the model API
    #[error("Model API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The model returned no candidate text
    #[error("Model returned no usable candidate")]
    EmptyResponse,

    /// Output did not match the expected schema
    #[error("Response failed schema validation: {0}")]
    SchemaViolation(String),

    /// Input rejected before any request was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for ExternalServiceError {
    fn from(err: reqwest::Error) -> Self {
        ExternalServiceError::Transport(err.to_string())
    }
}
