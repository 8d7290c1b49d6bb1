//! Model client errors.

use thiserror::Error;

/// Failures while talking to the model provider.
#[derive(Error, Debug)]
pub enum AiError {
    /// No API key in any of the searched variables.
    #[error("Missing API key for provider {provider}. Set {vars}")]
    ApiKeyNotFound {
        /// Provider name.
        provider: String,
        /// Variables that were searched.
        vars: String,
    },

    /// The provider answered with a non-success status.
    #[error("API request failed: {0}")]
    ApiRequestFailed(String),

    /// The response body did not have the expected shape.
    #[error("Invalid response format from API: {0}")]
    InvalidResponseFormat(String),

    /// Network connectivity error.
    #[error("Network error: {0}")]
    NetworkError(String),
}
