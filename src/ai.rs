//! Model client trait and implementations.

pub mod error;
pub mod openai;

#[cfg(test)]
pub(crate) mod test_utils;

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

pub use openai::OpenAiClient;

/// Metadata about an AI client implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AiClientMetadata {
    /// Service provider name.
    pub provider: String,
    /// Model identifier.
    pub model: String,
}

/// Trait for AI service clients.
pub trait AiClient: Send + Sync {
    /// Sends a request to the AI service and returns the response text.
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    /// Returns metadata about the AI client implementation.
    fn get_metadata(&self) -> AiClientMetadata;
}
