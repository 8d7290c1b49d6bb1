//! OpenAI-compatible chat completions client (OpenAI, OpenRouter and
//! compatible gateways).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{AiClient, AiClientMetadata};
use crate::ai::error::AiError;

/// HTTP request timeout for model calls.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Sampling temperature; low for consistent messages.
const TEMPERATURE: f32 = 0.2;

/// Chat message.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Message {
    role: String,
    content: String,
}

/// Chat completions request body.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: Option<String>,
}

/// Client for any endpoint that speaks the chat completions protocol.
pub struct OpenAiClient {
    client: Client,
    provider: String,
    model: String,
    api_key: String,
    /// Base URL without a trailing slash, e.g. `https://api.openai.com/v1`.
    base_url: String,
    headers: Vec<(String, String)>,
}

impl OpenAiClient {
    /// Creates a client. `headers` are sent with every request.
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: &str,
        headers: Vec<(String, String)>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            provider: provider.into(),
            model: model.into(),
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    /// Full chat completions URL.
    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Builds the request body for a prompt pair.
    pub fn chat_request(&self, system_prompt: &str, user_prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature: TEMPERATURE,
        }
    }

    /// Renders the request body as pretty JSON, as it would be sent.
    pub fn render_request(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        serde_json::to_string_pretty(&self.chat_request(system_prompt, user_prompt))
            .context("Failed to serialize request payload")
    }
}

impl AiClient for OpenAiClient {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            debug!(
                system_prompt_len = system_prompt.len(),
                user_prompt_len = user_prompt.len(),
                model = %self.model,
                base_url = %self.base_url,
                "Preparing chat completions request"
            );

            let request = self.chat_request(system_prompt, user_prompt);
            let api_url = self.api_url();
            info!(url = %api_url, model = %self.model, "Sending request to model provider");

            let mut req_builder = self
                .client
                .post(&api_url)
                .bearer_auth(&self.api_key)
                .json(&request);
            for (name, value) in &self.headers {
                req_builder = req_builder.header(name.as_str(), value.as_str());
            }

            let response = req_builder
                .send()
                .await
                .map_err(|e| AiError::NetworkError(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_else(|e| {
                    debug!("Failed to read error response body: {e}");
                    String::new()
                });
                return Err(
                    AiError::ApiRequestFailed(format!("HTTP {status}: {}", error_text.trim())).into(),
                );
            }

            let chat_response: ChatResponse = response
                .json()
                .await
                .map_err(|e| AiError::InvalidResponseFormat(e.to_string()))?;

            debug!(
                choice_count = chat_response.choices.len(),
                model = ?chat_response.model,
                "Received chat completions response"
            );

            let text = chat_response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| AiError::InvalidResponseFormat("No choices in response".to_string()))?
                .message
                .content
                .unwrap_or_default()
                .trim()
                .to_string();

            debug!(response_len = text.len(), "Extracted response text");
            Ok(text)
        })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        AiClientMetadata {
            provider: self.provider.clone(),
            model: self.model.clone(),
        }
    }
}
