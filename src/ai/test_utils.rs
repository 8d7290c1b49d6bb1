//! Scripted model client for session tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use crate::ai::{AiClient, AiClientMetadata};

/// Replies still to be handed out, plus what to answer once they run out.
struct Script {
    replies: VecDeque<Result<String>>,
    fallback: Option<String>,
}

impl Script {
    fn next(&mut self) -> Result<String> {
        match self.replies.pop_front() {
            Some(reply) => reply,
            None => match &self.fallback {
                Some(reply) => Ok(reply.clone()),
                None => Err(anyhow!("script exhausted")),
            },
        }
    }
}

/// Model client that plays back a fixed script of replies.
///
/// Replies come out in order. Once the script is used up every further
/// request gets the [`when_exhausted`](Self::when_exhausted) reply, or an
/// error if none was set. Each request's `(system, user)` prompt pair is
/// recorded and can be read through [`prompt_handle`](Self::prompt_handle).
pub(crate) struct ScriptedAiClient {
    script: Arc<Mutex<Script>>,
    recorded_prompts: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedAiClient {
    /// Client with an explicit script, errors included.
    pub(crate) fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                replies: VecDeque::from(replies),
                fallback: None,
            })),
            recorded_prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Client that answers with each of `messages` in turn.
    pub(crate) fn replying(messages: &[&str]) -> Self {
        Self::new(messages.iter().map(|m| Ok((*m).to_string())).collect())
    }

    /// Answers `reply` to every request made after the script runs out.
    pub(crate) fn when_exhausted(self, reply: &str) -> Self {
        self.script.lock().unwrap().fallback = Some(reply.to_string());
        self
    }

    /// Returns a handle for inspecting which prompts were sent.
    pub(crate) fn prompt_handle(&self) -> PromptRecordHandle {
        PromptRecordHandle {
            recorded_prompts: Arc::clone(&self.recorded_prompts),
        }
    }
}

/// Shared view of the prompts a [`ScriptedAiClient`] received.
pub(crate) struct PromptRecordHandle {
    recorded_prompts: Arc<Mutex<Vec<(String, String)>>>,
}

impl PromptRecordHandle {
    /// All recorded `(system_prompt, user_prompt)` pairs.
    pub(crate) fn prompts(&self) -> Vec<(String, String)> {
        self.recorded_prompts.lock().unwrap().clone()
    }

    /// User prompts only, in request order.
    pub(crate) fn user_prompts(&self) -> Vec<String> {
        self.prompts().into_iter().map(|(_, user)| user).collect()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.recorded_prompts.lock().unwrap().len()
    }
}

impl AiClient for ScriptedAiClient {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            self.recorded_prompts
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), user_prompt.to_string()));
            self.script.lock().unwrap().next()
        })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        AiClientMetadata {
            provider: "scripted".to_string(),
            model: "scripted-model".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_in_order_then_errors() {
        let client = ScriptedAiClient::replying(&["one", "two"]);

        assert_eq!(client.send_request("s", "u1").await.unwrap(), "one");
        assert_eq!(client.send_request("s", "u2").await.unwrap(), "two");
        let err = client.send_request("s", "u3").await.unwrap_err();
        assert_eq!(err.to_string(), "script exhausted");
    }

    #[tokio::test]
    async fn fallback_repeats_after_script() {
        let client = ScriptedAiClient::replying(&["first"]).when_exhausted("again");
        let prompts = client.prompt_handle();

        assert_eq!(client.send_request("s", "a").await.unwrap(), "first");
        assert_eq!(client.send_request("s", "b").await.unwrap(), "again");
        assert_eq!(client.send_request("s", "c").await.unwrap(), "again");
        assert_eq!(prompts.user_prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn scripted_errors_are_returned_once() {
        let client = ScriptedAiClient::new(vec![Err(anyhow!("rate limited"))]).when_exhausted("ok");

        assert!(client.send_request("s", "u").await.is_err());
        assert_eq!(client.send_request("s", "u").await.unwrap(), "ok");
    }
}
