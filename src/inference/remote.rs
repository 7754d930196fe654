//! OpenAI-compatible chat completion backend.
//! Sends one system + user message pair to `/v1/chat/completions` and takes
//! the first choice's text.

use super::traits::{InferenceAdapter, Readiness};
use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::http_client::{build_client_with_timeout, error_body};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BACKEND: &str = "remote";

pub struct RemoteInference {
    base_url: String,
    /// Pre-computed chat completions URL (avoids `format!` per request).
    chat_url: String,
    model: String,
    system_prompt: String,
    timeout_secs: u64,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl RemoteInference {
    pub fn new(config: &InferenceConfig) -> Self {
        let base_url = config.url.trim_end_matches('/').to_string();
        let chat_url = if base_url.ends_with("chat/completions") {
            base_url.clone()
        } else {
            format!("{base_url}/v1/chat/completions")
        };

        Self {
            base_url,
            chat_url,
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            timeout_secs: config.timeout_secs,
            client: build_client_with_timeout(config.timeout_secs),
        }
    }

    pub fn chat_completions_url(&self) -> &str {
        &self.chat_url
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &self.system_prompt,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
        }
    }

    fn map_send_error(&self, err: &reqwest::Error) -> InferenceError {
        if err.is_timeout() {
            InferenceError::Timeout {
                backend: BACKEND.into(),
                after: Duration::from_secs(self.timeout_secs),
            }
        } else {
            InferenceError::Request {
                backend: BACKEND.into(),
                message: format!("{} unreachable: {err}", self.base_url),
            }
        }
    }
}

fn first_completion(response: ChatResponse) -> Result<String, InferenceError> {
    response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| InferenceError::MalformedResponse {
            backend: BACKEND.into(),
            message: "response has no choices".into(),
        })?
        .message
        .content
        .ok_or_else(|| InferenceError::MalformedResponse {
            backend: BACKEND.into(),
            message: "first choice has no message content".into(),
        })
}

#[async_trait]
impl InferenceAdapter for RemoteInference {
    fn name(&self) -> &str {
        BACKEND
    }

    fn readiness(&self) -> Readiness {
        Readiness::Ready
    }

    async fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        let response = self
            .client
            .post(&self.chat_url)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| self.map_send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(InferenceError::Request {
                backend: BACKEND.into(),
                message: format!("API error ({status}): {body}"),
            });
        }

        let chat_response: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| InferenceError::MalformedResponse {
                    backend: BACKEND.into(),
                    message: e.to_string(),
                })?;

        first_completion(chat_response)
    }
}
