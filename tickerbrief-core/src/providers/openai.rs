//! Chat-completion client for OpenAI-compatible endpoints.
//!
//! The base URL is configurable so local deployments (LM Studio, vLLM, any
//! `/v1`-compatible server) work unchanged. Per the completion contract, a
//! failed request degrades to an empty string — callers decide whether that
//! means "abort" (requirement extraction) or "fall back" (report brief).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Completion, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

const SYSTEM_PROMPT: &str = "You are a professional stock-tracking assistant.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

pub struct ChatCompletionClient {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl ChatCompletionClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key,
        }
    }

    fn try_complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Credentials("completion api key is not set".into()))?;

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                endpoint: url,
            });
        }

        let parsed: ChatResponse = resp
            .json()
            .map_err(|e| ProviderError::ResponseFormat(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::ResponseFormat("reply has no choices".into()))?;
        Ok(content.trim().to_string())
    }
}

impl Completion for ChatCompletionClient {
    fn complete(&self, prompt: &str) -> String {
        match self.try_complete(prompt) {
            Ok(text) => text,
            Err(error) => {
                warn!(%error, "completion request failed");
                String::new()
            }
        }
    }
}
