// src/llm_extract.rs

use crate::config::LlmSection;
use crate::prompt;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{Instrument, info, warn};

/// Every failed extraction is reported as this prefix plus the error text.
pub const ERROR_PREFIX: &str = "An error occurred: ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Why a chat-completion call failed.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("authentication failed ({status}): {body}")]
    Authentication { status: u16, body: String },
    #[error("rate limited ({status}): {body}")]
    RateLimited { status: u16, body: String },
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl LlmError {
    /// Map a non-success HTTP status onto an error class.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let code = status.as_u16();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                LlmError::Authentication { status: code, body }
            }
            StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited { status: code, body },
            _ => LlmError::Api { status: code, body },
        }
    }

    /// Whether the same request could succeed if sent again later.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Network(_) | LlmError::RateLimited { .. } => true,
            LlmError::Api { status, .. } => *status >= 500,
            LlmError::Authentication { .. } | LlmError::MalformedResponse(_) => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Network(_) => "network",
            LlmError::Authentication { .. } => "authentication",
            LlmError::RateLimited { .. } => "rate_limited",
            LlmError::Api { .. } => "api",
            LlmError::MalformedResponse(_) => "malformed_response",
        }
    }
}

/// A hosted chat-completion model.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    fn model(&self) -> &str;

    /// Send the messages and return the first choice's content as-is.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

/// OpenAI-compatible `/chat/completions` client (Groq by default).
pub struct LlmClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(llm: &LlmSection, api_key: String) -> Result<Self, LlmError> {
        let mut builder = Client::builder();
        if let Some(secs) = llm.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(LlmError::Network)?;

        info!(
            url = %llm.base_url,
            model = %llm.model,
            timeout_secs = ?llm.timeout_secs,
            "Chat-completion client ready"
        );
        Ok(Self {
            http,
            base_url: llm.base_url.trim_end_matches('/').to_string(),
            model: llm.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatCompletion for LlmClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(LlmError::Network)?;

        let status = response.status();
        let body = response.text().await.map_err(LlmError::Network)?;
        if !status.is_success() {
            return Err(LlmError::from_status(status, body));
        }

        let chat_response: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::MalformedResponse(format!("{e}; raw: {body}")))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::MalformedResponse("no choices in response".to_string()))?
            .message
            .content
            .ok_or_else(|| LlmError::MalformedResponse("first choice has no content".to_string()))
    }
}

/// Send the prompt with the fixed system instruction; trimmed answer on success.
pub async fn complete_invoice(
    client: &dyn ChatCompletion,
    prompt: &str,
) -> Result<String, LlmError> {
    let messages = prompt::build_messages(prompt);
    let content = client.complete(&messages).await?;
    Ok(content.trim().to_string())
}

/// Like [`complete_invoice`], but failures come back as `ERROR_PREFIX` + description.
///
/// The model's answer is not parsed or validated.
pub async fn extract_invoice_json(client: &dyn ChatCompletion, prompt: &str) -> String {
    let span = tracing::info_span!("llm_extract", model = %client.model());

    async move {
        info!(prompt_chars = prompt.len(), "Sending prompt to chat-completion API");
        match complete_invoice(client, prompt).await {
            Ok(result) => {
                info!(result_chars = result.len(), "LLM extraction result");
                result
            }
            Err(e) => {
                warn!(
                    error = %e,
                    kind = e.kind(),
                    retryable = e.is_retryable(),
                    "LLM extraction failed"
                );
                format!("{ERROR_PREFIX}{e}")
            }
        }
    }
    .instrument(span)
    .await
}
