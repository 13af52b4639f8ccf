//! LLM Client: the single point of entry for all completion API calls in ResumeATS.
//!
//! ARCHITECTURAL RULE: No other module may call the completion API directly.
//! All LLM interactions MUST go through this module.
//!
//! Exactly one attempt per call. Failures come back as `Error: ...` text so the
//! page can render them in place of an analysis.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub mod prompts;

use prompts::RESUME_CHECKER_SYSTEM;

/// The model used for all completion calls.
/// Hardcoded on purpose; the prompts are tuned for it.
pub const MODEL: &str = "sonar-pro";
const MAX_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.7;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("request cancelled")]
    Cancelled,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if the service produced one.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Anything that can turn an instruction plus resume text into generated text.
///
/// Carried in `AppState` as `Arc<dyn CompletionService>`.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn try_complete(
        &self,
        instruction: &str,
        document_text: &str,
        cancel: &CancellationToken,
    ) -> Result<String, LlmError>;

    /// Same call, with every failure folded into an `Error: ...` string.
    async fn complete(
        &self,
        instruction: &str,
        document_text: &str,
        cancel: &CancellationToken,
    ) -> String {
        match self.try_complete(instruction, document_text, cancel).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Completion call failed: {e}");
                format!("Error: {e}")
            }
        }
    }
}

/// Builds the single user message: instruction, blank line, labelled resume text.
pub fn user_message(instruction: &str, document_text: &str) -> String {
    format!("{instruction}\n\nResume text: {document_text}")
}

/// The single LLM client used by the analysis flow.
/// Wraps an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
    api_key: String,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(api_url: String, api_key: String) -> Result<Self, LlmError> {
        Self::with_timeout(api_url, api_key, REQUEST_TIMEOUT)
    }

    /// Client whose calls give up after `timeout` instead of [`REQUEST_TIMEOUT`].
    pub fn with_timeout(
        api_url: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_url,
            api_key,
            timeout,
        })
    }

    /// Makes one raw call to the completion API, returning the decoded response.
    pub async fn call(&self, user_content: &str, system: &str) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "Completion call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat_response)
    }

    fn classify_transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else {
            LlmError::Http(e)
        }
    }
}

#[async_trait]
impl CompletionService for LlmClient {
    async fn try_complete(
        &self,
        instruction: &str,
        document_text: &str,
        cancel: &CancellationToken,
    ) -> Result<String, LlmError> {
        let content = user_message(instruction, document_text);

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LlmError::Cancelled),
            response = self.call(&content, RESUME_CHECKER_SYSTEM) => response?,
        };

        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}
