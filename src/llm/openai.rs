// ABOUTME: OpenAI-compatible chat-completions client with tool calling support
// ABOUTME: Classifies upstream failures into CompletionError at the HTTP boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use zeroize::Zeroize;

use super::{ChatMessage, Completion, CompletionClient, CompletionError, TokenUsage, ToolDefinition};
use crate::constants::timeouts;
use crate::errors::{AppError, AppResult};

/// Upstream error bodies are cut to this many bytes before reaching the user
const MAX_ERROR_DETAIL_BYTES: usize = 300;

/// OpenAI client configuration
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key; `None` makes every call fail with `CredentialMissing`
    pub api_key: Option<String>,
    /// API base URL (default: <https://api.openai.com/v1>)
    pub base_url: String,
    /// Model name (default: `gpt-4o-mini`)
    pub model: String,
    /// Reply length cap
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_owned(),
            model: "gpt-4o-mini".to_owned(),
            max_tokens: 200,
            temperature: 0.7,
            timeout_secs: timeouts::COMPLETION_SECS,
        }
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Reject base URLs that would send the API key in cleartext to a remote host
///
/// # Errors
/// Returns a config error for unparsable URLs, unsupported schemes and
/// plain HTTP to anything but localhost
pub fn validate_base_url(base_url: &str) -> AppResult<()> {
    let parsed = Url::parse(base_url)
        .map_err(|e| AppError::config(format!("Invalid LLM base URL '{base_url}': {e}")))?;
    let host = parsed.host_str().unwrap_or_default();

    match parsed.scheme() {
        "https" => Ok(()),
        "http" if matches!(host, "localhost" | "127.0.0.1" | "[::1]" | "::1") => {
            warn!("Using unencrypted HTTP for local LLM server at '{base_url}'");
            Ok(())
        }
        "http" => Err(AppError::config(format!(
            "HTTP is only permitted for localhost LLM servers (base URL: '{base_url}')"
        ))),
        scheme => Err(AppError::config(format!(
            "Unsupported URL scheme '{scheme}' in LLM base URL '{base_url}'"
        ))),
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

fn truncate_detail(text: &str) -> String {
    if text.len() <= MAX_ERROR_DETAIL_BYTES {
        return text.to_owned();
    }
    let mut end = MAX_ERROR_DETAIL_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Classify a non-success HTTP response from the completions endpoint
///
/// Checked in order: quota, invalid credential, rate limit, anything else.
#[must_use]
pub fn classify_error_response(status: StatusCode, body: &str) -> CompletionError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let code = envelope.as_ref().and_then(|e| e.error.code.as_deref());
    let kind = envelope.as_ref().and_then(|e| e.error.kind.as_deref());
    let is_code = |wanted: &str| code == Some(wanted) || kind == Some(wanted);

    if is_code("insufficient_quota") || status == StatusCode::PAYMENT_REQUIRED {
        CompletionError::QuotaExceeded
    } else if is_code("invalid_api_key")
        || status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
    {
        CompletionError::Unauthorized
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        CompletionError::RateLimited
    } else {
        let detail = envelope
            .and_then(|e| e.error.message)
            .unwrap_or_else(|| truncate_detail(body.trim()));
        CompletionError::Other(format!("HTTP {status}: {detail}"))
    }
}

/// OpenAI-compatible chat-completions client
pub struct OpenAiClient {
    config: OpenAiConfig,
    http_client: Client,
    endpoint: String,
}

impl Drop for OpenAiClient {
    fn drop(&mut self) {
        if let Some(key) = self.config.api_key.as_mut() {
            key.zeroize();
        }
    }
}

impl OpenAiClient {
    /// Create a client
    ///
    /// # Errors
    /// Returns error if the base URL is unsafe or the HTTP client cannot be built
    pub fn new(config: OpenAiConfig) -> AppResult<Self> {
        validate_base_url(&config.base_url)?;
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build LLM HTTP client: {e}")))?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        if config.api_key.is_none() {
            warn!("OPENAI_API_KEY is not set; chat turns will report the assistant as not configured");
        }

        Ok(Self {
            config,
            http_client,
            endpoint,
        })
    }

    /// Configured model name
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<Completion, CompletionError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(CompletionError::CredentialMissing);
        };

        let tools = tools.filter(|t| !t.is_empty());
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            tools,
            tool_choice: tools.map(|_| "auto"),
        };

        info!(
            model = %self.config.model,
            messages = messages.len(),
            tools = tools.map_or(0, <[ToolDefinition]>::len),
            "Calling completion API"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Completion request failed: {e}");
                if e.is_timeout() {
                    CompletionError::Other("the AI service took too long to respond".to_owned())
                } else {
                    CompletionError::Other(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::Other(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let classified = classify_error_response(status, &body);
            error!(status = %status, error = %classified, "Completion API error");
            return Err(classified);
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            debug!("Unparsable completion body: {}", truncate_detail(&body));
            CompletionError::Other(format!("malformed completion response: {e}"))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::Other("completion response had no choices".to_owned()))?;

        debug!(
            finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
            tool_calls = choice.message.tool_calls().len(),
            "Completion received"
        );

        Ok(Completion {
            message: choice.message,
            finish_reason: choice.finish_reason,
            usage: parsed.usage,
        })
    }
}
