// ABOUTME: Completion client abstraction for the language-model chat API
// ABOUTME: Defines the CompletionClient trait, completion results and the classified error taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Completion client
//!
//! One [`CompletionClient::complete`] call is one request/response exchange
//! with the model. Failures are classified into [`CompletionError`] at the
//! client boundary, so callers branch on a variant instead of inspecting
//! upstream error text.
//!
//! ```rust,no_run
//! use pocket_assistant::llm::{ChatMessage, CompletionClient, OpenAiClient, OpenAiConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new(OpenAiConfig::default())?;
//! match client.complete(&[ChatMessage::user("Hello")], None).await {
//!     Ok(completion) => println!("{}", completion.message.content),
//!     Err(e) => println!("{}", e.user_text()),
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chat message and tool types
pub mod message;
/// OpenAI-compatible chat-completions client
pub mod openai;

pub use message::{
    ChatMessage, FunctionCall, FunctionDeclaration, MessageRole, ToolCall, ToolDefinition,
};
pub use openai::{OpenAiClient, OpenAiConfig};

/// Token accounting reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the request
    pub prompt_tokens: u32,
    /// Tokens in the reply
    pub completion_tokens: u32,
    /// Sum of both
    pub total_tokens: u32,
}

/// Successful completion
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Assistant message, possibly carrying tool calls
    pub message: ChatMessage,
    /// Why generation stopped (`stop`, `tool_calls`, `length`, ...)
    pub finish_reason: Option<String>,
    /// Token usage if reported
    pub usage: Option<TokenUsage>,
}

impl Completion {
    /// Tool invocations requested by the model, in order
    #[must_use]
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.message.tool_calls()
    }
}

/// Classified failure of a completion call
///
/// Variants are listed in classification priority order. None of them is
/// retried inside a chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// No API key is configured
    #[error("completion API credential is not configured")]
    CredentialMissing,
    /// The account ran out of quota or credit
    #[error("completion API quota exhausted")]
    QuotaExceeded,
    /// The API rejected the credential
    #[error("completion API rejected the credential")]
    Unauthorized,
    /// Too many requests
    #[error("completion API rate limit reached")]
    RateLimited,
    /// Anything else, with the upstream description
    #[error("completion API error: {0}")]
    Other(String),
}

impl CompletionError {
    /// Text shown to the user in place of the assistant's reply
    #[must_use]
    pub fn user_text(&self) -> String {
        match self {
            Self::CredentialMissing => "⚠️ The AI assistant is not configured. Please set the OPENAI_API_KEY environment variable.".to_owned(),
            Self::QuotaExceeded => {
                "⚠️ My OpenAI account ran out of credits. Please check your API quota.".to_owned()
            }
            Self::Unauthorized => "⚠️ Invalid API key. Please check your OpenAI key.".to_owned(),
            Self::RateLimited => {
                "⚠️ Too many requests. Please wait a bit and try again.".to_owned()
            }
            Self::Other(detail) => format!("An unexpected error occurred: {detail}"),
        }
    }
}

/// Language-model completion endpoint
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one completion over `messages`
    ///
    /// When `tools` is given the model may answer with tool calls
    /// (`tool_choice = "auto"`); when `None` it can only answer with text.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<Completion, CompletionError>;
}
