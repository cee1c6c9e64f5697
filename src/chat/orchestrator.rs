// ABOUTME: Chat turn orchestration across intent fast paths, completions and the weather tool
// ABOUTME: Takes a history in, returns the reply and the updated history out
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Chat orchestrator
//!
//! One turn runs through these stages:
//!
//! 1. Classify the message. Time and joke intents are answered locally and
//!    leave the history untouched.
//! 2. Append the user message and request a completion over the most recent
//!    window of messages, offering the weather tool.
//! 3. If the model asked for tools, append its request, execute every call
//!    in order, append the results, and request one more completion with no
//!    tools offered.
//! 4. Append the final assistant reply and trim the history to its bound.
//!
//! Completion failures become the reply text; they never fail the turn.

use std::borrow::Cow;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chrono::Local;
use rand::seq::SliceRandom;
use regex::Regex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::history::ConversationHistory;
use super::intent::{classify, Intent};
use super::tools::{execute_tool_call, weather_tool};
use crate::constants::{history, replies, timeouts, JOKES};
use crate::errors::{AppError, AppResult};
use crate::external::WeatherLookup;
use crate::llm::{ChatMessage, Completion, CompletionClient, CompletionError, ToolDefinition};

/// Tunables of the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorOptions {
    /// Messages sent to the model per request
    pub request_window: usize,
    /// Messages kept in history, system message included
    pub max_history: usize,
    /// Deadline for one completion call
    pub completion_timeout: Duration,
    /// Deadline for one tool execution
    pub tool_timeout: Duration,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            request_window: history::REQUEST_WINDOW_MESSAGES,
            max_history: history::MAX_HISTORY_MESSAGES,
            completion_timeout: Duration::from_secs(timeouts::COMPLETION_SECS),
            tool_timeout: Duration::from_secs(timeouts::WEATHER_TOOL_SECS),
        }
    }
}

/// Result of one chat turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Text shown to the user
    pub reply: String,
    /// History to persist for the session
    pub history: ConversationHistory,
    /// How the message was classified
    pub intent: Intent,
}

/// Runs chat turns against injected completion and weather collaborators
pub struct ChatOrchestrator {
    completions: Arc<dyn CompletionClient>,
    weather: Arc<dyn WeatherLookup>,
    tools: Vec<ToolDefinition>,
    options: OrchestratorOptions,
}

impl ChatOrchestrator {
    /// Orchestrator with default options
    #[must_use]
    pub fn new(completions: Arc<dyn CompletionClient>, weather: Arc<dyn WeatherLookup>) -> Self {
        Self::with_options(completions, weather, OrchestratorOptions::default())
    }

    /// Orchestrator with explicit options
    #[must_use]
    pub fn with_options(
        completions: Arc<dyn CompletionClient>,
        weather: Arc<dyn WeatherLookup>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            completions,
            weather,
            tools: vec![weather_tool()],
            options,
        }
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    /// Handle one user message
    ///
    /// # Errors
    /// Returns an invalid-input error for an empty or whitespace-only message
    pub async fn handle_turn(
        &self,
        message: &str,
        mut history: ConversationHistory,
    ) -> AppResult<TurnOutcome> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::invalid_input(replies::NO_MESSAGE_PROVIDED));
        }

        let intent = classify(message);
        debug!(?intent, "Classified chat message");

        match intent {
            Intent::Time => {
                return Ok(TurnOutcome {
                    reply: time_reply(),
                    history,
                    intent,
                })
            }
            Intent::Joke => {
                return Ok(TurnOutcome {
                    reply: joke_reply(),
                    history,
                    intent,
                })
            }
            Intent::Ai => {}
        }

        history.push(ChatMessage::user(message));
        let reply = self.complete_with_tools(&mut history).await;
        history.enforce_bound(self.options.max_history);

        Ok(TurnOutcome {
            reply,
            history,
            intent,
        })
    }

    /// First completion, optional tool round, second completion
    async fn complete_with_tools(&self, history: &mut ConversationHistory) -> String {
        let window = history.window(self.options.request_window);
        let first = match self.complete(&window, Some(self.tools.as_slice())).await {
            Ok(completion) => completion,
            Err(e) => return e.user_text(),
        };

        if !first.message.requests_tools() {
            let reply = reply_text(&first.message.content);
            history.push(ChatMessage::assistant(reply.clone()));
            return reply;
        }

        let calls = first.tool_calls().to_vec();
        info!(tool_calls = calls.len(), "Model requested tool execution");
        history.push(ChatMessage::assistant_tool_calls(
            first.message.content.clone(),
            calls.clone(),
        ));

        for call in &calls {
            let result =
                execute_tool_call(call, self.weather.as_ref(), self.options.tool_timeout).await;
            history.push(result);
        }

        let window = history.window(self.options.request_window);
        match self.complete(&window, None).await {
            Ok(second) => {
                let reply = reply_text(&second.message.content);
                history.push(ChatMessage::assistant(reply.clone()));
                reply
            }
            Err(e) => e.user_text(),
        }
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<Completion, CompletionError> {
        let deadline = self.options.completion_timeout;
        let result = match timeout(deadline, self.completions.complete(messages, tools)).await {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Other(format!(
                "request timed out after {} seconds",
                deadline.as_secs()
            ))),
        };
        if let Err(e) = &result {
            warn!(error = %e, "Completion failed");
        }
        result
    }
}

/// `"The current time is 03:07 PM ⏰"` from the local clock
#[must_use]
pub fn time_reply() -> String {
    format!("The current time is {} ⏰", Local::now().format("%I:%M %p"))
}

/// A joke picked uniformly at random
#[must_use]
pub fn joke_reply() -> String {
    JOKES
        .choose(&mut rand::thread_rng())
        .map_or_else(String::new, |joke| (*joke).to_owned())
}

/// Trimmed model text with synthetic function markup removed, or the placeholder
fn reply_text(content: &str) -> String {
    let cleaned = strip_synthetic_function_calls(content);
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        replies::EMPTY_COMPLETION_PLACEHOLDER.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Strip synthetic function call syntax from model content
///
/// Some models emit `<function(name)>{...}</function>` or
/// `<function/name>{...}</function>` text next to real tool calls.
fn strip_synthetic_function_calls(content: &str) -> Cow<'_, str> {
    fn function_pattern() -> Option<&'static Regex> {
        static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
        PATTERN
            .get_or_init(|| Regex::new(r"<function[/\(][^>]+>[\s\S]*?</function>").ok())
            .as_ref()
    }

    let Some(pattern) = function_pattern() else {
        return Cow::Borrowed(content);
    };
    pattern.replace_all(content, "")
}

