// ABOUTME: Bounded per-session conversation history anchored by the fixed system message
// ABOUTME: Provides request windowing and oldest-first trimming that never evicts the system message
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Conversation history
//!
//! A history always starts with exactly one system message. Trimming keeps
//! that message and the most recent `max - 1` messages after it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::SYSTEM_PROMPT;
use crate::llm::{ChatMessage, MessageRole};

/// Ordered messages of one session, system message first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ChatMessage>", into = "Vec<ChatMessage>")]
pub struct ConversationHistory {
    messages: Vec<ChatMessage>,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationHistory {
    /// Fresh history holding only the system message
    #[must_use]
    pub fn new() -> Self {
        Self::with_system_prompt(SYSTEM_PROMPT)
    }

    /// Fresh history with a custom system message; an empty prompt falls back to the default
    #[must_use]
    pub fn with_system_prompt(prompt: &str) -> Self {
        let prompt = if prompt.trim().is_empty() {
            SYSTEM_PROMPT
        } else {
            prompt
        };
        Self {
            messages: vec![ChatMessage::system(prompt)],
        }
    }

    /// Rebuild a history from stored messages
    ///
    /// Extra or empty system messages are dropped and the leading system
    /// message is restored when missing.
    #[must_use]
    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        let mut iter = messages.into_iter().peekable();
        let system = match iter.peek() {
            Some(first) if first.role == MessageRole::System && !first.content.trim().is_empty() => {
                iter.next()
            }
            _ => None,
        }
        .unwrap_or_else(|| ChatMessage::system(SYSTEM_PROMPT));

        let mut restored = Vec::with_capacity(iter.size_hint().0 + 1);
        restored.push(system);
        restored.extend(iter.filter(|m| m.role != MessageRole::System));
        Self { messages: restored }
    }

    /// All messages, system message first
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The system message
    #[must_use]
    pub fn system_message(&self) -> &ChatMessage {
        &self.messages[0]
    }

    /// Number of messages, system message included
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether only the system message is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.len() <= 1
    }

    /// Append a message; system messages are ignored
    pub fn push(&mut self, message: ChatMessage) {
        if message.role != MessageRole::System {
            self.messages.push(message);
        }
    }

    /// The last `min(size, len)` messages, oldest first
    ///
    /// Tool results whose assistant request is not inside the window are
    /// dropped, since the API rejects orphaned tool messages.
    #[must_use]
    pub fn window(&self, size: usize) -> Vec<ChatMessage> {
        let start = self.messages.len().saturating_sub(size);
        let mut requested: HashSet<&str> = HashSet::new();
        self.messages[start..]
            .iter()
            .filter(|m| {
                if m.role == MessageRole::Tool {
                    m.tool_call_id
                        .as_deref()
                        .is_some_and(|id| requested.contains(id))
                } else {
                    requested.extend(m.tool_calls().iter().map(|c| c.id.as_str()));
                    true
                }
            })
            .cloned()
            .collect()
    }

    /// Trim to at most `max` messages, keeping the system message and the newest `max - 1`
    ///
    /// Tool results left at the front without their request are trimmed too.
    pub fn enforce_bound(&mut self, max: usize) {
        let max = max.max(1);
        if self.messages.len() > max {
            let excess = self.messages.len() - max;
            self.messages.drain(1..=excess);
            let orphans = self.messages[1..]
                .iter()
                .take_while(|m| m.role == MessageRole::Tool)
                .count();
            self.messages.drain(1..1 + orphans);
        }
    }
}

impl From<Vec<ChatMessage>> for ConversationHistory {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self::from_messages(messages)
    }
}

impl From<ConversationHistory> for Vec<ChatMessage> {
    fn from(history: ConversationHistory) -> Self {
        history.messages
    }
}
