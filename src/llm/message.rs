// ABOUTME: Chat message, tool call and tool schema types in the chat-completions wire shape
// ABOUTME: Shared by the completion client, the orchestrator and the session store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Fixed instructions at the head of the conversation
    System,
    /// End user
    User,
    /// Language model
    Assistant,
    /// Result of a tool invocation
    Tool,
}

impl MessageRole {
    /// Wire name of the role
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// Function name and serialized JSON arguments of a tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Tool name the model wants to run
    pub name: String,
    /// JSON object text; produced by the model and possibly malformed
    #[serde(default)]
    pub arguments: String,
}

/// A model-issued request to invoke a named tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id, unique within one completion
    pub id: String,
    /// Always `"function"`
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    /// The requested function
    pub function: FunctionCall,
}

fn function_kind() -> String {
    "function".to_owned()
}

impl ToolCall {
    /// Build a function tool call
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: function_kind(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    /// Name of the requested function
    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function.name
    }

    /// Raw argument text
    #[must_use]
    pub fn arguments(&self) -> &str {
        &self.function.arguments
    }
}

/// `null` content (assistant messages that only carry tool calls) reads as empty text
fn nullable_content<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One message of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author
    pub role: MessageRole,
    /// Text content; may be empty for assistant messages that only request tools
    #[serde(default, deserialize_with = "nullable_content")]
    pub content: String,
    /// Tool requests, only on assistant messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Originating tool call, only on tool messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool name, only on tool messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// System message
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, content)
    }

    /// User message
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    /// Assistant text reply
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, content)
    }

    /// Assistant message requesting tool execution
    pub fn assistant_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: Some(tool_calls),
            ..Self::with_role(MessageRole::Assistant, content)
        }
    }

    /// Result of the tool call `call`
    pub fn tool_result(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call.id.clone()),
            name: Some(call.function.name.clone()),
            ..Self::with_role(MessageRole::Tool, content)
        }
    }

    /// Tool calls carried by this message (empty for all but assistant tool requests)
    #[must_use]
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or_default()
    }

    /// Whether this assistant message asks for tool execution
    #[must_use]
    pub fn requests_tools(&self) -> bool {
        !self.tool_calls().is_empty()
    }
}

/// Function schema offered to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Function name
    pub name: String,
    /// What the function does, for the model
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: Value,
}

/// Tool entry of a completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Always `"function"`
    #[serde(rename = "type")]
    pub kind: String,
    /// The function schema
    pub function: FunctionDeclaration,
}

impl ToolDefinition {
    /// Wrap a function declaration
    #[must_use]
    pub fn function(function: FunctionDeclaration) -> Self {
        Self {
            kind: function_kind(),
            function,
        }
    }
}
