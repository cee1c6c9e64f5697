// ABOUTME: Tests for bounded conversation history
// ABOUTME: Covers system message anchoring, trimming, windowing and repair on load
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use pocket_assistant::chat::ConversationHistory;
use pocket_assistant::constants::history::MAX_HISTORY_MESSAGES;
use pocket_assistant::constants::SYSTEM_PROMPT;
use pocket_assistant::llm::{ChatMessage, MessageRole, ToolCall};

fn history_with_users(count: usize) -> ConversationHistory {
    let mut history = ConversationHistory::new();
    for i in 0..count {
        history.push(ChatMessage::user(format!("message {i}")));
    }
    history
}

#[test]
fn test_new_history_holds_only_system_message() {
    let history = ConversationHistory::new();
    assert_eq!(history.len(), 1);
    assert!(history.is_empty());
    assert_eq!(history.system_message().role, MessageRole::System);
    assert_eq!(history.system_message().content, SYSTEM_PROMPT);
}

#[test]
fn test_push_ignores_system_messages() {
    let mut history = ConversationHistory::new();
    history.push(ChatMessage::system("second system"));
    assert_eq!(history.len(), 1);
}

#[test]
fn test_bound_keeps_system_and_most_recent() {
    let mut history = history_with_users(30);
    history.enforce_bound(MAX_HISTORY_MESSAGES);

    assert_eq!(history.len(), MAX_HISTORY_MESSAGES);
    assert_eq!(history.messages()[0].role, MessageRole::System);

    let contents: Vec<&str> = history.messages()[1..]
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    let expected: Vec<String> = (11..30).map(|i| format!("message {i}")).collect();
    assert_eq!(contents, expected);
}

#[test]
fn test_bound_is_noop_under_limit() {
    let mut history = history_with_users(5);
    let before = history.clone();
    history.enforce_bound(MAX_HISTORY_MESSAGES);
    assert_eq!(history, before);
}

#[test]
fn test_window_returns_most_recent_in_order() {
    let history = history_with_users(15);
    let window = history.window(10);
    assert_eq!(window.len(), 10);
    assert_eq!(window[0].content, "message 5");
    assert_eq!(window[9].content, "message 14");
}

#[test]
fn test_window_smaller_history_includes_system() {
    let history = history_with_users(3);
    let window = history.window(10);
    assert_eq!(window.len(), 4);
    assert_eq!(window[0].role, MessageRole::System);
}

#[test]
fn test_window_skips_orphaned_tool_results() {
    let call = ToolCall::function("call_1", "get_weather_for_location", r#"{"location":"Oslo"}"#);
    let mut history = history_with_users(7);
    history.push(ChatMessage::assistant_tool_calls("", vec![call.clone()]));
    history.push(ChatMessage::tool_result(&call, "Weather in Oslo: snow"));
    history.push(ChatMessage::assistant("It is snowing in Oslo."));

    // Window of 2 starts at the tool message, whose request is outside
    let window = history.window(2);
    assert_eq!(window.len(), 1);
    assert_eq!(window[0].role, MessageRole::Assistant);

    // Window of 3 includes the request and keeps the result
    let window = history.window(3);
    assert_eq!(window.len(), 3);
    assert_eq!(window[1].role, MessageRole::Tool);
}

#[test]
fn test_from_messages_repairs_missing_system_message() {
    let restored = ConversationHistory::from_messages(vec![
        ChatMessage::user("hi"),
        ChatMessage::assistant("hello"),
    ]);
    assert_eq!(restored.len(), 3);
    assert_eq!(restored.messages()[0].content, SYSTEM_PROMPT);
    assert_eq!(restored.messages()[1].content, "hi");
}

#[test]
fn test_from_messages_drops_duplicate_system_messages() {
    let restored = ConversationHistory::from_messages(vec![
        ChatMessage::system("custom prompt"),
        ChatMessage::user("hi"),
        ChatMessage::system("injected"),
    ]);
    assert_eq!(restored.len(), 2);
    assert_eq!(restored.system_message().content, "custom prompt");
}

#[test]
fn test_serde_repairs_on_deserialize() {
    let json = serde_json::json!([
        { "role": "user", "content": "hi" },
        { "role": "assistant", "content": null, "tool_calls": [
            { "id": "c1", "type": "function",
              "function": { "name": "get_weather_for_location", "arguments": "{}" } }
        ]}
    ]);
    let history: ConversationHistory = serde_json::from_value(json).unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history.messages()[0].role, MessageRole::System);
    assert_eq!(history.messages()[2].content, "");
    assert!(history.messages()[2].requests_tools());

    let back = serde_json::to_value(&history).unwrap();
    assert_eq!(back.as_array().unwrap().len(), 3);
}

#[test]
fn test_window_drops_orphaned_tool_result_after_system_message() {
    let call = ToolCall::function("call_9", "get_weather_for_location", r#"{"location":"Rome"}"#);
    let restored = ConversationHistory::from_messages(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::tool_result(&call, "Weather in Rome: sunny"),
        ChatMessage::assistant("Rome is sunny."),
        ChatMessage::user("thanks"),
    ]);

    let window = restored.window(10);
    assert_eq!(window.len(), 3);
    assert!(window.iter().all(|m| m.role != MessageRole::Tool));
}

#[test]
fn test_bound_trims_tool_results_separated_from_their_request() {
    let call = ToolCall::function("call_1", "get_weather_for_location", r#"{"location":"Oslo"}"#);
    let mut history = ConversationHistory::new();
    history.push(ChatMessage::user("weather in Oslo?"));
    history.push(ChatMessage::assistant_tool_calls("", vec![call.clone()]));
    history.push(ChatMessage::tool_result(&call, "Weather in Oslo: snow"));
    history.push(ChatMessage::assistant("It is snowing in Oslo."));

    // Keeping 3 would leave [system, tool, assistant]
    history.enforce_bound(3);

    assert_eq!(history.len(), 2);
    assert_eq!(history.messages()[1].role, MessageRole::Assistant);
}
