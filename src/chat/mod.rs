// ABOUTME: Chat core: intent classification, bounded history, weather tool and turn orchestration
// ABOUTME: Independent of HTTP; the route layer loads and saves session state around each turn
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Bounded conversation history
pub mod history;
/// Keyword intent classifier
pub mod intent;
/// Chat turn state machine
pub mod orchestrator;
/// Weather tool schema and execution
pub mod tools;

pub use history::ConversationHistory;
pub use intent::{classify, Intent};
pub use orchestrator::{ChatOrchestrator, OrchestratorOptions, TurnOutcome};
pub use tools::{execute_tool_call, weather_tool, WEATHER_TOOL_NAME};
