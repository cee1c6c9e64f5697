// ABOUTME: Keyword intent classifier that routes trivial messages away from the language model
// ABOUTME: Maps message text to the time and joke fast paths or to a model-backed reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::Serialize;

/// Keywords that select the time fast path
const TIME_KEYWORDS: &[&str] = &["time", "what time", "clock"];

/// Keywords that select the joke fast path
const JOKE_KEYWORDS: &[&str] = &["joke", "fun", "funny", "laugh"];

/// Coarse classification of a user message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Current wall-clock time, answered locally
    Time,
    /// A joke from the fixed list, answered locally
    Joke,
    /// Everything else, answered by the language model
    Ai,
}

impl Intent {
    /// Whether the intent is answered without contacting the model
    #[must_use]
    pub const fn is_fast_path(self) -> bool {
        matches!(self, Self::Time | Self::Joke)
    }
}

/// Classify a message by case-insensitive substring match
///
/// Time keywords are checked before joke keywords; the first match wins.
#[must_use]
pub fn classify(message: &str) -> Intent {
    let lowered = message.to_lowercase();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

    if contains_any(TIME_KEYWORDS) {
        Intent::Time
    } else if contains_any(JOKE_KEYWORDS) {
        Intent::Joke
    } else {
        Intent::Ai
    }
}
