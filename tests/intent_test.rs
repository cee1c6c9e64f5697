// ABOUTME: Tests for the keyword intent classifier
// ABOUTME: Covers keyword precedence, case insensitivity and the model fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use pocket_assistant::chat::{classify, Intent};

#[test]
fn test_time_keywords() {
    for message in [
        "What time is it?",
        "WHAT TIME IS IT",
        "time please",
        "Is there a clock nearby?",
        "time!!!",
    ] {
        assert_eq!(classify(message), Intent::Time, "message: {message}");
    }
}

#[test]
fn test_joke_keywords() {
    for message in ["Tell me a joke", "make me LAUGH", "something funny", "fun fact?"] {
        assert_eq!(classify(message), Intent::Joke, "message: {message}");
    }
}

#[test]
fn test_time_checked_before_joke() {
    assert_eq!(classify("tell me a joke about time"), Intent::Time);
    assert_eq!(classify("funny clock"), Intent::Time);
}

#[test]
fn test_substring_matches_count() {
    // "sometimes" contains "time", "refund" contains "fun"
    assert_eq!(classify("sometimes I wonder"), Intent::Time);
    assert_eq!(classify("I want a refund"), Intent::Joke);
}

#[test]
fn test_other_messages_go_to_model() {
    assert_eq!(classify("What's the weather in Paris?"), Intent::Ai);
    assert_eq!(classify("Hello there"), Intent::Ai);
    assert_eq!(classify(""), Intent::Ai);
}

#[test]
fn test_fast_path_flag() {
    assert!(Intent::Time.is_fast_path());
    assert!(Intent::Joke.is_fast_path());
    assert!(!Intent::Ai.is_fast_path());
}
