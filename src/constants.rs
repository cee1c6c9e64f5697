// ABOUTME: Application constants shared by the chat core and the route layer
// ABOUTME: Holds history limits, timeouts, fixed reply texts, the system prompt and the joke list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Read-only constants shared across all sessions

/// Conversation history limits
pub mod history {
    /// Maximum number of messages kept per session, system message included
    pub const MAX_HISTORY_MESSAGES: usize = 20;

    /// Number of most recent messages sent to the completion API per request
    pub const REQUEST_WINDOW_MESSAGES: usize = 10;
}

/// Timeouts for collaborator calls, in seconds
pub mod timeouts {
    /// Weather API HTTP timeout
    pub const WEATHER_HTTP_SECS: u64 = 5;

    /// Deadline for one weather tool invocation inside a chat turn
    pub const WEATHER_TOOL_SECS: u64 = 10;

    /// IP geolocation HTTP timeout
    pub const LOCATION_HTTP_SECS: u64 = 5;

    /// Radio Browser HTTP timeout, per server
    pub const RADIO_HTTP_SECS: u64 = 10;

    /// Completion API timeout (HTTP client and orchestrator deadline)
    pub const COMPLETION_SECS: u64 = 30;

    /// Hard wall-clock deadline for one speed test request
    pub const SPEED_TEST_SECS: u64 = 20;

    /// Upper bound for a whole HTTP request
    pub const HTTP_REQUEST_SECS: u64 = 90;
}

/// Fixed texts shown to the user
pub mod replies {
    /// Reply when the model returns no usable text
    pub const EMPTY_COMPLETION_PLACEHOLDER: &str = "I'm not sure how to respond to that.";

    /// Chat reply when the turn fails unexpectedly
    pub const INTERNAL_ERROR_APOLOGY: &str =
        "Sorry, something went wrong on my end. Please try again. 😅";

    /// Error body for an empty chat message
    pub const NO_MESSAGE_PROVIDED: &str = "No message provided";

    /// Error body when the weather lookup fails
    pub const WEATHER_UNAVAILABLE: &str = "Could not fetch weather";

    /// Body of a 202 while the speed test keeps running
    pub const SPEED_TEST_STILL_RUNNING: &str =
        "Speed test is still running. Please check back in a few seconds.";
}

/// System message seeded at index 0 of every conversation history
pub const SYSTEM_PROMPT: &str = "You are a friendly and concise AI assistant. \
You can look up the current weather for any city with the get_weather_for_location tool; \
use it whenever the user asks about weather, temperature or what to wear. \
Keep responses under 100 words.";

/// Jokes served by the joke fast path
pub const JOKES: &[&str] = &[
    "Why do programmers prefer dark mode? Because light attracts bugs! 🐛",
    "Why did the AI go to school? To improve its learning algorithm! 📚",
    "What's an AI's favorite snack? Computer chips! 🍟",
    "Why do Java developers wear glasses? Because they can't C#! 👓",
    "How many programmers does it take to change a light bulb? None, that's a hardware problem! 💡",
];

/// Service name reported by the health endpoint and logs
pub const SERVICE_NAME: &str = "pocket-assistant";

/// Session cookie name
pub const SESSION_COOKIE_NAME: &str = "assistant_session";

/// Session cookie lifetime (7 days)
pub const SESSION_COOKIE_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;
