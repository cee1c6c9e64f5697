// ABOUTME: Time-of-day greeting shown when a session initializes
// ABOUTME: Maps the local hour to a greeting text and emoji
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Greeting text and emoji for an hour of the day (0..=23)
#[must_use]
pub const fn greeting_for_hour(hour: u32) -> (&'static str, &'static str) {
    match hour {
        5..=11 => ("Good morning", "🌅"),
        12..=16 => ("Good afternoon", "☀️"),
        17..=20 => ("Good evening", "🌆"),
        _ => ("Good night", "🌙"),
    }
}

/// `"Good morning, Paris! 🌅"`
#[must_use]
pub fn greeting_line(hour: u32, city: &str) -> String {
    let (text, emoji) = greeting_for_hour(hour);
    format!("{text}, {city}! {emoji}")
}
