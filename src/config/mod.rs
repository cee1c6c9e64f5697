// ABOUTME: Configuration module entry point
// ABOUTME: Re-exports the environment-driven server and logging configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Environment variable parsing
pub mod environment;

pub use environment::{LogFormat, LoggingConfig, ServerConfig};
