// ABOUTME: Main library entry point for the Pocket Assistant chat backend
// ABOUTME: Provides the chat core, external API clients, session storage and HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pocket Assistant
//!
//! Backend for a small personal assistant web page. It relays chat messages
//! to a language model (with a weather lookup tool), answers trivial
//! questions locally, and proxies weather, geolocation, internet radio and
//! speed test data for the dashboard.
//!
//! ## Architecture
//!
//! - **Chat**: intent classifier, bounded history and the turn orchestrator
//! - **LLM**: completion client trait with a classified error taxonomy
//! - **External**: weather, location, radio and speed test collaborators
//! - **Session**: per-session state store and turn locks
//! - **Routes**: thin axum handlers over [`resources::ServerResources`]
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pocket_assistant::config::environment::ServerConfig;
//! use pocket_assistant::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Pocket Assistant configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Chat core: intents, history, tools and orchestration
pub mod chat;

/// Environment-driven configuration
pub mod config;

/// Shared constants: limits, timeouts, fixed replies
pub mod constants;

/// Unified error handling
pub mod errors;

/// External service clients
pub mod external;

/// Time-of-day greeting
pub mod greeting;

/// Health reporting
pub mod health;

/// Language-model completion client
pub mod llm;

/// Tracing subscriber setup
pub mod logging;

/// Shared server resources
pub mod resources;

/// HTTP routes
pub mod routes;

/// Signed session cookies
pub mod security;

/// HTTP server lifecycle
pub mod server;

/// Session state storage
pub mod session;
