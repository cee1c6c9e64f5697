// ABOUTME: Shared server resources injected into every route handler
// ABOUTME: Wires configuration into collaborators, the orchestrator, session storage and cookie signing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server resources
//!
//! Everything a handler needs is constructed once at startup and shared via
//! `Arc<ServerResources>`. The external collaborators are trait objects so
//! tests can swap in doubles through [`Collaborators`].

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use crate::chat::{ChatOrchestrator, OrchestratorOptions};
use crate::config::ServerConfig;
use crate::errors::{AppError, AppResult};
use crate::external::{
    LocationClient, LocationLookup, RadioClient, RadioDirectory, SpeedTestRunner, WeatherClient,
    WeatherLookup,
};
use crate::health::HealthChecker;
use crate::llm::{CompletionClient, OpenAiClient};
use crate::security::SessionCookieSigner;
use crate::session::{InMemorySessionStore, SessionLocks, SessionStore};

/// External collaborators behind trait objects
#[derive(Clone)]
pub struct Collaborators {
    /// Language-model completion API
    pub completions: Arc<dyn CompletionClient>,
    /// Current weather lookup
    pub weather: Arc<dyn WeatherLookup>,
    /// IP geolocation
    pub location: Arc<dyn LocationLookup>,
    /// Radio station directory
    pub radio: Arc<dyn RadioDirectory>,
    /// Session state storage
    pub sessions: Arc<dyn SessionStore>,
}

impl Collaborators {
    /// Production collaborators built from configuration
    ///
    /// # Errors
    /// Returns error if an HTTP client cannot be built or a base URL is unsafe
    pub fn from_config(config: &ServerConfig) -> AppResult<Self> {
        let capacity = NonZeroUsize::new(config.session_capacity)
            .ok_or_else(|| AppError::config("SESSION_CAPACITY must be greater than zero"))?;

        Ok(Self {
            completions: Arc::new(OpenAiClient::new(config.openai.clone())?),
            weather: Arc::new(WeatherClient::new(config.weather.clone())?),
            location: Arc::new(LocationClient::new(config.location.clone())?),
            radio: Arc::new(RadioClient::new(config.radio.clone())?),
            sessions: Arc::new(InMemorySessionStore::new(capacity)),
        })
    }
}

/// State shared by all route handlers
pub struct ServerResources {
    /// Chat turn orchestrator
    pub orchestrator: ChatOrchestrator,
    /// Current weather lookup
    pub weather: Arc<dyn WeatherLookup>,
    /// IP geolocation
    pub location: Arc<dyn LocationLookup>,
    /// Radio station directory
    pub radio: Arc<dyn RadioDirectory>,
    /// Single-flight speed test runner
    pub speed_test: SpeedTestRunner,
    /// Session state storage
    pub sessions: Arc<dyn SessionStore>,
    /// Per-session turn serialization
    pub session_locks: SessionLocks,
    /// Session cookie signing
    pub cookie_signer: SessionCookieSigner,
    /// Whether the session cookie carries the `Secure` flag
    pub cookie_secure: bool,
    /// Health reporting
    pub health: HealthChecker,
}

impl ServerResources {
    /// Assemble resources from configuration and collaborators
    #[must_use]
    pub fn new(config: &ServerConfig, collaborators: Collaborators) -> Self {
        Self::with_orchestrator_options(config, collaborators, OrchestratorOptions::default())
    }

    /// Assemble resources with explicit orchestrator options
    #[must_use]
    pub fn with_orchestrator_options(
        config: &ServerConfig,
        collaborators: Collaborators,
        options: OrchestratorOptions,
    ) -> Self {
        let orchestrator = ChatOrchestrator::with_options(
            collaborators.completions,
            Arc::clone(&collaborators.weather),
            options,
        );

        Self {
            orchestrator,
            weather: collaborators.weather,
            location: collaborators.location,
            radio: collaborators.radio,
            speed_test: SpeedTestRunner::new(config.speed_test.clone()),
            sessions: collaborators.sessions,
            session_locks: SessionLocks::new(),
            cookie_signer: SessionCookieSigner::new(&config.secret_key),
            cookie_secure: config.cookie_secure,
            health: HealthChecker::new(
                config.openai.api_key.is_some(),
                config.weather.api_key.is_some(),
            ),
        }
    }

    /// Production resources from configuration
    ///
    /// # Errors
    /// Returns error if a collaborator cannot be constructed
    pub fn from_config(config: &ServerConfig) -> AppResult<Self> {
        let collaborators = Collaborators::from_config(config)?;
        let options = OrchestratorOptions {
            completion_timeout: Duration::from_secs(config.openai.timeout_secs),
            ..OrchestratorOptions::default()
        };
        Ok(Self::with_orchestrator_options(config, collaborators, options))
    }
}
