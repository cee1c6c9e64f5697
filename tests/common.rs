// ABOUTME: Shared test utilities and collaborator doubles for integration tests
// ABOUTME: Provides scripted completions, fake weather/location/radio and test server resources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `pocket_assistant`

use std::collections::{HashMap, VecDeque};
use std::env;
use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use pocket_assistant::chat::OrchestratorOptions;
use pocket_assistant::config::ServerConfig;
use pocket_assistant::external::{
    DetectedLocation, LocationLookup, RadioDirectory, RadioStation, WeatherLookup, WeatherRecord,
};
use pocket_assistant::llm::{
    ChatMessage, Completion, CompletionClient, CompletionError, ToolCall, ToolDefinition,
};
use pocket_assistant::resources::{Collaborators, ServerResources};
use pocket_assistant::errors::{AppError, AppResult, ErrorCode};
use pocket_assistant::session::{InMemorySessionStore, SessionState, SessionStore};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests
///
/// Set `TEST_LOG=DEBUG` (or `TRACE`/`INFO`) to see more output.
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

// ============================================================================
// Completion doubles
// ============================================================================

/// One recorded call to the completion client
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<ChatMessage>,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Completion client answering from a script, recording every call
#[derive(Default)]
pub struct ScriptedCompletions {
    script: Mutex<VecDeque<Result<Completion, CompletionError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
}

impl ScriptedCompletions {
    pub fn new(script: Vec<Result<Completion, CompletionError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    /// Every call sleeps for `delay` before answering
    pub fn delayed(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletions {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<Completion, CompletionError> {
        self.calls.lock().unwrap().push(RecordedCall {
            messages: messages.to_vec(),
            tools: tools.map(<[ToolDefinition]>::to_vec),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(text_completion("Scripted reply")))
    }
}

/// Completion carrying plain assistant text
pub fn text_completion(text: &str) -> Completion {
    Completion {
        message: ChatMessage::assistant(text),
        finish_reason: Some("stop".to_owned()),
        usage: None,
    }
}

/// Completion requesting the given tool calls
pub fn tool_call_completion(calls: Vec<ToolCall>) -> Completion {
    Completion {
        message: ChatMessage::assistant_tool_calls("", calls),
        finish_reason: Some("tool_calls".to_owned()),
        usage: None,
    }
}

// ============================================================================
// Collaborator doubles
// ============================================================================

/// Weather lookup answering from a fixed table
#[derive(Default)]
pub struct FakeWeather {
    records: HashMap<String, WeatherRecord>,
    requested: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl FakeWeather {
    pub fn with_city(mut self, city: &str, record: WeatherRecord) -> Self {
        self.records.insert(city.to_lowercase(), record);
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherLookup for FakeWeather {
    async fn fetch(&self, city: &str) -> Option<WeatherRecord> {
        self.requested.lock().unwrap().push(city.to_owned());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.records.get(&city.to_lowercase()).cloned()
    }
}

/// Location lookup returning a fixed answer and recording the queried address
#[derive(Default)]
pub struct FakeLocation {
    answer: Option<DetectedLocation>,
    queried: Mutex<Vec<Option<IpAddr>>>,
}

impl FakeLocation {
    pub fn answering(location: DetectedLocation) -> Self {
        Self {
            answer: Some(location),
            ..Self::default()
        }
    }

    pub fn queried(&self) -> Vec<Option<IpAddr>> {
        self.queried.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocationLookup for FakeLocation {
    async fn detect(&self, client_ip: Option<IpAddr>) -> Option<DetectedLocation> {
        self.queried.lock().unwrap().push(client_ip);
        self.answer.clone()
    }
}

/// Radio directory returning a fixed list for every country
#[derive(Default)]
pub struct FakeRadio {
    stations: Vec<RadioStation>,
}

impl FakeRadio {
    pub fn with_stations(stations: Vec<RadioStation>) -> Self {
        Self { stations }
    }
}

#[async_trait]
impl RadioDirectory for FakeRadio {
    async fn stations(&self, _country: &str) -> Vec<RadioStation> {
        self.stations.clone()
    }
}

pub fn sample_weather() -> WeatherRecord {
    WeatherRecord {
        temp: 18,
        description: "light rain".to_owned(),
        icon: "10d".to_owned(),
        humidity: 82,
        wind_speed: 4.1,
        feels_like: 17,
    }
}

pub fn sample_station(name: &str) -> RadioStation {
    RadioStation {
        name: name.to_owned(),
        url: format!("https://stream.example.com/{}", name.to_lowercase()),
        favicon: String::new(),
        country: "France".to_owned(),
        tags: "news".to_owned(),
    }
}

// ============================================================================
// Server resources
// ============================================================================

/// Session store whose every operation fails, as an unreachable backend would
#[derive(Default)]
pub struct FailingSessionStore;

impl FailingSessionStore {
    fn unavailable() -> AppError {
        AppError::new(ErrorCode::InternalError, "session store unavailable")
    }
}

#[async_trait]
impl SessionStore for FailingSessionStore {
    async fn get(&self, _key: &str) -> AppResult<Option<SessionState>> {
        Err(Self::unavailable())
    }

    async fn set(&self, _key: &str, _state: SessionState) -> AppResult<()> {
        Err(Self::unavailable())
    }

    async fn remove(&self, _key: &str) -> AppResult<()> {
        Err(Self::unavailable())
    }
}

/// Configuration built from a fixed variable table
pub fn test_config(vars: &[(&str, &str)]) -> ServerConfig {
    let table: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    ServerConfig::from_lookup(|key| table.get(key).cloned()).unwrap()
}

/// Collaborators backed by doubles
pub struct TestCollaborators {
    pub completions: Arc<ScriptedCompletions>,
    pub weather: Arc<FakeWeather>,
    pub location: Arc<FakeLocation>,
    pub radio: Arc<FakeRadio>,
    pub sessions: Arc<InMemorySessionStore>,
}

impl TestCollaborators {
    pub fn new(completions: ScriptedCompletions, weather: FakeWeather) -> Self {
        Self {
            completions: Arc::new(completions),
            weather: Arc::new(weather),
            location: Arc::new(FakeLocation::default()),
            radio: Arc::new(FakeRadio::default()),
            sessions: Arc::new(InMemorySessionStore::new(NonZeroUsize::new(64).unwrap())),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            completions: self.completions.clone(),
            weather: self.weather.clone(),
            location: self.location.clone(),
            radio: self.radio.clone(),
            sessions: self.sessions.clone(),
        }
    }
}

/// Server resources over doubles, with a fixed secret and short deadlines
pub fn create_test_server_resources(doubles: &TestCollaborators) -> Arc<ServerResources> {
    create_test_server_resources_with(doubles, &[])
}

/// Same as [`create_test_server_resources`] with extra configuration variables
pub fn create_test_server_resources_with(
    doubles: &TestCollaborators,
    overrides: &[(&str, &str)],
) -> Arc<ServerResources> {
    build_test_server_resources(doubles.collaborators(), overrides)
}

/// Server resources over doubles with `sessions` in place of the in-memory store
pub fn create_test_server_resources_with_sessions(
    doubles: &TestCollaborators,
    sessions: Arc<dyn SessionStore>,
) -> Arc<ServerResources> {
    let mut collaborators = doubles.collaborators();
    collaborators.sessions = sessions;
    build_test_server_resources(collaborators, &[])
}

fn build_test_server_resources(
    collaborators: Collaborators,
    overrides: &[(&str, &str)],
) -> Arc<ServerResources> {
    init_test_logging();
    let mut vars = vec![
        ("SECRET_KEY", "test-secret-key"),
        ("BASE_URL", "http://localhost:5000"),
        ("SPEEDTEST_COMMAND", "sh -c exit"),
    ];
    vars.extend_from_slice(overrides);
    let config = test_config(&vars);
    let options = OrchestratorOptions {
        completion_timeout: Duration::from_secs(2),
        tool_timeout: Duration::from_secs(1),
        ..OrchestratorOptions::default()
    };
    Arc::new(ServerResources::with_orchestrator_options(
        &config,
        collaborators,
        options,
    ))
}
