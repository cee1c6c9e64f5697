// ABOUTME: Environment-driven server configuration for the assistant backend
// ABOUTME: Parses listen address, secrets, collaborator settings and logging options from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::fmt;
use std::str::FromStr;

use ring::rand::{SecureRandom, SystemRandom};
use tracing::warn;

use crate::errors::{AppError, AppResult};
use crate::external::{
    LocationClientConfig, RadioClientConfig, SpeedTestConfig, WeatherClientConfig,
};
use crate::llm::OpenAiConfig;

/// Default listen host
const DEFAULT_HOST: &str = "0.0.0.0";
/// Default listen port
const DEFAULT_HTTP_PORT: u16 = 5000;
/// Default number of sessions kept in memory
const DEFAULT_SESSION_CAPACITY: usize = 10_000;
/// Length of a generated cookie signing secret in bytes
const GENERATED_SECRET_BYTES: usize = 32;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Multi-line human readable output
    Pretty,
    /// Single-line human readable output
    #[default]
    Compact,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" | "text" => Ok(Self::Compact),
            other => Err(AppError::config(format!(
                "Invalid LOG_FORMAT '{other}' (expected json, pretty or compact)"
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::default(),
        }
    }
}

/// Complete server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub http_port: u16,
    /// Public base URL, if known
    pub base_url: Option<String>,
    /// Whether the session cookie carries the `Secure` flag
    pub cookie_secure: bool,
    /// Session cookie signing secret
    pub secret_key: Vec<u8>,
    /// Sessions kept before least-recently-used eviction
    pub session_capacity: usize,
    /// Completion API settings
    pub openai: OpenAiConfig,
    /// Weather API settings
    pub weather: WeatherClientConfig,
    /// Geolocation API settings
    pub location: LocationClientConfig,
    /// Radio directory settings
    pub radio: RadioClientConfig,
    /// Speed test settings
    pub speed_test: SpeedTestConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("http_port", &self.http_port)
            .field("base_url", &self.base_url)
            .field("cookie_secure", &self.cookie_secure)
            .field("secret_key", &"[REDACTED]")
            .field("session_capacity", &self.session_capacity)
            .field("openai", &self.openai)
            .field("weather_api_key_set", &self.weather.api_key.is_some())
            .field("location", &self.location)
            .field("radio", &self.radio)
            .field("speed_test", &self.speed_test)
            .field("logging", &self.logging)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    /// Returns a config error when a variable is present but malformed
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    /// Returns a config error when a variable is present but malformed
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = var("BASE_URL");
        // Plain HTTP deployments cannot store Secure cookies
        let cookie_secure = base_url
            .as_deref()
            .map_or(true, |url| !url.starts_with("http://"));

        let secret_key = match var("SECRET_KEY") {
            Some(secret) => secret.into_bytes(),
            None => {
                warn!("SECRET_KEY is not set; generated a random key, sessions will not survive a restart");
                generate_secret()?
            }
        };

        let openai_defaults = OpenAiConfig::default();
        let openai = OpenAiConfig {
            api_key: var("OPENAI_API_KEY"),
            base_url: var("OPENAI_BASE_URL").unwrap_or(openai_defaults.base_url),
            model: var("OPENAI_MODEL").unwrap_or(openai_defaults.model),
            max_tokens: parse_or("OPENAI_MAX_TOKENS", var("OPENAI_MAX_TOKENS"), openai_defaults.max_tokens)?,
            temperature: parse_or(
                "OPENAI_TEMPERATURE",
                var("OPENAI_TEMPERATURE"),
                openai_defaults.temperature,
            )?,
            timeout_secs: parse_or("LLM_TIMEOUT_SECS", var("LLM_TIMEOUT_SECS"), openai_defaults.timeout_secs)?,
        };

        let weather_defaults = WeatherClientConfig::default();
        let weather = WeatherClientConfig {
            api_key: var("OPENWEATHER_API_KEY"),
            base_url: var("OPENWEATHER_BASE_URL").unwrap_or(weather_defaults.base_url),
            cache_ttl_secs: parse_or(
                "WEATHER_CACHE_TTL_SECS",
                var("WEATHER_CACHE_TTL_SECS"),
                weather_defaults.cache_ttl_secs,
            )?,
            cache_capacity: parse_or(
                "WEATHER_CACHE_CAPACITY",
                var("WEATHER_CACHE_CAPACITY"),
                weather_defaults.cache_capacity,
            )?,
            timeout_secs: weather_defaults.timeout_secs,
        };

        let location = LocationClientConfig {
            base_url: var("IP_API_BASE_URL")
                .unwrap_or_else(|| LocationClientConfig::default().base_url),
            ..LocationClientConfig::default()
        };

        let radio_defaults = RadioClientConfig::default();
        let radio = RadioClientConfig {
            servers: var("RADIO_BROWSER_SERVERS").map_or(radio_defaults.servers, |list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| s.trim_end_matches('/').to_owned())
                    .collect()
            }),
            timeout_secs: radio_defaults.timeout_secs,
        };

        let speed_test = speed_test_config(
            var("SPEEDTEST_COMMAND"),
            var("SPEEDTEST_TIMEOUT_SECS"),
        )?;

        let logging = LoggingConfig {
            level: var("LOG_LEVEL").unwrap_or_else(|| LoggingConfig::default().level),
            format: var("LOG_FORMAT")
                .map(|f| f.parse::<LogFormat>())
                .transpose()?
                .unwrap_or_default(),
        };

        let session_capacity = parse_or(
            "SESSION_CAPACITY",
            var("SESSION_CAPACITY"),
            DEFAULT_SESSION_CAPACITY,
        )?;
        if session_capacity == 0 {
            return Err(AppError::config("SESSION_CAPACITY must be greater than zero"));
        }

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            http_port: parse_or("HTTP_PORT", var("HTTP_PORT"), DEFAULT_HTTP_PORT)?,
            base_url,
            cookie_secure,
            secret_key,
            session_capacity,
            openai,
            weather,
            location,
            radio,
            speed_test,
            logging,
        })
    }

    /// `host:port` listen address
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

fn speed_test_config(
    command: Option<String>,
    timeout_secs: Option<String>,
) -> AppResult<SpeedTestConfig> {
    let defaults = SpeedTestConfig::default();
    let timeout_secs = parse_or("SPEEDTEST_TIMEOUT_SECS", timeout_secs, defaults.timeout_secs)?;

    let Some(command) = command else {
        return Ok(SpeedTestConfig {
            timeout_secs,
            ..defaults
        });
    };

    let mut parts = command.split_whitespace().map(str::to_owned);
    let program = parts
        .next()
        .ok_or_else(|| AppError::config("SPEEDTEST_COMMAND is empty"))?;

    Ok(SpeedTestConfig {
        program,
        args: parts.collect(),
        timeout_secs,
        max_runtime_secs: defaults.max_runtime_secs.max(timeout_secs),
    })
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {key} '{value}': {e}")))
    })
}

fn generate_secret() -> AppResult<Vec<u8>> {
    let mut secret = vec![0_u8; GENERATED_SECRET_BYTES];
    SystemRandom::new()
        .fill(&mut secret)
        .map_err(|_| AppError::internal("Failed to generate session secret"))?;
    Ok(secret)
}
