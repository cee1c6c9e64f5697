// ABOUTME: OpenWeatherMap API client for current weather conditions by city name
// ABOUTME: Normalizes upstream payloads into WeatherRecord and caches successful lookups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! OpenWeatherMap Current Weather Client
//!
//! Fetches current conditions for a city and normalizes them into a
//! [`WeatherRecord`]. The upstream is treated as unreliable: network failures,
//! non-success statuses and malformed payloads all collapse to `None`, and the
//! caller picks its own fallback.
//!
//! # Features
//! - Metric units, temperatures rounded to whole degrees
//! - Per-city caching of successful lookups (10 minutes by default), bounded
//!   by least-recently-used eviction
//!
//! # API Reference
//! OpenWeatherMap Current Weather: <https://openweathermap.org/current>
//!
//! # Example
//! ```rust,no_run
//! use pocket_assistant::external::weather_client::{WeatherClient, WeatherClientConfig};
//! use pocket_assistant::external::WeatherLookup;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WeatherClientConfig {
//!     api_key: Some("your_api_key".to_owned()),
//!     ..WeatherClientConfig::default()
//! };
//!
//! let client = WeatherClient::new(config)?;
//! if let Some(weather) = client.fetch("London").await {
//!     println!("{}°C, {}", weather.temp, weather.description);
//! }
//! # Ok(())
//! # }
//! ```

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::constants::timeouts;
use crate::errors::{AppError, AppResult};
use crate::external::WeatherLookup;

/// Weather API client configuration
#[derive(Debug, Clone)]
pub struct WeatherClientConfig {
    /// OpenWeatherMap API key (lookups return `None` when unset)
    pub api_key: Option<String>,
    /// Base URL for the API (default: <https://api.openweathermap.org/data/2.5>)
    pub base_url: String,
    /// Cache TTL in seconds (default: 600 = 10 minutes)
    pub cache_ttl_secs: u64,
    /// Cities kept in the cache before least-recently-used eviction (default: 500)
    pub cache_capacity: usize,
    /// HTTP timeout in seconds (default: 5)
    pub timeout_secs: u64,
}

impl Default for WeatherClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openweathermap.org/data/2.5".to_owned(),
            cache_ttl_secs: 600,
            cache_capacity: 500,
            timeout_secs: timeouts::WEATHER_HTTP_SECS,
        }
    }
}

/// Normalized snapshot of current weather conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Temperature in °C, rounded to an integer
    pub temp: i64,
    /// Short description (e.g. "light rain")
    pub description: String,
    /// OpenWeatherMap icon code (e.g. "10d")
    pub icon: String,
    /// Relative humidity in percent
    pub humidity: i64,
    /// Wind speed in m/s, rounded to one decimal
    pub wind_speed: f64,
    /// Feels-like temperature in °C, rounded to an integer
    pub feels_like: i64,
}

impl WeatherRecord {
    /// Placeholder conditions used when the live lookup fails at session init
    #[must_use]
    pub fn mock() -> Self {
        Self {
            temp: 20,
            description: "clear sky".to_owned(),
            icon: "01d".to_owned(),
            humidity: 50,
            wind_speed: 3.5,
            feels_like: 19,
        }
    }
}

/// OpenWeatherMap current weather response (internal)
#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    main: MainReadings,
    weather: Vec<Condition>,
    wind: Wind,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

impl CurrentWeatherResponse {
    /// Convert to a normalized record; `None` when no condition is present
    fn into_record(self) -> Option<WeatherRecord> {
        let condition = self.weather.into_iter().next()?;
        Some(WeatherRecord {
            temp: self.main.temp.round() as i64,
            description: condition.description,
            icon: condition.icon,
            humidity: self.main.humidity.round() as i64,
            wind_speed: (self.wind.speed * 10.0).round() / 10.0,
            feels_like: self.main.feels_like.round() as i64,
        })
    }
}

/// Cache entry with expiration
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

/// OpenWeatherMap API client
pub struct WeatherClient {
    config: WeatherClientConfig,
    http_client: Client,
    cache: Mutex<LruCache<String, CacheEntry<WeatherRecord>>>,
}

impl WeatherClient {
    /// Create a new weather client
    ///
    /// # Errors
    /// Returns error if the cache capacity is zero or the HTTP client cannot be built
    pub fn new(config: WeatherClientConfig) -> AppResult<Self> {
        let capacity = NonZeroUsize::new(config.cache_capacity)
            .ok_or_else(|| AppError::config("Weather cache capacity must be greater than zero"))?;
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build weather HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
            cache: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Fetch current conditions, reporting why a lookup failed
    ///
    /// # Errors
    /// Returns error if the API key is missing, the request fails, the API
    /// answers with a non-success status or the payload cannot be parsed
    pub async fn current_weather(&self, city: &str) -> AppResult<WeatherRecord> {
        let city = city.trim();
        if city.is_empty() {
            return Err(AppError::invalid_input("City name cannot be empty"));
        }

        let cache_key = city.to_lowercase();
        {
            let mut cache = self.cache.lock().await;
            if let Some(entry) = cache.get(&cache_key) {
                if Instant::now() < entry.expires_at {
                    debug!(city, "Weather cache hit");
                    return Ok(entry.data.clone());
                }
            }
            // Expired
            cache.pop(&cache_key);
        }

        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(AppError::config("OPENWEATHER_API_KEY is not set"));
        };

        let url = format!("{}/weather", self.config.base_url.trim_end_matches('/'));
        let response = self
            .http_client
            .get(&url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(|e| AppError::external_service("OpenWeatherMap", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::external_service(
                "OpenWeatherMap",
                format!("Weather request failed with HTTP {status}"),
            ));
        }

        let payload: CurrentWeatherResponse = response.json().await.map_err(|e| {
            AppError::external_service("OpenWeatherMap", format!("JSON parse error: {e}"))
        })?;

        let record = payload.into_record().ok_or_else(|| {
            AppError::external_service("OpenWeatherMap", "Response carried no weather condition")
        })?;

        {
            let mut cache = self.cache.lock().await;
            cache.put(
                cache_key,
                CacheEntry {
                    data: record.clone(),
                    expires_at: Instant::now() + Duration::from_secs(self.config.cache_ttl_secs),
                },
            );
        }

        Ok(record)
    }

    /// Clear the lookup cache
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    /// Number of cached cities
    pub async fn cache_len(&self) -> usize {
        self.cache.lock().await.len()
    }
}

#[async_trait]
impl WeatherLookup for WeatherClient {
    async fn fetch(&self, city: &str) -> Option<WeatherRecord> {
        match self.current_weather(city).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(city, "Weather lookup failed: {}", e.message);
                None
            }
        }
    }
}
