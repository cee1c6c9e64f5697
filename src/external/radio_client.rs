// ABOUTME: Radio Browser API client listing popular stations for a country
// ABOUTME: Tries several mirror servers in order and normalizes station entries for the player
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Radio Browser station directory
//!
//! Radio Browser is served by community mirrors, any of which may be down.
//! Servers are tried in order and the first successful answer wins; when
//! every server fails the result is an empty list.
//!
//! # API Reference
//! <https://api.radio-browser.info>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::timeouts;
use crate::errors::{AppError, AppResult};
use crate::external::RadioDirectory;

/// Maximum stations returned to the UI
const MAX_STATIONS: usize = 30;

/// Stations requested from the API before filtering
const REQUEST_LIMIT: u32 = 50;

/// User agent Radio Browser asks clients to send
const USER_AGENT: &str = "AI-Assistant/1.0";

/// Country names the UI sends, mapped to the ISO codes the API expects
const COUNTRY_CODES: &[(&str, &str)] = &[
    ("United States", "US"),
    ("United Kingdom", "GB"),
    ("Germany", "DE"),
    ("France", "FR"),
    ("Spain", "ES"),
    ("Italy", "IT"),
    ("Canada", "CA"),
    ("Australia", "AU"),
    ("Japan", "JP"),
    ("Brazil", "BR"),
    ("India", "IN"),
    ("China", "CN"),
    ("Russia", "RU"),
    ("Mexico", "MX"),
    ("Netherlands", "NL"),
    ("Sweden", "SE"),
    ("Norway", "NO"),
    ("Denmark", "DK"),
    ("Poland", "PL"),
    ("Morocco", "MA"),
];

/// Radio client configuration
#[derive(Debug, Clone)]
pub struct RadioClientConfig {
    /// Mirror base URLs, tried in order
    pub servers: Vec<String>,
    /// HTTP timeout per server in seconds (default: 10)
    pub timeout_secs: u64,
}

impl Default for RadioClientConfig {
    fn default() -> Self {
        Self {
            servers: vec![
                "https://de1.api.radio-browser.info".to_owned(),
                "https://nl1.api.radio-browser.info".to_owned(),
                "https://at1.api.radio-browser.info".to_owned(),
            ],
            timeout_secs: timeouts::RADIO_HTTP_SECS,
        }
    }
}

/// Station entry as served to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioStation {
    /// Station name
    pub name: String,
    /// Stream URL
    pub url: String,
    /// Logo URL (may be empty)
    pub favicon: String,
    /// Country the station broadcasts from
    pub country: String,
    /// Comma-separated genre tags
    pub tags: String,
}

/// Raw station entry from the API (internal)
#[derive(Debug, Deserialize)]
struct StationResponse {
    name: Option<String>,
    url: Option<String>,
    url_resolved: Option<String>,
    favicon: Option<String>,
    country: Option<String>,
    tags: Option<String>,
}

/// Map a country name to its ISO code; unknown names pass through unchanged
#[must_use]
pub fn country_code(country: &str) -> &str {
    COUNTRY_CODES
        .iter()
        .find(|(name, _)| *name == country)
        .map_or(country, |&(_, code)| code)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Keep playable stations and shape them for the UI
fn normalize_stations(raw: Vec<StationResponse>, requested_country: &str) -> Vec<RadioStation> {
    raw.into_iter()
        .filter_map(|station| {
            let url = non_empty(station.url_resolved).or_else(|| non_empty(station.url))?;
            Some(RadioStation {
                name: non_empty(station.name).unwrap_or_else(|| "Unknown".to_owned()),
                url,
                favicon: station.favicon.unwrap_or_default(),
                country: non_empty(station.country)
                    .unwrap_or_else(|| requested_country.to_owned()),
                tags: non_empty(station.tags).unwrap_or_else(|| "General".to_owned()),
            })
        })
        .take(MAX_STATIONS)
        .collect()
}

/// Radio Browser API client
pub struct RadioClient {
    config: RadioClientConfig,
    http_client: Client,
}

impl RadioClient {
    /// Create a new radio client
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: RadioClientConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build radio HTTP client: {e}")))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    async fn fetch_from(&self, server: &str, code: &str) -> AppResult<Vec<StationResponse>> {
        let url = format!(
            "{}/json/stations/bycountry/{}",
            server.trim_end_matches('/'),
            urlencoding::encode(code)
        );
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("limit", REQUEST_LIMIT.to_string()),
                ("order", "votes".to_owned()),
                ("reverse", "true".to_owned()),
            ])
            .send()
            .await
            .map_err(|e| AppError::external_service("Radio Browser", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::external_service(
                "Radio Browser",
                format!("Station request failed with HTTP {status}"),
            ));
        }

        response.json().await.map_err(|e| {
            AppError::external_service("Radio Browser", format!("JSON parse error: {e}"))
        })
    }
}

#[async_trait]
impl RadioDirectory for RadioClient {
    async fn stations(&self, country: &str) -> Vec<RadioStation> {
        let code = country_code(country);
        for server in &self.config.servers {
            match self.fetch_from(server, code).await {
                Ok(raw) => {
                    let stations = normalize_stations(raw, country);
                    debug!(server, country, count = stations.len(), "Loaded radio stations");
                    return stations;
                }
                Err(e) => {
                    warn!(server, "Radio server failed: {}", e.message);
                }
            }
        }
        warn!(country, "All radio servers failed");
        Vec::new()
    }
}
